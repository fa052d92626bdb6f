//! Cryptography module for sealnote
//!
//! Provides AES-256-GCM encryption under a key hashed from the passphrase.
//! Every record is sealed before it reaches the database.

mod encryption;
mod keys;

pub use encryption::{decrypt, encrypt, EncryptedData};
pub use keys::{derive_key, StoreKey};

/// Size of AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// Size of GCM nonce in bytes
pub const NONCE_SIZE: usize = 12;

/// Size of GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;
