//! AES-256-GCM Encryption Implementation
//!
//! Stored blobs are laid out as `nonce || ciphertext || tag`. No associated
//! data is bound; the tag covers the ciphertext only.

use crate::crypto::{StoreKey, NONCE_SIZE, TAG_SIZE};
use crate::error::{Error, Result};
use rand::RngCore;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};

/// Encrypted data container with nonce and authentication tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedData {
    /// Nonce used for encryption (unique per encryption)
    pub nonce: [u8; NONCE_SIZE],
    /// Ciphertext with appended authentication tag
    pub ciphertext: Vec<u8>,
}

impl EncryptedData {
    /// Get the total size of encrypted data
    pub fn size(&self) -> usize {
        self.nonce.len() + self.ciphertext.len()
    }

    /// Serialize to bytes for storage
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.size());
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    /// Split a stored blob into nonce and ciphertext
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(Error::Authentication);
        }

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&bytes[..NONCE_SIZE]);

        Ok(EncryptedData {
            nonce,
            ciphertext: bytes[NONCE_SIZE..].to_vec(),
        })
    }
}

fn aead_key(key: &StoreKey) -> Result<LessSafeKey> {
    let unbound_key = UnboundKey::new(&AES_256_GCM, key.key())
        .map_err(|_| Error::Configuration("Failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound_key))
}

/// Encrypt data using AES-256-GCM under a freshly drawn random nonce
pub fn encrypt(key: &StoreKey, plaintext: &[u8]) -> Result<EncryptedData> {
    let sealing_key = aead_key(key)?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    let mut in_out = Vec::with_capacity(plaintext.len() + TAG_SIZE);
    in_out.extend_from_slice(plaintext);

    sealing_key
        .seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| Error::Configuration("AES-256-GCM sealing failed".to_string()))?;

    Ok(EncryptedData {
        nonce: nonce_bytes,
        ciphertext: in_out,
    })
}

/// Decrypt data using AES-256-GCM
///
/// A failed tag check is reported as [`Error::Authentication`]; a wrong key
/// and a tampered blob cannot be told apart.
pub fn decrypt(key: &StoreKey, encrypted: &EncryptedData) -> Result<Vec<u8>> {
    if encrypted.ciphertext.len() < TAG_SIZE {
        return Err(Error::Authentication);
    }

    let opening_key = aead_key(key)?;
    let nonce = Nonce::assume_unique_for_key(encrypted.nonce);

    let mut in_out = encrypted.ciphertext.clone();
    let plaintext = opening_key
        .open_in_place(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| Error::Authentication)?;

    Ok(plaintext.to_vec())
}
