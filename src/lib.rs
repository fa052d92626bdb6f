//! sealnote - Passphrase-protected note store
//!
//! Notes are kept in a sled database as individually sealed AES-256-GCM
//! records, with a separate sealed index controlling their order.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod store;
pub mod transfer;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use store::Storage;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::store::{Entry, EntryMeta, Index, Storage};
}
