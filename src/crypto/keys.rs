//! Store key derivation
//!
//! The store key is the SHA-256 digest of the raw passphrase bytes. There is
//! no salt and no stored check value: a wrong passphrase only shows up when
//! the first record fails to authenticate.

use crate::crypto::KEY_SIZE;
use crate::error::{Error, Result};
use ring::aead::{UnboundKey, AES_256_GCM};
use ring::digest::{digest, SHA256};
use std::fmt;
use zeroize::Zeroizing;

/// Symmetric key protecting every record in a store
#[derive(Clone)]
pub struct StoreKey {
    key: Zeroizing<[u8; KEY_SIZE]>,
}

impl StoreKey {
    /// Derive the key for a passphrase
    pub fn from_passphrase(passphrase: &[u8]) -> Result<Self> {
        let hashed = digest(&SHA256, passphrase);

        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        if hashed.as_ref().len() != KEY_SIZE {
            return Err(Error::Configuration(format!(
                "Digest length {} does not match key size {}",
                hashed.as_ref().len(),
                KEY_SIZE
            )));
        }
        key.copy_from_slice(hashed.as_ref());

        // Make sure the cipher accepts the key before anything is stored with it
        UnboundKey::new(&AES_256_GCM, &key[..])
            .map_err(|_| Error::Configuration("AES-256-GCM rejected the derived key".to_string()))?;

        Ok(StoreKey { key })
    }

    /// Get the raw key bytes
    pub fn key(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl fmt::Debug for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StoreKey(<redacted>)")
    }
}

/// Derive the store key from passphrase bytes
pub fn derive_key(passphrase: &[u8]) -> Result<StoreKey> {
    StoreKey::from_passphrase(passphrase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_deterministic() {
        let key1 = derive_key(b"correct horse battery staple").unwrap();
        let key2 = derive_key(b"correct horse battery staple").unwrap();

        assert_eq!(key1.key(), key2.key());
    }

    #[test]
    fn test_different_passphrases_differ() {
        let key1 = derive_key(b"one").unwrap();
        let key2 = derive_key(b"two").unwrap();

        assert_ne!(key1.key(), key2.key());
    }

    #[test]
    fn test_empty_passphrase_still_yields_key() {
        let key = derive_key(b"").unwrap();
        assert_eq!(key.key().len(), KEY_SIZE);
    }

    #[test]
    fn test_known_digest() {
        // SHA-256("abc")
        let key = derive_key(b"abc").unwrap();
        assert_eq!(key.key()[..4], [0xba, 0x78, 0x16, 0xbf]);
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = derive_key(b"secret").unwrap();
        assert_eq!(format!("{:?}", key), "StoreKey(<redacted>)");
    }
}
