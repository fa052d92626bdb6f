//! Record codec
//!
//! Turns a typed record into a sealed blob and back. The plaintext under the
//! seal is framed as `[kind][version][bincode payload]` so that a blob of one
//! schema can never be decoded as the other, and a schema bump is detected
//! rather than misread.

use crate::crypto::{decrypt, encrypt, EncryptedData, StoreKey};
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

const HEADER_SIZE: usize = 2;

/// Which persisted schema a blob carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordKind {
    Index = 1,
    Entry = 2,
}

impl RecordKind {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(RecordKind::Index),
            2 => Some(RecordKind::Entry),
            _ => None,
        }
    }
}

/// A value with a fixed, versioned on-disk schema
pub trait Record: Serialize + DeserializeOwned {
    const KIND: RecordKind;
    const VERSION: u8;
}

/// Serialize, frame and seal a record
pub fn harden<T: Record>(key: &StoreKey, value: &T) -> Result<Vec<u8>> {
    let payload = bincode::serialize(value)?;

    let mut plaintext = Vec::with_capacity(HEADER_SIZE + payload.len());
    plaintext.push(T::KIND as u8);
    plaintext.push(T::VERSION);
    plaintext.extend_from_slice(&payload);

    Ok(encrypt(key, &plaintext)?.to_bytes())
}

/// Open, check framing and deserialize a record
pub fn soften<T: Record>(key: &StoreKey, blob: &[u8]) -> Result<T> {
    let encrypted = EncryptedData::from_bytes(blob)?;
    let plaintext = decrypt(key, &encrypted)?;

    if plaintext.len() < HEADER_SIZE {
        return Err(Error::Serialization("Record header missing".to_string()));
    }

    match RecordKind::from_byte(plaintext[0]) {
        Some(kind) if kind == T::KIND => {}
        Some(kind) => {
            return Err(Error::Serialization(format!(
                "Expected {:?} record, found {:?}",
                T::KIND,
                kind
            )));
        }
        None => {
            return Err(Error::Serialization(format!(
                "Unknown record kind {}",
                plaintext[0]
            )));
        }
    }

    if plaintext[1] != T::VERSION {
        return Err(Error::Serialization(format!(
            "Unsupported {:?} record version {} (expected {})",
            T::KIND,
            plaintext[1],
            T::VERSION
        )));
    }

    Ok(bincode::deserialize(&plaintext[HEADER_SIZE..])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::derive_key;
    use crate::store::{Entry, EntryMeta, Index};
    use uuid::Uuid;

    fn sample_index() -> Index {
        Index::from(vec![
            EntryMeta {
                name: "groceries".to_string(),
                id: Uuid::now_v7(),
            },
            EntryMeta {
                name: String::new(),
                id: Uuid::now_v7(),
            },
        ])
    }

    #[test]
    fn test_round_trip_entry() {
        let key = derive_key(b"obvious-key").unwrap();
        let entry = Entry {
            id: Uuid::now_v7(),
            text: "Hopefully the integer is 42\nline two".to_string(),
        };

        let blob = harden(&key, &entry).unwrap();
        let restored: Entry = soften(&key, &blob).unwrap();

        assert_eq!(restored, entry);
    }

    #[test]
    fn test_round_trip_index() {
        let key = derive_key(b"obvious-key").unwrap();
        let index = sample_index();

        let blob = harden(&key, &index).unwrap();
        let restored: Index = soften(&key, &blob).unwrap();

        assert_eq!(restored, index);
    }

    #[test]
    fn test_harden_is_not_deterministic() {
        let key = derive_key(b"obvious-key").unwrap();
        let index = sample_index();

        let first = harden(&key, &index).unwrap();
        let second = harden(&key, &index).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_wrong_key_is_authentication_error() {
        let key_a = derive_key(b"key a").unwrap();
        let key_b = derive_key(b"key b").unwrap();

        let blob = harden(&key_a, &sample_index()).unwrap();
        let result: Result<Index> = soften(&key_b, &blob);

        assert!(matches!(result, Err(Error::Authentication)));
    }

    #[test]
    fn test_kind_mismatch_is_serialization_error() {
        let key = derive_key(b"obvious-key").unwrap();

        let blob = harden(&key, &sample_index()).unwrap();
        let result: Result<Entry> = soften(&key, &blob);

        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_unknown_version_rejected() {
        let key = derive_key(b"obvious-key").unwrap();

        let plaintext = [RecordKind::Entry as u8, 99, 0, 0];
        let blob = encrypt(&key, &plaintext).unwrap().to_bytes();
        let result: Result<Entry> = soften(&key, &blob);

        assert!(matches!(result, Err(Error::Serialization(msg)) if msg.contains("99")));
    }

    #[test]
    fn test_garbage_payload_rejected() {
        let key = derive_key(b"obvious-key").unwrap();

        let plaintext = [RecordKind::Entry as u8, Entry::VERSION, 0xFF];
        let blob = encrypt(&key, &plaintext).unwrap().to_bytes();
        let result: Result<Entry> = soften(&key, &blob);

        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_truncated_blob_rejected() {
        let key = derive_key(b"obvious-key").unwrap();
        let result: Result<Index> = soften(&key, b"short");

        assert!(matches!(result, Err(Error::Authentication)));
    }
}
