//! Entry bodies
//!
//! Each body is sealed on its own and stored under the raw 16 bytes of its id.

use crate::codec::{harden, soften, Record, RecordKind};
use crate::crypto::StoreKey;
use crate::error::{Error, Result};
use crate::store::{created_at, OrAbort, TxResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::transaction::TransactionalTree;
use sled::Tree;
use std::fmt;
use uuid::Uuid;

/// A stored note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Time-ordered unique id
    pub id: Uuid,
    /// Body text
    pub text: String,
}

impl Record for Entry {
    const KIND: RecordKind = RecordKind::Entry;
    const VERSION: u8 = 1;
}

impl Entry {
    /// New entry with a freshly generated id
    pub fn new(text: impl Into<String>) -> Self {
        Entry {
            id: Uuid::now_v7(),
            text: text.into(),
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        created_at(&self.id)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Fetch and open an entry body
pub(crate) fn read(tree: &Tree, key: &StoreKey, id: Uuid) -> Result<Entry> {
    let blob = tree.get(id.as_bytes())?.ok_or(Error::NotFound(id))?;
    let entry: Entry = soften(key, &blob)?;

    // A body stored under another id has been moved around on disk
    if entry.id != id {
        return Err(Error::Serialization(format!(
            "Record under {} carries id {}",
            id, entry.id
        )));
    }

    Ok(entry)
}

/// Seal and store a body, replacing any previous one
pub(crate) fn write(tx: &TransactionalTree, key: &StoreKey, entry: &Entry) -> TxResult<()> {
    let blob = harden(key, entry).or_abort()?;
    tx.insert(&entry.id.as_bytes()[..], blob)?;
    Ok(())
}

/// Remove a body; absence is not an error here
pub(crate) fn delete(tx: &TransactionalTree, id: Uuid) -> TxResult<()> {
    tx.remove(&id.as_bytes()[..])?;
    Ok(())
}
