//! Entry index
//!
//! The ordered list of entry names and ids. Position in the list is the
//! display order; there is no secondary sort key.

use crate::codec::{harden, soften, Record, RecordKind};
use crate::crypto::StoreKey;
use crate::error::{Error, Result};
use crate::store::{created_at, OrAbort, TxResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::transaction::TransactionalTree;
use std::fmt;
use tracing::debug;
use uuid::Uuid;

/// Well-known key of the index record
pub const INDEX_KEY: &[u8] = b"index";

/// Display name and id of one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMeta {
    /// Display name, may be empty and need not be unique
    pub name: String,
    /// Id of the entry body
    pub id: Uuid,
}

impl EntryMeta {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        created_at(&self.id)
    }
}

/// Ordered sequence of entry metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Index {
    entries: Vec<EntryMeta>,
}

impl Record for Index {
    const KIND: RecordKind = RecordKind::Index;
    const VERSION: u8 = 1;
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EntryMeta> {
        self.entries.iter()
    }

    /// Entry at a display position
    pub fn get(&self, position: usize) -> Option<&EntryMeta> {
        self.entries.get(position)
    }

    /// Display position of an id
    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.entries.iter().position(|meta| meta.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.position(id).is_some()
    }

    /// Look up an entry by id or zero-based display position
    pub fn resolve(&self, target: &str) -> Result<Uuid> {
        if let Ok(id) = Uuid::parse_str(target) {
            return Ok(id);
        }

        let position: usize = target
            .trim()
            .parse()
            .map_err(|_| Error::InvalidTarget(target.to_string()))?;

        self.get(position)
            .map(|meta| meta.id)
            .ok_or(Error::NoSuchPosition(position))
    }

    fn require(&self, id: Uuid) -> Result<usize> {
        self.position(id).ok_or(Error::NotFound(id))
    }

    /// Append at the tail
    pub(crate) fn push(&mut self, meta: EntryMeta) {
        self.entries.push(meta);
    }

    /// Change the name of an entry in place
    pub(crate) fn rename(&mut self, id: Uuid, name: &str) -> Result<()> {
        let position = self.require(id)?;
        self.entries[position].name = name.to_string();
        Ok(())
    }

    /// Swap with the previous entry. Returns false when already first.
    pub(crate) fn move_up(&mut self, id: Uuid) -> Result<bool> {
        let position = self.require(id)?;
        if position == 0 {
            return Ok(false);
        }
        self.entries.swap(position - 1, position);
        Ok(true)
    }

    /// Swap with the next entry. Returns false when already last.
    pub(crate) fn move_down(&mut self, id: Uuid) -> Result<bool> {
        let position = self.require(id)?;
        if position + 1 == self.entries.len() {
            return Ok(false);
        }
        self.entries.swap(position, position + 1);
        Ok(true)
    }

    /// Drop an entry from the sequence
    pub(crate) fn remove(&mut self, id: Uuid) -> Result<EntryMeta> {
        let position = self.require(id)?;
        Ok(self.entries.remove(position))
    }
}

impl From<Vec<EntryMeta>> for Index {
    fn from(entries: Vec<EntryMeta>) -> Self {
        Index { entries }
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, meta) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{:03} [{}] {}", i, meta.id, meta.name)?;
        }
        Ok(())
    }
}

/// Read the index, creating and storing an empty one on first use
pub(crate) fn load(tx: &TransactionalTree, key: &StoreKey) -> TxResult<Index> {
    match tx.get(INDEX_KEY)? {
        Some(blob) => soften(key, &blob).or_abort(),
        None => {
            let index = Index::new();
            save(tx, key, &index)?;
            debug!("Initialized empty index");
            Ok(index)
        }
    }
}

/// Seal and overwrite the index record
pub(crate) fn save(tx: &TransactionalTree, key: &StoreKey, index: &Index) -> TxResult<()> {
    let blob = harden(key, index).or_abort()?;
    tx.insert(INDEX_KEY, blob)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(name: &str) -> EntryMeta {
        EntryMeta {
            name: name.to_string(),
            id: Uuid::now_v7(),
        }
    }

    fn three() -> (Index, [Uuid; 3]) {
        let (a, b, c) = (meta("a"), meta("b"), meta("c"));
        let ids = [a.id, b.id, c.id];
        (Index::from(vec![a, b, c]), ids)
    }

    fn order(index: &Index) -> Vec<Uuid> {
        index.iter().map(|m| m.id).collect()
    }

    #[test]
    fn test_rename_keeps_order() {
        let (mut index, ids) = three();
        index.rename(ids[1], "bee").unwrap();

        assert_eq!(index.get(1).unwrap().name, "bee");
        assert_eq!(order(&index), ids.to_vec());
    }

    #[test]
    fn test_move_up_swaps() {
        let (mut index, ids) = three();
        assert!(index.move_up(ids[2]).unwrap());
        assert_eq!(order(&index), vec![ids[0], ids[2], ids[1]]);
    }

    #[test]
    fn test_move_down_swaps() {
        let (mut index, ids) = three();
        assert!(index.move_down(ids[0]).unwrap());
        assert_eq!(order(&index), vec![ids[1], ids[0], ids[2]]);
    }

    #[test]
    fn test_boundaries_are_noops() {
        let (mut index, ids) = three();

        assert!(!index.move_up(ids[0]).unwrap());
        assert!(!index.move_down(ids[2]).unwrap());
        assert_eq!(order(&index), ids.to_vec());
    }

    #[test]
    fn test_single_entry_boundaries() {
        let only = meta("only");
        let id = only.id;
        let mut index = Index::from(vec![only]);

        assert!(!index.move_up(id).unwrap());
        assert!(!index.move_down(id).unwrap());
    }

    #[test]
    fn test_unknown_id_rejected() {
        let (mut index, _) = three();
        let stranger = Uuid::now_v7();

        assert!(matches!(index.rename(stranger, "x"), Err(Error::NotFound(id)) if id == stranger));
        assert!(matches!(index.move_up(stranger), Err(Error::NotFound(_))));
        assert!(matches!(index.move_down(stranger), Err(Error::NotFound(_))));
        assert!(matches!(index.remove(stranger), Err(Error::NotFound(_))));
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_remove() {
        let (mut index, ids) = three();
        let removed = index.remove(ids[1]).unwrap();

        assert_eq!(removed.name, "b");
        assert_eq!(order(&index), vec![ids[0], ids[2]]);
        assert!(!index.contains(ids[1]));
    }

    #[test]
    fn test_resolve_position_and_id() {
        let (index, ids) = three();

        assert_eq!(index.resolve("0").unwrap(), ids[0]);
        assert_eq!(index.resolve("2").unwrap(), ids[2]);
        assert_eq!(index.resolve(&ids[1].to_string()).unwrap(), ids[1]);
    }

    #[test]
    fn test_resolve_reports_bad_target() {
        let (index, _) = three();

        assert!(matches!(index.resolve("3"), Err(Error::NoSuchPosition(3))));
        assert!(matches!(index.resolve("-1"), Err(Error::InvalidTarget(t)) if t == "-1"));
        assert!(matches!(index.resolve("groceries"), Err(Error::InvalidTarget(_))));
        assert!(matches!(Index::new().resolve("0"), Err(Error::NoSuchPosition(0))));

        let err = index.resolve("7").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn test_display() {
        let (index, ids) = three();
        let rendered = index.to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], format!("000 [{}] a", ids[0]));
        assert_eq!(lines[2], format!("002 [{}] c", ids[2]));
        assert_eq!(Index::new().to_string(), "");
    }

    #[test]
    fn test_created_at_from_id() {
        let m = meta("timed");
        let created = m.created_at().unwrap();
        let drift = Utc::now().signed_duration_since(created);

        assert!(drift.num_seconds().abs() < 60);
    }
}
