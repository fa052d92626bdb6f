//! Sled-backed note storage
//!
//! Every call opens its own sled transaction, reads and decrypts what it
//! needs, applies the change, re-seals and commits. Nothing decrypted is kept
//! between calls.

use crate::config::StoreConfig;
use crate::crypto::{derive_key, StoreKey};
use crate::error::{Error, Result};
use crate::store::{entry, index, Entry, EntryMeta, Index, OrAbort, TxResult};
use sled::transaction::{abort, TransactionalTree};
use sled::{Db, Tree};
use std::path::Path;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Name of the sled tree holding all records
pub const NAMESPACE: &str = "sealnote";

/// An open, unlocked note store
pub struct Storage {
    /// Sled database
    db: Db,
    /// Namespace tree
    tree: Tree,
    /// Key sealing every record
    key: StoreKey,
}

impl Storage {
    /// Open or create a store at `path`
    pub fn open<P: AsRef<Path>>(path: P, passphrase: &[u8]) -> Result<Self> {
        let config = StoreConfig {
            path: path.as_ref().to_path_buf(),
            ..StoreConfig::default()
        };
        Self::open_with_config(&config, passphrase)
    }

    /// Open or create a store with explicit engine settings
    ///
    /// The index is read once before returning, so a wrong passphrase on an
    /// existing store fails here with [`Error::Authentication`].
    pub fn open_with_config(config: &StoreConfig, passphrase: &[u8]) -> Result<Self> {
        let key = derive_key(passphrase)?;
        let db = config.sled_config().open()?;
        info!("Opening store at {:?}", config.path);
        Self::from_db(db, key)
    }

    /// Create a throwaway store (for testing)
    pub fn temporary(passphrase: &[u8]) -> Result<Self> {
        let key = derive_key(passphrase)?;
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db, key)
    }

    fn from_db(db: Db, key: StoreKey) -> Result<Self> {
        let tree = db.open_tree(NAMESPACE)?;
        let storage = Storage { db, tree, key };

        let index = storage.index()?;
        info!("Store opened, {} entries", index.len());
        Ok(storage)
    }

    /// Whether a store has already been created at `path`
    pub fn exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists()
    }

    /// Flush and release the store
    pub fn close(self) -> Result<()> {
        let Storage { db, tree, .. } = self;
        let flushed = db.flush()?;

        // The tree shares the database handle; the lock goes with the last one
        drop(tree);
        drop(db);

        info!("Store closed, {} bytes flushed", flushed);
        Ok(())
    }

    /// Run `f` as one all-or-nothing write transaction
    fn transact<T, F>(&self, f: F) -> Result<T>
    where
        F: Fn(&TransactionalTree) -> TxResult<T>,
    {
        self.tree.transaction(f).map_err(|e| {
            let e = Error::from(e);
            if let Error::NotFound(id) = &e {
                warn!("Rejected operation on unknown entry {}", id);
            }
            e
        })
    }

    /// Current ordered index
    pub fn index(&self) -> Result<Index> {
        self.transact(|tx| index::load(tx, &self.key))
    }

    /// Create a new entry at the end of the index
    pub fn create(&self, name: &str, text: &str) -> Result<(Entry, Index)> {
        let entry = Entry::new(text);

        let idx = self.transact(|tx| {
            let mut idx = index::load(tx, &self.key)?;
            idx.push(EntryMeta {
                name: name.to_string(),
                id: entry.id,
            });
            index::save(tx, &self.key, &idx)?;
            entry::write(tx, &self.key, &entry)?;
            Ok(idx)
        })?;

        debug!("Created entry {}, index length {}", entry.id, idx.len());
        Ok((entry, idx))
    }

    /// Read and decrypt one entry
    pub fn read(&self, id: Uuid) -> Result<Entry> {
        entry::read(&self.tree, &self.key, id)
    }

    /// Replace the body of an indexed entry
    pub fn update(&self, entry: &Entry) -> Result<()> {
        self.transact(|tx| {
            let idx = index::load(tx, &self.key)?;
            if !idx.contains(entry.id) {
                return abort(Error::NotFound(entry.id));
            }
            entry::write(tx, &self.key, entry)
        })?;

        debug!("Updated entry {}", entry.id);
        Ok(())
    }

    /// Change the display name of an entry
    pub fn rename(&self, id: Uuid, name: &str) -> Result<Index> {
        let idx = self.transact(|tx| {
            let mut idx = index::load(tx, &self.key)?;
            idx.rename(id, name).or_abort()?;
            index::save(tx, &self.key, &idx)?;
            Ok(idx)
        })?;

        debug!("Renamed entry {}", id);
        Ok(idx)
    }

    /// Move an entry one place towards the head; a no-op when already first
    pub fn move_up(&self, id: Uuid) -> Result<Index> {
        let idx = self.transact(|tx| {
            let mut idx = index::load(tx, &self.key)?;
            if idx.move_up(id).or_abort()? {
                index::save(tx, &self.key, &idx)?;
            }
            Ok(idx)
        })?;

        debug!("Moved entry {} up, now at {:?}", id, idx.position(id));
        Ok(idx)
    }

    /// Move an entry one place towards the tail; a no-op when already last
    pub fn move_down(&self, id: Uuid) -> Result<Index> {
        let idx = self.transact(|tx| {
            let mut idx = index::load(tx, &self.key)?;
            if idx.move_down(id).or_abort()? {
                index::save(tx, &self.key, &idx)?;
            }
            Ok(idx)
        })?;

        debug!("Moved entry {} down, now at {:?}", id, idx.position(id));
        Ok(idx)
    }

    /// Remove an entry from the index and drop its body
    pub fn delete(&self, id: Uuid) -> Result<Index> {
        let idx = self.transact(|tx| {
            let mut idx = index::load(tx, &self.key)?;
            idx.remove(id).or_abort()?;
            index::save(tx, &self.key, &idx)?;
            entry::delete(tx, id)?;
            Ok(idx)
        })?;

        debug!("Deleted entry {}, index length {}", id, idx.len());
        Ok(idx)
    }
}
