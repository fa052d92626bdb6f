//! Encrypted record store
//!
//! One sled tree holds two kinds of sealed records: the index under the
//! fixed key `"index"`, and one entry body per 16-byte entry id. The index is
//! the authoritative membership list; every id it names has a body and every
//! body is named exactly once.

mod entry;
mod index;
mod storage;

pub use entry::Entry;
pub use index::{EntryMeta, Index, INDEX_KEY};
pub use storage::{Storage, NAMESPACE};

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use sled::transaction::{ConflictableTransactionError, ConflictableTransactionResult};
use uuid::Uuid;

type TxResult<T> = ConflictableTransactionResult<T, Error>;

/// Lift a store error into a sled transaction abort
trait OrAbort<T> {
    fn or_abort(self) -> TxResult<T>;
}

impl<T> OrAbort<T> for Result<T> {
    fn or_abort(self) -> TxResult<T> {
        self.map_err(ConflictableTransactionError::Abort)
    }
}

/// Creation time embedded in a time-ordered entry id
fn created_at(id: &Uuid) -> Option<DateTime<Utc>> {
    let (secs, nanos) = id.get_timestamp()?.to_unix();
    DateTime::from_timestamp(i64::try_from(secs).ok()?, nanos)
}
