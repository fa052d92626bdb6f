//! Error types for sealnote

use sled::transaction::TransactionError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sealnote
#[derive(Error, Debug)]
pub enum Error {
    // Crypto errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication failed: wrong passphrase or corrupted record")]
    Authentication,

    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("No such entry: {0}")]
    NotFound(Uuid),

    #[error("No entry at position {0}")]
    NoSuchPosition(usize),

    #[error("'{0}' is neither an entry id nor a position")]
    InvalidTarget(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Transfer errors
    #[error("File too large: {size} bytes exceeds limit of {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Not a file: {}", .0.display())]
    NotAFile(PathBuf),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Coarse classification callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Cipher or key setup failed
    Configuration,
    /// Engine or filesystem access failed
    Io,
    /// Tag verification failed
    Authentication,
    /// Decrypted bytes do not match the expected record shape
    Serialization,
    /// Referenced id is not in the index
    NotFound,
}

impl ErrorKind {
    /// Process exit code used by the binary for this kind of failure
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Configuration => 2,
            ErrorKind::Io => 3,
            ErrorKind::Authentication => 4,
            ErrorKind::Serialization => 5,
            ErrorKind::NotFound => 6,
        }
    }
}

impl Error {
    /// Map onto the error taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::Authentication => ErrorKind::Authentication,
            Error::Serialization(_) => ErrorKind::Serialization,
            Error::NotFound(_) | Error::NoSuchPosition(_) | Error::InvalidTarget(_) => {
                ErrorKind::NotFound
            }
            Error::Database(_)
            | Error::Io(_)
            | Error::FileTooLarge { .. }
            | Error::AlreadyExists(_)
            | Error::NotAFile(_) => ErrorKind::Io,
        }
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<TransactionError<Error>> for Error {
    fn from(e: TransactionError<Error>) -> Self {
        match e {
            TransactionError::Abort(inner) => inner,
            TransactionError::Storage(e) => Error::Database(e),
        }
    }
}
