use std::path::PathBuf;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced by the timezone engine.
///
/// `NotFound` is an expected query outcome, not a failure of the engine;
/// everything else is surfaced synchronously at the call that caused it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unrecognized storage kind or codec name.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Malformed boundary-source geometry. Aborts the build run.
    #[error("failed to decode boundary source: {0}")]
    Decode(String),

    /// Corrupt or truncated stored record bytes.
    #[error("corrupt or truncated record: {0}")]
    Codec(String),

    /// Build-time guard: the destination dataset already holds data.
    #[error("dataset already exists: {0}")]
    AlreadyExists(PathBuf),

    /// The dataset (or boundary source) to open does not exist on disk.
    #[error("dataset not found: {0}")]
    Missing(PathBuf),

    /// No polygon contains the queried coordinate.
    #[error("no timezone contains the given coordinate")]
    NotFound,

    /// The storage handle was closed; the engine cannot serve queries.
    #[error("storage handle is closed")]
    Closed,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("storage engine error: {0}")]
    Store(#[from] redb::Error),
}

// redb surfaces a dedicated error type per operation; route them all through
// the unified redb::Error so call sites can use plain `?`.
impl From<redb::DatabaseError> for Error {
    fn from(e: redb::DatabaseError) -> Self {
        Error::Store(e.into())
    }
}

impl From<redb::TransactionError> for Error {
    fn from(e: redb::TransactionError) -> Self {
        Error::Store(e.into())
    }
}

impl From<redb::TableError> for Error {
    fn from(e: redb::TableError) -> Self {
        Error::Store(e.into())
    }
}

impl From<redb::StorageError> for Error {
    fn from(e: redb::StorageError) -> Self {
        Error::Store(e.into())
    }
}

impl From<redb::CommitError> for Error {
    fn from(e: redb::CommitError) -> Self {
        Error::Store(e.into())
    }
}
