use std::fmt;
use thiserror::Error;

/// Which history collection a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Order,
    Quote,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Order => f.write_str("order"),
            RecordKind::Quote => f.write_str("quote"),
        }
    }
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage connection lock poisoned")]
    LockPoisoned,

    #[error("{kind} {id} not found")]
    NotFound { kind: RecordKind, id: i64 },

    #[error("unrecognized value for {field}: {value:?}")]
    UnknownOption { field: &'static str, value: String },

    #[error("invalid direction: {0:?} (expected \"up\" or \"down\")")]
    InvalidDirection(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
