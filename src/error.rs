//! Error types shared across the watch pipeline

use std::io;

use thiserror::Error;

/// Error type for recognition, ledger storage, dispatch and configuration failures.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("marker storage failed for '{key}': {source}")]
    LedgerStorage {
        key: String,
        #[source]
        source: Box<WatchError>,
    },
    #[error("recognition unavailable: {0}")]
    Recognition(String),
    #[error("failed to deliver message to '{recipient}': {reason}")]
    Dispatch { recipient: String, reason: String },
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

impl WatchError {
    /// Wrap a backend failure as a ledger storage failure for `key`
    pub fn ledger(key: impl Into<String>, source: WatchError) -> Self {
        WatchError::LedgerStorage {
            key: key.into(),
            source: Box::new(source),
        }
    }

    /// Whether the next cycle may succeed where this one failed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WatchError::LedgerStorage { .. } | WatchError::Recognition(_) | WatchError::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, WatchError>;
