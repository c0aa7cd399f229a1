use std::io;

/// Errors raised while grouping a PSM table
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Parse(#[from] crate::parser::Error),
    #[error("Invalid filter rule: {0}")]
    Filter(String),
    /// Reading or writing the relational store failed. Fatal for the batch
    #[error("Storage failure: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "serialization")]
    #[error("Invalid config file: {0}")]
    Config(#[from] serde_json::Error),
}
