//! Error types shared by the session engine and the store.

use thiserror::Error;

/// Errors surfaced by typeboard operations.
///
/// Keystroke processing never produces one of these: keys outside the
/// accepted set are dropped, not rejected.
#[derive(Debug, Error)]
pub enum Error {
    /// Reference text, username or uploaded content failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No content exists with the given id.
    #[error("content not found: {0}")]
    ContentNotFound(String),

    /// The finished session could not be persisted. The result itself is
    /// still valid and can be submitted again.
    #[error("submission failed: {0}")]
    SubmissionFailure(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Returns `true` if retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::SubmissionFailure(_) | Error::Database(_) | Error::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
