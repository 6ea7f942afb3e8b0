//! Errors raised while resolving or mutating newspapers.

use thiserror::Error;

use crate::repository::DbError;

/// Errors that can occur while building targets or advancing issue ids.
///
/// Configuration errors (`Missing*`, `UnsupportedKind`, `InvalidState`)
/// describe malformed newspaper rows. `Storage` means the database write did
/// not commit and nothing changed.
#[derive(Debug, Error)]
pub enum NewspaperError {
    #[error("Newspaper {0} is missing a pattern")]
    MissingPattern(String),

    #[error("Newspaper {0} requires a base URL or an {{id}} pattern")]
    MissingBaseUrl(String),

    #[error("Newspaper {0} is missing a local latest ID")]
    MissingSequenceId(String),

    #[error("Newspaper {slug} has unsupported kind '{kind}'")]
    UnsupportedKind { slug: String, kind: String },

    #[error("Newspaper {slug} is in an invalid state: {reason}")]
    InvalidState { slug: String, reason: &'static str },

    #[error("Newspaper not found: {0}")]
    NotFound(String),

    #[error("Newspaper {0} is not a sequence newspaper and cannot be adjusted")]
    NotAdjustable(String),

    #[error("Storage error: {0}")]
    Storage(#[from] DbError),
}

impl NewspaperError {
    /// Whether the error comes from the newspaper's own data rather than
    /// from the database.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::Storage(_) | Self::NotFound(_))
    }
}
