//! Item-failing error taxonomy for submission processing.
//!
//! Collaborator failures never appear here: they are absorbed at the
//! processor boundary into per-record warnings.

use thiserror::Error;

/// Errors that fail a whole submission item.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The submission is malformed or entirely empty.
    #[error("Invalid submission: {0}")]
    Validation(String),

    /// A required synchronous step failed (unreadable bytes).
    #[error("Failed to decode {modality}: {reason}")]
    Decode {
        modality: &'static str,
        reason: String,
    },

    /// An unexpected fault while composing metadata.
    #[error("Metadata aggregation failed: {0}")]
    Aggregation(String),
}

impl ProcessError {
    /// Creates a decode error for the given modality.
    pub fn decode(modality: &'static str, reason: impl Into<String>) -> Self {
        Self::Decode {
            modality,
            reason: reason.into(),
        }
    }
}
