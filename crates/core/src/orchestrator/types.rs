//! Types for the orchestrator module.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::submission::{InputStatus, InputType};

/// Batch submission tuning.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Maximum number of submissions processed concurrently within one
    /// chunk. Chunks run strictly in order.
    pub max_concurrent: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { max_concurrent: 3 }
    }
}

impl BatchOptions {
    /// Batch options with the given chunk size.
    pub fn with_max_concurrent(max_concurrent: usize) -> Self {
        Self { max_concurrent }
    }
}

/// Summary of one indexed record.
#[derive(Debug, Clone, Serialize)]
pub struct QueueEntry {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub input_type: InputType,
    pub status: InputStatus,
    pub submitted_at: DateTime<Utc>,
}

/// Read-only view over the orchestrator's index.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrchestratorStatus {
    /// One entry per indexed record, in no particular order.
    pub queue: Vec<QueueEntry>,
    /// Whether any record is currently being processed.
    pub is_processing: bool,
    /// Number of records that completed successfully.
    pub completed_count: usize,
    /// Number of records that ended in error.
    pub failed_count: usize,
}
