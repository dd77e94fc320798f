//! Event types.

use chrono::{DateTime, Utc};

use crate::submission::{InputStatus, ProcessedInput};

/// One lifecycle transition of a processed submission.
///
/// Carries a full snapshot of the record taken at transition time; listeners
/// never see the live record.
#[derive(Debug, Clone)]
pub struct TransitionEvent {
    /// When the transition happened.
    pub timestamp: DateTime<Utc>,
    /// Status before the transition; `None` for the initial pending event.
    pub previous: Option<InputStatus>,
    /// The record as of this transition.
    pub snapshot: ProcessedInput,
}

impl TransitionEvent {
    /// Status after the transition.
    pub fn status(&self) -> InputStatus {
        self.snapshot.status
    }
}
