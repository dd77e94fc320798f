//! Lifecycle event notification.

mod bus;
mod types;

pub use bus::{EventBus, ListenerId, SubmissionListener};
pub use types::TransitionEvent;
