//! Submission processing orchestrator.
//!
//! Owns the submission index, dispatches per-modality work, applies bounded
//! concurrency, enforces the lifecycle state machine, and exposes
//! cancellation.

mod config;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::ProcessingOrchestrator;
pub use types::{BatchOptions, OrchestratorStatus, QueueEntry};
