//! Multi-modal submission intake pipeline.
//!
//! Ingests heterogeneous submissions (text, images, audio, documents) and
//! normalizes them into structured, analyzed records. The
//! [`ProcessingOrchestrator`] owns the submission lifecycle: classification,
//! concurrent per-modality fan-out, a join barrier, metadata aggregation,
//! and event notification, with pre-dispatch cancellation and bounded batch
//! concurrency.

pub mod config;
pub mod events;
pub mod metadata;
pub mod metrics;
pub mod orchestrator;
pub mod processor;
pub mod services;
pub mod submission;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, ServicesConfig,
};
pub use events::{EventBus, ListenerId, SubmissionListener, TransitionEvent};
pub use orchestrator::{
    BatchOptions, OrchestratorConfig, OrchestratorStatus, ProcessingOrchestrator, QueueEntry,
};
pub use processor::{ProcessError, ProcessingOptions};
pub use submission::{
    classify, Blob, InputMetadata, InputStatus, InputType, ItemCounts, MultiModalInput,
    ProcessedContent, ProcessedInput,
};
