//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

use crate::processor::DEFAULT_WAVEFORM_BUCKETS;

/// Tunables for the processing orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Permit count of the intra-submission fan-out semaphore. Bounds how
    /// many image/document items of a single submission are in flight at
    /// once, independently of batch-level concurrency.
    #[serde(default = "default_max_parallel_extractions")]
    pub max_parallel_extractions: usize,

    /// Default chunk size for `submit_batch` when the caller does not
    /// override it.
    #[serde(default = "default_batch_max_concurrent")]
    pub batch_max_concurrent: usize,

    /// Length of the waveform summary produced for audio items.
    #[serde(default = "default_waveform_buckets")]
    pub waveform_buckets: usize,
}

fn default_max_parallel_extractions() -> usize {
    4
}

fn default_batch_max_concurrent() -> usize {
    3
}

fn default_waveform_buckets() -> usize {
    DEFAULT_WAVEFORM_BUCKETS
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_parallel_extractions: default_max_parallel_extractions(),
            batch_max_concurrent: default_batch_max_concurrent(),
            waveform_buckets: default_waveform_buckets(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.max_parallel_extractions, 4);
        assert_eq!(config.batch_max_concurrent, 3);
        assert_eq!(config.waveform_buckets, 100);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: OrchestratorConfig =
            toml::from_str("max_parallel_extractions = 2").unwrap();
        assert_eq!(config.max_parallel_extractions, 2);
        assert_eq!(config.batch_max_concurrent, 3);
    }
}
