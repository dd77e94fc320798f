//! Batch submission integration tests.
//!
//! Chunked concurrency bounds, strict chunk ordering, and per-item failure
//! isolation.

mod common;

use std::time::Duration;

use common::TestHarness;

use intake_core::testing::fixtures;
use intake_core::{BatchOptions, Blob, InputStatus, MultiModalInput, ProcessingOptions};

#[tokio::test]
async fn test_batch_of_text_inputs_bounded_by_two() {
    let harness = TestHarness::new();

    let inputs: Vec<MultiModalInput> = (0..5)
        .map(|i| MultiModalInput::text(format!("submission number {}", i)))
        .collect();

    let results = harness
        .orchestrator
        .submit_batch(
            inputs,
            &ProcessingOptions::default(),
            &BatchOptions::with_max_concurrent(2),
        )
        .await;

    assert_eq!(results.len(), 5);
    assert!(results
        .iter()
        .all(|record| record.status == InputStatus::Completed));

    // Never more than two records simultaneously in processing.
    assert!(harness.listener.max_concurrent_processing() <= 2);
}

#[tokio::test]
async fn test_batch_concurrency_bound_holds_under_slow_collaborators() {
    let harness = TestHarness::new();
    harness.parser.set_delay(Duration::from_millis(50)).await;

    let inputs: Vec<MultiModalInput> =
        (0..4).map(|i| fixtures::document_input(&format!("doc {}", i))).collect();

    let results = harness
        .orchestrator
        .submit_batch(
            inputs,
            &ProcessingOptions::enable_all(),
            &BatchOptions::with_max_concurrent(2),
        )
        .await;

    assert_eq!(results.len(), 4);
    assert!(results
        .iter()
        .all(|record| record.status == InputStatus::Completed));
    assert!(harness.listener.max_concurrent_processing() <= 2);
}

#[tokio::test]
async fn test_chunks_run_strictly_in_order() {
    let harness = TestHarness::new();
    harness.parser.set_delay(Duration::from_millis(20)).await;

    let inputs: Vec<MultiModalInput> =
        (0..4).map(|i| fixtures::document_input(&format!("doc {}", i))).collect();

    harness
        .orchestrator
        .submit_batch(
            inputs,
            &ProcessingOptions::enable_all(),
            &BatchOptions::with_max_concurrent(2),
        )
        .await;

    let ids = harness.listener.ids_in_registration_order();
    let events = harness.listener.events();

    // Every terminal event of the first chunk precedes any processing event
    // of the second chunk.
    let last_chunk1_terminal = events
        .iter()
        .rposition(|event| {
            (event.id == ids[0] || event.id == ids[1]) && event.status.is_terminal()
        })
        .expect("first chunk should reach terminal states");
    let first_chunk2_processing = events
        .iter()
        .position(|event| {
            (event.id == ids[2] || event.id == ids[3])
                && event.status == InputStatus::Processing
        })
        .expect("second chunk should be processed");

    assert!(
        last_chunk1_terminal < first_chunk2_processing,
        "chunk 2 started (event {}) before chunk 1 settled (event {})",
        first_chunk2_processing,
        last_chunk1_terminal
    );
}

#[tokio::test]
async fn test_batch_failure_isolation() {
    let harness = TestHarness::new();

    let inputs = vec![
        MultiModalInput::text("fine"),
        MultiModalInput::new().with_image(Blob::new(b"corrupt".to_vec())),
        MultiModalInput::text("also fine"),
    ];

    let results = harness
        .orchestrator
        .submit_batch(
            inputs,
            &ProcessingOptions::default(),
            &BatchOptions::with_max_concurrent(2),
        )
        .await;

    // One entry per submitted input, in order, failures captured in place.
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].status, InputStatus::Completed);
    assert_eq!(results[1].status, InputStatus::Error);
    assert_eq!(results[2].status, InputStatus::Completed);

    let status = harness.orchestrator.status().await;
    assert_eq!(status.completed_count, 2);
    assert_eq!(status.failed_count, 1);
}

#[tokio::test]
async fn test_empty_batch_returns_empty() {
    let harness = TestHarness::new();

    let results = harness
        .orchestrator
        .submit_batch(
            Vec::new(),
            &ProcessingOptions::default(),
            &BatchOptions::default(),
        )
        .await;

    assert!(results.is_empty());
}

#[tokio::test]
async fn test_zero_max_concurrent_is_clamped_to_one() {
    let harness = TestHarness::new();

    let results = harness
        .orchestrator
        .submit_batch(
            vec![MultiModalInput::text("a"), MultiModalInput::text("b")],
            &ProcessingOptions::default(),
            &BatchOptions::with_max_concurrent(0),
        )
        .await;

    assert_eq!(results.len(), 2);
    assert!(results
        .iter()
        .all(|record| record.status == InputStatus::Completed));
    assert_eq!(harness.listener.max_concurrent_processing(), 1);
}
