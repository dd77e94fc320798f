//! Submission lifecycle integration tests.
//!
//! These tests drive single submissions through the orchestrator with mock
//! collaborators:
//! - Per-modality processing and aggregate metadata
//! - State machine monotonicity as observed through the event bus
//! - Fan-out isolation (one item's failure never touches its siblings)
//! - Graceful degradation of optional enrichment

mod common;

use common::TestHarness;

use intake_core::services::OcrError;
use intake_core::testing::fixtures;
use intake_core::{Blob, InputStatus, InputType, MultiModalInput, ProcessingOptions};

// =============================================================================
// Scenario Tests
// =============================================================================

#[tokio::test]
async fn test_text_only_submission_in_chinese() {
    let harness = TestHarness::new();

    let record = harness
        .orchestrator
        .submit(
            MultiModalInput::text("设计需求说明"),
            &ProcessingOptions::default(),
        )
        .await;

    assert_eq!(record.status, InputStatus::Completed);
    assert_eq!(record.input_type, InputType::Text);
    assert_eq!(record.metadata.item_count.text, 1);
    assert_eq!(record.metadata.item_count.images, 0);
    assert_eq!(record.metadata.item_count.audio, 0);
    assert_eq!(record.metadata.item_count.documents, 0);
    assert_eq!(record.metadata.total_size, 0);
    assert_eq!(record.metadata.token_estimate, Some(2));
    assert_eq!(record.metadata.language.as_deref(), Some("zh-CN"));
    assert!((record.metadata.confidence.unwrap() - 0.7).abs() < 1e-9);
    assert!(record.metadata.processing_time_ms.is_some());
    assert_eq!(record.content.text.as_deref(), Some("设计需求说明"));
}

#[tokio::test]
async fn test_image_without_analysis_still_gets_thumbnails() {
    let harness = TestHarness::new();
    let png = fixtures::png_image(64, 48);
    let png_len = png.len() as u64;

    let record = harness
        .orchestrator
        .submit(
            MultiModalInput::new().with_image(Blob::new(png)),
            &ProcessingOptions::default(),
        )
        .await;

    assert_eq!(record.status, InputStatus::Completed);
    assert_eq!(record.input_type, InputType::Image);
    assert_eq!(record.metadata.total_size, png_len);
    assert_eq!(record.content.images.len(), 1);

    let image = &record.content.images[0];
    assert!(image.features.is_none());
    assert!(image.extracted_text.is_none());
    assert!(image.thumbnails.is_some());
    assert_eq!(image.width, 64);
    assert_eq!(image.height, 48);

    // Analysis was disabled, so no collaborator was contacted; the three
    // thumbnail tiers landed in the blob store.
    assert_eq!(harness.vision.call_count().await, 0);
    assert_eq!(harness.ocr.call_count().await, 0);
    assert_eq!(harness.blobs.len().await, 3);
}

#[tokio::test]
async fn test_mixed_submission_with_all_enrichment() {
    let harness = TestHarness::new();
    harness.speech.set_transcript("hello from the recording").await;

    let input = MultiModalInput::text("project notes")
        .with_image(Blob::new(fixtures::png_image(16, 16)))
        .with_audio(Blob::new(fixtures::wav_tone(440.0, 0.5, 8000)))
        .with_document(
            Blob::new(b"%PDF-1.7 body".to_vec()).with_content_type("application/pdf"),
        );

    let record = harness
        .orchestrator
        .submit(input, &ProcessingOptions::enable_all())
        .await;

    assert_eq!(record.status, InputStatus::Completed);
    assert_eq!(record.input_type, InputType::Mixed);
    assert_eq!(record.content.images.len(), 1);
    assert!(record.content.audio.is_some());
    assert_eq!(record.content.documents.len(), 1);

    // Every enrichment succeeded: text, featured image, transcribed audio,
    // extracted document push confidence to the cap.
    assert!((record.metadata.confidence.unwrap() - 1.0).abs() < 1e-9);
    assert!(record.warnings.is_empty());

    let audio = record.content.audio.as_ref().unwrap();
    assert_eq!(audio.transcribed_text.as_deref(), Some("hello from the recording"));
    assert_eq!(audio.waveform.len(), 100);
}

// =============================================================================
// State Machine Tests
// =============================================================================

#[tokio::test]
async fn test_successful_lifecycle_event_sequence() {
    let harness = TestHarness::new();

    let record = harness
        .orchestrator
        .submit(MultiModalInput::text("hi"), &ProcessingOptions::default())
        .await;

    let statuses = harness.listener.statuses_for(record.id);
    assert_eq!(
        statuses,
        vec![
            InputStatus::Pending,
            InputStatus::Processing,
            InputStatus::Completed
        ]
    );

    // Each event carries the status it transitioned from.
    let events = harness.listener.events();
    let previous: Vec<_> = events.iter().map(|event| event.previous).collect();
    assert_eq!(
        previous,
        vec![
            None,
            Some(InputStatus::Pending),
            Some(InputStatus::Processing)
        ]
    );
}

#[tokio::test]
async fn test_failed_lifecycle_event_sequence() {
    let harness = TestHarness::new();

    let record = harness
        .orchestrator
        .submit(
            MultiModalInput::new().with_image(Blob::new(b"not an image".to_vec())),
            &ProcessingOptions::default(),
        )
        .await;

    assert_eq!(record.status, InputStatus::Error);
    assert!(record.error.is_some());

    let statuses = harness.listener.statuses_for(record.id);
    assert_eq!(
        statuses,
        vec![
            InputStatus::Pending,
            InputStatus::Processing,
            InputStatus::Error
        ]
    );
}

#[tokio::test]
async fn test_empty_submission_fails_without_dispatch() {
    let harness = TestHarness::new();

    let record = harness
        .orchestrator
        .submit(MultiModalInput::new(), &ProcessingOptions::default())
        .await;

    assert_eq!(record.status, InputStatus::Error);
    assert!(record.error.as_deref().unwrap().contains("no content"));

    // Validation failures go straight from pending to error.
    let statuses = harness.listener.statuses_for(record.id);
    assert_eq!(statuses, vec![InputStatus::Pending, InputStatus::Error]);
}

// =============================================================================
// Fan-out Isolation Tests
// =============================================================================

#[tokio::test]
async fn test_one_failed_ocr_call_does_not_touch_siblings() {
    let harness = TestHarness::new();

    // Three images of distinct byte sizes so the failing one can be targeted.
    let small = fixtures::png_image(10, 10);
    let middle = fixtures::png_image(20, 20);
    let large = fixtures::png_image(30, 30);
    harness
        .ocr
        .set_error_for_len(middle.len(), OcrError::NoTextFound)
        .await;

    let input = MultiModalInput::new()
        .with_image(Blob::new(small))
        .with_image(Blob::new(middle))
        .with_image(Blob::new(large));

    let record = harness
        .orchestrator
        .submit(input, &ProcessingOptions::enable_all())
        .await;

    // All three entries come back, only the targeted one lacks text, and the
    // item as a whole still completes.
    assert_eq!(record.status, InputStatus::Completed);
    assert_eq!(record.content.images.len(), 3);

    let with_text = record
        .content
        .images
        .iter()
        .filter(|image| image.extracted_text.is_some())
        .count();
    assert_eq!(with_text, 2);

    assert_eq!(record.warnings.len(), 1);
    assert!(record.warnings[0].contains("OCR failed"));
}

#[tokio::test]
async fn test_one_corrupt_image_fails_item_but_siblings_still_processed() {
    let harness = TestHarness::new();

    let input = MultiModalInput::new()
        .with_image(Blob::new(fixtures::png_image(10, 10)))
        .with_image(Blob::new(b"corrupt bytes".to_vec()))
        .with_image(Blob::new(fixtures::png_image(30, 30)));

    let record = harness
        .orchestrator
        .submit(input, &ProcessingOptions::default())
        .await;

    // The decode failure is a required step, so the item errors, but the
    // healthy siblings were still processed to completion.
    assert_eq!(record.status, InputStatus::Error);
    assert_eq!(record.content.images.len(), 2);
}

// =============================================================================
// Graceful Degradation Tests
// =============================================================================

#[tokio::test]
async fn test_failed_vision_analysis_degrades_to_warning() {
    let harness = TestHarness::new();
    harness
        .vision
        .set_next_error(intake_core::services::VisionError::ServiceUnavailable(
            "connection refused".to_string(),
        ))
        .await;

    let record = harness
        .orchestrator
        .submit(fixtures::image_input(16, 16), &ProcessingOptions::enable_all())
        .await;

    assert_eq!(record.status, InputStatus::Completed);
    assert!(record.content.images[0].features.is_none());
    assert!(record.content.images[0].extracted_text.is_some());
    assert_eq!(record.warnings.len(), 1);
    assert!(record.warnings[0].contains("Vision analysis failed"));
}

#[tokio::test]
async fn test_failed_document_extraction_leaves_item_completed() {
    let harness = TestHarness::new();
    harness
        .parser
        .set_next_error(intake_core::services::DocumentParserError::ParseError(
            "damaged xref table".to_string(),
        ))
        .await;

    let record = harness
        .orchestrator
        .submit(
            fixtures::document_input("body"),
            &ProcessingOptions::enable_all(),
        )
        .await;

    assert_eq!(record.status, InputStatus::Completed);
    let document = &record.content.documents[0];
    assert!(document.extracted_text.is_none());
    assert!(document.doc_metadata.is_none());
    assert!(document.structure.is_none());
    assert_eq!(record.warnings.len(), 1);
}

#[tokio::test]
async fn test_corrupt_audio_fails_item() {
    let harness = TestHarness::new();

    let record = harness
        .orchestrator
        .submit(
            MultiModalInput::new().with_audio(Blob::new(b"not audio".to_vec())),
            &ProcessingOptions::default(),
        )
        .await;

    assert_eq!(record.status, InputStatus::Error);
    assert!(record.error.as_deref().unwrap().contains("audio"));
}

#[tokio::test]
async fn test_language_detection_uses_transcripts() {
    let harness = TestHarness::new();
    harness.speech.set_transcript("meeting notes for tuesday").await;

    let record = harness
        .orchestrator
        .submit(fixtures::audio_input(0.5), &ProcessingOptions::enable_all())
        .await;

    assert_eq!(record.status, InputStatus::Completed);
    assert_eq!(record.metadata.language.as_deref(), Some("en-US"));
    // 0.5 base + 0.1 transcribed audio.
    assert!((record.metadata.confidence.unwrap() - 0.6).abs() < 1e-9);
}
