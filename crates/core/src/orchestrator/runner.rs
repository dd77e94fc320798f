//! Processing orchestrator implementation.
//!
//! Drives submissions through the state machine:
//! - Registration: record created pending, indexed, announced
//! - Dispatch: per-modality fan-out under the extraction semaphore
//! - Join: every sub-task settles before aggregation, failures never cancel
//!   siblings
//! - Terminal: completed, or error when a required step failed

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::{RwLock, Semaphore};
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::events::{EventBus, ListenerId, SubmissionListener, TransitionEvent};
use crate::metadata;
use crate::metrics;
use crate::processor::{
    AudioProcessor, DocumentProcessor, ImageProcessor, ProcessError, ProcessingOptions,
};
use crate::services::{BlobStore, DocumentParser, OcrService, SpeechToText, VisionAnalysis};
use crate::submission::{
    classify, InputStatus, MultiModalInput, ProcessedContent, ProcessedInput,
};

use super::config::OrchestratorConfig;
use super::types::{BatchOptions, OrchestratorStatus, QueueEntry};

/// The processing orchestrator.
///
/// Owns the id-to-record index exclusively; every other component and every
/// caller only ever sees snapshots. Constructed and torn down by its caller,
/// never a process-wide singleton.
pub struct ProcessingOrchestrator {
    config: OrchestratorConfig,
    image_processor: Arc<ImageProcessor>,
    audio_processor: Arc<AudioProcessor>,
    document_processor: Arc<DocumentProcessor>,
    events: Arc<EventBus>,
    records: Arc<RwLock<HashMap<Uuid, ProcessedInput>>>,
    // Bounds intra-submission fan-out, independent of batch concurrency.
    fanout_semaphore: Arc<Semaphore>,
}

impl ProcessingOrchestrator {
    /// Create an orchestrator backed by the given collaborators.
    pub fn new(
        config: OrchestratorConfig,
        vision: Arc<dyn VisionAnalysis>,
        ocr: Arc<dyn OcrService>,
        speech: Arc<dyn SpeechToText>,
        parser: Arc<dyn DocumentParser>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        let image_processor = Arc::new(ImageProcessor::new(vision, ocr, blobs));
        let audio_processor =
            Arc::new(AudioProcessor::new(speech).with_waveform_buckets(config.waveform_buckets));
        let document_processor = Arc::new(DocumentProcessor::new(parser));
        let fanout_semaphore = Arc::new(Semaphore::new(config.max_parallel_extractions.max(1)));

        Self {
            config,
            image_processor,
            audio_processor,
            document_processor,
            events: Arc::new(EventBus::new()),
            records: Arc::new(RwLock::new(HashMap::new())),
            fanout_semaphore,
        }
    }

    /// Replace the default processors. Intended for tests that substitute
    /// per-modality behavior wholesale.
    pub fn with_processors(
        mut self,
        image: Arc<ImageProcessor>,
        audio: Arc<AudioProcessor>,
        document: Arc<DocumentProcessor>,
    ) -> Self {
        self.image_processor = image;
        self.audio_processor = audio;
        self.document_processor = document;
        self
    }

    /// The event bus carrying lifecycle transitions.
    pub fn events(&self) -> Arc<EventBus> {
        Arc::clone(&self.events)
    }

    /// Register a lifecycle listener.
    pub fn subscribe(&self, listener: Arc<dyn SubmissionListener>) -> ListenerId {
        self.events.subscribe(listener)
    }

    /// Remove a lifecycle listener.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Batch options matching the configured default chunk size.
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions::with_max_concurrent(self.config.batch_max_concurrent)
    }

    /// Process one submission to a terminal state.
    ///
    /// Failures are captured in the returned record rather than surfaced as
    /// an `Err`; callers inspect `status` and `error`.
    pub async fn submit(
        &self,
        input: MultiModalInput,
        options: &ProcessingOptions,
    ) -> ProcessedInput {
        let id = self.register(Arc::new(input)).await;
        self.run(id, options).await
    }

    /// Process a batch of submissions.
    ///
    /// Every input is registered (and visible as pending) up-front, then
    /// chunks of `max_concurrent` run strictly in order with the items of a
    /// chunk running concurrently. The result always has one entry per
    /// input; per-item failures never abort siblings or the batch.
    pub async fn submit_batch(
        &self,
        inputs: Vec<MultiModalInput>,
        options: &ProcessingOptions,
        batch: &BatchOptions,
    ) -> Vec<ProcessedInput> {
        let max_concurrent = batch.max_concurrent.max(1);

        let mut ids = Vec::with_capacity(inputs.len());
        for input in inputs {
            ids.push(self.register(Arc::new(input)).await);
        }

        info!(
            count = ids.len(),
            max_concurrent, "Processing submission batch"
        );

        let mut results = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(max_concurrent) {
            // Chunk N+1 never starts before chunk N has fully settled.
            let chunk_results = join_all(chunk.iter().map(|id| self.run(*id, options))).await;
            results.extend(chunk_results);
        }
        results
    }

    /// Cancel a not-yet-dispatched submission.
    ///
    /// Succeeds only while the record is pending; once dispatched, a
    /// submission runs to completion or failure. Returns false for any other
    /// status or an unknown id.
    pub async fn cancel(&self, id: Uuid) -> bool {
        let mut records = self.records.write().await;
        let Some(record) = records.get_mut(&id) else {
            return false;
        };
        if record.status != InputStatus::Pending {
            return false;
        }

        record.status = InputStatus::Error;
        record.error = Some("Cancelled before dispatch".to_string());
        let snapshot = record.clone();
        self.events.publish(&TransitionEvent {
            timestamp: Utc::now(),
            previous: Some(InputStatus::Pending),
            snapshot,
        });
        metrics::SUBMISSIONS_TOTAL
            .with_label_values(&["cancelled"])
            .inc();

        info!(input_id = %id, "Submission cancelled before dispatch");
        true
    }

    /// Read-only view over the current index.
    pub async fn status(&self) -> OrchestratorStatus {
        let records = self.records.read().await;

        let queue = records
            .values()
            .map(|record| QueueEntry {
                id: record.id,
                input_type: record.input_type,
                status: record.status,
                submitted_at: record.submitted_at,
            })
            .collect();

        OrchestratorStatus {
            queue,
            is_processing: records
                .values()
                .any(|record| record.status == InputStatus::Processing),
            completed_count: records
                .values()
                .filter(|record| record.status == InputStatus::Completed)
                .count(),
            failed_count: records
                .values()
                .filter(|record| record.status == InputStatus::Error)
                .count(),
        }
    }

    /// Snapshot of one record.
    pub async fn get(&self, id: Uuid) -> Option<ProcessedInput> {
        self.records.read().await.get(&id).cloned()
    }

    /// Remove terminal records from the index. Returns how many were
    /// removed. Pending and processing records are never touched.
    pub async fn clear_finished(&self) -> usize {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| !record.status.is_terminal());
        before - records.len()
    }

    /// Create and index a pending record for a submission.
    async fn register(&self, source: Arc<MultiModalInput>) -> Uuid {
        let id = Uuid::new_v4();
        let record = ProcessedInput::new(id, classify(&source), source);
        let snapshot = record.clone();

        let mut records = self.records.write().await;
        records.insert(id, record);
        // Published under the index lock so listeners observe transitions in
        // mutation order.
        self.events.publish(&TransitionEvent {
            timestamp: Utc::now(),
            previous: None,
            snapshot,
        });
        drop(records);

        metrics::SUBMISSIONS_RECEIVED.inc();
        debug!(input_id = %id, "Submission registered");
        id
    }

    /// Drive one registered record to a terminal state.
    async fn run(&self, id: Uuid, options: &ProcessingOptions) -> ProcessedInput {
        let Some(source) = self.get(id).await.map(|record| Arc::clone(&record.source)) else {
            error!(input_id = %id, "Record vanished before dispatch");
            return orphan_record(id);
        };

        if source.is_empty() {
            let message = ProcessError::Validation("Submission has no content".to_string());
            return self
                .finish(id, ProcessedContent::default(), Vec::new(), Err(message.to_string()))
                .await;
        }

        // Cooperative cancellation checkpoint: only a still-pending record
        // is dispatched.
        if !self.transition(id, InputStatus::Processing).await {
            debug!(input_id = %id, "Skipping dispatch of non-pending record");
            return self.get(id).await.unwrap_or_else(|| orphan_record(id));
        }

        let started = Instant::now();
        let (content, warnings, failure) = self.dispatch(&source, options).await;

        let outcome = match failure {
            Some(message) => Err(message),
            None => {
                // Aggregation is plain local math; a panic here is the
                // "unexpected fault" that fails the item.
                match catch_unwind(AssertUnwindSafe(|| metadata::aggregate(&source, &content))) {
                    Ok(mut computed) => {
                        computed.processing_time_ms = Some(started.elapsed().as_millis() as u64);
                        Ok(computed)
                    }
                    Err(_) => Err(ProcessError::Aggregation(
                        "Panic while composing metadata".to_string(),
                    )
                    .to_string()),
                }
            }
        };

        metrics::PROCESSING_DURATION.observe(started.elapsed().as_secs_f64());
        self.finish(id, content, warnings, outcome).await
    }

    /// Fan out all present modalities, join every sub-task, and collect the
    /// per-item outcomes.
    async fn dispatch(
        &self,
        source: &Arc<MultiModalInput>,
        options: &ProcessingOptions,
    ) -> (ProcessedContent, Vec<String>, Option<String>) {
        let mut image_tasks = Vec::with_capacity(source.images.len());
        for blob in source.images.iter().cloned() {
            let processor = Arc::clone(&self.image_processor);
            let semaphore = Arc::clone(&self.fanout_semaphore);
            let options = options.clone();
            image_tasks.push(tokio::spawn(async move {
                // The semaphore is never closed, so acquisition only fails
                // if the runtime is tearing down.
                let _permit = semaphore.acquire_owned().await.ok();
                processor.process(&blob, &options).await
            }));
        }

        let mut document_tasks = Vec::with_capacity(source.documents.len());
        for blob in source.documents.iter().cloned() {
            let processor = Arc::clone(&self.document_processor);
            let semaphore = Arc::clone(&self.fanout_semaphore);
            let options = options.clone();
            document_tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                processor.process(&blob, &options).await
            }));
        }

        let audio_task = source.audio.clone().map(|blob| {
            let processor = Arc::clone(&self.audio_processor);
            let options = options.clone();
            tokio::spawn(async move { processor.process(&blob, &options).await })
        });

        // Join barrier: every dispatched sub-task settles, success or
        // failure, before anything is aggregated. No sibling is cancelled
        // when another fails.
        let image_results = join_all(image_tasks).await;
        let document_results = join_all(document_tasks).await;
        let audio_result = match audio_task {
            Some(task) => Some(task.await),
            None => None,
        };

        let mut content = ProcessedContent {
            text: source.text.clone().filter(|text| !text.is_empty()),
            ..ProcessedContent::default()
        };
        let mut warnings = Vec::new();
        let mut failure: Option<String> = None;

        for joined in image_results {
            match settle(joined, "image") {
                Ok((image, mut item_warnings)) => {
                    metrics::MODALITY_ITEMS
                        .with_label_values(&["image", "success"])
                        .inc();
                    content.images.push(image);
                    warnings.append(&mut item_warnings);
                }
                Err(message) => {
                    metrics::MODALITY_ITEMS
                        .with_label_values(&["image", "failed"])
                        .inc();
                    warn!(error = %message, "Image item failed");
                    failure.get_or_insert(message);
                }
            }
        }

        if let Some(joined) = audio_result {
            match settle(joined, "audio") {
                Ok((audio, mut item_warnings)) => {
                    metrics::MODALITY_ITEMS
                        .with_label_values(&["audio", "success"])
                        .inc();
                    content.audio = Some(audio);
                    warnings.append(&mut item_warnings);
                }
                Err(message) => {
                    metrics::MODALITY_ITEMS
                        .with_label_values(&["audio", "failed"])
                        .inc();
                    warn!(error = %message, "Audio item failed");
                    failure.get_or_insert(message);
                }
            }
        }

        for joined in document_results {
            match settle(joined, "document") {
                Ok((document, mut item_warnings)) => {
                    metrics::MODALITY_ITEMS
                        .with_label_values(&["document", "success"])
                        .inc();
                    content.documents.push(document);
                    warnings.append(&mut item_warnings);
                }
                Err(message) => {
                    metrics::MODALITY_ITEMS
                        .with_label_values(&["document", "failed"])
                        .inc();
                    warn!(error = %message, "Document item failed");
                    failure.get_or_insert(message);
                }
            }
        }

        (content, warnings, failure)
    }

    /// Apply a non-terminal transition. Returns false when the record is
    /// missing or the transition is illegal.
    async fn transition(&self, id: Uuid, next: InputStatus) -> bool {
        let mut records = self.records.write().await;
        let Some(record) = records.get_mut(&id) else {
            return false;
        };
        if !record.status.can_transition_to(next) {
            return false;
        }

        let previous = record.status;
        record.status = next;
        let snapshot = record.clone();
        self.events.publish(&TransitionEvent {
            timestamp: Utc::now(),
            previous: Some(previous),
            snapshot,
        });
        true
    }

    /// Store results and apply the terminal transition.
    async fn finish(
        &self,
        id: Uuid,
        content: ProcessedContent,
        warnings: Vec<String>,
        outcome: Result<crate::submission::InputMetadata, String>,
    ) -> ProcessedInput {
        let next = match &outcome {
            Ok(_) => InputStatus::Completed,
            Err(_) => InputStatus::Error,
        };

        let mut records = self.records.write().await;
        let Some(record) = records.get_mut(&id) else {
            error!(input_id = %id, "Record vanished before terminal transition");
            return orphan_record(id);
        };
        if !record.status.can_transition_to(next) {
            // The record reached a terminal state some other way (e.g., a
            // cancellation racing the validation path). Terminal states are
            // frozen, so keep what is there.
            warn!(
                input_id = %id,
                from = record.status.as_str(),
                to = next.as_str(),
                "Ignoring illegal terminal transition"
            );
            return record.clone();
        }

        let previous = record.status;
        record.content = content;
        record.warnings = warnings;
        match outcome {
            Ok(computed) => {
                record.metadata = computed;
                record.status = InputStatus::Completed;
                record.error = None;
            }
            Err(message) => {
                record.status = InputStatus::Error;
                record.error = Some(message);
            }
        }

        let snapshot = record.clone();
        self.events.publish(&TransitionEvent {
            timestamp: Utc::now(),
            previous: Some(previous),
            snapshot: snapshot.clone(),
        });
        drop(records);

        metrics::SUBMISSIONS_TOTAL
            .with_label_values(&[snapshot.status.as_str()])
            .inc();

        match snapshot.status {
            InputStatus::Completed => {
                info!(
                    input_id = %id,
                    input_type = snapshot.input_type.as_str(),
                    warnings = snapshot.warnings.len(),
                    "Submission completed"
                );
            }
            _ => {
                warn!(
                    input_id = %id,
                    error = snapshot.error.as_deref().unwrap_or("unknown"),
                    "Submission failed"
                );
            }
        }

        snapshot
    }
}

/// Flatten a joined task result into the item outcome, folding panics into
/// item failures.
fn settle<T>(
    joined: Result<Result<(T, Vec<String>), ProcessError>, JoinError>,
    modality: &'static str,
) -> Result<(T, Vec<String>), String> {
    match joined {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("{} task panicked", modality)),
    }
}

/// Placeholder returned on the unreachable record-vanished paths.
fn orphan_record(id: Uuid) -> ProcessedInput {
    let mut record = ProcessedInput::new(
        id,
        crate::submission::InputType::Mixed,
        Arc::new(MultiModalInput::new()),
    );
    record.status = InputStatus::Error;
    record.error = Some("Record missing from index".to_string());
    record
}
