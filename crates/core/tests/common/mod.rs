//! Shared harness for orchestrator integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use uuid::Uuid;

use intake_core::services::InMemoryBlobStore;
use intake_core::testing::{
    MockDocumentParser, MockOcrService, MockSpeechToText, MockVisionAnalysis,
};
use intake_core::{
    InputStatus, OrchestratorConfig, ProcessingOrchestrator, SubmissionListener, TransitionEvent,
};

/// Orchestrator wired to mock collaborators, with handles kept for
/// configuring and asserting against the mocks.
pub struct TestHarness {
    pub orchestrator: Arc<ProcessingOrchestrator>,
    pub vision: Arc<MockVisionAnalysis>,
    pub ocr: Arc<MockOcrService>,
    pub speech: Arc<MockSpeechToText>,
    pub parser: Arc<MockDocumentParser>,
    pub blobs: Arc<InMemoryBlobStore>,
    pub listener: Arc<RecordingListener>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(OrchestratorConfig::default())
    }

    pub fn with_config(config: OrchestratorConfig) -> Self {
        let vision = Arc::new(MockVisionAnalysis::new());
        let ocr = Arc::new(MockOcrService::new());
        let speech = Arc::new(MockSpeechToText::new());
        let parser = Arc::new(MockDocumentParser::new());
        let blobs = Arc::new(InMemoryBlobStore::new());

        let orchestrator = Arc::new(ProcessingOrchestrator::new(
            config,
            vision.clone(),
            ocr.clone(),
            speech.clone(),
            parser.clone(),
            blobs.clone(),
        ));

        let listener = RecordingListener::new();
        orchestrator.subscribe(listener.clone());

        Self {
            orchestrator,
            vision,
            ocr,
            speech,
            parser,
            blobs,
            listener,
        }
    }
}

/// One observed lifecycle transition.
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    pub id: Uuid,
    pub previous: Option<InputStatus>,
    pub status: InputStatus,
}

/// Listener that records every transition in delivery order.
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Record ids in the order their pending events arrived.
    pub fn ids_in_registration_order(&self) -> Vec<Uuid> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.status == InputStatus::Pending)
            .map(|event| event.id)
            .collect()
    }

    /// Status sequence observed for one record.
    pub fn statuses_for(&self, id: Uuid) -> Vec<InputStatus> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.id == id)
            .map(|event| event.status)
            .collect()
    }

    /// Replay the event log and return the peak number of records that were
    /// simultaneously in the processing state.
    pub fn max_concurrent_processing(&self) -> usize {
        let mut current = 0usize;
        let mut max = 0usize;
        for event in self.events.lock().unwrap().iter() {
            match event.status {
                InputStatus::Processing => {
                    current += 1;
                    max = max.max(current);
                }
                status if status.is_terminal() => {
                    if event.previous == Some(InputStatus::Processing) {
                        current -= 1;
                    }
                }
                _ => {}
            }
        }
        max
    }

    /// Wait until at least one record has entered the processing state.
    pub async fn wait_for_processing(&self) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let seen = self
                .events
                .lock()
                .unwrap()
                .iter()
                .any(|event| event.status == InputStatus::Processing);
            if seen {
                return;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out waiting for a processing transition"
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

impl SubmissionListener for RecordingListener {
    fn on_transition(&self, event: &TransitionEvent) {
        self.events.lock().unwrap().push(RecordedEvent {
            id: event.snapshot.id,
            previous: event.previous,
            status: event.snapshot.status,
        });
    }
}
