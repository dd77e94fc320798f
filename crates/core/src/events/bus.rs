//! Typed publish/subscribe bus for lifecycle transitions.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use super::types::TransitionEvent;

/// A consumer of lifecycle transitions.
///
/// Delivery is synchronous on the publishing task, so implementations should
/// return quickly and must not call back into the orchestrator.
pub trait SubmissionListener: Send + Sync {
    /// Called on every status transition of any record.
    fn on_transition(&self, event: &TransitionEvent);
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Publish/subscribe bus for submission lifecycle transitions.
///
/// Every registered listener is notified synchronously on each transition. A
/// listener that panics is caught and logged; it never aborts the transition
/// or affects other listeners. An optional channel tap forwards events to
/// async consumers without blocking the publisher.
#[derive(Default)]
pub struct EventBus {
    listeners: Mutex<Vec<(ListenerId, Arc<dyn SubmissionListener>)>>,
    tap: Mutex<Option<mpsc::Sender<TransitionEvent>>>,
    next_id: AtomicU64,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Returns an id for [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe(&self, listener: Arc<dyn SubmissionListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .expect("listener list poisoned")
            .push((id, listener));
        id
    }

    /// Remove a listener. Returns false for an unknown id.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock().expect("listener list poisoned");
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    /// Attach a channel tap receiving every event.
    ///
    /// Events are forwarded with `try_send`: a full channel drops the event
    /// with a warning, a closed channel detaches the tap.
    pub fn attach_tap(&self, sender: mpsc::Sender<TransitionEvent>) {
        *self.tap.lock().expect("tap poisoned") = Some(sender);
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().expect("listener list poisoned").len()
    }

    /// Deliver an event to every listener and the tap.
    pub fn publish(&self, event: &TransitionEvent) {
        let listeners: Vec<Arc<dyn SubmissionListener>> = self
            .listeners
            .lock()
            .expect("listener list poisoned")
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            let result = catch_unwind(AssertUnwindSafe(|| listener.on_transition(event)));
            if result.is_err() {
                error!(
                    input_id = %event.snapshot.id,
                    status = event.snapshot.status.as_str(),
                    "Submission listener panicked; continuing with remaining listeners"
                );
            }
        }

        let mut tap = self.tap.lock().expect("tap poisoned");
        if let Some(sender) = tap.as_ref() {
            match sender.try_send(event.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(input_id = %event.snapshot.id, "Event tap full, dropping event");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!("Event tap closed, detaching");
                    *tap = None;
                }
            }
        }
    }
}
