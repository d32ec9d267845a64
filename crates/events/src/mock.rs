//! Mock Event Publisher
//!
//! Records events in memory for test assertions; can be switched into a
//! failing mode to exercise publish errors after committed writes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::{DomainEvent, EventError, EventPublisher};

#[derive(Debug, Clone, Default)]
pub struct MockEventPublisher {
    events: Arc<Mutex<Vec<DomainEvent>>>,
    failing: Arc<AtomicBool>,
}

impl MockEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent publishes fail (`true`) or succeed (`false`).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Return all recorded events, in publish order.
    pub fn recorded_events(&self) -> Vec<DomainEvent> {
        self.events
            .lock()
            .expect("events lock poisoned")
            .clone()
    }

    /// Clear all recorded events.
    pub fn reset(&self) {
        self.events.lock().expect("events lock poisoned").clear();
    }
}

#[async_trait::async_trait]
impl EventPublisher for MockEventPublisher {
    async fn publish(&self, event: DomainEvent) -> Result<(), EventError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EventError::Request(format!(
                "mock publisher rejected {}",
                event.name()
            )));
        }

        tracing::debug!(event_name = %event.name(), "Mock publisher: recording event");
        self.events
            .lock()
            .map_err(|e| EventError::Request(format!("events lock poisoned: {e}")))?
            .push(event);
        Ok(())
    }
}
