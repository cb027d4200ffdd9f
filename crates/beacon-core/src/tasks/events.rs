use std::sync::Arc;

use beacon_model::TaskEvent;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::EventError;
use crate::tasks::TaskResultStore;

/// Consumer-side event channel.
///
/// Typically bridges into the host application's event bus. A sink may be
/// temporarily detached (e.g. no consumer process alive); the emitter then
/// parks the payload in the result store instead.
pub trait TaskEventSink: Send + Sync {
    fn emit(&self, event: &TaskEvent) -> Result<(), EventError>;

    /// Whether a consumer is currently listening.
    fn is_attached(&self) -> bool {
        true
    }
}

const LAST_EVENT_KEY: &str = "lastEvent";

/// Emits task events, falling back to the result store.
///
/// Delivery is best effort and never surfaces an error to the emitting
/// task: a detached or failing sink downgrades the event to a stored
/// `lastEvent` record the consumer can poll for.
#[derive(Clone)]
pub struct TaskEventEmitter {
    results: TaskResultStore,
    sink: Option<Arc<dyn TaskEventSink>>,
}

impl TaskEventEmitter {
    pub fn new(results: TaskResultStore) -> Self {
        Self {
            results,
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn TaskEventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn emit(&self, task_id: &str, name: &str, payload: Value) {
        let event = TaskEvent::new(task_id, name, payload);

        match &self.sink {
            Some(sink) if sink.is_attached() => match sink.emit(&event) {
                Ok(()) => {
                    debug!(task = task_id, event = name, "event emitted");
                }
                Err(e) => {
                    warn!(task = task_id, event = name, error = %e, "event delivery failed, parking in result store");
                    self.park(&event);
                }
            },
            _ => {
                debug!(task = task_id, event = name, "no event consumer attached, parking in result store");
                self.park(&event);
            }
        }
    }

    fn park(&self, event: &TaskEvent) {
        self.results
            .save_value(&event.task_id, LAST_EVENT_KEY, event.payload.clone());
    }
}
