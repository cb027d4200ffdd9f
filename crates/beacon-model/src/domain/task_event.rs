use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::TaskId;

/// Event produced by a task execution, delivered to an attached sink or
/// parked in the result store when no consumer is listening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEvent {
    pub task_id: TaskId,
    /// Event name, e.g. `"taskEvent"` or `"heartbeat"`.
    pub name: String,
    pub payload: Value,
    /// Unix timestamp in milliseconds, stamped at construction.
    pub timestamp_ms: u64,
}

impl TaskEvent {
    pub fn new(task_id: impl Into<TaskId>, name: impl Into<String>, payload: Value) -> Self {
        Self {
            task_id: task_id.into(),
            name: name.into(),
            payload,
            timestamp_ms: now_ms(),
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_is_stamped() {
        let event = TaskEvent::new("heartbeat", "heartbeat", json!({"elapsedSeconds": 12}));
        assert!(event.timestamp_ms > 0);
        assert_eq!(event.name, "heartbeat");
    }

    #[test]
    fn serde_roundtrip() {
        let event = TaskEvent::new("sync", "taskEvent", json!({"ok": true}));
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""taskId":"sync""#));

        let back: TaskEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
