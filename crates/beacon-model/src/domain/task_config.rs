use serde::{Deserialize, Serialize};

use crate::{IntervalMs, TaskId};

/// Persisted schedule of one registered task.
///
/// Written on register, removed on unregister, and replayed after a process
/// restart to rebuild the in-memory schedule. `kind` names the task
/// implementation in the resolver's factory map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskConfig {
    pub task_id: TaskId,
    pub kind: String,
    pub interval_ms: IntervalMs,
}

impl TaskConfig {
    pub fn new(task_id: impl Into<TaskId>, kind: impl Into<String>, interval_ms: IntervalMs) -> Self {
        Self {
            task_id: task_id.into(),
            kind: kind.into(),
            interval_ms,
        }
    }
}
