use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{Map, Value};
use tracing::{error, warn};

use crate::store::ConfigStore;

const RESULT_PREFIX: &str = "result/";
const TIMESTAMP_KEY: &str = "timestamp";

/// Per-task result records, left behind for a consumer that polls later.
///
/// Each task owns one JSON object in the store; writes merge a key into it
/// (or replace it wholesale) and refresh its `timestamp`. Store failures
/// are logged and swallowed so a result write can never break a task.
#[derive(Clone)]
pub struct TaskResultStore {
    store: Arc<dyn ConfigStore>,
}

impl TaskResultStore {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    /// Merges one key/value into the task's result object.
    pub fn save_value(&self, task_id: &str, key: &str, value: Value) {
        let mut object = self
            .get(task_id)
            .and_then(|v| v.as_object().cloned())
            .unwrap_or_default();
        object.insert(key.to_string(), value);
        self.write(task_id, object);
    }

    /// Replaces the task's whole result object.
    pub fn save(&self, task_id: &str, data: Value) {
        let Value::Object(object) = data else {
            error!(task = task_id, "task result must be a JSON object");
            return;
        };
        self.write(task_id, object);
    }

    pub fn get(&self, task_id: &str) -> Option<Value> {
        let record = match self.store.get(&key_for(task_id)) {
            Ok(record) => record?,
            Err(e) => {
                warn!(task = task_id, error = %e, "failed to read task result");
                return None;
            }
        };
        match serde_json::from_str(&record) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(task = task_id, error = %e, "corrupt task result record");
                None
            }
        }
    }

    pub fn clear(&self, task_id: &str) {
        if let Err(e) = self.store.remove(&key_for(task_id)) {
            warn!(task = task_id, error = %e, "failed to clear task result");
        }
    }

    /// Removes every task result, leaving other record families untouched.
    pub fn clear_all(&self) {
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "failed to enumerate task results");
                return;
            }
        };
        for key in keys.iter().filter(|k| k.starts_with(RESULT_PREFIX)) {
            if let Err(e) = self.store.remove(key) {
                warn!(key, error = %e, "failed to remove task result");
            }
        }
    }

    fn write(&self, task_id: &str, mut object: Map<String, Value>) {
        object.insert(TIMESTAMP_KEY.to_string(), Value::from(now_ms()));
        let record = Value::Object(object).to_string();
        if let Err(e) = self.store.put(&key_for(task_id), &record) {
            error!(task = task_id, error = %e, "failed to persist task result");
        }
    }
}

fn key_for(task_id: &str) -> String {
    format!("{RESULT_PREFIX}{task_id}")
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
