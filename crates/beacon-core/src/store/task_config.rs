use std::sync::Arc;

use beacon_model::TaskConfig;
use tracing::warn;

use crate::error::StoreError;
use crate::store::ConfigStore;

const TASK_PREFIX: &str = "task/";

/// Persisted task schedules, one JSON record per registered task.
///
/// Records are written on register, removed on unregister and enumerated
/// by the recovery pass after a process restart.
#[derive(Clone)]
pub struct TaskConfigStore {
    store: Arc<dyn ConfigStore>,
}

impl TaskConfigStore {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    pub fn put(&self, config: &TaskConfig) -> Result<(), StoreError> {
        let record =
            serde_json::to_string(config).map_err(|e| StoreError::Serialize(e.to_string()))?;
        self.store.put(&key_for(&config.task_id), &record)
    }

    pub fn get(&self, task_id: &str) -> Option<TaskConfig> {
        let record = match self.store.get(&key_for(task_id)) {
            Ok(record) => record?,
            Err(e) => {
                warn!(task = task_id, error = %e, "failed to read task config");
                return None;
            }
        };
        decode(task_id, &record)
    }

    pub fn remove(&self, task_id: &str) -> Result<(), StoreError> {
        self.store.remove(&key_for(task_id))
    }

    /// Every readable record; corrupt entries are logged and skipped.
    pub fn all(&self) -> Vec<TaskConfig> {
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "failed to enumerate task configs");
                return Vec::new();
            }
        };

        keys.iter()
            .filter(|key| key.starts_with(TASK_PREFIX))
            .filter_map(|key| {
                let task_id = &key[TASK_PREFIX.len()..];
                match self.store.get(key) {
                    Ok(Some(record)) => decode(task_id, &record),
                    Ok(None) => None,
                    Err(e) => {
                        warn!(task = task_id, error = %e, "failed to read task config");
                        None
                    }
                }
            })
            .collect()
    }
}

fn key_for(task_id: &str) -> String {
    format!("{TASK_PREFIX}{task_id}")
}

fn decode(task_id: &str, record: &str) -> Option<TaskConfig> {
    match serde_json::from_str(record) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(task = task_id, error = %e, "corrupt task config record, skipping");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn store() -> TaskConfigStore {
        TaskConfigStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn put_get_remove_roundtrip() {
        let configs = store();
        let config = TaskConfig::new("sync", "position_sync", 5_000);

        configs.put(&config).unwrap();
        assert_eq!(configs.get("sync"), Some(config));

        configs.remove("sync").unwrap();
        assert_eq!(configs.get("sync"), None);
    }

    #[test]
    fn all_lists_only_task_records() {
        let backing = Arc::new(MemoryStore::new());
        backing.put("session/current", "{}").unwrap();

        let configs = TaskConfigStore::new(backing);
        configs.put(&TaskConfig::new("a", "kind_a", 2_000)).unwrap();
        configs.put(&TaskConfig::new("b", "kind_b", 5_000)).unwrap();

        let mut all = configs.all();
        all.sort_by(|x, y| x.task_id.cmp(&y.task_id));
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].task_id, "a");
        assert_eq!(all[1].kind, "kind_b");
    }

    #[test]
    fn corrupt_record_is_skipped() {
        let backing = Arc::new(MemoryStore::new());
        backing.put("task/broken", "not json").unwrap();

        let configs = TaskConfigStore::new(backing);
        configs.put(&TaskConfig::new("ok", "kind_ok", 1_500)).unwrap();

        let all = configs.all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].task_id, "ok");
        assert_eq!(configs.get("broken"), None);
    }
}
