use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{info, trace, warn};

use crate::error::ResolveError;
use crate::tasks::{BackgroundTask, TaskRegistry};

type TaskFactory = Box<dyn Fn() -> Arc<dyn BackgroundTask> + Send + Sync>;

/// Map from persisted task kinds to constructors.
///
/// Populated once at process startup; recovery resolves each persisted
/// config's kind through it instead of any runtime reflection.
#[derive(Default)]
pub struct TaskResolver {
    factories: RwLock<HashMap<String, TaskFactory>>,
}

impl TaskResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory for a kind, replacing any previous one.
    pub fn register<F>(&self, kind: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn BackgroundTask> + Send + Sync + 'static,
    {
        let kind = kind.into();
        let mut factories = self.factories.write().unwrap();
        trace!(kind, "task factory registered");
        factories.insert(kind, Box::new(factory));
    }

    pub fn resolve(&self, kind: &str) -> Result<Arc<dyn BackgroundTask>, ResolveError> {
        let factories = self.factories.read().unwrap();
        factories
            .get(kind)
            .map(|factory| factory())
            .ok_or_else(|| ResolveError::UnknownKind(kind.to_string()))
    }

    pub fn contains(&self, kind: &str) -> bool {
        let factories = self.factories.read().unwrap();
        factories.contains_key(kind)
    }

    pub fn kinds(&self) -> Vec<String> {
        let factories = self.factories.read().unwrap();
        factories.keys().cloned().collect()
    }
}

/// Rebuilds schedules from persisted configs after a process restart.
///
/// Records whose kind cannot be resolved are logged and skipped; the batch
/// never aborts. Returns how many tasks came back.
pub async fn restore_tasks(registry: &TaskRegistry, resolver: &TaskResolver) -> usize {
    let mut restored = 0;

    for config in registry.persisted_configs() {
        match resolver.resolve(&config.kind) {
            Ok(task) => {
                if registry
                    .register(&config.task_id, task, config.interval_ms)
                    .await
                {
                    info!(task = %config.task_id, kind = %config.kind, "task restored");
                    restored += 1;
                }
            }
            Err(e) => {
                warn!(task = %config.task_id, error = %e, "skipping unrestorable task");
            }
        }
    }

    restored
}
