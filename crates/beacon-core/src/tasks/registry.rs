use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use beacon_model::{IntervalMs, TaskConfig, TaskId};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::metrics::{MetricsBackend, NoopMetrics, TaskOutcome};
use crate::store::TaskConfigStore;
use crate::tasks::{BackgroundTask, TaskContext, TaskEventEmitter, TaskResultStore};

/// Smallest accepted schedule period.
pub const MIN_TASK_INTERVAL_MS: IntervalMs = 1_000;

struct TaskEntry {
    task: Arc<dyn BackgroundTask>,
    ctx: TaskContext,
    token: CancellationToken,
    interval_ms: IntervalMs,
}

/// Live map of registered periodic tasks.
///
/// Each task id owns exactly one timer line on the shared runtime:
/// executions within an id are strictly ordered and never overlap, while
/// different ids run concurrently. Registering an existing id replaces it
/// (cancel, unregistration hook, config removal) before the new schedule
/// is installed.
pub struct TaskRegistry {
    entries: Arc<RwLock<HashMap<TaskId, TaskEntry>>>,
    configs: TaskConfigStore,
    results: TaskResultStore,
    events: TaskEventEmitter,
    metrics: Arc<dyn MetricsBackend>,
    min_interval_ms: IntervalMs,
}

impl TaskRegistry {
    pub fn new(configs: TaskConfigStore, results: TaskResultStore, events: TaskEventEmitter) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            configs,
            results,
            events,
            metrics: Arc::new(NoopMetrics),
            min_interval_ms: MIN_TASK_INTERVAL_MS,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsBackend>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Overrides the minimum accepted interval.
    pub fn with_min_interval(mut self, min_interval_ms: IntervalMs) -> Self {
        self.min_interval_ms = min_interval_ms;
        self
    }

    /// Installs a fixed-rate schedule for `task` under `task_id`.
    ///
    /// The first execution fires immediately, subsequent ones every
    /// `interval_ms`. An existing registration under the same id is fully
    /// torn down first. Returns `false` only for invalid parameters.
    pub async fn register(
        &self,
        task_id: &str,
        task: Arc<dyn BackgroundTask>,
        interval_ms: IntervalMs,
    ) -> bool {
        if task_id.is_empty() || interval_ms < self.min_interval_ms {
            error!(
                task = task_id,
                interval_ms, "invalid task registration parameters"
            );
            return false;
        }

        self.unregister(task_id).await;

        let token = CancellationToken::new();
        let ctx = TaskContext::new(task_id, self.results.clone(), self.events.clone());
        {
            let mut entries = self.entries.write().unwrap();
            entries.insert(
                task_id.to_string(),
                TaskEntry {
                    task: task.clone(),
                    ctx: ctx.clone(),
                    token: token.clone(),
                    interval_ms,
                },
            );
        }

        tokio::spawn(run_task_loop(
            task.clone(),
            ctx.clone(),
            token,
            Duration::from_millis(interval_ms),
            self.metrics.clone(),
        ));

        let config = TaskConfig::new(task_id, task.kind(), interval_ms);
        if let Err(e) = self.configs.put(&config) {
            warn!(task = task_id, error = %e, "failed to persist task config");
        }

        if let Err(e) = task.on_registered(&ctx).await {
            warn!(task = task_id, error = %e, "registration hook failed");
        }

        info!(task = task_id, interval_ms, "task registered");
        true
    }

    /// Cancels the schedule and removes the record and persisted config.
    ///
    /// Cancellation is non-blocking: an execution already in flight is
    /// allowed to finish. Idempotent; returns `true` for unknown ids too.
    pub async fn unregister(&self, task_id: &str) -> bool {
        let entry = {
            let mut entries = self.entries.write().unwrap();
            entries.remove(task_id)
        };

        if let Some(entry) = entry {
            entry.token.cancel();
            info!(task = task_id, "task schedule cancelled");

            if let Err(e) = entry.task.on_unregistered(&entry.ctx).await {
                warn!(task = task_id, error = %e, "unregistration hook failed");
            }
        }

        if let Err(e) = self.configs.remove(task_id) {
            warn!(task = task_id, error = %e, "failed to remove persisted task config");
        }
        true
    }

    pub fn is_registered(&self, task_id: &str) -> bool {
        let entries = self.entries.read().unwrap();
        entries.contains_key(task_id)
    }

    /// Interval of the live schedule, if any.
    pub fn registered_interval(&self, task_id: &str) -> Option<IntervalMs> {
        let entries = self.entries.read().unwrap();
        entries.get(task_id).map(|entry| entry.interval_ms)
    }

    pub fn registered_ids(&self) -> Vec<TaskId> {
        let entries = self.entries.read().unwrap();
        entries.keys().cloned().collect()
    }

    /// Unregisters every task. Does not wait for in-flight executions.
    pub async fn stop_all(&self) {
        for task_id in self.registered_ids() {
            self.unregister(&task_id).await;
        }
        info!("all tasks stopped");
    }

    /// Persisted schedules, for the recovery pass.
    pub fn persisted_configs(&self) -> Vec<TaskConfig> {
        self.configs.all()
    }
}

async fn run_task_loop(
    task: Arc<dyn BackgroundTask>,
    ctx: TaskContext,
    token: CancellationToken,
    period: Duration,
    metrics: Arc<dyn MetricsBackend>,
) {
    let mut ticker = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                // The execution is not raced against cancellation: a cancel
                // arriving mid-flight takes effect on the next loop turn.
                let started = Instant::now();
                match task.execute(&ctx).await {
                    Ok(()) => {
                        metrics.task_executed(task.kind(), TaskOutcome::Success, started.elapsed());
                        debug!(task = ctx.task_id(), "task executed");
                    }
                    Err(e) => {
                        metrics.task_executed(task.kind(), TaskOutcome::Failure, started.elapsed());
                        error!(task = ctx.task_id(), error = %e, "task execution failed");
                    }
                }
            }
        }
    }
    debug!(task = ctx.task_id(), "task schedule stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn registry() -> TaskRegistry {
        let store = Arc::new(MemoryStore::new());
        let results = TaskResultStore::new(store.clone());
        let events = TaskEventEmitter::new(results.clone());
        TaskRegistry::new(TaskConfigStore::new(store), results, events)
    }

    struct CountingTask {
        name: &'static str,
        executions: Arc<AtomicUsize>,
        fail: bool,
        hooks: Arc<Mutex<Vec<String>>>,
    }

    impl CountingTask {
        fn new(executions: Arc<AtomicUsize>) -> Self {
            Self {
                name: "counting",
                executions,
                fail: false,
                hooks: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn failing(executions: Arc<AtomicUsize>) -> Self {
            Self {
                fail: true,
                ..Self::new(executions)
            }
        }

        fn hooked(name: &'static str, hooks: Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                name,
                executions: Arc::new(AtomicUsize::new(0)),
                fail: false,
                hooks,
            }
        }
    }

    #[async_trait]
    impl BackgroundTask for CountingTask {
        fn kind(&self) -> &str {
            "counting"
        }

        async fn execute(&self, _ctx: &TaskContext) -> Result<(), TaskError> {
            self.executions.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(TaskError::fail("intentional"));
            }
            Ok(())
        }

        async fn on_registered(&self, _ctx: &TaskContext) -> Result<(), TaskError> {
            self.hooks
                .lock()
                .unwrap()
                .push(format!("{}.registered", self.name));
            Ok(())
        }

        async fn on_unregistered(&self, _ctx: &TaskContext) -> Result<(), TaskError> {
            self.hooks
                .lock()
                .unwrap()
                .push(format!("{}.unregistered", self.name));
            Ok(())
        }
    }

    #[tokio::test]
    async fn rejects_invalid_parameters() {
        let registry = registry();
        let executions = Arc::new(AtomicUsize::new(0));

        assert!(
            !registry
                .register("", Arc::new(CountingTask::new(executions.clone())), 2_000)
                .await
        );
        assert!(
            !registry
                .register("t", Arc::new(CountingTask::new(executions)), 500)
                .await
        );
        assert!(!registry.is_registered("t"));
        assert!(registry.persisted_configs().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn executes_immediately_and_repeatedly() {
        let registry = registry();
        let executions = Arc::new(AtomicUsize::new(0));

        assert!(
            registry
                .register("tick", Arc::new(CountingTask::new(executions.clone())), 1_000)
                .await
        );
        assert!(registry.is_registered("tick"));

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert!(executions.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_execution_keeps_the_schedule() {
        let registry = registry();
        let executions = Arc::new(AtomicUsize::new(0));

        registry
            .register("flaky", Arc::new(CountingTask::failing(executions.clone())), 1_000)
            .await;

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert!(executions.load(Ordering::SeqCst) >= 2);
        assert!(registry.is_registered("flaky"));
    }

    #[tokio::test(start_paused = true)]
    async fn unregister_stops_future_firings() {
        let registry = registry();
        let executions = Arc::new(AtomicUsize::new(0));

        registry
            .register("tick", Arc::new(CountingTask::new(executions.clone())), 1_000)
            .await;
        tokio::time::sleep(Duration::from_millis(1_500)).await;

        assert!(registry.unregister("tick").await);
        assert!(!registry.is_registered("tick"));

        let before = executions.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(3_000)).await;
        assert_eq!(executions.load(Ordering::SeqCst), before);
    }

    #[tokio::test]
    async fn unregister_unknown_id_is_idempotent() {
        let registry = registry();
        assert!(registry.unregister("never-seen").await);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_register_replaces_the_schedule() {
        let registry = registry();
        let hooks = Arc::new(Mutex::new(Vec::new()));

        registry
            .register("job", Arc::new(CountingTask::hooked("first", hooks.clone())), 1_000)
            .await;
        registry
            .register("job", Arc::new(CountingTask::hooked("second", hooks.clone())), 5_000)
            .await;

        assert_eq!(registry.registered_ids().len(), 1);
        assert_eq!(registry.registered_interval("job"), Some(5_000));

        let configs = registry.persisted_configs();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].interval_ms, 5_000);

        assert_eq!(
            hooks.lock().unwrap().clone(),
            vec!["first.registered", "first.unregistered", "second.registered"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stop_all_clears_everything() {
        let registry = registry();
        let executions = Arc::new(AtomicUsize::new(0));

        registry
            .register("a", Arc::new(CountingTask::new(executions.clone())), 1_000)
            .await;
        registry
            .register("b", Arc::new(CountingTask::new(executions.clone())), 2_000)
            .await;

        registry.stop_all().await;

        assert!(!registry.is_registered("a"));
        assert!(!registry.is_registered("b"));
        assert!(registry.persisted_configs().is_empty());
    }

    #[tokio::test]
    async fn register_persists_the_schedule() {
        let registry = registry().with_min_interval(1_000);
        let executions = Arc::new(AtomicUsize::new(0));

        registry
            .register("sync", Arc::new(CountingTask::new(executions)), 2_000)
            .await;

        let configs = registry.persisted_configs();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0], TaskConfig::new("sync", "counting", 2_000));
    }
}
