use async_trait::async_trait;
use beacon_model::TaskId;

use crate::error::TaskError;
use crate::tasks::{TaskEventEmitter, TaskResultStore};

/// Everything a task execution may touch.
///
/// Handed to every hook and execution of one registered task; carries the
/// task's id plus handles for leaving results behind and emitting events.
#[derive(Clone)]
pub struct TaskContext {
    task_id: TaskId,
    results: TaskResultStore,
    events: TaskEventEmitter,
}

impl TaskContext {
    pub fn new(task_id: impl Into<TaskId>, results: TaskResultStore, events: TaskEventEmitter) -> Self {
        Self {
            task_id: task_id.into(),
            results,
            events,
        }
    }

    #[inline]
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    #[inline]
    pub fn results(&self) -> &TaskResultStore {
        &self.results
    }

    #[inline]
    pub fn events(&self) -> &TaskEventEmitter {
        &self.events
    }
}

/// A unit of repeating background work.
///
/// Implementations are registered under a unique task id and invoked at a
/// fixed interval. An `Err` from [`BackgroundTask::execute`] is logged and
/// isolated; the schedule keeps firing.
#[async_trait]
pub trait BackgroundTask: Send + Sync {
    /// Implementation identifier persisted with the schedule and used by
    /// the resolver to reconstruct the task after a restart.
    fn kind(&self) -> &str;

    /// One periodic execution. May block on I/O; it only delays its own
    /// next firing.
    async fn execute(&self, ctx: &TaskContext) -> Result<(), TaskError>;

    /// Called once right after the schedule is installed.
    async fn on_registered(&self, _ctx: &TaskContext) -> Result<(), TaskError> {
        Ok(())
    }

    /// Called once when the schedule is removed.
    async fn on_unregistered(&self, _ctx: &TaskContext) -> Result<(), TaskError> {
        Ok(())
    }
}
