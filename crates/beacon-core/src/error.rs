use thiserror::Error;

/// Failure inside a task execution or lifecycle hook.
///
/// Task errors are caught at the scheduling loop, logged, and never cancel
/// the schedule or escape into the host process.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("task failed: {reason}")]
    Fail { reason: String },
    #[error("cancelled")]
    Cancelled,
    #[error("io error: {0}")]
    Io(String),
}

impl TaskError {
    /// Shorthand for a [`TaskError::Fail`] with a formatted reason.
    pub fn fail(reason: impl Into<String>) -> Self {
        TaskError::Fail {
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for TaskError {
    fn from(e: std::io::Error) -> Self {
        TaskError::Io(e.to_string())
    }
}

/// Failure at the persistent key/value store boundary.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
    #[error("record serialization failed: {0}")]
    Serialize(String),
}

/// Failure to resolve a persisted task kind into a live instance.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("no factory registered for task kind '{0}'")]
    UnknownKind(String),
}

/// Failure to deliver a task event to the attached sink.
#[derive(Error, Debug)]
pub enum EventError {
    #[error("no event consumer attached")]
    Detached,
    #[error("event delivery failed: {0}")]
    Delivery(String),
}
