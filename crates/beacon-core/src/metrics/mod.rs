use std::time::Duration;

use beacon_model::PresenceState;

/// Result of one task execution, as seen by the scheduling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failure,
}

impl TaskOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskOutcome::Success => "success",
            TaskOutcome::Failure => "failure",
        }
    }
}

/// Metrics seam for the core subsystems.
///
/// The core records events through this trait and never depends on a
/// concrete metrics system; `beacon-prometheus` provides the Prometheus
/// implementation, [`NoopMetrics`] is the default.
pub trait MetricsBackend: Send + Sync {
    /// One task execution finished with the given outcome.
    fn task_executed(&self, kind: &str, outcome: TaskOutcome, duration: Duration);

    /// A transition was validated and committed.
    fn transition_applied(&self, from: &PresenceState, to: &PresenceState);

    /// A transition request was rejected.
    fn transition_denied(&self, from: &PresenceState);

    /// The presentation service was asked to start, update or stop.
    fn presentation_action(&self, action: &str);
}

/// Backend that drops every measurement.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsBackend for NoopMetrics {
    fn task_executed(&self, _kind: &str, _outcome: TaskOutcome, _duration: Duration) {}
    fn transition_applied(&self, _from: &PresenceState, _to: &PresenceState) {}
    fn transition_denied(&self, _from: &PresenceState) {}
    fn presentation_action(&self, _action: &str) {}
}
