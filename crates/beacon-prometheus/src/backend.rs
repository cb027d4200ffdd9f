use std::time::Duration;

use beacon_core::{MetricsBackend, TaskOutcome};
use beacon_model::PresenceState;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

/// Prometheus-backed implementation of the core metrics seam.
///
/// Collectors are created and registered once in [`PrometheusMetrics::new`]
/// on an owned [`Registry`]; clones share the same collectors.
#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    tasks_executed: IntCounterVec,
    task_duration: HistogramVec,
    transitions: IntCounterVec,
    transitions_denied: IntCounterVec,
    presentation_actions: IntCounterVec,
}

impl PrometheusMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let tasks_executed = IntCounterVec::new(
            Opts::new(
                "beacon_tasks_executed_total",
                "Completed task executions by kind and outcome",
            ),
            &["kind", "outcome"],
        )?;
        registry.register(Box::new(tasks_executed.clone()))?;

        let task_duration = HistogramVec::new(
            HistogramOpts::new(
                "beacon_task_duration_seconds",
                "Task execution duration by kind",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(task_duration.clone()))?;

        let transitions = IntCounterVec::new(
            Opts::new("beacon_transitions_total", "Committed state transitions"),
            &["from", "to"],
        )?;
        registry.register(Box::new(transitions.clone()))?;

        let transitions_denied = IntCounterVec::new(
            Opts::new(
                "beacon_transitions_denied_total",
                "Rejected transition requests by origin state",
            ),
            &["from"],
        )?;
        registry.register(Box::new(transitions_denied.clone()))?;

        let presentation_actions = IntCounterVec::new(
            Opts::new(
                "beacon_presentation_actions_total",
                "Presentation service calls by action",
            ),
            &["action"],
        )?;
        registry.register(Box::new(presentation_actions.clone()))?;

        Ok(Self {
            registry,
            tasks_executed,
            task_duration,
            transitions,
            transitions_denied,
            presentation_actions,
        })
    }

    /// Snapshot of every registered metric family.
    pub fn gather(&self) -> Vec<prometheus::proto::MetricFamily> {
        self.registry.gather()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn task_executed(&self, kind: &str, outcome: TaskOutcome, duration: Duration) {
        self.tasks_executed
            .with_label_values(&[kind, outcome.as_str()])
            .inc();
        self.task_duration
            .with_label_values(&[kind])
            .observe(duration.as_secs_f64());
    }

    fn transition_applied(&self, from: &PresenceState, to: &PresenceState) {
        self.transitions
            .with_label_values(&[state_label(from), state_label(to)])
            .inc();
    }

    fn transition_denied(&self, from: &PresenceState) {
        self.transitions_denied
            .with_label_values(&[state_label(from)])
            .inc();
    }

    fn presentation_action(&self, action: &str) {
        self.presentation_actions.with_label_values(&[action]).inc();
    }
}

fn state_label(state: &PresenceState) -> &str {
    if state.is_custom() { "custom" } else { state.as_str() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::{Encoder, TextEncoder};

    fn render(metrics: &PrometheusMetrics) -> String {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&metrics.gather(), &mut buffer)
            .unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn every_collector_renders() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.task_executed("heartbeat", TaskOutcome::Success, Duration::from_millis(12));
        metrics.transition_applied(&PresenceState::Offline, &PresenceState::Online);
        metrics.transition_denied(&PresenceState::Offline);
        metrics.presentation_action("start");

        let text = render(&metrics);
        assert!(text.contains("beacon_tasks_executed_total"));
        assert!(text.contains("beacon_task_duration_seconds"));
        assert!(text.contains("beacon_transitions_total"));
        assert!(text.contains("beacon_transitions_denied_total"));
        assert!(text.contains("beacon_presentation_actions_total"));
    }

    #[test]
    fn task_executions_are_counted_per_outcome() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.task_executed("heartbeat", TaskOutcome::Success, Duration::from_millis(12));
        metrics.task_executed("heartbeat", TaskOutcome::Success, Duration::from_millis(9));
        metrics.task_executed("heartbeat", TaskOutcome::Failure, Duration::from_millis(30));

        let text = render(&metrics);
        assert!(
            text.contains(r#"beacon_tasks_executed_total{kind="heartbeat",outcome="success"} 2"#)
        );
        assert!(
            text.contains(r#"beacon_tasks_executed_total{kind="heartbeat",outcome="failure"} 1"#)
        );
        assert!(text.contains(r#"beacon_task_duration_seconds_count{kind="heartbeat"} 3"#));
    }

    #[test]
    fn custom_states_share_one_label() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.transition_applied(
            &PresenceState::Custom("break".to_string()),
            &PresenceState::Custom("lunch".to_string()),
        );

        let text = render(&metrics);
        assert!(text.contains(r#"beacon_transitions_total{from="custom",to="custom"} 1"#));
    }

    #[test]
    fn registries_are_independent() {
        // Each backend owns its registry, so two instances never collide
        // the way duplicate registrations on the default registry would.
        let a = PrometheusMetrics::new().unwrap();
        let b = PrometheusMetrics::new().unwrap();

        a.presentation_action("start");
        let text = render(&b);
        assert!(!text.contains(r#"action="start""#));
    }
}
