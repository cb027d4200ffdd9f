mod listener;
pub use listener::{CompositeListener, StateTransitionListener};

mod transitions;
pub use transitions::TransitionTable;

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use beacon_model::PresenceState;
use tracing::{debug, info, warn};

use crate::metrics::{MetricsBackend, NoopMetrics};

/// Owner of the single current state.
///
/// Every requested transition is validated against the shared
/// [`TransitionTable`]; the read-validate-commit-notify sequence runs under
/// one lock so concurrent requests cannot both observe the same pre-state
/// and both commit.
pub struct StateController {
    table: TransitionTable,
    metrics: Arc<dyn MetricsBackend>,
    inner: Mutex<ControllerInner>,
}

struct ControllerInner {
    current: PresenceState,
    listener: Option<Arc<dyn StateTransitionListener>>,
}

impl StateController {
    /// Controller starting at Offline.
    pub fn new(table: TransitionTable) -> Self {
        Self::with_initial_state(table, PresenceState::Offline)
    }

    pub fn with_initial_state(table: TransitionTable, initial: PresenceState) -> Self {
        Self {
            table,
            metrics: Arc::new(NoopMetrics),
            inner: Mutex::new(ControllerInner {
                current: initial,
                listener: None,
            }),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsBackend>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Replaces the transition listener; at most one is attached.
    pub fn set_listener(&self, listener: Arc<dyn StateTransitionListener>) {
        let mut inner = self.inner.lock().unwrap();
        inner.listener = Some(listener);
    }

    pub fn current_state(&self) -> PresenceState {
        let inner = self.inner.lock().unwrap();
        inner.current.clone()
    }

    /// Requests a validated transition.
    ///
    /// Returns `true` when the target is already current (no hooks fire) or
    /// the transition committed; `false` when the table or the listener
    /// rejected it, in which case the state is unchanged and the listener's
    /// denied hook has been told why.
    pub fn transition_to(&self, target: PresenceState) -> bool {
        let mut inner = self.inner.lock().unwrap();

        if inner.current == target {
            debug!(state = %target, "already in requested state");
            return true;
        }

        if !self.table.is_allowed(&inner.current, &target) {
            let reason = format!("transition not allowed: {} -> {}", inner.current, target);
            warn!("{reason}");
            self.metrics.transition_denied(&inner.current);
            if let Some(listener) = &inner.listener {
                listener.on_denied(&inner.current, &target, &reason);
            }
            return false;
        }

        if let Some(listener) = inner.listener.clone()
            && !listener.before_transition(&inner.current, &target)
        {
            let reason = "transition blocked by listener";
            warn!(from = %inner.current, to = %target, "{reason}");
            self.metrics.transition_denied(&inner.current);
            listener.on_denied(&inner.current, &target, reason);
            return false;
        }

        let previous = std::mem::replace(&mut inner.current, target.clone());
        info!(from = %previous, to = %target, "state transition");
        self.metrics.transition_applied(&previous, &target);

        if let Some(listener) = &inner.listener {
            listener.after_transition(&previous, &target);
        }
        true
    }

    /// Commits unconditionally, firing only the after hook.
    ///
    /// Meant for crash recovery and administrative resets; regular callers
    /// go through [`StateController::transition_to`].
    pub fn force_transition(&self, target: PresenceState) {
        let mut inner = self.inner.lock().unwrap();
        let previous = std::mem::replace(&mut inner.current, target.clone());
        warn!(from = %previous, to = %target, "forced state transition");
        self.metrics.transition_applied(&previous, &target);

        if let Some(listener) = &inner.listener {
            listener.after_transition(&previous, &target);
        }
    }

    /// States reachable from the current one under the current table.
    pub fn available_transitions(&self) -> HashSet<PresenceState> {
        let current = self.current_state();
        self.table.destinations_from(&current)
    }

    /// Pure query, no side effects.
    pub fn can_transition_to(&self, target: &PresenceState) -> bool {
        let current = self.current_state();
        self.table.is_allowed(&current, target)
    }

    /// Drops back to Offline without validation.
    pub fn reset(&self) {
        self.force_transition(PresenceState::Offline);
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use PresenceState::*;

    #[derive(Default)]
    struct RecordingListener {
        calls: StdMutex<Vec<String>>,
        veto: bool,
    }

    impl RecordingListener {
        fn vetoing() -> Self {
            Self {
                calls: StdMutex::new(Vec::new()),
                veto: true,
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl StateTransitionListener for RecordingListener {
        fn before_transition(&self, from: &PresenceState, to: &PresenceState) -> bool {
            self.calls
                .lock()
                .unwrap()
                .push(format!("before {from}->{to}"));
            !self.veto
        }

        fn after_transition(&self, from: &PresenceState, to: &PresenceState) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("after {from}->{to}"));
        }

        fn on_denied(&self, from: &PresenceState, to: &PresenceState, reason: &str) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("denied {from}->{to}: {reason}"));
        }
    }

    #[test]
    fn starts_offline_by_default() {
        let controller = StateController::new(TransitionTable::new());
        assert_eq!(controller.current_state(), Offline);
    }

    #[test]
    fn committed_transition_updates_state_and_fires_hooks() {
        let controller = StateController::new(TransitionTable::new());
        let listener = Arc::new(RecordingListener::default());
        controller.set_listener(listener.clone());

        assert!(controller.transition_to(Online));
        assert_eq!(controller.current_state(), Online);
        assert_eq!(
            listener.calls(),
            vec!["before offline->online", "after offline->online"]
        );
    }

    #[test]
    fn denied_transition_keeps_state_and_reports_reason() {
        let controller = StateController::new(TransitionTable::new());
        let listener = Arc::new(RecordingListener::default());
        controller.set_listener(listener.clone());

        assert!(!controller.transition_to(OnTask));
        assert_eq!(controller.current_state(), Offline);

        let calls = listener.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("denied offline->on_task"));
    }

    #[test]
    fn listener_veto_blocks_commit() {
        let controller = StateController::new(TransitionTable::new());
        let listener = Arc::new(RecordingListener::vetoing());
        controller.set_listener(listener.clone());

        assert!(!controller.transition_to(Online));
        assert_eq!(controller.current_state(), Offline);

        let calls = listener.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].contains("blocked by listener"));
    }

    #[test]
    fn same_state_request_is_a_silent_success() {
        let controller = StateController::new(TransitionTable::new());
        let listener = Arc::new(RecordingListener::default());
        controller.set_listener(listener.clone());

        assert!(controller.transition_to(Offline));
        assert!(listener.calls().is_empty());
    }

    #[test]
    fn force_transition_skips_validation_but_fires_after() {
        let controller = StateController::new(TransitionTable::custom());
        let listener = Arc::new(RecordingListener::default());
        controller.set_listener(listener.clone());

        controller.force_transition(Arrived);
        assert_eq!(controller.current_state(), Arrived);
        assert_eq!(listener.calls(), vec!["after offline->arrived"]);
    }

    #[test]
    fn reset_forces_offline() {
        let controller = StateController::new(TransitionTable::new());
        assert!(controller.transition_to(Online));
        controller.reset();
        assert_eq!(controller.current_state(), Offline);
    }

    #[test]
    fn available_transitions_follow_the_table() {
        let controller = StateController::new(TransitionTable::new());
        let available = controller.available_transitions();
        assert_eq!(available, HashSet::from([Online]));

        assert!(controller.transition_to(Online));
        assert!(controller.available_transitions().contains(&OnTask));
        assert!(controller.can_transition_to(&Offline));
        assert!(!controller.can_transition_to(&Arrived));
    }

    #[test]
    fn progression_through_the_default_policy() {
        let controller = StateController::new(TransitionTable::new());

        assert!(!controller.transition_to(OnTask));
        assert!(controller.transition_to(Online));
        assert!(controller.transition_to(OnTask));
        assert!(controller.transition_to(Offline));
        assert_eq!(controller.current_state(), Offline);
    }
}
