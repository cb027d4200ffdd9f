use std::sync::Arc;

use beacon_model::PresenceState;

/// Transition lifecycle hooks.
///
/// Hooks run synchronously inside the controller's transition sequence,
/// while its lock is held: implementations must return promptly and must
/// not call back into the same controller.
pub trait StateTransitionListener: Send + Sync {
    /// Called after validation, before the commit. Returning `false` blocks
    /// the transition.
    fn before_transition(&self, _from: &PresenceState, _to: &PresenceState) -> bool {
        true
    }

    /// Called after a committed transition.
    fn after_transition(&self, from: &PresenceState, to: &PresenceState);

    /// Called when a requested transition was rejected.
    fn on_denied(&self, _from: &PresenceState, _to: &PresenceState, _reason: &str) {}
}

/// Fans one controller's hooks out to several listeners.
///
/// The controller holds a single listener slot; this keeps that contract
/// while letting e.g. the presentation binder and the session tracker both
/// observe transitions. `before_transition` vetoes when any child vetoes.
#[derive(Default)]
pub struct CompositeListener {
    listeners: Vec<Arc<dyn StateTransitionListener>>,
}

impl CompositeListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, listener: Arc<dyn StateTransitionListener>) -> Self {
        self.listeners.push(listener);
        self
    }
}

impl StateTransitionListener for CompositeListener {
    fn before_transition(&self, from: &PresenceState, to: &PresenceState) -> bool {
        self.listeners
            .iter()
            .all(|listener| listener.before_transition(from, to))
    }

    fn after_transition(&self, from: &PresenceState, to: &PresenceState) {
        for listener in &self.listeners {
            listener.after_transition(from, to);
        }
    }

    fn on_denied(&self, from: &PresenceState, to: &PresenceState, reason: &str) {
        for listener in &self.listeners {
            listener.on_denied(from, to, reason);
        }
    }
}
