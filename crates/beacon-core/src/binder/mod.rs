use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use beacon_model::{PresenceState, StateDescriptor};
use tracing::{debug, error, info, warn};

use crate::metrics::{MetricsBackend, NoopMetrics};
use crate::state::{StateController, StateTransitionListener};

/// Platform surface that renders the presence session.
///
/// Hooks run synchronously inside the transition call, so implementations
/// are expected to hand the descriptor off quickly (e.g. dispatch a command
/// to the platform) rather than block.
pub trait PresentationService: Send + Sync {
    fn start_session(&self, descriptor: &StateDescriptor);
    fn update_session(&self, descriptor: &StateDescriptor);
    fn stop_session(&self);
    /// Whether the platform can resolve the given layout identifier.
    fn layout_available(&self, layout: &str) -> bool;
}

/// Maps states to presentation descriptors and applies them on transitions.
///
/// The binder holds no platform handle; everything goes through the
/// injected [`PresentationService`]. It registers as the controller's
/// listener and reacts to committed transitions only.
pub struct PresentationBinder {
    service: Arc<dyn PresentationService>,
    metrics: Arc<dyn MetricsBackend>,
    inner: RwLock<BinderInner>,
}

struct BinderInner {
    descriptors: HashMap<PresenceState, StateDescriptor>,
    session_active: bool,
}

enum Action {
    Start(StateDescriptor),
    Update(StateDescriptor),
    Stop,
}

impl PresentationBinder {
    /// Binder pre-seeded with the default per-state descriptors.
    pub fn new(service: Arc<dyn PresentationService>) -> Self {
        Self {
            service,
            metrics: Arc::new(NoopMetrics),
            inner: RwLock::new(BinderInner {
                descriptors: default_descriptors(),
                session_active: false,
            }),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsBackend>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Replaces (not merges) the descriptor for a state.
    ///
    /// Takes effect on the next transition into that state; last write wins.
    pub fn configure(&self, state: PresenceState, descriptor: StateDescriptor) {
        let mut inner = self.inner.write().unwrap();
        info!(state = %state, "state presentation configured");
        inner.descriptors.insert(state, descriptor);
    }

    pub fn descriptor_for(&self, state: &PresenceState) -> Option<StateDescriptor> {
        let inner = self.inner.read().unwrap();
        inner.descriptors.get(state).cloned()
    }

    /// Optionally reconfigures the target's descriptor, then requests the
    /// transition on the given controller.
    pub fn transition_with(
        &self,
        controller: &StateController,
        target: PresenceState,
        descriptor: Option<StateDescriptor>,
    ) -> bool {
        if let Some(descriptor) = descriptor {
            self.configure(target.clone(), descriptor);
        }
        controller.transition_to(target)
    }

    pub fn session_active(&self) -> bool {
        let inner = self.inner.read().unwrap();
        inner.session_active
    }

    fn apply(&self, to: &PresenceState) {
        // Decide under the lock, call out without it.
        let action = {
            let mut inner = self.inner.write().unwrap();

            let Some(descriptor) = inner.descriptors.get(to).cloned() else {
                warn!(state = %to, "no presentation configured for state");
                return;
            };

            if let Some(layout) = descriptor.layout.as_deref()
                && !self.service.layout_available(layout)
            {
                error!(state = %to, layout, "layout unavailable, presentation skipped");
                return;
            }

            if *to == PresenceState::Online && !inner.session_active {
                inner.session_active = true;
                Action::Start(descriptor)
            } else if *to == PresenceState::Offline {
                inner.session_active = false;
                Action::Stop
            } else {
                Action::Update(descriptor)
            }
        };

        match action {
            Action::Start(descriptor) => {
                self.service.start_session(&descriptor);
                self.metrics.presentation_action("start");
            }
            Action::Update(descriptor) => {
                self.service.update_session(&descriptor);
                self.metrics.presentation_action("update");
            }
            Action::Stop => {
                self.service.stop_session();
                self.metrics.presentation_action("stop");
            }
        }
        info!(state = %to, "presentation applied");
    }
}

impl StateTransitionListener for PresentationBinder {
    fn before_transition(&self, from: &PresenceState, to: &PresenceState) -> bool {
        debug!(from = %from, to = %to, "before transition");
        true
    }

    fn after_transition(&self, _from: &PresenceState, to: &PresenceState) {
        self.apply(to);
    }

    fn on_denied(&self, from: &PresenceState, to: &PresenceState, reason: &str) {
        warn!(from = %from, to = %to, reason, "transition denied");
    }
}

/// Default presentation for each built-in state.
fn default_descriptors() -> HashMap<PresenceState, StateDescriptor> {
    use PresenceState::*;

    let mut descriptors = HashMap::new();

    descriptors.insert(
        Offline,
        StateDescriptor::new().with_layout("presence_default"),
    );
    descriptors.insert(
        Online,
        StateDescriptor::new()
            .with_layout("presence_online")
            .with_title_view_id("txt_status")
            .with_subtitle_view_id("txt_waiting")
            .with_timer_view_id("txt_timer")
            .with_title("Available")
            .with_subtitle("Waiting for assignments")
            .with_location_enabled(true),
    );
    descriptors.insert(
        OnTask,
        StateDescriptor::new()
            .with_layout("presence_active")
            .with_title_view_id("txt_status")
            .with_subtitle_view_id("txt_destination")
            .with_timer_view_id("txt_elapsed")
            .with_title("On assignment")
            .with_subtitle("Heading to the handoff point")
            .with_location_enabled(true),
    );
    descriptors.insert(
        WaitingHandoff,
        StateDescriptor::new()
            .with_layout("presence_waiting")
            .with_title_view_id("txt_waiting_title")
            .with_subtitle_view_id("txt_contact")
            .with_timer_view_id("txt_wait_time")
            .with_title("Waiting")
            .with_subtitle("Waiting at the handoff point")
            .with_location_enabled(true)
            .with_sounds_enabled(true),
    );
    descriptors.insert(
        InProgress,
        StateDescriptor::new()
            .with_layout("presence_active")
            .with_title_view_id("txt_status")
            .with_subtitle_view_id("txt_destination")
            .with_timer_view_id("txt_elapsed")
            .with_title("In progress")
            .with_subtitle("On the way to the destination")
            .with_location_enabled(true),
    );
    descriptors.insert(
        Arrived,
        StateDescriptor::new()
            .with_layout("presence_arrived")
            .with_title_view_id("txt_arrival_title")
            .with_subtitle_view_id("txt_arrival_detail")
            .with_timer_view_id("txt_arrival_time")
            .with_title("Arrived")
            .with_subtitle("At the destination")
            .with_location_enabled(true)
            .with_sounds_enabled(true),
    );
    descriptors.insert(
        Completed,
        StateDescriptor::new()
            .with_layout("presence_default")
            .with_title_view_id("txt_title")
            .with_subtitle_view_id("txt_subtitle")
            .with_timer_view_id("txt_timer")
            .with_title("Completed")
            .with_subtitle("Assignment finished")
            .with_sounds_enabled(true),
    );

    descriptors
}
