use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use beacon_model::{PresenceState, SessionSnapshot};
use serde_json::json;
use tracing::{info, warn};

use crate::error::TaskError;
use crate::state::{StateController, StateTransitionListener};
use crate::store::ConfigStore;
use crate::tasks::{BackgroundTask, TaskContext};

const SESSION_KEY: &str = "session/current";

/// Reserved id for the built-in heartbeat schedule.
pub const HEARTBEAT_TASK_ID: &str = "beacon-heartbeat";

/// Tracks the active presence session across transitions and restarts.
///
/// Attached as a transition listener, it persists a [`SessionSnapshot`] on
/// every committed transition and clears it when the session drops to
/// Offline. The start instant survives restarts, so elapsed time keeps its
/// original origin.
pub struct PresenceSession {
    store: Arc<dyn ConfigStore>,
    started_at_ms: AtomicU64,
}

impl PresenceSession {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            store,
            started_at_ms: AtomicU64::new(0),
        }
    }

    /// Time since the session went active, if one is running.
    pub fn elapsed(&self) -> Option<Duration> {
        let started = self.started_at_ms.load(Ordering::Acquire);
        if started == 0 {
            return None;
        }
        Some(Duration::from_millis(now_ms().saturating_sub(started)))
    }

    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        let record = match self.store.get(SESSION_KEY) {
            Ok(record) => record?,
            Err(e) => {
                warn!(error = %e, "failed to read session snapshot");
                return None;
            }
        };
        match serde_json::from_str(&record) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(error = %e, "corrupt session snapshot, ignoring");
                None
            }
        }
    }

    /// Puts a restarted process back into the persisted session state.
    ///
    /// Reads the snapshot and, when it marks a running session, forces the
    /// controller into the saved state (validation is deliberately skipped
    /// on this path) and re-adopts the original start instant.
    pub fn restore(&self, controller: &StateController) -> Option<PresenceState> {
        let snapshot = self.snapshot()?;
        if !snapshot.running {
            return None;
        }

        self.started_at_ms
            .store(snapshot.started_at_ms, Ordering::Release);
        controller.force_transition(snapshot.state.clone());
        info!(state = %snapshot.state, "presence session restored");
        Some(snapshot.state)
    }

    fn ensure_started(&self) -> u64 {
        let current = self.started_at_ms.load(Ordering::Acquire);
        if current != 0 {
            return current;
        }

        // Reuse a previously persisted start instant when one exists, so a
        // session that outlived its process keeps the original origin.
        let started = self
            .snapshot()
            .filter(|snapshot| snapshot.running && snapshot.started_at_ms > 0)
            .map(|snapshot| snapshot.started_at_ms)
            .unwrap_or_else(now_ms);

        self.started_at_ms.store(started, Ordering::Release);
        started
    }

    fn persist(&self, snapshot: &SessionSnapshot) {
        let record = match serde_json::to_string(snapshot) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "failed to encode session snapshot");
                return;
            }
        };
        if let Err(e) = self.store.put(SESSION_KEY, &record) {
            warn!(error = %e, "failed to persist session snapshot");
        }
    }
}

impl StateTransitionListener for PresenceSession {
    fn after_transition(&self, _from: &PresenceState, to: &PresenceState) {
        if *to == PresenceState::Offline {
            self.started_at_ms.store(0, Ordering::Release);
            if let Err(e) = self.store.remove(SESSION_KEY) {
                warn!(error = %e, "failed to clear session snapshot");
            }
            return;
        }

        let started_at_ms = self.ensure_started();
        self.persist(&SessionSnapshot {
            state: to.clone(),
            started_at_ms,
            running: true,
        });
    }
}

/// Built-in task reporting session liveness.
///
/// Emits `{ elapsedSeconds, state }` through the task event channel on
/// every firing; runs on the regular scheduler under
/// [`HEARTBEAT_TASK_ID`], inheriting its cancellation and isolation.
pub struct HeartbeatTask {
    session: Arc<PresenceSession>,
    controller: Arc<StateController>,
}

impl HeartbeatTask {
    pub fn new(session: Arc<PresenceSession>, controller: Arc<StateController>) -> Self {
        Self {
            session,
            controller,
        }
    }
}

#[async_trait]
impl BackgroundTask for HeartbeatTask {
    fn kind(&self) -> &str {
        "heartbeat"
    }

    async fn execute(&self, ctx: &TaskContext) -> Result<(), TaskError> {
        let elapsed = self.session.elapsed().unwrap_or(Duration::ZERO);
        ctx.events().emit(
            ctx.task_id(),
            "heartbeat",
            json!({
                "elapsedSeconds": elapsed.as_secs(),
                "state": self.controller.current_state().as_str(),
            }),
        );
        Ok(())
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
