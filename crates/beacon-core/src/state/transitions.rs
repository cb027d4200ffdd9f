use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use beacon_model::{BUILTIN_STATES, PresenceState};
use tracing::trace;

/// Transition policy shared between controllers.
///
/// Edges are directed; a state maps to the set of states it may move to.
/// Self-transitions are always legal regardless of table contents, and a
/// state without edges allows nothing else. The table is cheap to clone
/// (shared interior) and safe to mutate while controllers read it.
#[derive(Clone)]
pub struct TransitionTable {
    inner: Arc<RwLock<TableInner>>,
}

#[derive(Default)]
struct TableInner {
    edges: HashMap<PresenceState, HashSet<PresenceState>>,
    initial: HashSet<PresenceState>,
    terminal: HashSet<PresenceState>,
}

impl TransitionTable {
    /// Table seeded with the default domain policy: the linear assignment
    /// progression, with every state able to fall back to Offline.
    pub fn new() -> Self {
        use PresenceState::*;

        let table = Self::custom();

        table.mark_initial(Online);
        table.mark_final(Arrived);
        table.mark_final(Completed);

        table.allow(Offline, Online);

        table.allow(Online, OnTask);
        table.allow(Online, Offline);

        table.allow(OnTask, WaitingHandoff);
        table.allow(OnTask, InProgress);
        table.allow(OnTask, Offline);

        table.allow(WaitingHandoff, InProgress);
        table.allow(WaitingHandoff, OnTask);
        table.allow(WaitingHandoff, Offline);

        table.allow(InProgress, Arrived);
        table.allow(InProgress, OnTask);

        table.allow(Arrived, Completed);
        table.allow(Arrived, Online);

        table.allow(Completed, Online);
        table.allow(Completed, Offline);

        // Universal fallback: any state may drop to Offline.
        for state in BUILTIN_STATES {
            if state != Offline {
                table.allow(state, Offline);
            }
        }

        table
    }

    /// Empty table: no edges, no initial or final markers.
    pub fn custom() -> Self {
        Self {
            inner: Arc::new(RwLock::new(TableInner::default())),
        }
    }

    /// Adds a directed edge. Idempotent.
    pub fn allow(&self, from: PresenceState, to: PresenceState) {
        let mut inner = self.inner.write().unwrap();
        trace!(from = %from, to = %to, "transition allowed");
        inner.edges.entry(from).or_default().insert(to);
    }

    /// Removes an edge if present; no-op otherwise.
    pub fn disallow(&self, from: &PresenceState, to: &PresenceState) {
        let mut inner = self.inner.write().unwrap();
        if let Some(destinations) = inner.edges.get_mut(from) {
            destinations.remove(to);
        }
    }

    pub fn is_allowed(&self, from: &PresenceState, to: &PresenceState) -> bool {
        if from == to {
            return true;
        }
        let inner = self.inner.read().unwrap();
        inner
            .edges
            .get(from)
            .is_some_and(|destinations| destinations.contains(to))
    }

    /// Snapshot copy of the outgoing edge set; empty when none.
    pub fn destinations_from(&self, from: &PresenceState) -> HashSet<PresenceState> {
        let inner = self.inner.read().unwrap();
        inner.edges.get(from).cloned().unwrap_or_default()
    }

    pub fn mark_initial(&self, state: PresenceState) {
        let mut inner = self.inner.write().unwrap();
        inner.initial.insert(state);
    }

    pub fn is_initial_state(&self, state: &PresenceState) -> bool {
        let inner = self.inner.read().unwrap();
        inner.initial.contains(state)
    }

    pub fn mark_final(&self, state: PresenceState) {
        let mut inner = self.inner.write().unwrap();
        inner.terminal.insert(state);
    }

    pub fn is_final_state(&self, state: &PresenceState) -> bool {
        let inner = self.inner.read().unwrap();
        inner.terminal.contains(state)
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::new()
    }
}
