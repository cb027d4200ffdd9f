use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Domain status of the agent.
///
/// The closed set below covers the linear assignment flow; `Custom` carries a
/// consumer-defined label for apps that need extra states on top of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PresenceState {
    /// Agent stopped / not reachable.
    Offline,
    /// Agent started, reachable and available.
    Online,
    /// An assignment has been accepted.
    OnTask,
    /// Waiting at the handoff point.
    WaitingHandoff,
    /// Actively progressing towards the destination.
    InProgress,
    /// Arrived at the destination.
    Arrived,
    /// Assignment finished.
    Completed,
    /// Consumer-defined state, identified by its label.
    Custom(String),
}

/// The built-in states, in progression order.
pub const BUILTIN_STATES: [PresenceState; 7] = [
    PresenceState::Offline,
    PresenceState::Online,
    PresenceState::OnTask,
    PresenceState::WaitingHandoff,
    PresenceState::InProgress,
    PresenceState::Arrived,
    PresenceState::Completed,
];

impl PresenceState {
    /// Returns the wire label for this state.
    pub fn as_str(&self) -> &str {
        match self {
            PresenceState::Offline => "offline",
            PresenceState::Online => "online",
            PresenceState::OnTask => "on_task",
            PresenceState::WaitingHandoff => "waiting_handoff",
            PresenceState::InProgress => "in_progress",
            PresenceState::Arrived => "arrived",
            PresenceState::Completed => "completed",
            PresenceState::Custom(label) => label,
        }
    }

    /// Returns `true` for consumer-defined states.
    #[inline]
    pub fn is_custom(&self) -> bool {
        matches!(self, PresenceState::Custom(_))
    }
}

impl From<&str> for PresenceState {
    /// Parses a wire label, case-insensitively.
    ///
    /// Unknown labels are preserved as [`PresenceState::Custom`] instead of
    /// failing, so configs written by a newer consumer still load.
    fn from(value: &str) -> Self {
        let norm = value.trim().to_ascii_lowercase();
        match norm.as_str() {
            "offline" => PresenceState::Offline,
            "online" => PresenceState::Online,
            "on_task" => PresenceState::OnTask,
            "waiting_handoff" => PresenceState::WaitingHandoff,
            "in_progress" => PresenceState::InProgress,
            "arrived" => PresenceState::Arrived,
            "completed" => PresenceState::Completed,
            _ => PresenceState::Custom(value.trim().to_string()),
        }
    }
}

impl fmt::Display for PresenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PresenceState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PresenceState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(PresenceState::from(label.as_str()))
    }
}
