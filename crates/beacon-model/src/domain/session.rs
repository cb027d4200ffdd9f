use serde::{Deserialize, Serialize};

use crate::PresenceState;

/// Persisted snapshot of the presence session.
///
/// Written on every committed transition so a restarted process can pick up
/// the previous state and keep the original elapsed-time origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: PresenceState,
    /// Unix millis of the moment the session first went active.
    pub started_at_ms: u64,
    pub running: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip() {
        let snapshot = SessionSnapshot {
            state: PresenceState::OnTask,
            started_at_ms: 1_700_000_000_000,
            running: true,
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains(r#""state":"on_task""#));

        let back: SessionSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
