use std::sync::OnceLock;
use std::time::Instant;

static AGENT_ID: OnceLock<String> = OnceLock::new();
static START_TIME: OnceLock<Instant> = OnceLock::new();

/// Initialize agent start time.
pub fn init_uptime() {
    START_TIME.get_or_init(Instant::now);
}

/// Get agent uptime in seconds.
pub fn uptime_seconds() -> u64 {
    let start = START_TIME.get_or_init(Instant::now);
    start.elapsed().as_secs()
}

/// Get or generate the agent ID for this process.
///
/// `BEACON_AGENT_ID` wins, then the hostname, then a random UUID.
pub fn agent_id() -> &'static str {
    AGENT_ID.get_or_init(|| {
        if let Ok(id) = std::env::var("BEACON_AGENT_ID") {
            let id = id.trim().to_string();
            if !id.is_empty() {
                return id;
            }
        }
        if let Ok(name) = hostname::get()
            && let Some(name) = name.to_str()
        {
            return name.to_string();
        }
        uuid::Uuid::new_v4().to_string()
    })
}
