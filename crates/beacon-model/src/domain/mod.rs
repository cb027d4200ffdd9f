mod presence_state;
pub use presence_state::{BUILTIN_STATES, PresenceState};

mod descriptor;
pub use descriptor::{DescriptorButton, StateDescriptor};

mod task_config;
pub use task_config::TaskConfig;

mod task_event;
pub use task_event::TaskEvent;

mod session;
pub use session::SessionSnapshot;

/// Unique identifier of a registered background task.
///
/// Ids are plain strings chosen by the consumer; the registry enforces
/// at most one live schedule per id.
pub type TaskId = String;

/// Interval value in milliseconds.
///
/// Used for task schedules and anywhere an explicit period is required.
pub type IntervalMs = u64;
