pub mod error;

pub mod metrics;
pub use metrics::{MetricsBackend, NoopMetrics, TaskOutcome};

pub mod state;
pub use state::{CompositeListener, StateController, StateTransitionListener, TransitionTable};

pub mod binder;
pub use binder::{PresentationBinder, PresentationService};

pub mod store;
pub use store::{ConfigStore, MemoryStore, TaskConfigStore};

pub mod tasks;
pub use tasks::{
    BackgroundTask, MIN_TASK_INTERVAL_MS, TaskContext, TaskEventEmitter, TaskEventSink,
    TaskRegistry, TaskResolver, TaskResultStore, restore_tasks,
};

pub mod session;
pub use session::{HEARTBEAT_TASK_ID, HeartbeatTask, PresenceSession};
