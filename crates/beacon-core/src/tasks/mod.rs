mod task;
pub use task::{BackgroundTask, TaskContext};

mod registry;
pub use registry::{MIN_TASK_INTERVAL_MS, TaskRegistry};

mod recovery;
pub use recovery::{TaskResolver, restore_tasks};

mod results;
pub use results::TaskResultStore;

mod events;
pub use events::{TaskEventEmitter, TaskEventSink};
