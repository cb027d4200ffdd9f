mod system;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use beacon_core::{
    CompositeListener, HEARTBEAT_TASK_ID, HeartbeatTask, MIN_TASK_INTERVAL_MS, MemoryStore,
    PresenceSession, PresentationBinder, PresentationService, StateController, TaskConfigStore,
    TaskEventEmitter, TaskRegistry, TaskResolver, TaskResultStore, TransitionTable, restore_tasks,
};
use beacon_model::{PresenceState, StateDescriptor};
use beacon_observe::{LoggerConfig, logger_init};
use beacon_prometheus::PrometheusMetrics;

/// Presentation service that renders to the log.
///
/// Stands in for a platform notification surface so the daemon can run
/// anywhere; every layout is considered available.
struct ConsolePresentation;

impl PresentationService for ConsolePresentation {
    fn start_session(&self, descriptor: &StateDescriptor) {
        info!(
            layout = descriptor.layout.as_deref().unwrap_or("-"),
            title = descriptor.title.as_deref().unwrap_or("-"),
            "presentation session started"
        );
    }

    fn update_session(&self, descriptor: &StateDescriptor) {
        info!(
            layout = descriptor.layout.as_deref().unwrap_or("-"),
            title = descriptor.title.as_deref().unwrap_or("-"),
            "presentation session updated"
        );
    }

    fn stop_session(&self) {
        info!("presentation session stopped");
    }

    fn layout_available(&self, _layout: &str) -> bool {
        true
    }
}

fn heartbeat_interval_ms() -> u64 {
    std::env::var("BEACON_HEARTBEAT_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5_000)
        .max(MIN_TASK_INTERVAL_MS)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = LoggerConfig::from_env().context("logger config")?;
    logger_init(&cfg).context("logger init")?;

    system::init_uptime();
    info!(agent = system::agent_id(), "beacon agent starting");

    let metrics = Arc::new(PrometheusMetrics::new().context("metrics backend")?);
    let store = Arc::new(MemoryStore::new());

    let session = Arc::new(PresenceSession::new(store.clone()));
    let binder = Arc::new(
        PresentationBinder::new(Arc::new(ConsolePresentation)).with_metrics(metrics.clone()),
    );
    let controller = Arc::new(
        StateController::new(TransitionTable::new()).with_metrics(metrics.clone()),
    );
    controller.set_listener(Arc::new(
        CompositeListener::new()
            .with(binder.clone())
            .with(session.clone()),
    ));

    let results = TaskResultStore::new(store.clone());
    let events = TaskEventEmitter::new(results.clone());
    let registry = Arc::new(
        TaskRegistry::new(TaskConfigStore::new(store.clone()), results, events)
            .with_metrics(metrics.clone()),
    );

    let resolver = TaskResolver::new();
    {
        let session = session.clone();
        let controller = controller.clone();
        resolver.register("heartbeat", move || {
            Arc::new(HeartbeatTask::new(session.clone(), controller.clone()))
        });
    }

    // A crashed process comes back into its previous session and schedules.
    if let Some(state) = session.restore(&controller) {
        info!(state = %state, "previous session resumed");
    }
    let restored = restore_tasks(&registry, &resolver).await;
    if restored > 0 {
        info!(restored, "persisted tasks restored");
    }

    if !registry.is_registered(HEARTBEAT_TASK_ID) {
        let heartbeat = Arc::new(HeartbeatTask::new(session.clone(), controller.clone()));
        registry
            .register(HEARTBEAT_TASK_ID, heartbeat, heartbeat_interval_ms())
            .await;
    }

    if !controller.transition_to(PresenceState::Online) {
        warn!("could not go online at startup");
    }

    info!(uptime = system::uptime_seconds(), "beacon agent ready");
    tokio::signal::ctrl_c().await.context("signal handler")?;

    info!("shutting down");
    controller.transition_to(PresenceState::Offline);
    registry.stop_all().await;
    Ok(())
}
