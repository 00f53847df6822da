//! Run command: the scheduled replication daemon.

use docrelay_engine::{AlertGateway, LogSink, Reconciler, Scheduler};
use tracing::info;

use crate::config::Settings;

/// Runs reconciliation passes forever, until a fatal error.
pub fn run(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let mut reconciler = Reconciler::new(
        settings.source_poller()?,
        settings.status_store()?,
        settings.target_publisher()?,
    );
    let mut alerts = AlertGateway::new(LogSink, settings.alert_config());
    let scheduler = Scheduler::new(settings.scheduler_config());

    info!(
        interval_minutes = settings.polling_interval_minutes,
        "replication daemon starting"
    );
    scheduler.run(&mut reconciler, &mut alerts)?;
    Ok(())
}
