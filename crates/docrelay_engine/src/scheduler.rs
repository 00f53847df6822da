//! Fixed-interval scheduling of reconciliation passes.

use std::time::Duration;

use docrelay_rest::RestTransport;
use tracing::{info, warn};

use crate::alert::{AlertGateway, AlertSink};
use crate::error::EngineResult;
use crate::reconciler::Reconciler;

/// Configuration for the scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Delay between the end of one pass and the start of the next.
    ///
    /// A pass that outlasts the interval simply defers the next one;
    /// passes never overlap.
    pub interval: Duration,
    /// Stop after this many passes. `None` runs until a fatal error.
    pub max_ticks: Option<u64>,
}

impl SchedulerConfig {
    /// Creates a configuration with the given interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_ticks: None,
        }
    }

    /// Limits the number of passes.
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        // 5 minutes, the historical polling default.
        Self::new(Duration::from_secs(300))
    }
}

/// Drives a [`Reconciler`] on a single worker at a fixed interval.
///
/// Consumes each pass's typed result:
/// - success sends a recovery alert if a connection failure was
///   outstanding, plus an undeduplicated failure alert for each
///   target-side 500 in the report
/// - a recoverable (connection) error alerts, deduplicated, and waits for
///   the next interval
/// - any other error returns: the service stops permanently
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    /// Creates a scheduler.
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Runs reconciliation passes until a fatal error (or `max_ticks`).
    pub fn run<S, C, T, A>(
        &self,
        reconciler: &mut Reconciler<S, C, T>,
        alerts: &mut AlertGateway<A>,
    ) -> EngineResult<()>
    where
        S: RestTransport,
        C: RestTransport,
        T: RestTransport,
        A: AlertSink,
    {
        let mut ticks = 0u64;
        loop {
            match reconciler.tick() {
                Ok(report) => {
                    // Recovery concerns connectivity only. Target-side 500s
                    // happen on reachable endpoints and bypass the
                    // failure/recovery state, so they neither suppress a
                    // later outage alert nor fake a recovery.
                    alerts.report_recovery();
                    for (id, body) in &report.server_errors {
                        alerts.escalate(&format!(
                            "target returned 500 for document {id}: {body}"
                        ));
                    }
                }
                Err(e) if e.is_recoverable() => {
                    warn!(error = %e, "pass aborted, retrying at next interval");
                    alerts.report_failure(&e.to_string());
                }
                Err(e) => {
                    // Everything except a connection failure stops the service.
                    return Err(e);
                }
            }

            ticks += 1;
            if let Some(max) = self.config.max_ticks {
                if ticks >= max {
                    info!(ticks, "tick limit reached, stopping");
                    return Ok(());
                }
            }
            std::thread::sleep(self.config.interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = SchedulerConfig::new(Duration::from_millis(10)).with_max_ticks(3);
        assert_eq!(config.interval, Duration::from_millis(10));
        assert_eq!(config.max_ticks, Some(3));
    }

    #[test]
    fn default_interval_is_five_minutes() {
        assert_eq!(SchedulerConfig::default().interval, Duration::from_secs(300));
    }
}
