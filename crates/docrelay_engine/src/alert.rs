//! Operator alerting with failure/recovery deduplication.

use std::sync::Mutex;

use thiserror::Error;
use tracing::{error, info, warn};

/// Error from an alert send attempt.
///
/// Alerts are best-effort: a failed send is logged and never escalated, so
/// it cannot corrupt reconciliation state.
#[derive(Error, Debug, Clone)]
#[error("alert send failed: {0}")]
pub struct AlertError(pub String);

/// Delivers one operator alert. Fire-and-forget.
///
/// The mail (or other) transport behind this seam is an external
/// collaborator; implementations receive a subject and body and do with
/// them what they will.
pub trait AlertSink: Send + Sync {
    /// Sends a single alert.
    fn send(&self, subject: &str, body: &str) -> Result<(), AlertError>;
}

impl<S: AlertSink + ?Sized> AlertSink for &S {
    fn send(&self, subject: &str, body: &str) -> Result<(), AlertError> {
        (**self).send(subject, body)
    }
}

/// Subjects and recovery body used when composing alerts.
#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// Subject for failure alerts.
    pub failure_subject: String,
    /// Subject for recovery alerts.
    pub recovery_subject: String,
    /// Body for recovery alerts.
    pub recovery_body: String,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            failure_subject: "docrelay: replication failing".into(),
            recovery_subject: "docrelay: replication recovered".into(),
            recovery_body: "Contact with all endpoints re-established.".into(),
        }
    }
}

/// Deduplicating front door for operator alerts.
///
/// Remembers the last alerted failure message. A repeat of the identical
/// message is suppressed, so a sustained outage produces one alert rather
/// than one per polling pass. The first success after a recorded failure
/// produces a single recovery alert and clears the state.
pub struct AlertGateway<S> {
    sink: S,
    config: AlertConfig,
    last_alerted: Option<String>,
}

impl<S: AlertSink> AlertGateway<S> {
    /// Creates a gateway over the given sink.
    pub fn new(sink: S, config: AlertConfig) -> Self {
        Self {
            sink,
            config,
            last_alerted: None,
        }
    }

    /// Reports a failure with the given message.
    ///
    /// Sends a failure alert unless the message repeats the previous one.
    pub fn report_failure(&mut self, message: &str) {
        if self.last_alerted.as_deref() == Some(message) {
            return;
        }
        self.last_alerted = Some(message.to_owned());
        self.dispatch(&self.config.failure_subject, message);
    }

    /// Reports a success.
    ///
    /// Sends a recovery alert if a failure was previously alerted, then
    /// clears the recorded failure.
    pub fn report_recovery(&mut self) {
        if self.last_alerted.take().is_none() {
            return;
        }
        self.dispatch(&self.config.recovery_subject, &self.config.recovery_body);
    }

    /// Sends a failure alert without entering the failure/recovery state.
    ///
    /// For delivery-level escalations, where the endpoints are reachable
    /// and no recovery alert should follow.
    pub fn escalate(&self, message: &str) {
        self.dispatch(&self.config.failure_subject, message);
    }

    /// Returns true while a failure has been alerted and not yet recovered.
    pub fn has_outstanding_failure(&self) -> bool {
        self.last_alerted.is_some()
    }

    fn dispatch(&self, subject: &str, body: &str) {
        if let Err(e) = self.sink.send(subject, body) {
            warn!(error = %e, subject, "alert send failed, continuing");
        }
    }
}

/// An [`AlertSink`] that only writes to the log.
///
/// The default wiring when no mail transport is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl AlertSink for LogSink {
    fn send(&self, subject: &str, body: &str) -> Result<(), AlertError> {
        if subject.contains("recover") {
            info!(subject, body, "operator alert");
        } else {
            error!(subject, body, "operator alert");
        }
        Ok(())
    }
}

/// An [`AlertSink`] that records alerts in memory, for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    sent: Mutex<Vec<(String, String)>>,
    fail_sends: Mutex<bool>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent sends fail, to exercise best-effort handling.
    pub fn set_failing(&self, failing: bool) {
        *self.fail_sends.lock().unwrap() = failing;
    }

    /// Returns the alerts sent so far as `(subject, body)` pairs.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl AlertSink for MemorySink {
    fn send(&self, subject: &str, body: &str) -> Result<(), AlertError> {
        if *self.fail_sends.lock().unwrap() {
            return Err(AlertError("sink unavailable".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_owned(), body.to_owned()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(sink: &MemorySink) -> AlertGateway<&MemorySink> {
        AlertGateway::new(sink, AlertConfig::default())
    }

    #[test]
    fn identical_failures_are_suppressed() {
        let sink = MemorySink::new();
        let mut gateway = gateway(&sink);

        gateway.report_failure("A");
        gateway.report_failure("A");
        gateway.report_failure("A");
        assert_eq!(sink.sent().len(), 1);
    }

    #[test]
    fn message_changes_alert_again() {
        // Sequence [A, A, A, B, A] fires exactly 3 alerts.
        let sink = MemorySink::new();
        let mut gateway = gateway(&sink);

        for message in ["A", "A", "A", "B", "A"] {
            gateway.report_failure(message);
        }
        let bodies: Vec<_> = sink.sent().into_iter().map(|(_, b)| b).collect();
        assert_eq!(bodies, vec!["A", "B", "A"]);
    }

    #[test]
    fn recovery_fires_once_after_failure() {
        let sink = MemorySink::new();
        let mut gateway = gateway(&sink);

        gateway.report_failure("A");
        assert!(gateway.has_outstanding_failure());

        gateway.report_recovery();
        gateway.report_recovery();
        assert!(!gateway.has_outstanding_failure());

        let subjects: Vec<_> = sink.sent().into_iter().map(|(s, _)| s).collect();
        assert_eq!(subjects.len(), 2);
        assert!(subjects[1].contains("recovered"));
    }

    #[test]
    fn escalation_leaves_dedup_state_alone() {
        let sink = MemorySink::new();
        let mut gateway = gateway(&sink);

        gateway.escalate("target returned 500 for document 2: boom");
        assert!(!gateway.has_outstanding_failure());
        gateway.report_recovery();
        assert_eq!(sink.sent().len(), 1);

        // An escalation between failure and recovery changes nothing.
        gateway.report_failure("A");
        gateway.escalate("target returned 500 for document 2: boom");
        assert!(gateway.has_outstanding_failure());
        gateway.report_recovery();

        let subjects: Vec<_> = sink.sent().into_iter().map(|(s, _)| s).collect();
        assert_eq!(subjects.len(), 4);
        assert!(subjects[3].contains("recovered"));
    }

    #[test]
    fn recovery_without_failure_is_silent() {
        let sink = MemorySink::new();
        let mut gateway = gateway(&sink);
        gateway.report_recovery();
        assert!(sink.sent().is_empty());
    }

    #[test]
    fn failure_after_recovery_alerts_again() {
        let sink = MemorySink::new();
        let mut gateway = gateway(&sink);

        gateway.report_failure("A");
        gateway.report_recovery();
        gateway.report_failure("A");
        assert_eq!(sink.sent().len(), 3);
    }

    #[test]
    fn send_failure_is_swallowed_but_state_advances() {
        let sink = MemorySink::new();
        sink.set_failing(true);
        let mut gateway = gateway(&sink);

        gateway.report_failure("A");
        assert!(gateway.has_outstanding_failure());
        assert!(sink.sent().is_empty());
    }
}
