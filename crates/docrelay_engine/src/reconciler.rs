//! The per-pass reconciliation algorithm.

use std::collections::HashSet;

use chrono::Utc;
use docrelay_model::{Document, StatusRecord};
use docrelay_rest::{Register, RestTransport, SourcePoller, StatusStore, TargetPublisher, Upsert};
use tracing::{debug, info, warn};

use crate::error::EngineResult;
use crate::watermark::Watermark;

/// Counters and escalations from one reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Documents returned by source discovery.
    pub discovered: usize,
    /// New status records created.
    pub registered: usize,
    /// Registrations answered 409 (another pass already owns the id).
    pub already_registered: usize,
    /// Delivery outcomes durably recorded.
    pub outcomes_recorded: usize,
    /// Outcome writes lost to a concurrent writer (left for redelivery).
    pub outcome_conflicts: usize,
    /// Deliveries the target answered 500, as `(id, response body)`.
    ///
    /// These escalate to the alert gateway; the outcome itself is still
    /// recorded as terminal.
    pub server_errors: Vec<(String, String)>,
}

impl TickReport {
    /// Returns true when any delivery hit a target-side 500.
    pub fn has_server_errors(&self) -> bool {
        !self.server_errors.is_empty()
    }
}

/// Orchestrates one polling pass: watermark maintenance, registration of
/// newly modified documents, then delivery of everything pending.
///
/// The watermark is the only state carried across passes and is owned
/// exclusively here. The status store remains the source of truth for
/// delivery state; the pending set is re-read fresh each pass.
pub struct Reconciler<S, C, T> {
    source: SourcePoller<S>,
    store: StatusStore<C>,
    target: TargetPublisher<T>,
    watermark: Option<Watermark>,
}

impl<S, C, T> Reconciler<S, C, T>
where
    S: RestTransport,
    C: RestTransport,
    T: RestTransport,
{
    /// Creates a reconciler over the three endpoint clients.
    ///
    /// The watermark is lazily bootstrapped from the status store on the
    /// first pass.
    pub fn new(source: SourcePoller<S>, store: StatusStore<C>, target: TargetPublisher<T>) -> Self {
        Self {
            source,
            store,
            target,
            watermark: None,
        }
    }

    /// Creates a reconciler with an explicit initial watermark, for tests
    /// and controlled restarts.
    pub fn with_watermark(
        source: SourcePoller<S>,
        store: StatusStore<C>,
        target: TargetPublisher<T>,
        watermark: Watermark,
    ) -> Self {
        Self {
            source,
            store,
            target,
            watermark: Some(watermark),
        }
    }

    /// The current watermark, once bootstrapped.
    pub fn watermark(&self) -> Option<Watermark> {
        self.watermark
    }

    /// Runs one reconciliation pass.
    ///
    /// With an id field configured, delivery is driven by the store's
    /// pending set, refetching each document by id. Without one, every
    /// discovered document is delivered inline to the fixed target
    /// resource under the empty id.
    ///
    /// On a recoverable (connection) error the pass aborts early; watermark
    /// advances made for documents already discovered are kept, which at
    /// worst causes a benign re-registration attempt next pass.
    pub fn tick(&mut self) -> EngineResult<TickReport> {
        let mut report = TickReport::default();

        let mut watermark = match self.watermark {
            Some(w) => w,
            None => {
                let records = self.store.read_all()?;
                let w = Watermark::bootstrap(&records);
                info!(watermark = %w, records = records.len(), "watermark bootstrapped");
                self.watermark = Some(w);
                w
            }
        };

        let since = watermark.value();

        // Ids already handled at exactly the current watermark. Documents
        // whose lastModified equals the watermark keep being rediscovered
        // (the source query is >=), so they must not be re-registered.
        // Pending records are excluded: those still owe a delivery.
        let keys_to_skip: HashSet<String> = if watermark.is_minimum() {
            HashSet::new()
        } else {
            self.store
                .read_since(since)?
                .into_iter()
                .filter(|r| !r.is_pending() && r.last_modified == since)
                .map(|r| r.id)
                .collect()
        };

        let documents = self.source.discover_modified(since)?;
        report.discovered = documents.len();

        // With no id field configured every document maps to the one fixed
        // target resource. There is nothing to refetch by id, so discovered
        // payloads are delivered inline instead of through the pending set.
        let fixed_resource = !self.source.fields().has_id_field();

        for document in &documents {
            if document.last_modified() == since && keys_to_skip.contains(document.id()) {
                debug!(id = document.id(), "already handled at watermark, skipping");
                continue;
            }

            if watermark.advance(document.last_modified()) {
                self.watermark = Some(watermark);
            }

            let record = StatusRecord::pending(document.id(), document.last_modified());
            match self.store.register_if_absent(&record)? {
                Register::Created => {
                    debug!(id = document.id(), "registered for delivery");
                    report.registered += 1;
                }
                Register::Conflict => {
                    // Another pass already owns this id.
                    debug!(id = document.id(), "registration conflict, no-op");
                    report.already_registered += 1;
                }
            }

            if fixed_resource {
                self.deliver(record, document, &mut report)?;
            }
        }

        if !fixed_resource {
            for record in self.store.read_pending()? {
                let document = self.source.fetch_by_id(&record.id)?;
                self.deliver(record, &document, &mut report)?;
            }
        }

        info!(
            watermark = %watermark,
            discovered = report.discovered,
            registered = report.registered,
            recorded = report.outcomes_recorded,
            "reconciliation pass complete"
        );
        Ok(report)
    }

    fn deliver(
        &self,
        record: StatusRecord,
        document: &Document,
        report: &mut TickReport,
    ) -> EngineResult<()> {
        let delivery = self.target.publish(document)?;

        if delivery.status >= 400 {
            warn!(
                id = %record.id,
                status = delivery.status,
                body = %delivery.body,
                "delivery rejected by target"
            );
        }
        if delivery.status == 500 {
            report
                .server_errors
                .push((record.id.clone(), delivery.body.clone()));
        }

        // The recorded code is terminal, success or not. There is no
        // automatic redelivery of 4xx/5xx outcomes.
        let updated = record.with_outcome(delivery.status, Utc::now());
        match self.store.record_outcome(&updated)? {
            Upsert::Updated => report.outcomes_recorded += 1,
            Upsert::Conflict => {
                // A concurrent writer won; ours is discarded and the
                // document is redelivered later if still pending.
                debug!(id = %updated.id, "outcome write lost, leaving for redelivery");
                report.outcome_conflicts += 1;
            }
        }
        Ok(())
    }
}
