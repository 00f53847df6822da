//! Status store client.

use chrono::{DateTime, Utc};
use docrelay_model::{decode_records, format_iso8601, StatusRecord};
use tracing::debug;

use crate::error::{RestError, RestResult};
use crate::transport::RestTransport;

const ENDPOINT: &str = "status store";

/// Outcome of an exclusive record creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    /// A new record was created.
    Created,
    /// A record for this id already exists and was left untouched.
    Conflict,
}

/// Outcome of an outcome write-back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// The record was updated.
    Updated,
    /// A concurrent writer updated the record first; this write was dropped.
    Conflict,
}

/// Client for the external status store.
///
/// The store is the source of truth for "has this id been delivered"; it is
/// externally mutable, so callers re-read rather than caching across passes.
/// Outcomes are classified strictly by status family: 2xx success, 409
/// conflict, anything else [`RestError::Upstream`].
pub struct StatusStore<T> {
    transport: T,
    base_uri: String,
}

impl<T: RestTransport> StatusStore<T> {
    /// Creates a client for the store at `base_uri`.
    pub fn new(transport: T, base_uri: impl Into<String>) -> Self {
        Self {
            transport,
            base_uri: base_uri.into().trim_end_matches('/').to_owned(),
        }
    }

    /// Fetches all status records.
    ///
    /// Used at startup to compute the initial watermark.
    pub fn read_all(&self) -> RestResult<Vec<StatusRecord>> {
        self.read(self.base_uri.clone())
    }

    /// Fetches status records with `lastModified >= since`.
    pub fn read_since(&self, since: DateTime<Utc>) -> RestResult<Vec<StatusRecord>> {
        self.read(format!(
            "{}?starttime={}",
            self.base_uri,
            format_iso8601(since)
        ))
    }

    /// Fetches status records awaiting delivery.
    ///
    /// The store's query surface has no status filter, so pending records
    /// are filtered client-side from a full read.
    pub fn read_pending(&self) -> RestResult<Vec<StatusRecord>> {
        let mut records = self.read_all()?;
        records.retain(StatusRecord::is_pending);
        debug!(count = records.len(), "pending records");
        Ok(records)
    }

    fn read(&self, url: String) -> RestResult<Vec<StatusRecord>> {
        let response = self.transport.get(&url)?;
        if !response.is_success() {
            return Err(RestError::upstream(ENDPOINT, response.status));
        }
        decode_records(response.json(ENDPOINT)?).map_err(RestError::from)
    }

    /// Attempts to create a new pending record.
    ///
    /// Creation is exclusive: a 409 means a record for this id already
    /// exists, which makes registration idempotent across repeated passes
    /// and overlapping runs.
    pub fn register_if_absent(&self, record: &StatusRecord) -> RestResult<Register> {
        let body = serde_json::to_value(record)
            .map_err(|e| RestError::payload(ENDPOINT, e.to_string()))?;
        let response = self.transport.post(&self.base_uri, &body)?;
        if response.is_success() {
            Ok(Register::Created)
        } else if response.is_conflict() {
            Ok(Register::Conflict)
        } else {
            Err(RestError::upstream(ENDPOINT, response.status))
        }
    }

    /// Writes back a post-delivery outcome.
    ///
    /// A 409 means a concurrent writer got there first; the caller must
    /// discard its outcome rather than overwrite a possibly newer state.
    pub fn record_outcome(&self, record: &StatusRecord) -> RestResult<Upsert> {
        let body = serde_json::to_value(record)
            .map_err(|e| RestError::payload(ENDPOINT, e.to_string()))?;
        let response = self.transport.put(&self.base_uri, &body)?;
        if response.is_success() {
            Ok(Upsert::Updated)
        } else if response.is_conflict() {
            Ok(Upsert::Conflict)
        } else {
            Err(RestError::upstream(ENDPOINT, response.status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MockTransport, RestResponse};
    use chrono::TimeZone;

    const URI: &str = "http://sync/status";

    fn store(mock: MockTransport) -> StatusStore<MockTransport> {
        StatusStore::new(mock, URI)
    }

    fn record() -> StatusRecord {
        StatusRecord::pending("1", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn read_pending_filters_handled_records() {
        let mock = MockTransport::new();
        mock.stage(
            "GET",
            URI,
            RestResponse::new(
                200,
                r#"{"d": [
                    {"id": "1", "lastModified": "2024-01-01T00:00:00Z", "syncedStatus": 0},
                    {"id": "2", "lastModified": "2024-01-01T00:00:00Z", "syncedStatus": 200,
                     "syncedTimestamp": "2024-01-02T00:00:00Z"}
                ]}"#,
            ),
        );

        let pending = store(mock).read_pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "1");
    }

    #[test]
    fn read_since_carries_starttime() {
        let mock = MockTransport::new();
        mock.stage(
            "GET",
            "http://sync/status?starttime=2024-01-01T00:00:00Z",
            RestResponse::new(200, r#"{"d": []}"#),
        );

        let since = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(store(mock).read_since(since).unwrap().is_empty());
    }

    #[test]
    fn register_created_and_conflict() {
        let mock = MockTransport::new();
        mock.stage("POST", URI, RestResponse::new(201, ""));
        mock.stage("POST", URI, RestResponse::new(409, "duplicate"));

        let store = store(mock);
        assert_eq!(store.register_if_absent(&record()).unwrap(), Register::Created);
        assert_eq!(store.register_if_absent(&record()).unwrap(), Register::Conflict);
    }

    #[test]
    fn register_other_status_is_upstream_error() {
        let mock = MockTransport::new();
        mock.stage("POST", URI, RestResponse::new(500, "boom"));

        let err = store(mock).register_if_absent(&record()).unwrap_err();
        assert!(matches!(err, RestError::Upstream { status: 500, .. }));
    }

    #[test]
    fn outcome_conflict_is_not_an_error() {
        let mock = MockTransport::new();
        mock.stage("PUT", URI, RestResponse::new(409, "concurrent writer"));

        let outcome = store(mock)
            .record_outcome(&record().with_outcome(200, Utc::now()))
            .unwrap();
        assert_eq!(outcome, Upsert::Conflict);
    }

    #[test]
    fn read_rejects_non_2xx() {
        let mock = MockTransport::new();
        mock.stage("GET", URI, RestResponse::new(401, "no"));
        assert!(matches!(
            store(mock).read_all().unwrap_err(),
            RestError::Upstream { status: 401, .. }
        ));
    }
}
