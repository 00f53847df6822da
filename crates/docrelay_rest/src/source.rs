//! Source endpoint client.

use chrono::{DateTime, Utc};
use docrelay_model::{flatten, format_iso8601, Document, FieldMap};
use tracing::debug;

use crate::error::{RestError, RestResult};
use crate::transport::RestTransport;

const ENDPOINT: &str = "source";

/// Read-only client for the source endpoint.
///
/// Discovers documents modified since a watermark and fetches full documents
/// by id. Fails with [`RestError::Upstream`] on any non-2xx response.
pub struct SourcePoller<T> {
    transport: T,
    base_uri: String,
    fields: FieldMap,
}

impl<T: RestTransport> SourcePoller<T> {
    /// Creates a poller for the collection at `base_uri`.
    pub fn new(transport: T, base_uri: impl Into<String>, fields: FieldMap) -> Self {
        Self {
            transport,
            base_uri: base_uri.into().trim_end_matches('/').to_owned(),
            fields,
        }
    }

    /// The field map used to interpret this collection's documents.
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Queries the source for documents with `lastModified >= watermark`.
    ///
    /// Normalizes bare-array and single-key-wrapped responses to a flat
    /// sequence.
    pub fn discover_modified(&self, watermark: DateTime<Utc>) -> RestResult<Vec<Document>> {
        let url = format!(
            "{}?starttime={}",
            self.base_uri,
            format_iso8601(watermark)
        );
        let response = self.transport.get(&url)?;
        if !response.is_success() {
            return Err(RestError::upstream(ENDPOINT, response.status));
        }

        let raw = flatten(response.json(ENDPOINT)?);
        debug!(count = raw.len(), "source discovery returned documents");
        raw.into_iter()
            .map(|value| Document::from_value(value, &self.fields).map_err(RestError::from))
            .collect()
    }

    /// Fetches one full document by id.
    pub fn fetch_by_id(&self, id: &str) -> RestResult<Document> {
        let url = format!("{}/{id}", self.base_uri);
        let response = self.transport.get(&url)?;
        if !response.is_success() {
            return Err(RestError::upstream(ENDPOINT, response.status));
        }
        Document::from_value(response.json(ENDPOINT)?, &self.fields).map_err(RestError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MockTransport, RestResponse};
    use chrono::TimeZone;

    fn poller(mock: MockTransport) -> SourcePoller<MockTransport> {
        SourcePoller::new(
            mock,
            "http://src/docs/",
            FieldMap::new("id", "lastModified"),
        )
    }

    fn watermark() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn discovery_unwraps_single_key_response() {
        let mock = MockTransport::new();
        mock.stage(
            "GET",
            "http://src/docs?starttime=2024-01-01T00:00:00Z",
            RestResponse::new(
                200,
                r#"{"results": [{"id": "1", "lastModified": "2024-01-02T00:00:00Z"}]}"#,
            ),
        );

        let docs = poller(mock).discover_modified(watermark()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id(), "1");
    }

    #[test]
    fn discovery_accepts_bare_array() {
        let mock = MockTransport::new();
        mock.stage(
            "GET",
            "http://src/docs?starttime=2024-01-01T00:00:00Z",
            RestResponse::new(
                200,
                r#"[{"id": "1", "lastModified": "2024-01-02T00:00:00Z"},
                    {"id": "2", "lastModified": "2024-01-03T00:00:00Z"}]"#,
            ),
        );

        let docs = poller(mock).discover_modified(watermark()).unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn discovery_rejects_non_2xx() {
        let mock = MockTransport::new();
        mock.stage(
            "GET",
            "http://src/docs?starttime=2024-01-01T00:00:00Z",
            RestResponse::new(503, "down"),
        );

        let err = poller(mock).discover_modified(watermark()).unwrap_err();
        assert!(matches!(err, RestError::Upstream { status: 503, .. }));
    }

    #[test]
    fn fetch_by_id() {
        let mock = MockTransport::new();
        mock.stage(
            "GET",
            "http://src/docs/42",
            RestResponse::new(200, r#"{"id": "42", "lastModified": "2024-01-02T00:00:00Z"}"#),
        );

        let doc = poller(mock).fetch_by_id("42").unwrap();
        assert_eq!(doc.id(), "42");
    }

    #[test]
    fn missing_configured_field_surfaces_as_model_error() {
        let mock = MockTransport::new();
        mock.stage(
            "GET",
            "http://src/docs?starttime=2024-01-01T00:00:00Z",
            RestResponse::new(200, r#"[{"lastModified": "2024-01-02T00:00:00Z"}]"#),
        );

        let err = poller(mock).discover_modified(watermark()).unwrap_err();
        assert!(matches!(err, RestError::Model(_)));
    }
}
