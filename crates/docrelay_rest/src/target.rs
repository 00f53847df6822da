//! Target endpoint publisher.

use docrelay_model::Document;
use tracing::debug;

use crate::error::RestResult;
use crate::transport::RestTransport;

/// Outcome of one delivery attempt: the raw HTTP status and body.
///
/// The publisher never interprets the code; that is the reconciliation
/// engine's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// HTTP status code returned by the target.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

/// Write-side client for the target endpoint.
///
/// Posts one document at a time to `targetUri + id`. With no id the target
/// URI itself is the single fixed resource. Redelivery assumes the target
/// overwrites idempotently by id; that is assumed, not verified, here.
pub struct TargetPublisher<T> {
    transport: T,
    base_uri: String,
}

impl<T: RestTransport> TargetPublisher<T> {
    /// Creates a publisher for the target at `base_uri`.
    pub fn new(transport: T, base_uri: impl Into<String>) -> Self {
        Self {
            transport,
            base_uri: base_uri.into(),
        }
    }

    /// Delivers a single document, returning the raw outcome.
    pub fn publish(&self, document: &Document) -> RestResult<Delivery> {
        let url = format!("{}{}", self.base_uri, document.id());
        let response = self.transport.post(&url, document.payload())?;
        debug!(id = document.id(), status = response.status, "published");
        Ok(Delivery {
            status: response.status,
            body: response.body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MockTransport, RestResponse};
    use docrelay_model::FieldMap;
    use serde_json::json;

    fn doc(id: &str) -> Document {
        Document::from_value(
            json!({"id": id, "lastModified": "2024-01-01T00:00:00Z"}),
            &FieldMap::new("id", "lastModified"),
        )
        .unwrap()
    }

    #[test]
    fn publishes_to_id_suffixed_uri() {
        let mock = MockTransport::new();
        mock.stage("POST", "http://tgt/docs/42", RestResponse::new(200, "ok"));

        let publisher = TargetPublisher::new(mock, "http://tgt/docs/");
        let delivery = publisher.publish(&doc("42")).unwrap();
        assert_eq!(delivery.status, 200);
        assert_eq!(delivery.body, "ok");
    }

    #[test]
    fn returns_raw_status_uninterpreted() {
        let mock = MockTransport::new();
        mock.stage("POST", "http://tgt/docs/42", RestResponse::new(500, "boom"));

        let publisher = TargetPublisher::new(mock, "http://tgt/docs/");
        // A 500 is data for the engine, never an error here.
        let delivery = publisher.publish(&doc("42")).unwrap();
        assert_eq!(delivery.status, 500);
        assert_eq!(delivery.body, "boom");
    }

    #[test]
    fn empty_id_targets_the_fixed_resource() {
        let mock = MockTransport::new();
        mock.stage("POST", "http://tgt/inbox", RestResponse::new(202, ""));

        let document = Document::from_value(
            json!({"lastModified": "2024-01-01T00:00:00Z"}),
            &FieldMap::without_id("lastModified"),
        )
        .unwrap();

        let publisher = TargetPublisher::new(mock, "http://tgt/inbox");
        assert_eq!(publisher.publish(&document).unwrap().status, 202);
    }
}
