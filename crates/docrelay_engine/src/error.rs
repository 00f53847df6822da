//! Error taxonomy for the reconciliation engine.

use docrelay_model::ModelError;
use docrelay_rest::RestError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can abort a reconciliation pass.
///
/// Only [`EngineError::Connection`] is recoverable: the scheduler alerts and
/// retries at the next interval. Everything else propagates out and stops
/// the service, so a misconfigured deployment never silently skips data.
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    /// An endpoint was unreachable or a request timed out.
    #[error("{0}")]
    Connection(String),

    /// An endpoint answered outside the expected status family.
    #[error("unexpected response from {endpoint}: {status}")]
    Upstream {
        /// Logical endpoint name.
        endpoint: &'static str,
        /// The offending HTTP status code.
        status: u16,
    },

    /// A configured field was absent on a discovered document.
    ///
    /// Indicates a field-map misconfiguration.
    #[error("document is missing configured field `{field}`")]
    MissingField {
        /// The configured field name.
        field: String,
    },

    /// A payload could not be decoded or interpreted.
    #[error("payload error: {0}")]
    Payload(String),

    /// A request failed for reasons other than reachability.
    #[error("transport error: {0}")]
    Transport(String),
}

impl EngineError {
    /// Returns true if the current pass may simply be retried later.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EngineError::Connection(_))
    }
}

impl From<RestError> for EngineError {
    fn from(err: RestError) -> Self {
        match err {
            RestError::Connection { .. } => EngineError::Connection(err.to_string()),
            RestError::Upstream { endpoint, status } => {
                EngineError::Upstream { endpoint, status }
            }
            RestError::Transport { .. } => EngineError::Transport(err.to_string()),
            RestError::Payload { .. } => EngineError::Payload(err.to_string()),
            RestError::Model(model) => model.into(),
        }
    }
}

impl From<ModelError> for EngineError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::MissingField { field } => EngineError::MissingField { field },
            other => EngineError::Payload(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_connection_is_recoverable() {
        assert!(EngineError::Connection("refused".into()).is_recoverable());
        assert!(!EngineError::Upstream {
            endpoint: "source",
            status: 503
        }
        .is_recoverable());
        assert!(!EngineError::MissingField { field: "id".into() }.is_recoverable());
        assert!(!EngineError::Payload("bad json".into()).is_recoverable());
    }

    #[test]
    fn rest_error_mapping() {
        let err: EngineError = RestError::connection("target", "refused").into();
        assert!(err.is_recoverable());

        let err: EngineError = RestError::upstream("status store", 503).into();
        assert!(matches!(err, EngineError::Upstream { status: 503, .. }));

        let err: EngineError = RestError::Model(ModelError::missing_field("DocumentId")).into();
        assert!(matches!(err, EngineError::MissingField { field } if field == "DocumentId"));
    }
}
