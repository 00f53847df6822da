//! Error types for the REST boundary.

use thiserror::Error;

/// Result type for REST operations.
pub type RestResult<T> = Result<T, RestError>;

/// Errors raised at the REST boundary.
#[derive(Error, Debug, Clone)]
pub enum RestError {
    /// The endpoint was unreachable or the request timed out.
    ///
    /// Always recoverable: the current reconciliation pass aborts and the
    /// next scheduled pass retries.
    #[error("connection failure talking to {endpoint}: {message}")]
    Connection {
        /// Logical endpoint name (source, target, status store).
        endpoint: &'static str,
        /// Underlying transport message.
        message: String,
    },

    /// A response was obtained but its status is outside 2xx (and not a 409
    /// where conflicts are expected).
    #[error("unexpected response from {endpoint}: {status}")]
    Upstream {
        /// Logical endpoint name.
        endpoint: &'static str,
        /// The offending HTTP status code.
        status: u16,
    },

    /// The request could not be issued or the response could not be read,
    /// for reasons other than reachability.
    #[error("transport error talking to {endpoint}: {message}")]
    Transport {
        /// Logical endpoint name.
        endpoint: &'static str,
        /// Underlying transport message.
        message: String,
    },

    /// A response body was not valid JSON or had an unexpected shape.
    #[error("invalid payload from {endpoint}: {message}")]
    Payload {
        /// Logical endpoint name.
        endpoint: &'static str,
        /// Decode error message.
        message: String,
    },

    /// A document or status record could not be interpreted.
    #[error(transparent)]
    Model(#[from] docrelay_model::ModelError),
}

impl RestError {
    /// Creates a connection error for the named endpoint.
    pub fn connection(endpoint: &'static str, message: impl Into<String>) -> Self {
        Self::Connection {
            endpoint,
            message: message.into(),
        }
    }

    /// Creates an upstream (unexpected HTTP status) error.
    pub fn upstream(endpoint: &'static str, status: u16) -> Self {
        Self::Upstream { endpoint, status }
    }

    /// Creates a payload decode error.
    pub fn payload(endpoint: &'static str, message: impl Into<String>) -> Self {
        Self::Payload {
            endpoint,
            message: message.into(),
        }
    }

    /// Returns true for transport-level unreachability and timeouts.
    pub fn is_connection(&self) -> bool {
        matches!(self, RestError::Connection { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_classification() {
        assert!(RestError::connection("source", "refused").is_connection());
        assert!(!RestError::upstream("source", 503).is_connection());
    }

    #[test]
    fn error_display() {
        let err = RestError::upstream("status store", 418);
        assert_eq!(
            err.to_string(),
            "unexpected response from status store: 418"
        );
    }
}
