//! Error types for the model crate.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while interpreting wire payloads.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A configured field is absent (or has the wrong type) on a document.
    ///
    /// This indicates a misconfigured field map and is always fatal.
    #[error("document is missing configured field `{field}`")]
    MissingField {
        /// Name of the configured field.
        field: String,
    },

    /// A timestamp field could not be parsed as ISO-8601.
    #[error("field `{field}` holds unparsable timestamp `{value}`")]
    InvalidTimestamp {
        /// Name of the field.
        field: String,
        /// The raw value found.
        value: String,
    },

    /// A payload did not have the expected JSON shape.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl ModelError {
    /// Creates a `MissingField` error for the named field.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}
