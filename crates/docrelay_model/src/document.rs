//! Source-side documents.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{ModelError, ModelResult};
use crate::fields::FieldMap;
use crate::timestamp::parse_iso8601;

/// A document discovered on the source endpoint.
///
/// The payload is carried verbatim; only the id and last-modified fields are
/// interpreted, using the collection's [`FieldMap`]. Documents are owned and
/// mutated by the source system and are read-only here.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: String,
    last_modified: DateTime<Utc>,
    payload: Value,
}

impl Document {
    /// Interprets a raw JSON value as a document.
    ///
    /// Fails with [`ModelError::MissingField`] when a configured id field is
    /// absent or not a string, and with [`ModelError::InvalidTimestamp`] when
    /// the modified field does not parse. With no id field configured the
    /// document gets the empty id (single fixed resource).
    pub fn from_value(payload: Value, fields: &FieldMap) -> ModelResult<Self> {
        let obj = payload
            .as_object()
            .ok_or_else(|| ModelError::Malformed("document is not a JSON object".into()))?;

        let id = match &fields.id_field {
            Some(field) => obj
                .get(field)
                .and_then(Value::as_str)
                .map(str::to_owned)
                .ok_or_else(|| ModelError::missing_field(field))?,
            None => String::new(),
        };

        let raw_modified = obj
            .get(&fields.modified_field)
            .and_then(Value::as_str)
            .ok_or_else(|| ModelError::missing_field(&fields.modified_field))?;
        let last_modified = parse_iso8601(&fields.modified_field, raw_modified)?;

        Ok(Self {
            id,
            last_modified,
            payload,
        })
    }

    /// The document's unique id (empty when no id field is configured).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The document's last-modified timestamp.
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    /// The raw JSON payload as received from the source.
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Consumes the document, returning the raw payload.
    pub fn into_payload(self) -> Value {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn interprets_configured_fields() {
        let fields = FieldMap::new("DocumentId", "ModifiedOn");
        let doc = Document::from_value(
            json!({"DocumentId": "42", "ModifiedOn": "2024-01-01T00:00:00Z", "name": "x"}),
            &fields,
        )
        .unwrap();

        assert_eq!(doc.id(), "42");
        assert_eq!(
            doc.last_modified(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(doc.payload()["name"], "x");
    }

    #[test]
    fn missing_id_field_is_an_error() {
        let fields = FieldMap::new("id", "lastModified");
        let err = Document::from_value(json!({"lastModified": "2024-01-01T00:00:00Z"}), &fields)
            .unwrap_err();
        assert!(matches!(err, ModelError::MissingField { field } if field == "id"));
    }

    #[test]
    fn non_string_id_is_an_error() {
        let fields = FieldMap::new("id", "lastModified");
        let err = Document::from_value(
            json!({"id": 42, "lastModified": "2024-01-01T00:00:00Z"}),
            &fields,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::MissingField { .. }));
    }

    #[test]
    fn unconfigured_id_field_yields_empty_id() {
        let fields = FieldMap::without_id("lastModified");
        let doc =
            Document::from_value(json!({"lastModified": "2024-01-01T00:00:00Z"}), &fields).unwrap();
        assert_eq!(doc.id(), "");
    }

    #[test]
    fn non_object_payload_is_malformed() {
        let err = Document::from_value(json!([1, 2, 3]), &FieldMap::default()).unwrap_err();
        assert!(matches!(err, ModelError::Malformed(_)));
    }
}
