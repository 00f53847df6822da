//! Status records: per-document sync bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ModelError, ModelResult};

/// `syncedStatus` value for a record awaiting delivery.
pub const PENDING: u16 = 0;

/// The durable record of whether a document has been delivered to the target
/// and with what outcome.
///
/// One record exists per document id. `synced_status` is `0` while the
/// document awaits delivery and the raw HTTP outcome code of the last
/// delivery attempt afterwards. Records are created exclusively (the store
/// answers 409 for a duplicate id) and never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    /// Document id, primary key in the status store.
    pub id: String,
    /// `lastModified` of the document at registration time.
    #[serde(rename = "lastModified")]
    pub last_modified: DateTime<Utc>,
    /// Delivery state: [`PENDING`] or the last delivery's HTTP outcome code.
    #[serde(rename = "syncedStatus")]
    pub synced_status: u16,
    /// Timestamp of the last delivery attempt, absent while pending.
    #[serde(rename = "syncedTimestamp", skip_serializing_if = "Option::is_none")]
    pub synced_timestamp: Option<DateTime<Utc>>,
}

impl StatusRecord {
    /// Creates a pending record for a newly discovered document.
    pub fn pending(id: impl Into<String>, last_modified: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            last_modified,
            synced_status: PENDING,
            synced_timestamp: None,
        }
    }

    /// Returns true while the document awaits delivery.
    pub fn is_pending(&self) -> bool {
        self.synced_status == PENDING
    }

    /// Returns the record with a recorded delivery outcome.
    pub fn with_outcome(mut self, status: u16, at: DateTime<Utc>) -> Self {
        self.synced_status = status;
        self.synced_timestamp = Some(at);
        self
    }
}

/// The status store's response envelope: `{"d": [StatusRecord, ...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEnvelope {
    /// The wrapped records.
    pub d: Vec<StatusRecord>,
}

/// Decodes a status-store response body into records.
///
/// Accepts the documented `{"d": [...]}` envelope as well as a bare array.
pub fn decode_records(value: Value) -> ModelResult<Vec<StatusRecord>> {
    let items = match value {
        Value::Object(map) if map.contains_key("d") => {
            serde_json::from_value::<StatusEnvelope>(Value::Object(map))
                .map_err(|e| ModelError::Malformed(e.to_string()))?
                .d
        }
        Value::Array(_) => serde_json::from_value(value)
            .map_err(|e| ModelError::Malformed(e.to_string()))?,
        Value::Null => Vec::new(),
        other => {
            return Err(ModelError::Malformed(format!(
                "expected status envelope, got {other}"
            )))
        }
    };
    Ok(items)
}
