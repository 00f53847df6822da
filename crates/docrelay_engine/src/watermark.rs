//! The moving discovery watermark.

use chrono::{DateTime, Utc};
use docrelay_model::{format_iso8601, minimum_timestamp, StatusRecord};

/// The timestamp boundary below which all source changes are assumed
/// already discovered.
///
/// Process-local and in-memory. Lost on restart and recovered
/// deterministically from the status store: the maximum `lastModified`
/// among records that already carry a delivery outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Watermark(DateTime<Utc>);

impl Watermark {
    /// The minimum representable watermark.
    pub fn minimum() -> Self {
        Self(minimum_timestamp())
    }

    /// Creates a watermark at the given timestamp.
    pub fn at(ts: DateTime<Utc>) -> Self {
        Self(ts)
    }

    /// Computes the initial watermark from the status store's records:
    /// the highest `lastModified` among already-handled (non-pending)
    /// records, or the minimum if none exist.
    pub fn bootstrap(records: &[StatusRecord]) -> Self {
        records
            .iter()
            .filter(|r| !r.is_pending())
            .map(|r| r.last_modified)
            .max()
            .map(Self)
            .unwrap_or_else(Self::minimum)
    }

    /// The current boundary.
    pub fn value(&self) -> DateTime<Utc> {
        self.0
    }

    /// Returns true while still at the minimum (nothing handled yet).
    pub fn is_minimum(&self) -> bool {
        self.0 == minimum_timestamp()
    }

    /// Advances to `ts` if it is greater, returning whether it moved.
    ///
    /// Never moves backwards.
    pub fn advance(&mut self, ts: DateTime<Utc>) -> bool {
        if ts > self.0 {
            self.0 = ts;
            true
        } else {
            false
        }
    }
}

impl std::fmt::Display for Watermark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_iso8601(self.0))
    }
}
