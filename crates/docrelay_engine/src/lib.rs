//! # docrelay Engine
//!
//! Reconciliation and delivery engine for docrelay.
//!
//! This crate provides:
//! - The per-pass reconciliation algorithm (`Reconciler::tick`)
//! - A moving watermark over document modification times
//! - Failure/recovery operator alerting with storm deduplication
//! - A fixed-interval, non-overlapping scheduler
//!
//! ## Architecture
//!
//! Each scheduled pass runs **discovery → registration → delivery**:
//! 1. Discover source documents modified since the watermark
//! 2. Register a pending status record per document, exactly once
//! 3. Deliver each pending document and durably record the outcome
//!
//! ## Key invariants
//!
//! - The watermark only ever advances, and only to modification times of
//!   documents actually discovered
//! - Registration is idempotent: the status store's exclusive create (409 on
//!   duplicate) makes repeated passes safe
//! - Delivery is at-least-once; a lost outcome write leaves the record
//!   pending for redelivery rather than overwriting a newer state
//! - Connection failures abort only the current pass; everything else stops
//!   the service (fail fast on misconfiguration)

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod alert;
mod error;
mod reconciler;
mod scheduler;
mod watermark;

pub use alert::{AlertConfig, AlertError, AlertGateway, AlertSink, LogSink, MemorySink};
pub use error::{EngineError, EngineResult};
pub use reconciler::{Reconciler, TickReport};
pub use scheduler::{Scheduler, SchedulerConfig};
pub use watermark::Watermark;
