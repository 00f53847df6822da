//! # docrelay Model
//!
//! Data model and wire types for docrelay.
//!
//! This crate provides:
//! - `Document` for source-side entities
//! - `StatusRecord` for per-document sync bookkeeping
//! - `FieldMap` for per-collection field-name configuration
//! - Feed-shape normalization for source responses
//! - ISO-8601 timestamp helpers
//!
//! This is a pure data crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod document;
mod error;
mod feed;
mod fields;
mod status;
mod timestamp;

pub use document::Document;
pub use error::{ModelError, ModelResult};
pub use feed::flatten;
pub use fields::FieldMap;
pub use status::{decode_records, StatusEnvelope, StatusRecord, PENDING};
pub use timestamp::{format_iso8601, minimum_timestamp, parse_iso8601};
