//! # docrelay REST
//!
//! REST transport and typed endpoint clients for docrelay.
//!
//! This crate provides:
//! - `RestTransport` trait over plain GET/POST/PUT with raw status + body
//! - `HttpTransport`, a blocking `reqwest` implementation with PKCS#12
//!   client-certificate identity and HTTP basic auth
//! - `MockTransport` with scripted responses for tests
//! - The three endpoint clients: `SourcePoller`, `StatusStore`,
//!   `TargetPublisher`
//!
//! Clients classify outcomes strictly by HTTP status family: 2xx success,
//! 409 conflict (not an error), anything else upstream failure. Transport
//! unreachability and timeouts surface as a distinct, recoverable error.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod http;
mod source;
mod status_store;
mod target;
mod transport;

pub use error::{RestError, RestResult};
pub use http::{EndpointConfig, HttpTransport, DEFAULT_TIMEOUT};
pub use source::SourcePoller;
pub use status_store::{Register, StatusStore, Upsert};
pub use target::{Delivery, TargetPublisher};
pub use transport::{MockTransport, RestResponse, RestTransport};
