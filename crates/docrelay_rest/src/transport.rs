//! Transport abstraction for the three REST endpoints.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;

use crate::error::{RestError, RestResult};

/// A raw HTTP response: status code and body, uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl RestResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true for a 409 Conflict.
    pub fn is_conflict(&self) -> bool {
        self.status == 409
    }

    /// Parses the body as JSON.
    pub fn json(&self, endpoint: &'static str) -> RestResult<Value> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.body).map_err(|e| RestError::payload(endpoint, e.to_string()))
    }
}

/// A REST transport issues plain HTTP requests against one endpoint.
///
/// This trait abstracts the HTTP layer, allowing different implementations
/// (blocking reqwest, mock for testing). A transport never interprets status
/// codes; it only distinguishes "got a response" from "could not reach the
/// endpoint".
pub trait RestTransport: Send + Sync {
    /// Issues a GET request.
    fn get(&self, url: &str) -> RestResult<RestResponse>;

    /// Issues a POST request with a JSON body.
    fn post(&self, url: &str, body: &Value) -> RestResult<RestResponse>;

    /// Issues a PUT request with a JSON body.
    fn put(&self, url: &str, body: &Value) -> RestResult<RestResponse>;
}

/// A mock transport with scripted responses, for tests.
///
/// Responses are staged per method + URL and consumed in order; an
/// unscripted request fails loudly. All requests are recorded.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, VecDeque<RestResult<RestResponse>>>>,
    calls: Mutex<Vec<String>>,
}

impl MockTransport {
    /// Creates an empty mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a response for the next matching request.
    pub fn stage(&self, method: &str, url: &str, response: RestResponse) {
        self.stage_result(method, url, Ok(response));
    }

    /// Stages an error for the next matching request.
    pub fn stage_err(&self, method: &str, url: &str, error: RestError) {
        self.stage_result(method, url, Err(error));
    }

    fn stage_result(&self, method: &str, url: &str, result: RestResult<RestResponse>) {
        self.responses
            .lock()
            .unwrap()
            .entry(format!("{method} {url}"))
            .or_default()
            .push_back(result);
    }

    /// Returns the recorded requests as `"METHOD url"` strings.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn dispatch(&self, method: &str, url: &str) -> RestResult<RestResponse> {
        let key = format!("{method} {url}");
        self.calls.lock().unwrap().push(key.clone());
        self.responses
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(RestError::Transport {
                    endpoint: "mock",
                    message: format!("no scripted response for {key}"),
                })
            })
    }
}

impl RestTransport for MockTransport {
    fn get(&self, url: &str) -> RestResult<RestResponse> {
        self.dispatch("GET", url)
    }

    fn post(&self, url: &str, _body: &Value) -> RestResult<RestResponse> {
        self.dispatch("POST", url)
    }

    fn put(&self, url: &str, _body: &Value) -> RestResult<RestResponse> {
        self.dispatch("PUT", url)
    }
}
