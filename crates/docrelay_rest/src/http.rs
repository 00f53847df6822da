//! Blocking `reqwest` transport.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::{RestError, RestResult};
use crate::transport::{RestResponse, RestTransport};

/// Connection settings for one REST endpoint.
///
/// Each of the three endpoints (source, target, status store) gets its own
/// transport, so client-certificate identities and credentials never leak
/// across endpoints.
#[derive(Debug, Clone, Default)]
pub struct EndpointConfig {
    /// PKCS #12 keystore for peer (client) certificate authentication.
    pub keystore: Option<PathBuf>,
    /// Password for the keystore.
    pub keystore_password: Option<String>,
    /// Username for HTTP basic authentication.
    pub username: Option<String>,
    /// Password for HTTP basic authentication.
    pub password: Option<String>,
    /// Request timeout. `None` falls back to [`DEFAULT_TIMEOUT`].
    pub timeout: Option<Duration>,
}

/// Default request timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

impl EndpointConfig {
    /// Sets the keystore and password for client-certificate auth.
    pub fn with_keystore(mut self, path: impl Into<PathBuf>, password: impl Into<String>) -> Self {
        self.keystore = Some(path.into());
        self.keystore_password = Some(password.into());
        self
    }

    /// Sets HTTP basic-auth credentials.
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A blocking HTTP transport for one endpoint.
#[derive(Debug)]
pub struct HttpTransport {
    endpoint: &'static str,
    client: reqwest::blocking::Client,
    basic_auth: Option<(String, String)>,
}

impl HttpTransport {
    /// Builds a transport for the named endpoint.
    ///
    /// Reads the PKCS #12 keystore (when configured) and constructs the
    /// underlying client with the configured timeout.
    pub fn new(endpoint: &'static str, config: &EndpointConfig) -> RestResult<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(config.timeout.unwrap_or(DEFAULT_TIMEOUT));

        if let Some(path) = &config.keystore {
            let der = std::fs::read(path).map_err(|e| RestError::Transport {
                endpoint,
                message: format!("cannot read keystore {}: {e}", path.display()),
            })?;
            let password = config.keystore_password.as_deref().unwrap_or("");
            let identity =
                reqwest::Identity::from_pkcs12_der(&der, password).map_err(|e| {
                    RestError::Transport {
                        endpoint,
                        message: format!("invalid keystore {}: {e}", path.display()),
                    }
                })?;
            builder = builder.identity(identity);
        }

        let client = builder.build().map_err(|e| RestError::Transport {
            endpoint,
            message: e.to_string(),
        })?;

        let basic_auth = match (&config.username, &config.password) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            (Some(user), None) => Some((user.clone(), String::new())),
            _ => None,
        };

        Ok(Self {
            endpoint,
            client,
            basic_auth,
        })
    }

    fn send(&self, request: reqwest::blocking::RequestBuilder) -> RestResult<RestResponse> {
        let request = match &self.basic_auth {
            Some((user, pass)) => request.basic_auth(user, Some(pass)),
            None => request,
        };

        let response = request.send().map_err(|e| self.classify(e))?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| self.classify(e))?;
        debug!(endpoint = self.endpoint, status, "response received");
        Ok(RestResponse { status, body })
    }

    /// Connection refusals and timeouts are the recoverable class; anything
    /// else that prevents a response is a plain transport error.
    fn classify(&self, error: reqwest::Error) -> RestError {
        if error.is_connect() || error.is_timeout() {
            RestError::connection(self.endpoint, error.to_string())
        } else {
            RestError::Transport {
                endpoint: self.endpoint,
                message: error.to_string(),
            }
        }
    }
}

impl RestTransport for HttpTransport {
    fn get(&self, url: &str) -> RestResult<RestResponse> {
        debug!(endpoint = self.endpoint, url, "GET");
        self.send(self.client.get(url))
    }

    fn post(&self, url: &str, body: &Value) -> RestResult<RestResponse> {
        debug!(endpoint = self.endpoint, url, "POST");
        self.send(self.client.post(url).json(body))
    }

    fn put(&self, url: &str, body: &Value) -> RestResult<RestResponse> {
        debug!(endpoint = self.endpoint, url, "PUT");
        self.send(self.client.put(url).json(body))
    }
}
