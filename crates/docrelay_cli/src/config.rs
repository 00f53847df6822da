//! YAML configuration for the replication daemon.

use std::path::{Path, PathBuf};
use std::time::Duration;

use docrelay_engine::{AlertConfig, SchedulerConfig};
use docrelay_model::FieldMap;
use docrelay_rest::{EndpointConfig, HttpTransport, RestError, SourcePoller, StatusStore, TargetPublisher};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML (or has unknown keys).
    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A required value is missing or empty.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Connection settings shared by the three endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointSettings {
    /// Endpoint base URI.
    pub uri: String,
    /// PKCS #12 keystore for peer (client) certificate authentication.
    #[serde(default)]
    pub keystore: Option<PathBuf>,
    /// Password for the keystore.
    #[serde(default)]
    pub keystore_password: Option<String>,
    /// Username for HTTP basic authentication.
    #[serde(default)]
    pub username: Option<String>,
    /// Password for HTTP basic authentication.
    #[serde(default)]
    pub password: Option<String>,
}

/// Source collection settings: endpoint plus field mapping.
///
/// The id and modified-timestamp field names are explicit per-collection
/// configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSettings {
    /// Endpoint base URI.
    pub uri: String,
    /// PKCS #12 keystore for peer (client) certificate authentication.
    #[serde(default)]
    pub keystore: Option<PathBuf>,
    /// Password for the keystore.
    #[serde(default)]
    pub keystore_password: Option<String>,
    /// Field holding the document's unique id; omit to replicate to a
    /// single fixed target resource.
    #[serde(default)]
    pub id_field: Option<String>,
    /// Field holding the document's last-modified timestamp.
    #[serde(default = "default_modified_field")]
    pub modified_field: String,
}

impl SourceSettings {
    fn endpoint(&self) -> EndpointSettings {
        EndpointSettings {
            uri: self.uri.clone(),
            keystore: self.keystore.clone(),
            keystore_password: self.keystore_password.clone(),
            username: None,
            password: None,
        }
    }
}

fn default_modified_field() -> String {
    "lastModified".into()
}

/// Alert composition settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlertSettings {
    /// Subject for failure alerts.
    #[serde(default)]
    pub failure_subject: Option<String>,
    /// Subject for recovery alerts.
    #[serde(default)]
    pub recovery_subject: Option<String>,
    /// Body for recovery alerts.
    #[serde(default)]
    pub recovery_body: Option<String>,
}

/// Top-level daemon configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Source collection to replicate from.
    pub source: SourceSettings,
    /// Target endpoint to replicate to.
    pub target: EndpointSettings,
    /// Status store recording per-document sync state.
    pub status_store: EndpointSettings,
    /// Minutes between polling passes.
    #[serde(default = "default_interval_minutes")]
    pub polling_interval_minutes: u64,
    /// Per-request timeout in seconds.
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
    /// Alert composition overrides.
    #[serde(default)]
    pub alerts: AlertSettings,
}

fn default_interval_minutes() -> u64 {
    5
}

impl Settings {
    /// Loads and validates settings from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let settings: Settings = serde_yaml::from_str(&text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks for values that would only fail later at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, uri) in [
            ("source.uri", &self.source.uri),
            ("target.uri", &self.target.uri),
            ("status_store.uri", &self.status_store.uri),
        ] {
            if uri.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{name} must not be empty")));
            }
        }
        if self.polling_interval_minutes == 0 {
            return Err(ConfigError::Invalid(
                "polling_interval_minutes must be at least 1".into(),
            ));
        }
        if self.source.modified_field.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "source.modified_field must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// The field map for the configured source collection.
    pub fn field_map(&self) -> FieldMap {
        match &self.source.id_field {
            Some(id) => FieldMap::new(id, &self.source.modified_field),
            None => FieldMap::without_id(&self.source.modified_field),
        }
    }

    fn endpoint_config(&self, settings: &EndpointSettings) -> EndpointConfig {
        let mut config = EndpointConfig::default();
        if let Some(keystore) = &settings.keystore {
            config = config.with_keystore(
                keystore,
                settings.keystore_password.clone().unwrap_or_default(),
            );
        }
        if let Some(username) = &settings.username {
            config =
                config.with_basic_auth(username, settings.password.clone().unwrap_or_default());
        }
        if let Some(secs) = self.request_timeout_seconds {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }

    /// Builds the source poller.
    pub fn source_poller(&self) -> Result<SourcePoller<HttpTransport>, RestError> {
        let transport =
            HttpTransport::new("source", &self.endpoint_config(&self.source.endpoint()))?;
        Ok(SourcePoller::new(
            transport,
            &self.source.uri,
            self.field_map(),
        ))
    }

    /// Builds the status store client.
    pub fn status_store(&self) -> Result<StatusStore<HttpTransport>, RestError> {
        let transport =
            HttpTransport::new("status store", &self.endpoint_config(&self.status_store))?;
        Ok(StatusStore::new(transport, &self.status_store.uri))
    }

    /// Builds the target publisher.
    pub fn target_publisher(&self) -> Result<TargetPublisher<HttpTransport>, RestError> {
        let transport = HttpTransport::new("target", &self.endpoint_config(&self.target))?;
        Ok(TargetPublisher::new(transport, &self.target.uri))
    }

    /// The alert composition, with defaults for anything unset.
    pub fn alert_config(&self) -> AlertConfig {
        let defaults = AlertConfig::default();
        AlertConfig {
            failure_subject: self
                .alerts
                .failure_subject
                .clone()
                .unwrap_or(defaults.failure_subject),
            recovery_subject: self
                .alerts
                .recovery_subject
                .clone()
                .unwrap_or(defaults.recovery_subject),
            recovery_body: self
                .alerts
                .recovery_body
                .clone()
                .unwrap_or(defaults.recovery_body),
        }
    }

    /// The scheduler configuration.
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig::new(Duration::from_secs(self.polling_interval_minutes * 60))
    }
}
