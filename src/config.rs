//! Editor configuration loaded from JSON.
//!
//! ```json
//! {
//!   "schema": "student",
//!   "store": {
//!     "backend": "remote",
//!     "base_url": "http://api.login2explore.com:5577",
//!     "db_name": "SCHOOL-DB",
//!     "relation": "STUDENT-TABLE",
//!     "timeout_ms": 5000
//!   },
//!   "message_ttl_ms": 3000
//! }
//! ```
//!
//! `schema` is `"employee"`, `"student"` or `{ "custom": { ... } }`. The
//! remote access token never appears in the file; it is read from the
//! environment variable named by `token_env` (default
//! `RECORD_EDITOR_TOKEN`).

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::error::StoreError;
use crate::message::MessageBox;
use crate::record::{Schema, SchemaError};
use crate::store::{LocalStore, Store};

pub const DEFAULT_TOKEN_ENV: &str = "RECORD_EDITOR_TOKEN";

/// Which schema the editor edits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaSource {
    Employee,
    Student,
    Custom(Schema),
}

/// Which store backend the editor writes to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    /// In-process map, persisted to `path` when given.
    Local {
        #[serde(default)]
        path: Option<PathBuf>,
    },
    #[cfg(feature = "remote")]
    Remote(RemoteConfig),
}

#[cfg(feature = "remote")]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub db_name: String,
    pub relation: String,
    /// Environment variable holding the access token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

#[cfg(feature = "remote")]
fn default_token_env() -> String {
    DEFAULT_TOKEN_ENV.to_string()
}

fn default_ttl_ms() -> u64 {
    3000
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EditorConfig {
    pub schema: SchemaSource,
    pub store: StoreConfig,
    /// Auto-hide delay for shown messages.
    #[serde(default = "default_ttl_ms")]
    pub message_ttl_ms: u64,
}

/// Error building an editor from configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    Io(std::io::Error),
    /// The config is not valid JSON or has the wrong shape.
    Parse(serde_json::Error),
    /// The custom schema is invalid.
    Schema(SchemaError),
    /// The token environment variable is unset or empty.
    MissingToken(String),
    /// The store could not be opened or its client built.
    Store(StoreError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config: {}", e),
            ConfigError::Parse(e) => write!(f, "invalid config: {}", e),
            ConfigError::Schema(e) => write!(f, "invalid schema: {}", e),
            ConfigError::MissingToken(var) => {
                write!(f, "access token variable {} is not set", var)
            }
            ConfigError::Store(e) => write!(f, "cannot open store: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Schema(e) => Some(e),
            ConfigError::Store(e) => Some(e),
            ConfigError::MissingToken(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

impl From<SchemaError> for ConfigError {
    fn from(err: SchemaError) -> Self {
        ConfigError::Schema(err)
    }
}

impl From<StoreError> for ConfigError {
    fn from(err: StoreError) -> Self {
        ConfigError::Store(err)
    }
}

impl EditorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// The configured schema, validated.
    pub fn schema(&self) -> Result<Schema, ConfigError> {
        match &self.schema {
            SchemaSource::Employee => Ok(Schema::employee()),
            SchemaSource::Student => Ok(Schema::student()),
            SchemaSource::Custom(schema) => {
                schema.validate()?;
                Ok(schema.clone())
            }
        }
    }

    pub fn message_ttl(&self) -> Duration {
        Duration::from_millis(self.message_ttl_ms)
    }

    pub fn message_box(&self) -> MessageBox {
        MessageBox::new(self.message_ttl())
    }

    /// Build the configured store, reading the token from the process
    /// environment.
    pub fn build_store(&self, schema: Arc<Schema>) -> Result<Arc<dyn Store>, ConfigError> {
        self.build_store_with_env(schema, |var| std::env::var(var).ok())
    }

    /// Build the configured store, resolving environment variables through
    /// `env`.
    #[cfg_attr(not(feature = "remote"), allow(unused_variables))]
    pub fn build_store_with_env<F>(
        &self,
        schema: Arc<Schema>,
        env: F,
    ) -> Result<Arc<dyn Store>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match &self.store {
            StoreConfig::Local { path: Some(path) } => {
                tracing::info!(path = %path.display(), "opening local store");
                Ok(Arc::new(LocalStore::open(schema, path)?))
            }
            StoreConfig::Local { path: None } => Ok(Arc::new(LocalStore::new(schema))),
            #[cfg(feature = "remote")]
            StoreConfig::Remote(remote) => {
                let token = env(&remote.token_env)
                    .filter(|token| !token.trim().is_empty())
                    .ok_or_else(|| ConfigError::MissingToken(remote.token_env.clone()))?;

                let mut settings = crate::store::RemoteSettings::new(
                    &remote.base_url,
                    token,
                    &remote.db_name,
                    &remote.relation,
                );
                if let Some(ms) = remote.timeout_ms {
                    settings = settings.with_timeout(Duration::from_millis(ms));
                }
                tracing::info!(base_url = %remote.base_url, rel = %remote.relation, "using remote store");
                Ok(Arc::new(crate::store::RemoteStore::new(schema, settings)?))
            }
        }
    }
}
