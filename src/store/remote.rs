//! RemoteStore - records kept in a JSON database reached over HTTP.
//!
//! Every call is a `POST` with the envelope
//!
//! ```json
//! { "token": "...", "dbName": "SCHOOL-DB", "rel": "STUDENT-TABLE", "jsonStr": ... }
//! ```
//!
//! where `jsonStr` is a filter object for lookups and a JSON-encoded string of
//! the full record for writes. The reply carries its own `status`; only `200`
//! is success. A found record sits at `data[0].record`, itself a JSON string.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Store;
use crate::error::StoreError;
use crate::record::{Record, Schema};

/// Envelope status the database uses for success.
const STATUS_OK: u16 = 200;
/// Envelope status the database uses when a lookup matches nothing.
const STATUS_NO_RECORD: u16 = 400;

/// Connection settings for a [`RemoteStore`].
#[derive(Clone)]
pub struct RemoteSettings {
    /// Base URL, e.g. `https://api.jsonpowerdb.com`.
    pub base_url: String,
    /// Access token. Injected at runtime, never compiled in.
    pub token: String,
    pub db_name: String,
    pub relation: String,
    pub timeout: Option<Duration>,
    pub get_path: String,
    pub put_path: String,
    pub update_path: String,
}

impl RemoteSettings {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        db_name: impl Into<String>,
        relation: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            db_name: db_name.into(),
            relation: relation.into(),
            timeout: None,
            get_path: "/api/irl/get".into(),
            put_path: "/api/irl/put".into(),
            update_path: "/api/irl/update".into(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl fmt::Debug for RemoteSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSettings")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("db_name", &self.db_name)
            .field("relation", &self.relation)
            .field("timeout", &self.timeout)
            .field("get_path", &self.get_path)
            .field("put_path", &self.put_path)
            .field("update_path", &self.update_path)
            .finish()
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    token: &'a str,
    #[serde(rename = "dbName")]
    db_name: &'a str,
    rel: &'a str,
    #[serde(rename = "jsonStr")]
    json_str: Value,
}

#[derive(Debug, Deserialize)]
struct Reply {
    status: u16,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

impl Reply {
    fn into_rejection(self) -> StoreError {
        StoreError::Rejected {
            status: self.status,
            message: self.message.unwrap_or_else(|| "Unknown error".into()),
        }
    }
}

/// Store backed by a remote JSON database.
#[derive(Clone)]
pub struct RemoteStore {
    schema: Arc<Schema>,
    settings: RemoteSettings,
    client: reqwest::Client,
}

impl RemoteStore {
    pub fn new(schema: impl Into<Arc<Schema>>, settings: RemoteSettings) -> Result<Self, StoreError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self::with_client(schema, settings, client))
    }

    pub fn with_client(
        schema: impl Into<Arc<Schema>>,
        settings: RemoteSettings,
        client: reqwest::Client,
    ) -> Self {
        Self {
            schema: schema.into(),
            settings,
            client,
        }
    }

    pub fn settings(&self) -> &RemoteSettings {
        &self.settings
    }

    async fn call(&self, path: &str, json_str: Value) -> Result<Reply, StoreError> {
        let url = self.settings.url(path);
        let envelope = Envelope {
            token: &self.settings.token,
            db_name: &self.settings.db_name,
            rel: &self.settings.relation,
            json_str,
        };

        tracing::debug!(%url, rel = %self.settings.relation, "remote store request");
        let response = self
            .client
            .post(&url)
            .json(&envelope)
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;
        let reply: Reply = serde_json::from_slice(&body)?;
        tracing::debug!(%url, status = reply.status, "remote store reply");
        Ok(reply)
    }

    fn filter(&self, key: &str) -> Value {
        let mut filter = Map::new();
        filter.insert(self.schema.key_field().id.clone(), Value::String(key.to_string()));
        Value::Object(filter)
    }

    fn decode_found(&self, data: Value) -> Result<Option<Record>, StoreError> {
        // Some deployments return `data` as a JSON-encoded string.
        let data = match data {
            Value::String(s) if s.trim().is_empty() => return Ok(None),
            Value::String(s) => serde_json::from_str(&s)?,
            other => other,
        };

        let entry = match data {
            Value::Array(mut entries) if !entries.is_empty() => entries.swap_remove(0),
            Value::Object(object) => Value::Object(object),
            _ => return Ok(None),
        };

        match entry.get("record") {
            Some(Value::String(json)) => Ok(Some(self.schema.decode_str(json)?)),
            Some(record @ Value::Object(_)) => Ok(Some(self.schema.decode(record)?)),
            _ => Err(StoreError::Serde("lookup reply has no record".into())),
        }
    }

    async fn write(&self, path: &str, record: &Record) -> Result<(), StoreError> {
        let json_str = Value::String(self.schema.encode_str(record));
        let reply = self.call(path, json_str).await?;
        if reply.status == STATUS_OK {
            Ok(())
        } else {
            Err(reply.into_rejection())
        }
    }
}

#[async_trait]
impl Store for RemoteStore {
    fn backend(&self) -> &'static str {
        "remote"
    }

    async fn lookup(&self, key: &str) -> Result<Option<Record>, StoreError> {
        let reply = self.call(&self.settings.get_path, self.filter(key)).await?;
        match reply.status {
            STATUS_OK => match reply.data {
                Some(data) => self.decode_found(data),
                None => Ok(None),
            },
            STATUS_NO_RECORD => Ok(None),
            _ => Err(reply.into_rejection()),
        }
    }

    async fn create(&self, key: &str, record: &Record) -> Result<(), StoreError> {
        if self.lookup(key).await?.is_some() {
            return Err(StoreError::Conflict { key: key.to_string() });
        }
        self.write(&self.settings.put_path, record).await
    }

    async fn update(&self, key: &str, record: &Record) -> Result<(), StoreError> {
        if self.lookup(key).await?.is_none() {
            return Err(StoreError::NotFound { key: key.to_string() });
        }
        self.write(&self.settings.update_path, record).await
    }
}
