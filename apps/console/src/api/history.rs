use std::time::Duration;

use reqwest::{header, Method, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::{build_http_client, join_path, normalize_base_url, IncidentStore};
use crate::config::{AppConfig, PersistenceConfig};
use crate::models::{IncidentRecord, NewIncidentRecord};

pub const HISTORY_LIMIT: usize = 20;

const TABLE_PATH: &str = "rest/v1/incident_events";

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("network error: {message}")]
    Transport { message: String },
    #[error("{message}")]
    Remote { status: u16, message: String },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl PersistError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PersistError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            message: err.to_string(),
        }
    }
}

/// REST client for the `incident_events` table.
#[derive(Clone)]
pub struct HistoryClient {
    inner: reqwest::Client,
    table_url: String,
    anon_key: String,
}

impl HistoryClient {
    pub fn new(config: &PersistenceConfig, timeout: Duration) -> anyhow::Result<Self> {
        let inner = build_http_client(timeout)?;
        Ok(Self {
            inner,
            table_url: join_path(&normalize_base_url(&config.url), TABLE_PATH),
            anon_key: config.anon_key.clone(),
        })
    }

    /// `None` when the app runs without a history backend.
    pub fn from_app_config(config: &AppConfig) -> anyhow::Result<Option<Self>> {
        config
            .persistence
            .as_ref()
            .map(|persistence| Self::new(persistence, config.request_timeout))
            .transpose()
    }

    pub async fn insert_event(&self, record: &NewIncidentRecord) -> Result<(), PersistError> {
        let response = self
            .request(Method::POST)
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        interpret_insert(status, &body)
            .inspect(|_| debug!(source = %record.source, "incident event stored"))
            .inspect_err(|err| warn!(status = status.as_u16(), "incident insert failed: {err}"))
    }

    pub async fn fetch_recent(&self, limit: usize) -> Result<Vec<IncidentRecord>, PersistError> {
        let response = self
            .request(Method::GET)
            .query(&[
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        interpret_rows(status, &body)
            .inspect(|rows| debug!(count = rows.len(), "incident history fetched"))
            .inspect_err(|err| warn!(status = status.as_u16(), "incident history failed: {err}"))
    }

    fn request(&self, method: Method) -> reqwest::RequestBuilder {
        self.inner
            .request(method, &self.table_url)
            .header("apikey", &self.anon_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.anon_key))
    }
}

impl IncidentStore for HistoryClient {
    async fn insert(&self, record: &NewIncidentRecord) -> Result<(), PersistError> {
        self.insert_event(record).await
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<IncidentRecord>, PersistError> {
        self.fetch_recent(limit).await
    }
}

#[derive(Deserialize)]
struct RemoteErrorBody {
    #[serde(default)]
    message: Option<String>,
}

fn remote_error(status: StatusCode, body: &str) -> PersistError {
    let trimmed = body.trim();
    let message = serde_json::from_str::<RemoteErrorBody>(trimmed)
        .ok()
        .and_then(|parsed| parsed.message)
        .filter(|message| !message.trim().is_empty())
        .or_else(|| (!trimmed.is_empty()).then(|| trimmed.to_string()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    PersistError::Remote {
        status: status.as_u16(),
        message,
    }
}

pub(crate) fn interpret_insert(status: StatusCode, body: &str) -> Result<(), PersistError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(remote_error(status, body))
    }
}

pub(crate) fn interpret_rows(
    status: StatusCode,
    body: &str,
) -> Result<Vec<IncidentRecord>, PersistError> {
    if !status.is_success() {
        return Err(remote_error(status, body));
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Option<Vec<IncidentRecord>> = serde_json::from_str(trimmed)?;
    Ok(rows.unwrap_or_default())
}
