use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{build_http_client, join_path, normalize_base_url, IncidentAnalyzer};
use crate::config::AppConfig;
use crate::models::{Decision, InputState};

const PREDICT_PATH: &str = "api/v1/predict";
const HEALTH_PATH: &str = "health";
const REQUEST_ID_HEADER: &str = "X-Request-Id";

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("network error: {message}")]
    Transport { message: String },
    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl AnalysisError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            message: err.to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Client for the classification service. One attempt per call, no retries.
#[derive(Clone)]
pub struct PredictClient {
    inner: reqwest::Client,
    base_url: String,
}

impl PredictClient {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let inner = build_http_client(config.request_timeout)?;
        Ok(Self {
            inner,
            base_url: normalize_base_url(&config.api_base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn predict(&self, input: &InputState) -> Result<Option<Decision>, AnalysisError> {
        let request_id = Uuid::new_v4();
        let url = join_path(&self.base_url, PREDICT_PATH);
        debug!(%request_id, source = %input.source, "sending prediction request");

        let response = self
            .inner
            .post(url)
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .json(input)
            .send()
            .await
            .inspect_err(|err| warn!(%request_id, "prediction transport failure: {err}"))?;

        let status = response.status();
        let body = response.text().await?;
        let outcome = interpret_prediction(status, &body);

        match &outcome {
            Ok(Some(_)) => info!(%request_id, status = status.as_u16(), "prediction received"),
            Ok(None) => warn!(%request_id, status = status.as_u16(), "prediction body was null"),
            Err(err) => warn!(%request_id, status = status.as_u16(), "prediction failed: {err}"),
        }

        outcome
    }

    pub async fn health(&self) -> Result<HealthStatus, AnalysisError> {
        let url = join_path(&self.base_url, HEALTH_PATH);
        let response = self.inner.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

impl IncidentAnalyzer for PredictClient {
    async fn analyze(&self, input: &InputState) -> Result<Option<Decision>, AnalysisError> {
        self.predict(input).await
    }
}

/// Error bodies are opaque text; success bodies only have to be JSON. A `null`
/// body carries no decision.
pub(crate) fn interpret_prediction(
    status: StatusCode,
    body: &str,
) -> Result<Option<Decision>, AnalysisError> {
    if !status.is_success() {
        return Err(AnalysisError::Status {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    let value: Value = serde_json::from_str(body)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(Decision::from_value(value)))
}
