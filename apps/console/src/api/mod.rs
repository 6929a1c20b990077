use std::time::Duration;

use anyhow::Context;

use crate::models::{Decision, IncidentRecord, InputState, NewIncidentRecord};

mod history;
mod predict;

pub use history::{HistoryClient, PersistError, HISTORY_LIMIT};
pub use predict::{AnalysisError, PredictClient};

/// Seam over the classification endpoint.
#[allow(async_fn_in_trait)]
pub trait IncidentAnalyzer {
    /// `Ok(None)` when the service answered with a JSON `null`.
    async fn analyze(&self, input: &InputState) -> Result<Option<Decision>, AnalysisError>;
}

/// Seam over the `incident_events` table.
#[allow(async_fn_in_trait)]
pub trait IncidentStore {
    async fn insert(&self, record: &NewIncidentRecord) -> Result<(), PersistError>;

    /// Newest first, at most `limit` rows. Zero rows is a success.
    async fn list_recent(&self, limit: usize) -> Result<Vec<IncidentRecord>, PersistError>;
}

pub(crate) fn build_http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    let builder = reqwest::Client::builder();

    // Browsers own request deadlines on wasm.
    #[cfg(not(target_arch = "wasm32"))]
    let builder = builder.timeout(timeout);
    #[cfg(target_arch = "wasm32")]
    let _ = timeout;

    builder.build().context("failed to build reqwest client")
}

pub(crate) fn normalize_base_url(input: &str) -> String {
    input.trim().trim_end_matches('/').to_string()
}

pub(crate) fn join_path(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url, path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_paths_without_double_slashes() {
        let base = normalize_base_url("http://localhost:8000///");
        assert_eq!(base, "http://localhost:8000");
        assert_eq!(
            join_path(&base, "/api/v1/predict"),
            "http://localhost:8000/api/v1/predict"
        );
    }
}
