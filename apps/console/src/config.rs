use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

const KEY_API_BASE_URL: &str = "INCIDENT_API_BASE_URL";
const KEY_SUPABASE_URL: &str = "INCIDENT_SUPABASE_URL";
const KEY_SUPABASE_ANON_KEY: &str = "INCIDENT_SUPABASE_ANON_KEY";
const KEY_PROFILE: &str = "INCIDENT_PROFILE";
const KEY_REQUEST_TIMEOUT_SECS: &str = "INCIDENT_REQUEST_TIMEOUT_SECS";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppProfile {
    Dev,
    Prod,
}

impl AppProfile {
    pub fn from_env(value: Option<String>) -> Self {
        match value.as_deref().map(str::trim) {
            Some("prod") | Some("production") => Self::Prod,
            _ => Self::Dev,
        }
    }

    pub fn log_level(self) -> tracing::Level {
        match self {
            Self::Dev => tracing::Level::INFO,
            Self::Prod => tracing::Level::WARN,
        }
    }
}

/// Connection details for the incident history table.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistenceConfig {
    pub url: String,
    pub anon_key: String,
}

impl PersistenceConfig {
    /// Both halves must be present; a lone URL or key disables persistence.
    fn from_parts(url: Option<String>, anon_key: Option<String>) -> Option<Self> {
        let url = url.map(|value| value.trim().to_string())?;
        let anon_key = anon_key.map(|value| value.trim().to_string())?;
        if url.is_empty() || anon_key.is_empty() {
            return None;
        }
        Some(Self { url, anon_key })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_base_url: String,
    pub persistence: Option<PersistenceConfig>,
    pub profile: AppProfile,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            persistence: None,
            profile: AppProfile::Dev,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        crate::config::load_dotenv();

        Self::from_lookup(read_env)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = read(KEY_API_BASE_URL) {
            config.api_base_url = url.trim().to_string();
        }

        config.persistence =
            PersistenceConfig::from_parts(read(KEY_SUPABASE_URL), read(KEY_SUPABASE_ANON_KEY));

        config.profile = AppProfile::from_env(read(KEY_PROFILE));

        if let Some(secs) =
            read(KEY_REQUEST_TIMEOUT_SECS).and_then(|value| value.trim().parse::<u64>().ok())
        {
            config.request_timeout = Duration::from_secs(secs.max(1));
        }

        config
    }

    pub fn persistence_enabled(&self) -> bool {
        self.persistence.is_some()
    }
}

fn read_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .or_else(|| option_env_from_build(key).map(|s| s.to_string()))
}

fn option_env_from_build(key: &str) -> Option<&'static str> {
    match key {
        KEY_API_BASE_URL => option_env!("INCIDENT_API_BASE_URL"),
        KEY_SUPABASE_URL => option_env!("INCIDENT_SUPABASE_URL"),
        KEY_SUPABASE_ANON_KEY => option_env!("INCIDENT_SUPABASE_ANON_KEY"),
        KEY_PROFILE => option_env!("INCIDENT_PROFILE"),
        KEY_REQUEST_TIMEOUT_SECS => option_env!("INCIDENT_REQUEST_TIMEOUT_SECS"),
        _ => None,
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_dotenv() {
    if let Err(err) = dotenvy::dotenv() {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            tracing::warn!("failed to load .env: {err}");
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[inline]
pub fn load_dotenv() {}
