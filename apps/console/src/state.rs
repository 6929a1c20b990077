use serde::{Deserialize, Serialize};

use crate::fixtures::samples::DemoSample;
use crate::models::{Decision, IncidentRecord, InputState, Source};

/// Trimmed character count a log needs before it may be analyzed.
pub const MIN_LOG_CHARS: usize = 5;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    #[default]
    Idle,
    Analyzing,
    Saving,
    Refreshing,
}

impl OperationStatus {
    pub fn is_busy(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Everything the console renders, replaced field-by-field by the orchestrator.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct IncidentState {
    pub input: InputState,
    /// Bumped on every edit so late responses can be told apart from current ones.
    #[serde(default)]
    pub input_revision: u64,
    pub result: Option<Decision>,
    pub error: Option<String>,
    pub history: Vec<IncidentRecord>,
    pub history_error: Option<String>,
    pub analyze_status: OperationStatus,
    pub save_status: OperationStatus,
    pub refresh_status: OperationStatus,
    pub persistence_enabled: bool,
}

impl IncidentState {
    pub fn new(persistence_enabled: bool) -> Self {
        Self {
            persistence_enabled,
            ..Self::default()
        }
    }

    pub fn set_log(&mut self, text: impl Into<String>) {
        self.input.log = text.into();
        self.input_revision += 1;
    }

    pub fn set_source(&mut self, source: Source) {
        self.input.source = source;
        self.input_revision += 1;
    }

    /// Loads a demo sample as a fresh session: both fields at once, no result, no error.
    pub fn apply_sample(&mut self, sample: &DemoSample) {
        self.input = InputState {
            log: sample.log.to_string(),
            source: sample.source,
        };
        self.input_revision += 1;
        self.result = None;
        self.error = None;
    }

    pub fn log_is_long_enough(&self) -> bool {
        self.input.log.trim().chars().count() >= MIN_LOG_CHARS
    }

    pub fn can_analyze(&self) -> bool {
        self.log_is_long_enough() && !self.analyze_status.is_busy()
    }

    pub fn can_save(&self) -> bool {
        self.result.is_some()
            && self.persistence_enabled
            && !self.save_status.is_busy()
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyze_status == OperationStatus::Analyzing
    }

    pub fn is_saving(&self) -> bool {
        self.save_status == OperationStatus::Saving
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh_status == OperationStatus::Refreshing
    }
}
