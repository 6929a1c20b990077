use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Placeholder rendered for decision fields the service left out.
pub const MISSING_FIELD: &str = "undefined";

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    Ci,
    Backend,
    Nginx,
    K8s,
}

impl Source {
    pub const ALL: [Source; 4] = [Source::Ci, Source::Backend, Source::Nginx, Source::K8s];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ci => "ci",
            Self::Backend => "backend",
            Self::Nginx => "nginx",
            Self::K8s => "k8s",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ci => "CI",
            Self::Backend => "Backend",
            Self::Nginx => "Nginx",
            Self::K8s => "Kubernetes",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSource(pub String);

impl fmt::Display for UnknownSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log source `{}`", self.0)
    }
}

impl std::error::Error for UnknownSource {}

impl FromStr for Source {
    type Err = UnknownSource;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|source| source.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownSource(value.to_string()))
    }
}

/// Body of a prediction request.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputState {
    pub log: String,
    pub source: Source,
}

/// Parsed prediction response.
///
/// The service's JSON is kept as-is: unknown fields survive and missing ones
/// are only noticed when a field is read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Decision(Value);

impl Decision {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn field(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn incident_type(&self) -> Option<String> {
        self.field("incident_type")
    }

    pub fn severity(&self) -> Option<String> {
        self.field("severity")
    }

    pub fn team(&self) -> Option<String> {
        self.field("team")
    }

    pub fn action(&self) -> Option<String> {
        self.field("action")
    }

    pub fn confidence(&self) -> Option<f64> {
        self.0.get("confidence").and_then(coerce_number)
    }

    pub fn display_field(&self, key: &str) -> String {
        self.field(key).unwrap_or_else(|| MISSING_FIELD.to_string())
    }

    pub fn confidence_label(&self) -> String {
        format_confidence(self.confidence())
    }

    pub fn pretty_json(&self) -> String {
        let value = self.as_value();
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    }
}

/// Loose numeric coercion for values whose type the server does not promise.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().ok()?
            }
        }
        Value::Bool(flag) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        Value::Null => 0.0,
        Value::Array(_) | Value::Object(_) => return None,
    };
    number.is_finite().then_some(number)
}

pub fn format_confidence(confidence: Option<f64>) -> String {
    match confidence {
        Some(value) => format!("{value:.2}"),
        None => "NaN".to_string(),
    }
}

/// Row written to `incident_events`; `id` and `created_at` are server-assigned.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewIncidentRecord {
    pub source: Source,
    pub log: String,
    pub incident_type: Option<String>,
    pub severity: Option<String>,
    pub team: Option<String>,
    pub confidence: Option<f64>,
    pub action: Option<String>,
}

impl NewIncidentRecord {
    pub fn from_decision(input: &InputState, decision: &Decision) -> Self {
        Self {
            source: input.source,
            log: input.log.clone(),
            incident_type: decision.incident_type(),
            severity: decision.severity(),
            team: decision.team(),
            confidence: decision.confidence(),
            action: decision.action(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IncidentRecord {
    pub id: RecordId,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub log: Option<String>,
    #[serde(default)]
    pub incident_type: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub action: Option<String>,
}

impl IncidentRecord {
    /// Local wall-clock time, or UTC when the local offset cannot be determined.
    pub fn created_at_label(&self) -> String {
        let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
        self.created_at_label_at(offset)
    }

    fn created_at_label_at(&self, offset: UtcOffset) -> String {
        let Some(raw) = self.created_at.as_deref() else {
            return String::new();
        };
        let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
        OffsetDateTime::parse(raw, &Rfc3339)
            .ok()
            .and_then(|parsed| parsed.to_offset(offset).format(&format).ok())
            .unwrap_or_else(|| raw.to_string())
    }

    pub fn confidence_label(&self) -> String {
        format_confidence(self.confidence)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn source_round_trips_through_wire_names() {
        assert_eq!(serde_json::to_value(Source::K8s).unwrap(), json!("k8s"));
        assert_eq!("Backend".parse::<Source>().unwrap(), Source::Backend);
        assert!("syslog".parse::<Source>().is_err());
        assert_eq!(Source::default(), Source::Ci);
    }

    #[test]
    fn prediction_request_body_matches_endpoint_schema() {
        let input = InputState {
            log: "psql: connection refused".into(),
            source: Source::Backend,
        };
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({"log": "psql: connection refused", "source": "backend"})
        );
    }

    #[test]
    fn decision_tolerates_missing_and_extra_fields() {
        let decision = Decision::from_value(json!({
            "incident_type": "timeout",
            "confidence": "0.755",
            "model_version": "v3"
        }));
        assert_eq!(decision.incident_type().as_deref(), Some("timeout"));
        assert_eq!(decision.severity(), None);
        assert_eq!(decision.display_field("team"), MISSING_FIELD);
        assert_eq!(decision.confidence(), Some(0.755));
        assert_eq!(decision.as_value()["model_version"], json!("v3"));
    }

    #[test]
    fn coerce_number_follows_loose_rules() {
        assert_eq!(coerce_number(&json!(0.92)), Some(0.92));
        assert_eq!(coerce_number(&json!(" 0.5 ")), Some(0.5));
        assert_eq!(coerce_number(&json!("")), Some(0.0));
        assert_eq!(coerce_number(&json!(true)), Some(1.0));
        assert_eq!(coerce_number(&Value::Null), Some(0.0));
        assert_eq!(coerce_number(&json!("high")), None);
        assert_eq!(coerce_number(&json!({"p": 1})), None);
    }

    #[test]
    fn confidence_label_uses_two_decimals() {
        assert_eq!(format_confidence(Some(0.8)), "0.80");
        assert_eq!(format_confidence(None), "NaN");
    }

    #[test]
    fn new_record_copies_input_and_decision() {
        let input = InputState {
            log: "403 Forbidden: permission denied".into(),
            source: Source::Nginx,
        };
        let decision = Decision::from_value(json!({
            "incident_type": "auth",
            "severity": "high",
            "team": "security",
            "confidence": 0.7,
            "action": "Verify tokens"
        }));
        let record = NewIncidentRecord::from_decision(&input, &decision);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "source": "nginx",
                "log": "403 Forbidden: permission denied",
                "incident_type": "auth",
                "severity": "high",
                "team": "security",
                "confidence": 0.7,
                "action": "Verify tokens"
            })
        );
    }

    #[test]
    fn incident_record_accepts_loose_column_types() {
        let record: IncidentRecord = serde_json::from_value(json!({
            "id": "9b1c",
            "created_at": "2024-05-01T10:20:30.123456+00:00",
            "source": "ci",
            "confidence": "0.4"
        }))
        .unwrap();
        assert_eq!(record.id, RecordId::Text("9b1c".into()));
        assert_eq!(record.confidence, Some(0.4));
        assert_eq!(record.created_at_label_at(UtcOffset::UTC), "2024-05-01 10:20:30");
        let plus_two = UtcOffset::from_hms(2, 0, 0).unwrap();
        assert_eq!(record.created_at_label_at(plus_two), "2024-05-01 12:20:30");
        assert_eq!(record.team, None);

        let numeric: IncidentRecord =
            serde_json::from_value(json!({"id": 7, "confidence": 0.65, "created_at": "yesterday"}))
                .unwrap();
        assert_eq!(numeric.id.to_string(), "7");
        assert_eq!(numeric.confidence_label(), "0.65");
        assert_eq!(numeric.created_at_label_at(UtcOffset::UTC), "yesterday");
    }
}
