use std::{borrow::Cow, fmt};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    domain::{coerce_number, BiometricProfile, Lifestyle},
    error::ReportError,
};

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest {
    pub user_data: UserData,
}

/// Numeric fields are plain `f64`; a NaN serializes as JSON `null`.
#[derive(Debug, Clone, Serialize)]
pub struct UserData {
    pub age: f64,
    pub bmi: f64,
    pub bp: f64,
    pub sugar: f64,
    pub lifestyle: Lifestyle,
}

impl From<&BiometricProfile> for AnalyzeRequest {
    fn from(profile: &BiometricProfile) -> Self {
        Self {
            user_data: UserData {
                age: coerce_number(&profile.age),
                bmi: coerce_number(&profile.bmi),
                bp: coerce_number(&profile.systolic_bp),
                sugar: coerce_number(&profile.fasting_glucose),
                lifestyle: profile.lifestyle,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Other(String),
}

impl RiskLevel {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Low" => Self::Low,
            "Medium" => Self::Medium,
            "High" => Self::High,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Other(label) => label,
        }
    }

    pub fn is_high(&self) -> bool {
        matches!(self, Self::High)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend report kept exactly as parsed. Nothing is checked until a section
/// is read, and a read of a missing section fails instead of defaulting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult(Value);

impl AnalysisResult {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn risk_level(&self) -> Result<RiskLevel, ReportError> {
        text_at(&self.0, "risk_analysis.risk_level").map(|label| RiskLevel::from_label(&label))
    }

    pub fn risk_explanation(&self) -> Result<Cow<'_, str>, ReportError> {
        text_at(&self.0, "risk_analysis.explanation")
    }

    pub fn guidelines(&self) -> Result<Vec<Cow<'_, str>>, ReportError> {
        let items = lookup(&self.0, "guidelines")?
            .as_array()
            .ok_or_else(|| ReportError::wrong_type("guidelines", "an array"))?;
        items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                scalar_text(item)
                    .ok_or_else(|| ReportError::wrong_type(format!("guidelines[{idx}]"), "text"))
            })
            .collect()
    }

    pub fn recommendation(&self) -> Result<Cow<'_, str>, ReportError> {
        text_at(&self.0, "recommendation")
    }
}

fn lookup<'a>(root: &'a Value, path: &str) -> Result<&'a Value, ReportError> {
    let mut current = root;
    let mut walked = String::new();
    for segment in path.split('.') {
        if !walked.is_empty() {
            walked.push('.');
        }
        walked.push_str(segment);
        current = match current.get(segment) {
            Some(Value::Null) | None => return Err(ReportError::missing(walked)),
            Some(next) => next,
        };
    }
    Ok(current)
}

// Numbers and booleans are shown as written; only containers are rejected.
fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(text) => Some(Cow::Borrowed(text)),
        Value::Number(number) => Some(Cow::Owned(number.to_string())),
        Value::Bool(flag) => Some(Cow::Owned(flag.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn text_at<'a>(root: &'a Value, path: &str) -> Result<Cow<'a, str>, ReportError> {
    scalar_text(lookup(root, path)?).ok_or_else(|| ReportError::wrong_type(path, "text"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub system: String,
}

/// Error envelope the backend returns alongside non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendErrorBody {
    pub error: String,
}
