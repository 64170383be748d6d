use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use shared::protocol::{AnalysisResult, AnalyzeRequest, BackendErrorBody, HealthStatus};
use thiserror::Error;
use tracing::{debug, warn};

pub mod controller;
pub mod markup;
pub mod report;
pub mod settings;
pub mod store;
pub mod wearable;

pub use controller::{Alert, Completion, SkipReason, SubmitOutcome, WorkflowController};
pub use markup::{DisplayTree, LightMarkup, MarkupRenderer};
pub use report::{render_report, render_screen, InputForm, ReportView, RiskTone, Screen};
pub use settings::{load_settings, ClientSettings};
pub use store::{SessionStore, SessionView};
pub use wearable::{SimulatedWearable, WearableDevice};

/// Single alert shown for every failed analysis, whatever the cause.
pub const SERVICE_OFFLINE_MESSAGE: &str =
    "Analysis service is currently offline. Please ensure the backend server is running.";

const MAX_ERROR_DETAIL_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("analysis service unreachable: {0}")]
    Unreachable(String),
    #[error("analysis service returned status {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("analysis service returned a malformed body: {0}")]
    MalformedBody(String),
}

impl ServiceError {
    /// Transport and body failures collapse into one message for the user;
    /// the variant is only kept for the developer trace.
    pub fn user_message(&self) -> &'static str {
        SERVICE_OFFLINE_MESSAGE
    }
}

#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisResult, ServiceError>;
    async fn health_check(&self) -> Result<HealthStatus, ServiceError>;
}

pub struct HttpAnalysisService {
    http: Client,
    analysis_url: String,
    health_url: String,
}

impl HttpAnalysisService {
    pub fn new(analysis_url: impl Into<String>, health_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            analysis_url: analysis_url.into(),
            health_url: health_url.into(),
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self::new(settings.analysis_url.clone(), settings.health_url.clone())
    }

    pub fn analysis_url(&self) -> &str {
        &self.analysis_url
    }

    async fn read_body(response: reqwest::Response) -> Result<(StatusCode, String), ServiceError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ServiceError::Unreachable(format!("failed to read response body: {err}")))?;
        Ok((status, body))
    }
}

fn status_error(status: StatusCode, body: &str) -> ServiceError {
    let detail = match serde_json::from_str::<BackendErrorBody>(body) {
        Ok(envelope) => envelope.error,
        Err(_) => truncate_detail(body),
    };
    ServiceError::Status {
        status: status.as_u16(),
        detail,
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisService {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisResult, ServiceError> {
        debug!(url = %self.analysis_url, "posting analysis request");
        let response = self
            .http
            .post(&self.analysis_url)
            .json(request)
            .send()
            .await
            .map_err(|err| ServiceError::Unreachable(err.to_string()))?;

        let (status, body) = Self::read_body(response).await?;
        // Any JSON reply becomes the result, whatever the status; the report
        // shape is checked when it is rendered.
        let value: Value = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(_) if !status.is_success() => return Err(status_error(status, &body)),
            Err(err) => return Err(ServiceError::MalformedBody(err.to_string())),
        };
        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                detail = %status_error(status, &body),
                "analysis service answered with an error status"
            );
        }
        Ok(AnalysisResult::from_value(value))
    }

    async fn health_check(&self) -> Result<HealthStatus, ServiceError> {
        let response = self
            .http
            .get(&self.health_url)
            .send()
            .await
            .map_err(|err| ServiceError::Unreachable(err.to_string()))?;

        let (status, body) = Self::read_body(response).await?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        serde_json::from_str(&body).map_err(|err| ServiceError::MalformedBody(err.to_string()))
    }
}

fn truncate_detail(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_ERROR_DETAIL_LEN {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(MAX_ERROR_DETAIL_LEN).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
