use super::*;
use std::{sync::Mutex as StdMutex, time::Duration};

use async_trait::async_trait;
use serde_json::{json, Value};
use shared::domain::Lifestyle;

use crate::{wearable::SimulatedWearable, SERVICE_OFFLINE_MESSAGE};

type Responder = Box<dyn Fn() -> Result<AnalysisResult, ServiceError> + Send + Sync>;

struct RecordingService {
    requests: Arc<StdMutex<Vec<Value>>>,
    respond: Responder,
}

impl RecordingService {
    fn ok(body: Value) -> Self {
        Self {
            requests: Arc::new(StdMutex::new(Vec::new())),
            respond: Box::new(move || Ok(AnalysisResult::from_value(body.clone()))),
        }
    }

    fn offline() -> Self {
        Self {
            requests: Arc::new(StdMutex::new(Vec::new())),
            respond: Box::new(|| {
                Err(ServiceError::Unreachable(
                    "error sending request: connection refused".to_string(),
                ))
            }),
        }
    }

    fn malformed() -> Self {
        Self {
            requests: Arc::new(StdMutex::new(Vec::new())),
            respond: Box::new(|| {
                Err(ServiceError::MalformedBody(
                    "expected value at line 1 column 1".to_string(),
                ))
            }),
        }
    }
}

#[async_trait]
impl AnalysisService for RecordingService {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisResult, ServiceError> {
        let body = serde_json::to_value(request).expect("serialize request");
        self.requests.lock().expect("requests lock").push(body);
        (self.respond)()
    }

    async fn health_check(&self) -> Result<HealthStatus, ServiceError> {
        Ok(HealthStatus {
            status: "active".to_string(),
            system: "test double".to_string(),
        })
    }
}

fn report_body() -> Value {
    json!({
        "risk_analysis": { "risk_level": "Low", "explanation": "All markers in range." },
        "guidelines": ["Keep it up."],
        "recommendation": "Annual check-up."
    })
}

fn controller_with(service: RecordingService) -> (WorkflowController, Arc<StdMutex<Vec<Value>>>) {
    let requests = Arc::clone(&service.requests);
    let controller = WorkflowController::new(
        Arc::new(service),
        Arc::new(SimulatedWearable::default()),
    );
    (controller, requests)
}

fn request_count(requests: &Arc<StdMutex<Vec<Value>>>) -> usize {
    requests.lock().expect("requests lock").len()
}

#[test]
fn edits_are_last_write_wins_per_field() {
    let (mut controller, _) = controller_with(RecordingService::ok(report_body()));

    controller.edit_field(ProfileField::Age, "30").expect("edit");
    controller.edit_field(ProfileField::Bmi, "22").expect("edit");
    controller.edit_field(ProfileField::Age, "31").expect("edit");
    controller.edit_named_field("sugar", "90").expect("edit");
    controller.edit_named_field("lifestyle", "Active").expect("edit");
    controller.edit_field(ProfileField::Bmi, "").expect("edit");

    let profile = controller.store().profile();
    assert_eq!(profile.age, "31");
    assert_eq!(profile.bmi, "");
    assert_eq!(profile.systolic_bp, "");
    assert_eq!(profile.fasting_glucose, "90");
    assert_eq!(profile.lifestyle, Lifestyle::Active);
    assert_eq!(controller.store().view(), SessionView::Input);
    assert!(controller.store().result().is_none());
}

#[test]
fn rejected_edits_leave_the_profile_untouched() {
    let (mut controller, _) = controller_with(RecordingService::ok(report_body()));
    controller.edit_field(ProfileField::Age, "44").expect("edit");
    let before = controller.store().clone();

    assert_eq!(
        controller.edit_named_field("weight", "80"),
        Err(EditError::UnknownField("weight".to_string()))
    );
    assert!(controller
        .edit_field(ProfileField::Lifestyle, "couch potato")
        .is_err());

    assert_eq!(controller.store(), &before);
}

#[tokio::test(start_paused = true)]
async fn sync_replaces_profile_after_delay() {
    let (mut controller, _) = controller_with(RecordingService::ok(report_body()));
    controller.edit_field(ProfileField::Age, "70").expect("edit");
    controller.edit_field(ProfileField::Lifestyle, "Active").expect("edit");

    controller.sync_device();
    assert!(controller.store().is_busy());

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(controller.process_completions(), 0);
    assert!(controller.store().is_busy());
    assert_eq!(controller.store().profile().age, "70");

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(controller.process_completions(), 1);
    assert!(!controller.store().is_busy());
    assert_eq!(
        controller.store().profile(),
        &BiometricProfile::canonical_wearable()
    );
}

#[tokio::test(start_paused = true)]
async fn sync_overwrites_edits_made_while_pending() {
    let (mut controller, _) = controller_with(RecordingService::ok(report_body()));

    controller.sync_device();
    controller.edit_field(ProfileField::Age, "30").expect("edit");
    controller.settle().await;

    assert_eq!(
        controller.store().profile(),
        &BiometricProfile::canonical_wearable()
    );
    assert!(!controller.store().is_busy());
}

#[tokio::test(start_paused = true)]
async fn overlapping_syncs_keep_busy_until_the_last_completes() {
    let (mut controller, _) = controller_with(RecordingService::ok(report_body()));

    controller.sync_device();
    tokio::time::sleep(Duration::from_millis(500)).await;
    controller.sync_device();
    assert_eq!(controller.in_flight(), 2);

    assert!(controller.wait_for_completion().await);
    assert!(controller.store().is_busy());
    assert_eq!(
        controller.store().profile(),
        &BiometricProfile::canonical_wearable()
    );

    assert!(controller.wait_for_completion().await);
    assert!(!controller.store().is_busy());
    assert!(!controller.wait_for_completion().await);
}

#[tokio::test]
async fn submit_without_age_is_a_no_op() {
    let (mut controller, requests) = controller_with(RecordingService::ok(report_body()));
    controller.edit_field(ProfileField::Bmi, "25").expect("edit");
    let before = controller.store().clone();

    assert_eq!(
        controller.submit_analysis(),
        SubmitOutcome::Skipped(SkipReason::AgeUnset)
    );
    controller.edit_field(ProfileField::Age, "0").expect("edit");
    assert_eq!(
        controller.submit_analysis(),
        SubmitOutcome::Skipped(SkipReason::AgeUnset)
    );
    controller.settle().await;

    assert_eq!(request_count(&requests), 0);
    assert_eq!(controller.in_flight(), 0);
    assert_eq!(controller.store().view(), before.view());
    assert!(!controller.store().is_busy());
}

#[tokio::test]
async fn submit_while_busy_is_a_no_op() {
    let (mut controller, requests) = controller_with(RecordingService::ok(report_body()));
    controller.edit_field(ProfileField::Age, "52").expect("edit");

    assert_eq!(controller.submit_analysis(), SubmitOutcome::Dispatched);
    let busy_state = controller.store().clone();
    assert_eq!(
        controller.submit_analysis(),
        SubmitOutcome::Skipped(SkipReason::Busy)
    );
    assert_eq!(controller.store(), &busy_state);

    controller.settle().await;
    assert_eq!(request_count(&requests), 1);
}

#[tokio::test]
async fn successful_submit_shows_results_with_exact_body() {
    let (mut controller, _) = controller_with(RecordingService::ok(report_body()));
    controller.edit_field(ProfileField::Age, "35").expect("edit");

    assert_eq!(controller.submit_analysis(), SubmitOutcome::Dispatched);
    assert!(controller.store().is_busy());
    assert_eq!(controller.store().view(), SessionView::Input);

    controller.settle().await;

    let store = controller.store();
    assert_eq!(store.view(), SessionView::Results);
    assert!(!store.is_busy());
    assert_eq!(
        store.result(),
        Some(&AnalysisResult::from_value(report_body()))
    );
}

#[tokio::test]
async fn submit_sends_profile_as_of_invocation() {
    let (mut controller, requests) = controller_with(RecordingService::ok(report_body()));
    controller.edit_field(ProfileField::Age, "50").expect("edit");
    controller.edit_field(ProfileField::Bmi, "").expect("edit");

    controller.submit_analysis();
    controller.edit_field(ProfileField::Bmi, "31").expect("edit");
    controller.settle().await;

    let sent = requests.lock().expect("requests lock")[0].clone();
    assert_eq!(sent["user_data"]["age"].as_f64(), Some(50.0));
    assert_eq!(sent["user_data"]["bmi"], Value::Null);
    assert_eq!(sent["user_data"]["bp"], Value::Null);
    assert_eq!(sent["user_data"]["sugar"], Value::Null);
    assert_eq!(sent["user_data"]["lifestyle"], json!("Sedentary"));
    assert_eq!(controller.store().profile().bmi, "31");
}

#[tokio::test]
async fn transport_failure_returns_to_idle_input_with_alert() {
    let (mut controller, requests) = controller_with(RecordingService::offline());
    controller.edit_field(ProfileField::Age, "48").expect("edit");

    controller.submit_analysis();
    controller.settle().await;

    let store = controller.store();
    assert_eq!(store.view(), SessionView::Input);
    assert!(!store.is_busy());
    assert!(store.result().is_none());
    assert_eq!(request_count(&requests), 1);

    let alerts = controller.take_alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].message, SERVICE_OFFLINE_MESSAGE);
    assert!(alerts[0].detail.contains("connection refused"));
    assert!(controller.take_alerts().is_empty());
}

#[tokio::test]
async fn malformed_body_collapses_to_the_same_alert() {
    let (mut controller, _) = controller_with(RecordingService::malformed());
    controller.edit_field(ProfileField::Age, "48").expect("edit");

    controller.submit_analysis();
    controller.settle().await;

    let alerts = controller.take_alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].message, SERVICE_OFFLINE_MESSAGE);
    assert!(controller.store().result().is_none());
}

#[tokio::test]
async fn go_to_input_is_idempotent_and_keeps_result() {
    let (mut controller, _) = controller_with(RecordingService::ok(report_body()));
    controller.edit_field(ProfileField::Age, "35").expect("edit");
    controller.submit_analysis();
    controller.settle().await;
    assert_eq!(controller.store().view(), SessionView::Results);

    controller.go_to_input();
    let after_first = controller.store().clone();
    controller.go_to_input();

    assert_eq!(controller.store(), &after_first);
    assert_eq!(after_first.view(), SessionView::Input);
    assert!(after_first.result().is_some());
    assert_eq!(after_first.profile().age, "35");
}

#[tokio::test]
async fn resubmitting_clears_the_stale_result() {
    let (mut controller, _) = controller_with(RecordingService::ok(report_body()));
    controller.edit_field(ProfileField::Age, "35").expect("edit");
    controller.submit_analysis();
    controller.settle().await;
    controller.go_to_input();

    controller.submit_analysis();
    assert!(controller.store().result().is_none());
    controller.settle().await;
    assert_eq!(controller.store().view(), SessionView::Results);
}

#[tokio::test(start_paused = true)]
async fn sync_during_analysis_does_not_clear_busy_early() {
    let (mut controller, _) = controller_with(RecordingService::ok(report_body()));
    controller.edit_field(ProfileField::Age, "35").expect("edit");

    assert_eq!(controller.submit_analysis(), SubmitOutcome::Dispatched);
    controller.sync_device();
    assert_eq!(controller.in_flight(), 2);

    // The analysis double answers immediately; the wearable is still waiting.
    assert!(controller.wait_for_completion().await);
    assert_eq!(controller.store().view(), SessionView::Results);
    assert!(controller.store().is_busy());

    controller.settle().await;
    assert!(!controller.store().is_busy());
    assert_eq!(controller.store().view(), SessionView::Results);
    assert_eq!(
        controller.store().profile(),
        &BiometricProfile::canonical_wearable()
    );
}

#[tokio::test]
async fn check_service_does_not_touch_the_store() {
    let (mut controller, _) = controller_with(RecordingService::ok(report_body()));
    let before = controller.store().clone();

    controller.check_service();
    assert!(controller.has_pending());
    assert_eq!(controller.in_flight(), 0);
    assert!(!controller.store().is_busy());

    assert!(controller.wait_for_completion().await);
    let reports = controller.take_health_reports();
    assert_eq!(reports.len(), 1);
    let health = reports[0].as_ref().expect("health");
    assert_eq!(health.status, "active");
    assert_eq!(controller.store(), &before);
    assert!(!controller.has_pending());
}

struct HangingHealthService;

#[async_trait]
impl AnalysisService for HangingHealthService {
    async fn analyze(&self, _request: &AnalyzeRequest) -> Result<AnalysisResult, ServiceError> {
        Ok(AnalysisResult::from_value(report_body()))
    }

    async fn health_check(&self) -> Result<HealthStatus, ServiceError> {
        std::future::pending().await
    }
}

#[tokio::test(start_paused = true)]
async fn hanging_health_check_does_not_hold_up_the_workflow() {
    let mut controller = WorkflowController::new(
        Arc::new(HangingHealthService),
        Arc::new(SimulatedWearable::default()),
    );
    controller.check_service();

    controller.edit_field(ProfileField::Age, "40").expect("edit");
    assert_eq!(controller.submit_analysis(), SubmitOutcome::Dispatched);
    controller.sync_device();
    controller.settle().await;

    assert_eq!(controller.store().view(), SessionView::Results);
    assert!(!controller.store().is_busy());
    assert!(controller.has_pending());
    assert!(controller.take_health_reports().is_empty());
}
