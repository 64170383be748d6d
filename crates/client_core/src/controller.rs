//! Workflow controller: turns user intents and I/O completions into store mutations.

use std::{collections::VecDeque, sync::Arc};

use shared::{
    domain::{BiometricProfile, ProfileField},
    error::EditError,
    protocol::{AnalysisResult, AnalyzeRequest, HealthStatus},
};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::{
    store::{SessionStore, SessionView},
    wearable::WearableDevice,
    AnalysisService, ServiceError,
};

/// Result of a spawned operation, delivered back to the owning task.
#[derive(Debug)]
pub enum Completion {
    DeviceSynced(BiometricProfile),
    AnalysisFinished(Result<AnalysisResult, ServiceError>),
    HealthChecked(Result<HealthStatus, ServiceError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Busy,
    AgeUnset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Dispatched,
    Skipped(SkipReason),
}

/// User-visible notification raised by a failed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    pub detail: String,
}

pub struct WorkflowController {
    store: SessionStore,
    service: Arc<dyn AnalysisService>,
    wearable: Arc<dyn WearableDevice>,
    completion_tx: UnboundedSender<Completion>,
    completion_rx: UnboundedReceiver<Completion>,
    // Spawned operations whose completion has not been applied yet; `busy`
    // mirrors `in_flight > 0`.
    in_flight: usize,
    // Health probes never mark the session busy.
    pending_checks: usize,
    alerts: VecDeque<Alert>,
    health_reports: VecDeque<Result<HealthStatus, ServiceError>>,
}

impl WorkflowController {
    pub fn new(service: Arc<dyn AnalysisService>, wearable: Arc<dyn WearableDevice>) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            store: SessionStore::new(),
            service,
            wearable,
            completion_tx,
            completion_rx,
            in_flight: 0,
            pending_checks: 0,
            alerts: VecDeque::new(),
            health_reports: VecDeque::new(),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// True while any spawned task, health probes included, has yet to report.
    pub fn has_pending(&self) -> bool {
        self.in_flight > 0 || self.pending_checks > 0
    }

    pub fn edit_field(
        &mut self,
        field: ProfileField,
        value: impl Into<String>,
    ) -> Result<(), EditError> {
        let value = value.into();
        let next = self.store.profile().with_field(field, &value)?;
        self.store.replace_profile(next);
        debug!(field = field.wire_name(), "profile field edited");
        Ok(())
    }

    pub fn edit_named_field(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), EditError> {
        let field: ProfileField = name.parse()?;
        self.edit_field(field, value)
    }

    /// Starts a device read. Accepted even while busy: each read completes on
    /// its own and all of them deliver the same profile.
    pub fn sync_device(&mut self) {
        let wearable = Arc::clone(&self.wearable);
        let tx = self.completion_tx.clone();
        self.begin_operation();
        debug!(in_flight = self.in_flight, "device sync started");
        tokio::spawn(async move {
            let profile = wearable.read_profile().await;
            let _ = tx.send(Completion::DeviceSynced(profile));
        });
    }

    pub fn submit_analysis(&mut self) -> SubmitOutcome {
        if self.store.is_busy() {
            debug!("analysis skipped: session busy");
            return SubmitOutcome::Skipped(SkipReason::Busy);
        }
        if !self.store.profile().has_age() {
            debug!("analysis skipped: age unset");
            return SubmitOutcome::Skipped(SkipReason::AgeUnset);
        }

        self.begin_operation();
        self.store.replace_result(None);

        // The profile is read once here; later edits do not reach this request.
        let request = AnalyzeRequest::from(self.store.profile());
        let service = Arc::clone(&self.service);
        let tx = self.completion_tx.clone();
        tokio::spawn(async move {
            let outcome = service.analyze(&request).await;
            let _ = tx.send(Completion::AnalysisFinished(outcome));
        });
        debug!("analysis request dispatched");
        SubmitOutcome::Dispatched
    }

    pub fn go_to_input(&mut self) {
        self.store.set_view(SessionView::Input);
    }

    /// Starts a health probe. Its outcome is queued for `take_health_reports`
    /// and leaves the store untouched.
    pub fn check_service(&mut self) {
        let service = Arc::clone(&self.service);
        let tx = self.completion_tx.clone();
        self.pending_checks += 1;
        tokio::spawn(async move {
            let outcome = service.health_check().await;
            let _ = tx.send(Completion::HealthChecked(outcome));
        });
        debug!("health check dispatched");
    }

    pub fn take_alerts(&mut self) -> Vec<Alert> {
        self.alerts.drain(..).collect()
    }

    pub fn take_health_reports(&mut self) -> Vec<Result<HealthStatus, ServiceError>> {
        self.health_reports.drain(..).collect()
    }

    /// Applies every completion already queued without waiting. Returns how
    /// many were applied.
    pub fn process_completions(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.completion_rx.try_recv() {
                Ok(completion) => {
                    self.apply_completion(completion);
                    applied += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    /// Waits for the next completion and applies it. Returns `false` at once
    /// when nothing is pending.
    pub async fn wait_for_completion(&mut self) -> bool {
        if !self.has_pending() {
            return false;
        }
        match self.completion_rx.recv().await {
            Some(completion) => {
                self.apply_completion(completion);
                true
            }
            None => false,
        }
    }

    /// Waits until the session is idle, then applies whatever else has
    /// already arrived. Outstanding health probes are not waited for.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 && self.wait_for_completion().await {}
        self.process_completions();
    }

    fn begin_operation(&mut self) {
        self.in_flight += 1;
        self.store.set_busy(true);
    }

    fn finish_operation(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.store.set_busy(self.in_flight > 0);
    }

    fn apply_completion(&mut self, completion: Completion) {
        match completion {
            Completion::DeviceSynced(profile) => {
                self.store.replace_profile(profile);
                info!("device sync completed");
                self.finish_operation();
            }
            Completion::AnalysisFinished(Ok(result)) => {
                self.store.replace_result(Some(result));
                self.store.set_view(SessionView::Results);
                info!("analysis completed");
                self.finish_operation();
            }
            Completion::AnalysisFinished(Err(err)) => {
                warn!(error = %err, "analysis request failed");
                self.alerts.push_back(Alert {
                    message: err.user_message().to_string(),
                    detail: err.to_string(),
                });
                self.store.set_view(SessionView::Input);
                self.finish_operation();
            }
            Completion::HealthChecked(outcome) => {
                self.pending_checks = self.pending_checks.saturating_sub(1);
                if let Err(err) = &outcome {
                    warn!(error = %err, "health check failed");
                }
                self.health_reports.push_back(outcome);
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
