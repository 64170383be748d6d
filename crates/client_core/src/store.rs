//! Session state: one profile, at most one result, the active view and the busy flag.

use shared::{domain::BiometricProfile, protocol::AnalysisResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionView {
    #[default]
    Input,
    Results,
}

/// Every mutation replaces one slice wholesale and cannot fail. Only the
/// workflow controller holds a mutable handle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionStore {
    profile: BiometricProfile,
    result: Option<AnalysisResult>,
    view: SessionView,
    busy: bool,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile(&self) -> &BiometricProfile {
        &self.profile
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn view(&self) -> SessionView {
        self.view
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub(crate) fn replace_profile(&mut self, profile: BiometricProfile) {
        self.profile = profile;
    }

    pub(crate) fn replace_result(&mut self, result: Option<AnalysisResult>) {
        self.result = result;
    }

    pub(crate) fn set_view(&mut self, view: SessionView) {
        self.view = view;
    }

    pub(crate) fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }
}
