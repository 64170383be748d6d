//! Rendering contract between the session store and a front-end.

use shared::{
    domain::BiometricProfile,
    error::ReportError,
    protocol::{AnalysisResult, RiskLevel},
};

use crate::{
    markup::{DisplayTree, MarkupRenderer},
    store::{SessionStore, SessionView},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskTone {
    Standard,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskPanel {
    pub level: RiskLevel,
    pub tone: RiskTone,
    pub explanation: DisplayTree,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportView {
    pub risk: RiskPanel,
    pub guidelines: Vec<DisplayTree>,
    pub recommendation: DisplayTree,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputForm {
    pub profile: BiometricProfile,
    pub busy: bool,
    pub submit_enabled: bool,
    pub sync_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Input(InputForm),
    Results(Result<ReportView, ReportError>),
}

/// Reads the report sections in display order; the first absent or mistyped
/// section aborts rendering.
pub fn render_report(
    result: &AnalysisResult,
    renderer: &dyn MarkupRenderer,
) -> Result<ReportView, ReportError> {
    let level = result.risk_level()?;
    let tone = if level.is_high() {
        RiskTone::Danger
    } else {
        RiskTone::Standard
    };
    let explanation = renderer.render(&result.risk_explanation()?);

    let guidelines = result
        .guidelines()?
        .into_iter()
        .map(|snippet| renderer.render(&snippet))
        .collect();

    let recommendation = renderer.render(&result.recommendation()?);

    Ok(ReportView {
        risk: RiskPanel {
            level,
            tone,
            explanation,
        },
        guidelines,
        recommendation,
    })
}

pub fn render_screen(store: &SessionStore, renderer: &dyn MarkupRenderer) -> Screen {
    match store.view() {
        SessionView::Input => {
            let busy = store.is_busy();
            Screen::Input(InputForm {
                profile: store.profile().clone(),
                busy,
                submit_enabled: !busy && store.profile().has_age(),
                sync_enabled: !busy,
            })
        }
        SessionView::Results => Screen::Results(
            store
                .result()
                .ok_or(ReportError::NoResult)
                .and_then(|result| render_report(result, renderer)),
        ),
    }
}
