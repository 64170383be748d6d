//! Terminal rendering of the active screen.

use client_core::{markup::DisplayTree, InputForm, ReportView, RiskTone, Screen};
use shared::domain::ProfileField;

pub fn render_screen(screen: &Screen) -> String {
    match screen {
        Screen::Input(form) => render_input(form),
        Screen::Results(Ok(report)) => render_report(report),
        Screen::Results(Err(err)) => format!(
            "== Analysis Report ==\nReport unavailable: {err}\n(type `back` to refine data)"
        ),
    }
}

fn render_input(form: &InputForm) -> String {
    let mut lines = vec!["== Biometric Profile ==".to_string()];
    for field in ProfileField::ALL {
        let value = match field {
            ProfileField::Lifestyle => form.profile.lifestyle.description().to_string(),
            _ => {
                let raw = form.profile.value(field);
                if raw.trim().is_empty() {
                    "-".to_string()
                } else {
                    raw.to_string()
                }
            }
        };
        lines.push(format!("  {:<26} {value}", field.label()));
    }

    let sync = if form.busy { "Syncing..." } else { "Sync Wearable" };
    lines.push(format!(
        "  [sync]   {sync}{}",
        if form.sync_enabled { "" } else { " (unavailable)" }
    ));
    let submit = if form.busy {
        "Working..."
    } else {
        "Run Clinical Analysis"
    };
    lines.push(format!(
        "  [submit] {submit}{}",
        if form.submit_enabled { "" } else { " (unavailable)" }
    ));
    lines.join("\n")
}

fn render_report(report: &ReportView) -> String {
    let badge = match report.risk.tone {
        RiskTone::Danger => format!("!! {} !!", report.risk.level.as_str().to_uppercase()),
        RiskTone::Standard => report.risk.level.to_string(),
    };

    let mut sections = vec![
        "== Analysis Report ==".to_string(),
        format!("-- Risk Prediction Agent [{badge}] --"),
        indent(&report.risk.explanation),
        "-- Medical Knowledge (RAG) --".to_string(),
    ];
    if report.guidelines.is_empty() {
        sections.push("  (no guidelines returned)".to_string());
    }
    sections.extend(report.guidelines.iter().map(indent));
    sections.push("-- Orchestrated Care Strategy --".to_string());
    sections.push(indent(&report.recommendation));
    sections.push("(type `back` to refine data)".to_string());
    sections.join("\n")
}

fn indent(tree: &DisplayTree) -> String {
    tree.plain_text()
        .lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
