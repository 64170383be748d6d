use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use serde::Deserialize;

pub const DEFAULT_SETTINGS_FILE: &str = "preventive_care.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub analysis_url: String,
    pub health_url: String,
    pub sync_delay_ms: u64,
    pub log_filter: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            analysis_url: "http://localhost:5000/api/analyze".into(),
            health_url: "http://localhost:5000/api/health-check".into(),
            sync_delay_ms: 1500,
            log_filter: "info".into(),
        }
    }
}

impl ClientSettings {
    pub fn sync_delay(&self) -> Duration {
        Duration::from_millis(self.sync_delay_ms)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [
            ("analysis_url", &self.analysis_url),
            ("health_url", &self.health_url),
        ] {
            let parsed = url::Url::parse(value)
                .with_context(|| format!("{name} '{value}' is not a valid URL"))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                bail!("{name} '{value}' must use http or https");
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    analysis_url: Option<String>,
    health_url: Option<String>,
    sync_delay_ms: Option<u64>,
    log_filter: Option<String>,
}

/// Defaults, then the settings file, then `APP__*` environment variables.
/// An explicitly named file must exist; the default file is optional.
pub fn load_settings(explicit_path: Option<&Path>) -> anyhow::Result<ClientSettings> {
    load_settings_from(explicit_path, |name| std::env::var(name).ok())
}

pub fn load_settings_from(
    explicit_path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    let path = explicit_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
    match fs::read_to_string(&path) {
        Ok(raw) => {
            let file_cfg: SettingsFile = toml::from_str(&raw)
                .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
            apply_file(&mut settings, file_cfg);
        }
        Err(err) if explicit_path.is_some() => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()));
        }
        Err(_) => {}
    }

    if let Some(v) = env("APP__ANALYSIS_URL") {
        settings.analysis_url = v;
    }
    if let Some(v) = env("APP__HEALTH_URL") {
        settings.health_url = v;
    }
    if let Some(v) = env("APP__SYNC_DELAY_MS") {
        settings.sync_delay_ms = v
            .trim()
            .parse()
            .with_context(|| format!("APP__SYNC_DELAY_MS '{v}' is not a whole number"))?;
    }
    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    settings.validate()?;
    Ok(settings)
}

fn apply_file(settings: &mut ClientSettings, file_cfg: SettingsFile) {
    if let Some(v) = file_cfg.analysis_url {
        settings.analysis_url = v;
    }
    if let Some(v) = file_cfg.health_url {
        settings.health_url = v;
    }
    if let Some(v) = file_cfg.sync_delay_ms {
        settings.sync_delay_ms = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
}
