use std::{fs, path::Path};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::{clamp_window, QueryParameters};

pub const DEFAULT_API_BASE: &str = "http://localhost:4000";
pub const SETTINGS_FILE: &str = "dashboard.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base: String,
    pub query: QueryParameters,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            query: QueryParameters::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base: Option<String>,
    start: Option<String>,
    end: Option<String>,
    window: Option<i64>,
}

/// Defaults, then `dashboard.toml` in the working directory, then the
/// process environment.
pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
        let file_cfg: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;

        if let Some(v) = file_cfg.api_base {
            settings.api_base = v;
        }
        if let Some(v) = file_cfg.start {
            settings.query.start = v;
        }
        if let Some(v) = file_cfg.end {
            settings.query.end = v;
        }
        if let Some(v) = file_cfg.window {
            settings.query.window = clamp_window(v);
        }
    }

    if let Some(v) = env("DASHBOARD_API_BASE") {
        settings.api_base = v;
    }
    if let Some(v) = env("APP__API_BASE") {
        settings.api_base = v;
    }

    Ok(settings)
}
