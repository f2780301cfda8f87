use std::{collections::HashMap, fs, path::Path};

use anyhow::{bail, Context};
use client_core::DEFAULT_SERVICE_URL;
use serde::Deserialize;
use url::Url;

pub const SETTINGS_FILE: &str = "north.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub api_url: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_SERVICE_URL.into(),
            log_filter: "info".into(),
        }
    }
}

/// Defaults, then `north.toml`, then environment. Flags are applied by the caller.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    apply_file(&mut settings, Path::new(SETTINGS_FILE));
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut Settings, path: &Path) {
    let Ok(raw) = fs::read_to_string(path) else {
        return;
    };
    match toml::from_str::<HashMap<String, String>>(&raw) {
        Ok(file_cfg) => {
            if let Some(v) = file_cfg.get("api_url") {
                settings.api_url = v.clone();
            }
            if let Some(v) = file_cfg.get("log_filter") {
                settings.log_filter = v.clone();
            }
        }
        Err(err) => eprintln!("ignoring unreadable {}: {err}", path.display()),
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("NORTH_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = var("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = var("NORTH_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = var("APP__LOG") {
        settings.log_filter = v;
    }
}

/// Trims whitespace and trailing slashes and checks the url is http(s).
pub fn normalize_api_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(Settings::default().api_url);
    }
    let parsed =
        Url::parse(trimmed).with_context(|| format!("invalid api url '{trimmed}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("api url '{trimmed}' must use http or https");
    }
    Ok(trimmed.to_string())
}
