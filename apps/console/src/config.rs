use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use client_core::ClientOptions;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "repository-client.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub request_timeout_seconds: u64,
    pub alert_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".into(),
            request_timeout_seconds: 30,
            alert_timeout_ms: 2000,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            alert_timeout: Duration::from_millis(self.alert_timeout_ms),
        }
    }
}

/// Defaults, then the TOML file, then environment overrides.
///
/// An explicitly given file must exist; the default file is optional.
pub fn load_settings(explicit_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match explicit_path {
        Some(path) => read_settings_file(path)?,
        None => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            if path.exists() {
                read_settings_file(path)?
            } else {
                Settings::default()
            }
        }
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn read_settings_file(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    parse_settings(&raw).with_context(|| format!("invalid config file '{}'", path.display()))
}

fn parse_settings(raw: &str) -> anyhow::Result<Settings> {
    Ok(toml::from_str(raw)?)
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("REPOSITORY_URL") {
        settings.base_url = v;
    }
    if let Some(v) = lookup("APP__BASE_URL") {
        settings.base_url = v;
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECONDS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_seconds = parsed;
        }
    }

    if let Some(v) = lookup("APP__ALERT_TIMEOUT_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.alert_timeout_ms = parsed;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
