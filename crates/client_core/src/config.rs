use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_CONFIG_FILE: &str = "canteen.toml";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    fn apply_file(&mut self, file: FileSettings) {
        if let Some(v) = file.api_base_url {
            self.api_base_url = v;
        }
        if let Some(v) = file.request_timeout_secs {
            self.request_timeout_secs = v;
        }
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("CANTEEN_API_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = lookup("APP__API_BASE_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
            match v.trim().parse::<u64>() {
                Ok(parsed) => self.request_timeout_secs = parsed,
                Err(err) => {
                    tracing::warn!("ignoring APP__REQUEST_TIMEOUT_SECS={v:?}: {err}");
                }
            }
        }
    }
}

/// Defaults, then the TOML file (`canteen.toml` unless `explicit_path` is
/// given), then environment overrides. Command-line flags are applied by the
/// binaries on top of the result.
pub fn load_settings(explicit_path: Option<&Path>) -> Settings {
    load_settings_with_env(explicit_path, |name| std::env::var(name).ok())
}

pub fn load_settings_with_env(
    explicit_path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();
    let path = explicit_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    match read_file_settings(&path) {
        Ok(Some(file)) => settings.apply_file(file),
        Ok(None) if explicit_path.is_some() => {
            tracing::warn!("config file '{}' does not exist", path.display());
        }
        Ok(None) => {}
        Err(err) => tracing::warn!("ignoring config file '{}': {err:#}", path.display()),
    }

    settings.apply_env(lookup);
    settings
}

fn read_file_settings(path: &Path) -> anyhow::Result<Option<FileSettings>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let parsed = toml::from_str::<FileSettings>(&raw)
        .with_context(|| format!("failed to parse '{}'", path.display()))?;
    Ok(Some(parsed))
}

/// Validates an http(s) base URL and drops the trailing slash so paths can be
/// appended directly.
pub fn normalize_base_url(raw: &str) -> Result<String, ClientError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DEFAULT_API_BASE_URL.to_string());
    }

    let parsed = Url::parse(raw).map_err(|err| ClientError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ClientError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(ClientError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "query strings and fragments are not allowed".to_string(),
        });
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
