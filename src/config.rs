use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Configuration keys enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    ApiBaseUrl,
    StaleDays,
}

impl ConfigKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::ApiBaseUrl => "api_base_url",
            ConfigKey::StaleDays => "stale_days",
        }
    }

    /// Get all config keys
    pub fn all() -> &'static [ConfigKey] {
        &[ConfigKey::ApiBaseUrl, ConfigKey::StaleDays]
    }
}

/// Filename for the project-specific configuration within the .issuekeeper directory.
pub const PROJECT_CONFIG_FILENAME: &str = "config.json";
/// Directory name for project-specific configuration.
pub const PROJECT_CONFIG_DIR: &str = ".issuekeeper";
/// Environment variable that overrides the configured API base URL.
pub const API_URL_ENV: &str = "ISSUEKEEPER_API_URL";
pub const DEFAULT_STALE_DAYS: u32 = 365;
/// Body set on issues closed by `close-stale` when no comment is given.
pub const DEFAULT_CLOSE_COMMENT: &str =
    "This issue has not been updated in over a year, so it is being closed.";

/// Parses a JSON configuration file content into a map of configuration values.
///
/// - Returns `Ok(HashMap<ConfigKey, Value>)` with every recognised key of a JSON object.
/// - Unknown keys are skipped.
/// - Returns an empty HashMap if `content` is empty or contains only whitespace.
/// - Returns an `Err` if the JSON is invalid or is not an object.
pub fn parse_config(content: &[u8]) -> Result<HashMap<ConfigKey, Value>> {
    if content.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(HashMap::new());
    }

    let value: Value = serde_json::from_slice(content).context("Failed to parse config JSON")?;

    if let Value::Object(map) = &value {
        let config_map = ConfigKey::all()
            .iter()
            .filter_map(|key| map.get(key.as_str()).map(|val| (*key, val.clone())))
            .collect();
        return Ok(config_map);
    }

    Err(anyhow::anyhow!("Config must be a JSON object"))
}

/// Reads `<dir>/.issuekeeper/config.json`. A missing file is an empty config.
pub fn load_project_config(dir: &Path) -> Result<HashMap<ConfigKey, Value>> {
    let path = dir.join(PROJECT_CONFIG_DIR).join(PROJECT_CONFIG_FILENAME);
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Invalid config file {}", path.display()))
}

/// Base URL precedence: environment override, then config, then the public API.
pub fn resolve_api_base_url(
    config: &HashMap<ConfigKey, Value>,
    env_override: Option<String>,
) -> Result<String> {
    if let Some(url) = env_override.filter(|url| !url.is_empty()) {
        return Ok(url);
    }
    match config.get(&ConfigKey::ApiBaseUrl) {
        Some(Value::String(url)) => Ok(url.clone()),
        Some(other) => Err(anyhow::anyhow!(
            "`{}` must be a string, got {other}",
            ConfigKey::ApiBaseUrl.as_str()
        )),
        None => Ok(crate::github::client::DEFAULT_API_BASE_URL.to_string()),
    }
}

/// Stale threshold precedence: command argument, then config, then the default.
pub fn resolve_stale_days(config: &HashMap<ConfigKey, Value>, argument: Option<u32>) -> Result<u32> {
    if let Some(days) = argument {
        return Ok(days);
    }
    match config.get(&ConfigKey::StaleDays) {
        Some(value) => value
            .as_u64()
            .and_then(|days| u32::try_from(days).ok())
            .with_context(|| {
                format!(
                    "`{}` must be a non-negative integer, got {value}",
                    ConfigKey::StaleDays.as_str()
                )
            }),
        None => Ok(DEFAULT_STALE_DAYS),
    }
}
