//! Layered configuration: built-in defaults, environment variables, the
//! persisted settings file, and command-line overrides, in that precedence
//! order (later layers win). Setting `ALLOW_USER_CONFIG=false` drops the
//! settings-file layer entirely.

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp-search";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

const DEFAULT_CATEGORIES: &str = "general";
const DEFAULT_LANGUAGE: &str = "zh";
const DEFAULT_TIME_RANGE: &str = "year";
const DEFAULT_NUM_RESULTS: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read settings file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed settings file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Resolved LLM connection settings. Endpoint and key may still be empty
/// here; `LlmClient::new` rejects that with a typed error when a command
/// actually needs the model.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f64,
}

/// Resolved SearXNG settings. `None` in `Config` means search is disabled.
#[derive(Debug, Clone)]
pub struct SearxngConfig {
    pub url: String,
    pub categories: String,
    pub language: String,
    pub time_range: String,
    pub engines: Option<String>,
    pub num_results: usize,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub searxng: Option<SearxngConfig>,
}

/// On-disk settings file shape (`~/.config/chronicle/config.toml`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserSettings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub searxng: SearxngSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiSettings {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearxngSettings {
    pub enabled: Option<bool>,
    pub url: Option<String>,
    pub categories: Option<String>,
    pub language: Option<String>,
    pub time_range: Option<String>,
    pub engines: Option<String>,
    pub num_results: Option<usize>,
}

/// Command-line overrides, the highest-precedence layer.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub searxng_url: Option<String>,
    pub no_search: bool,
}

/// Values read from the process environment, the layer above the built-in
/// defaults. Separated from `env::var` so resolution stays a pure function.
#[derive(Debug, Clone, Default)]
pub struct EnvValues {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub searxng_url: Option<String>,
    pub allow_user_config: Option<String>,
}

impl EnvValues {
    pub fn from_process() -> Self {
        Self {
            endpoint: read_env("API_ENDPOINT"),
            model: read_env("API_MODEL"),
            api_key: read_env("API_KEY"),
            searxng_url: read_env("SEARXNG_URL"),
            allow_user_config: read_env("ALLOW_USER_CONFIG"),
        }
    }

    /// User settings are honored unless the variable is explicitly "false".
    pub fn user_config_allowed(&self) -> bool {
        self.allow_user_config.as_deref() != Some("false")
    }
}

fn read_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Loads the settings file (when present and allowed) and resolves the final
/// configuration from all four layers.
pub fn load(path: Option<&Path>, overrides: Overrides) -> Result<Config, ConfigError> {
    let env_values = EnvValues::from_process();

    let settings = if env_values.user_config_allowed() {
        load_settings_file(path)?
    } else {
        debug!("user settings disabled via ALLOW_USER_CONFIG=false");
        UserSettings::default()
    };

    Ok(resolve(&env_values, settings, overrides))
}

fn load_settings_file(explicit: Option<&Path>) -> Result<UserSettings, ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let Some(dir) = dirs::config_dir() else {
                return Ok(UserSettings::default());
            };
            let default = dir.join("chronicle").join("config.toml");
            if !default.exists() {
                return Ok(UserSettings::default());
            }
            default
        }
    };

    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let settings = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), "settings file loaded");
    Ok(settings)
}

/// Pure precedence resolution: default < environment < settings < override.
pub fn resolve(
    env_values: &EnvValues,
    settings: UserSettings,
    overrides: Overrides,
) -> Config {
    let endpoint = layered(
        None,
        env_values.endpoint.clone(),
        settings.api.endpoint,
        overrides.endpoint.clone(),
    )
    .unwrap_or_default();

    let api_key = layered(
        None,
        env_values.api_key.clone(),
        settings.api.api_key,
        overrides.api_key.clone(),
    )
    .unwrap_or_default();

    let model = layered(
        None,
        env_values.model.clone(),
        settings.api.model,
        overrides.model.clone(),
    )
    .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let llm = LlmConfig {
        endpoint,
        api_key,
        model,
        temperature: settings.api.temperature.unwrap_or(DEFAULT_TEMPERATURE),
    };

    let searxng = resolve_searxng(env_values, settings.searxng, &overrides);

    Config { llm, searxng }
}

fn resolve_searxng(
    env_values: &EnvValues,
    settings: SearxngSettings,
    overrides: &Overrides,
) -> Option<SearxngConfig> {
    if overrides.no_search || settings.enabled == Some(false) {
        return None;
    }

    let url = layered(
        None,
        env_values.searxng_url.clone(),
        settings.url,
        overrides.searxng_url.clone(),
    )?;

    Some(SearxngConfig {
        url,
        categories: settings.categories.unwrap_or_else(|| DEFAULT_CATEGORIES.to_string()),
        language: settings.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        time_range: settings.time_range.unwrap_or_else(|| DEFAULT_TIME_RANGE.to_string()),
        engines: settings.engines,
        num_results: settings.num_results.unwrap_or(DEFAULT_NUM_RESULTS),
    })
}

fn layered(
    default: Option<String>,
    env_value: Option<String>,
    user: Option<String>,
    cli: Option<String>,
) -> Option<String> {
    cli.or(user).or(env_value).or(default)
}
