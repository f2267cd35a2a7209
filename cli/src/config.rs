//! Layered configuration, highest priority first:
//! 1. CLI arguments
//! 2. Environment variables (via clap `env`)
//! 3. TOML file (`~/.config/dayplan/config.toml` or `--config`)
//! 4. Compiled defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use dayplan_core::auth::identity::{self, IdentityConfig};
use dayplan_core::schedule::chat::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT};
use dayplan_core::schedule::GeneratorConfig;

pub const DEFAULT_TICK_MS: u64 = 250;
const MIN_TICK_MS: u64 = 16;
const AUTH_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
}

// ---------------------------------------------------------------------------
// TOML file
// ---------------------------------------------------------------------------

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    llm: LlmFileConfig,
    auth: AuthFileConfig,
    ui: UiFileConfig,
    log: LogFileConfig,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct LlmFileConfig {
    base_url: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct AuthFileConfig {
    api_key: Option<String>,
    base_url: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    theme: Option<ThemeName>,
    tick_ms: Option<u64>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct LogFileConfig {
    level: Option<String>,
    dir: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// CLI arguments
// ---------------------------------------------------------------------------

#[derive(clap::Args, Debug, Default)]
pub struct ConfigArgs {
    /// Path to config file (default: `~/.config/dayplan/config.toml`).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of an OpenAI-compatible API.
    #[arg(long, env = "DAYPLAN_LLM_BASE_URL", global = true)]
    pub llm_base_url: Option<String>,

    /// Model used to generate schedules.
    #[arg(long, env = "DAYPLAN_LLM_MODEL", global = true)]
    pub llm_model: Option<String>,

    #[arg(long, env = "DAYPLAN_LLM_API_KEY", hide_env_values = true, global = true)]
    pub llm_api_key: Option<String>,

    /// Schedule request timeout in seconds.
    #[arg(long, env = "DAYPLAN_LLM_TIMEOUT_SECS", global = true)]
    pub llm_timeout_secs: Option<u64>,

    /// Identity Toolkit web API key. Without one only guest sign-in works.
    #[arg(long, env = "DAYPLAN_AUTH_API_KEY", hide_env_values = true, global = true)]
    pub auth_api_key: Option<String>,

    #[arg(long, env = "DAYPLAN_AUTH_BASE_URL", global = true)]
    pub auth_base_url: Option<String>,

    #[arg(long, value_enum, global = true)]
    pub theme: Option<ThemeName>,

    /// Event poll interval of the terminal UI in milliseconds.
    #[arg(long, env = "DAYPLAN_TICK_MS", global = true)]
    pub tick_ms: Option<u64>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, env = "DAYPLAN_LOG", global = true)]
    pub log_level: Option<String>,

    /// Directory for the terminal UI log file.
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: GeneratorConfig,
    /// `None` when no API key is configured.
    pub auth: Option<IdentityConfig>,
    pub theme: ThemeName,
    pub tick: Duration,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: GeneratorConfig::default(),
            auth: None,
            theme: ThemeName::default(),
            tick: Duration::from_millis(DEFAULT_TICK_MS),
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// An explicit `--config` that cannot be read is an error; a missing
    /// default file is treated as empty.
    pub fn load(cli: &ConfigArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    fn resolve(cli: &ConfigArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        let llm = GeneratorConfig {
            base_url: cli
                .llm_base_url
                .clone()
                .or_else(|| file.llm.base_url.clone())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: cli
                .llm_model
                .clone()
                .or_else(|| file.llm.model.clone())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key: non_empty(cli.llm_api_key.as_deref())
                .or_else(|| non_empty(file.llm.api_key.as_deref())),
            timeout: cli
                .llm_timeout_secs
                .or(file.llm.timeout_secs)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
        };

        let auth = non_empty(cli.auth_api_key.as_deref())
            .or_else(|| non_empty(file.auth.api_key.as_deref()))
            .map(|api_key| IdentityConfig {
                base_url: cli
                    .auth_base_url
                    .clone()
                    .or_else(|| file.auth.base_url.clone())
                    .unwrap_or_else(|| identity::DEFAULT_BASE_URL.to_string()),
                api_key,
                timeout: AUTH_TIMEOUT,
            });

        let tick_ms = cli
            .tick_ms
            .or(file.ui.tick_ms)
            .unwrap_or(DEFAULT_TICK_MS)
            .max(MIN_TICK_MS);

        Self {
            llm,
            auth,
            theme: cli.theme.or(file.ui.theme).unwrap_or(defaults.theme),
            tick: Duration::from_millis(tick_ms),
            log_level: cli
                .log_level
                .clone()
                .or_else(|| file.log.level.clone())
                .unwrap_or(defaults.log_level),
            log_dir: cli.log_dir.clone().or_else(|| file.log.dir.clone()),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn load_config_file(explicit_path: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("dayplan").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
