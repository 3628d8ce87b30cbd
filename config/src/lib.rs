//! Configuration for clawdeck.
//!
//! Settings are layered, lowest priority first:
//!
//! 1. built-in defaults
//! 2. `~/.openclaw/openclaw.json` (`gateway.auth.token`)
//! 3. `~/.clawdeck/config.toml`
//! 4. `OPENCLAW_GATEWAY_TOKEN` / `OPENCLAW_GATEWAY_URL`
//! 5. command-line flags
//!
//! Unreadable or malformed files are logged and skipped; loading never fails.

mod openclaw;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use clawdeck_types::ui::UiOptions;

pub use openclaw::{OpenclawPaths, configured_models, openclaw_token, read_openclaw_json};

pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:18789";
pub const TOKEN_ENV: &str = "OPENCLAW_GATEWAY_TOKEN";
pub const URL_ENV: &str = "OPENCLAW_GATEWAY_URL";
/// Messages requested per transcript fetch.
pub const DEFAULT_HISTORY_LIMIT: usize = 200;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Json { path, .. } => path,
        }
    }
}

/// Contents of `~/.clawdeck/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct ClawdeckConfig {
    pub app: Option<AppConfig>,
    pub gateway: Option<GatewayConfig>,
    pub poll: Option<PollConfig>,
    pub limits: Option<LimitsConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Use ASCII-only glyphs for icons and spinners.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
}

#[derive(Default, Deserialize)]
pub struct GatewayConfig {
    pub url: Option<String>,
    /// Supports `${VAR}` expansion.
    pub token: Option<String>,
}

// Manual Debug impl to prevent leaking the token in logs.
impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PollConfig {
    pub sessions_secs: Option<u64>,
    pub processes_secs: Option<u64>,
    pub health_secs: Option<u64>,
    pub logs_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitsConfig {
    pub history: Option<usize>,
}

impl ClawdeckConfig {
    /// Load `~/.clawdeck/config.toml`. `Ok(None)` when it doesn't exist.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".clawdeck").join("config.toml"))
}

/// Directory for the log file.
#[must_use]
pub fn log_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".clawdeck").join("logs"))
}

/// Replace `${VAR}` with the variable's value (empty if unset).
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&std::env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

/// Flag values from the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub token: Option<String>,
}

/// Poll cadences for each data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    pub sessions: Duration,
    pub processes: Duration,
    pub health: Duration,
    /// Also the minimum gap between two transcript fetches.
    pub logs: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            sessions: Duration::from_secs(5),
            processes: Duration::from_secs(3),
            health: Duration::from_secs(30),
            logs: Duration::from_secs(2),
        }
    }
}

impl PollIntervals {
    fn apply(&mut self, poll: &PollConfig) {
        let secs = |value: Option<u64>, current: Duration| {
            value
                .filter(|s| *s > 0)
                .map_or(current, Duration::from_secs)
        };
        self.sessions = secs(poll.sessions_secs, self.sessions);
        self.processes = secs(poll.processes_secs, self.processes);
        self.health = secs(poll.health_secs, self.health);
        self.logs = secs(poll.logs_secs, self.logs);
    }
}

/// Fully resolved settings.
#[derive(Clone)]
pub struct Settings {
    pub gateway_url: String,
    pub token: Option<String>,
    pub ui: UiOptions,
    pub poll: PollIntervals,
    pub history_limit: usize,
    pub openclaw: OpenclawPaths,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("gateway_url", &self.gateway_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("ui", &self.ui)
            .field("poll", &self.poll)
            .field("history_limit", &self.history_limit)
            .field("openclaw", &self.openclaw)
            .finish()
    }
}

impl Settings {
    #[must_use]
    pub fn defaults(openclaw: OpenclawPaths) -> Self {
        Self {
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            token: None,
            ui: UiOptions::default(),
            poll: PollIntervals::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            openclaw,
        }
    }

    /// Read every layer from disk and the process environment.
    #[must_use]
    pub fn load(overrides: &Overrides) -> Self {
        let openclaw = OpenclawPaths::default();

        let openclaw_json = match read_openclaw_json(&openclaw.config_file()) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("Ignoring OpenClaw config: {err}");
                None
            }
        };
        let file = match ClawdeckConfig::load() {
            Ok(file) => file,
            Err(err) => {
                tracing::warn!("Ignoring clawdeck config: {err}");
                None
            }
        };

        Self::resolve(
            openclaw,
            openclaw_json.as_ref(),
            file.as_ref(),
            |name| std::env::var(name).ok(),
            overrides,
        )
    }

    /// Merge the layers. Empty strings never override a value.
    pub fn resolve(
        openclaw: OpenclawPaths,
        openclaw_json: Option<&serde_json::Value>,
        file: Option<&ClawdeckConfig>,
        env: impl Fn(&str) -> Option<String>,
        overrides: &Overrides,
    ) -> Self {
        let mut settings = Self::defaults(openclaw);
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty(openclaw_json.and_then(openclaw_token)) {
            settings.token = Some(token);
        }

        if let Some(file) = file {
            if let Some(app) = &file.app {
                settings.ui = UiOptions {
                    ascii_only: app.ascii_only,
                    high_contrast: app.high_contrast,
                };
            }
            if let Some(gateway) = &file.gateway {
                if let Some(url) = non_empty(gateway.url.clone()) {
                    settings.gateway_url = url;
                }
                if let Some(token) = non_empty(gateway.token.as_deref().map(expand_env_vars)) {
                    settings.token = Some(token);
                }
            }
            if let Some(poll) = &file.poll {
                settings.poll.apply(poll);
            }
            if let Some(history) = file.limits.as_ref().and_then(|l| l.history) {
                settings.history_limit = history.max(1);
            }
        }

        if let Some(token) = non_empty(env(TOKEN_ENV)) {
            settings.token = Some(token);
        }
        if let Some(url) = non_empty(env(URL_ENV)) {
            settings.gateway_url = url;
        }

        if let Some(token) = non_empty(overrides.token.clone()) {
            settings.token = Some(token);
        }
        if let Some(url) = non_empty(overrides.url.clone()) {
            settings.gateway_url = url;
        }

        settings.gateway_url = settings.gateway_url.trim_end_matches('/').to_string();
        settings
    }
}
