//! Bot configuration loaded from TOML.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CommandError, CommandResult};

/// Runtime settings for a [`Bot`](crate::bot::Bot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Guilds to register commands to. Empty registers globally.
    #[serde(default)]
    pub guild_ids: Vec<String>,
    /// Upper bound for one dispatch in milliseconds. Unset or 0 disables it.
    #[serde(default)]
    pub dispatch_timeout_ms: Option<u64>,
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            guild_ids: Vec::new(),
            dispatch_timeout_ms: None,
            log_filter: default_log_filter(),
        }
    }
}

impl BotConfig {
    pub fn from_toml_str(content: &str) -> CommandResult<Self> {
        toml::from_str(content).map_err(|e| CommandError::Config(e.to_string()))
    }

    pub fn dispatch_timeout(&self) -> Option<Duration> {
        self.dispatch_timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> CommandResult<BotConfig> {
    let content = std::fs::read_to_string(path)?;
    BotConfig::from_toml_str(&content)
        .map_err(|e| CommandError::Config(format!("{}: {}", path.display(), e)))
}

/// Load configuration, falling back to defaults if the file is missing or
/// cannot be parsed.
pub fn load_config_or_default(path: &Path) -> BotConfig {
    if !path.exists() {
        return BotConfig::default();
    }
    load_config(path).unwrap_or_else(|e| {
        tracing::warn!("Failed to load bot config {}: {}", path.display(), e);
        BotConfig::default()
    })
}
