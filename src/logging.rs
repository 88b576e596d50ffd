//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::{
    config::BotConfig,
    error::{CommandError, CommandResult},
};

/// `RUST_LOG` if set, otherwise `default_filter`.
fn build_filter(default_filter: &str) -> CommandResult<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| CommandError::Config(format!("invalid log filter '{default_filter}': {e}")))
}

/// Install a global fmt subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. Fails if a global
/// subscriber is already set.
pub fn init_tracing(default_filter: &str) -> CommandResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(default_filter)?)
        .with_target(false)
        .try_init()
        .map_err(|e| CommandError::Other(format!("failed to install tracing subscriber: {e}")))
}

/// Install a global fmt subscriber using [`BotConfig::log_filter`].
pub fn init_tracing_from_config(config: &BotConfig) -> CommandResult<()> {
    init_tracing(&config.log_filter)
}
