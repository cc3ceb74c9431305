//! Structured logging setup

use tracing_subscriber::EnvFilter;

use crate::{
    config::Config,
    error::{Error, Result},
};

/// Install a JSON tracing subscriber filtered by `config.service.log_level`
///
/// An unparseable filter falls back to `info`. Fails when a global
/// subscriber is already installed.
pub fn init_tracing(config: &Config) -> Result<()> {
    let log_level = config.service.log_level.as_str();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()
        .map_err(|err| Error::Internal(format!("failed to install tracing subscriber: {err}")))?;

    tracing::info!("Tracing initialized for service: {}", config.service.name);

    Ok(())
}
