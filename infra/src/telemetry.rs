//! Tracing subscriber installation for binaries

use tracing_subscriber::EnvFilter;

use cb_shared::config::{LogFormat, LoggingConfig};

use crate::InfrastructureError;

/// Build the filter: `RUST_LOG` when set, otherwise `config.level`
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, InfrastructureError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| InfrastructureError::Config(format!("Invalid log filter: {}", e)))
}

/// Install the global subscriber in the configured format
///
/// Fails if a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), InfrastructureError> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config)?)
        .with_target(true)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    let installed = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    installed.map_err(|e| InfrastructureError::Config(format!("Failed to install logger: {}", e)))
}
