use crate::conf::{General, LogFormat};
use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global tracing subscriber. Errors instead of panicking when a subscriber is already installed.
pub fn init_logging(config: &General) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_level)
        .with_context(|| format!("Could not parse log level '{}'", config.log_level))?;

    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json())
            .try_init()
            .context("Could not install json logger")?,
        LogFormat::Pretty if config.dev_mode => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()
            .context("Could not install dev mode logger")?,
        LogFormat::Pretty => registry
            .with(fmt::layer())
            .try_init()
            .context("Could not install logger")?,
    };

    Ok(())
}
