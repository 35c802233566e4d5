//! Tracing subscriber setup for the service binaries.
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{LogFormat, Settings};

/// Install the global subscriber. `RUST_LOG` wins over `log_level`.
pub fn init_tracing(settings: &Settings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))?;

    let registry = tracing_subscriber::registry().with(filter);
    match settings.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init()?,
        LogFormat::Text => registry.with(fmt::layer()).try_init()?,
    }
    Ok(())
}
