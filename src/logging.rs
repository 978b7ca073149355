//! # Logging
//! src/logging.rs
//!
//! Instala el subscriber global de `tracing`. El nivel se toma de `RUST_LOG`
//! (default `apibin=info,warn`); el formato, de `--log-format`.

use crate::config::LogFormat;
use crate::error::StartupError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "apibin=info,warn";

/// Inicializa el logging; falla si ya había un subscriber global
pub fn init(format: LogFormat) -> Result<(), StartupError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_thread_names(true))
            .try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .try_init(),
    };

    result.map_err(|e| StartupError::Logging(e.to_string()))
}
