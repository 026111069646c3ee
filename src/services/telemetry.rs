use crate::cli::LogFormat;
use crate::services::config::LogConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global subscriber. Logs go to stderr; stdout carries the report.
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(cfg: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let base = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let layer = match cfg.format {
        LogFormat::Json => base.json().boxed(),
        LogFormat::Text => base.boxed(),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}
