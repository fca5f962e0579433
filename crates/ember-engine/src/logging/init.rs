use std::sync::Once;

use log::LevelFilter;

/// Logger configuration.
///
/// `env_filter` uses `env_logger` filter syntax, e.g. `"debug"` or
/// `"ember_engine::preload=trace,winit=warn"`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    /// Level used when neither `env_filter` nor `RUST_LOG` is set.
    pub default_level: LevelFilter,
}

impl LoggingConfig {
    /// Debug-level logging for the engine, warnings for the windowing stack.
    pub fn verbose() -> Self {
        Self {
            env_filter: Some("debug,winit=warn".to_string()),
            ..Self::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            default_level: LevelFilter::Info,
        }
    }
}

static INIT: Once = Once::new();

/// Installs the global `env_logger` once; later calls are ignored.
///
/// Filter precedence: `config.env_filter`, then `RUST_LOG`, then
/// `config.default_level`. If another logger is already installed (test
/// harnesses often do this) the existing one is kept.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match config.env_filter.or_else(|| std::env::var("RUST_LOG").ok()) {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder.filter_level(config.default_level);
            }
        }

        builder.write_style(config.write_style).format_timestamp_millis();

        if builder.try_init().is_err() {
            log::debug!("logger already installed; keeping it");
            return;
        }

        log::debug!("logging initialized");
    });
}
