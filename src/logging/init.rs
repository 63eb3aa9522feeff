use std::sync::Once;

use crate::config::TilemapConfig;

/// Filter used when neither the config nor `RUST_LOG` names one.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn";

/// How the binary wants its log output.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    /// `env_logger` filter directives, e.g. `"tilepack::map=debug"`.
    pub filter: Option<String>,
    /// Disable ANSI colours (log files, CI).
    pub plain: bool,
}

impl From<&TilemapConfig> for LoggingConfig {
    fn from(config: &TilemapConfig) -> Self {
        Self { filter: config.log_filter.clone(), plain: false }
    }
}

/// Pick the effective filter: the configured one wins over `RUST_LOG`, which
/// wins over [`DEFAULT_FILTER`]. Blank values count as unset.
pub fn resolve_filter(configured: Option<&str>, env: Option<&str>) -> String {
    [configured, env]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|f| !f.is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

static INIT: Once = Once::new();

/// Install the `env_logger` backend. Only the first call has any effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let env = std::env::var("RUST_LOG").ok();
        let filter = resolve_filter(config.filter.as_deref(), env.as_deref());

        let style = if config.plain {
            env_logger::WriteStyle::Never
        } else {
            env_logger::WriteStyle::Auto
        };

        let installed = env_logger::Builder::new()
            .parse_filters(&filter)
            .write_style(style)
            .format_timestamp_millis()
            .try_init();
        if installed.is_ok() {
            log::debug!("logging: filter '{filter}'");
        }
    });
}
