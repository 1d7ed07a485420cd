use std::sync::Once;

/// How the process logger is set up.
///
/// An `env_filter` such as `"twinquad_engine=debug,twinquad::gl=warn"` takes
/// precedence over `RUST_LOG`. With neither, everything at `info` and above
/// is shown.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    /// ANSI colouring; `Auto` unless overridden.
    pub write_style: env_logger::WriteStyle,
}

impl LoggingConfig {
    /// Default styling with an explicit filter.
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            env_filter: Some(filter.into()),
            ..Self::default()
        }
    }
}

static INIT: Once = Once::new();

/// Where the active filter comes from, in priority order.
#[derive(Debug, PartialEq, Eq)]
enum FilterSource {
    Explicit(String),
    Env(String),
    Default,
}

fn filter_source(config: &LoggingConfig, env: Option<String>) -> FilterSource {
    match (&config.env_filter, env) {
        (Some(filter), _) => FilterSource::Explicit(filter.clone()),
        (None, Some(filter)) => FilterSource::Env(filter),
        (None, None) => FilterSource::Default,
    }
}

/// Installs `env_logger` as the `log` backend. Only the first call has an
/// effect, so later callers (tests included) cannot change the filter.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match filter_source(&config, std::env::var("RUST_LOG").ok()) {
            FilterSource::Explicit(filter) | FilterSource::Env(filter) => {
                builder.parse_filters(&filter);
            }
            // Startup lines (backend, sizes, driver strings) are info.
            FilterSource::Default => {
                builder.filter_level(log::LevelFilter::Info);
            }
        }

        builder.write_style(config.write_style);
        builder.init();

        log::debug!("logging initialized");
    });
}
