use std::sync::Once;

/// Crates below the engine that log per-frame detail at `info`.
const GPU_CRATES: &[&str] = &["wgpu_core", "wgpu_hal", "naga"];

/// How the engine's logger is set up.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Explicit `env_logger` filter. Wins over `RUST_LOG` when set.
    pub env_filter: Option<String>,

    /// Level applied to the engine and the demo when no filter is given.
    pub level: log::LevelFilter,

    /// Caps the GPU stack at `warn` in the fallback filter.
    pub quiet_gpu: bool,

    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            level: log::LevelFilter::Info,
            quiet_gpu: true,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            env_filter: Some(filter.into()),
            ..Self::default()
        }
    }

    /// Filter string used when neither `env_filter` nor `RUST_LOG` is set.
    pub fn fallback_filter(&self) -> String {
        let mut filter = self.level.to_string().to_lowercase();
        if self.quiet_gpu && self.level > log::LevelFilter::Warn {
            for name in GPU_CRATES {
                filter.push_str(&format!(",{name}=warn"));
            }
        }
        filter
    }

    /// Picks the filter: `env_filter`, then `rust_log`, then the fallback.
    fn resolve(&self, rust_log: Option<String>) -> String {
        self.env_filter
            .clone()
            .or(rust_log)
            .unwrap_or_else(|| self.fallback_filter())
    }
}

static INIT: Once = Once::new();

/// Installs the global logger on first call; later calls are ignored.
///
/// If the host already installed a `log` implementation, that one stays.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.resolve(std::env::var("RUST_LOG").ok());

        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&filter);
        builder.write_style(config.write_style);

        if builder.try_init().is_err() {
            return;
        }

        log::debug!("logging initialized with '{filter}'");
    });
}
