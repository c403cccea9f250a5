//! Tracing configuration for the CLI
//!
//! The library only emits trace events; the application configures the
//! subscriber, following the usual tracing layering.

use tracing_subscriber::EnvFilter;

/// Tracing configuration builder
#[derive(Debug, Default)]
pub struct TracingConfig {
    /// Verbosity level (maps to log levels)
    pub verbosity: u8,
    /// Compact single-line output for CI environments
    pub compact: bool,
    /// Environment filter string (overrides verbosity if set)
    pub env_filter: Option<String>,
}

impl TracingConfig {
    /// Create a new tracing configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity level (0-2+)
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Use compact single-line output
    #[must_use]
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Set custom environment filter
    #[must_use]
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Convert verbosity level to a tracing filter string
    #[must_use]
    pub fn verbosity_to_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Initialize the global tracing subscriber
    ///
    /// # Errors
    /// Fails when the filter string does not parse or a subscriber is
    /// already installed.
    pub fn init(self) -> anyhow::Result<()> {
        let filter = if let Some(env_filter) = &self.env_filter {
            EnvFilter::try_new(env_filter)?
        } else {
            EnvFilter::try_new(self.verbosity_to_filter())?
        };

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr);

        let result = if self.compact {
            builder.compact().try_init()
        } else {
            builder.try_init()
        };
        result.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
    }
}

/// Initialize tracing for the CLI with `-v` style verbosity
///
/// # Errors
/// See [`TracingConfig::init`].
pub fn init_cli_tracing(verbosity: u8) -> anyhow::Result<()> {
    TracingConfig::new().with_verbosity(verbosity).init()
}
