//! CLI Config

use clap::Args;
use catalog_app::context::{AppInitError, CatalogSettings};

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    pub(crate) log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub(crate) log_format: LogFormat,
}

/// Database settings.
#[derive(Debug, Args)]
pub(crate) struct DatabaseConfig {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub(crate) database_url: String,
}

/// Products service settings.
#[derive(Debug, Args)]
pub(crate) struct CatalogConfig {
    /// IANA time zone whose calendar days `--from-date`/`--to-date` refer to
    #[arg(long, env = "CATALOG_TIME_ZONE", default_value = "UTC")]
    pub(crate) time_zone: String,

    /// Page size used when `--limit` is omitted
    #[arg(
        long,
        env = "CATALOG_DEFAULT_LIMIT",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub(crate) default_limit: u64,
}

impl CatalogConfig {
    pub(crate) fn settings(&self) -> Result<CatalogSettings, AppInitError> {
        CatalogSettings::new(&self.time_zone, self.default_limit)
    }
}
