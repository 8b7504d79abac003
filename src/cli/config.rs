//! CLI configuration

use std::path::PathBuf;

use clap::{Args, Parser};
use jiff::Timestamp;

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
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
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Rebate: apply promotions to an order and print the priced result
#[derive(Debug, Parser)]
#[command(name = "rebate", about = "Apply promotions to an order", long_about = None)]
pub(crate) struct CliConfig {
    /// Promotions YAML file
    #[arg(short, long, env = "REBATE_PROMOTIONS")]
    pub promotions: PathBuf,

    /// Order YAML file
    #[arg(short, long, env = "REBATE_ORDER")]
    pub order: PathBuf,

    /// Evaluate promotions at this instant (RFC 3339); defaults to now
    #[arg(long, env = "REBATE_AT")]
    pub at: Option<Timestamp>,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl CliConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub(crate) fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// The instant promotions are evaluated at.
    pub(crate) fn at(&self) -> Timestamp {
        self.at.unwrap_or_else(Timestamp::now)
    }
}
