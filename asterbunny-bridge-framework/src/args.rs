//! CLI argument parsing for bridges.

use std::path::PathBuf;

use clap::Parser;

use crate::LoggingConfig;

/// Common CLI arguments for all bridges.
///
/// Flatten into a bridge's own argument struct with `#[command(flatten)]`.
#[derive(Parser, Debug, Clone, Default)]
#[command(about = "AsterBunny event bridge")]
pub struct BridgeArgs {
    /// Path to configuration file (JSON5). Built-in defaults are used when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl BridgeArgs {
    /// Parse CLI arguments.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Logging configuration with the CLI level override applied.
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        match self.log_level {
            Some(ref level) => LoggingConfig {
                level: level.clone(),
                format: base.format,
            },
            None => base.clone(),
        }
    }
}
