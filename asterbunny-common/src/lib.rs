//! AsterBunny Common Library
//!
//! This crate provides shared types and utilities for AsterBunny event bridges:
//!
//! - [`message`] - Manager protocol message model (`ManagerMessage`, `ManagerAction`)
//! - [`outbound`] - Translation into broker messages (`OutboundMessage`)
//! - [`serialization`] - JSON/CBOR encoding and decoding
//! - [`config`] - Configuration loading (JSON5 format)
//! - [`session`] - AMQP broker connection
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod message;
pub mod outbound;
pub mod serialization;
pub mod session;

// Re-export commonly used types at the crate root
pub use config::{
    AmqpConfig, HeartbeatConfig, LogFormat, LoggingConfig, NotifyConfig, parse_config,
};
pub use error::{Error, Result};
pub use message::{ManagerAction, ManagerMessage, MessageKind};
pub use outbound::{OutboundMessage, PERSISTENT_DELIVERY_MODE, current_timestamp_secs};
pub use serialization::{Format, decode, encode};
pub use session::connect;

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
