//! AsterBunny Bridge Framework
//!
//! Common abstractions for building bridges that forward manager events to an
//! AMQP fanout exchange.
//!
//! # Overview
//!
//! This framework provides:
//! - [`BridgeConfig`] trait for configuration loading and validation
//! - [`BridgeRunner`] for the bridge loop (startup, heartbeat, forwarding, shutdown)
//! - [`ManagerConnection`] and [`BrokerPublisher`] for the two ends of a bridge
//! - [`AmqpPublisher`] for publishing to a durable fanout exchange
//! - [`SmtpNotifier`] for alerting operators when the bridge dies
//! - [`BridgeArgs`] for common CLI argument parsing
//!
//! # Example
//!
//! ```ignore
//! use asterbunny_bridge_framework::{
//!     AmqpPublisher, BridgeRunner, RunnerOptions, SmtpNotifier, spawn_signal_listener,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = MyBridgeConfig::load("mybridge.json5")?;
//!
//!     let runner = BridgeRunner::start(
//!         "mybridge",
//!         MyManagerClient::new(config.manager.clone()),
//!         AmqpPublisher::new(config.amqp.clone()),
//!         SmtpNotifier::new(&config.notify),
//!         RunnerOptions::from_config(&config),
//!     )
//!     .await?;
//!
//!     // Run until SIGINT/SIGTERM
//!     runner.run(spawn_signal_listener()).await?;
//!     Ok(())
//! }
//! ```

mod args;
mod config;
mod error;
mod footprint;
mod manager;
mod notifier;
mod publisher;
mod runner;
mod signal;

pub use args::BridgeArgs;
pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
pub use footprint::MemoryProbe;
pub use manager::{ActionReply, ManagerConnection};
pub use notifier::{Notifier, SmtpNotifier, compose_failure, notify_failure};
pub use publisher::{AmqpPublisher, BrokerPublisher};
pub use runner::{BridgeRunner, LoopState, RunnerOptions};
pub use signal::{shutdown_requested, spawn_signal_listener};

// Re-export commonly used types from asterbunny-common
pub use asterbunny_common::{
    AmqpConfig, Format, HeartbeatConfig, LogFormat, LoggingConfig, ManagerAction, ManagerMessage,
    NotifyConfig, OutboundMessage,
};
