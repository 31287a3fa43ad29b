//! AsterBunny bridge for the Asterisk Manager Interface.
//!
//! Forwards every AMI event to an AMQP fanout exchange until SIGINT/SIGTERM.
//! Exits non-zero, after alerting the operators, when either side fails.

use amqp_bridge_ami::ami::AmiClient;
use amqp_bridge_ami::args::AmiArgs;
use amqp_bridge_ami::config::AmiBridgeConfig;
use anyhow::{Context, Result};
use asterbunny_bridge_framework::{
    AmqpPublisher, BridgeConfig, BridgeRunner, RunnerOptions, SmtpNotifier,
    spawn_signal_listener,
};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = AmiArgs::parse();

    // Load configuration, then apply command line overrides
    let mut config = AmiBridgeConfig::load_or_default(args.bridge.config.as_deref())
        .with_context(|| format!("Failed to load config from {:?}", args.bridge.config))?;
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    // Initialize logging
    let log_config = args.bridge.logging_config(&config.logging);
    asterbunny_common::init_tracing(&log_config)
        .map_err(|e| anyhow::anyhow!("Failed to init tracing: {}", e))?;

    match args.bridge.config {
        Some(ref path) => info!("Loaded configuration from {:?}", path),
        None => info!("No configuration file given, using defaults"),
    }

    let runner = BridgeRunner::start(
        "ami",
        AmiClient::new(config.ami.clone()),
        AmqpPublisher::new(config.amqp.clone()),
        SmtpNotifier::new(&config.notify),
        RunnerOptions::from_config(&config),
    )
    .await?;

    runner.run(spawn_signal_listener()).await?;

    info!("AMI bridge stopped");
    Ok(())
}
