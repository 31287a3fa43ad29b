//! Command line of the `amqp-bridge-ami` binary.

use asterbunny_bridge_framework::BridgeArgs;
use clap::Parser;

use crate::config::AmiBridgeConfig;

/// Forwards Asterisk Manager Interface events to an AMQP fanout exchange.
///
/// Every option overrides the matching field of the configuration file.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "amqp-bridge-ami")]
#[command(about = "Forwards Asterisk manager events to an AMQP fanout exchange")]
#[command(version)]
pub struct AmiArgs {
    #[command(flatten)]
    pub bridge: BridgeArgs,

    #[arg(long)]
    pub ami_host: Option<String>,

    #[arg(long)]
    pub ami_port: Option<u16>,

    #[arg(long)]
    pub ami_username: Option<String>,

    #[arg(long)]
    pub ami_password: Option<String>,

    /// AMI connect timeout in milliseconds
    #[arg(long)]
    pub ami_connect_timeout: Option<u64>,

    /// AMI response timeout in milliseconds
    #[arg(long)]
    pub ami_read_timeout: Option<u64>,

    #[arg(long)]
    pub rabbit_host: Option<String>,

    #[arg(long)]
    pub rabbit_port: Option<u16>,

    #[arg(long)]
    pub rabbit_username: Option<String>,

    #[arg(long)]
    pub rabbit_password: Option<String>,

    #[arg(long)]
    pub rabbit_vhost: Option<String>,

    #[arg(long)]
    pub rabbit_exchange_name: Option<String>,

    /// Failure notification address, repeatable. The first one is the sender.
    #[arg(long = "notify", value_name = "EMAIL")]
    pub notify: Vec<String>,
}

impl AmiArgs {
    /// Parse CLI arguments.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Apply the command line overrides on top of a loaded configuration.
    pub fn apply(&self, config: &mut AmiBridgeConfig) {
        let ami = &mut config.ami;
        if let Some(ref host) = self.ami_host {
            ami.host = host.clone();
        }
        if let Some(port) = self.ami_port {
            ami.port = port;
        }
        if let Some(ref username) = self.ami_username {
            ami.username = username.clone();
        }
        if let Some(ref password) = self.ami_password {
            ami.password = password.clone();
        }
        if let Some(ms) = self.ami_connect_timeout {
            ami.connect_timeout_ms = ms;
        }
        if let Some(ms) = self.ami_read_timeout {
            ami.read_timeout_ms = ms;
        }

        let amqp = &mut config.amqp;
        if let Some(ref host) = self.rabbit_host {
            amqp.host = host.clone();
        }
        if let Some(port) = self.rabbit_port {
            amqp.port = port;
        }
        if let Some(ref username) = self.rabbit_username {
            amqp.username = username.clone();
        }
        if let Some(ref password) = self.rabbit_password {
            amqp.password = password.clone();
        }
        if let Some(ref vhost) = self.rabbit_vhost {
            amqp.vhost = vhost.clone();
        }
        if let Some(ref exchange) = self.rabbit_exchange_name {
            amqp.exchange = exchange.clone();
        }

        if !self.notify.is_empty() {
            config.notify.recipients = self.notify.clone();
        }
    }
}
