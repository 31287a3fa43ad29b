use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::serialization::Format;

/// AMQP broker connection and exchange configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmqpConfig {
    /// Broker host.
    #[serde(default = "default_amqp_host")]
    pub host: String,

    /// Broker port.
    #[serde(default = "default_amqp_port")]
    pub port: u16,

    #[serde(default = "default_amqp_username")]
    pub username: String,

    #[serde(default = "default_amqp_password")]
    pub password: String,

    /// Virtual host (default: "/").
    #[serde(default = "default_vhost")]
    pub vhost: String,

    /// Fanout exchange that events are published to.
    #[serde(default = "default_exchange")]
    pub exchange: String,

    /// Connection timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Payload encoding for published messages.
    #[serde(default)]
    pub serialization: Format,
}

fn default_amqp_host() -> String {
    "localhost".to_string()
}

fn default_amqp_port() -> u16 {
    5672
}

fn default_amqp_username() -> String {
    "guest".to_string()
}

fn default_amqp_password() -> String {
    "guest".to_string()
}

fn default_vhost() -> String {
    "/".to_string()
}

fn default_exchange() -> String {
    "asterbunny.events".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for AmqpConfig {
    fn default() -> Self {
        Self {
            host: default_amqp_host(),
            port: default_amqp_port(),
            username: default_amqp_username(),
            password: default_amqp_password(),
            vhost: default_vhost(),
            exchange: default_exchange(),
            connect_timeout_ms: default_timeout_ms(),
            serialization: Format::default(),
        }
    }
}

impl AmqpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Broker endpoint without credentials, for logging.
    pub fn endpoint(&self) -> String {
        format!("amqp://{}:{}/{}", self.host, self.port, self.vhost)
    }
}

/// Operator notification settings.
///
/// The first recipient is used as the sender address, the remaining
/// entries receive one message each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub recipients: Vec<String>,

    /// SMTP relay host.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub smtp_username: Option<String>,

    #[serde(default)]
    pub smtp_password: Option<String>,

    /// Prepended to every notification subject.
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    25
}

fn default_subject_prefix() -> String {
    "[asterbunny]".to_string()
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            recipients: Vec::new(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password: None,
            subject_prefix: default_subject_prefix(),
        }
    }
}

impl NotifyConfig {
    /// Whether any notification would be sent.
    pub fn is_enabled(&self) -> bool {
        self.recipients.len() > 1
    }

    /// Sender address (first recipient).
    pub fn sender(&self) -> Option<&str> {
        self.recipients.first().map(String::as_str)
    }

    /// Destination addresses (all recipients after the sender).
    pub fn destinations(&self) -> &[String] {
        self.recipients.get(1..).unwrap_or(&[])
    }
}

/// Idle/heartbeat schedule of the bridge loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatConfig {
    /// Sleep quantum of one loop iteration, in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Number of idle ticks after which a heartbeat is sent.
    #[serde(default = "default_idle_ticks")]
    pub idle_ticks: u32,
}

fn default_tick_ms() -> u64 {
    1
}

fn default_idle_ticks() -> u32 {
    10_000
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            idle_ticks: default_idle_ticks(),
        }
    }
}

impl HeartbeatConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Idle time covered by one heartbeat interval.
    pub fn idle_period(&self) -> Duration {
        self.tick() * self.idle_ticks
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Common logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Load a configuration from a JSON5 string.
pub fn parse_config<T: for<'de> Deserialize<'de>>(content: &str) -> Result<T> {
    json5::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
}
