//! Configuration for the AMI bridge.

use std::time::Duration;

use asterbunny_bridge_framework::{
    AmqpConfig, BridgeConfig, BridgeError, HeartbeatConfig, LoggingConfig, NotifyConfig, Result,
};
use serde::{Deserialize, Serialize};

/// Complete bridge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AmiBridgeConfig {
    /// Asterisk Manager Interface settings
    #[serde(default)]
    pub ami: AmiConfig,

    /// AMQP broker settings
    #[serde(default)]
    pub amqp: AmqpConfig,

    /// Failure notification settings
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Idle/heartbeat schedule
    #[serde(default)]
    pub heartbeat: HeartbeatConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BridgeConfig for AmiBridgeConfig {
    fn amqp(&self) -> &AmqpConfig {
        &self.amqp
    }

    fn notify(&self) -> &NotifyConfig {
        &self.notify
    }

    fn heartbeat(&self) -> &HeartbeatConfig {
        &self.heartbeat
    }

    fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    fn validate(&self) -> Result<()> {
        self.validate_common()?;

        if self.ami.host.is_empty() {
            return Err(BridgeError::validation("ami.host must not be empty"));
        }
        if self.ami.port == 0 {
            return Err(BridgeError::validation("ami.port must not be 0"));
        }
        if self.ami.connect_timeout_ms == 0 || self.ami.read_timeout_ms == 0 {
            return Err(BridgeError::validation(
                "ami timeouts must be greater than 0",
            ));
        }

        Ok(())
    }
}

/// Asterisk Manager Interface connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmiConfig {
    /// Manager host (default: "localhost")
    #[serde(default = "default_host")]
    pub host: String,

    /// Manager port (default: 5038)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Manager user from manager.conf
    #[serde(default = "default_username")]
    pub username: String,

    /// Secret of the manager user
    #[serde(default = "default_password")]
    pub password: String,

    /// Connection timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Maximum wait for an action response, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub read_timeout_ms: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5038
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_password() -> String {
    "mysecret".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for AmiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: default_username(),
            password: default_password(),
            connect_timeout_ms: default_timeout_ms(),
            read_timeout_ms: default_timeout_ms(),
        }
    }
}

impl AmiConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// `host:port` for socket connection and logs.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AmiBridgeConfig::default();
        assert_eq!(config.ami.address(), "localhost:5038");
        assert_eq!(config.ami.username, "admin");
        assert_eq!(config.ami.password, "mysecret");
        assert_eq!(config.ami.read_timeout(), Duration::from_secs(10));
        assert_eq!(config.amqp.exchange, "asterbunny.events");
        assert_eq!(config.heartbeat.idle_ticks, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let json5 = r#"
        {
            ami: {
                host: "pbx.local",
                username: "bridge",
                password: "s3cret",
                read_timeout_ms: 2000,
            },
            amqp: {
                host: "rabbit.local",
                vhost: "telephony",
                exchange: "pbx.events",
            },
            notify: {
                recipients: ["bridge@example.com", "ops@example.com"],
            },
            logging: { level: "debug", format: "json" },
        }
        "#;

        let config: AmiBridgeConfig = json5::from_str(json5).unwrap();
        assert_eq!(config.ami.host, "pbx.local");
        assert_eq!(config.ami.port, 5038);
        assert_eq!(config.ami.read_timeout_ms, 2000);
        assert_eq!(config.ami.connect_timeout_ms, 10_000);
        assert_eq!(config.amqp.vhost, "telephony");
        assert_eq!(config.amqp.port, 5672);
        assert_eq!(config.notify.destinations(), &["ops@example.com".to_string()]);
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sample_config_is_valid() {
        let config: AmiBridgeConfig = json5::from_str(include_str!("../asterbunny.json5")).unwrap();
        assert_eq!(config.ami, AmiConfig::default());
        assert_eq!(config.notify.destinations().len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_ami_section() {
        let mut config = AmiBridgeConfig::default();
        config.ami.host.clear();
        assert!(config.validate().is_err());

        let mut config = AmiBridgeConfig::default();
        config.ami.read_timeout_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(BridgeError::ConfigValidation(_))
        ));
    }

    #[test]
    fn test_validate_runs_common_rules() {
        let mut config = AmiBridgeConfig::default();
        config.notify.recipients = vec!["only-sender@example.com".to_string()];
        assert!(config.validate().is_err());
    }
}
