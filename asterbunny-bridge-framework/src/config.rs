//! Configuration traits and utilities.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{BridgeError, Result};
use crate::{AmqpConfig, HeartbeatConfig, LoggingConfig, NotifyConfig};

/// Trait for bridge configuration types.
///
/// Implement this trait for your bridge's configuration struct to get
/// automatic loading, validation, and access to common config fields.
///
/// # Example
///
/// ```ignore
/// use serde::Deserialize;
/// use asterbunny_bridge_framework::{AmqpConfig, BridgeConfig, HeartbeatConfig, LoggingConfig, NotifyConfig};
///
/// #[derive(Debug, Default, Deserialize)]
/// pub struct MyBridgeConfig {
///     pub amqp: AmqpConfig,
///     pub notify: NotifyConfig,
///     pub heartbeat: HeartbeatConfig,
///     pub logging: LoggingConfig,
///     pub my_protocol: MyProtocolConfig,
/// }
///
/// impl BridgeConfig for MyBridgeConfig {
///     fn amqp(&self) -> &AmqpConfig { &self.amqp }
///     fn notify(&self) -> &NotifyConfig { &self.notify }
///     fn heartbeat(&self) -> &HeartbeatConfig { &self.heartbeat }
///     fn logging(&self) -> &LoggingConfig { &self.logging }
///
///     fn validate(&self) -> Result<()> {
///         self.validate_common()?;
///         if self.my_protocol.host.is_empty() {
///             return Err(BridgeError::validation("Manager host required"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait BridgeConfig: Sized + DeserializeOwned {
    /// Get the AMQP broker configuration.
    fn amqp(&self) -> &AmqpConfig;

    /// Get the operator notification configuration.
    fn notify(&self) -> &NotifyConfig;

    /// Get the idle/heartbeat schedule.
    fn heartbeat(&self) -> &HeartbeatConfig;

    /// Get the logging configuration.
    fn logging(&self) -> &LoggingConfig;

    /// Validate the configuration.
    ///
    /// Called automatically after loading. Override to add custom validation,
    /// keeping a call to [`validate_common`](Self::validate_common).
    fn validate(&self) -> Result<()> {
        self.validate_common()
    }

    /// Validate the sections shared by every bridge.
    fn validate_common(&self) -> Result<()> {
        let amqp = self.amqp();
        if amqp.host.is_empty() {
            return Err(BridgeError::validation("amqp.host must not be empty"));
        }
        if amqp.port == 0 {
            return Err(BridgeError::validation("amqp.port must not be 0"));
        }
        if amqp.exchange.is_empty() {
            return Err(BridgeError::validation("amqp.exchange must not be empty"));
        }
        if amqp.connect_timeout_ms == 0 {
            return Err(BridgeError::validation(
                "amqp.connect_timeout_ms must be greater than 0",
            ));
        }

        let heartbeat = self.heartbeat();
        if heartbeat.tick_ms == 0 {
            return Err(BridgeError::validation(
                "heartbeat.tick_ms must be greater than 0",
            ));
        }
        if heartbeat.idle_ticks == 0 {
            return Err(BridgeError::validation(
                "heartbeat.idle_ticks must be greater than 0",
            ));
        }

        let notify = self.notify();
        if notify.recipients.len() == 1 {
            return Err(BridgeError::validation(
                "notify.recipients needs a sender and at least one recipient",
            ));
        }
        if let Some(bad) = notify.recipients.iter().find(|r| !r.contains('@')) {
            return Err(BridgeError::validation(format!(
                "notify.recipients entry '{}' is not an email address",
                bad
            )));
        }

        Ok(())
    }

    /// Parse a JSON5 configuration file without validating it.
    fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BridgeError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        Ok(json5::from_str(&content)?)
    }

    /// Load configuration from a file path.
    ///
    /// Supports JSON5 format. Calls [`validate`](Self::validate) after loading.
    fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a file if a path is given, otherwise use the defaults.
    ///
    /// Nothing is validated here; callers apply CLI overrides first, then
    /// call [`validate`](Self::validate).
    fn load_or_default(path: Option<&Path>) -> Result<Self>
    where
        Self: Default,
    {
        match path {
            Some(path) => Self::read(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Default, Deserialize)]
    struct TestConfig {
        #[serde(default)]
        amqp: AmqpConfig,
        #[serde(default)]
        notify: NotifyConfig,
        #[serde(default)]
        heartbeat: HeartbeatConfig,
        #[serde(default)]
        logging: LoggingConfig,
    }

    impl BridgeConfig for TestConfig {
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
    }

    #[test]
    fn test_config_not_found() {
        let result = TestConfig::load("/nonexistent/path.json5");
        assert!(matches!(result, Err(BridgeError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ amqp: {{ exchange: "pbx.events" }}, logging: {{ level: "debug" }} }}"#)
            .unwrap();

        let config = TestConfig::load(file.path()).unwrap();
        assert_eq!(config.amqp.exchange, "pbx.events");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = TestConfig::load_or_default(None).unwrap();
        assert_eq!(config.amqp, AmqpConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_or_default_leaves_validation_to_caller() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ notify: {{ recipients: ["bridge@example.com"] }} }}"#).unwrap();

        assert!(matches!(
            TestConfig::load(file.path()),
            Err(BridgeError::ConfigValidation(_))
        ));

        let mut config = TestConfig::load_or_default(Some(file.path())).unwrap();
        assert!(config.validate().is_err());

        config.notify.recipients.push("ops@example.com".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let result = TestConfig::load_or_default(Some(Path::new("/nonexistent/path.json5")));
        assert!(matches!(result, Err(BridgeError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{ amqp: ").unwrap();

        let result = TestConfig::load(file.path());
        assert!(matches!(result, Err(BridgeError::ConfigParse(_))));
    }

    #[test]
    fn test_validate_single_recipient() {
        let config = TestConfig {
            notify: NotifyConfig {
                recipients: vec!["bridge@example.com".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BridgeError::ConfigValidation(_))
        ));
    }

    #[test]
    fn test_validate_bad_address() {
        let config = TestConfig {
            notify: NotifyConfig {
                recipients: vec!["bridge@example.com".to_string(), "ops".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_exchange() {
        let config = TestConfig {
            amqp: AmqpConfig {
                exchange: String::new(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_idle_ticks() {
        let config = TestConfig {
            heartbeat: HeartbeatConfig {
                tick_ms: 1,
                idle_ticks: 0,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_tick() {
        let config = TestConfig {
            heartbeat: HeartbeatConfig {
                tick_ms: 0,
                idle_ticks: 10_000,
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BridgeError::ConfigValidation(_))
        ));
    }
}
