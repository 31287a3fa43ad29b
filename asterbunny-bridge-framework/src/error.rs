//! Error types for the bridge framework.

use thiserror::Error;

/// Result type alias using [`BridgeError`].
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur in a bridge.
///
/// The runner stops on any error it sees. Notification errors never reach
/// it: delivery failures are logged and dropped.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration parse error.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Configuration validation error.
    #[error("Configuration validation failed: {0}")]
    ConfigValidation(String),

    /// Manager or broker connection could not be opened.
    #[error("Connection to {endpoint} failed: {message}")]
    Connection { endpoint: String, message: String },

    /// Malformed or unexpected manager response, or the session was lost.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A request did not get its response within the read timeout.
    #[error("Timed out after {timeout_ms} ms waiting for {operation}")]
    Timeout { operation: String, timeout_ms: u64 },

    /// Publishing error.
    #[error("Failed to publish to {exchange}: {message}")]
    Publish { exchange: String, message: String },

    /// Operator notification could not be sent.
    #[error("Notification error: {0}")]
    Notification(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl BridgeError {
    /// Create a configuration validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ConfigValidation(msg.into())
    }

    /// Create a connection error.
    pub fn connection(endpoint: impl Into<String>, msg: impl ToString) -> Self {
        Self::Connection {
            endpoint: endpoint.into(),
            message: msg.to_string(),
        }
    }

    /// Create a protocol error.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Create a publish error.
    pub fn publish(exchange: impl Into<String>, msg: impl ToString) -> Self {
        Self::Publish {
            exchange: exchange.into(),
            message: msg.to_string(),
        }
    }

    /// Create a notification error.
    pub fn notification(msg: impl ToString) -> Self {
        Self::Notification(msg.to_string())
    }

    /// Wrap an error with context.
    pub fn with_context<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

impl From<asterbunny_common::Error> for BridgeError {
    fn from(err: asterbunny_common::Error) -> Self {
        use asterbunny_common::Error;

        match err {
            Error::Config(msg) => Self::Config(msg),
            Error::Json(e) => Self::Serialization(e.to_string()),
            Error::Cbor(msg) => Self::Serialization(msg),
            Error::Io(e) => Self::Io(e),
            other => Self::with_context("Broker error", other),
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<json5::Error> for BridgeError {
    fn from(err: json5::Error) -> Self {
        Self::ConfigParse(err.to_string())
    }
}
