//! Translation of manager messages into broker messages.

use crate::error::Result;
use crate::message::ManagerMessage;
use crate::serialization::{Format, encode};

/// AMQP `delivery_mode` value marking a message as persistent.
pub const PERSISTENT_DELIVERY_MODE: u8 = 2;

/// A serialized, metadata-stamped payload ready to be published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Encoded key/value mapping of the source message.
    pub body: Vec<u8>,
    /// MIME type of `body`.
    pub content_type: &'static str,
    /// Unix seconds at translation time.
    pub timestamp: u64,
    /// Whether the broker should store the message durably.
    pub persistent: bool,
}

impl OutboundMessage {
    /// Translate an event or heartbeat response, stamped with the current time.
    pub fn from_message(message: &ManagerMessage, format: Format) -> Result<Self> {
        Self::from_message_at(message, format, current_timestamp_secs())
    }

    /// Translate with an explicit timestamp.
    pub fn from_message_at(message: &ManagerMessage, format: Format, timestamp: u64) -> Result<Self> {
        Ok(Self {
            body: encode(message, format)?,
            content_type: format.mime_type(),
            timestamp,
            persistent: true,
        })
    }

    pub fn delivery_mode(&self) -> u8 {
        if self.persistent {
            PERSISTENT_DELIVERY_MODE
        } else {
            1
        }
    }
}

/// Current time in seconds since the Unix epoch.
pub fn current_timestamp_secs() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}
