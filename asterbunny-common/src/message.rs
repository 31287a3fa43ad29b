//! Manager protocol message model.
//!
//! Events and responses share one shape: an ordered map of lower-cased
//! keys to string values. Actions are the requests sent to the manager.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Kind of an inbound manager message, derived from its keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Asynchronous notification (`Event: ...`).
    Event,
    /// Reply to an action (`Response: ...`).
    Response,
    /// Neither key is present.
    Unknown,
}

/// An event or response received from the manager.
///
/// Keys are stored lower-cased with trimmed values. Inserting an existing
/// key replaces its value and keeps its first position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManagerMessage {
    fields: IndexMap<String, String>,
}

impl ManagerMessage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key/value pair, normalizing the key.
    pub fn insert(&mut self, key: &str, value: &str) {
        self.fields
            .insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a value by key (case-insensitive).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn fields(&self) -> &IndexMap<String, String> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn kind(&self) -> MessageKind {
        if self.fields.contains_key("event") {
            MessageKind::Event
        } else if self.fields.contains_key("response") {
            MessageKind::Response
        } else {
            MessageKind::Unknown
        }
    }

    /// Event name, for event messages.
    pub fn event_name(&self) -> Option<&str> {
        self.get("event")
    }

    /// Name used in progress logs: the event name, else the response status.
    pub fn display_name(&self) -> &str {
        self.event_name()
            .or_else(|| self.get("response"))
            .unwrap_or("<unnamed>")
    }

    pub fn action_id(&self) -> Option<&str> {
        self.get("actionid")
    }

    /// Whether this is a response reporting `Success`.
    pub fn is_success(&self) -> bool {
        self.get("response") == Some("Success")
    }
}

impl FromIterator<(String, String)> for ManagerMessage {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut message = Self::new();
        for (key, value) in iter {
            message.insert(&key, &value);
        }
        message
    }
}

/// A request sent to the manager.
///
/// Header case is preserved on the wire; the action id is assigned by the
/// connection when the action is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerAction {
    name: String,
    headers: Vec<(String, String)>,
}

impl ManagerAction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            headers: Vec::new(),
        }
    }

    /// Heartbeat request.
    pub fn ping() -> Self {
        Self::new("Ping")
    }

    pub fn login(username: &str, secret: &str) -> Self {
        Self::new("Login")
            .header("Username", username)
            .header("Secret", secret)
            .header("Events", "on")
    }

    pub fn logoff() -> Self {
        Self::new("Logoff")
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}
