//! Manager connection abstraction.

use crate::error::Result;
use crate::{ManagerAction, ManagerMessage};

/// The response to an action, with the events that arrived ahead of it.
///
/// `events` are in arrival order and precede `response` on the wire, so
/// they must be forwarded before anything is done with the response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionReply {
    pub events: Vec<ManagerMessage>,
    pub response: ManagerMessage,
}

impl ActionReply {
    /// A reply with no preceding events.
    pub fn new(response: ManagerMessage) -> Self {
        Self {
            events: Vec::new(),
            response,
        }
    }

    pub fn with_events(mut self, events: Vec<ManagerMessage>) -> Self {
        self.events = events;
        self
    }
}

/// A session to the manager server whose events the bridge forwards.
///
/// The runner is the only consumer of events: [`process`](Self::process)
/// hands back everything that arrived since the previous call, and
/// [`send`](Self::send) hands back whatever arrived before its response.
/// The runner forwards each event before doing anything else.
#[allow(async_fn_in_trait)]
pub trait ManagerConnection {
    /// Human-readable endpoint, for logs and notifications.
    fn endpoint(&self) -> String;

    /// Connect and authenticate.
    async fn open(&mut self) -> Result<()>;

    /// Send an action and wait for its response, bounded by the read timeout.
    async fn send(&mut self, action: ManagerAction) -> Result<ActionReply>;

    /// Read whatever input is pending without waiting for more and return
    /// the events it contained, in arrival order.
    async fn process(&mut self) -> Result<Vec<ManagerMessage>>;

    /// Log off and close the session. Calling it again is a no-op.
    async fn close(&mut self) -> Result<()>;
}
