//! AMI session over TCP.

use std::collections::VecDeque;
use std::io::ErrorKind;

use asterbunny_bridge_framework::{
    ActionReply, BridgeError, ManagerAction, ManagerConnection, ManagerMessage, Result,
};
use asterbunny_common::MessageKind;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::codec::{FrameBuffer, check_banner, encode_action};
use crate::config::AmiConfig;

const READ_CHUNK: usize = 4096;

/// Client for the Asterisk Manager Interface.
///
/// Events that arrive while an action waits for its response are returned
/// with that response, ahead of it, so no event is lost or reordered.
pub struct AmiClient {
    config: AmiConfig,
    stream: Option<TcpStream>,
    buffer: FrameBuffer,
    pending: VecDeque<ManagerMessage>,
    next_action_id: u64,
    server_version: Option<String>,
}

impl AmiClient {
    pub fn new(config: AmiConfig) -> Self {
        Self {
            config,
            stream: None,
            buffer: FrameBuffer::new(),
            pending: VecDeque::new(),
            next_action_id: 1,
            server_version: None,
        }
    }

    /// Protocol version from the server greeting, once connected.
    pub fn server_version(&self) -> Option<&str> {
        self.server_version.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    async fn handshake(&mut self) -> Result<()> {
        let connect_timeout = self.config.connect_timeout();

        let stream = timeout(connect_timeout, TcpStream::connect(self.config.address()))
            .await
            .map_err(|_| {
                BridgeError::connection(
                    self.endpoint(),
                    format!("timed out after {} ms", self.config.connect_timeout_ms),
                )
            })?
            .map_err(|e| BridgeError::connection(self.endpoint(), e))?;
        self.stream = Some(stream);

        let banner = timeout(connect_timeout, self.read_line())
            .await
            .map_err(|_| BridgeError::connection(self.endpoint(), "no greeting from server"))??;
        let version = check_banner(&banner)?.to_string();
        debug!(version = %version, "Manager greeting");
        self.server_version = Some(version);

        let login = ManagerAction::login(&self.config.username, &self.config.password);
        let ActionReply { events, response } = self.send(login).await?;
        self.pending.extend(events);
        if !response.is_success() {
            return Err(BridgeError::connection(
                self.endpoint(),
                format!(
                    "login rejected: {}",
                    response.get("message").unwrap_or("no reason given")
                ),
            ));
        }

        Ok(())
    }

    /// Wait for more input and append it to the frame buffer.
    async fn read_more(&mut self) -> Result<()> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| BridgeError::protocol("Manager connection is not open"))?;

        let mut chunk = [0u8; READ_CHUNK];
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(BridgeError::protocol("Manager closed the connection"));
        }
        self.buffer.extend(&chunk[..n])?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String> {
        loop {
            if let Some(line) = self.buffer.next_line() {
                return Ok(line);
            }
            self.read_more().await?;
        }
    }

    /// Read until the response carrying `action_id`, queueing events.
    async fn read_response(&mut self, action_id: &str) -> Result<ManagerMessage> {
        loop {
            while let Some(frame) = self.buffer.next_frame() {
                if frame.kind() == MessageKind::Event {
                    self.pending.push_back(frame);
                } else if frame.action_id() == Some(action_id) {
                    return Ok(frame);
                } else {
                    debug!(action_id = ?frame.action_id(), "Dropping unmatched response");
                }
            }
            self.read_more().await?;
        }
    }
}

/// Move complete frames from the buffer to the event queue.
fn queue_events(buffer: &mut FrameBuffer, pending: &mut VecDeque<ManagerMessage>) {
    while let Some(frame) = buffer.next_frame() {
        if frame.kind() == MessageKind::Event {
            pending.push_back(frame);
        } else {
            debug!(action_id = ?frame.action_id(), "Dropping unsolicited response");
        }
    }
}

impl ManagerConnection for AmiClient {
    fn endpoint(&self) -> String {
        format!("ami://{}", self.config.address())
    }

    async fn open(&mut self) -> Result<()> {
        self.buffer = FrameBuffer::new();
        self.pending.clear();

        if let Err(e) = self.handshake().await {
            self.stream = None;
            return Err(match e {
                e @ BridgeError::Connection { .. } => e,
                other => BridgeError::connection(self.endpoint(), other),
            });
        }

        info!(
            endpoint = %self.endpoint(),
            user = %self.config.username,
            version = self.server_version().unwrap_or("unknown"),
            "Logged in to manager"
        );
        Ok(())
    }

    async fn send(&mut self, action: ManagerAction) -> Result<ActionReply> {
        let action_id = self.next_action_id;
        self.next_action_id += 1;

        let frame = encode_action(&action, action_id);
        self.stream
            .as_mut()
            .ok_or_else(|| BridgeError::protocol("Manager connection is not open"))?
            .write_all(&frame)
            .await?;
        debug!(action = action.name(), action_id, "Sent action");

        let action_id = action_id.to_string();
        match timeout(self.config.read_timeout(), self.read_response(&action_id)).await {
            Ok(response) => {
                let response = response?;
                let events = self.pending.drain(..).collect();
                Ok(ActionReply::new(response).with_events(events))
            }
            Err(_) => Err(BridgeError::timeout(
                format!("{} response", action.name()),
                self.config.read_timeout_ms,
            )),
        }
    }

    async fn process(&mut self) -> Result<Vec<ManagerMessage>> {
        let stream = self
            .stream
            .as_ref()
            .ok_or_else(|| BridgeError::protocol("Manager connection is not open"))?;

        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match stream.try_read(&mut chunk) {
                Ok(0) => return Err(BridgeError::protocol("Manager closed the connection")),
                Ok(n) => {
                    self.buffer.extend(&chunk[..n])?;
                    queue_events(&mut self.buffer, &mut self.pending);
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(self.pending.drain(..).collect())
    }

    async fn close(&mut self) -> Result<()> {
        if self.stream.is_none() {
            return Ok(());
        }

        let logoff = self.send(ManagerAction::logoff()).await;
        if let Err(ref e) = logoff {
            warn!(error = %e, "Logoff failed");
        }

        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                debug!(error = %e, "Socket shutdown failed");
            }
        }
        self.pending.clear();

        logoff.map(|_| ())
    }
}
