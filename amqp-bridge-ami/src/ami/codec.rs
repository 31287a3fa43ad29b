//! AMI wire format.
//!
//! ```text
//! Action: Ping\r\n
//! ActionID: 2\r\n
//! \r\n
//! ```
//!
//! A frame is a run of `Key: Value` lines closed by an empty line. The server
//! sends `\r\n`, but bare `\n` is accepted on input.

use asterbunny_bridge_framework::{BridgeError, ManagerAction, ManagerMessage};
use thiserror::Error;

/// Upper bound for buffered bytes that belong to no complete frame yet.
pub const MAX_PENDING_BYTES: usize = 1024 * 1024;

/// Framing errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("Unterminated frame exceeds {0} bytes")]
    Oversized(usize),
    #[error("Unexpected greeting: {0:?}")]
    Banner(String),
}

impl From<FrameError> for BridgeError {
    fn from(err: FrameError) -> Self {
        BridgeError::protocol(err.to_string())
    }
}

/// Accumulates bytes read from the socket and splits them into frames.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buf: Vec<u8>,
    /// Start of the bytes not yet taken as a line or frame.
    start: usize,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append input. Fails once the trailing, unterminated part alone is
    /// larger than [`MAX_PENDING_BYTES`]; complete frames never count.
    pub fn extend(&mut self, data: &[u8]) -> Result<(), FrameError> {
        if self.start > 0 {
            self.buf.drain(..self.start);
            self.start = 0;
        }
        self.buf.extend_from_slice(data);

        if self.buf.len() > MAX_PENDING_BYTES
            && self.buf.len() - self.complete_len() > MAX_PENDING_BYTES
        {
            return Err(FrameError::Oversized(MAX_PENDING_BYTES));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.buf.len()
    }

    fn unread(&self) -> &[u8] {
        &self.buf[self.start..]
    }

    /// Take one line, without its terminator. Used for the greeting.
    pub fn next_line(&mut self) -> Option<String> {
        let end = self.unread().iter().position(|&b| b == b'\n')?;
        let line = trim_eol(&self.unread()[..=end]).to_string();
        self.start += end + 1;
        Some(line)
    }

    /// Take one complete frame, if buffered.
    pub fn next_frame(&mut self) -> Option<ManagerMessage> {
        loop {
            let end = self.frame_end()?;
            let message = parse_frame(&String::from_utf8_lossy(&self.unread()[..end]));
            self.start += end;

            // Stray blank lines between frames yield empty frames; skip them.
            if !message.is_empty() {
                return Some(message);
            }
        }
    }

    /// Offset just past the empty line that closes the first unread frame.
    fn frame_end(&self) -> Option<usize> {
        blank_line_ends(self.unread()).next()
    }

    /// Length of the unread bytes covered by complete frames.
    fn complete_len(&self) -> usize {
        blank_line_ends(self.unread()).last().unwrap_or(0)
    }
}

/// Offsets just past each empty line (`\n` or `\r\n`) in `data`.
fn blank_line_ends(data: &[u8]) -> impl Iterator<Item = usize> + '_ {
    let mut line_start = 0;
    data.iter().enumerate().filter_map(move |(i, &b)| {
        if b != b'\n' {
            return None;
        }
        let line = &data[line_start..i];
        line_start = i + 1;
        (line.is_empty() || line == b"\r").then_some(i + 1)
    })
}

/// Parse the text of one frame.
///
/// Lines without a `:` separator are ignored. Keys are lowercased and values
/// trimmed by [`ManagerMessage::insert`].
pub fn parse_frame(text: &str) -> ManagerMessage {
    let mut message = ManagerMessage::new();
    for line in text.lines() {
        if let Some((key, value)) = line.split_once(':') {
            if !key.trim().is_empty() {
                message.insert(key, value);
            }
        }
    }
    message
}

/// Serialize an action with its `ActionID`.
pub fn encode_action(action: &ManagerAction, action_id: u64) -> Vec<u8> {
    let mut out = format!("Action: {}\r\nActionID: {}\r\n", action.name(), action_id);
    for (key, value) in action.headers() {
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push_str("\r\n");
    }
    out.push_str("\r\n");
    out.into_bytes()
}

/// Check the greeting line sent by the server on connect.
pub fn check_banner(line: &str) -> Result<&str, FrameError> {
    line.strip_prefix("Asterisk Call Manager/")
        .ok_or_else(|| FrameError::Banner(line.to_string()))
}

fn trim_eol(line: &[u8]) -> &str {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    std::str::from_utf8(line).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_split_crlf() {
        let mut buf = FrameBuffer::new();
        buf.extend(b"Event: Newchannel\r\nChannel: SIP/100-0001\r\n\r\nEvent: Hang")
            .unwrap();

        let frame = buf.next_frame().unwrap();
        assert_eq!(frame.get("event"), Some("Newchannel"));
        assert_eq!(frame.get("channel"), Some("SIP/100-0001"));

        assert!(buf.next_frame().is_none());
        buf.extend(b"up\r\n\r\n").unwrap();
        assert_eq!(buf.next_frame().unwrap().event_name(), Some("Hangup"));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_frame_split_bare_lf() {
        let mut buf = FrameBuffer::new();
        buf.extend(b"Response: Success\nPing: Pong\n\n").unwrap();

        let frame = buf.next_frame().unwrap();
        assert!(frame.is_success());
        assert_eq!(frame.get("ping"), Some("Pong"));
    }

    #[test]
    fn test_blank_lines_between_frames_skipped() {
        let mut buf = FrameBuffer::new();
        buf.extend(b"\r\n\r\nEvent: FullyBooted\r\n\r\n").unwrap();

        assert_eq!(buf.next_frame().unwrap().event_name(), Some("FullyBooted"));
        assert!(buf.next_frame().is_none());
    }

    #[test]
    fn test_parse_frame_normalizes() {
        let frame = parse_frame("Event: Hangup\r\nCause-txt:  Normal Clearing \r\ngarbage\r\n");

        let keys: Vec<_> = frame.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, ["event", "cause-txt"]);
        assert_eq!(frame.get("Cause-txt"), Some("Normal Clearing"));
    }

    #[test]
    fn test_value_may_contain_colons() {
        let frame = parse_frame("Event: Dial\r\nDestination: SIP/trunk:5060-0002\r\n");
        assert_eq!(frame.get("destination"), Some("SIP/trunk:5060-0002"));
    }

    #[test]
    fn test_next_line() {
        let mut buf = FrameBuffer::new();
        buf.extend(b"Asterisk Call Manager/5.0.1\r\nResp").unwrap();

        let line = buf.next_line().unwrap();
        assert_eq!(check_banner(&line), Ok("5.0.1"));
        assert!(buf.next_line().is_none());
    }

    #[test]
    fn test_bad_banner() {
        assert!(matches!(
            check_banner("SSH-2.0-OpenSSH_9.6"),
            Err(FrameError::Banner(_))
        ));
    }

    #[test]
    fn test_oversized_input() {
        let mut buf = FrameBuffer::new();
        let chunk = vec![b'x'; MAX_PENDING_BYTES + 1];
        assert_eq!(
            buf.extend(&chunk),
            Err(FrameError::Oversized(MAX_PENDING_BYTES))
        );
    }

    #[test]
    fn test_burst_of_complete_frames_is_accepted() {
        let mut burst = Vec::new();
        let mut count = 0;
        while burst.len() <= MAX_PENDING_BYTES {
            burst.extend_from_slice(
                format!(
                    "Event: Newchannel\r\nPrivilege: call,all\r\nUniqueid: 1700000000.{}\r\n\r\n",
                    count
                )
                .as_bytes(),
            );
            count += 1;
        }
        burst.extend_from_slice(b"Event: Hangup\r\nChannel: SIP/1");

        let mut buf = FrameBuffer::new();
        buf.extend(&burst).unwrap();

        let mut frames = 0;
        while let Some(frame) = buf.next_frame() {
            assert_eq!(frame.event_name(), Some("Newchannel"));
            frames += 1;
        }
        assert_eq!(frames, count);

        buf.extend(b"00-0001\r\n\r\n").unwrap();
        let last = buf.next_frame().unwrap();
        assert_eq!(last.get("channel"), Some("SIP/100-0001"));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_oversized_tail_after_complete_frames() {
        let mut buf = FrameBuffer::new();
        buf.extend(b"Event: FullyBooted\r\n\r\n").unwrap();

        let tail = vec![b'x'; MAX_PENDING_BYTES + 1];
        assert_eq!(
            buf.extend(&tail),
            Err(FrameError::Oversized(MAX_PENDING_BYTES))
        );
    }

    #[test]
    fn test_encode_login() {
        let action = ManagerAction::login("admin", "mysecret");
        let wire = String::from_utf8(encode_action(&action, 1)).unwrap();
        assert_eq!(
            wire,
            "Action: Login\r\nActionID: 1\r\nUsername: admin\r\nSecret: mysecret\r\nEvents: on\r\n\r\n"
        );
    }

    #[test]
    fn test_encode_ping() {
        let wire = encode_action(&ManagerAction::ping(), 7);
        assert_eq!(wire, b"Action: Ping\r\nActionID: 7\r\n\r\n");
    }
}
