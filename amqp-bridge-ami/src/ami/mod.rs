//! Asterisk Manager Interface client.

mod client;
pub mod codec;

pub use client::AmiClient;
pub use codec::{FrameBuffer, FrameError};
