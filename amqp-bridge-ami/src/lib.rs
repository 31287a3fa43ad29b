//! AsterBunny bridge for the Asterisk Manager Interface.
//!
//! Logs in to AMI, forwards every event to an AMQP fanout exchange and pings
//! the PBX when it has been quiet for a while.
//!
//! # Published messages
//!
//! Each AMI event becomes one persistent message on the configured exchange
//! (routing key empty). The body is the event as a JSON object, keys
//! lowercased and in wire order:
//!
//! ```text
//! {"event":"Hangup","privilege":"call,all","channel":"SIP/100-00000001",...}
//! ```
//!
//! Successful heartbeats are published the same way, as the `Ping` response.

pub mod ami;
pub mod args;
pub mod config;
