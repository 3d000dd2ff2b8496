//! VahanaIO - Rover chassis telemetry and teleop daemon
//!
//! Polls the joystick transceiver bridge over a half-duplex serial
//! register link, decodes registers into typed frames, derives drive
//! commands, aggregates system status records, and publishes
//! change-gated updates on an in-process topic bus.
//!
//! Three nodes run as named threads of one process:
//!
//! - **iris**: poll → decode → map → publish drive command and channel health
//! - **status**: aggregate → change-gate → publish per-category records
//! - **pantilt**: inbound adjustments → register writes at a fixed rate

pub mod bus;
pub mod config;
pub mod error;
pub mod iris;
pub mod messages;
pub mod pantilt;
pub mod scheduler;
pub mod status;
pub mod transport;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
