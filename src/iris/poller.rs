//! Register channel poller
//!
//! Owns the transport handle for one polled device and tracks how long
//! the hardware has been silent. Transport failures are contained here:
//! a failed poll is "no data this tick", logged once at debug and never
//! escalated. The only thing that ever leaves this layer as an error is
//! the hard-disconnect verdict.

use crate::error::NodeError;
use crate::transport::RegisterTransport;
use std::time::{Duration, Instant};

/// Connectivity of one polled channel
///
/// `Stale` is an internal hint only (link timeout exceeded, hard timeout
/// not yet); everything externally observable is binary connected/not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Stale,
    Disconnected,
}

pub struct ChannelPoller {
    transport: Box<dyn RegisterTransport>,
    register_base: u8,
    register_count: usize,
    link_timeout: Duration,
    hard_disconnect_timeout: Duration,
    last_success: Instant,
}

impl ChannelPoller {
    /// `last_success` is seeded to now, so a freshly started process gets
    /// a full hard-disconnect window to reach the hardware.
    pub fn new(
        transport: Box<dyn RegisterTransport>,
        register_base: u8,
        register_count: usize,
        link_timeout: Duration,
        hard_disconnect_timeout: Duration,
    ) -> Self {
        ChannelPoller {
            transport,
            register_base,
            register_count,
            link_timeout,
            hard_disconnect_timeout,
            last_success: Instant::now(),
        }
    }

    /// Request one full register block
    ///
    /// `None` means no data this tick; the transport error behind it has
    /// already been logged and swallowed. `last_success` moves only on a
    /// good read.
    pub fn poll(&mut self, now: Instant) -> Option<Vec<u16>> {
        match self
            .transport
            .read_registers(self.register_base, self.register_count)
        {
            Ok(raw) => {
                self.last_success = now;
                Some(raw)
            }
            Err(e) => {
                log::debug!("Poll failed: {}", e);
                None
            }
        }
    }

    pub fn time_since_last_success(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_success)
    }

    pub fn is_connected(&self, now: Instant) -> bool {
        self.time_since_last_success(now) <= self.link_timeout
    }

    pub fn connection_state(&self, now: Instant) -> ConnectionState {
        let silent_for = self.time_since_last_success(now);
        if silent_for <= self.link_timeout {
            ConnectionState::Connected
        } else if silent_for <= self.hard_disconnect_timeout {
            ConnectionState::Stale
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Fatal path: past the hard-disconnect timeout the node gives up and
    /// lets the process exit so the supervisor respawns it against fresh
    /// hardware state. Crash-to-recover, not a retry loop.
    pub fn check_hard_disconnect(&self, now: Instant) -> Result<(), NodeError> {
        let silent_for = self.time_since_last_success(now);
        if silent_for > self.hard_disconnect_timeout {
            return Err(NodeError::HardDisconnect {
                silent_for,
                limit: self.hard_disconnect_timeout,
            });
        }
        Ok(())
    }
}
