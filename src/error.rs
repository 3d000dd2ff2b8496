//! Error types for VahanaIO

use std::time::Duration;

/// Result type alias for daemon-level operations
pub type Result<T> = std::result::Result<T, Error>;

/// Daemon-level error (startup, configuration, shutdown)
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// Register transport failed during setup
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A node loop ended with a fatal error
    #[error("Node failed: {0}")]
    Node(#[from] NodeError),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

/// Register-link failures
///
/// These are expected with physical hardware and are contained by the
/// poller: a failed read is "no data this tick", never an escalation.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The reply did not arrive within the per-call timeout
    #[error("Register read timed out")]
    Timeout,

    /// The reply ended before the full register block arrived
    #[error("Short register read: expected {expected} bytes, got {actual}")]
    ShortRead {
        /// Bytes needed for the requested register count
        expected: usize,
        /// Bytes actually received
        actual: usize,
    },
}

/// Register frame decode failures
///
/// Decode fails closed: a bad frame means the affected records simply do
/// not update that tick.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Fewer registers than the fixed map requires
    #[error("Short register frame: expected {expected} registers, got {actual}")]
    ShortFrame {
        /// Registers the map requires
        expected: usize,
        /// Registers actually present
        actual: usize,
    },
}

/// Per-tick node failures
///
/// `HardDisconnect` is the only variant that stops a node loop; everything
/// else is logged by the scheduler and the loop continues.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// The hardware has been unreachable past the hard-disconnect timeout.
    /// The process exits nonzero so the supervisor respawns it.
    #[error("hard disconnect: no contact for {silent_for:?} (limit {limit:?})")]
    HardDisconnect {
        /// Time since the last successful transfer
        silent_for: Duration,
        /// Configured hard-disconnect timeout
        limit: Duration,
    },

    /// A register transfer failed this tick
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl NodeError {
    /// True for errors that must stop the node loop
    pub fn is_fatal(&self) -> bool {
        matches!(self, NodeError::HardDisconnect { .. })
    }
}
