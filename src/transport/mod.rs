//! Register-link transport layer
//!
//! The transceiver bridge and the pan/tilt controller both speak the same
//! tiny half-duplex register protocol: the host requests a block of 16-bit
//! registers (or writes one) and the device answers after a bus turnaround.
//! Framing and CRC live on the device side of the link; this layer only
//! moves register words.

use crate::config::TransportConfig;
use crate::error::TransportError;

mod mock;
mod serial;

pub use mock::MockRegisterLink;
pub use serial::SerialRegisterLink;

/// A half-duplex register channel to one device
pub trait RegisterTransport: Send {
    /// Read `count` consecutive registers starting at `base`
    fn read_registers(&mut self, base: u8, count: usize) -> Result<Vec<u16>, TransportError>;

    /// Write consecutive registers starting at `base`
    fn write_registers(&mut self, base: u8, values: &[u16]) -> Result<(), TransportError>;
}

/// Open the transport a config section describes
///
/// `kind = "mock"` yields a scripted link answering every poll with the
/// neutral mid-stick frame, so the full pipeline runs without hardware.
pub fn open_transport(
    config: &TransportConfig,
) -> Result<Box<dyn RegisterTransport>, TransportError> {
    match config.kind.as_str() {
        "mock" => {
            log::info!("Using mock register link for {}", config.device);
            let link = MockRegisterLink::new();
            link.set_steady_frame(crate::iris::registers::neutral_frame().to_vec());
            Ok(Box::new(link))
        }
        _ => Ok(Box::new(SerialRegisterLink::open(config)?)),
    }
}
