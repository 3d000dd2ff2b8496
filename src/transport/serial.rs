//! Serial register link
//!
//! Request framing on the wire: the host writes `[base, count]`, waits out
//! the half-duplex turnaround, then reads `count` big-endian 16-bit words.
//! Writes send `[base, count]` followed by the word payload. The per-call
//! timeout bounds every read; there is no retry here, a short or silent
//! reply surfaces as a `TransportError` and the caller decides what a
//! missed poll means.

use super::RegisterTransport;
use crate::config::TransportConfig;
use crate::error::TransportError;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{Read, Write};
use std::thread;
use std::time::Duration;

pub struct SerialRegisterLink {
    port: Box<dyn SerialPort>,
    turnaround: Duration,
}

impl SerialRegisterLink {
    /// Open the configured serial device, 8N1, bounded reply timeout
    pub fn open(config: &TransportConfig) -> Result<Self, TransportError> {
        let port = serialport::new(&config.device, config.baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.timeout())
            .open()?;

        log::info!(
            "Opened register link: {} at {} baud",
            config.device,
            config.baud
        );

        Ok(SerialRegisterLink {
            port,
            turnaround: config.turnaround(),
        })
    }

    /// Read exactly `expected` bytes within the port timeout
    ///
    /// The serialport crate reports an exhausted timeout as `TimedOut`;
    /// a reply that starts but stops early shows up as a short count.
    fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.port.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(TransportError::ShortRead {
                        expected: buf.len(),
                        actual: filled,
                    });
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                    if filled == 0 {
                        return Err(TransportError::Timeout);
                    }
                    return Err(TransportError::ShortRead {
                        expected: buf.len(),
                        actual: filled,
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

impl RegisterTransport for SerialRegisterLink {
    fn read_registers(&mut self, base: u8, count: usize) -> Result<Vec<u16>, TransportError> {
        self.port.write_all(&[base, count as u8])?;
        self.port.flush()?;
        // Half-duplex: give the device the bus before listening
        thread::sleep(self.turnaround);

        let mut raw = vec![0u8; count * 2];
        self.read_exact_bytes(&mut raw)?;

        Ok(raw
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect())
    }

    fn write_registers(&mut self, base: u8, values: &[u16]) -> Result<(), TransportError> {
        let mut frame = Vec::with_capacity(2 + values.len() * 2);
        frame.push(base);
        frame.push(values.len() as u8);
        for v in values {
            frame.extend_from_slice(&v.to_be_bytes());
        }
        self.port.write_all(&frame)?;
        self.port.flush()?;
        thread::sleep(self.turnaround);
        Ok(())
    }
}
