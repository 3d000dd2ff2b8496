//! Pan/tilt node: inbound adjustments → register writes
//!
//! The chassis camera mount controller takes a five-register control
//! frame. A freshly arrived adjustment message is written exactly once;
//! every other cycle writes the all-zero neutral frame so the controller
//! sees a live host. Sustained write failures past the contact timeout
//! end the node the same way the iris hard-disconnect does.

use crate::error::NodeError;
use crate::messages::{BusMessage, PanTiltCommand};
use crate::transport::RegisterTransport;
use crossbeam_channel::Receiver;
use std::time::{Duration, Instant};

/// Control frame register layout
const REG_CENTER: usize = 0;
const REG_PAN_PLUS: usize = 1;
const REG_PAN_MINUS: usize = 2;
const REG_TILT_PLUS: usize = 3;
const REG_TILT_MINUS: usize = 4;
const FRAME_LEN: usize = 5;

/// Written every cycle with no pending adjustment
pub const NEUTRAL_FRAME: [u16; FRAME_LEN] = [0; FRAME_LEN];

/// Split a signed adjustment across its positive/negative register pair
fn split_signed(value: i16) -> (u16, u16) {
    if value >= 0 {
        (value as u16, 0)
    } else {
        (0, value.unsigned_abs())
    }
}

/// Encode one adjustment message as a control frame
pub fn encode_frame(cmd: &PanTiltCommand) -> [u16; FRAME_LEN] {
    let mut frame = NEUTRAL_FRAME;
    frame[REG_CENTER] = cmd.should_center as u16;
    (frame[REG_PAN_PLUS], frame[REG_PAN_MINUS]) = split_signed(cmd.relative_pan_adjustment);
    (frame[REG_TILT_PLUS], frame[REG_TILT_MINUS]) = split_signed(cmd.relative_tilt_adjustment);
    frame
}

pub struct PanTiltNode {
    transport: Box<dyn RegisterTransport>,
    inbox: Receiver<BusMessage>,
    register_base: u8,
    contact_timeout: Duration,
    last_contact: Instant,
}

impl PanTiltNode {
    pub fn new(
        transport: Box<dyn RegisterTransport>,
        inbox: Receiver<BusMessage>,
        register_base: u8,
        contact_timeout: Duration,
    ) -> Self {
        PanTiltNode {
            transport,
            inbox,
            register_base,
            contact_timeout,
            last_contact: Instant::now(),
        }
    }

    /// Write one control frame
    ///
    /// Several adjustments queued since the last cycle collapse to the
    /// newest one; the mount only ever chases the latest intent.
    pub fn tick(&mut self, now: Instant) -> Result<(), NodeError> {
        let mut pending: Option<PanTiltCommand> = None;
        for message in self.inbox.try_iter() {
            if let BusMessage::PanTilt(cmd) = message {
                pending = Some(cmd);
            }
        }

        let frame = match pending {
            Some(cmd) => encode_frame(&cmd),
            None => NEUTRAL_FRAME,
        };

        match self.transport.write_registers(self.register_base, &frame) {
            Ok(()) => self.last_contact = now,
            Err(e) => log::debug!("Pan/tilt write failed: {}", e),
        }

        let silent_for = now.saturating_duration_since(self.last_contact);
        if silent_for > self.contact_timeout {
            return Err(NodeError::HardDisconnect {
                silent_for,
                limit: self.contact_timeout,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Bus;
    use crate::transport::MockRegisterLink;

    fn command(center: bool, pan: i16, tilt: i16) -> PanTiltCommand {
        PanTiltCommand {
            should_center: center,
            relative_pan_adjustment: pan,
            relative_tilt_adjustment: tilt,
        }
    }

    #[test]
    fn test_encode_splits_signed_adjustments() {
        assert_eq!(encode_frame(&command(false, 10, -3)), [0, 10, 0, 0, 3]);
        assert_eq!(encode_frame(&command(true, -7, 2)), [1, 0, 7, 2, 0]);
        assert_eq!(encode_frame(&command(false, 0, 0)), NEUTRAL_FRAME);
    }

    fn node_with(link: &MockRegisterLink, bus: &Bus) -> PanTiltNode {
        PanTiltNode::new(
            Box::new(link.clone()),
            bus.subscribe("pan_tilt"),
            0,
            Duration::from_secs(2),
        )
    }

    #[test]
    fn test_message_written_exactly_once_then_neutral() {
        let link = MockRegisterLink::new();
        let bus = Bus::new();
        let mut node = node_with(&link, &bus);

        bus.publish("pan_tilt", BusMessage::PanTilt(command(false, 5, -5)));
        let t0 = Instant::now();
        node.tick(t0).unwrap();
        node.tick(t0 + Duration::from_millis(50)).unwrap();

        assert_eq!(
            link.written(),
            vec![(0, vec![0, 5, 0, 0, 5]), (0, NEUTRAL_FRAME.to_vec())]
        );
    }

    #[test]
    fn test_queued_adjustments_collapse_to_newest() {
        let link = MockRegisterLink::new();
        let bus = Bus::new();
        let mut node = node_with(&link, &bus);

        bus.publish("pan_tilt", BusMessage::PanTilt(command(false, 1, 0)));
        bus.publish("pan_tilt", BusMessage::PanTilt(command(false, 2, 0)));
        node.tick(Instant::now()).unwrap();

        assert_eq!(link.written(), vec![(0, vec![0, 2, 0, 0, 0])]);
    }

    #[test]
    fn test_sustained_write_failure_is_fatal() {
        let link = MockRegisterLink::new();
        let bus = Bus::new();
        let mut node = node_with(&link, &bus);
        link.set_fail_writes(true);

        let t0 = Instant::now();
        assert!(node.tick(t0 + Duration::from_secs(1)).is_ok());
        let err = node.tick(t0 + Duration::from_secs(3)).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_successful_write_refreshes_contact() {
        let link = MockRegisterLink::new();
        let bus = Bus::new();
        let mut node = node_with(&link, &bus);

        let later = Instant::now() + Duration::from_secs(10);
        // Write succeeds, so the stale clock never matters
        assert!(node.tick(later).is_ok());
    }
}
