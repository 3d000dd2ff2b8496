//! Iris node: transceiver bridge poll → decode → map → publish
//!
//! One tick polls the bridge's register block, decodes it, derives the
//! drive command, and refreshes the channel-health record. The drive
//! command publishes whenever drive mode produces one; the health record
//! goes through the change gate so the bus only carries actual changes.

pub mod command;
pub mod poller;
pub mod registers;

use crate::bus::Bus;
use crate::config::Config;
use crate::error::NodeError;
use crate::messages::{BusMessage, IrisStatus};
use crate::status::gate::{Category, ChangeGate};
use crate::transport::RegisterTransport;
use command::MappedCommand;
use poller::ChannelPoller;
use registers::{SbusCalibration, RAIL_24V, REGISTER_COUNT};
use std::time::Instant;

pub struct IrisNode {
    poller: ChannelPoller,
    calibration: SbusCalibration,
    volts_per_count: f32,
    bus: Bus,
    drive_topic: String,
    status_topic: String,
    gate: ChangeGate,
    health: IrisStatus,
}

impl IrisNode {
    pub fn new(transport: Box<dyn RegisterTransport>, config: &Config, bus: Bus) -> Self {
        let poller = ChannelPoller::new(
            transport,
            config.iris.register_base,
            REGISTER_COUNT,
            config.iris.link_timeout(),
            config.iris.hard_disconnect_timeout(),
        );
        let health = IrisStatus::default();
        let mut gate = ChangeGate::new();
        gate.seed(Category::IrisHealth, BusMessage::Iris(health.clone()));
        IrisNode {
            poller,
            calibration: config.calibration.clone(),
            volts_per_count: config.iris.volts_per_count,
            bus,
            drive_topic: config.topics.drive_command.clone(),
            status_topic: config.topics.iris_status.clone(),
            gate,
            health,
        }
    }

    /// One pipeline pass: poll → decode → map → publish → health
    ///
    /// A failed poll or a short frame skips the decode/map stages for
    /// this tick; the health record still refreshes so the disconnect
    /// becomes visible downstream. Only the hard-disconnect verdict
    /// leaves as an error.
    pub fn tick(&mut self, now: Instant) -> Result<(), NodeError> {
        if let Some(raw) = self.poller.poll(now) {
            match registers::decode(&raw, &self.calibration, self.volts_per_count) {
                Ok(frame) => {
                    self.health.voltage_24v = frame.rails[RAIL_24V];
                    match command::map(&frame, &self.calibration) {
                        Some(MappedCommand::Drive(cmd)) => {
                            self.bus.publish(&self.drive_topic, BusMessage::Drive(cmd));
                        }
                        Some(MappedCommand::ArmNoOp) => {}
                        // SE sits in the unselected band between drive
                        // and arm; nothing to emit
                        None => {}
                    }
                }
                Err(e) => {
                    log::debug!("Frame decode failed: {}", e);
                }
            }
        }

        self.health.iris_connected = self.poller.is_connected(now);
        let record = BusMessage::Iris(self.health.clone());
        if self.gate.should_publish(Category::IrisHealth, &record, false, now) {
            self.bus.publish(&self.status_topic, record.clone());
            self.gate.record_published(Category::IrisHealth, record, now);
        }

        self.poller.check_hard_disconnect(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockRegisterLink;
    use std::time::Duration;

    fn node_with(link: &MockRegisterLink) -> (IrisNode, Bus) {
        let bus = Bus::new();
        let config = Config::default();
        let node = IrisNode::new(Box::new(link.clone()), &config, bus.clone());
        (node, bus)
    }

    #[test]
    fn test_tick_publishes_drive_command() {
        let link = MockRegisterLink::new();
        link.inject_frame(registers::neutral_frame().to_vec());
        let (mut node, bus) = node_with(&link);
        let drive_rx = bus.subscribe(&Config::default().topics.drive_command);

        node.tick(Instant::now()).unwrap();

        let BusMessage::Drive(cmd) = drive_rx.try_recv().unwrap() else {
            panic!("expected drive command");
        };
        assert!(cmd.controller_present);
        assert_eq!(cmd.linear, 0.0);
    }

    #[test]
    fn test_health_publishes_only_on_change() {
        let link = MockRegisterLink::new();
        link.set_steady_frame(registers::neutral_frame().to_vec());
        let (mut node, bus) = node_with(&link);
        let status_rx = bus.subscribe(&Config::default().topics.iris_status);

        let t0 = Instant::now();
        node.tick(t0).unwrap();
        // Voltage moved from the 0.0 seed to 24.0: one publish
        let BusMessage::Iris(health) = status_rx.try_recv().unwrap() else {
            panic!("expected iris status");
        };
        assert!(health.iris_connected);
        assert!((health.voltage_24v - 24.0).abs() < 1e-6);

        // Same frame again: nothing new on the wire
        node.tick(t0 + Duration::from_millis(100)).unwrap();
        assert!(status_rx.try_recv().is_err());
    }

    #[test]
    fn test_failed_poll_skips_command_but_reports_health() {
        let link = MockRegisterLink::new();
        link.set_fail_reads(true);
        let (mut node, bus) = node_with(&link);
        let drive_rx = bus.subscribe(&Config::default().topics.drive_command);
        let status_rx = bus.subscribe(&Config::default().topics.iris_status);

        // Past the link timeout but inside the hard window
        let now = Instant::now() + Duration::from_secs(2);
        node.tick(now).unwrap();

        assert!(drive_rx.try_recv().is_err());
        let BusMessage::Iris(health) = status_rx.try_recv().unwrap() else {
            panic!("expected iris status");
        };
        assert!(!health.iris_connected);
    }

    #[test]
    fn test_hard_disconnect_is_fatal() {
        let link = MockRegisterLink::new();
        link.set_fail_reads(true);
        let (mut node, _bus) = node_with(&link);

        let late = Instant::now() + Duration::from_secs(6);
        let err = node.tick(late).unwrap_err();
        assert!(err.is_fatal());
    }
}
