//! Status node: aggregate → change-gate → publish
//!
//! Owns every status record and its publish baseline. Each tick drains
//! the subscription inboxes into the records, recomputes the locally
//! sourced ones, then walks the categories in a fixed order and lets the
//! gate decide what actually goes out. A manual-refresh trigger forces
//! one full republish and is cleared at the end of the tick that
//! consumed it.

pub mod aggregator;
pub mod gate;
pub mod gps;
pub mod system;

use crate::bus::Bus;
use crate::config::Config;
use crate::error::NodeError;
use crate::messages::BusMessage;
use aggregator::StatusSet;
use crossbeam_channel::Receiver;
use gate::{Category, ChangeGate};
use std::time::Instant;
use system::SystemMetricsProvider;

pub struct StatusNode {
    set: StatusSet,
    gate: ChangeGate,
    bus: Bus,
    config: Config,
    metrics: Box<dyn SystemMetricsProvider>,
    /// One receiver per subscribed topic; the bus gives no ordering
    /// across topics anyway, so they drain in turn
    inboxes: Vec<Receiver<BusMessage>>,
    manual_refresh: bool,
}

impl StatusNode {
    pub fn new(config: &Config, bus: Bus, mut metrics: Box<dyn SystemMetricsProvider>) -> Self {
        let topics = &config.topics;
        let inboxes = [
            &topics.iris_status,
            &topics.drive_command,
            &topics.bogie_left,
            &topics.bogie_right,
            &topics.bogie_rear,
            &topics.nmea,
            &topics.request_update,
        ]
        .iter()
        .map(|topic| bus.subscribe(topic))
        .collect();

        // Baselines seed from the records' initial computed values, so
        // the first tick publishes only what has changed since startup
        // or what a manual refresh forces
        let mut set = StatusSet::default();
        set.refresh_local(
            metrics.as_mut(),
            &config.paths,
            &config.status.gpu_sensor_label,
        );
        let mut gate = ChangeGate::new();
        gate.set_ceiling(Category::Battery, config.status.battery_max_hz);
        gate.set_ceiling(Category::Compute, config.status.compute_max_hz);
        gate.seed(Category::Battery, BusMessage::Battery(set.battery.clone()));
        gate.seed(Category::Camera, BusMessage::Camera(set.camera.clone()));
        gate.seed(Category::Wheel, BusMessage::Wheel(set.wheel.clone()));
        gate.seed(
            Category::ControllerLink,
            BusMessage::ControllerLink(set.controller_link.clone()),
        );
        gate.seed(Category::Gps, BusMessage::Gps(set.gps.clone()));
        gate.seed(Category::Compute, BusMessage::Compute(set.compute.clone()));
        gate.seed(Category::Misc, BusMessage::Misc(set.misc.clone()));

        StatusNode {
            set,
            gate,
            bus,
            config: config.clone(),
            metrics,
            inboxes,
            manual_refresh: false,
        }
    }

    /// Drain every inbox into the records, latching the refresh trigger
    fn drain_inboxes(&mut self) {
        for inbox in &self.inboxes {
            for message in inbox.try_iter() {
                if message == BusMessage::RequestUpdate {
                    self.manual_refresh = true;
                } else {
                    self.set.apply_message(&message);
                }
            }
        }
    }

    fn publish_gated(&mut self, category: Category, topic: &str, record: BusMessage, now: Instant) {
        if self
            .gate
            .should_publish(category, &record, self.manual_refresh, now)
        {
            self.bus.publish(topic, record.clone());
            self.gate.record_published(category, record, now);
        }
    }

    /// One aggregation pass; never fails, always Ok
    ///
    /// Kept fallible so the scheduler drives both node kinds through one
    /// signature.
    pub fn tick(&mut self, now: Instant) -> Result<(), NodeError> {
        self.drain_inboxes();
        self.set.refresh_local(
            self.metrics.as_mut(),
            &self.config.paths,
            &self.config.status.gpu_sensor_label,
        );

        let topics = self.config.topics.clone();
        self.publish_gated(
            Category::Battery,
            &topics.battery,
            BusMessage::Battery(self.set.battery.clone()),
            now,
        );
        self.publish_gated(
            Category::Camera,
            &topics.camera,
            BusMessage::Camera(self.set.camera.clone()),
            now,
        );
        self.publish_gated(
            Category::Wheel,
            &topics.wheel,
            BusMessage::Wheel(self.set.wheel.clone()),
            now,
        );
        self.publish_gated(
            Category::ControllerLink,
            &topics.frsky,
            BusMessage::ControllerLink(self.set.controller_link.clone()),
            now,
        );
        self.publish_gated(
            Category::Gps,
            &topics.gps,
            BusMessage::Gps(self.set.gps.clone()),
            now,
        );
        self.publish_gated(
            Category::Compute,
            &topics.jetson,
            BusMessage::Compute(self.set.compute.clone()),
            now,
        );
        self.publish_gated(
            Category::Misc,
            &topics.misc,
            BusMessage::Misc(self.set.misc.clone()),
            now,
        );

        self.manual_refresh = false;
        Ok(())
    }
}
