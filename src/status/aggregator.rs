//! Status record aggregation
//!
//! One owned record per category. Inbound bus messages merge into the
//! records as they are drained (last writer wins, arrival order);
//! locally sourced records recompute from the metrics provider each
//! tick. Nothing here publishes; the gate decides that afterwards.

use crate::config::PathsConfig;
use crate::messages::{
    BatteryStatus, Bogie, BogieStatus, BusMessage, CameraStatus, ComputeStatus,
    ControllerLinkStatus, GpsStatus, MiscStatus, WheelStatus,
};
use crate::status::gps;
use crate::status::system::SystemMetricsProvider;

/// The status node's owned records, one per outbound category
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusSet {
    pub battery: BatteryStatus,
    pub camera: CameraStatus,
    pub wheel: WheelStatus,
    pub controller_link: ControllerLinkStatus,
    pub gps: GpsStatus,
    pub compute: ComputeStatus,
    pub misc: MiscStatus,
}

impl StatusSet {
    /// Merge one inbound bus message into the records it feeds
    ///
    /// Messages that feed no record here (including the manual-refresh
    /// trigger, which the node handles itself) are ignored.
    pub fn apply_message(&mut self, message: &BusMessage) {
        match message {
            // The battery record mirrors the 24 V rail off the iris
            // health stream
            BusMessage::Iris(iris) => {
                self.battery.battery_voltage = iris.voltage_24v;
            }
            BusMessage::Drive(cmd) => {
                self.controller_link.controller_present = cmd.controller_present;
            }
            BusMessage::Bogie(bogie) => self.apply_bogie(bogie),
            BusMessage::Nmea(nmea) => {
                gps::apply_sentence(&nmea.sentence, &mut self.gps);
            }
            _ => {}
        }
    }

    /// Each bogie controller reports its two motors; together the three
    /// controllers cover all six wheels
    fn apply_bogie(&mut self, bogie: &BogieStatus) {
        match bogie.bogie {
            Bogie::Left => {
                self.wheel.front_left = bogie.first_motor_connected;
                self.wheel.middle_left = bogie.second_motor_connected;
            }
            Bogie::Right => {
                self.wheel.front_right = bogie.first_motor_connected;
                self.wheel.middle_right = bogie.second_motor_connected;
            }
            Bogie::Rear => {
                self.wheel.rear_left = bogie.first_motor_connected;
                self.wheel.rear_right = bogie.second_motor_connected;
            }
        }
    }

    /// Recompute the locally sourced records
    ///
    /// Idempotent: running this twice with an unchanged host yields
    /// identical records.
    pub fn refresh_local(
        &mut self,
        metrics: &mut dyn SystemMetricsProvider,
        paths: &PathsConfig,
        gpu_sensor_label: &str,
    ) {
        self.camera = CameraStatus {
            camera_zed: metrics.path_exists(&paths.camera_zed),
            camera_undercarriage: metrics.path_exists(&paths.camera_undercarriage),
            camera_chassis: metrics.path_exists(&paths.camera_chassis),
            camera_main_navigation: metrics.path_exists(&paths.camera_main_navigation),
        };
        self.compute = ComputeStatus {
            cpu_percent: metrics.cpu_percent(),
            ram_percent: metrics.ram_percent(),
            disk_emmc_percent: metrics.disk_used_percent(&paths.disk_emmc),
            disk_nvme_percent: metrics.disk_used_percent(&paths.disk_nvme),
            gpu_temp_c: metrics.gpu_temp_c(gpu_sensor_label),
        };
        // Misc subsystems have no live probes yet; the record stays at
        // its defaults until their drivers report in
    }
}
