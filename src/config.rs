//! Configuration for the VahanaIO daemon
//!
//! Loads configuration from a TOML file. Every field carries a default
//! matching the rover's stock wiring, so a missing file or a partial one
//! still yields a runnable daemon.

use crate::error::Result;
use crate::iris::registers::SbusCalibration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level daemon configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub transport: TransportConfig,
    pub iris: IrisConfig,
    pub calibration: SbusCalibration,
    pub status: StatusConfig,
    pub pantilt: PanTiltConfig,
    pub paths: PathsConfig,
    pub topics: TopicsConfig,
}

/// Register-link settings for one serial device
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// "serial" for real hardware, "mock" for a hardware-free run
    pub kind: String,
    /// Serial device path
    pub device: String,
    /// Baud rate
    pub baud: u32,
    /// Per-call reply timeout in milliseconds
    pub timeout_ms: u64,
    /// Half-duplex bus turnaround wait in milliseconds
    pub turnaround_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            kind: "serial".to_string(),
            device: "/dev/rover/ttyIRIS".to_string(),
            baud: 115_200,
            timeout_ms: 150,
            turnaround_ms: 10,
        }
    }
}

impl TransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn turnaround(&self) -> Duration {
        Duration::from_millis(self.turnaround_ms)
    }
}

/// Iris node settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IrisConfig {
    /// Poll rate in Hz
    pub rate_hz: f64,
    /// First register of the bridge's block
    pub register_base: u8,
    /// Reported connectivity drops after this long without a good poll
    pub link_timeout_ms: u64,
    /// Process exit (for supervisor respawn) after this long without a
    /// good poll
    pub hard_disconnect_timeout_ms: u64,
    /// Scale factor from raw voltage-register counts to volts.
    /// 1.0 passes raw counts through unscaled.
    pub volts_per_count: f32,
}

impl Default for IrisConfig {
    fn default() -> Self {
        IrisConfig {
            rate_hz: 10.0,
            register_base: 0,
            link_timeout_ms: 1_000,
            hard_disconnect_timeout_ms: 5_000,
            volts_per_count: 0.01,
        }
    }
}

impl IrisConfig {
    pub fn link_timeout(&self) -> Duration {
        Duration::from_millis(self.link_timeout_ms)
    }

    pub fn hard_disconnect_timeout(&self) -> Duration {
        Duration::from_millis(self.hard_disconnect_timeout_ms)
    }
}

/// Status node settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Aggregation tick rate in Hz
    pub rate_hz: f64,
    /// Battery record publish ceiling in Hz (0 disables the ceiling)
    pub battery_max_hz: f64,
    /// Compute-metrics record publish ceiling in Hz (0 disables)
    pub compute_max_hz: f64,
    /// Substring matched against sensor labels to find the GPU
    /// temperature component
    pub gpu_sensor_label: String,
}

impl Default for StatusConfig {
    fn default() -> Self {
        StatusConfig {
            rate_hz: 10.0,
            battery_max_hz: 0.2,
            compute_max_hz: 0.2,
            gpu_sensor_label: "gpu".to_string(),
        }
    }
}

/// Pan/tilt node settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PanTiltConfig {
    /// Spawn the pan/tilt node at startup
    pub enabled: bool,
    /// The mount controller's own serial link
    pub transport: TransportConfig,
    /// Write rate in Hz
    pub rate_hz: f64,
    /// First register of the control frame
    pub register_base: u8,
    /// Process exit after this long without a successful write
    pub contact_timeout_ms: u64,
}

impl Default for PanTiltConfig {
    fn default() -> Self {
        PanTiltConfig {
            enabled: false,
            transport: TransportConfig {
                device: "/dev/rover/ttyChassisPanTilt".to_string(),
                timeout_ms: 10,
                ..TransportConfig::default()
            },
            rate_hz: 20.0,
            register_base: 0,
            contact_timeout_ms: 2_000,
        }
    }
}

impl PanTiltConfig {
    pub fn contact_timeout(&self) -> Duration {
        Duration::from_millis(self.contact_timeout_ms)
    }
}

/// Filesystem paths used for presence probes and disk metrics
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    pub camera_zed: String,
    pub camera_undercarriage: String,
    pub camera_chassis: String,
    pub camera_main_navigation: String,
    /// Mount point of the EMMC root filesystem
    pub disk_emmc: String,
    /// Mount point of the NVMe filesystem
    pub disk_nvme: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            camera_zed: "/dev/rover/camera_zed".to_string(),
            camera_undercarriage: "/dev/rover/camera_undercarriage".to_string(),
            camera_chassis: "/dev/rover/camera_chassis".to_string(),
            camera_main_navigation: "/dev/rover/camera_main_navigation".to_string(),
            disk_emmc: "/".to_string(),
            disk_nvme: "/dev/shm".to_string(),
        }
    }
}

/// Bus topic names, inbound and outbound
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TopicsConfig {
    pub drive_command: String,
    pub iris_status: String,
    pub battery: String,
    pub camera: String,
    pub wheel: String,
    pub frsky: String,
    pub gps: String,
    pub jetson: String,
    pub misc: String,
    pub request_update: String,
    pub nmea: String,
    pub bogie_left: String,
    pub bogie_right: String,
    pub bogie_rear: String,
    pub pan_tilt: String,
}

impl Default for TopicsConfig {
    fn default() -> Self {
        TopicsConfig {
            drive_command: "command_control/iris_drive".to_string(),
            iris_status: "iris_status".to_string(),
            battery: "battery_status".to_string(),
            camera: "camera_status".to_string(),
            wheel: "wheel_status".to_string(),
            frsky: "frsky_status".to_string(),
            gps: "gps_status".to_string(),
            jetson: "jetson_status".to_string(),
            misc: "misc_status".to_string(),
            request_update: "update_requested".to_string(),
            nmea: "gps/sentence".to_string(),
            bogie_left: "drive_status/left".to_string(),
            bogie_right: "drive_status/right".to_string(),
            bogie_rear: "drive_status/rear".to_string(),
            pan_tilt: "chassis/pan_tilt/control".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// A missing file is not an error: the defaults describe the stock
    /// rover wiring. A file that exists but fails to parse is an error,
    /// so a typo cannot silently revert the daemon to defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        if !path.as_ref().exists() {
            log::warn!(
                "Config file {} not found, using defaults",
                path.as_ref().display()
            );
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }
}
