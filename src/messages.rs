//! Bus message payloads
//!
//! One value type per status category plus the inbound control messages.
//! Records are rebuilt each tick and compared by value, so every type here
//! derives `PartialEq`; a change in any single field republishes the whole
//! record.

/// Drive command derived from the transceiver sticks
#[derive(Debug, Clone, PartialEq)]
pub struct DriveCommand {
    /// False when both drive axes read the absent sentinel
    pub controller_present: bool,
    /// True when the operator flipped the ignore switch (or the
    /// controller is absent)
    pub ignore_drive_control: bool,
    /// Forward velocity, normalized [-1, 1]
    pub linear: f32,
    /// Turn rate, normalized [-1, 1]
    pub angular: f32,
}

/// Transceiver channel health, published by the iris node every tick
/// it changes
#[derive(Debug, Clone, PartialEq)]
pub struct IrisStatus {
    /// Last poll succeeded within the link timeout
    pub iris_connected: bool,
    /// 24 V rail voltage from the last good frame
    pub voltage_24v: f32,
}

impl Default for IrisStatus {
    fn default() -> Self {
        // The poller starts with a full link-timeout window of grace, so
        // the seed record reports connected.
        IrisStatus {
            iris_connected: true,
            voltage_24v: 0.0,
        }
    }
}

/// Battery voltage mirror, fed from the iris status stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatteryStatus {
    pub battery_voltage: f32,
}

/// Camera device presence, one flag per probe path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CameraStatus {
    pub camera_zed: bool,
    pub camera_undercarriage: bool,
    pub camera_chassis: bool,
    pub camera_main_navigation: bool,
}

/// Per-wheel motor connectivity, merged from the three bogie topics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WheelStatus {
    pub front_left: bool,
    pub front_right: bool,
    pub middle_left: bool,
    pub middle_right: bool,
    pub rear_left: bool,
    pub rear_right: bool,
}

/// Handheld controller link state, mirrored from the drive command stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerLinkStatus {
    pub controller_present: bool,
}

/// GPS receiver state assembled from NMEA sentences
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpsStatus {
    /// A sentence has arrived on the NMEA topic
    pub connected: bool,
    /// GGA fix quality was nonzero
    pub fix: bool,
    /// Satellites in use (GGA)
    pub num_satellites: u32,
    /// Horizontal dilution of precision (GGA)
    pub horizontal_dilution: f32,
    /// Ground speed in km/h (VTG)
    pub speed_kmph: f32,
    /// True-track heading in degrees (VTG); -1.0 when the receiver has
    /// no course estimate
    pub heading: f32,
}

/// Host compute metrics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputeStatus {
    /// Whole-machine CPU utilization, 0-100
    pub cpu_percent: f32,
    /// RAM utilization, 0-100
    pub ram_percent: f32,
    /// Used share of the EMMC root filesystem, 0-100; -1.0 when unknown
    pub disk_emmc_percent: f32,
    /// Used share of the NVMe filesystem, 0-100; -1.0 when unknown
    pub disk_nvme_percent: f32,
    /// GPU/SoC temperature in Celsius; -1.0 when no sensor matched
    pub gpu_temp_c: f32,
}

/// Connectivity placeholders for subsystems without live probes yet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MiscStatus {
    pub sample_probe_connected: bool,
    pub arm_end_effector_connected: bool,
    pub chassis_pan_tilt_connected: bool,
    pub sample_containment_connected: bool,
    pub tower_connected: bool,
}

/// Which drive bogie a status report covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bogie {
    /// Feeds the front-left and middle-left wheel flags
    Left,
    /// Feeds the front-right and middle-right wheel flags
    Right,
    /// Feeds the rear-left and rear-right wheel flags
    Rear,
}

/// Motor connectivity report from one bogie controller
#[derive(Debug, Clone, PartialEq)]
pub struct BogieStatus {
    pub bogie: Bogie,
    pub first_motor_connected: bool,
    pub second_motor_connected: bool,
}

/// Raw NMEA sentence text from the GPS receiver
#[derive(Debug, Clone, PartialEq)]
pub struct NmeaSentence {
    pub sentence: String,
}

/// Relative pan/tilt adjustment for the chassis camera mount
#[derive(Debug, Clone, PartialEq)]
pub struct PanTiltCommand {
    /// Recenter both axes; adjustments still apply afterwards
    pub should_center: bool,
    pub relative_pan_adjustment: i16,
    pub relative_tilt_adjustment: i16,
}

/// Everything that travels over the local bus
#[derive(Debug, Clone, PartialEq)]
pub enum BusMessage {
    Drive(DriveCommand),
    Iris(IrisStatus),
    Battery(BatteryStatus),
    Camera(CameraStatus),
    Wheel(WheelStatus),
    ControllerLink(ControllerLinkStatus),
    Gps(GpsStatus),
    Compute(ComputeStatus),
    Misc(MiscStatus),
    Bogie(BogieStatus),
    Nmea(NmeaSentence),
    PanTilt(PanTiltCommand),
    /// Empty trigger: republish every status record this tick
    RequestUpdate,
}
