//! Drive command derivation
//!
//! Pure mapping from a decoded [`ChannelFrame`] to the command the
//! chassis consumes. Mode selection rides on the raw SE switch value;
//! the two stick Y axes mix differentially into linear/angular velocity.

use super::registers::{ChannelFrame, SbusCalibration, SWITCH_SE, SWITCH_SF};
use crate::messages::DriveCommand;

/// What one frame maps to
#[derive(Debug, Clone, PartialEq)]
pub enum MappedCommand {
    Drive(DriveCommand),
    /// Arm mode selected: nothing is published downstream yet. The arm
    /// control stack will claim this branch when it exists.
    ArmNoOp,
}

/// Map a decoded frame to a command
///
/// Drive mode when the raw SE value sits below the calibrated midpoint,
/// arm mode when it sits above midpoint + deadzone. The band in between
/// selects neither and yields `None`. That gap ships in the deployed
/// firmware pairing and is kept as-is; see DESIGN.md before "fixing" it.
pub fn map(frame: &ChannelFrame, cal: &SbusCalibration) -> Option<MappedCommand> {
    let se_raw = frame.switch_raw[SWITCH_SE];

    if se_raw < cal.mid {
        Some(MappedCommand::Drive(drive_command(frame, cal)))
    } else if se_raw > cal.mid + cal.deadzone {
        Some(MappedCommand::ArmNoOp)
    } else {
        None
    }
}

/// Differential mix of the two stick Y axes
///
/// Failsafe first: both drive axes at the raw absent sentinel means no
/// transmitter, so the command pins velocity to zero and tells the
/// chassis to ignore drive control entirely.
fn drive_command(frame: &ChannelFrame, cal: &SbusCalibration) -> DriveCommand {
    if frame.controller_absent() {
        return DriveCommand {
            controller_present: false,
            ignore_drive_control: true,
            linear: 0.0,
            angular: 0.0,
        };
    }

    let left = frame.left_y.value;
    let right = frame.right_y.value;
    DriveCommand {
        controller_present: true,
        ignore_drive_control: cal.switch_engaged(frame.switch_raw[SWITCH_SF]),
        linear: (left + right) / 2.0,
        angular: (right - left) / 2.0,
    }
}
