//! Transceiver bridge register map and frame decode
//!
//! The bridge mirrors the handheld transmitter's SBUS channels into a
//! block of 20 registers:
//!
//! | Registers | Contents                          |
//! |-----------|-----------------------------------|
//! | 0         | Left stick Y                      |
//! | 1         | Right stick Y                     |
//! | 2         | Right stick X                     |
//! | 3         | Left stick X                      |
//! | 4-7       | Pots S1, S2, LS, RS               |
//! | 8-15      | Switches SA-SH                    |
//! | 16-19     | 24 V, 5 V, USB 5 V, 3.3 V rails   |
//!
//! Stick and switch registers carry raw SBUS channel values. A raw value
//! of exactly 0 is the bridge's "no transmitter" sentinel; it sits well
//! below the calibrated minimum and must be checked on raw values, never
//! after normalization.

use crate::error::DecodeError;
use serde::{Deserialize, Serialize};

/// Registers in the bridge's block
pub const REGISTER_COUNT: usize = 20;

pub const REG_LEFT_STICK_Y: usize = 0;
pub const REG_RIGHT_STICK_Y: usize = 1;
pub const REG_RIGHT_STICK_X: usize = 2;
pub const REG_LEFT_STICK_X: usize = 3;
pub const REG_POT_BASE: usize = 4;
pub const REG_SWITCH_BASE: usize = 8;
pub const REG_RAIL_BASE: usize = 16;

/// Switch indices into [`ChannelFrame::switch_raw`]
pub const SWITCH_SA: usize = 0;
pub const SWITCH_SE: usize = 4;
pub const SWITCH_SF: usize = 5;

/// Rail indices into [`ChannelFrame::rails`]
pub const RAIL_24V: usize = 0;
pub const RAIL_5V: usize = 1;
pub const RAIL_USB_5V: usize = 2;
pub const RAIL_3V3: usize = 3;

/// Raw value the bridge reports when no transmitter is bound
pub const ABSENT_SENTINEL: u16 = 0;

/// SBUS channel calibration
///
/// Stock FrSky endpoints. Lives in the config file so a recalibrated
/// transmitter is a config edit, not a rebuild.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SbusCalibration {
    /// Lowest raw channel value at full deflection
    pub min: u16,
    /// Raw channel value at stick center
    pub mid: u16,
    /// Highest raw channel value at full deflection
    pub max: u16,
    /// Half-span used for normalization
    pub range: f32,
    /// Raw counts of slop around thresholds
    pub deadzone: u16,
}

impl Default for SbusCalibration {
    fn default() -> Self {
        SbusCalibration {
            min: 172,
            mid: 991,
            max: 1811,
            range: 820.0,
            deadzone: 5,
        }
    }
}

impl SbusCalibration {
    /// Normalize a raw channel value to roughly [-1, 1]
    ///
    /// `mid` maps to exactly 0.0, `mid + range` to 1.0, `mid - range`
    /// to -1.0.
    pub fn normalize(&self, raw: u16) -> f32 {
        (raw as f32 - self.mid as f32) / self.range
    }

    /// Threshold decode for a two/three-position switch channel
    pub fn switch_engaged(&self, raw: u16) -> bool {
        raw > self.mid
    }
}

/// One stick axis: the raw register value and its normalized reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    pub raw: u16,
    pub value: f32,
}

/// One decoded poll of the bridge's register block
///
/// Immutable snapshot; build a fresh one per poll.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelFrame {
    pub left_y: Axis,
    pub right_y: Axis,
    pub right_x: Axis,
    pub left_x: Axis,
    /// Pot channels, raw
    pub pots: [u16; 4],
    /// Switch channels SA-SH, raw
    pub switch_raw: [u16; 8],
    /// Switch channels SA-SH, threshold-decoded
    pub switches: [bool; 8],
    /// Supply rails in volts
    pub rails: [f32; 4],
}

impl ChannelFrame {
    /// Both drive axes at the absent sentinel: no transmitter bound
    pub fn controller_absent(&self) -> bool {
        self.left_y.raw == ABSENT_SENTINEL && self.right_y.raw == ABSENT_SENTINEL
    }
}

/// Decode a raw register block into a [`ChannelFrame`]
///
/// Fails closed on a short block: nothing downstream ever sees a frame
/// built from partial registers.
pub fn decode(
    raw: &[u16],
    cal: &SbusCalibration,
    volts_per_count: f32,
) -> Result<ChannelFrame, DecodeError> {
    if raw.len() < REGISTER_COUNT {
        return Err(DecodeError::ShortFrame {
            expected: REGISTER_COUNT,
            actual: raw.len(),
        });
    }

    let axis = |reg: usize| Axis {
        raw: raw[reg],
        value: cal.normalize(raw[reg]),
    };

    let mut pots = [0u16; 4];
    pots.copy_from_slice(&raw[REG_POT_BASE..REG_POT_BASE + 4]);

    let mut switch_raw = [0u16; 8];
    switch_raw.copy_from_slice(&raw[REG_SWITCH_BASE..REG_SWITCH_BASE + 8]);
    let mut switches = [false; 8];
    for (engaged, &value) in switches.iter_mut().zip(switch_raw.iter()) {
        *engaged = cal.switch_engaged(value);
    }

    let mut rails = [0.0f32; 4];
    for (volts, &count) in rails.iter_mut().zip(raw[REG_RAIL_BASE..REG_RAIL_BASE + 4].iter()) {
        *volts = count as f32 * volts_per_count;
    }

    Ok(ChannelFrame {
        left_y: axis(REG_LEFT_STICK_Y),
        right_y: axis(REG_RIGHT_STICK_Y),
        right_x: axis(REG_RIGHT_STICK_X),
        left_x: axis(REG_LEFT_STICK_X),
        pots,
        switch_raw,
        switches,
        rails,
    })
}

/// Register block of an idle, powered bridge: sticks and pots centered,
/// switches low, nominal rail counts. The mock transport serves this in
/// hardware-free runs.
pub fn neutral_frame() -> [u16; REGISTER_COUNT] {
    let cal = SbusCalibration::default();
    let mut frame = [cal.mid; REGISTER_COUNT];
    for reg in frame[REG_SWITCH_BASE..REG_SWITCH_BASE + 8].iter_mut() {
        *reg = cal.min;
    }
    frame[REG_RAIL_BASE + RAIL_24V] = 2400;
    frame[REG_RAIL_BASE + RAIL_5V] = 500;
    frame[REG_RAIL_BASE + RAIL_USB_5V] = 500;
    frame[REG_RAIL_BASE + RAIL_3V3] = 330;
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cal() -> SbusCalibration {
        SbusCalibration::default()
    }

    #[test]
    fn test_short_block_fails_closed() {
        for len in 0..REGISTER_COUNT {
            let raw = vec![500u16; len];
            assert_eq!(
                decode(&raw, &cal(), 0.01),
                Err(DecodeError::ShortFrame {
                    expected: REGISTER_COUNT,
                    actual: len,
                }),
                "length {} must not decode",
                len
            );
        }
    }

    #[test]
    fn test_normalization_endpoints() {
        let cal = cal();
        assert_eq!(cal.normalize(cal.mid), 0.0);
        assert_eq!(cal.normalize(cal.mid + cal.range as u16), 1.0);
        assert_eq!(cal.normalize(cal.mid - cal.range as u16), -1.0);
    }

    #[test]
    fn test_decode_neutral_frame() {
        let frame = decode(&neutral_frame(), &cal(), 0.01).unwrap();
        assert_eq!(frame.left_y.value, 0.0);
        assert_eq!(frame.right_y.value, 0.0);
        assert!(!frame.controller_absent());
        assert!(frame.switches.iter().all(|&s| !s));
        assert!((frame.rails[RAIL_24V] - 24.0).abs() < 1e-6);
        assert!((frame.rails[RAIL_3V3] - 3.3).abs() < 1e-6);
    }

    #[test]
    fn test_sentinel_detected_on_raw_values() {
        let mut raw = neutral_frame();
        raw[REG_LEFT_STICK_Y] = ABSENT_SENTINEL;
        raw[REG_RIGHT_STICK_Y] = ABSENT_SENTINEL;
        let frame = decode(&raw, &cal(), 0.01).unwrap();
        assert!(frame.controller_absent());
        // Normalization still ran; the sentinel decision never looks at it
        assert!(frame.left_y.value < -1.0);
    }

    #[test]
    fn test_one_sentinel_axis_is_not_absent() {
        let mut raw = neutral_frame();
        raw[REG_LEFT_STICK_Y] = ABSENT_SENTINEL;
        let frame = decode(&raw, &cal(), 0.01).unwrap();
        assert!(!frame.controller_absent());
    }

    #[test]
    fn test_switch_thresholds() {
        let cal = cal();
        let mut raw = neutral_frame();
        raw[REG_SWITCH_BASE + SWITCH_SE] = cal.mid + 1;
        raw[REG_SWITCH_BASE + SWITCH_SF] = cal.mid;
        let frame = decode(&raw, &cal, 0.01).unwrap();
        assert!(frame.switches[SWITCH_SE]);
        // Exactly mid is not engaged
        assert!(!frame.switches[SWITCH_SF]);
    }

    #[test]
    fn test_raw_voltage_passthrough_at_unit_scale() {
        let raw = neutral_frame();
        let frame = decode(&raw, &cal(), 1.0).unwrap();
        assert_eq!(frame.rails[RAIL_24V], 2400.0);
    }
}
