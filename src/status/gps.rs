//! NMEA sentence handling for the GPS status record
//!
//! The receiver node upstream forwards raw sentence text; only GGA
//! (fix quality, satellites in use, HDOP) and VTG (true track, ground
//! speed) carry fields this record reports. Anything malformed is
//! dropped with a debug line and the record keeps its previous values.

use crate::messages::GpsStatus;

/// Heading value published while the receiver has no course estimate
pub const HEADING_UNKNOWN: f32 = -1.0;

/// Fold one raw NMEA sentence into the GPS record
///
/// Returns true when the sentence updated the record. Any accepted
/// sentence marks the receiver connected, including ones of a type this
/// record does not report.
pub fn apply_sentence(sentence: &str, gps: &mut GpsStatus) -> bool {
    let Some(fields) = split_sentence(sentence) else {
        log::debug!("Dropping malformed NMEA sentence: {:?}", sentence);
        return false;
    };

    // Talker-agnostic: $GPGGA, $GNGGA, ... all match on the suffix
    if fields[0].ends_with("GGA") {
        apply_gga(&fields, gps)
    } else if fields[0].ends_with("VTG") {
        apply_vtg(&fields, gps)
    } else {
        gps.connected = true;
        false
    }
}

/// Validate framing and split into comma fields, checksum stripped
///
/// The type field must be plain ASCII alphanumerics of plausible length;
/// anything else is line noise, not a sentence. No checksum verification:
/// the serial layer upstream already drops corrupt lines, and the source
/// accepted unchecksummed sentences.
fn split_sentence(sentence: &str) -> Option<Vec<&str>> {
    let body = sentence.trim().strip_prefix('$')?;
    let body = body.split('*').next().unwrap_or(body);
    let fields: Vec<&str> = body.split(',').collect();
    if fields[0].len() < 5 || !fields[0].bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    Some(fields)
}

/// GGA: field 6 = fix quality, 7 = satellites in use, 8 = HDOP
fn apply_gga(fields: &[&str], gps: &mut GpsStatus) -> bool {
    if fields.len() < 9 {
        log::debug!("Dropping short GGA sentence ({} fields)", fields.len());
        return false;
    }
    gps.connected = true;
    if let Ok(quality) = fields[6].parse::<u32>() {
        gps.fix = quality > 0;
    }
    if let Ok(satellites) = fields[7].parse::<u32>() {
        gps.num_satellites = satellites;
    }
    if let Ok(hdop) = fields[8].parse::<f32>() {
        gps.horizontal_dilution = hdop;
    }
    true
}

/// VTG: field 1 = true track degrees, 7 = ground speed km/h
fn apply_vtg(fields: &[&str], gps: &mut GpsStatus) -> bool {
    if fields.len() < 8 {
        log::debug!("Dropping short VTG sentence ({} fields)", fields.len());
        return false;
    }
    gps.connected = true;
    // An empty track field is normal while stationary: no course
    // estimate. A track field that is present but unparseable keeps the
    // previous heading, like every other field.
    if fields[1].is_empty() {
        gps.heading = HEADING_UNKNOWN;
    } else if let Ok(track) = fields[1].parse::<f32>() {
        gps.heading = track;
    }
    if let Ok(speed) = fields[7].parse::<f32>() {
        gps.speed_kmph = speed;
    }
    true
}
