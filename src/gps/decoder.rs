//! GPS payload decoder
//!
//! Turns the 18-byte position payload into a [`GpsFix`].

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Timelike, Utc};

use super::GpsFix;
use crate::error::{Result, TrackerError};

/// Minimum payload size
pub const PAYLOAD_LEN: usize = 18;

/// Raw coordinate units per degree: seconds of arc x 30000, 60 x 60 per degree
const UNITS_PER_DEGREE: f64 = 30000.0 * 60.0;

// Flag word bits, numbered from the most significant bit (bit 0 = 0x8000)
/// Bit 3: position is valid
const FLAG_VALID: u16 = 1 << 12;
/// Bit 4: set for the southern hemisphere
const FLAG_SOUTH: u16 = 1 << 11;
/// Bit 5: clear for the western hemisphere
const FLAG_EAST: u16 = 1 << 10;
/// Bits 6-15: heading
const HEADING_MASK: u16 = 0x03FF;

/// Two decimal digits per date/time byte
const MAX_FIELD: u8 = 99;

/// Decode a position payload, using the current time when the device sent none
pub fn decode_payload(content: &[u8]) -> Result<GpsFix> {
    decode_payload_at(content, Utc::now())
}

/// Decode a position payload with an explicit "now" for the no-time sentinel
pub fn decode_payload_at(content: &[u8], now: DateTime<Utc>) -> Result<GpsFix> {
    if content.len() < PAYLOAD_LEN {
        return Err(TrackerError::PayloadTooShort {
            expected: PAYLOAD_LEN,
            actual: content.len(),
        });
    }

    let (timestamp_utc, time_from_device) = match decode_timestamp(&content[0..6])? {
        Some(ts) => (ts, true),
        None => (now, false),
    };

    // High nibble is the GPS info length, unused
    let satellites = content[6] & 0x0F;

    let raw_lat = u32::from_be_bytes([content[7], content[8], content[9], content[10]]);
    let raw_lon = u32::from_be_bytes([content[11], content[12], content[13], content[14]]);
    let mut latitude = raw_lat as f64 / UNITS_PER_DEGREE;
    let mut longitude = raw_lon as f64 / UNITS_PER_DEGREE;

    let speed = content[15];

    let flags = u16::from_be_bytes([content[16], content[17]]);
    if flags & FLAG_SOUTH != 0 {
        latitude = -latitude;
    }
    if flags & FLAG_EAST == 0 {
        longitude = -longitude;
    }

    Ok(GpsFix {
        timestamp_utc,
        timestamp_local: timestamp_utc.with_timezone(&Local),
        time_from_device,
        valid: flags & FLAG_VALID != 0,
        satellites,
        latitude,
        longitude,
        speed,
        heading: flags & HEADING_MASK,
        accuracy: 0.0,
    })
}

/// Decode YY MM DD hh mm ss; each byte's value is the decimal field, 0-99.
///
/// All zeros means the device had no time.
fn decode_timestamp(raw: &[u8]) -> Result<Option<DateTime<Utc>>> {
    if raw.iter().all(|&b| b == 0) {
        return Ok(None);
    }

    if let Some(b) = raw.iter().find(|&&b| b > MAX_FIELD) {
        return Err(TrackerError::MalformedContent(format!(
            "GPS: date/time field {} out of range in {:?}",
            b, raw
        )));
    }

    let naive = NaiveDate::from_ymd_opt(2000 + raw[0] as i32, raw[1] as u32, raw[2] as u32)
        .and_then(|date| date.and_hms_opt(raw[3] as u32, raw[4] as u32, raw[5] as u32))
        .ok_or_else(|| {
            TrackerError::MalformedContent(format!(
                "GPS: invalid date/time {:?}",
                raw
            ))
        })?;

    Ok(Some(Utc.from_utc_datetime(&naive)))
}

/// Encode a fix back into its 18-byte payload (device side)
pub fn encode_payload(fix: &GpsFix) -> [u8; PAYLOAD_LEN] {
    let mut payload = [0u8; PAYLOAD_LEN];

    if fix.time_from_device {
        let ts = fix.timestamp_utc;
        payload[0] = (ts.year() - 2000).clamp(0, 255) as u8;
        payload[1] = ts.month() as u8;
        payload[2] = ts.day() as u8;
        payload[3] = ts.hour() as u8;
        payload[4] = ts.minute() as u8;
        payload[5] = ts.second() as u8;
    }

    // 12 bytes of GPS info follow the datetime
    payload[6] = 0xC0 | (fix.satellites & 0x0F);

    let raw_lat = (fix.latitude.abs() * UNITS_PER_DEGREE).round() as u32;
    let raw_lon = (fix.longitude.abs() * UNITS_PER_DEGREE).round() as u32;
    payload[7..11].copy_from_slice(&raw_lat.to_be_bytes());
    payload[11..15].copy_from_slice(&raw_lon.to_be_bytes());

    payload[15] = fix.speed;

    let mut flags = fix.heading & HEADING_MASK;
    if fix.valid {
        flags |= FLAG_VALID;
    }
    if fix.latitude < 0.0 {
        flags |= FLAG_SOUTH;
    }
    if fix.longitude >= 0.0 {
        flags |= FLAG_EAST;
    }
    payload[16..18].copy_from_slice(&flags.to_be_bytes());

    payload
}
