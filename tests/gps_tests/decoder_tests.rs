//! GPS Decoder Tests
//!
//! These tests verify:
//! - Datetime decoding and the all-zero sentinel
//! - Coordinate scaling
//! - Flag word: validity, hemispheres, heading
//! - Short payload rejection

use chrono::{Local, TimeZone, Utc};
use trackwire::gps::{decode_payload, decode_payload_at, encode_payload, PAYLOAD_LEN};
use trackwire::TrackerError;

// =============================================================================
// Helper Functions
// =============================================================================

const UNITS_PER_DEGREE: f64 = 1_800_000.0;

fn payload(datetime: [u8; 6], lat: f64, lon: f64, flags: u16) -> Vec<u8> {
    let mut content = Vec::with_capacity(PAYLOAD_LEN);
    content.extend_from_slice(&datetime);
    content.push(0xC9); // length nibble 12, 9 satellites
    content.extend_from_slice(&((lat * UNITS_PER_DEGREE).round() as u32).to_be_bytes());
    content.extend_from_slice(&((lon * UNITS_PER_DEGREE).round() as u32).to_be_bytes());
    content.push(42); // speed
    content.extend_from_slice(&flags.to_be_bytes());
    content
}

const OCT_17_2026: [u8; 6] = [26, 10, 17, 8, 5, 59];

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-6, "{} != {}", a, b);
}

// =============================================================================
// Field Decoding
// =============================================================================

#[test]
fn test_decode_fields() {
    // Valid, northern, eastern, heading 270
    let flags = 0x1000 | 0x0400 | 270;
    let fix = decode_payload(&payload(OCT_17_2026, 22.5, 114.25, flags)).unwrap();

    assert!(fix.valid);
    assert_eq!(fix.satellites, 9);
    assert_close(fix.latitude, 22.5);
    assert_close(fix.longitude, 114.25);
    assert_eq!(fix.speed, 42);
    assert_eq!(fix.heading, 270);
    assert_eq!(fix.accuracy, 0.0);
}

#[test]
fn test_decode_device_timestamp_is_utc() {
    let fix = decode_payload(&payload(OCT_17_2026, 1.0, 1.0, 0x0400)).unwrap();

    let expected = Utc.with_ymd_and_hms(2026, 10, 17, 8, 5, 59).unwrap();
    assert!(fix.time_from_device);
    assert_eq!(fix.timestamp_utc, expected);
    assert_eq!(fix.timestamp_local, expected.with_timezone(&Local));
}

#[test]
fn test_zero_timestamp_uses_now() {
    let now = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
    let fix = decode_payload_at(&payload([0; 6], 1.0, 1.0, 0x0400), now).unwrap();

    assert!(!fix.time_from_device);
    assert_eq!(fix.timestamp_utc, now);
}

#[test]
fn test_impossible_date_is_malformed() {
    let err = decode_payload(&payload([26, 2, 30, 0, 0, 0], 1.0, 1.0, 0)).unwrap_err();
    assert!(matches!(err, TrackerError::MalformedContent(_)));
}

#[test]
fn test_year_beyond_two_digits_is_malformed() {
    let err = decode_payload(&payload([0x64, 1, 1, 0, 0, 0], 1.0, 1.0, 0)).unwrap_err();
    assert!(matches!(err, TrackerError::MalformedContent(_)));

    let fix = decode_payload(&payload([99, 1, 1, 0, 0, 0], 1.0, 1.0, 0)).unwrap();
    assert_eq!(fix.timestamp_utc, Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap());
}

#[test]
fn test_extra_trailing_bytes_are_ignored() {
    let mut content = payload(OCT_17_2026, 10.0, 20.0, 0x1400);
    content.extend_from_slice(&[0x01, 0xCC, 0x00, 0x28, 0x7D]);
    let fix = decode_payload(&content).unwrap();
    assert_close(fix.latitude, 10.0);
    assert_close(fix.longitude, 20.0);
}

// =============================================================================
// Flag Word
// =============================================================================

#[test]
fn test_south_and_west_negate_both() {
    let north_east = decode_payload(&payload(OCT_17_2026, 33.75, 151.5, 0x0400)).unwrap();
    // bit 4 set (south), bit 5 clear (west)
    let south_west = decode_payload(&payload(OCT_17_2026, 33.75, 151.5, 0x0800)).unwrap();

    assert!(north_east.latitude > 0.0 && north_east.longitude > 0.0);
    assert_close(south_west.latitude, -north_east.latitude);
    assert_close(south_west.longitude, -north_east.longitude);
}

#[test]
fn test_flags_0001() {
    // 0000000000000001: bit 3 clear, bit 4 clear (north), bit 5 clear (west)
    let fix = decode_payload(&payload(OCT_17_2026, 48.0, 2.0, 0x0001)).unwrap();

    assert!(!fix.valid);
    assert!(fix.latitude > 0.0);
    assert!(fix.longitude < 0.0);
    assert_eq!(fix.heading, 1);
}

#[test]
fn test_heading_uses_ten_bits() {
    let fix = decode_payload(&payload(OCT_17_2026, 1.0, 1.0, 0xFFFF)).unwrap();
    assert_eq!(fix.heading, 1023);
    assert!(fix.valid);
}

// =============================================================================
// Errors / encoding
// =============================================================================

#[test]
fn test_payload_too_short() {
    let content = payload(OCT_17_2026, 1.0, 1.0, 0);
    let err = decode_payload(&content[..17]).unwrap_err();
    assert!(matches!(
        err,
        TrackerError::PayloadTooShort { expected: 18, actual: 17 }
    ));
}

#[test]
fn test_encode_payload_matches_decoder() {
    let original = decode_payload(&payload(OCT_17_2026, 12.5, 45.0, 0x1800 | 90)).unwrap();
    let encoded = encode_payload(&original);
    let decoded = decode_payload(&encoded).unwrap();

    assert_eq!(decoded.timestamp_utc, original.timestamp_utc);
    assert_eq!(decoded.valid, original.valid);
    assert_close(decoded.latitude, -12.5);
    assert_close(decoded.longitude, -45.0);
    assert_eq!(decoded.heading, 90);
}
