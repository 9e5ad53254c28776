//! Event Log Tests
//!
//! Tests verify:
//! - TSV layout of packet and location records
//! - File logger routing records to the right file
//! - Appending across reopen

use std::fs;
use std::net::IpAddr;
use std::sync::Arc;
use std::thread;

use chrono::{Local, TimeZone, Utc};
use tempfile::TempDir;
use trackwire::logger::{Direction, EventLogger, EventSink, LogEvent};
use trackwire::GpsFix;

fn ip() -> IpAddr {
    "203.0.113.9".parse().unwrap()
}

fn sample_fix() -> GpsFix {
    let utc = Utc.with_ymd_and_hms(2026, 10, 17, 8, 5, 59).unwrap();
    GpsFix {
        timestamp_utc: utc,
        timestamp_local: utc.with_timezone(&Local),
        time_from_device: true,
        valid: true,
        satellites: 9,
        latitude: 22.5,
        longitude: -114.25,
        speed: 42,
        heading: 270,
        accuracy: 0.0,
    }
}

fn read_lines(path: &std::path::Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Record Layout
// =============================================================================

#[test]
fn test_packet_record_fields() {
    let event = LogEvent::packet(ip(), "639355201084827", Direction::In, "78780108".into());
    let line = event.to_tsv();
    let fields: Vec<&str> = line.split('\t').collect();

    assert_eq!(fields.len(), 5);
    assert_eq!(fields[1], "203.0.113.9");
    assert_eq!(fields[2], "639355201084827");
    assert_eq!(fields[3], "IN");
    assert_eq!(fields[4], "78780108");
    // %Y/%m/%d %H:%M:%S
    assert_eq!(fields[0].len(), 19);
    assert_eq!(&fields[0][4..5], "/");
}

#[test]
fn test_location_record_field_order() {
    let fix = sample_fix();
    let event = LogEvent::location(ip(), "-", fix.clone());
    let line = event.to_tsv();
    let fields: Vec<&str> = line.split('\t').collect();

    let local = fix.timestamp_local.format("%Y/%m/%d %H:%M:%S").to_string();
    assert_eq!(
        &fields[1..],
        &[
            "203.0.113.9",
            "-",
            "GPS",
            local.as_str(),
            "1",
            "9",
            "22.5",
            "-114.25",
            "0.0",
            "42",
            "270",
        ]
    );
}

#[test]
fn test_direction_display() {
    assert_eq!(Direction::In.to_string(), "IN");
    assert_eq!(Direction::Out.to_string(), "OUT");
}

// =============================================================================
// File Logger
// =============================================================================

#[test]
fn test_open_creates_files() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("logs");
    let logger = EventLogger::open(&dir).unwrap();

    assert_eq!(logger.dir(), dir.as_path());
    assert!(dir.join(EventLogger::SERVER_LOG).exists());
    assert!(dir.join(EventLogger::LOCATION_LOG).exists());
}

#[test]
fn test_records_routed_by_kind() {
    let temp = TempDir::new().unwrap();
    let logger = EventLogger::open(temp.path()).unwrap();

    logger.record(LogEvent::packet(ip(), "-", Direction::In, "aa".into()));
    logger.record(LogEvent::location(ip(), "-", sample_fix()));
    logger.record(LogEvent::packet(ip(), "-", Direction::Out, "bb".into()));
    logger.close();

    let packets = read_lines(&temp.path().join(EventLogger::SERVER_LOG));
    let locations = read_lines(&temp.path().join(EventLogger::LOCATION_LOG));

    assert_eq!(packets.len(), 2);
    assert!(packets[0].ends_with("\tIN\taa"));
    assert!(packets[1].ends_with("\tOUT\tbb"));
    assert_eq!(locations.len(), 1);
    assert!(locations[0].contains("\tGPS\t"));
}

#[test]
fn test_reopen_appends() {
    let temp = TempDir::new().unwrap();

    for n in 0..2 {
        let logger = EventLogger::open(temp.path()).unwrap();
        logger.record(LogEvent::packet(ip(), "-", Direction::In, format!("{:02x}", n)));
        // Drop flushes
    }

    let packets = read_lines(&temp.path().join(EventLogger::SERVER_LOG));
    assert_eq!(packets.len(), 2);
}

#[test]
fn test_concurrent_writers() {
    let temp = TempDir::new().unwrap();
    let logger = Arc::new(EventLogger::open(temp.path()).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..25 {
                    logger.record(LogEvent::packet(
                        ip(),
                        "-",
                        Direction::In,
                        format!("{:02x}{:02x}", t, i),
                    ));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    drop(logger);
    let packets = read_lines(&temp.path().join(EventLogger::SERVER_LOG));
    assert_eq!(packets.len(), 100);
}

#[test]
fn test_queue_is_bounded() {
    let temp = TempDir::new().unwrap();
    let logger = EventLogger::open(temp.path()).unwrap();
    assert_eq!(logger.queue_capacity(), Some(EventLogger::QUEUE_CAPACITY));

    assert!(EventLogger::open_with_capacity(temp.path(), 0).is_err());
}

#[test]
fn test_full_queue_blocks_instead_of_dropping() {
    let temp = TempDir::new().unwrap();
    let logger = EventLogger::open_with_capacity(temp.path(), 1).unwrap();
    assert_eq!(logger.queue_capacity(), Some(1));

    for i in 0..200 {
        logger.record(LogEvent::packet(ip(), "-", Direction::Out, format!("{:04x}", i)));
    }
    logger.close();

    let packets = read_lines(&temp.path().join(EventLogger::SERVER_LOG));
    assert_eq!(packets.len(), 200);
    assert!(packets[199].ends_with("\tOUT\t00c7"));
}
