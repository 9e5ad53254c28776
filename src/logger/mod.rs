//! Event Log Module
//!
//! Append-only, tab-separated records of device traffic.
//!
//! ## Record Kinds
//! ```text
//! packet:   time  ip  device  IN|OUT  hex
//! location: time  ip  device  GPS  fix-time  valid  sats  lat  lon  accuracy  speed  heading
//! ```
//!
//! The protocol engine only needs [`EventSink::record`]; where the lines end
//! up is the sink's business.

mod file;

pub use file::EventLogger;

use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Local};
use parking_lot::Mutex;

use crate::gps::GpsFix;

/// Timestamp layout used in every record
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Direction of a logged frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => f.write_str("IN"),
            Direction::Out => f.write_str("OUT"),
        }
    }
}

/// What happened
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// A raw frame crossed the wire
    Packet { direction: Direction, hex: String },

    /// A GPS fix was decoded
    Location(GpsFix),
}

/// One log record
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub timestamp: DateTime<Local>,
    pub remote_ip: IpAddr,
    /// IMEI, or `-` before login
    pub device_id: String,
    pub kind: EventKind,
}

impl LogEvent {
    pub fn packet(remote_ip: IpAddr, device_id: &str, direction: Direction, hex: String) -> Self {
        Self {
            timestamp: Local::now(),
            remote_ip,
            device_id: device_id.to_string(),
            kind: EventKind::Packet { direction, hex },
        }
    }

    pub fn location(remote_ip: IpAddr, device_id: &str, fix: GpsFix) -> Self {
        Self {
            timestamp: Local::now(),
            remote_ip,
            device_id: device_id.to_string(),
            kind: EventKind::Location(fix),
        }
    }

    /// Render as one TSV line, without the newline
    pub fn to_tsv(&self) -> String {
        let head = format!(
            "{}\t{}\t{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.remote_ip,
            self.device_id
        );

        match &self.kind {
            EventKind::Packet { direction, hex } => format!("{}\t{}\t{}", head, direction, hex),
            EventKind::Location(fix) => format!(
                "{}\tGPS\t{}\t{}\t{}\t{}\t{}\t{:?}\t{}\t{}",
                head,
                fix.timestamp_local.format(TIMESTAMP_FORMAT),
                fix.valid as u8,
                fix.satellites,
                fix.latitude,
                fix.longitude,
                fix.accuracy,
                fix.speed,
                fix.heading
            ),
        }
    }
}

/// Consumer of log records
pub trait EventSink: Send + Sync {
    fn record(&self, event: LogEvent);
}

/// Sink that drops everything
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _event: LogEvent) {}
}

/// Sink that keeps records in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<LogEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().clone()
    }

    /// Only the decoded fixes
    pub fn locations(&self) -> Vec<GpsFix> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match &event.kind {
                EventKind::Location(fix) => Some(fix.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: LogEvent) {
        self.events.lock().push(event);
    }
}
