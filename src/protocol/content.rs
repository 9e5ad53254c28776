//! Content layouts
//!
//! Parsers for device-supplied content and builders for server replies.

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::error::{Result, TrackerError};

/// Status selector: battery, software version, upload interval
pub const STATUS_BASIC: u8 = 0x06;

/// Status selector: same as basic plus signal strength
pub const STATUS_WITH_SIGNAL: u8 = 0x07;

/// Reply content accepting a login
pub const LOGIN_ACCEPTED: u8 = 0x01;

// =============================================================================
// Login
// =============================================================================

/// Identity a device sends at login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginInfo {
    /// 15-digit IMEI
    pub imei: String,

    pub software_version: u8,
}

/// Parse login content
///
/// Bytes 0-7 carry the IMEI as 16 hex digits with a leading pad digit,
/// byte 8 the software version.
pub fn parse_login(content: &[u8]) -> Result<LoginInfo> {
    if content.len() < 9 {
        return Err(TrackerError::MalformedContent(format!(
            "Login: expected at least 9 bytes, got {}",
            content.len()
        )));
    }

    let digits = super::to_hex(&content[..8]);
    Ok(LoginInfo {
        imei: digits[1..].to_string(),
        software_version: content[8],
    })
}

/// Build login content for an IMEI (device side)
pub fn encode_login(imei: &str, software_version: u8) -> Result<Vec<u8>> {
    if imei.len() != 15 || !imei.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TrackerError::MalformedContent(format!(
            "IMEI must be 15 decimal digits, got {:?}",
            imei
        )));
    }

    let padded = format!("0{}", imei);
    let mut content = Vec::with_capacity(9);
    for pair in padded.as_bytes().chunks(2) {
        let hi = pair[0] - b'0';
        let lo = pair[1] - b'0';
        content.push(hi << 4 | lo);
    }
    content.push(software_version);
    Ok(content)
}

// =============================================================================
// Status
// =============================================================================

/// Device telemetry carried by a status frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    /// Battery level, percent
    pub battery: u8,

    pub software_version: u8,

    /// Status upload interval
    pub upload_interval: u8,

    /// Only present in the 0x07 sub-format
    pub signal_strength: Option<u8>,
}

/// Parse status content; the first byte selects the sub-format
pub fn parse_status(content: &[u8]) -> Result<StatusReport> {
    let selector = *content.first().ok_or_else(|| {
        TrackerError::MalformedContent("Status: empty content".to_string())
    })?;

    let needed = match selector {
        STATUS_BASIC => 4,
        STATUS_WITH_SIGNAL => 5,
        other => {
            return Err(TrackerError::MalformedContent(format!(
                "Status: unknown sub-format 0x{:02X}",
                other
            )))
        }
    };

    if content.len() < needed {
        return Err(TrackerError::PayloadTooShort {
            expected: needed,
            actual: content.len(),
        });
    }

    Ok(StatusReport {
        battery: content[1],
        software_version: content[2],
        upload_interval: content[3],
        signal_strength: (selector == STATUS_WITH_SIGNAL).then(|| content[4]),
    })
}

/// Build status content (device side)
pub fn encode_status(report: &StatusReport) -> Vec<u8> {
    let mut content = Vec::with_capacity(5);
    match report.signal_strength {
        Some(_) => content.push(STATUS_WITH_SIGNAL),
        None => content.push(STATUS_BASIC),
    }
    content.push(report.battery);
    content.push(report.software_version);
    content.push(report.upload_interval);
    if let Some(signal) = report.signal_strength {
        content.push(signal);
    }
    content
}

// =============================================================================
// Upload interval
// =============================================================================

/// The two interval bytes a device reports after an SMS reconfiguration
pub fn parse_upload_interval(content: &[u8]) -> Result<[u8; 2]> {
    match content {
        [hi, lo, ..] => Ok([*hi, *lo]),
        _ => Err(TrackerError::PayloadTooShort {
            expected: 2,
            actual: content.len(),
        }),
    }
}

// =============================================================================
// Datetime
// =============================================================================

/// Encode a UTC datetime as 7 bytes: YYYY (u16 BE) MM DD HH MM SS
pub fn encode_datetime(now: DateTime<Utc>) -> [u8; 7] {
    let year = (now.year() as u16).to_be_bytes();
    [
        year[0],
        year[1],
        now.month() as u8,
        now.day() as u8,
        now.hour() as u8,
        now.minute() as u8,
        now.second() as u8,
    ]
}

// =============================================================================
// Setup
// =============================================================================

/// Configuration pushed to a device that requests setup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupBlock {
    /// Position upload interval
    pub upload_interval: u16,

    /// Feature switch bits
    pub switches: u8,

    /// Three alarm clock slots
    pub alarms: [[u8; 3]; 3],

    /// Do-not-disturb switch
    pub dnd_switch: u8,

    /// Three do-not-disturb time slots
    pub dnd_times: [[u8; 3]; 3],

    /// GPS working-time switch
    pub gps_time_switch: u8,

    pub gps_time_start: u16,
    pub gps_time_stop: u16,

    /// Emergency phone numbers, sent as ASCII joined by ';'
    pub phone_numbers: Vec<String>,
}

impl Default for SetupBlock {
    fn default() -> Self {
        Self {
            upload_interval: 0x0300,
            switches: 0b0011_0001,
            alarms: [[0; 3]; 3],
            dnd_switch: 0,
            dnd_times: [[0; 3]; 3],
            gps_time_switch: 0,
            gps_time_start: 0,
            gps_time_stop: 0,
            phone_numbers: vec![String::new(); 3],
        }
    }
}

impl SetupBlock {
    /// Encode as reply content
    pub fn encode(&self) -> Vec<u8> {
        let mut content = Vec::with_capacity(32);
        content.extend_from_slice(&self.upload_interval.to_be_bytes());
        content.push(self.switches);
        for alarm in &self.alarms {
            content.extend_from_slice(alarm);
        }
        content.push(self.dnd_switch);
        for slot in &self.dnd_times {
            content.extend_from_slice(slot);
        }
        content.push(self.gps_time_switch);
        content.extend_from_slice(&self.gps_time_start.to_be_bytes());
        content.extend_from_slice(&self.gps_time_stop.to_be_bytes());
        content.extend_from_slice(self.phone_numbers.join(";").as_bytes());
        content
    }
}
