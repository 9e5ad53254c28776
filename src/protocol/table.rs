//! Protocol table
//!
//! Static mapping from protocol code to protocol kind, and from kind to the
//! handler that builds the reply.

use crate::error::{Result, TrackerError};

/// Protocol codes known to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ProtocolKind {
    Login = 0x01,
    Supervision = 0x05,
    Heartbeat = 0x08,
    GpsPositioning = 0x10,
    GpsOfflinePositioning = 0x11,
    Status = 0x13,
    Hibernation = 0x14,
    Reset = 0x15,
    WhitelistTotal = 0x16,
    WifiOfflinePositioning = 0x17,
    Time = 0x30,
    StopAlarm = 0x56,
    Setup = 0x57,
    SynchronousWhitelist = 0x58,
    RestorePassword = 0x67,
    WifiPositioning = 0x69,
    ManualPositioning = 0x80,
    BatteryCharge = 0x81,
    ChargerConnected = 0x82,
    ChargerDisconnected = 0x83,
    VibrationReceived = 0x94,
    PositionUploadInterval = 0x98,
}

/// How the dispatcher answers a protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// Capture IMEI and software version, accept the device
    Login,
    /// Decode a GPS fix, answer with the current datetime
    Position,
    /// Log telemetry, generic ack
    Status,
    /// No reply, close the connection
    Hibernation,
    /// Answer with the configured setup block
    Setup,
    /// Answer with the current datetime
    Time,
    /// Echo the two interval bytes
    UploadInterval,
    /// Same code, empty content
    Generic,
}

impl ProtocolKind {
    /// Look up a protocol code
    pub fn from_code(code: u8) -> Result<Self> {
        let kind = match code {
            0x01 => ProtocolKind::Login,
            0x05 => ProtocolKind::Supervision,
            0x08 => ProtocolKind::Heartbeat,
            0x10 => ProtocolKind::GpsPositioning,
            0x11 => ProtocolKind::GpsOfflinePositioning,
            0x13 => ProtocolKind::Status,
            0x14 => ProtocolKind::Hibernation,
            0x15 => ProtocolKind::Reset,
            0x16 => ProtocolKind::WhitelistTotal,
            0x17 => ProtocolKind::WifiOfflinePositioning,
            0x30 => ProtocolKind::Time,
            0x56 => ProtocolKind::StopAlarm,
            0x57 => ProtocolKind::Setup,
            0x58 => ProtocolKind::SynchronousWhitelist,
            0x67 => ProtocolKind::RestorePassword,
            0x69 => ProtocolKind::WifiPositioning,
            0x80 => ProtocolKind::ManualPositioning,
            0x81 => ProtocolKind::BatteryCharge,
            0x82 => ProtocolKind::ChargerConnected,
            0x83 => ProtocolKind::ChargerDisconnected,
            0x94 => ProtocolKind::VibrationReceived,
            0x98 => ProtocolKind::PositionUploadInterval,
            _ => return Err(TrackerError::UnknownProtocol(code)),
        };
        Ok(kind)
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Protocol name as written in logs
    pub fn name(self) -> &'static str {
        match self {
            ProtocolKind::Login => "login",
            ProtocolKind::Supervision => "supervision",
            ProtocolKind::Heartbeat => "heartbeat",
            ProtocolKind::GpsPositioning => "gps_positioning",
            ProtocolKind::GpsOfflinePositioning => "gps_offline_positioning",
            ProtocolKind::Status => "status",
            ProtocolKind::Hibernation => "hibernation",
            ProtocolKind::Reset => "reset",
            ProtocolKind::WhitelistTotal => "whitelist_total",
            ProtocolKind::WifiOfflinePositioning => "wifi_offline_positioning",
            ProtocolKind::Time => "time",
            ProtocolKind::StopAlarm => "stop_alarm",
            ProtocolKind::Setup => "setup",
            ProtocolKind::SynchronousWhitelist => "synchronous_whitelist",
            ProtocolKind::RestorePassword => "restore_password",
            ProtocolKind::WifiPositioning => "wifi_positioning",
            ProtocolKind::ManualPositioning => "manual_positioning",
            ProtocolKind::BatteryCharge => "battery_charge",
            ProtocolKind::ChargerConnected => "charger_connected",
            ProtocolKind::ChargerDisconnected => "charger_disconnected",
            ProtocolKind::VibrationReceived => "vibration_received",
            ProtocolKind::PositionUploadInterval => "position_upload_interval",
        }
    }

    pub fn handler(self) -> Handler {
        match self {
            ProtocolKind::Login => Handler::Login,
            ProtocolKind::GpsPositioning | ProtocolKind::GpsOfflinePositioning => {
                Handler::Position
            }
            ProtocolKind::Status => Handler::Status,
            ProtocolKind::Hibernation => Handler::Hibernation,
            ProtocolKind::Setup => Handler::Setup,
            ProtocolKind::Time => Handler::Time,
            ProtocolKind::PositionUploadInterval => Handler::UploadInterval,
            // Wifi positioning carries a cell/wifi payload with no decoder yet
            ProtocolKind::Supervision
            | ProtocolKind::Heartbeat
            | ProtocolKind::Reset
            | ProtocolKind::WhitelistTotal
            | ProtocolKind::WifiOfflinePositioning
            | ProtocolKind::StopAlarm
            | ProtocolKind::SynchronousWhitelist
            | ProtocolKind::RestorePassword
            | ProtocolKind::WifiPositioning
            | ProtocolKind::ManualPositioning
            | ProtocolKind::BatteryCharge
            | ProtocolKind::ChargerConnected
            | ProtocolKind::ChargerDisconnected
            | ProtocolKind::VibrationReceived => Handler::Generic,
        }
    }
}
