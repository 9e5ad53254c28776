//! Decoded GPS position

use chrono::{DateTime, Local, Utc};

/// A decoded GPS observation
#[derive(Debug, Clone, PartialEq)]
pub struct GpsFix {
    /// Fix time as reported by the device (UTC)
    pub timestamp_utc: DateTime<Utc>,

    /// Same instant in the server's local time zone
    pub timestamp_local: DateTime<Local>,

    /// False when the device sent no time and the decode time was used
    pub time_from_device: bool,

    pub valid: bool,

    /// Satellites in view (0-15)
    pub satellites: u8,

    /// Signed degrees, negative south
    pub latitude: f64,

    /// Signed degrees, negative west
    pub longitude: f64,

    pub speed: u8,

    /// Course over ground (0-1023)
    pub heading: u16,

    /// Not transmitted by the hardware, always 0.0
    pub accuracy: f64,
}
