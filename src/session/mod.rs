//! Session Module
//!
//! Per-connection device state.
//!
//! ## Responsibilities
//! - Identify each connection by a server-issued id
//! - Remember the device identity captured at login
//! - Keep the most recent GPS fix
//!
//! ## Ownership
//! Every entry is created, mutated and destroyed by its own connection
//! handler. The registry lock is only held for the duration of one operation,
//! and no two handlers ever touch the same key.

mod store;

pub use store::SessionStore;

use std::fmt;
use std::net::SocketAddr;

use chrono::{DateTime, Utc};

use crate::gps::GpsFix;

/// Identity of one accepted connection; never reused within a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Connection life cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepted, no login yet
    Connected,

    /// A login frame was processed
    Authenticated,

    /// Terminal
    Closed,
}

/// State of one live connection
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub connection_id: ConnectionId,
    pub remote_addr: SocketAddr,
    pub imei: Option<String>,
    pub software_version: Option<u8>,
    pub last_fix: Option<GpsFix>,
    pub state: SessionState,
    pub connected_at: DateTime<Utc>,
    pub frames_received: u64,
}

impl Session {
    pub fn new(connection_id: ConnectionId, remote_addr: SocketAddr) -> Self {
        Self {
            connection_id,
            remote_addr,
            imei: None,
            software_version: None,
            last_fix: None,
            state: SessionState::Connected,
            connected_at: Utc::now(),
            frames_received: 0,
        }
    }

    /// Device identifier for logs, `-` before login
    pub fn device_id(&self) -> &str {
        self.imei.as_deref().unwrap_or("-")
    }
}
