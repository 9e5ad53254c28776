//! # trackwire
//!
//! A TCP server for the binary protocol spoken by GPS tracking devices:
//! - Marker-delimited frame codec with stream resynchronization
//! - GPS payload decoding (position, hemisphere flags, heading)
//! - Per-connection sessions (IMEI, last fix)
//! - Tagged-variant protocol dispatch with framed replies
//! - Append-only TSV event log
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │              (one thread per device)                         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Connection Handler                           │
//! │          read frame → dispatch → write reply                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼─────────────┐
//!          │            │             │
//!          ▼            ▼             ▼
//!   ┌────────────┐ ┌──────────┐ ┌────────────┐
//!   │ Dispatcher │ │ Sessions │ │ Event Log  │
//!   │  (table)   │ │ (RwLock) │ │ (channel)  │
//!   └─────┬──────┘ └──────────┘ └────────────┘
//!         │
//!         ▼
//!   ┌────────────┐
//!   │ GPS Decode │
//!   └────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod dispatch;
pub mod gps;
pub mod logger;
pub mod network;
pub mod protocol;
pub mod session;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::Config;
pub use dispatch::{Action, Dispatcher};
pub use error::{Result, TrackerError};
pub use gps::GpsFix;
pub use protocol::Frame;
pub use session::{ConnectionId, Session, SessionState, SessionStore};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of trackwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
