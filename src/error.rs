//! Error types for trackwire
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::session::ConnectionId;

/// Result type alias using TrackerError
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Unified error type for trackwire operations
#[derive(Debug, Error)]
pub enum TrackerError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Framing Errors
    // -------------------------------------------------------------------------
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error("Frame content too long: {0} bytes (max 254)")]
    ContentTooLong(usize),

    // -------------------------------------------------------------------------
    // Content Errors
    // -------------------------------------------------------------------------
    #[error("Payload too short: expected {expected} bytes, got {actual}")]
    PayloadTooShort { expected: usize, actual: usize },

    #[error("Malformed content: {0}")]
    MalformedContent(String),

    #[error("Unknown protocol code: 0x{0:02X}")]
    UnknownProtocol(u8),

    // -------------------------------------------------------------------------
    // Session Errors
    // -------------------------------------------------------------------------
    #[error("Unknown session: {0}")]
    UnknownSession(ConnectionId),

    #[error("Session already exists: {0}")]
    SessionExists(ConnectionId),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Event log error: {0}")]
    EventLog(String),
}

impl TrackerError {
    /// Whether this error ends the connection it happened on.
    ///
    /// Framing and content problems only cost the offending frame; socket
    /// errors and broken session invariants close the connection.
    pub fn is_connection_fatal(&self) -> bool {
        match self {
            TrackerError::MalformedFrame(_)
            | TrackerError::PayloadTooShort { .. }
            | TrackerError::MalformedContent(_)
            | TrackerError::UnknownProtocol(_) => false,
            TrackerError::Io(_)
            | TrackerError::ContentTooLong(_)
            | TrackerError::UnknownSession(_)
            | TrackerError::SessionExists(_)
            | TrackerError::Config(_)
            | TrackerError::EventLog(_) => true,
        }
    }
}
