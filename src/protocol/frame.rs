//! Frame definitions
//!
//! One marker-delimited protocol unit.

use bytes::Bytes;

use super::table::ProtocolKind;
use crate::error::{Result, TrackerError};

/// Leading marker of every frame
pub const START_MARKER: [u8; 2] = [0x78, 0x78];

/// Trailing marker of every frame
pub const STOP_MARKER: [u8; 2] = [0x0D, 0x0A];

/// Smallest possible frame: markers + length + protocol code
pub const MIN_FRAME_LEN: usize = 6;

/// Largest content that still fits the 1-byte length field
pub const MAX_CONTENT_LEN: usize = 254;

/// A decoded frame
///
/// Immutable once built; replies are always new frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Length byte as carried on the wire (`content.len() + 1`)
    length: u8,

    /// Protocol code
    protocol_code: u8,

    /// Content bytes, format depends on the protocol code
    content: Bytes,
}

impl Frame {
    /// Build a frame, computing its length byte
    pub fn new(protocol_code: u8, content: impl Into<Bytes>) -> Result<Self> {
        let content = content.into();
        if content.len() > MAX_CONTENT_LEN {
            return Err(TrackerError::ContentTooLong(content.len()));
        }

        Ok(Self {
            length: content.len() as u8 + 1,
            protocol_code,
            content,
        })
    }

    /// Build a generic reply: same protocol code, no content
    pub fn generic(protocol_code: u8) -> Self {
        Self {
            length: 1,
            protocol_code,
            content: Bytes::new(),
        }
    }

    /// Assemble a frame from parts already validated by the codec
    pub(crate) fn from_parts(length: u8, protocol_code: u8, content: Bytes) -> Self {
        Self {
            length,
            protocol_code,
            content,
        }
    }

    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn protocol_code(&self) -> u8 {
        self.protocol_code
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Look the protocol code up in the protocol table
    pub fn kind(&self) -> Result<ProtocolKind> {
        ProtocolKind::from_code(self.protocol_code)
    }

    /// Size of the frame on the wire
    pub fn wire_len(&self) -> usize {
        MIN_FRAME_LEN + self.content.len()
    }

    /// Serialize to wire bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        super::codec::encode_frame(self)
    }
}
