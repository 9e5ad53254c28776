//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//! ```text
//! ┌───────────┬─────────┬──────────┬─────────────────┬───────────┐
//! │ 0x78 0x78 │ Len (1) │ Code (1) │ Content (0..N)  │ 0x0D 0x0A │
//! └───────────┴─────────┴──────────┴─────────────────┴───────────┘
//! ```
//!
//! Reading frames off a stream lives in [`FrameReader`](super::FrameReader).

use std::fmt::Write as _;
use std::io::Write;

use bytes::Bytes;

use super::frame::{Frame, MAX_CONTENT_LEN, MIN_FRAME_LEN, START_MARKER, STOP_MARKER};
use crate::error::{Result, TrackerError};

// =============================================================================
// Buffer Encoding/Decoding
// =============================================================================

/// Encode a frame from its protocol code and content
///
/// Format: start (2) + len (1) + code (1) + content + stop (2)
pub fn encode(protocol_code: u8, content: &[u8]) -> Result<Vec<u8>> {
    if content.len() > MAX_CONTENT_LEN {
        return Err(TrackerError::ContentTooLong(content.len()));
    }

    Ok(assemble(content.len() as u8 + 1, protocol_code, content))
}

/// Encode an already built frame
pub fn encode_frame(frame: &Frame) -> Vec<u8> {
    assemble(frame.length(), frame.protocol_code(), frame.content())
}

fn assemble(length: u8, protocol_code: u8, content: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(MIN_FRAME_LEN + content.len());
    message.extend_from_slice(&START_MARKER);
    message.push(length);
    message.push(protocol_code);
    message.extend_from_slice(content);
    message.extend_from_slice(&STOP_MARKER);
    message
}

/// Decode one complete frame from a byte buffer
///
/// The buffer must hold exactly one frame, markers included.
pub fn decode(raw: &[u8]) -> Result<Frame> {
    if raw.len() < MIN_FRAME_LEN {
        return Err(TrackerError::MalformedFrame(format!(
            "Frame too short: expected at least {} bytes, got {}",
            MIN_FRAME_LEN,
            raw.len()
        )));
    }

    if raw[..2] != START_MARKER {
        return Err(TrackerError::MalformedFrame(format!(
            "Missing start marker: got {}",
            to_hex(&raw[..2])
        )));
    }

    let end = raw.len() - 2;
    if raw[end..] != STOP_MARKER {
        return Err(TrackerError::MalformedFrame(format!(
            "Missing stop marker: got {}",
            to_hex(&raw[end..])
        )));
    }

    // Length byte covers the protocol code and content
    let length = raw[2];
    let body = &raw[3..end];
    if length as usize != body.len() {
        return Err(TrackerError::MalformedFrame(format!(
            "Length mismatch: header says {}, frame carries {}",
            length,
            body.len()
        )));
    }

    Ok(Frame::from_parts(
        length,
        body[0],
        Bytes::copy_from_slice(&body[1..]),
    ))
}

// =============================================================================
// Stream helpers
// =============================================================================

/// Write a frame to a stream
pub fn write_frame<W: Write>(writer: &mut W, frame: &Frame) -> Result<()> {
    let bytes = encode_frame(frame);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Lowercase hex rendering used in logs
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{:02x}", b);
    }
    out
}
