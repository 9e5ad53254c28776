//! Stream framing
//!
//! Pulls frames off a byte stream. The only resynchronization primitive is
//! the start marker, so bytes already read are kept until a frame has been
//! accepted: a header that turns out to be broken is abandoned one byte in,
//! and scanning resumes over everything read after it.

use std::io::{self, ErrorKind, Read};

use bytes::{Buf, BytesMut};

use super::codec::to_hex;
use super::frame::{Frame, START_MARKER, STOP_MARKER};
use crate::error::{Result, TrackerError};

/// Bytes requested from the stream per read
const READ_CHUNK: usize = 512;

/// Start marker + length byte
const HEADER_LEN: usize = 3;

/// Reads frames from a byte stream
///
/// ```text
///   78 78 0A 10 1A 78 78 01 08 0D 0A ...
///   └─ broken ───┘ └─ heartbeat ───┘
///        ▲
///        └── a bad stop marker drops only the first byte; the heartbeat
///            is found by the next scan
/// ```
pub struct FrameReader<R> {
    inner: R,
    pending: BytesMut,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: BytesMut::with_capacity(READ_CHUNK),
        }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Bytes read from the stream but not yet returned in a frame
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    /// Read the next frame
    ///
    /// Skips any bytes preceding a start marker. Returns `Ok(None)` when the
    /// stream ends between frames and `UnexpectedEof` when it ends inside
    /// one. A broken frame (zero length, wrong stop marker, or cut off by the
    /// end of stream while later bytes hold another start marker) is reported
    /// as `MalformedFrame`; the next call rescans from the byte after its
    /// first marker byte.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        if !self.seek_start()? {
            return Ok(None);
        }

        if !self.fill_to(HEADER_LEN)? {
            return self.truncated();
        }

        let length = self.pending[2];
        if length == 0 {
            self.pending.advance(1);
            return Err(TrackerError::MalformedFrame(
                "Zero length byte: frame has no protocol code".to_string(),
            ));
        }

        let total = HEADER_LEN + length as usize + STOP_MARKER.len();
        if !self.fill_to(total)? {
            return self.truncated();
        }

        let stop = &self.pending[total - STOP_MARKER.len()..total];
        if *stop != STOP_MARKER {
            let stop = to_hex(stop);
            self.pending.advance(1);
            return Err(TrackerError::MalformedFrame(format!(
                "Missing stop marker after {} bytes: got {}",
                length, stop
            )));
        }

        let raw = self.pending.split_to(total).freeze();
        let body = raw.slice(HEADER_LEN..total - STOP_MARKER.len());
        Ok(Some(Frame::from_parts(length, body[0], body.slice(1..))))
    }

    /// Drop bytes up to the next start marker; `false` at end of stream
    fn seek_start(&mut self) -> Result<bool> {
        let mut discarded = 0usize;

        loop {
            if let Some(pos) = find_marker(&self.pending) {
                discarded += pos;
                self.pending.advance(pos);
                break;
            }

            // A trailing marker byte may pair with the next read
            let keep = usize::from(self.pending.last() == Some(&START_MARKER[0]));
            let drop = self.pending.len() - keep;
            discarded += drop;
            self.pending.advance(drop);

            if self.fill()? == 0 {
                let unframed = discarded + self.pending.len();
                if unframed > 0 {
                    tracing::debug!("Stream ended after {} unframed bytes", unframed);
                }
                self.pending.clear();
                return Ok(false);
            }
        }

        if discarded > 0 {
            tracing::warn!("Discarded {} bytes before start marker", discarded);
        }
        Ok(true)
    }

    /// The stream ended inside the frame at the front of `pending`
    fn truncated(&mut self) -> Result<Option<Frame>> {
        let held = self.pending.len();

        if find_marker(&self.pending[1..]).is_some() {
            self.pending.advance(1);
            return Err(TrackerError::MalformedFrame(format!(
                "Frame cut off by end of stream after {} bytes",
                held
            )));
        }

        self.pending.clear();
        Err(TrackerError::Io(io::Error::new(
            ErrorKind::UnexpectedEof,
            format!("stream ended {} bytes into a frame", held),
        )))
    }

    /// Read until at least `len` bytes are pending; `false` if the stream ends first
    fn fill_to(&mut self, len: usize) -> Result<bool> {
        while self.pending.len() < len {
            if self.fill()? == 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn fill(&mut self) -> io::Result<usize> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(n) => {
                    self.pending.extend_from_slice(&chunk[..n]);
                    return Ok(n);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

fn find_marker(buf: &[u8]) -> Option<usize> {
    buf.windows(START_MARKER.len())
        .position(|window| *window == START_MARKER)
}
