//! Connection Handler
//!
//! Handles one device connection from accept to close.
//!
//! ```text
//! CONNECTED ──login──▶ AUTHENTICATED ──▶ (receive / dispatch / reply)*
//!     │                      │
//!     └──── EOF, hibernation, I/O error, idle timeout ────▶ CLOSED
//! ```

use std::io::{BufWriter, ErrorKind};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use crate::dispatch::{Action, Dispatcher};
use crate::error::{Result, TrackerError};
use crate::logger::{Direction, LogEvent};
use crate::protocol::{to_hex, write_frame, Frame, FrameReader};
use crate::session::{ConnectionId, SessionStore};

/// Handles a single device connection
///
/// The session is created with the connection and destroyed when the
/// connection is dropped, whatever the exit path.
pub struct Connection {
    /// Server-issued identity
    id: ConnectionId,

    /// Frame reader; keeps partial frames between reads
    reader: FrameReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Session registry; this connection only touches its own entry
    sessions: Arc<SessionStore>,

    /// Protocol dispatcher
    dispatcher: Arc<Dispatcher>,

    /// Peer address for logging
    peer_addr: SocketAddr,
}

impl Connection {
    /// Create a new connection handler and register its session
    pub fn new(
        id: ConnectionId,
        stream: TcpStream,
        sessions: Arc<SessionStore>,
        dispatcher: Arc<Dispatcher>,
    ) -> Result<Self> {
        let peer_addr = stream.peer_addr()?;

        // Disable Nagle's algorithm: replies are tiny and latency matters
        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        sessions.create(id, peer_addr)?;

        Ok(Self {
            id,
            reader: FrameReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            sessions,
            dispatcher,
            peer_addr,
        })
    }

    /// Configure idle (read) and write timeouts; 0 leaves a timeout unset
    pub fn set_timeouts(&mut self, idle_ms: u64, write_ms: u64) -> Result<()> {
        if idle_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(idle_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Returns `Ok` for every orderly close (EOF, hibernation, peer reset,
    /// idle timeout) and `Err` for anything else. The socket is shut down in
    /// both cases.
    pub fn handle(&mut self) -> Result<()> {
        tracing::info!("{} connected from {}", self.id, self.peer_addr);

        let result = self.serve();
        self.close();
        result
    }

    fn serve(&mut self) -> Result<()> {
        loop {
            let frame = match self.reader.read_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    tracing::info!("{} ({}) closed the connection", self.id, self.peer_addr);
                    return Ok(());
                }
                Err(TrackerError::MalformedFrame(reason)) => {
                    // Dropped; the next read rescans the bytes behind its start marker
                    tracing::warn!("{}: dropped malformed frame: {}", self.id, reason);
                    continue;
                }
                Err(TrackerError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::info!("{} ({}) went away: {}", self.id, self.peer_addr, e);
                    return Ok(());
                }
                Err(TrackerError::Io(ref e)) if is_timeout(e.kind()) => {
                    tracing::info!("{} ({}) idle timeout", self.id, self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            self.sessions.record_frame(self.id)?;
            let action = self.dispatcher.dispatch(&self.sessions, self.id, &frame)?;

            // Logged after dispatch so a login frame already carries its IMEI
            self.record_packet(Direction::In, &frame)?;

            let reply = match action {
                Action::Reply(reply) => reply,
                Action::Close => return Ok(()),
            };

            match self.send_frame(&reply) {
                Ok(()) => {}
                Err(TrackerError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::info!(
                        "{} ({}) disconnected before reply could be sent: {}",
                        self.id,
                        self.peer_addr,
                        e
                    );
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            }
        }
    }

    /// Send a reply and log it
    fn send_frame(&mut self, frame: &Frame) -> Result<()> {
        write_frame(&mut self.writer, frame)?;
        tracing::debug!("{} <- {}", self.id, to_hex(&frame.to_bytes()));
        self.record_packet(Direction::Out, frame)
    }

    fn record_packet(&self, direction: Direction, frame: &Frame) -> Result<()> {
        let session = self.sessions.get(self.id)?;
        self.dispatcher.events().record(LogEvent::packet(
            self.peer_addr.ip(),
            session.device_id(),
            direction,
            to_hex(&frame.to_bytes()),
        ));
        Ok(())
    }

    /// Enter CLOSED: shut the socket down and destroy the session
    fn close(&mut self) {
        let _ = self.writer.get_ref().shutdown(Shutdown::Both);

        if let Some(session) = self.sessions.destroy(self.id) {
            tracing::debug!(
                "{} closed after {} frames (device {})",
                self.id,
                session.frames_received,
                session.device_id()
            );
        }
    }
}

impl Drop for Connection {
    // Covers exits that skip close(), e.g. a panic in a handler
    fn drop(&mut self) {
        self.sessions.destroy(self.id);
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
    )
}

// Windows reports TimedOut where Unix reports WouldBlock
fn is_timeout(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::WouldBlock | ErrorKind::TimedOut)
}
