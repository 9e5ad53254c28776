//! Dispatch Module
//!
//! Turns one decoded frame into a reply (or a hang-up).
//!
//! ## Responsibilities
//! - Resolve the protocol code through the protocol table
//! - Route to the handler for that protocol
//! - Update the connection's session (login identity, last fix)
//! - Emit location records to the event sink
//!
//! Content errors inside a known protocol cost the semantic event only: they
//! are logged and the frame is still acknowledged with the generic reply.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::gps;
use crate::logger::{EventSink, LogEvent};
use crate::protocol::{self, Frame, Handler, ProtocolKind, SetupBlock, LOGIN_ACCEPTED};
use crate::session::{ConnectionId, SessionStore};

/// What the connection handler should do after a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send this frame back
    Reply(Frame),

    /// Send nothing and close the connection
    Close,
}

/// Stateless router from frames to replies
pub struct Dispatcher {
    /// Block sent in reply to setup requests
    setup: SetupBlock,

    /// Consumer of decoded events
    events: Arc<dyn EventSink>,
}

impl Dispatcher {
    /// Create a dispatcher
    ///
    /// The setup block is encoded once here so a block that cannot fit a
    /// frame fails at startup rather than on the first setup request.
    pub fn new(setup: SetupBlock, events: Arc<dyn EventSink>) -> Result<Self> {
        Frame::new(ProtocolKind::Setup.code(), setup.encode())?;
        Ok(Self { setup, events })
    }

    /// Event sink shared with the connection handlers
    pub fn events(&self) -> &Arc<dyn EventSink> {
        &self.events
    }

    /// Dispatch a frame using the current time for datetime replies
    pub fn dispatch(&self, sessions: &SessionStore, id: ConnectionId, frame: &Frame) -> Result<Action> {
        self.dispatch_at(sessions, id, frame, Utc::now())
    }

    /// Dispatch a frame with an explicit "now"
    ///
    /// Only session invariant violations are returned as errors; everything
    /// else resolves to an action.
    pub fn dispatch_at(
        &self,
        sessions: &SessionStore,
        id: ConnectionId,
        frame: &Frame,
        now: DateTime<Utc>,
    ) -> Result<Action> {
        let kind = match frame.kind() {
            Ok(kind) => kind,
            Err(e) => {
                tracing::warn!("{}: {}, sending generic reply", id, e);
                return Ok(Action::Reply(Frame::generic(frame.protocol_code())));
            }
        };

        tracing::debug!(
            "{}: {} frame (0x{:02X}), {} content bytes",
            id,
            kind.name(),
            kind.code(),
            frame.content().len()
        );

        let outcome = match kind.handler() {
            Handler::Login => self.handle_login(sessions, id, frame),
            Handler::Position => self.handle_position(sessions, id, kind, frame, now),
            Handler::Status => self.handle_status(id, frame),
            Handler::Hibernation => {
                tracing::info!("{}: device is hibernating, disconnecting", id);
                Ok(Action::Close)
            }
            Handler::Setup => Frame::new(kind.code(), self.setup.encode()).map(Action::Reply),
            Handler::Time => datetime_reply(kind, now),
            Handler::UploadInterval => protocol::parse_upload_interval(frame.content())
                .and_then(|interval| Frame::new(kind.code(), interval.to_vec()))
                .map(Action::Reply),
            Handler::Generic => Ok(Action::Reply(Frame::generic(kind.code()))),
        };

        match outcome {
            Ok(action) => Ok(action),
            Err(e) if e.is_connection_fatal() => Err(e),
            Err(e) => {
                tracing::warn!("{}: bad {} content: {}", id, kind.name(), e);
                Ok(Action::Reply(Frame::generic(kind.code())))
            }
        }
    }

    fn handle_login(&self, sessions: &SessionStore, id: ConnectionId, frame: &Frame) -> Result<Action> {
        let login = protocol::parse_login(frame.content())?;
        tracing::info!(
            "{}: login from IMEI {} (software v{})",
            id,
            login.imei,
            login.software_version
        );

        sessions.set_login_info(id, login.imei, login.software_version)?;

        // No allow-list: every device is accepted
        Frame::new(frame.protocol_code(), vec![LOGIN_ACCEPTED]).map(Action::Reply)
    }

    fn handle_position(
        &self,
        sessions: &SessionStore,
        id: ConnectionId,
        kind: ProtocolKind,
        frame: &Frame,
        now: DateTime<Utc>,
    ) -> Result<Action> {
        let fix = gps::decode_payload_at(frame.content(), now)?;
        tracing::info!(
            "{}: position valid={} sats={} lat={} lon={} speed={} heading={}",
            id,
            fix.valid,
            fix.satellites,
            fix.latitude,
            fix.longitude,
            fix.speed,
            fix.heading
        );

        let session = sessions.get(id)?;
        self.events.record(LogEvent::location(
            session.remote_addr.ip(),
            session.device_id(),
            fix.clone(),
        ));
        sessions.set_last_fix(id, fix)?;

        datetime_reply(kind, now)
    }

    fn handle_status(&self, id: ConnectionId, frame: &Frame) -> Result<Action> {
        let status = protocol::parse_status(frame.content())?;
        match status.signal_strength {
            Some(signal) => tracing::info!(
                "{}: status battery={} sw={} interval={} signal={}",
                id,
                status.battery,
                status.software_version,
                status.upload_interval,
                signal
            ),
            None => tracing::info!(
                "{}: status battery={} sw={} interval={}",
                id,
                status.battery,
                status.software_version,
                status.upload_interval
            ),
        }

        Ok(Action::Reply(Frame::generic(frame.protocol_code())))
    }
}

fn datetime_reply(kind: ProtocolKind, now: DateTime<Utc>) -> Result<Action> {
    Frame::new(kind.code(), protocol::encode_datetime(now).to_vec()).map(Action::Reply)
}
