//! Session store
//!
//! HashMap-based registry with a parking_lot RwLock.

use std::collections::HashMap;
use std::net::SocketAddr;

use parking_lot::RwLock;

use super::{ConnectionId, Session, SessionState};
use crate::error::{Result, TrackerError};
use crate::gps::GpsFix;

/// Process-wide map from connection id to session
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<ConnectionId, Session>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly accepted connection
    pub fn create(&self, id: ConnectionId, remote_addr: SocketAddr) -> Result<()> {
        let mut sessions = self.sessions.write();
        if sessions.contains_key(&id) {
            return Err(TrackerError::SessionExists(id));
        }
        sessions.insert(id, Session::new(id, remote_addr));
        Ok(())
    }

    /// Snapshot of a session
    pub fn get(&self, id: ConnectionId) -> Result<Session> {
        self.sessions
            .read()
            .get(&id)
            .cloned()
            .ok_or(TrackerError::UnknownSession(id))
    }

    /// Store identity from a login frame and mark the session authenticated
    pub fn set_login_info(
        &self,
        id: ConnectionId,
        imei: impl Into<String>,
        software_version: u8,
    ) -> Result<()> {
        self.update(id, |session| {
            session.imei = Some(imei.into());
            session.software_version = Some(software_version);
            session.state = SessionState::Authenticated;
        })
    }

    /// Replace the last known fix
    pub fn set_last_fix(&self, id: ConnectionId, fix: GpsFix) -> Result<()> {
        self.update(id, |session| session.last_fix = Some(fix))
    }

    /// Count one more received frame
    pub fn record_frame(&self, id: ConnectionId) -> Result<()> {
        self.update(id, |session| session.frames_received += 1)
    }

    /// Remove a session, returning it in the CLOSED state if it was live
    pub fn destroy(&self, id: ConnectionId) -> Option<Session> {
        let mut session = self.sessions.write().remove(&id)?;
        session.state = SessionState::Closed;
        Some(session)
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.sessions.read().contains_key(&id)
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    fn update(&self, id: ConnectionId, f: impl FnOnce(&mut Session)) -> Result<()> {
        let mut sessions = self.sessions.write();
        let session = sessions
            .get_mut(&id)
            .ok_or(TrackerError::UnknownSession(id))?;
        f(session);
        Ok(())
    }
}
