//! TCP Server
//!
//! Accepts connections and runs each on its own thread.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::Connection;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::{Result, TrackerError};
use crate::logger::EventSink;
use crate::session::{ConnectionId, SessionStore};

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// TCP server for tracking devices
pub struct Server {
    config: Config,
    listener: TcpListener,
    sessions: Arc<SessionStore>,
    dispatcher: Arc<Dispatcher>,
    shutdown: ShutdownHandle,
    next_id: AtomicU64,
}

/// Stops a running server from another thread
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Ask the acceptor loop to stop; live connections run to completion
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

impl Server {
    /// Bind the listening socket
    ///
    /// Failing to bind is the only error fatal to the whole process.
    pub fn bind(config: Config, events: Arc<dyn EventSink>) -> Result<Self> {
        let dispatcher = Dispatcher::new(config.setup.clone(), events)?;

        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            TrackerError::Config(format!("cannot bind {}: {}", config.listen_addr, e))
        })?;
        // Non-blocking so the loop can notice a shutdown request
        listener.set_nonblocking(true)?;

        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            config,
            listener,
            sessions: Arc::new(SessionStore::new()),
            dispatcher: Arc::new(dispatcher),
            shutdown: ShutdownHandle::default(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Live session registry
    pub fn sessions(&self) -> Arc<SessionStore> {
        Arc::clone(&self.sessions)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&self) -> Result<()> {
        while !self.shutdown.is_shutdown() {
            match self.listener.accept() {
                Ok((stream, addr)) => self.spawn_connection(stream, addr),
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    // Per-connection failures (e.g. ECONNABORTED) never stop the acceptor
                    tracing::warn!("Accept failed: {}", e);
                }
            }
        }

        tracing::info!(
            "Acceptor stopped, {} connections still open",
            self.sessions.len()
        );
        Ok(())
    }

    /// Signal the server to stop accepting
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    fn spawn_connection(&self, stream: TcpStream, addr: SocketAddr) {
        if self.sessions.len() >= self.config.max_connections {
            tracing::warn!(
                "Refusing {}: {} connections open (max {})",
                addr,
                self.sessions.len(),
                self.config.max_connections
            );
            return;
        }

        let id = ConnectionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));

        // Registering the session here keeps the connection count exact
        let connection = stream
            .set_nonblocking(false)
            .map_err(TrackerError::from)
            .and_then(|_| {
                Connection::new(
                    id,
                    stream,
                    Arc::clone(&self.sessions),
                    Arc::clone(&self.dispatcher),
                )
            })
            .and_then(|mut connection| {
                connection.set_timeouts(self.config.idle_timeout_ms, self.config.write_timeout_ms)?;
                Ok(connection)
            });

        let mut connection = match connection {
            Ok(connection) => connection,
            Err(e) => {
                tracing::warn!("Failed to set up connection from {}: {}", addr, e);
                return;
            }
        };

        let spawned = thread::Builder::new()
            .name(format!("conn-{}", id.get()))
            .spawn(move || {
                if let Err(e) = connection.handle() {
                    tracing::warn!("{} ended with error: {}", id, e);
                }
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to spawn handler thread for {}: {}", addr, e);
        }
    }
}
