//! File-backed event log
//!
//! Handler threads hand records to a bounded channel; one writer thread
//! appends them to the packet and location logs. When the disk falls behind
//! and the queue is full, handlers block in `record` until it drains.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};

use super::{EventKind, EventSink, LogEvent};
use crate::error::{Result, TrackerError};

/// Appends records to `server_log.txt` and `location_log.txt`
pub struct EventLogger {
    sender: Option<Sender<LogEvent>>,
    worker: Option<JoinHandle<()>>,
    dir: PathBuf,
}

impl EventLogger {
    // =========================================================================
    // File Names
    // =========================================================================
    pub const SERVER_LOG: &'static str = "server_log.txt";
    pub const LOCATION_LOG: &'static str = "location_log.txt";

    /// Records queued for the writer before `record` blocks
    pub const QUEUE_CAPACITY: usize = 4096;

    /// Open (or create) both log files under `dir` and start the writer
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_capacity(dir, Self::QUEUE_CAPACITY)
    }

    /// Like [`open`](Self::open) with an explicit queue bound
    pub fn open_with_capacity(dir: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(TrackerError::Config(
                "event log queue capacity must be at least 1".to_string(),
            ));
        }

        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let server_log = open_append(&dir.join(Self::SERVER_LOG))?;
        let location_log = open_append(&dir.join(Self::LOCATION_LOG))?;

        let (sender, receiver) = channel::bounded(capacity);
        let worker = thread::Builder::new()
            .name("trackwire-eventlog".to_string())
            .spawn(move || write_loop(receiver, server_log, location_log))
            .map_err(|e| TrackerError::EventLog(format!("cannot start writer: {}", e)))?;

        tracing::debug!("Event log opened in {}", dir.display());

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            dir,
        })
    }

    /// Directory holding the log files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Queue bound, `None` once closed
    pub fn queue_capacity(&self) -> Option<usize> {
        self.sender.as_ref().and_then(Sender::capacity)
    }

    /// Flush pending records and stop the writer
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the sender ends the write loop once the queue drains
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Event log writer panicked");
            }
        }
    }
}

impl EventSink for EventLogger {
    fn record(&self, event: LogEvent) {
        if let Some(sender) = &self.sender {
            if sender.send(event).is_err() {
                tracing::warn!("Event log writer is gone, record dropped");
            }
        }
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn open_append(path: &Path) -> Result<BufWriter<File>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(BufWriter::new(file))
}

fn write_loop(
    receiver: Receiver<LogEvent>,
    mut server_log: BufWriter<File>,
    mut location_log: BufWriter<File>,
) {
    for event in receiver {
        let target = match event.kind {
            EventKind::Packet { .. } => &mut server_log,
            EventKind::Location(_) => &mut location_log,
        };

        let line = event.to_tsv();
        if let Err(e) = writeln!(target, "{}", line).and_then(|_| target.flush()) {
            tracing::error!("Failed to append event log record: {}", e);
        }
    }
}
