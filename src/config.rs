//! Configuration for trackwire
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::protocol::SetupBlock;

/// Main configuration for a trackwire server
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address (host:port)
    pub listen_addr: String,

    /// Max concurrent device connections
    pub max_connections: usize,

    /// Idle timeout: a connection with no incoming bytes for this long is
    /// closed (milliseconds, 0 disables)
    pub idle_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 disables)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Event Log Configuration
    // -------------------------------------------------------------------------
    /// Directory holding the TSV event logs
    /// Internal structure:
    ///   {log_dir}/
    ///     ├── server_log.txt     (every frame in and out)
    ///     └── location_log.txt   (decoded GPS fixes)
    pub log_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Configuration block sent in reply to a setup request
    pub setup: SetupBlock,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:60000".to_string(),
            max_connections: 1024,
            idle_timeout_ms: 10 * 60 * 1000, // 10 minutes
            write_timeout_ms: 5000,
            log_dir: PathBuf::from("./logs"),
            setup: SetupBlock::default(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the listen address from a separate host and port
    pub fn host_port(mut self, host: &str, port: u16) -> Self {
        self.config.listen_addr = format!("{}:{}", host, port);
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the idle timeout (in milliseconds)
    pub fn idle_timeout_ms(mut self, ms: u64) -> Self {
        self.config.idle_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the event log directory
    pub fn log_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.log_dir = path.into();
        self
    }

    /// Set the setup block sent to devices
    pub fn setup(mut self, setup: SetupBlock) -> Self {
        self.config.setup = setup;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
