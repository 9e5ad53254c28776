//! trackwire Server Binary
//!
//! Starts the TCP server for GPS tracking devices.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use trackwire::logger::EventLogger;
use trackwire::network::Server;
use trackwire::Config;

/// trackwire Server
#[derive(Parser, Debug)]
#[command(name = "trackwire-server")]
#[command(about = "TCP server for GT06-style GPS tracking devices")]
#[command(version)]
struct Args {
    /// Listen host
    #[arg(long, env = "TRACKWIRE_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Listen port
    #[arg(short, long, env = "TRACKWIRE_PORT", default_value = "60000")]
    port: u16,

    /// Directory for server_log.txt and location_log.txt
    #[arg(short, long, env = "TRACKWIRE_LOG_DIR", default_value = "./logs")]
    log_dir: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Close connections idle for this many seconds (0 disables)
    #[arg(short, long, default_value = "600")]
    idle_timeout_secs: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,trackwire=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("trackwire server v{}", trackwire::VERSION);
    tracing::info!("Event log directory: {}", args.log_dir);

    // Build config from args
    let config = Config::builder()
        .host_port(&args.host, args.port)
        .log_dir(&args.log_dir)
        .max_connections(args.max_connections)
        .idle_timeout_ms(args.idle_timeout_secs * 1000)
        .build();

    // Open event log
    let events = match EventLogger::open(&config.log_dir) {
        Ok(logger) => Arc::new(logger),
        Err(e) => {
            tracing::error!("Failed to open event log: {}", e);
            std::process::exit(1);
        }
    };

    // Bind and serve
    let server = match Server::bind(config, events) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
