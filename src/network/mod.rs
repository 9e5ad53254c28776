//! Network Module
//!
//! TCP server and device connection handling.
//!
//! ## Architecture
//! - Single acceptor thread
//! - One thread per device connection
//! - Frames routed through the Dispatcher

mod connection;
mod server;

pub use connection::Connection;
pub use server::{Server, ShutdownHandle};
