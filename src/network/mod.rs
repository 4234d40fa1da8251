//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single non-blocking acceptor loop
//! - Worker thread pool fed by a bounded channel
//! - Commands routed through the shared `PhoneBook`

mod connection;
mod server;

pub use connection::Connection;
pub use server::{Server, ShutdownHandle};
