//! # PhoneBook
//!
//! A persistent phone book keyed by surname, with:
//! - One record per surname holding entries keyed by first name
//! - Merge-on-write updates and record compaction on last delete
//! - Single-writer/multi-reader ordering of every operation
//! - A log-structured single-file storage engine with crash recovery
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     PhoneBook                                │
//! │         (StoreLock: Single Writer / Multi Reader)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  surname → Record (bincode)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  KvEngine (keyspaces)                        │
//! └─────────────────────┬───────────────────────────────────────┘
//!          ┌────────────┴────────────┐
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ FileEngine  │          │MemoryEngine │
//!   │ (log+index) │          │  (RwLock)   │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod client;
pub mod guard;
pub mod kv;
pub mod network;
pub mod protocol;
pub mod record;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use client::Client;
pub use config::{Config, SyncStrategy};
pub use error::{PhoneBookError, Result};
pub use record::{DeleteOutcome, Entry, Record, UpsertOutcome};
pub use store::{Listing, PhoneBook};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the phone book
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
