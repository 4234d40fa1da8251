//! Key-Value Engine Module
//!
//! The embedded storage underneath the phone book.
//!
//! ## Responsibilities
//! - Named keyspaces holding ordered key-value pairs
//! - Individually atomic get/put/delete/scan
//! - Durability through a single append-only backing file
//! - Crash recovery and log compaction
//!
//! No operation is atomic together with another: a get followed by a put
//! can interleave with other writers. Callers needing read-modify-write
//! atomicity must serialize above this layer.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Entry 1                                 │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Entry 2                                 │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! └─────────────────────────────────────────┘
//! ```

mod entry;
mod file;
mod keyspace;
mod memory;
mod recovery;
mod writer;

pub use entry::{LogEntry, Operation, HEADER_SIZE, MAX_ENTRY_SIZE};
pub use file::FileEngine;
pub use memory::MemoryEngine;
pub use recovery::{LogRecovery, RecoveryResult};
pub use writer::LogWriter;

use crate::error::Result;

/// Contract of an embedded key-value engine
///
/// Every method blocks and is atomic on its own. Operations on a keyspace
/// that was never ensured fail with `KeyspaceNotFound`.
pub trait KvEngine: Send + Sync {
    /// Create a keyspace if it does not exist yet
    fn ensure_keyspace(&self, keyspace: &str) -> Result<()>;

    /// Remove a keyspace and all its keys; returns false if it did not exist
    fn drop_keyspace(&self, keyspace: &str) -> Result<bool>;

    /// Get a value by key
    fn get(&self, keyspace: &str, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Insert or overwrite a value
    fn put(&self, keyspace: &str, key: &[u8], value: &[u8]) -> Result<()>;

    /// Delete a key; deleting an absent key succeeds
    fn delete(&self, keyspace: &str, key: &[u8]) -> Result<()>;

    /// Visit every key once, in ascending key order
    ///
    /// The engine is read-locked during the visit; `visit` must not call
    /// back into the engine's write operations.
    fn for_each(&self, keyspace: &str, visit: &mut dyn FnMut(&[u8], &[u8])) -> Result<()>;

    /// Force buffered writes to stable storage
    fn sync(&self) -> Result<()>;
}
