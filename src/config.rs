//! Configuration for PhoneBook
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{PhoneBookError, Result};

/// Main configuration for a PhoneBook instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// The single backing file holding every keyspace
    pub data_file: PathBuf,

    /// Keyspace that holds the surname records
    pub keyspace: String,

    /// Sync strategy: how often to fsync the backing file
    pub sync_strategy: SyncStrategy,

    /// Stale log entries tolerated before the backing file is rewritten.
    /// Zero disables automatic compaction.
    pub compaction_threshold: u64,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Worker threads serving connections
    pub worker_threads: usize,

    /// Max connections queued for a worker
    pub max_connections: usize,

    /// Connection read timeout (milliseconds)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds)
    pub write_timeout_ms: u64,
}

/// Backing file sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N unsynced entries (balanced durability/performance)
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("./phonebook.db"),
            keyspace: "phoneBook".to_string(),
            sync_strategy: SyncStrategy::EveryWrite,
            compaction_threshold: 4096,
            listen_addr: "127.0.0.1:3000".to_string(),
            worker_threads: 4,
            max_connections: 1024,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the store or server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.keyspace.is_empty() {
            return Err(PhoneBookError::Config("keyspace must not be empty".to_string()));
        }
        if self.worker_threads == 0 {
            return Err(PhoneBookError::Config(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(PhoneBookError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if let SyncStrategy::EveryNEntries { count: 0 } = self.sync_strategy {
            return Err(PhoneBookError::Config(
                "sync count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the backing file path
    pub fn data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_file = path.into();
        self
    }

    /// Set the keyspace name
    pub fn keyspace(mut self, name: impl Into<String>) -> Self {
        self.config.keyspace = name.into();
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set the stale-entry threshold for log compaction
    pub fn compaction_threshold(mut self, threshold: u64) -> Self {
        self.config.compaction_threshold = threshold;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the maximum number of queued connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
