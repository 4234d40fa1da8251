//! Log Writer
//!
//! Handles appending entries to the backing file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::config::SyncStrategy;
use crate::error::Result;

use super::{LogEntry, Operation};

/// Appends framed entries to the backing file
pub struct LogWriter {
    file: File,

    /// Last LSN handed out (0 = none yet)
    current_lsn: u64,

    sync_strategy: SyncStrategy,

    /// Entries written since the last fsync
    unsynced: usize,

    /// Current file length in bytes
    size: u64,
}

impl LogWriter {
    /// Open or create a log file for appending
    ///
    /// `last_lsn` is the highest LSN already present in the file (from
    /// recovery); new entries continue after it.
    pub fn open(path: &Path, sync_strategy: SyncStrategy, last_lsn: u64) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            file,
            current_lsn: last_lsn,
            sync_strategy,
            unsynced: 0,
            size,
        })
    }

    /// Append an operation, returning its LSN
    ///
    /// The whole frame goes out in a single `write_all`. If that fails the
    /// file is cut back to its previous length, so a later append never
    /// lands behind a partial frame.
    pub fn append(&mut self, operation: Operation) -> Result<u64> {
        let lsn = self.current_lsn + 1;
        let frame = LogEntry::new(lsn, operation).serialize()?;

        if let Err(e) = self.file.write_all(&frame).and_then(|_| self.file.flush()) {
            if let Err(trim) = self.file.set_len(self.size) {
                tracing::error!("Failed to drop partial frame at offset {}: {}", self.size, trim);
            }
            return Err(e.into());
        }
        self.current_lsn = lsn;
        self.size += frame.len() as u64;
        self.unsynced += 1;

        match self.sync_strategy {
            SyncStrategy::EveryWrite => self.sync()?,
            SyncStrategy::EveryNEntries { count } if self.unsynced >= count => self.sync()?,
            SyncStrategy::EveryNEntries { .. } => {}
        }

        Ok(lsn)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        if self.unsynced > 0 {
            self.file.sync_data()?;
            self.unsynced = 0;
        }
        Ok(())
    }

    /// Get the last assigned LSN
    pub fn current_lsn(&self) -> u64 {
        self.current_lsn
    }

    /// Get the file length in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Entries appended but not yet fsynced
    pub fn unsynced(&self) -> usize {
        self.unsynced
    }
}
