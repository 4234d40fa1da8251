//! File engine
//!
//! Durable engine over one append-only backing file.
//!
//! ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
//!
//! - **Writes** (put/delete/keyspace changes/compaction): serialized by the
//!   `writer` mutex. Lock order is always writer → index.
//! - **Reads** (get/for_each): take the index read lock only; they never
//!   touch the file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};

use crate::config::{Config, SyncStrategy};
use crate::error::{PhoneBookError, Result};

use super::keyspace::Keyspaces;
use super::{KvEngine, LogRecovery, LogWriter, Operation, RecoveryResult};

/// Single-file, log-structured key-value engine
pub struct FileEngine {
    /// Backing file path
    path: PathBuf,

    /// Appender for the backing file (exclusive access needed)
    writer: Mutex<LogWriter>,

    /// Live state of every keyspace
    index: RwLock<Keyspaces>,

    /// Entries in the file that no longer contribute to the live state
    stale_entries: AtomicU64,

    /// Stale entries tolerated before compaction (0 = never)
    compaction_threshold: u64,

    sync_strategy: SyncStrategy,

    /// What recovery found when the file was opened
    recovery: RecoveryResult,
}

impl FileEngine {
    /// Open or create the backing file
    ///
    /// On startup:
    /// 1. Create the parent directory if needed
    /// 2. Recover the file (skip corrupted entries, cut a partial tail)
    /// 3. Replay every entry into the index
    /// 4. Reopen the file for appending
    pub fn open(path: &Path, sync_strategy: SyncStrategy, compaction_threshold: u64) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let (entries, recovery) = LogRecovery::recover(path)?;
        if recovery.entries_recovered > 0 || recovery.entries_corrupted > 0 {
            tracing::info!(
                "Recovered {}: {} entries, {} corrupted, last_lsn={}",
                path.display(),
                recovery.entries_recovered,
                recovery.entries_corrupted,
                recovery.last_lsn
            );
        }

        let mut index = Keyspaces::default();
        let mut stale = recovery.entries_corrupted;
        for entry in entries {
            stale += index.apply(entry.operation);
        }

        let writer = LogWriter::open(path, sync_strategy, recovery.last_lsn)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(writer),
            index: RwLock::new(index),
            stale_entries: AtomicU64::new(stale),
            compaction_threshold,
            sync_strategy,
            recovery,
        })
    }

    /// Open using the storage settings of a config
    pub fn open_with_config(config: &Config) -> Result<Self> {
        Self::open(
            &config.data_file,
            config.sync_strategy,
            config.compaction_threshold,
        )
    }

    /// Rewrite the backing file with only the live state
    pub fn compact(&self) -> Result<()> {
        let mut writer = self.writer.lock();
        self.compact_locked(&mut writer)
    }

    /// Compaction body; caller holds the writer lock
    ///
    /// The replacement writer is opened on the new file before the rename,
    /// so a failure at any step leaves `writer` appending to the live file.
    fn compact_locked(&self, writer: &mut LogWriter) -> Result<()> {
        let tmp_path = self.compaction_path();
        match fs::remove_file(&tmp_path) {
            Err(e) if e.kind() != ErrorKind::NotFound => return Err(e.into()),
            _ => {}
        }

        let index = self.index.read();
        let before = writer.size();

        // Fsync once at the end rather than per entry
        let mut fresh = LogWriter::open(
            &tmp_path,
            SyncStrategy::EveryNEntries { count: usize::MAX },
            0,
        )?;
        for (name, space) in index.iter() {
            fresh.append(Operation::CreateKeyspace { name: name.clone() })?;
            for (key, value) in space {
                fresh.append(Operation::Put {
                    keyspace: name.clone(),
                    key: key.clone(),
                    value: value.clone(),
                })?;
            }
        }
        fresh.sync()?;
        let last_lsn = fresh.current_lsn();
        drop(fresh);

        let next = LogWriter::open(&tmp_path, self.sync_strategy, last_lsn)?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        *writer = next;
        self.stale_entries.store(0, Ordering::SeqCst);

        tracing::info!(
            "Compacted {}: {} -> {} bytes",
            self.path.display(),
            before,
            writer.size()
        );
        Ok(())
    }

    /// Compact once the stale count reaches the threshold
    ///
    /// Runs after a mutation is already logged and applied, so a failure
    /// here is logged and the mutation still reports success. The stale
    /// count is left as is and the next write tries again.
    fn maybe_compact(&self, writer: &mut LogWriter) {
        if self.compaction_threshold == 0
            || self.stale_entries.load(Ordering::SeqCst) < self.compaction_threshold
        {
            return;
        }
        if let Err(e) = self.compact_locked(writer) {
            tracing::warn!("Compaction of {} failed: {}", self.path.display(), e);
        }
    }

    fn compaction_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".compact");
        self.path.with_file_name(name)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// What recovery reported when this engine was opened
    pub fn recovery(&self) -> &RecoveryResult {
        &self.recovery
    }

    /// Entries in the file that a compaction would drop
    pub fn stale_entries(&self) -> u64 {
        self.stale_entries.load(Ordering::SeqCst)
    }

    /// Current backing file size in bytes
    pub fn file_size(&self) -> u64 {
        self.writer.lock().size()
    }

    /// Last LSN written
    pub fn last_lsn(&self) -> u64 {
        self.writer.lock().current_lsn()
    }

    /// Total keys across all keyspaces
    pub fn key_count(&self) -> usize {
        self.index.read().key_count()
    }
}

impl KvEngine for FileEngine {
    fn ensure_keyspace(&self, keyspace: &str) -> Result<()> {
        let mut writer = self.writer.lock();
        let mut index = self.index.write();
        if index.contains(keyspace) {
            return Ok(());
        }

        writer.append(Operation::CreateKeyspace {
            name: keyspace.to_string(),
        })?;
        index.create(keyspace);
        tracing::debug!("Created keyspace '{}'", keyspace);
        Ok(())
    }

    fn drop_keyspace(&self, keyspace: &str) -> Result<bool> {
        let mut writer = self.writer.lock();
        {
            let mut index = self.index.write();
            if !index.contains(keyspace) {
                return Ok(false);
            }

            writer.append(Operation::DropKeyspace {
                name: keyspace.to_string(),
            })?;
            let keys = index.drop_space(keyspace).unwrap_or_default();
            self.stale_entries
                .fetch_add(keys as u64 + 2, Ordering::SeqCst);
        }

        self.maybe_compact(&mut writer);
        Ok(true)
    }

    fn get(&self, keyspace: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.index.read().get(keyspace, key)
    }

    fn put(&self, keyspace: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let mut writer = self.writer.lock();
        {
            let mut index = self.index.write();
            if !index.contains(keyspace) {
                return Err(PhoneBookError::KeyspaceNotFound(keyspace.to_string()));
            }

            // Log first: the index never holds a value the file lacks
            writer.append(Operation::Put {
                keyspace: keyspace.to_string(),
                key: key.to_vec(),
                value: value.to_vec(),
            })?;
            if index.put(keyspace, key.to_vec(), value.to_vec())? {
                self.stale_entries.fetch_add(1, Ordering::SeqCst);
            }
        }

        self.maybe_compact(&mut writer);
        Ok(())
    }

    fn delete(&self, keyspace: &str, key: &[u8]) -> Result<()> {
        let mut writer = self.writer.lock();
        {
            let mut index = self.index.write();
            if index.get(keyspace, key)?.is_none() {
                return Ok(());
            }

            writer.append(Operation::Delete {
                keyspace: keyspace.to_string(),
                key: key.to_vec(),
            })?;
            index.delete(keyspace, key)?;
            self.stale_entries.fetch_add(2, Ordering::SeqCst);
        }

        self.maybe_compact(&mut writer);
        Ok(())
    }

    fn for_each(&self, keyspace: &str, visit: &mut dyn FnMut(&[u8], &[u8])) -> Result<()> {
        let index = self.index.read();
        for (key, value) in index.space(keyspace)? {
            visit(key.as_slice(), value.as_slice());
        }
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        self.writer.lock().sync()
    }
}

impl Drop for FileEngine {
    fn drop(&mut self) {
        if let Err(e) = self.writer.get_mut().sync() {
            tracing::warn!("Failed to sync {} on close: {}", self.path.display(), e);
        }
    }
}
