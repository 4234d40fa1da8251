//! Log Recovery
//!
//! Rebuilds state after a crash by replaying the backing file.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{PhoneBookError, Result};

use super::LogEntry;

/// Handles recovery of the backing file
pub struct LogRecovery;

/// Result of a recovery operation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of entries successfully recovered
    pub entries_recovered: u64,

    /// Number of corrupted entries skipped
    pub entries_corrupted: u64,

    /// Last valid LSN
    pub last_lsn: u64,

    /// Whether a partial tail was (or, for `verify`, would be) cut off
    pub was_truncated: bool,

    /// Length of the file once the partial tail is removed
    pub valid_len: u64,
}

impl LogRecovery {
    /// Recover entries from a log file
    ///
    /// This will:
    /// 1. Read all valid entries
    /// 2. Skip damaged regions that are followed by an intact frame
    /// 3. Truncate a damaged or partial tail
    /// 4. Return all valid entries in order
    ///
    /// A missing file recovers as empty.
    pub fn recover(path: &Path) -> Result<(Vec<LogEntry>, RecoveryResult)> {
        let (entries, result) = Self::scan(path)?;

        if result.was_truncated {
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(result.valid_len)?;
            file.sync_all()?;
            tracing::warn!(
                "Truncated partial tail of {} at offset {}",
                path.display(),
                result.valid_len
            );
        }

        Ok((entries, result))
    }

    /// Verify integrity of a log file without modifying it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        Self::scan(path).map(|(_, result)| result)
    }

    fn scan(path: &Path) -> Result<(Vec<LogEntry>, RecoveryResult)> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok((Vec::new(), RecoveryResult::default()))
            }
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        let mut result = RecoveryResult::default();
        let mut pos = 0usize;

        while pos < data.len() {
            match LogEntry::deserialize(&data[pos..]) {
                Ok((entry, len)) => {
                    pos += len;
                    if entry.lsn <= result.last_lsn {
                        tracing::warn!(
                            "Skipping out-of-order entry: lsn {} after {}",
                            entry.lsn,
                            result.last_lsn
                        );
                        result.entries_corrupted += 1;
                        continue;
                    }
                    result.last_lsn = entry.lsn;
                    result.entries_recovered += 1;
                    entries.push(entry);
                }
                Err(e @ (PhoneBookError::LogTruncated { .. } | PhoneBookError::LogCorruption(_))) => {
                    match Self::next_frame(&data, pos, result.last_lsn) {
                        Some(next) => {
                            tracing::warn!(
                                "Skipping {} damaged bytes at offset {}: {}",
                                next - pos,
                                pos,
                                e
                            );
                            result.entries_corrupted += 1;
                            pos = next;
                        }
                        None => {
                            // Nothing readable follows: a partial or damaged tail
                            if matches!(e, PhoneBookError::LogCorruption(_)) {
                                result.entries_corrupted += 1;
                            }
                            tracing::warn!("Damaged tail at offset {}: {}", pos, e);
                            result.was_truncated = true;
                            break;
                        }
                    }
                }
                Err(e) => return Err(e),
            }
        }

        result.valid_len = pos as u64;
        Ok((entries, result))
    }

    /// Offset of the first intact frame after the damaged one at `from`
    ///
    /// The length in the damaged header is tried first, then every later
    /// offset. Only frames newer than `last_lsn` count.
    fn next_frame(data: &[u8], from: usize, last_lsn: u64) -> Option<usize> {
        let hinted = LogEntry::frame_len(&data[from..]).ok().map(|len| from + len);

        hinted
            .into_iter()
            .chain(from + 1..data.len())
            .find(|&at| {
                matches!(
                    LogEntry::deserialize(&data[at..]),
                    Ok((entry, _)) if entry.lsn > last_lsn
                )
            })
    }
}
