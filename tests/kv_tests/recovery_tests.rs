//! Tests for log recovery
//!
//! These tests verify:
//! - Recovery from a clean, empty, or missing file
//! - Recovery with partial writes (truncated tail)
//! - Recovery with corrupted entries (CRC mismatch, out-of-order LSN)
//! - Verify mode (stats only, file untouched)

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use phonebook::config::SyncStrategy;
use phonebook::kv::{LogEntry, LogRecovery, LogWriter, Operation, RecoveryResult, HEADER_SIZE};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_log() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test.db");
    (temp_dir, path)
}

fn put(i: u64) -> Operation {
    Operation::Put {
        keyspace: "ks".to_string(),
        key: format!("key{}", i).into_bytes(),
        value: format!("value{}", i).into_bytes(),
    }
}

/// Write entries using LogWriter (produces a well-formed file)
fn write_entries_via_writer(path: &Path, count: u64) {
    let mut writer = LogWriter::open(path, SyncStrategy::EveryWrite, 0).unwrap();
    for i in 0..count {
        writer.append(put(i)).unwrap();
    }
}

/// Write raw frames directly (for crafting corruption)
fn write_raw_frames(path: &Path, frames: &[Vec<u8>]) {
    let mut file = File::create(path).unwrap();
    for frame in frames {
        file.write_all(frame).unwrap();
    }
    file.sync_all().unwrap();
}

fn frame(lsn: u64) -> Vec<u8> {
    LogEntry::new(lsn, put(lsn)).serialize().unwrap()
}

fn append_bytes(path: &Path, bytes: &[u8]) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(bytes).unwrap();
}

// =============================================================================
// Clean File Tests
// =============================================================================

#[test]
fn test_recover_missing_file() {
    let (_temp, path) = setup_temp_log();

    let (entries, result) = LogRecovery::recover(&path).unwrap();

    assert!(entries.is_empty());
    assert_eq!(result, RecoveryResult::default());
}

#[test]
fn test_recover_empty_file() {
    let (_temp, path) = setup_temp_log();
    File::create(&path).unwrap();

    let (entries, result) = LogRecovery::recover(&path).unwrap();

    assert!(entries.is_empty());
    assert_eq!(result.last_lsn, 0);
    assert!(!result.was_truncated);
}

#[test]
fn test_recover_clean_file() {
    let (_temp, path) = setup_temp_log();
    write_entries_via_writer(&path, 10);

    let (entries, result) = LogRecovery::recover(&path).unwrap();

    assert_eq!(entries.len(), 10);
    assert_eq!(result.entries_recovered, 10);
    assert_eq!(result.entries_corrupted, 0);
    assert_eq!(result.last_lsn, 10);
    assert!(!result.was_truncated);
    assert_eq!(result.valid_len, fs::metadata(&path).unwrap().len());
}

// =============================================================================
// Partial Write Tests
// =============================================================================

#[test]
fn test_recover_cuts_partial_tail() {
    let (_temp, path) = setup_temp_log();
    write_entries_via_writer(&path, 3);
    let clean_len = fs::metadata(&path).unwrap().len();

    let partial = frame(4);
    append_bytes(&path, &partial[..partial.len() / 2]);

    let (entries, result) = LogRecovery::recover(&path).unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(result.last_lsn, 3);
    assert!(result.was_truncated);
    assert_eq!(result.valid_len, clean_len);
    assert_eq!(fs::metadata(&path).unwrap().len(), clean_len);
}

#[test]
fn test_recover_cuts_partial_header() {
    let (_temp, path) = setup_temp_log();
    write_entries_via_writer(&path, 2);
    let clean_len = fs::metadata(&path).unwrap().len();

    append_bytes(&path, &[0u8; HEADER_SIZE - 4]);

    let (entries, result) = LogRecovery::recover(&path).unwrap();

    assert_eq!(entries.len(), 2);
    assert!(result.was_truncated);
    assert_eq!(fs::metadata(&path).unwrap().len(), clean_len);
}

#[test]
fn test_verify_does_not_modify_file() {
    let (_temp, path) = setup_temp_log();
    write_entries_via_writer(&path, 2);
    append_bytes(&path, &[1, 2, 3]);
    let dirty_len = fs::metadata(&path).unwrap().len();

    let result = LogRecovery::verify(&path).unwrap();

    assert!(result.was_truncated);
    assert_eq!(result.entries_recovered, 2);
    assert_eq!(fs::metadata(&path).unwrap().len(), dirty_len);
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_recover_skips_crc_mismatch() {
    let (_temp, path) = setup_temp_log();

    let mut damaged = frame(2);
    let last = damaged.len() - 1;
    damaged[last] ^= 0xFF;
    write_raw_frames(&path, &[frame(1), damaged, frame(3)]);

    let (entries, result) = LogRecovery::recover(&path).unwrap();

    let lsns: Vec<u64> = entries.iter().map(|e| e.lsn).collect();
    assert_eq!(lsns, vec![1, 3]);
    assert_eq!(result.entries_corrupted, 1);
    assert_eq!(result.last_lsn, 3);
    assert!(!result.was_truncated);
}

#[test]
fn test_recover_skips_out_of_order_lsn() {
    let (_temp, path) = setup_temp_log();
    write_raw_frames(&path, &[frame(1), frame(2), frame(2), frame(3)]);

    let (entries, result) = LogRecovery::recover(&path).unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(result.entries_corrupted, 1);
    assert_eq!(result.last_lsn, 3);
}

#[test]
fn test_recover_stops_at_unframeable_header() {
    let (_temp, path) = setup_temp_log();
    write_raw_frames(&path, &[frame(1)]);
    let clean_len = fs::metadata(&path).unwrap().len();

    let mut garbage = vec![0u8; HEADER_SIZE];
    garbage[12..16].copy_from_slice(&u32::MAX.to_le_bytes());
    append_bytes(&path, &garbage);

    let (entries, result) = LogRecovery::recover(&path).unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(result.entries_corrupted, 1);
    assert!(result.was_truncated);
    assert_eq!(fs::metadata(&path).unwrap().len(), clean_len);
}

#[test]
fn test_recover_resyncs_after_partial_frame_mid_file() {
    let (_temp, path) = setup_temp_log();
    let partial = frame(3);
    write_raw_frames(
        &path,
        &[frame(1), frame(2), partial[..partial.len() / 2].to_vec(), frame(3), frame(4)],
    );
    let full_len = fs::metadata(&path).unwrap().len();

    let (entries, result) = LogRecovery::recover(&path).unwrap();

    let lsns: Vec<u64> = entries.iter().map(|e| e.lsn).collect();
    assert_eq!(lsns, vec![1, 2, 3, 4]);
    assert_eq!(result.entries_corrupted, 1);
    assert!(!result.was_truncated);
    assert_eq!(fs::metadata(&path).unwrap().len(), full_len);
}

#[test]
fn test_recover_resyncs_after_length_past_eof() {
    let (_temp, path) = setup_temp_log();

    let mut damaged = frame(2);
    damaged[12..16].copy_from_slice(&1_000_000u32.to_le_bytes());
    write_raw_frames(&path, &[frame(1), damaged, frame(3)]);
    let full_len = fs::metadata(&path).unwrap().len();

    let (entries, result) = LogRecovery::recover(&path).unwrap();

    let lsns: Vec<u64> = entries.iter().map(|e| e.lsn).collect();
    assert_eq!(lsns, vec![1, 3]);
    assert_eq!(result.entries_corrupted, 1);
    assert!(!result.was_truncated);
    assert_eq!(fs::metadata(&path).unwrap().len(), full_len);
}

#[test]
fn test_writer_appends_after_recovered_gap() {
    let (_temp, path) = setup_temp_log();
    let partial = frame(2);
    write_raw_frames(&path, &[frame(1), partial[..HEADER_SIZE + 3].to_vec(), frame(2)]);

    let (_, result) = LogRecovery::recover(&path).unwrap();
    let mut writer = LogWriter::open(&path, SyncStrategy::EveryWrite, result.last_lsn).unwrap();
    assert_eq!(writer.append(put(3)).unwrap(), 3);
    drop(writer);

    let (entries, result) = LogRecovery::recover(&path).unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(result.last_lsn, 3);
    assert!(!result.was_truncated);
}
