//! Tests for log entry framing
//!
//! These tests verify:
//! - Frame layout (lsn, crc, len, data)
//! - Serialize/deserialize preserves every operation kind
//! - Incomplete frames report truncation, damaged frames report corruption

use phonebook::error::PhoneBookError;
use phonebook::kv::{LogEntry, Operation, HEADER_SIZE, MAX_ENTRY_SIZE};

// =============================================================================
// Helper Functions
// =============================================================================

fn put_entry(lsn: u64) -> LogEntry {
    LogEntry::new(
        lsn,
        Operation::Put {
            keyspace: "phoneBook".to_string(),
            key: b"Smith".to_vec(),
            value: b"payload".to_vec(),
        },
    )
}

// =============================================================================
// Frame Layout Tests
// =============================================================================

#[test]
fn test_frame_header_layout() {
    let entry = put_entry(42);
    let bytes = entry.serialize().unwrap();

    let lsn = u64::from_le_bytes(bytes[0..8].try_into().unwrap());
    let crc = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
    let len = u32::from_le_bytes(bytes[12..16].try_into().unwrap()) as usize;

    assert_eq!(lsn, 42);
    assert_eq!(len, bytes.len() - HEADER_SIZE);
    assert_eq!(crc, LogEntry::compute_crc(&bytes[HEADER_SIZE..]));
}

#[test]
fn test_frame_len_reads_header_only() {
    let bytes = put_entry(1).serialize().unwrap();
    assert_eq!(LogEntry::frame_len(&bytes).unwrap(), bytes.len());
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_deserialize_every_operation() {
    let operations = vec![
        Operation::CreateKeyspace {
            name: "phoneBook".to_string(),
        },
        Operation::Put {
            keyspace: "phoneBook".to_string(),
            key: b"Jones".to_vec(),
            value: vec![0, 1, 2, 255],
        },
        Operation::Delete {
            keyspace: "phoneBook".to_string(),
            key: b"Jones".to_vec(),
        },
        Operation::DropKeyspace {
            name: "phoneBook".to_string(),
        },
    ];

    for (i, operation) in operations.into_iter().enumerate() {
        let entry = LogEntry::new(i as u64 + 1, operation);
        let bytes = entry.serialize().unwrap();

        let (decoded, consumed) = LogEntry::deserialize(&bytes).unwrap();
        assert_eq!(decoded, entry);
        assert_eq!(consumed, bytes.len());
    }
}

#[test]
fn test_deserialize_ignores_following_frames() {
    let first = put_entry(1).serialize().unwrap();
    let second = put_entry(2).serialize().unwrap();

    let mut both = first.clone();
    both.extend_from_slice(&second);

    let (entry, consumed) = LogEntry::deserialize(&both).unwrap();
    assert_eq!(entry.lsn, 1);
    assert_eq!(consumed, first.len());

    let (entry, _) = LogEntry::deserialize(&both[consumed..]).unwrap();
    assert_eq!(entry.lsn, 2);
}

// =============================================================================
// Truncation Tests
// =============================================================================

#[test]
fn test_short_header_is_truncated() {
    let bytes = put_entry(1).serialize().unwrap();

    let err = LogEntry::deserialize(&bytes[..HEADER_SIZE - 1]).unwrap_err();
    assert!(matches!(err, PhoneBookError::LogTruncated { .. }));
}

#[test]
fn test_partial_data_is_truncated() {
    let bytes = put_entry(1).serialize().unwrap();

    let err = LogEntry::deserialize(&bytes[..bytes.len() - 1]).unwrap_err();
    match err {
        PhoneBookError::LogTruncated { needed, available } => {
            assert_eq!(needed, bytes.len());
            assert_eq!(available, bytes.len() - 1);
        }
        other => panic!("expected LogTruncated, got {:?}", other),
    }
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_flipped_data_byte_fails_crc() {
    let mut bytes = put_entry(1).serialize().unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;

    let err = LogEntry::deserialize(&bytes).unwrap_err();
    assert!(matches!(err, PhoneBookError::LogCorruption(_)));
}

#[test]
fn test_header_lsn_mismatch_is_corruption() {
    let mut bytes = put_entry(7).serialize().unwrap();
    bytes[0..8].copy_from_slice(&8u64.to_le_bytes());

    let err = LogEntry::deserialize(&bytes).unwrap_err();
    assert!(matches!(err, PhoneBookError::LogCorruption(_)));
}

#[test]
fn test_oversized_length_is_corruption() {
    let mut header = vec![0u8; HEADER_SIZE];
    header[12..16].copy_from_slice(&((MAX_ENTRY_SIZE as u32) + 1).to_le_bytes());

    let err = LogEntry::frame_len(&header).unwrap_err();
    assert!(matches!(err, PhoneBookError::LogCorruption(_)));
}
