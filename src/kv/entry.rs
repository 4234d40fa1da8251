//! Log entry definitions
//!
//! Defines the structure and framing of individual log entries.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{PhoneBookError, Result};

/// Frame header: LSN (8) + CRC (4) + Len (4)
pub const HEADER_SIZE: usize = 16;

/// Largest data section accepted when reading a frame (64 MB)
pub const MAX_ENTRY_SIZE: usize = 64 * 1024 * 1024;

/// A single entry in the backing file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// The operation to apply
    pub operation: Operation,

    /// Timestamp (unix millis) when entry was created
    pub timestamp: u64,
}

/// Operations that can be logged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Create a keyspace (no-op if it exists)
    CreateKeyspace { name: String },

    /// Drop a keyspace and every key in it
    DropKeyspace { name: String },

    /// Put a key-value pair
    Put {
        keyspace: String,
        key: Vec<u8>,
        value: Vec<u8>,
    },

    /// Delete a key
    Delete { keyspace: String, key: Vec<u8> },
}

impl LogEntry {
    /// Create an entry stamped with the current time
    pub fn new(lsn: u64, operation: Operation) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();

        Self {
            lsn,
            operation,
            timestamp,
        }
    }

    /// Serialize into a frame: [lsn][crc][len][data]
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let data =
            bincode::serialize(self).map_err(|e| PhoneBookError::Serialization(e.to_string()))?;

        if data.len() > MAX_ENTRY_SIZE {
            return Err(PhoneBookError::Serialization(format!(
                "log entry too large: {} bytes (max {})",
                data.len(),
                MAX_ENTRY_SIZE
            )));
        }

        let mut frame = Vec::with_capacity(HEADER_SIZE + data.len());
        frame.extend_from_slice(&self.lsn.to_le_bytes());
        frame.extend_from_slice(&Self::compute_crc(&data).to_le_bytes());
        frame.extend_from_slice(&(data.len() as u32).to_le_bytes());
        frame.extend_from_slice(&data);

        Ok(frame)
    }

    /// Deserialize one frame from the front of `bytes`
    ///
    /// Returns the entry and the number of bytes consumed.
    /// - `LogTruncated`: the frame is incomplete (partial write)
    /// - `LogCorruption`: the frame is complete but fails validation
    pub fn deserialize(bytes: &[u8]) -> Result<(Self, usize)> {
        let frame_len = Self::frame_len(bytes)?;

        let lsn = u64::from_le_bytes(read_array(&bytes[0..8]));
        let crc = u32::from_le_bytes(read_array(&bytes[8..12]));
        let data = &bytes[HEADER_SIZE..frame_len];

        let actual = Self::compute_crc(data);
        if actual != crc {
            return Err(PhoneBookError::LogCorruption(format!(
                "CRC mismatch at lsn {}: expected {:08x}, got {:08x}",
                lsn, crc, actual
            )));
        }

        let entry: LogEntry = bincode::deserialize(data)
            .map_err(|e| PhoneBookError::LogCorruption(format!("undecodable entry: {}", e)))?;

        if entry.lsn != lsn {
            return Err(PhoneBookError::LogCorruption(format!(
                "header lsn {} does not match entry lsn {}",
                lsn, entry.lsn
            )));
        }

        Ok((entry, frame_len))
    }

    /// Total length of the frame at the front of `bytes`, header included
    ///
    /// Only the header is inspected; the data section is not validated.
    pub fn frame_len(bytes: &[u8]) -> Result<usize> {
        if bytes.len() < HEADER_SIZE {
            return Err(PhoneBookError::LogTruncated {
                needed: HEADER_SIZE,
                available: bytes.len(),
            });
        }

        let data_len = u32::from_le_bytes(read_array(&bytes[12..16])) as usize;
        if data_len > MAX_ENTRY_SIZE {
            return Err(PhoneBookError::LogCorruption(format!(
                "entry length {} exceeds maximum {}",
                data_len, MAX_ENTRY_SIZE
            )));
        }

        let needed = HEADER_SIZE + data_len;
        if bytes.len() < needed {
            return Err(PhoneBookError::LogTruncated {
                needed,
                available: bytes.len(),
            });
        }

        Ok(needed)
    }

    /// CRC32 of a data section
    pub fn compute_crc(data: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(data);
        hasher.finalize()
    }
}

fn read_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}
