//! Record codec
//!
//! Binary encoding of a record as stored under its surname key.
//!
//! Uses bincode with varint lengths, a hard size limit and trailing-byte
//! rejection, so arbitrary garbage fails to decode instead of allocating or
//! half-parsing.

use bincode::Options;

use crate::error::{PhoneBookError, Result};

use super::Record;

/// Maximum encoded record size (16 MB)
pub const MAX_RECORD_SIZE: u64 = 16 * 1024 * 1024;

fn options() -> impl Options {
    bincode::DefaultOptions::new().with_limit(MAX_RECORD_SIZE)
}

/// Encode a record to bytes
pub fn encode(record: &Record) -> Result<Vec<u8>> {
    options()
        .serialize(record)
        .map_err(|e| PhoneBookError::Serialization(e.to_string()))
}

/// Decode a record from bytes
pub fn decode(bytes: &[u8]) -> Result<Record> {
    options()
        .deserialize(bytes)
        .map_err(|e| PhoneBookError::Decode(e.to_string()))
}
