//! JSON documents
//!
//! The shapes clients send and receive:
//!
//! ```text
//! update:  {"Surname":"Smith","Entries":[{"FirstName":"John","TelNo":"...",...}]}
//! record:  {"Surname":"Smith","Entries":[...]}
//! listing: {"Phone Book":[{"Surname":...,"Entries":[...]}, ...]}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{PhoneBookError, Result};

use super::{Entry, Record};

#[derive(Serialize, Deserialize)]
struct Listing {
    #[serde(rename = "Phone Book")]
    records: Vec<Record>,
}

/// Parse an update document into its surname and single entry
///
/// Malformed JSON is a decode error; a well-formed document carrying
/// anything but exactly one entry, or empty names, is invalid input.
pub fn parse_update(payload: &[u8]) -> Result<(String, Entry)> {
    let mut record: Record =
        serde_json::from_slice(payload).map_err(|e| PhoneBookError::Decode(e.to_string()))?;

    if record.surname.is_empty() {
        return Err(PhoneBookError::InvalidInput(
            "update document has an empty surname".to_string(),
        ));
    }
    if record.entries.len() != 1 {
        return Err(PhoneBookError::InvalidInput(format!(
            "update document must carry exactly one entry, got {}",
            record.entries.len()
        )));
    }

    let entry = record.entries.remove(0);
    if entry.first_name.is_empty() {
        return Err(PhoneBookError::InvalidInput(
            "update entry has an empty first name".to_string(),
        ));
    }

    Ok((record.surname, entry))
}

/// Build the update document for one entry
pub fn encode_update(surname: &str, entry: &Entry) -> Result<Vec<u8>> {
    encode_record(&Record::new(surname, entry.clone()))
}

pub fn encode_record(record: &Record) -> Result<Vec<u8>> {
    to_json(record)
}

pub fn decode_record(bytes: &[u8]) -> Result<Record> {
    from_json(bytes)
}

pub fn encode_entry(entry: &Entry) -> Result<Vec<u8>> {
    to_json(entry)
}

pub fn decode_entry(bytes: &[u8]) -> Result<Entry> {
    from_json(bytes)
}

/// Wrap records into the listing document
pub fn encode_listing(records: Vec<Record>) -> Result<Vec<u8>> {
    to_json(&Listing { records })
}

pub fn decode_listing(bytes: &[u8]) -> Result<Vec<Record>> {
    from_json::<Listing>(bytes).map(|listing| listing.records)
}

fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| PhoneBookError::Serialization(e.to_string()))
}

fn from_json<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| PhoneBookError::Decode(e.to_string()))
}
