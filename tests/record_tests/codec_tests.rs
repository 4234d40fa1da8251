//! Tests for the stored record encoding

use phonebook::error::PhoneBookError;
use phonebook::record::codec;
use phonebook::{Entry, Record};

fn full_entry() -> Entry {
    Entry {
        first_name: "Zoë".to_string(),
        telephone: "+44 20 7946 0000".to_string(),
        address_line1: "1 High Street".to_string(),
        address_line2: String::new(),
        town_or_city: "London".to_string(),
        county_or_state: "Greater London".to_string(),
        country: "UK".to_string(),
        postal_code: "N1 1AA".to_string(),
    }
}

#[test]
fn test_round_trip_preserves_fields_and_order() {
    let mut record = Record::new("O'Brien", full_entry());
    record.upsert(Entry::new("Al", ""));

    let bytes = codec::encode(&record).unwrap();
    assert_eq!(codec::decode(&bytes).unwrap(), record);
}

#[test]
fn test_decode_garbage_fails() {
    let err = codec::decode(&[0xFF, 0xFF, 0xFF, 0xFF, 0x01]).unwrap_err();
    assert!(matches!(err, PhoneBookError::Decode(_)));
}

#[test]
fn test_decode_empty_fails() {
    assert!(codec::decode(&[]).is_err());
}

#[test]
fn test_decode_rejects_trailing_bytes() {
    let record = Record::new("Smith", Entry::new("John", "111"));
    let mut bytes = codec::encode(&record).unwrap();
    bytes.push(0);

    assert!(codec::decode(&bytes).unwrap_err().is_decode());
}

#[test]
fn test_decode_truncated_fails() {
    let record = Record::new("Smith", full_entry());
    let bytes = codec::encode(&record).unwrap();

    assert!(codec::decode(&bytes[..bytes.len() - 3]).is_err());
}
