//! Tests for the JSON documents exchanged with clients
//!
//! These tests verify:
//! - Update documents parse to exactly one entry
//! - Field names and the legacy `Firstname` alias
//! - Malformed versus invalid input are told apart
//! - The listing document shape

use phonebook::error::PhoneBookError;
use phonebook::record::document;
use phonebook::{Entry, Record};

// =============================================================================
// Update Document Tests
// =============================================================================

#[test]
fn test_parse_update() {
    let payload = br#"{
        "Surname": "Smith",
        "Entries": [{
            "FirstName": "John",
            "TelNo": "01234",
            "Line1": "1 Road",
            "TownCity": "Leeds",
            "ZipPostal": "LS1"
        }]
    }"#;

    let (surname, entry) = document::parse_update(payload).unwrap();

    assert_eq!(surname, "Smith");
    assert_eq!(entry.first_name, "John");
    assert_eq!(entry.telephone, "01234");
    assert_eq!(entry.address_line1, "1 Road");
    assert_eq!(entry.town_or_city, "Leeds");
    assert_eq!(entry.postal_code, "LS1");
    assert_eq!(entry.address_line2, "");
    assert_eq!(entry.country, "");
}

#[test]
fn test_parse_update_accepts_firstname_alias() {
    let payload = br#"{"Surname":"Smith","Entries":[{"Firstname":"John","TelNo":"1"}]}"#;

    let (_, entry) = document::parse_update(payload).unwrap();
    assert_eq!(entry.first_name, "John");
}

#[test]
fn test_parse_update_malformed_json() {
    let err = document::parse_update(b"{\"Surname\": \"Smith\",").unwrap_err();

    assert!(matches!(err, PhoneBookError::Decode(_)));
    assert!(err.is_bad_request());
}

#[test]
fn test_parse_update_requires_exactly_one_entry() {
    let none = br#"{"Surname":"Smith","Entries":[]}"#;
    let two = br#"{"Surname":"Smith","Entries":[{"FirstName":"A"},{"FirstName":"B"}]}"#;

    for payload in [&none[..], &two[..]] {
        let err = document::parse_update(payload).unwrap_err();
        assert!(matches!(err, PhoneBookError::InvalidInput(_)));
    }
}

#[test]
fn test_parse_update_rejects_empty_names() {
    let no_surname = br#"{"Surname":"","Entries":[{"FirstName":"A"}]}"#;
    let no_first = br#"{"Surname":"Smith","Entries":[{"FirstName":""}]}"#;

    for payload in [&no_surname[..], &no_first[..]] {
        assert!(matches!(
            document::parse_update(payload),
            Err(PhoneBookError::InvalidInput(_))
        ));
    }
}

#[test]
fn test_encode_update_parses_back() {
    let entry = Entry::new("Jane", "555");
    let payload = document::encode_update("Doe", &entry).unwrap();

    assert_eq!(
        document::parse_update(&payload).unwrap(),
        ("Doe".to_string(), entry)
    );
}

// =============================================================================
// Record / Entry Document Tests
// =============================================================================

#[test]
fn test_record_document_field_names() {
    let record = Record::new("Smith", Entry::new("John", "1"));
    let json: serde_json::Value =
        serde_json::from_slice(&document::encode_record(&record).unwrap()).unwrap();

    assert_eq!(json["Surname"], "Smith");
    assert_eq!(json["Entries"][0]["FirstName"], "John");
    assert_eq!(json["Entries"][0]["TelNo"], "1");
    assert_eq!(json["Entries"][0]["CountyState"], "");
}

#[test]
fn test_entry_document() {
    let entry = Entry::new("John", "1");
    let bytes = document::encode_entry(&entry).unwrap();

    assert_eq!(document::decode_entry(&bytes).unwrap(), entry);
}

// =============================================================================
// Listing Document Tests
// =============================================================================

#[test]
fn test_listing_document_shape() {
    let records = vec![
        Record::new("Adams", Entry::new("Ann", "1")),
        Record::new("Brown", Entry::new("Bob", "2")),
    ];
    let bytes = document::encode_listing(records.clone()).unwrap();

    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["Phone Book"].as_array().unwrap().len(), 2);
    assert_eq!(json["Phone Book"][1]["Surname"], "Brown");

    assert_eq!(document::decode_listing(&bytes).unwrap(), records);
}

#[test]
fn test_empty_listing_document() {
    let bytes = document::encode_listing(Vec::new()).unwrap();
    assert_eq!(bytes, br#"{"Phone Book":[]}"#.to_vec());
}
