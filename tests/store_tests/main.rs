//! Tests for the phone book store


use std::sync::Arc;

use phonebook::kv::MemoryEngine;
use phonebook::{Entry, PhoneBook};

pub const KEYSPACE: &str = "phoneBook";

/// Store over a fresh in-memory engine
pub fn memory_store() -> PhoneBook {
    PhoneBook::with_engine(Arc::new(MemoryEngine::new()), KEYSPACE).unwrap()
}

/// Store plus a handle on its engine, for planting raw bytes
pub fn memory_store_with_engine() -> (PhoneBook, Arc<MemoryEngine>) {
    let engine = Arc::new(MemoryEngine::new());
    let store = PhoneBook::with_engine(engine.clone(), KEYSPACE).unwrap();
    (store, engine)
}

pub fn john() -> Entry {
    Entry {
        first_name: "John".to_string(),
        telephone: "1234567890".to_string(),
        address_line1: "1 Main Street".to_string(),
        address_line2: "Flat 2".to_string(),
        town_or_city: "Springfield".to_string(),
        county_or_state: "IL".to_string(),
        country: "USA".to_string(),
        postal_code: "62701".to_string(),
    }
}

pub fn jane() -> Entry {
    Entry::new("Jane", "0987654321")
}
