//! Record Module
//!
//! The unit of storage: one record per surname, holding the entries of
//! everyone sharing it.
//!
//! ## Invariants
//! - A persisted record has at least one entry
//! - No two entries of a record share a first name
//! - The storage key of a record is its surname, which never changes
//!
//! ## Encodings
//! - `codec`: compact binary form stored under the surname key
//! - `document`: JSON forms exchanged with clients

pub mod codec;
pub mod document;

use serde::{Deserialize, Serialize};

/// One person's contact data under a shared surname
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "FirstName", alias = "Firstname")]
    pub first_name: String,

    #[serde(rename = "TelNo", default)]
    pub telephone: String,

    #[serde(rename = "Line1", default)]
    pub address_line1: String,

    #[serde(rename = "Line2", default)]
    pub address_line2: String,

    #[serde(rename = "TownCity", default)]
    pub town_or_city: String,

    #[serde(rename = "CountyState", default)]
    pub county_or_state: String,

    #[serde(rename = "Country", default)]
    pub country: String,

    #[serde(rename = "ZipPostal", default)]
    pub postal_code: String,
}

impl Entry {
    /// Create an entry with only a first name and telephone number
    pub fn new(first_name: impl Into<String>, telephone: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            telephone: telephone.into(),
            ..Default::default()
        }
    }
}

/// The persisted unit per surname
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Surname")]
    pub surname: String,

    #[serde(rename = "Entries")]
    pub entries: Vec<Entry>,
}

/// How an upsert changed a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No record existed; a new one was created
    Created,

    /// The entry was appended to an existing record
    Inserted,

    /// An entry with the same first name was replaced in place
    Replaced,

    /// An identical entry was already stored
    Unchanged,
}

impl UpsertOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpsertOutcome::Created => "created",
            UpsertOutcome::Inserted => "inserted",
            UpsertOutcome::Replaced => "replaced",
            UpsertOutcome::Unchanged => "unchanged",
        }
    }
}

/// How a delete-by-first-name changed a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Nothing matched; the stored state is untouched
    Unchanged,

    /// The entry was removed and the shortened record stored
    Removed,

    /// The last entry was removed and the whole record deleted
    Compacted,
}

impl Record {
    /// Create a record holding a single entry
    pub fn new(surname: impl Into<String>, entry: Entry) -> Self {
        Self {
            surname: surname.into(),
            entries: vec![entry],
        }
    }

    /// Find an entry by exact first name
    pub fn entry(&self, first_name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.first_name == first_name)
    }

    /// Merge an entry into this record
    ///
    /// Replaces the first entry with the same first name, keeping its
    /// position, or appends when none matches. Never returns `Created`.
    pub fn upsert(&mut self, entry: Entry) -> UpsertOutcome {
        match self
            .entries
            .iter_mut()
            .find(|e| e.first_name == entry.first_name)
        {
            Some(existing) if *existing == entry => UpsertOutcome::Unchanged,
            Some(existing) => {
                *existing = entry;
                UpsertOutcome::Replaced
            }
            None => {
                self.entries.push(entry);
                UpsertOutcome::Inserted
            }
        }
    }

    /// Remove the first entry with the given first name
    ///
    /// Returns the removed entry. The record may be left empty; callers
    /// must delete an empty record rather than persist it.
    pub fn remove(&mut self, first_name: &str) -> Option<Entry> {
        let pos = self.entries.iter().position(|e| e.first_name == first_name)?;
        Some(self.entries.remove(pos))
    }

    /// True once every entry has been removed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
