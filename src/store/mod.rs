//! Store Module
//!
//! The merge-on-write phone book over a key-value engine.
//!
//! ## Responsibilities
//! - Own the engine and the keyspace for the lifetime of the handle
//! - Merge single-entry updates into the stored record for a surname
//! - Compact a record away once its last entry is deleted
//! - Serialize every operation through one readers-writer lock
//!
//! ## Operations
//! ```text
//! upsert_entry   [write]  get → merge → put
//! get_record     [read]   get
//! get_entry      [read]   get → scan entries
//! delete_record  [write]  delete
//! delete_entry   [write]  get → remove → put | delete
//! list_all       [read]   for_each, lock held until the listing is dropped
//! ```

mod listing;

use std::sync::Arc;

pub use listing::Listing;

use crate::config::Config;
use crate::error::{PhoneBookError, Result};
use crate::guard::StoreLock;
use crate::kv::{FileEngine, KvEngine};
use crate::record::{codec, document, DeleteOutcome, Entry, Record, UpsertOutcome};

/// Handle to an open phone book
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct PhoneBook {
    /// Storage engine (individually atomic operations only)
    engine: Arc<dyn KvEngine>,

    /// Keyspace holding one record per surname
    keyspace: String,

    /// Orders every operation relative to every other
    lock: StoreLock,
}

impl PhoneBook {
    /// Open the backing file described by `config`, creating it if absent,
    /// and make sure the keyspace exists
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;
        let engine = FileEngine::open_with_config(config)?;
        tracing::info!(
            "Opened phone book at {} (keyspace '{}')",
            config.data_file.display(),
            config.keyspace
        );
        Self::with_engine(Arc::new(engine), config.keyspace.clone())
    }

    /// Build a store over an existing engine
    pub fn with_engine(engine: Arc<dyn KvEngine>, keyspace: impl Into<String>) -> Result<Self> {
        let keyspace = keyspace.into();
        if keyspace.is_empty() {
            return Err(PhoneBookError::Config("keyspace must not be empty".to_string()));
        }
        engine.ensure_keyspace(&keyspace)?;

        Ok(Self {
            engine,
            keyspace,
            lock: StoreLock::new(),
        })
    }

    /// Insert an entry, or replace the entry with the same first name
    pub fn upsert_entry(&self, surname: &str, entry: Entry) -> Result<UpsertOutcome> {
        if surname.is_empty() {
            return Err(PhoneBookError::InvalidInput("surname must not be empty".to_string()));
        }
        if entry.first_name.is_empty() {
            return Err(PhoneBookError::InvalidInput(
                "first name must not be empty".to_string(),
            ));
        }

        self.lock.with_write(|| {
            let (record, outcome) = match self.load(surname)? {
                None => (Record::new(surname, entry), UpsertOutcome::Created),
                Some(mut record) => {
                    let outcome = record.upsert(entry);
                    (record, outcome)
                }
            };

            if outcome != UpsertOutcome::Unchanged {
                self.save(&record)?;
            }
            tracing::debug!("upsert {}: {}", surname, outcome.as_str());
            Ok(outcome)
        })
    }

    /// Decode an update document and merge its entry
    ///
    /// A malformed document fails before the store is touched.
    pub fn apply_update(&self, payload: &[u8]) -> Result<UpsertOutcome> {
        let (surname, entry) = document::parse_update(payload)?;
        self.upsert_entry(&surname, entry)
    }

    /// Get the whole record for a surname
    pub fn get_record(&self, surname: &str) -> Result<Record> {
        self.lock.with_read(|| {
            self.load(surname)?
                .ok_or_else(|| PhoneBookError::RecordNotFound(surname.to_string()))
        })
    }

    /// Get one entry by surname and first name
    pub fn get_entry(&self, surname: &str, first_name: &str) -> Result<Entry> {
        self.lock.with_read(|| {
            let record = self
                .load(surname)?
                .ok_or_else(|| PhoneBookError::RecordNotFound(surname.to_string()))?;

            record
                .entry(first_name)
                .cloned()
                .ok_or_else(|| PhoneBookError::EntryNotFound {
                    surname: surname.to_string(),
                    first_name: first_name.to_string(),
                })
        })
    }

    /// Delete a whole record; deleting an absent surname succeeds
    pub fn delete_record(&self, surname: &str) -> Result<()> {
        self.lock.with_write(|| {
            self.engine.delete(&self.keyspace, surname.as_bytes())?;
            tracing::debug!("delete record {}", surname);
            Ok(())
        })
    }

    /// Delete one entry, removing the record if it was the last
    ///
    /// An absent surname or first name is a silent success (`Unchanged`).
    pub fn delete_entry(&self, surname: &str, first_name: &str) -> Result<DeleteOutcome> {
        self.lock.with_write(|| {
            let Some(mut record) = self.load(surname)? else {
                return Ok(DeleteOutcome::Unchanged);
            };
            if record.remove(first_name).is_none() {
                return Ok(DeleteOutcome::Unchanged);
            }

            let outcome = if record.is_empty() {
                self.engine.delete(&self.keyspace, surname.as_bytes())?;
                DeleteOutcome::Compacted
            } else {
                self.save(&record)?;
                DeleteOutcome::Removed
            };
            tracing::debug!("delete entry {} {}: {:?}", first_name, surname, outcome);
            Ok(outcome)
        })
    }

    /// Enumerate every record
    ///
    /// The returned listing keeps the read lock until it is dropped. Read
    /// operations may be called while it is alive; a write operation on the
    /// same thread would deadlock.
    ///
    /// The rows are copied out of the engine up front, so memory grows with
    /// the keyspace. Only decoding happens as the listing advances.
    pub fn list_all(&self) -> Result<Listing<'_>> {
        let guard = self.lock.read();

        let mut rows = Vec::new();
        self.engine
            .for_each(&self.keyspace, &mut |key: &[u8], value: &[u8]| {
                rows.push((key.to_vec(), value.to_vec()))
            })?;

        Ok(Listing::new(guard, rows))
    }

    /// Render every readable record as a listing document
    ///
    /// Corrupted records are skipped with a warning.
    pub fn export_listing(&self) -> Result<Vec<u8>> {
        let mut records = Vec::new();
        for item in self.list_all()? {
            match item {
                Ok(record) => records.push(record),
                Err(e) if e.is_decode() => tracing::warn!("Skipping record in listing: {}", e),
                Err(e) => return Err(e),
            }
        }
        document::encode_listing(records)
    }

    /// Keyspace this store lives in
    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    /// Flush the engine and release the handle
    pub fn close(self) -> Result<()> {
        self.lock.with_write(|| self.engine.sync())?;
        tracing::info!("Closed phone book (keyspace '{}')", self.keyspace);
        Ok(())
    }

    // =========================================================================
    // Private Helpers (caller holds the lock)
    // =========================================================================

    fn load(&self, surname: &str) -> Result<Option<Record>> {
        self.engine
            .get(&self.keyspace, surname.as_bytes())?
            .map(|bytes| decode_stored(surname, &bytes))
            .transpose()
    }

    fn save(&self, record: &Record) -> Result<()> {
        let bytes = codec::encode(record)?;
        self.engine
            .put(&self.keyspace, record.surname.as_bytes(), &bytes)
    }
}

/// Decode a stored payload, checking it against the key it was stored under
fn decode_stored(surname: &str, bytes: &[u8]) -> Result<Record> {
    let corrupt = |reason: String| PhoneBookError::CorruptRecord {
        surname: surname.to_string(),
        reason,
    };

    let record = codec::decode(bytes).map_err(|e| corrupt(e.to_string()))?;
    if record.surname != surname {
        return Err(corrupt(format!(
            "stored under '{}' but names '{}'",
            surname, record.surname
        )));
    }
    if record.is_empty() {
        return Err(corrupt("record has no entries".to_string()));
    }
    Ok(record)
}
