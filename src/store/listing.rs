//! Listing
//!
//! Enumeration of every stored record under one shared lock section.

use std::vec::IntoIter;

use parking_lot::RwLockReadGuard;

use crate::error::Result;
use crate::record::Record;

use super::decode_stored;

/// Iterator over every record, in ascending surname order
///
/// Holds the store's read lock until dropped, so no write can land while a
/// listing is alive. The raw rows are a snapshot taken when the listing is
/// created; payloads are decoded as the iterator advances. A
/// corrupted payload yields `Err(CorruptRecord)` for that record only and
/// the iteration continues with the next one.
pub struct Listing<'a> {
    _guard: RwLockReadGuard<'a, ()>,
    rows: IntoIter<(Vec<u8>, Vec<u8>)>,
}

impl<'a> Listing<'a> {
    pub(super) fn new(guard: RwLockReadGuard<'a, ()>, rows: Vec<(Vec<u8>, Vec<u8>)>) -> Self {
        Self {
            _guard: guard,
            rows: rows.into_iter(),
        }
    }

    /// Records not yet yielded
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl Iterator for Listing<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = self.rows.next()?;
        let surname = String::from_utf8_lossy(&key);
        Some(decode_stored(&surname, &value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}
