//! In-memory engine
//!
//! Same contract as the file engine with nothing persisted.

use parking_lot::RwLock;

use crate::error::Result;

use super::keyspace::Keyspaces;
use super::KvEngine;

/// Volatile engine, useful for tests and throwaway stores
#[derive(Debug, Default)]
pub struct MemoryEngine {
    index: RwLock<Keyspaces>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total keys across all keyspaces
    pub fn key_count(&self) -> usize {
        self.index.read().key_count()
    }
}

impl KvEngine for MemoryEngine {
    fn ensure_keyspace(&self, keyspace: &str) -> Result<()> {
        self.index.write().create(keyspace);
        Ok(())
    }

    fn drop_keyspace(&self, keyspace: &str) -> Result<bool> {
        Ok(self.index.write().drop_space(keyspace).is_some())
    }

    fn get(&self, keyspace: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.index.read().get(keyspace, key)
    }

    fn put(&self, keyspace: &str, key: &[u8], value: &[u8]) -> Result<()> {
        self.index
            .write()
            .put(keyspace, key.to_vec(), value.to_vec())
            .map(|_| ())
    }

    fn delete(&self, keyspace: &str, key: &[u8]) -> Result<()> {
        self.index.write().delete(keyspace, key).map(|_| ())
    }

    fn for_each(&self, keyspace: &str, visit: &mut dyn FnMut(&[u8], &[u8])) -> Result<()> {
        let index = self.index.read();
        for (key, value) in index.space(keyspace)? {
            visit(key.as_slice(), value.as_slice());
        }
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        Ok(())
    }
}
