//! Keyspace index
//!
//! In-memory view of every keyspace, shared by the file and memory engines.
//! BTreeMap gives the ascending key order `for_each` promises.

use std::collections::BTreeMap;

use crate::error::{PhoneBookError, Result};

use super::Operation;

type Space = BTreeMap<Vec<u8>, Vec<u8>>;

/// Named keyspaces, each an ordered key-value map
#[derive(Debug, Default)]
pub(crate) struct Keyspaces {
    spaces: BTreeMap<String, Space>,
}

impl Keyspaces {
    pub fn contains(&self, name: &str) -> bool {
        self.spaces.contains_key(name)
    }

    /// Returns false if the keyspace already existed
    pub fn create(&mut self, name: &str) -> bool {
        if self.spaces.contains_key(name) {
            return false;
        }
        self.spaces.insert(name.to_string(), Space::new());
        true
    }

    /// Returns the number of keys discarded, or None if absent
    pub fn drop_space(&mut self, name: &str) -> Option<usize> {
        self.spaces.remove(name).map(|space| space.len())
    }

    pub fn space(&self, name: &str) -> Result<&Space> {
        self.spaces
            .get(name)
            .ok_or_else(|| PhoneBookError::KeyspaceNotFound(name.to_string()))
    }

    fn space_mut(&mut self, name: &str) -> Result<&mut Space> {
        self.spaces
            .get_mut(name)
            .ok_or_else(|| PhoneBookError::KeyspaceNotFound(name.to_string()))
    }

    pub fn get(&self, keyspace: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.space(keyspace)?.get(key).cloned())
    }

    /// Returns true if an existing value was overwritten
    pub fn put(&mut self, keyspace: &str, key: Vec<u8>, value: Vec<u8>) -> Result<bool> {
        Ok(self.space_mut(keyspace)?.insert(key, value).is_some())
    }

    /// Returns true if the key existed
    pub fn delete(&mut self, keyspace: &str, key: &[u8]) -> Result<bool> {
        Ok(self.space_mut(keyspace)?.remove(key).is_some())
    }

    /// Replay one logged operation, returning how many log entries it made stale
    pub fn apply(&mut self, operation: Operation) -> u64 {
        match operation {
            Operation::CreateKeyspace { name } => {
                if self.create(&name) {
                    0
                } else {
                    1
                }
            }
            Operation::DropKeyspace { name } => match self.drop_space(&name) {
                Some(keys) => keys as u64 + 2,
                None => 1,
            },
            Operation::Put {
                keyspace,
                key,
                value,
            } => match self.put(&keyspace, key, value) {
                Ok(true) => 1,
                Ok(false) => 0,
                Err(_) => {
                    tracing::warn!("Dropping put into unknown keyspace '{}'", keyspace);
                    1
                }
            },
            Operation::Delete { keyspace, key } => match self.delete(&keyspace, &key) {
                Ok(true) => 2,
                Ok(false) | Err(_) => 1,
            },
        }
    }

    /// Iterate over (keyspace name, contents)
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Space)> {
        self.spaces.iter()
    }

    /// Total keys across all keyspaces
    pub fn key_count(&self) -> usize {
        self.spaces.values().map(|space| space.len()).sum()
    }
}
