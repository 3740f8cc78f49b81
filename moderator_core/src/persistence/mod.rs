//! Persistence port - where session snapshots are kept between reloads.
//!
//! The store is a plain key-value interface, shaped like browser local
//! storage. Snapshots are the JSON form of [`SessionState`].

use std::collections::HashMap;

use werewolf_rules::SessionState;

use crate::error::StoreError;

/// Key-value storage for session snapshots.
#[cfg_attr(test, mockall::automock)]
pub trait SessionStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store, for tests and for running without storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

impl<S: SessionStore + ?Sized> SessionStore for Box<S> {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).save(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Serialize a session into its stored form.
pub fn encode_snapshot(state: &SessionState) -> Result<String, StoreError> {
    Ok(serde_json::to_string(state)?)
}

/// Parse a stored snapshot, rejecting records that break session invariants.
pub fn decode_snapshot(raw: &str) -> Result<SessionState, StoreError> {
    let state: SessionState = serde_json::from_str(raw)?;
    state.check_invariants().map_err(StoreError::Corrupted)?;
    Ok(state)
}

/// Read the snapshot under `key`, if one exists.
pub fn load_snapshot(
    store: &dyn SessionStore,
    key: &str,
) -> Result<Option<SessionState>, StoreError> {
    match store.load(key)? {
        Some(raw) => decode_snapshot(&raw).map(Some),
        None => Ok(None),
    }
}
