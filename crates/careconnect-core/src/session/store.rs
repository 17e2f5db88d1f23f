//! Key-value storage for the credential and session-scoped data.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::Result;

/// Storage slot holding the raw credential.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Storage slot holding the cached user profile (JSON).
pub const USER_STORAGE_KEY: &str = "user-storage";

/// Persistent key-value slots backing a session.
///
/// Implementations must make `remove` of a missing key succeed.
pub trait CredentialStore: Send + Sync {
    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T> CredentialStore for Arc<T>
where
    T: CredentialStore + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.as_ref().get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.as_ref().set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.as_ref().remove(key)
    }
}

/// In-process [`CredentialStore`]; contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with `value` already in the credential slot.
    pub fn with_credential(value: impl Into<String>) -> Self {
        let store = Self::new();
        store
            .slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(ACCESS_TOKEN_KEY.to_owned(), value.into());
        store
    }

    /// Returns `true` if `key` holds a value.
    pub fn contains(&self, key: &str) -> bool {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots.remove(key);
        Ok(())
    }
}
