use std::{collections::HashMap, sync::Mutex};

use super::{KeyValue, StorageError};

/// Process-local storage, for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // a poisoned map is still a usable map
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValue for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

/// Memory storage whose reads of one key can be made to fail.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FlakyStorage {
    pub(crate) inner: MemoryStorage,
    failing: Mutex<Option<String>>,
}

#[cfg(test)]
impl FlakyStorage {
    pub(crate) fn fail_reads_of(&self, key: Option<&str>) {
        *self.failing.lock().unwrap() = key.map(str::to_owned);
    }
}

#[cfg(test)]
impl KeyValue for FlakyStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.failing.lock().unwrap().as_deref() == Some(key) {
            return Err(std::io::Error::other("disk went away").into());
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}
