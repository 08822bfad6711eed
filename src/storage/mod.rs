//! Key-value persistence for the room collection.
//!
//! The whole collection lives under one key as a JSON array and is rewritten
//! on every save. A sibling key records the format version.

mod file;
mod memory;

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::model::ChatRoom;

pub use file::FileStorage;
pub use memory::MemoryStorage;
#[cfg(test)]
pub(crate) use memory::FlakyStorage;

pub const ROOMS_KEY: &str = "quietrooms_rooms";
pub const VERSION_KEY: &str = "quietrooms_rooms_version";
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not encode rooms: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("value under {0:?} is not utf-8")]
    NotUtf8(String),
}

/// Minimal local-storage surface: string values under string keys.
pub trait KeyValue {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValue + ?Sized> KeyValue for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<T: KeyValue + ?Sized> KeyValue for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Reads and writes the room collection through any [`KeyValue`].
#[derive(Debug, Clone)]
pub struct RoomStorage<S> {
    kv: S,
}

impl<S: KeyValue> RoomStorage<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// Loads the collection, treating a missing, corrupt or malformed entry as empty.
    /// A corrupt entry is removed so the next load does not trip over it again.
    pub fn load_rooms(&self) -> Vec<ChatRoom> {
        match self.try_load_rooms() {
            Ok(Some(rooms)) => rooms,
            Ok(None) => Vec::new(),
            Err(e) => {
                error!(key = ROOMS_KEY, "could not read rooms: {e}");
                Vec::new()
            }
        }
    }

    /// `Ok(None)` when nothing usable is stored. `Err` means storage could not
    /// be read at all, and what it holds is unknown.
    pub fn try_load_rooms(&self) -> Result<Option<Vec<ChatRoom>>, StorageError> {
        let raw = match self.kv.get(ROOMS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(None),
            Err(StorageError::NotUtf8(_)) => return self.discard_corrupt("not utf-8"),
            Err(e) => return Err(e),
        };

        self.check_version();

        match serde_json::from_str::<Vec<ChatRoom>>(&raw) {
            Ok(rooms) => Ok(Some(rooms)),
            Err(e) => self.discard_corrupt(&e.to_string()),
        }
    }

    fn discard_corrupt(&self, reason: &str) -> Result<Option<Vec<ChatRoom>>, StorageError> {
        warn!(key = ROOMS_KEY, "discarding corrupt rooms entry: {reason}");
        self.kv.remove(ROOMS_KEY)?;
        Ok(None)
    }

    /// The version is advisory: nothing found here stops the load.
    fn check_version(&self) {
        match self.kv.get(VERSION_KEY) {
            Ok(Some(version)) => match version.trim().parse::<u32>() {
                Ok(v) if v > SCHEMA_VERSION => {
                    warn!(key = VERSION_KEY, "stored rooms have schema version {v}, newer than {SCHEMA_VERSION}");
                }
                Ok(_) => {}
                Err(_) => warn!(key = VERSION_KEY, "unreadable schema version {version:?}"),
            },
            Ok(None) => {}
            Err(e) => warn!(key = VERSION_KEY, "could not read schema version: {e}"),
        }
    }

    /// Overwrites the stored collection. Errors are logged and swallowed.
    pub fn save_rooms(&self, rooms: &[ChatRoom]) {
        if let Err(e) = self.try_save_rooms(rooms) {
            error!(key = ROOMS_KEY, count = rooms.len(), "could not save rooms: {e}");
        }
    }

    pub fn try_save_rooms(&self, rooms: &[ChatRoom]) -> Result<(), StorageError> {
        let json = serde_json::to_string(rooms)?;
        self.kv.set(ROOMS_KEY, &json)?;
        self.kv.set(VERSION_KEY, &SCHEMA_VERSION.to_string())?;
        info!(key = ROOMS_KEY, count = rooms.len(), bytes = json.len(), "saved rooms");
        Ok(())
    }
}
