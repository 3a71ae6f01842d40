//! Backends for the single named storage slot.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use super::Database;
use crate::error::StorageError;

/// A place that can hold one serialized record per key.
///
/// Writes replace the whole value; a backend must never leave a partially
/// written record behind.
pub trait StateSlot {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn clear(&self, key: &str) -> Result<(), StorageError>;
}

/// Slot stored in the `kv` table of the SQLite database.
pub struct SqliteSlot {
    db: Database,
}

impl SqliteSlot {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the slot in the default data directory.
    pub fn open() -> Result<Self, StorageError> {
        Ok(Self::new(Database::open()?))
    }

    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        Ok(Self::new(Database::open_at(path)?))
    }
}

impl StateSlot for SqliteSlot {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.db.kv_get(key).map_err(|e| StorageError::ReadFailed {
            slot: key.to_string(),
            message: e.to_string(),
        })
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.db.kv_set(key, value).map_err(|e| StorageError::WriteFailed {
            slot: key.to_string(),
            message: e.to_string(),
        })
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        self.db.kv_delete(key).map_err(|e| StorageError::WriteFailed {
            slot: key.to_string(),
            message: e.to_string(),
        })
    }
}

/// In-process slot. Clones share storage.
///
/// Writes can be switched off to model a disabled or full storage layer.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    values: Rc<RefCell<HashMap<String, String>>>,
    reject_writes: Rc<Cell<bool>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes and clears fail with [`StorageError::WriteFailed`].
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.set(reject);
    }

    /// Raw stored value, bypassing any decoding.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    /// Store a raw value, ignoring the write switch.
    pub fn put_raw(&self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn check_writable(&self, key: &str) -> Result<(), StorageError> {
        if self.reject_writes.get() {
            return Err(StorageError::WriteFailed {
                slot: key.to_string(),
                message: "storage is not writable".to_string(),
            });
        }
        Ok(())
    }
}

impl StateSlot for MemorySlot {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable(key)?;
        self.put_raw(key, value);
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable(key)?;
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}
