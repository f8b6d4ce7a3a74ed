//! In-memory implementation of the ExitStore trait.
//!
//! Used by tests and the testkit. Behaves exactly like the SQLite backend
//! without persisting anything.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use plasma_exit_core::{ExitId, StandardExit};

use crate::error::{Result, StoreError};
use crate::traits::{ExitStore, InsertResult};

/// Exit records in a `BTreeMap`.
///
/// Records live only as long as the store. Guarded by an `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    exits: RwLock<BTreeMap<ExitId, StandardExit>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<ExitId, StandardExit>>> {
        self.exits
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<ExitId, StandardExit>>> {
        self.exits
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl ExitStore for MemoryStore {
    fn get(&self, exit_id: &ExitId) -> Result<Option<StandardExit>> {
        Ok(self.read()?.get(exit_id).cloned())
    }

    fn insert(&self, exit_id: &ExitId, exit: &StandardExit) -> Result<InsertResult> {
        let mut exits = self.write()?;
        if exits.get(exit_id).is_some_and(|existing| existing.exitable) {
            return Ok(InsertResult::AlreadyExitable);
        }
        exits.insert(*exit_id, exit.clone());
        Ok(InsertResult::Inserted)
    }

    fn put(&self, exit_id: &ExitId, exit: &StandardExit) -> Result<()> {
        self.write()?.insert(*exit_id, exit.clone());
        Ok(())
    }

    fn remove(&self, exit_id: &ExitId) -> Result<Option<StandardExit>> {
        Ok(self.write()?.remove(exit_id))
    }

    fn list(&self) -> Result<Vec<(ExitId, StandardExit)>> {
        Ok(self
            .read()?
            .iter()
            .map(|(id, exit)| (*id, exit.clone()))
            .collect())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }
}
