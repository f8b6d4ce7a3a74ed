//! ExitStore trait: the abstract interface for exit record persistence.
//!
//! This trait keeps the exit game storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use plasma_exit_core::{ExitId, StandardExit};

use crate::error::Result;

/// Result of inserting an exit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertResult {
    /// Record was inserted (replacing any non-exitable leftover).
    Inserted,
    /// An exitable record already exists for this id; nothing was written.
    AlreadyExitable,
}

/// Keyed store of standard exit records.
///
/// Every method takes `&self`; implementations serialize writers internally
/// so that each call is atomic with respect to the others.
pub trait ExitStore: Send + Sync {
    /// Get the record for an exit id.
    fn get(&self, exit_id: &ExitId) -> Result<Option<StandardExit>>;

    /// Insert a record unless an exitable one already exists.
    ///
    /// The check and the write happen under one lock or transaction.
    fn insert(&self, exit_id: &ExitId, exit: &StandardExit) -> Result<InsertResult>;

    /// Unconditionally write a record.
    fn put(&self, exit_id: &ExitId, exit: &StandardExit) -> Result<()>;

    /// Delete a record, returning what was removed.
    fn remove(&self, exit_id: &ExitId) -> Result<Option<StandardExit>>;

    /// All records, ordered by exit id.
    fn list(&self) -> Result<Vec<(ExitId, StandardExit)>>;

    /// Number of stored records.
    fn len(&self) -> Result<usize>;

    /// Check if the store holds no records.
    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl<S: ExitStore + ?Sized> ExitStore for std::sync::Arc<S> {
    fn get(&self, exit_id: &ExitId) -> Result<Option<StandardExit>> {
        (**self).get(exit_id)
    }

    fn insert(&self, exit_id: &ExitId, exit: &StandardExit) -> Result<InsertResult> {
        (**self).insert(exit_id, exit)
    }

    fn put(&self, exit_id: &ExitId, exit: &StandardExit) -> Result<()> {
        (**self).put(exit_id, exit)
    }

    fn remove(&self, exit_id: &ExitId) -> Result<Option<StandardExit>> {
        (**self).remove(exit_id)
    }

    fn list(&self) -> Result<Vec<(ExitId, StandardExit)>> {
        (**self).list()
    }

    fn len(&self) -> Result<usize> {
        (**self).len()
    }
}
