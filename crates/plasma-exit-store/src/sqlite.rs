//! SQLite implementation of the ExitStore trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled SQLite;
//! a single connection behind a mutex serializes all writers.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use plasma_exit_core::{Address, ExitId, StandardExit, B256, U256};

use crate::error::{Result, StoreError};
use crate::migration::{self, now_millis};
use crate::traits::{ExitStore, InsertResult};

/// Exit records in a SQLite database.
///
/// Thread-safe via internal Mutex.
#[derive(Clone)]
pub struct SqliteStore {
    /// One connection; the mutex serializes writers.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database file at `path`.
    ///
    /// The schema is migrated before the store is returned.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// A private in-memory database, gone on drop.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

const SELECT_COLUMNS: &str =
    "exit_id, exitable, output_related_data_hash, token, exit_target, amount";

/// A row as stored, before width checks.
struct RawRow {
    exit_id: Vec<u8>,
    exitable: bool,
    output_related_data_hash: Vec<u8>,
    token: Vec<u8>,
    exit_target: Vec<u8>,
    amount: Vec<u8>,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        exit_id: row.get("exit_id")?,
        exitable: row.get("exitable")?,
        output_related_data_hash: row.get("output_related_data_hash")?,
        token: row.get("token")?,
        exit_target: row.get("exit_target")?,
        amount: row.get("amount")?,
    })
}

fn fixed<const N: usize>(bytes: &[u8], column: &str) -> Result<[u8; N]> {
    bytes.try_into().map_err(|_| {
        StoreError::InvalidData(format!(
            "{column}: expected {} bytes, got {}",
            N,
            bytes.len()
        ))
    })
}

impl RawRow {
    fn into_record(self) -> Result<(ExitId, StandardExit)> {
        let exit_id = ExitId::from_be_bytes(fixed::<32>(&self.exit_id, "exit_id")?)
            .ok_or_else(|| StoreError::InvalidData("exit_id wider than 192 bits".into()))?;
        let exit = StandardExit {
            exitable: self.exitable,
            output_related_data_hash: B256::from(fixed::<32>(
                &self.output_related_data_hash,
                "output_related_data_hash",
            )?),
            token: Address::from(fixed::<20>(&self.token, "token")?),
            exit_target: Address::from(fixed::<20>(&self.exit_target, "exit_target")?),
            amount: U256::from_be_bytes(fixed::<32>(&self.amount, "amount")?),
        };
        Ok((exit_id, exit))
    }
}

fn get_in(conn: &Connection, exit_id: &ExitId) -> Result<Option<StandardExit>> {
    let raw = conn
        .query_row(
            &format!("SELECT {SELECT_COLUMNS} FROM standard_exits WHERE exit_id = ?1"),
            params![exit_id.to_be_bytes().as_slice()],
            read_row,
        )
        .optional()?;
    raw.map(|r| r.into_record().map(|(_, exit)| exit))
        .transpose()
}

fn put_in(conn: &Connection, exit_id: &ExitId, exit: &StandardExit) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO standard_exits
            (exit_id, exitable, output_related_data_hash, token, exit_target, amount, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            exit_id.to_be_bytes().as_slice(),
            exit.exitable,
            exit.output_related_data_hash.as_slice(),
            exit.token.as_slice(),
            exit.exit_target.as_slice(),
            exit.amount.to_be_bytes::<32>().as_slice(),
            now_millis(),
        ],
    )?;
    Ok(())
}

impl ExitStore for SqliteStore {
    fn get(&self, exit_id: &ExitId) -> Result<Option<StandardExit>> {
        let conn = self.lock()?;
        get_in(&conn, exit_id)
    }

    fn insert(&self, exit_id: &ExitId, exit: &StandardExit) -> Result<InsertResult> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        if get_in(&tx, exit_id)?.is_some_and(|existing| existing.exitable) {
            return Ok(InsertResult::AlreadyExitable);
        }
        put_in(&tx, exit_id, exit)?;
        tx.commit()?;
        Ok(InsertResult::Inserted)
    }

    fn put(&self, exit_id: &ExitId, exit: &StandardExit) -> Result<()> {
        let conn = self.lock()?;
        put_in(&conn, exit_id, exit)
    }

    fn remove(&self, exit_id: &ExitId) -> Result<Option<StandardExit>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let existing = get_in(&tx, exit_id)?;
        if existing.is_some() {
            tx.execute(
                "DELETE FROM standard_exits WHERE exit_id = ?1",
                params![exit_id.to_be_bytes().as_slice()],
            )?;
        }
        tx.commit()?;
        Ok(existing)
    }

    fn list(&self) -> Result<Vec<(ExitId, StandardExit)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM standard_exits ORDER BY exit_id"
        ))?;
        let rows = stmt
            .query_map([], read_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(RawRow::into_record).collect()
    }

    fn len(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM standard_exits", [], |row| row.get(0))?;
        usize::try_from(count).map_err(|_| StoreError::InvalidData(format!("row count {count}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use proptest::prelude::*;

    fn exit_id(v: u64) -> ExitId {
        ExitId::from_u256(U256::from(v)).unwrap()
    }

    fn record(exitable: bool, amount: u64) -> StandardExit {
        StandardExit {
            exitable,
            output_related_data_hash: B256::repeat_byte(0xaa),
            token: Address::repeat_byte(0x0e),
            exit_target: Address::repeat_byte(0x01),
            amount: U256::from(amount),
        }
    }

    #[test]
    fn test_insert_and_get_exit() {
        let store = SqliteStore::open_memory().unwrap();
        let result = store.insert(&exit_id(7), &record(true, 1000)).unwrap();
        assert_eq!(result, InsertResult::Inserted);
        assert_eq!(store.get(&exit_id(7)).unwrap(), Some(record(true, 1000)));
        assert_eq!(store.get(&exit_id(8)).unwrap(), None);
    }

    #[test]
    fn test_insert_refuses_exitable_duplicate() {
        let store = SqliteStore::open_memory().unwrap();
        store.insert(&exit_id(7), &record(true, 1000)).unwrap();
        assert_eq!(
            store.insert(&exit_id(7), &record(true, 1)).unwrap(),
            InsertResult::AlreadyExitable
        );
        assert_eq!(store.get(&exit_id(7)).unwrap(), Some(record(true, 1000)));
    }

    #[test]
    fn test_max_values_roundtrip() {
        let store = SqliteStore::open_memory().unwrap();
        let id = ExitId::from_u256((U256::from(1u8) << 192) - U256::from(1u8)).unwrap();
        let mut exit = record(true, 0);
        exit.amount = U256::MAX;
        store.put(&id, &exit).unwrap();
        assert_eq!(store.get(&id).unwrap(), Some(exit));
    }

    #[test]
    fn test_remove_returns_record() {
        let store = SqliteStore::open_memory().unwrap();
        store.put(&exit_id(1), &record(true, 5)).unwrap();
        assert_eq!(store.remove(&exit_id(1)).unwrap(), Some(record(true, 5)));
        assert_eq!(store.remove(&exit_id(1)).unwrap(), None);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_list_ordered_by_exit_id() {
        let store = SqliteStore::open_memory().unwrap();
        for v in [300u64, 2, 70_000] {
            store.put(&exit_id(v), &record(true, v)).unwrap();
        }
        let ids: Vec<ExitId> = store.list().unwrap().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![exit_id(2), exit_id(300), exit_id(70_000)]);
        assert_eq!(store.len().unwrap(), 3);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exits.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.put(&exit_id(42), &record(true, 9)).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get(&exit_id(42)).unwrap(), Some(record(true, 9)));
    }

    #[test]
    fn test_corrupt_row_is_invalid_data() {
        let store = SqliteStore::open_memory().unwrap();
        {
            let conn = store.lock().unwrap();
            conn.execute(
                "INSERT INTO standard_exits VALUES (?1, 1, ?2, ?3, ?4, ?5, 0)",
                params![
                    exit_id(1).to_be_bytes().as_slice(),
                    [0u8; 31].as_slice(),
                    [0u8; 20].as_slice(),
                    [0u8; 20].as_slice(),
                    [0u8; 32].as_slice(),
                ],
            )
            .unwrap();
        }
        assert!(matches!(
            store.get(&exit_id(1)),
            Err(StoreError::InvalidData(_))
        ));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(u8, bool, u64),
        Put(u8, bool, u64),
        Remove(u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..8, any::<bool>(), 1u64..1000).prop_map(|(k, e, a)| Op::Insert(k, e, a)),
            (0u8..8, any::<bool>(), 1u64..1000).prop_map(|(k, e, a)| Op::Put(k, e, a)),
            (0u8..8).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn test_sqlite_matches_memory(ops in prop::collection::vec(op(), 0..40)) {
            let sqlite = SqliteStore::open_memory().unwrap();
            let memory = MemoryStore::new();
            for op in ops {
                match op {
                    Op::Insert(k, e, a) => {
                        let id = exit_id(k.into());
                        prop_assert_eq!(
                            sqlite.insert(&id, &record(e, a)).unwrap(),
                            memory.insert(&id, &record(e, a)).unwrap()
                        );
                    }
                    Op::Put(k, e, a) => {
                        let id = exit_id(k.into());
                        sqlite.put(&id, &record(e, a)).unwrap();
                        memory.put(&id, &record(e, a)).unwrap();
                    }
                    Op::Remove(k) => {
                        let id = exit_id(k.into());
                        prop_assert_eq!(sqlite.remove(&id).unwrap(), memory.remove(&id).unwrap());
                    }
                }
            }
            prop_assert_eq!(sqlite.list().unwrap(), memory.list().unwrap());
        }
    }
}
