//! Test utilities for pinecache-store.
//!
//! Provides helpers for setting up test stores with minimal boilerplate:
//! - `TestDb`: a RocksDB store in a temporary directory
//! - `InMemoryBackend`: a copy-on-write in-memory `StorageBackend`

use crate::rocksdb_impl::RocksDBBackend;
use crate::rocksdb_init::RocksDbInit;
use crate::storage_trait::{ReadTxn, Result, StorageBackend, StorageError, Table, WriteTxn};
use parking_lot::{Mutex, MutexGuard, RwLock};
use rocksdb::DB;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Test database wrapper that automatically cleans up on drop.
pub struct TestDb {
    /// RocksDB instance
    pub db: Arc<DB>,
    /// Temporary directory (kept alive for the duration of the test)
    temp_dir: TempDir,
}

impl TestDb {
    /// Create a new test database with the cache column families.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pinecache_store::test_utils::TestDb;
    ///
    /// let test_db = TestDb::new().unwrap();
    /// let backend = test_db.backend();
    /// ```
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = TempDir::new()?;
        let db = RocksDbInit::with_defaults(temp_dir.path()).open()?;
        Ok(Self { db, temp_dir })
    }

    /// Directory holding the database files.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// A fresh backend over this database.
    pub fn backend(&self) -> Arc<RocksDBBackend> {
        Arc::new(RocksDBBackend::new(Arc::clone(&self.db)))
    }

    /// Close the database and open it again from the same directory.
    ///
    /// Every backend handed out by `backend()` must be dropped first.
    pub fn reopen(self) -> anyhow::Result<Self> {
        let TestDb { db, temp_dir } = self;
        drop(db);
        let db = RocksDbInit::with_defaults(temp_dir.path()).open()?;
        Ok(Self { db, temp_dir })
    }
}

type Tables = BTreeMap<String, BTreeMap<Vec<u8>, Vec<u8>>>;

/// In-memory `StorageBackend` for tests.
///
/// Readers clone an `Arc` of the committed state; a writer holds the write
/// slot, mutates a private copy, and swaps it in on commit.
#[derive(Default)]
pub struct InMemoryBackend {
    committed: RwLock<Arc<Tables>>,
    write_slot: Mutex<()>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently committed in `table` (None if absent).
    pub fn entry_count(&self, table: &Table) -> Option<usize> {
        self.committed.read().get(table.name()).map(BTreeMap::len)
    }
}

fn lookup(tables: &Tables, table: &Table, key: &[u8]) -> Result<Option<Vec<u8>>> {
    tables
        .get(table.name())
        .map(|entries| entries.get(key).cloned())
        .ok_or_else(|| StorageError::TableNotFound(table.name().to_string()))
}

struct MemReadTxn {
    snapshot: Arc<Tables>,
}

impl ReadTxn for MemReadTxn {
    fn table_exists(&self, table: &Table) -> Result<bool> {
        Ok(self.snapshot.contains_key(table.name()))
    }

    fn get(&self, table: &Table, key: &[u8]) -> Result<Option<Vec<u8>>> {
        lookup(&self.snapshot, table, key)
    }
}

struct MemWriteTxn<'a> {
    backend: &'a InMemoryBackend,
    _slot: MutexGuard<'a, ()>,
    working: Tables,
}

impl MemWriteTxn<'_> {
    fn entries_mut(&mut self, table: &Table) -> Result<&mut BTreeMap<Vec<u8>, Vec<u8>>> {
        self.working
            .get_mut(table.name())
            .ok_or_else(|| StorageError::TableNotFound(table.name().to_string()))
    }
}

impl ReadTxn for MemWriteTxn<'_> {
    fn table_exists(&self, table: &Table) -> Result<bool> {
        Ok(self.working.contains_key(table.name()))
    }

    fn get(&self, table: &Table, key: &[u8]) -> Result<Option<Vec<u8>>> {
        lookup(&self.working, table, key)
    }
}

impl WriteTxn for MemWriteTxn<'_> {
    fn create_table_if_missing(&mut self, table: &Table) -> Result<bool> {
        if self.working.contains_key(table.name()) {
            return Ok(false);
        }
        self.working.insert(table.name().to_string(), BTreeMap::new());
        Ok(true)
    }

    fn put(&mut self, table: &Table, key: &[u8], value: &[u8]) -> Result<()> {
        self.entries_mut(table)?.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, table: &Table, key: &[u8]) -> Result<()> {
        self.entries_mut(table)?.remove(key);
        Ok(())
    }

    fn drop_table(&mut self, table: &Table) -> Result<()> {
        self.working
            .remove(table.name())
            .map(|_| ())
            .ok_or_else(|| StorageError::TableNotFound(table.name().to_string()))
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let txn = *self;
        *txn.backend.committed.write() = Arc::new(txn.working);
        Ok(())
    }
}

impl StorageBackend for InMemoryBackend {
    fn begin_read(&self) -> Result<Box<dyn ReadTxn + '_>> {
        let snapshot = Arc::clone(&*self.committed.read());
        Ok(Box::new(MemReadTxn { snapshot }))
    }

    fn begin_write(&self) -> Result<Box<dyn WriteTxn + '_>> {
        let slot = self.write_slot.lock();
        let working = Tables::clone(&**self.committed.read());
        Ok(Box::new(MemWriteTxn {
            backend: self,
            _slot: slot,
            working,
        }))
    }

    fn list_tables(&self) -> Result<Vec<Table>> {
        Ok(self.committed.read().keys().map(|name| Table::new(name.as_str())).collect())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage_trait::StorageBackendExt;

    #[test]
    fn test_create_test_db() {
        let test_db = TestDb::new().unwrap();
        assert!(test_db.path().exists());
        assert!(test_db.backend().list_tables().unwrap().is_empty());
    }

    #[test]
    fn test_in_memory_snapshot_isolation() {
        let backend = InMemoryBackend::new();
        let table = Table::new("t");

        let before = backend.begin_read().unwrap();
        backend
            .update(|txn| {
                txn.create_table_if_missing(&table)?;
                txn.put(&table, b"k", b"v")
            })
            .unwrap();

        assert!(!before.table_exists(&table).unwrap());
        assert_eq!(backend.entry_count(&table), Some(1));
    }

    #[test]
    fn test_in_memory_drop_table() {
        let backend = InMemoryBackend::new();
        let table = Table::new("t");
        backend.update(|txn| txn.create_table_if_missing(&table)).unwrap();

        backend.update(|txn| txn.drop_table(&table)).unwrap();
        assert_eq!(backend.entry_count(&table), None);

        let again = backend.update(|txn| txn.drop_table(&table));
        assert!(matches!(again, Err(StorageError::TableNotFound(_))));
    }
}
