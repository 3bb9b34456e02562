//! RocksDB implementation of the StorageBackend trait.
//!
//! Tables are not column families here. Two fixed column families hold the
//! table markers and the entries (see `cf.rs` and `key_encoding.rs`), which
//! lets one `WriteBatch` create a table, write to it, or drop it together with
//! all of its entries atomically.
//!
//! Concurrency:
//! - Readers work on a RocksDB snapshot and never take a lock.
//! - Writers take `write_slot` for the lifetime of the transaction, so write
//!   transactions are serialized across every table of the backend.

use crate::cf::ColumnFamily as CacheCf;
use crate::key_encoding::{entry_key, prefix_upper_bound, table_prefix};
use crate::storage_trait::{ReadTxn, Result, StorageBackend, StorageError, Table, WriteTxn};
use parking_lot::{Mutex, MutexGuard};
use rocksdb::{ColumnFamily, Direction, ErrorKind, IteratorMode, Snapshot, WriteBatch, WriteOptions, DB};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// RocksDB implementation of the StorageBackend trait.
///
/// ## Example
///
/// ```rust,ignore
/// use pinecache_store::{RocksDBBackend, RocksDbInit, StorageBackendExt, Table};
///
/// let db = RocksDbInit::with_defaults("/tmp/pinecache").open()?;
/// let backend = RocksDBBackend::new(db);
///
/// let table = Table::new("session");
/// backend.update(|txn| {
///     txn.create_table_if_missing(&table)?;
///     txn.put(&table, b"key1", b"value1")
/// })?;
///
/// let value = backend.view(|txn| txn.get(&table, b"key1"))?;
/// assert_eq!(value, Some(b"value1".to_vec()));
/// ```
pub struct RocksDBBackend {
    db: Arc<DB>,
    write_slot: Mutex<()>,
    sync_writes: bool,
    disable_wal: bool,
}

impl RocksDBBackend {
    /// Creates a new RocksDB backend with default write options.
    ///
    /// `db` must have been opened with every column family in
    /// `cf::ColumnFamily::ALL` (see `RocksDbInit`).
    pub fn new(db: Arc<DB>) -> Self {
        Self::with_options(db, false, false)
    }

    /// Creates a backend with explicit durability settings.
    pub fn with_options(db: Arc<DB>, sync_writes: bool, disable_wal: bool) -> Self {
        Self {
            db,
            write_slot: Mutex::new(()),
            sync_writes,
            disable_wal,
        }
    }

    /// Flushes memtables of every cache column family to SST files.
    ///
    /// Called once at shutdown so a restart does not need to replay the WAL.
    pub fn flush_to_disk(&self) -> Result<()> {
        for cf in CacheCf::ALL {
            self.db.flush_cf(self.cf(cf)?).map_err(map_rocksdb_error)?;
        }
        Ok(())
    }

    fn cf(&self, cf: CacheCf) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(cf.name())
            .ok_or_else(|| StorageError::Other(format!("column family '{}' is not open", cf.name())))
    }

    fn write_options(&self) -> WriteOptions {
        let mut opts = WriteOptions::default();
        opts.set_sync(self.sync_writes);
        opts.disable_wal(self.disable_wal);
        opts
    }
}

/// Classify a RocksDB error into the storage error taxonomy.
pub(crate) fn map_rocksdb_error(e: rocksdb::Error) -> StorageError {
    let msg = e.to_string();
    match e.kind() {
        ErrorKind::Corruption => StorageError::Corruption(msg),
        ErrorKind::Busy | ErrorKind::TryAgain | ErrorKind::TimedOut | ErrorKind::Aborted => {
            StorageError::Conflict(msg)
        }
        ErrorKind::IOError | ErrorKind::Incomplete | ErrorKind::ShutdownInProgress => {
            StorageError::IoError(msg)
        }
        _ => StorageError::Other(msg),
    }
}

impl StorageBackend for RocksDBBackend {
    fn begin_read(&self) -> Result<Box<dyn ReadTxn + '_>> {
        Ok(Box::new(RocksReadTxn {
            backend: self,
            snapshot: self.db.snapshot(),
        }))
    }

    fn begin_write(&self) -> Result<Box<dyn WriteTxn + '_>> {
        let slot = self.write_slot.lock();
        Ok(Box::new(RocksWriteTxn {
            backend: self,
            _slot: slot,
            batch: WriteBatch::default(),
            tables: HashMap::new(),
            entries: HashMap::new(),
            dropped: HashSet::new(),
        }))
    }

    fn list_tables(&self) -> Result<Vec<Table>> {
        let cf = self.cf(CacheCf::Tables)?;
        let snapshot = self.db.snapshot();
        let mut tables = Vec::new();
        for item in snapshot.iterator_cf(cf, IteratorMode::Start) {
            let (name, _) = item.map_err(map_rocksdb_error)?;
            let name = String::from_utf8(name.to_vec()).map_err(|e| {
                StorageError::Corruption(format!("table marker is not UTF-8: {}", e))
            })?;
            tables.push(Table::new(name));
        }
        Ok(tables)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Snapshot-backed read transaction.
struct RocksReadTxn<'a> {
    backend: &'a RocksDBBackend,
    snapshot: Snapshot<'a>,
}

impl ReadTxn for RocksReadTxn<'_> {
    fn table_exists(&self, table: &Table) -> Result<bool> {
        let cf = self.backend.cf(CacheCf::Tables)?;
        let marker = self.snapshot.get_cf(cf, table.as_bytes()).map_err(map_rocksdb_error)?;
        Ok(marker.is_some())
    }

    fn get(&self, table: &Table, key: &[u8]) -> Result<Option<Vec<u8>>> {
        if !self.table_exists(table)? {
            return Err(StorageError::TableNotFound(table.name().to_string()));
        }
        let cf = self.backend.cf(CacheCf::Entries)?;
        self.snapshot
            .get_cf(cf, entry_key(table.name(), key))
            .map_err(map_rocksdb_error)
    }
}

/// Write transaction holding the backend's write slot.
///
/// Changes are staged in `batch`; `tables`, `entries` and `dropped` mirror the
/// staged state so reads through the transaction see its own writes.
struct RocksWriteTxn<'a> {
    backend: &'a RocksDBBackend,
    _slot: MutexGuard<'a, ()>,
    batch: WriteBatch,
    /// Staged table presence, by name
    tables: HashMap<String, bool>,
    /// Staged entry state, by encoded entry key (`None` = deleted)
    entries: HashMap<Vec<u8>, Option<Vec<u8>>>,
    /// Tables dropped in this transaction: committed entries are hidden
    dropped: HashSet<String>,
}

impl RocksWriteTxn<'_> {
    fn require_table(&self, table: &Table) -> Result<()> {
        if self.table_exists(table)? {
            Ok(())
        } else {
            Err(StorageError::TableNotFound(table.name().to_string()))
        }
    }
}

impl ReadTxn for RocksWriteTxn<'_> {
    fn table_exists(&self, table: &Table) -> Result<bool> {
        if let Some(present) = self.tables.get(table.name()) {
            return Ok(*present);
        }
        // The write slot is held, so committed state cannot change underneath.
        let cf = self.backend.cf(CacheCf::Tables)?;
        let marker = self.backend.db.get_cf(cf, table.as_bytes()).map_err(map_rocksdb_error)?;
        Ok(marker.is_some())
    }

    fn get(&self, table: &Table, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.require_table(table)?;
        let encoded = entry_key(table.name(), key);
        if let Some(staged) = self.entries.get(&encoded) {
            return Ok(staged.clone());
        }
        if self.dropped.contains(table.name()) {
            return Ok(None);
        }
        let cf = self.backend.cf(CacheCf::Entries)?;
        self.backend.db.get_cf(cf, &encoded).map_err(map_rocksdb_error)
    }
}

impl WriteTxn for RocksWriteTxn<'_> {
    fn create_table_if_missing(&mut self, table: &Table) -> Result<bool> {
        if self.table_exists(table)? {
            return Ok(false);
        }
        let backend = self.backend;
        self.batch.put_cf(backend.cf(CacheCf::Tables)?, table.as_bytes(), b"");
        self.tables.insert(table.name().to_string(), true);
        log::debug!("[{}] table staged for creation", table);
        Ok(true)
    }

    fn put(&mut self, table: &Table, key: &[u8], value: &[u8]) -> Result<()> {
        self.require_table(table)?;
        let backend = self.backend;
        let encoded = entry_key(table.name(), key);
        self.batch.put_cf(backend.cf(CacheCf::Entries)?, &encoded, value);
        self.entries.insert(encoded, Some(value.to_vec()));
        Ok(())
    }

    fn delete(&mut self, table: &Table, key: &[u8]) -> Result<()> {
        self.require_table(table)?;
        let backend = self.backend;
        let encoded = entry_key(table.name(), key);
        self.batch.delete_cf(backend.cf(CacheCf::Entries)?, &encoded);
        self.entries.insert(encoded, None);
        Ok(())
    }

    fn drop_table(&mut self, table: &Table) -> Result<()> {
        self.require_table(table)?;
        let backend = self.backend;
        let entries_cf = backend.cf(CacheCf::Entries)?;
        let prefix = table_prefix(table.name());

        self.batch.delete_cf(backend.cf(CacheCf::Tables)?, table.as_bytes());
        match prefix_upper_bound(&prefix) {
            Some(upper) => self.batch.delete_range_cf(entries_cf, &prefix, &upper),
            None => {
                // Only reachable for names longer than 2^56 bytes; fall back to
                // deleting the committed keys one by one.
                let iter = backend
                    .db
                    .iterator_cf(entries_cf, IteratorMode::From(&prefix, Direction::Forward));
                for item in iter {
                    let (key, _) = item.map_err(map_rocksdb_error)?;
                    if !key.starts_with(&prefix) {
                        break;
                    }
                    self.batch.delete_cf(entries_cf, &key);
                }
            }
        }

        self.tables.insert(table.name().to_string(), false);
        self.dropped.insert(table.name().to_string());
        self.entries.retain(|encoded, _| !encoded.starts_with(&prefix));
        log::debug!("[{}] table staged for removal", table);
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let txn = *self;
        if txn.batch.is_empty() {
            return Ok(());
        }
        let ops = txn.batch.len();
        txn.backend
            .db
            .write_opt(txn.batch, &txn.backend.write_options())
            .map_err(map_rocksdb_error)?;
        log::trace!("write transaction committed ({} ops)", ops);
        Ok(())
    }
}
