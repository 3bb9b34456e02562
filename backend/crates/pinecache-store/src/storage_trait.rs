//! Storage backend abstraction for the namespaced cache.
//!
//! This module provides the trait-based seam between the cache and the
//! embedded engine that persists it. The cache never talks to RocksDB
//! directly; it opens transactions through `StorageBackend`.
//!
//! ## Architecture
//!
//! ```text
//! Cache (pinecache-core)
//!     ↓
//! StorageBackend / ReadTxn / WriteTxn   (this file)
//!     ↓
//! RocksDB | in-memory
//! ```
//!
//! ## Table Model
//!
//! A `Table` is a named namespace of entries, comparable to a bucket. A table
//! is either absent or present, and presence is independent of whether the
//! table holds any entries. Tables are created and dropped inside write
//! transactions like any other change.
//!
//! ## Transactions
//!
//! - `begin_read()` returns a snapshot. Writes committed after the snapshot
//!   was taken are invisible to it, and readers never block writers.
//! - `begin_write()` blocks until the backend's single write slot is free.
//!   At most one write transaction exists per backend at any instant.
//!   Changes are staged and applied atomically by `commit()`; dropping the
//!   transaction without committing discards them.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use pinecache_store::{StorageBackend, StorageBackendExt, Table};
//!
//! fn remember(backend: &dyn StorageBackend, user_id: &str, data: &[u8]) {
//!     let table = Table::new("profiles");
//!     backend
//!         .update(|txn| {
//!             txn.create_table_if_missing(&table)?;
//!             txn.put(&table, user_id.as_bytes(), data)
//!         })
//!         .expect("Failed to store");
//! }
//! ```

use std::any::Any;
use std::fmt;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The operation needs a present table and the table is absent
    TableNotFound(String),

    /// Generic I/O error from underlying storage
    IoError(String),

    /// The engine detected on-disk corruption
    Corruption(String),

    /// Transaction could not proceed (busy, timed out, aborted, try again)
    Conflict(String),

    /// Other errors
    Other(String),
}

impl StorageError {
    /// Returns true for the "absent table" condition.
    pub fn is_table_not_found(&self) -> bool {
        matches!(self, StorageError::TableNotFound(_))
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::TableNotFound(t) => write!(f, "Table not found: {}", t),
            StorageError::IoError(msg) => write!(f, "I/O error: {}", msg),
            StorageError::Corruption(msg) => write!(f, "Corruption: {}", msg),
            StorageError::Conflict(msg) => write!(f, "Transaction conflict: {}", msg),
            StorageError::Other(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

/// A named namespace of key-value entries within a storage backend.
///
/// The name is written to disk as its raw UTF-8 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Table {
    name: String,
}

impl Table {
    /// Creates a new table reference with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the table name as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.name.as_bytes()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<String> for Table {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for Table {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Read access to a consistent view of the store.
pub trait ReadTxn {
    /// Checks whether the table is present in this view.
    fn table_exists(&self, table: &Table) -> Result<bool>;

    /// Retrieves a value by key.
    ///
    /// Returns `Ok(None)` if the key doesn't exist and
    /// `Err(TableNotFound)` if the table itself is absent.
    fn get(&self, table: &Table, key: &[u8]) -> Result<Option<Vec<u8>>>;
}

/// A write transaction. Reads through it observe its own staged changes.
///
/// Dropping a `WriteTxn` without calling `commit` aborts it.
pub trait WriteTxn: ReadTxn {
    /// Creates the table if it is absent.
    ///
    /// Returns `Ok(true)` when this call created the table.
    fn create_table_if_missing(&mut self, table: &Table) -> Result<bool>;

    /// Stores a key-value pair, overwriting any previous value.
    fn put(&mut self, table: &Table, key: &[u8], value: &[u8]) -> Result<()>;

    /// Deletes a key. Deleting a missing key from a present table succeeds.
    fn delete(&mut self, table: &Table, key: &[u8]) -> Result<()>;

    /// Removes the table and every entry in it.
    ///
    /// Returns `Err(TableNotFound)` if the table is absent.
    fn drop_table(&mut self, table: &Table) -> Result<()>;

    /// Atomically applies every staged change and releases the write slot.
    fn commit(self: Box<Self>) -> Result<()>;
}

/// Trait for pluggable transactional storage backends.
///
/// Implementations must be thread-safe (Send + Sync); one backend instance is
/// shared by every cache in the process.
pub trait StorageBackend: Send + Sync {
    /// Opens a snapshot-isolated read transaction.
    fn begin_read(&self) -> Result<Box<dyn ReadTxn + '_>>;

    /// Opens a write transaction, blocking until the write slot is free.
    fn begin_write(&self) -> Result<Box<dyn WriteTxn + '_>>;

    /// Lists every present table.
    fn list_tables(&self) -> Result<Vec<Table>>;

    /// Downcast support to enable integration paths that need concrete backends.
    fn as_any(&self) -> &dyn Any;
}

/// Closure-style transaction helpers available on every backend.
pub trait StorageBackendExt {
    /// Runs `f` inside a read transaction.
    fn view<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn ReadTxn) -> Result<T>;

    /// Runs `f` inside a write transaction.
    ///
    /// Commits when `f` returns `Ok`; aborts and returns the error otherwise.
    fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn WriteTxn) -> Result<T>;
}

impl<B: StorageBackend + ?Sized> StorageBackendExt for B {
    fn view<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn ReadTxn) -> Result<T>,
    {
        let txn = self.begin_read()?;
        f(txn.as_ref())
    }

    fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn WriteTxn) -> Result<T>,
    {
        let mut txn = self.begin_write()?;
        let out = f(txn.as_mut())?;
        txn.commit()?;
        Ok(out)
    }
}
