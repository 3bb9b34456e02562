//! Name-scoped cache view over the shared store.
//!
//! A [`Cache`] owns no state beyond its table name: every call opens one
//! store transaction and returns when it has committed or aborted.
//!
//! ## Table lifecycle
//!
//! ```text
//! operation     Absent          Present
//! set           -> Present      stays
//! is_exist      -> Present      stays
//! get, lookup   stays           stays
//! delete        error           stays
//! flush         stays (Ok)      -> Absent
//! ```
//!
//! ## Error surface
//!
//! Writes (`set`, `delete`, `flush`) return the store error unchanged and are
//! never retried. Reads (`get`, `is_exist`) never fail: a store error is logged
//! and reported as "not found". Use [`Cache::lookup`] to tell a missing key,
//! an empty value and a failed read apart.

use crate::lookup::Lookup;
use log::{debug, warn};
use pinecache_store::{Result, StorageBackend, StorageBackendExt, StorageError, Table};
use std::fmt;
use std::sync::Arc;

/// A cache bound to one table of a shared store.
///
/// Cloning is cheap; clones share the store handle and the table name.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn StorageBackend>,
    table: Table,
}

impl Cache {
    /// Binds a cache to `store` and `table`. Performs no I/O.
    pub fn new(store: Arc<dyn StorageBackend>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: Table::new(table),
        }
    }

    /// The table this cache is bound to.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Reads `key` and reports found / not found / failed separately.
    ///
    /// An absent table is `NotFound`. Does not create the table.
    pub fn lookup(&self, key: &str) -> Lookup {
        let table = &self.table;
        self.store
            .view(|txn| {
                if !txn.table_exists(table)? {
                    return Ok(None);
                }
                txn.get(table, key.as_bytes())
            })
            .into()
    }

    /// Returns the stored bytes for `key`, or an empty vector when the table
    /// is absent, the key is missing, or the read failed.
    ///
    /// An empty stored value is indistinguishable from a missing key here.
    pub fn get(&self, key: &str) -> Vec<u8> {
        match self.lookup(key) {
            Lookup::Found(value) => value,
            Lookup::NotFound => Vec::new(),
            Lookup::Failed(err) => {
                warn!("[{}] get '{}' failed, reporting empty: {}", self.table, key, err);
                Vec::new()
            }
        }
    }

    /// Stores `value` under `key`, creating the table if it is absent.
    pub fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let table = &self.table;
        self.store.update(|txn| {
            if txn.create_table_if_missing(table)? {
                debug!("[{}] table created", table);
            }
            txn.put(table, key.as_bytes(), value)
        })
    }

    /// Returns true iff `key` has an entry.
    ///
    /// NOTE: this creates the table when it is absent, so calling it moves an
    /// absent table to present even though the answer is `false`. Store
    /// errors are logged and reported as `false`.
    pub fn is_exist(&self, key: &str) -> bool {
        match self.create_table_and_probe(key) {
            Ok(found) => found,
            Err(err) => {
                warn!("[{}] exists check for '{}' failed, reporting false: {}", self.table, key, err);
                false
            }
        }
    }

    /// The only code path in which a read-style call mutates table state.
    fn create_table_and_probe(&self, key: &str) -> Result<bool> {
        let table = &self.table;
        self.store.update(|txn| {
            if txn.create_table_if_missing(table)? {
                debug!("[{}] table created by exists check", table);
            }
            Ok(txn.get(table, key.as_bytes())?.is_some())
        })
    }

    /// Removes `key`. Missing keys are fine; an absent table is
    /// `StorageError::TableNotFound`.
    pub fn delete(&self, key: &str) -> Result<()> {
        let table = &self.table;
        self.store.update(|txn| txn.delete(table, key.as_bytes()))
    }

    /// Removes the table and every entry in it. Flushing an absent table
    /// succeeds.
    pub fn flush(&self) -> Result<()> {
        let table = &self.table;
        match self.store.update(|txn| txn.drop_table(table)) {
            Err(StorageError::TableNotFound(_)) => {
                debug!("[{}] flush on absent table", table);
                Ok(())
            }
            other => other,
        }
    }
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache").field("table", &self.table).finish_non_exhaustive()
    }
}
