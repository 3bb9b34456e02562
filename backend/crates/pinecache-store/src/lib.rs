//! # pinecache-store
//!
//! Transactional key-value store abstraction for the namespaced cache.
//! This crate isolates all direct RocksDB interactions, allowing
//! pinecache-core to remain free of RocksDB dependencies.
//!
//! ## Architecture
//!
//! ```text
//! pinecache-core (Cache: get/set/exists/delete/flush)
//!     ↓
//! pinecache-store (tables + read/write transactions)
//!     ↓
//! RocksDB (storage engine)
//! ```
//!
//! ## On-disk layout
//!
//! - `cache_tables`: one marker per present table
//! - `cache_entries`: `{name_len:u64be}{table}{key}` → raw value bytes

pub mod cf;
pub mod key_encoding;
pub mod rocksdb_impl;
pub mod rocksdb_init;
pub mod storage_trait;

pub use rocksdb_impl::RocksDBBackend;
pub use rocksdb_init::RocksDbInit;
pub use storage_trait::{
    ReadTxn, Result, StorageBackend, StorageBackendExt, StorageError, Table, WriteTxn,
};

// Make test_utils available for testing in dependent crates
pub mod test_utils;

/// Attempt to extract a RocksDB backend from a generic `StorageBackend`.
///
/// Returns `Some` when the backend is RocksDB-backed, otherwise `None`.
pub fn try_as_rocksdb(
    backend: &std::sync::Arc<dyn StorageBackend>,
) -> Option<&RocksDBBackend> {
    backend.as_any().downcast_ref::<RocksDBBackend>()
}
