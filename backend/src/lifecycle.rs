//! Store lifecycle helpers.
//!
//! The process opens the RocksDB store exactly once, hands the resulting
//! backend to every cache it builds, and flushes memtables on the way out.

use anyhow::Result;
use log::{debug, info, warn};
use pinecache_configs::ServerConfig;
use pinecache_store::{try_as_rocksdb, RocksDBBackend, RocksDbInit, StorageBackend};
use std::sync::Arc;

/// Open the RocksDB store described by `config`.
pub fn bootstrap(config: &ServerConfig) -> Result<Arc<dyn StorageBackend>> {
    let phase_start = std::time::Instant::now();
    let db_path = config.storage.rocksdb_dir();
    std::fs::create_dir_all(&db_path)?;

    let db = RocksDbInit::new(db_path.clone(), config.storage.rocksdb.clone()).open()?;
    info!(
        "RocksDB initialized at {} ({:.2}ms)",
        db_path.display(),
        phase_start.elapsed().as_secs_f64() * 1000.0
    );

    let backend = RocksDBBackend::with_options(
        db,
        config.storage.rocksdb.sync_writes,
        config.storage.rocksdb.disable_wal,
    );
    if !config.storage.rocksdb.sync_writes {
        debug!("RocksDB async writes enabled (sync_writes=false)");
    }
    if config.storage.rocksdb.disable_wal {
        warn!("RocksDB WAL disabled; unflushed commits are lost on crash");
    }

    Ok(Arc::new(backend))
}

/// Flush memtables before the store is dropped.
///
/// Failures are logged; the WAL still covers committed data unless it was
/// disabled.
pub fn shutdown(store: &Arc<dyn StorageBackend>) {
    match try_as_rocksdb(store) {
        Some(rocks) => match rocks.flush_to_disk() {
            Ok(()) => debug!("RocksDB memtables flushed"),
            Err(e) => warn!("Failed to flush RocksDB on shutdown: {}", e),
        },
        None => debug!("Non-RocksDB store, nothing to flush"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinecache_core::Cache;
    use pinecache_store::test_utils::InMemoryBackend;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> ServerConfig {
        let mut config = ServerConfig::default();
        config.storage.data_path = dir.path().to_string_lossy().into_owned();
        config
    }

    #[test]
    fn test_bootstrap_creates_store_under_data_path() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        let store = bootstrap(&config).unwrap();
        assert!(config.storage.rocksdb_dir().is_dir());
        assert!(try_as_rocksdb(&store).is_some());
        assert!(store.list_tables().unwrap().is_empty());
    }

    #[test]
    fn test_data_survives_shutdown_and_bootstrap() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        {
            let store = bootstrap(&config).unwrap();
            Cache::new(Arc::clone(&store), "session").set("user:42", &[0x01, 0x02]).unwrap();
            shutdown(&store);
        }

        let store = bootstrap(&config).unwrap();
        assert_eq!(Cache::new(store, "session").get("user:42"), vec![0x01, 0x02]);
    }

    #[test]
    fn test_shutdown_tolerates_other_backends() {
        let store: Arc<dyn StorageBackend> = Arc::new(InMemoryBackend::new());
        shutdown(&store);
    }
}
