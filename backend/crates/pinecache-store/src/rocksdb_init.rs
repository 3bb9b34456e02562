//! RocksDB initialization utilities for pinecache.
//!
//! Provides a thin helper to open a RocksDB instance with the cache column
//! families present. The application root opens the store exactly once.

use crate::cf::ColumnFamily as CacheCf;
use anyhow::Result;
use pinecache_configs::RocksDbSettings;
use rocksdb::{BlockBasedOptions, Cache, ColumnFamilyDescriptor, Options, DB};
use std::path::PathBuf;
use std::sync::Arc;

/// RocksDB initializer for creating/opening the cache database.
pub struct RocksDbInit {
    db_path: PathBuf,
    settings: RocksDbSettings,
}

impl RocksDbInit {
    /// Create a new initializer for the given path with custom settings.
    pub fn new(db_path: impl Into<PathBuf>, settings: RocksDbSettings) -> Self {
        Self {
            db_path: db_path.into(),
            settings,
        }
    }

    /// Create a new initializer with default settings.
    pub fn with_defaults(db_path: impl Into<PathBuf>) -> Self {
        Self::new(db_path, RocksDbSettings::default())
    }

    /// Open or create the RocksDB database and ensure the cache CFs exist.
    pub fn open(&self) -> Result<Arc<DB>> {
        let path = self.db_path.as_path();

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_write_buffer_size(self.settings.write_buffer_size);
        db_opts.set_max_write_buffer_number(self.settings.max_write_buffers);
        db_opts.set_max_background_jobs(self.settings.max_background_jobs);
        db_opts.increase_parallelism(self.settings.max_background_jobs);
        db_opts.set_max_open_files(self.settings.max_open_files);

        // Block cache: SHARED across both column families
        let cache = Cache::new_lru_cache(self.settings.block_cache_size);
        db_opts.set_block_based_table_factory(&create_block_options_with_cache(&cache));

        // Keep whatever CFs already exist on disk; RocksDB refuses to open
        // a database without listing all of them.
        let mut existing = match DB::list_cf(&db_opts, path) {
            Ok(cfs) if !cfs.is_empty() => cfs,
            _ => vec!["default".to_string()],
        };
        for cf in CacheCf::ALL {
            if !existing.iter().any(|n| n == cf.name()) {
                existing.push(cf.name().to_string());
            }
        }

        let cf_descriptors: Vec<_> = existing
            .iter()
            .map(|name| {
                let mut cf_opts = Options::default();
                cf_opts.set_write_buffer_size(self.settings.write_buffer_size);
                cf_opts.set_max_write_buffer_number(self.settings.max_write_buffers);
                cf_opts.set_block_based_table_factory(&create_block_options_with_cache(&cache));
                ColumnFamilyDescriptor::new(name, cf_opts)
            })
            .collect();

        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)
            .map_err(|e| anyhow::anyhow!("Failed to open RocksDB at {}: {}", path.display(), e))?;
        log::debug!(
            "RocksDB opened at {} with column families: {}",
            path.display(),
            existing.join(", ")
        );

        Ok(Arc::new(db))
    }
}

pub(crate) fn create_block_options_with_cache(cache: &Cache) -> BlockBasedOptions {
    let mut block_opts = BlockBasedOptions::default();
    block_opts.set_block_cache(cache);
    // Point lookups dominate: get / exists go straight to one key.
    block_opts.set_bloom_filter(10.0, false);
    block_opts.set_cache_index_and_filter_blocks(true);
    block_opts.set_pin_l0_filter_and_index_blocks_in_cache(true);
    block_opts.set_whole_key_filtering(true);
    block_opts
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_cache_column_families() {
        let temp_dir = TempDir::new().unwrap();
        let db = RocksDbInit::with_defaults(temp_dir.path()).open().unwrap();

        for cf in CacheCf::ALL {
            assert!(db.cf_handle(cf.name()).is_some(), "missing {}", cf.name());
        }
    }

    #[test]
    fn test_reopen_keeps_unknown_column_families() {
        let temp_dir = TempDir::new().unwrap();
        {
            let mut opts = Options::default();
            opts.create_if_missing(true);
            opts.create_missing_column_families(true);
            let _db = DB::open_cf(&opts, temp_dir.path(), ["legacy"]).unwrap();
        }

        let db = RocksDbInit::with_defaults(temp_dir.path()).open().unwrap();
        assert!(db.cf_handle("legacy").is_some());
        assert!(db.cf_handle(CacheCf::Entries.name()).is_some());
    }
}
