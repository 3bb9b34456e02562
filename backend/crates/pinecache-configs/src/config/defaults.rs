// Default value functions

pub fn default_true() -> bool {
    true
}

pub fn default_data_path() -> String {
    "./data".to_string() // Default dev path; normalized to absolute at runtime
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_log_format() -> String {
    "compact".to_string()
}

pub fn default_logs_path() -> String {
    "./logs".to_string()
}

// RocksDB defaults
pub fn default_rocksdb_write_buffer_size() -> usize {
    2 * 1024 * 1024 // 2MB; only two column families exist so this stays small
}

pub fn default_rocksdb_max_write_buffers() -> i32 {
    2
}

pub fn default_rocksdb_block_cache_size() -> usize {
    8 * 1024 * 1024 // 8MB, shared by both column families
}

pub fn default_rocksdb_max_background_jobs() -> i32 {
    2
}

pub fn default_rocksdb_sync_writes() -> bool {
    false
}

pub fn default_rocksdb_max_open_files() -> i32 {
    512 // Reasonable default that stays under typical OS limits
}
