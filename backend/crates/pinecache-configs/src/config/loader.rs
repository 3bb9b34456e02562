use super::types::ServerConfig;
use crate::file_helpers::normalize_dir_path;
use std::fs;
use std::path::Path;

const VALID_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const VALID_FORMATS: [&str; 2] = ["compact", "json"];

impl ServerConfig {
    /// Load configuration from a TOML file, apply environment overrides and
    /// finalize it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides()?;
        config.finalize()?;

        Ok(config)
    }

    /// Load configuration from `path` when it exists, otherwise start from
    /// defaults. Environment overrides and validation apply either way.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if path.as_ref().exists() {
            return Self::from_file(path);
        }

        let mut config = ServerConfig::default();
        config.apply_env_overrides()?;
        config.finalize()?;
        Ok(config)
    }

    /// Parse configuration from TOML text without touching the environment.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - PINECACHE_DATA_DIR: Override storage.data_path
    /// - PINECACHE_LOG_LEVEL: Override logging.level
    /// - PINECACHE_LOG_TO_CONSOLE: Override logging.log_to_console
    /// - PINECACHE_LOG_FORMAT: Override logging.format
    ///
    /// Environment variables take precedence over config.toml values
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        use std::env;

        if let Ok(path) = env::var("PINECACHE_DATA_DIR") {
            self.storage.data_path = path;
        }

        if let Ok(level) = env::var("PINECACHE_LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }

        if let Ok(val) = env::var("PINECACHE_LOG_TO_CONSOLE") {
            self.logging.log_to_console = match val.to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(anyhow::anyhow!(
                        "Invalid PINECACHE_LOG_TO_CONSOLE value: {}",
                        val
                    ))
                }
            };
        }

        if let Ok(format) = env::var("PINECACHE_LOG_FORMAT") {
            self.logging.format = format.to_lowercase();
        }

        Ok(())
    }

    /// Normalize directory-like paths to absolute paths for consistent runtime behavior.
    fn normalize_paths(&mut self) {
        self.storage.data_path = normalize_dir_path(&self.storage.data_path);
        self.logging.logs_path = normalize_dir_path(&self.logging.logs_path);
    }

    /// Normalize local filesystem paths and validate configuration.
    ///
    /// Call this after applying environment overrides.
    pub fn finalize(&mut self) -> anyhow::Result<()> {
        self.normalize_paths();
        self.validate()?;
        Ok(())
    }

    /// Validate configuration settings
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.storage.data_path.trim().is_empty() {
            return Err(anyhow::anyhow!("storage.data_path cannot be empty"));
        }

        if !VALID_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                VALID_LEVELS.join(", ")
            ));
        }

        if !VALID_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                VALID_FORMATS.join(", ")
            ));
        }

        for (target, level) in &self.logging.targets {
            if !VALID_LEVELS.contains(&level.as_str()) {
                return Err(anyhow::anyhow!(
                    "Invalid log level '{}' for target '{}'. Must be one of: {}",
                    level,
                    target,
                    VALID_LEVELS.join(", ")
                ));
            }
        }

        let rocksdb = &self.storage.rocksdb;
        if rocksdb.write_buffer_size == 0 {
            return Err(anyhow::anyhow!("storage.rocksdb.write_buffer_size cannot be 0"));
        }
        if rocksdb.max_write_buffers < 1 {
            return Err(anyhow::anyhow!("storage.rocksdb.max_write_buffers must be at least 1"));
        }
        if rocksdb.max_background_jobs < 1 {
            return Err(anyhow::anyhow!(
                "storage.rocksdb.max_background_jobs must be at least 1"
            ));
        }
        if rocksdb.max_open_files == 0 || rocksdb.max_open_files < -1 {
            return Err(anyhow::anyhow!(
                "storage.rocksdb.max_open_files must be -1 (unlimited) or positive"
            ));
        }
        if rocksdb.sync_writes && rocksdb.disable_wal {
            return Err(anyhow::anyhow!(
                "storage.rocksdb.sync_writes requires the WAL; unset disable_wal"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = ServerConfig::default();
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_target_level() {
        let mut config = ServerConfig::default();
        config.logging.targets.insert("rocksdb".to_string(), "loud".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("rocksdb"));
    }

    #[test]
    fn test_sync_writes_without_wal_rejected() {
        let mut config = ServerConfig::default();
        config.storage.rocksdb.sync_writes = true;
        config.storage.rocksdb.disable_wal = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ServerConfig::from_toml_str(
            r#"
            [storage]
            data_path = "/srv/pinecache"

            [storage.rocksdb]
            sync_writes = true

            [logging.targets]
            pinecache_store = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.data_path, "/srv/pinecache");
        assert!(config.storage.rocksdb.sync_writes);
        assert_eq!(config.storage.rocksdb.max_open_files, 512);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.targets.get("pinecache_store").map(String::as_str), Some("debug"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_toml_is_rejected() {
        let err = ServerConfig::from_toml_str("[storage\ndata_path = 1").unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    #[serial]
    fn test_from_file_normalizes_paths() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[storage]\ndata_path = \"./cache-data\"").unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert!(Path::new(&config.storage.data_path).is_absolute());
        assert!(config.storage.rocksdb_dir().ends_with("cache-data/rocksdb"));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("PINECACHE_DATA_DIR", "/tmp/pinecache-env");
        std::env::set_var("PINECACHE_LOG_LEVEL", "DEBUG");
        std::env::set_var("PINECACHE_LOG_TO_CONSOLE", "no");

        let mut config = ServerConfig::default();
        let result = config.apply_env_overrides();

        std::env::remove_var("PINECACHE_DATA_DIR");
        std::env::remove_var("PINECACHE_LOG_LEVEL");
        std::env::remove_var("PINECACHE_LOG_TO_CONSOLE");

        result.unwrap();
        assert_eq!(config.storage.data_path, "/tmp/pinecache-env");
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.log_to_console);
    }

    #[test]
    #[serial]
    fn test_invalid_console_override() {
        std::env::set_var("PINECACHE_LOG_TO_CONSOLE", "maybe");
        let mut config = ServerConfig::default();
        let result = config.apply_env_overrides();
        std::env::remove_var("PINECACHE_LOG_TO_CONSOLE");
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_load_or_default_without_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ServerConfig::load_or_default(dir.path().join("missing.toml")).unwrap();
        assert!(Path::new(&config.storage.data_path).is_absolute());
        assert_eq!(config.logging.format, "compact");
    }
}
