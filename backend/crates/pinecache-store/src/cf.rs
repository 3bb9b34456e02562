/// Column families used by the RocksDB backend.
/// Centralizes names so the initializer and the backend agree on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFamily {
    /// One marker per present table: key = raw table name, empty value.
    Tables,
    /// Every entry of every table, keyed by `key_encoding::entry_key`.
    Entries,
}

impl ColumnFamily {
    /// Every column family the backend needs at open time.
    pub const ALL: [ColumnFamily; 2] = [ColumnFamily::Tables, ColumnFamily::Entries];

    /// Returns the canonical column family name.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnFamily::Tables => "cache_tables",
            ColumnFamily::Entries => "cache_entries",
        }
    }
}
