//! Key encoding utilities for RocksDB keys.
//!
//! All entries of every table share one column family, so an entry key is
//! prefixed with its table name:
//!
//! ```text
//! [ name length: u64 big-endian ][ table name bytes ][ entry key bytes ]
//! ```
//!
//! The length prefix keeps `"a"` + `"b..."` from colliding with `"ab"` + `"..."`
//! and lets a table's entries be removed with a single range delete over
//! `[table_prefix, prefix_upper_bound(table_prefix))`.

use crate::storage_trait::{Result, StorageError};

const LEN_PREFIX: usize = std::mem::size_of::<u64>();

/// Encode the prefix shared by every entry of `table`.
///
/// # Examples
///
/// ```
/// use pinecache_store::key_encoding::table_prefix;
///
/// let prefix = table_prefix("ab");
/// assert_eq!(prefix, vec![0, 0, 0, 0, 0, 0, 0, 2, b'a', b'b']);
/// ```
pub fn table_prefix(table: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(LEN_PREFIX + table.len());
    out.extend_from_slice(&(table.len() as u64).to_be_bytes());
    out.extend_from_slice(table.as_bytes());
    out
}

/// Encode the storage key of `key` inside `table`.
///
/// # Examples
///
/// ```
/// use pinecache_store::key_encoding::{entry_key, table_prefix};
///
/// let encoded = entry_key("session", b"user:42");
/// assert!(encoded.starts_with(&table_prefix("session")));
/// assert!(encoded.ends_with(b"user:42"));
/// ```
pub fn entry_key(table: &str, key: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(LEN_PREFIX + table.len() + key.len());
    out.extend_from_slice(&(table.len() as u64).to_be_bytes());
    out.extend_from_slice(table.as_bytes());
    out.extend_from_slice(key);
    out
}

/// Split an encoded entry key back into `(table, key)`.
pub fn split_entry_key(encoded: &[u8]) -> Result<(&str, &[u8])> {
    if encoded.len() < LEN_PREFIX {
        return Err(StorageError::Corruption(format!(
            "entry key too short: {} bytes",
            encoded.len()
        )));
    }

    let (len_bytes, rest) = encoded.split_at(LEN_PREFIX);
    let mut buf = [0u8; LEN_PREFIX];
    buf.copy_from_slice(len_bytes);
    let name_len = u64::from_be_bytes(buf) as usize;

    if rest.len() < name_len {
        return Err(StorageError::Corruption(format!(
            "entry key declares a {}-byte table name but only {} bytes follow",
            name_len,
            rest.len()
        )));
    }

    let (name, key) = rest.split_at(name_len);
    let name = std::str::from_utf8(name)
        .map_err(|e| StorageError::Corruption(format!("table name is not UTF-8: {}", e)))?;
    Ok((name, key))
}

/// Smallest key strictly greater than every key starting with `prefix`.
///
/// Returns `None` when no such key exists (the prefix is empty or all `0xFF`).
pub fn prefix_upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut upper = prefix.to_vec();
    while let Some(last) = upper.pop() {
        if last < u8::MAX {
            upper.push(last + 1);
            return Some(upper);
        }
    }
    None
}
