//! # pinecache-core
//!
//! A persistent, namespaced key-value cache over a shared transactional store.
//!
//! Each [`Cache`] is bound to one table of an application-wide
//! [`StorageBackend`]; every operation runs as exactly one store transaction.
//!
//! ```rust,ignore
//! use pinecache_core::Cache;
//! use std::sync::Arc;
//!
//! let store: Arc<dyn StorageBackend> = bootstrap_store()?;
//! let sessions = Cache::new(Arc::clone(&store), "session");
//! sessions.set("user:42", &[0x01, 0x02])?;
//! assert_eq!(sessions.get("user:42"), vec![0x01, 0x02]);
//! ```

pub mod cache;
pub mod lookup;

pub use cache::Cache;
pub use lookup::Lookup;

pub use pinecache_store::{StorageBackend, StorageError, Table};
