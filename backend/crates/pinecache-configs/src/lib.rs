//! pinecache-configs
//!
//! Configuration types and loader for pinecache.

pub mod config;
pub mod file_helpers;

pub use config::*;
pub use config::defaults;
