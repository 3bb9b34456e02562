//! Subcommand execution against an open store.

use crate::args::Command;
use anyhow::{Context, Result};
use log::debug;
use pinecache_core::{Cache, Lookup, StorageBackend};
use std::io::Write;
use std::sync::Arc;

/// How a successful command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// `get` found no entry; the process exits with status 1.
    NotFound,
}

/// Run `command` and write its output to `out`.
pub fn execute(
    store: &Arc<dyn StorageBackend>,
    command: &Command,
    out: &mut dyn Write,
) -> Result<Outcome> {
    debug!("Executing {:?}", command);

    match command {
        Command::Get { table, key } => {
            let cache = Cache::new(Arc::clone(store), table.as_str());
            match cache.lookup(key) {
                Lookup::Found(value) => {
                    out.write_all(&value)?;
                    Ok(Outcome::Done)
                }
                Lookup::NotFound => Ok(Outcome::NotFound),
                Lookup::Failed(e) => Err(e).with_context(|| format!("get {}/{}", table, key)),
            }
        }
        Command::Set { table, key, value } => {
            Cache::new(Arc::clone(store), table.as_str())
                .set(key, value.as_bytes())
                .with_context(|| format!("set {}/{}", table, key))?;
            Ok(Outcome::Done)
        }
        Command::Exists { table, key } => {
            let found = Cache::new(Arc::clone(store), table.as_str()).is_exist(key);
            writeln!(out, "{}", found)?;
            Ok(Outcome::Done)
        }
        Command::Delete { table, key } => {
            Cache::new(Arc::clone(store), table.as_str())
                .delete(key)
                .with_context(|| format!("delete {}/{}", table, key))?;
            Ok(Outcome::Done)
        }
        Command::Flush { table } => {
            Cache::new(Arc::clone(store), table.as_str())
                .flush()
                .with_context(|| format!("flush {}", table))?;
            Ok(Outcome::Done)
        }
        Command::Tables => {
            for table in store.list_tables()? {
                writeln!(out, "{}", table)?;
            }
            Ok(Outcome::Done)
        }
    }
}
