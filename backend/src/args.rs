use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pinecache - operator tool for the namespaced key-value cache
#[derive(Parser, Debug)]
#[command(name = "pinecache")]
#[command(author = "PineCache Team")]
#[command(version)]
#[command(about = "Inspect and edit a pinecache store", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults are used when it does not exist)
    #[arg(short = 'c', long = "config", default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the value stored under KEY (exit code 1 when missing)
    Get { table: String, key: String },

    /// Store VALUE under KEY, creating the table if needed
    Set {
        table: String,
        key: String,
        value: String,
    },

    /// Print whether KEY has an entry (creates the table if it is absent)
    Exists { table: String, key: String },

    /// Remove KEY from a present table
    Delete { table: String, key: String },

    /// Remove a table and all of its entries
    Flush { table: String },

    /// List present tables
    Tables,
}
