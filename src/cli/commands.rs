use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "devicedb",
    version,
    about = "Flat-file credential store for network devices",
    after_help = "Records are addressed by their 0-based line number in the database file. \
                  Addresses shift after every add or delete, so run 'devicedb list' again \
                  before issuing another edit or delete."
)]
pub struct Cli {
    /// Directory holding db.txt, history/ and devicedb.toml
    #[arg(short, long, global = true, default_value = ".")]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the database file and history directory if missing
    Init,

    /// List all records with their line numbers
    List,

    /// Add a record from a JSON object with all 12 fields
    Add {
        /// Record JSON, e.g. '{"name":"sw1","ip":"10.0.0.1",...}'
        json: String,
        /// Insert right after this line number instead of appending
        #[arg(short, long)]
        after: Option<usize>,
    },

    /// Replace the record at a line number
    Edit {
        /// Line number as shown by `list`
        line: usize,
        /// Record JSON with all 12 fields
        json: String,
    },

    /// Delete the record at a line number
    Delete {
        /// Line number as shown by `list`
        line: usize,
    },

    /// List backups, newest first
    Backups,

    /// Restore the database file from a backup
    Restore {
        /// Backup name, e.g. db_2024_01_31_23_59
        name: String,
    },

    /// Serve the HTTP API
    Serve {
        /// Listen address override (default from devicedb.toml, else 127.0.0.1:8000)
        #[arg(short, long)]
        listen: Option<String>,
    },
}
