pub mod files;
pub mod groups;
pub mod import;
pub mod init;
pub mod tx;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db::open_ledger;
use crate::error::Result;
use crate::settings::resolve_data_dir;

pub(crate) fn open(data_dir: Option<&str>) -> Result<Connection> {
    open_ledger(&resolve_data_dir(data_dir))
}

#[derive(Parser)]
#[command(name = "splitbook", about = "Split shared expenses from bank statement exports.")]
pub struct Cli {
    /// Ledger directory (default: from settings, ~/Documents/splitbook)
    #[arg(long = "data-dir", env = "SPLITBOOK_DATA_DIR", global = true)]
    pub data_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the ledger database.
    Init {
        /// Default uploader identity for imports
        #[arg(long)]
        owner: Option<String>,
    },
    /// Manage groups.
    Groups {
        #[command(subcommand)]
        command: GroupsCommands,
    },
    /// Manage uploaded statement files.
    Files {
        #[command(subcommand)]
        command: FilesCommands,
    },
    /// Import a bank statement CSV into a group.
    Import {
        /// Path to the CSV export
        file: String,
        /// Group ID to attach the statement to
        #[arg(long)]
        group: i64,
        /// Who uploaded the statement (default: settings.default_owner)
        #[arg(long)]
        owner: Option<String>,
    },
    /// Inspect and categorize transactions.
    Tx {
        #[command(subcommand)]
        command: TxCommands,
    },
}

#[derive(Subcommand)]
pub enum GroupsCommands {
    /// Create a group for two participants.
    Add {
        /// Display name, must be unique
        name: String,
        #[arg(long)]
        person1: String,
        #[arg(long)]
        person2: String,
    },
    /// List groups.
    List {
        /// Include hidden groups
        #[arg(long)]
        all: bool,
        #[arg(long, default_value = "0")]
        skip: i64,
        #[arg(long, default_value = "10")]
        limit: i64,
    },
    /// Show a group and its files.
    Show { id: i64 },
    /// Hide a group from the default listing.
    Hide { id: i64 },
    /// Make a hidden group visible again.
    Unhide { id: i64 },
    /// Archive a group.
    Archive { id: i64 },
    /// Restore an archived group.
    Restore { id: i64 },
    /// Mark a group as settled.
    Settle { id: i64 },
    /// Clear the settled mark.
    Unsettle { id: i64 },
    /// Delete a group with all of its files and transactions.
    Delete { id: i64 },
    /// Show the balance of one group.
    Balance { id: i64 },
    /// Show balances of all groups.
    Balances,
}

#[derive(Subcommand)]
pub enum FilesCommands {
    /// List the files of a group.
    List { group: i64 },
    /// Show one file.
    Show { id: i64 },
    /// Delete a file and its transactions.
    Delete {
        id: i64,
        #[arg(long)]
        group: i64,
    },
    /// Set the cached participant balances of a file.
    Balances {
        id: i64,
        #[arg(long, allow_hyphen_values = true)]
        person1: f64,
        #[arg(long, allow_hyphen_values = true)]
        person2: f64,
    },
    /// List the transactions of a file.
    Transactions { id: i64 },
}

#[derive(Subcommand)]
pub enum TxCommands {
    /// Show one transaction.
    Show { id: i64 },
    /// Create or update transactions of a group from a JSON array ('-' for stdin).
    Save {
        input: String,
        #[arg(long)]
        group: i64,
    },
    /// Append transactions to a file from a JSON array ('-' for stdin), without deduplication.
    Add {
        input: String,
        #[arg(long)]
        file: i64,
    },
    /// Create or update a single transaction.
    Set {
        #[arg(long)]
        file: i64,
        #[arg(long)]
        date: String,
        #[arg(long)]
        description: String,
        #[arg(long, allow_hyphen_values = true)]
        amount: f64,
        /// Ignore, Split, Person1, Person2 or any other tag
        #[arg(long)]
        action: String,
        #[arg(long)]
        owner: String,
        #[arg(long = "previous-action")]
        previous_action: Option<String>,
    },
    /// Suggest actions for descriptions from past transactions of an owner.
    Suggest {
        #[arg(long)]
        owner: String,
        #[arg(required = true)]
        descriptions: Vec<String>,
    },
}
