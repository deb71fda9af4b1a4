use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gamedex")]
#[command(about = "gamedex - Autocomplete and top-N queries over a game catalog.")]
#[command(version = env!("VERSION"))]
pub struct Cli {
    /// Path to one or more config files (merged in order).
    #[arg(long, default_value = "config.toml", action = clap::ArgAction::Append)]
    pub config: Vec<PathBuf>,

    /// Path to SQLite database file. Overrides `db.path` in the config.
    #[arg(long = "db")]
    pub db_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a sample config file.
    NewConfig {
        /// Output path for config file.
        #[arg(short, long, default_value = "config.toml")]
        path: PathBuf,
    },

    /// Create the catalog schema in a new database.
    Install {
        /// Assume 'yes' to any manual prompts during installation.
        #[arg(long)]
        yes: bool,
    },

    /// Import a CSV file (appid,name,price,score,release_date) into the database.
    Import {
        /// CSV file to import.
        #[arg(long)]
        file: PathBuf,
    },

    /// Autocomplete titles starting with a word prefix.
    Search {
        /// Partial title. Empty lists the first indexed titles.
        #[arg(default_value = "")]
        query: String,

        /// Maximum number of suggestions.
        #[arg(short, long)]
        limit: Option<usize>,

        /// Only match titles with a word sequence ending exactly at the query.
        #[arg(long)]
        exact: bool,
    },

    /// Select the best records by an attribute.
    Top {
        /// Sort key: price, score or release_date.
        #[arg(long)]
        by: Option<String>,

        /// Highest values first.
        #[arg(long)]
        desc: bool,

        /// Maximum number of records.
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show catalog and index statistics.
    Stats,
}
