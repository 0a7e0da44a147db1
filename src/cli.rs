use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "anistream")]
#[command(author, version, about = "Anime catalog lookup with metadata enrichment")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search the catalog by name
    Search {
        /// Text to search for
        #[arg(required = true)]
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },

    /// Browse the catalog page by page
    Browse {
        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Entries per page
        #[arg(short, long, default_value = "20")]
        limit: u32,

        /// Only include entries with this genre (repeatable)
        #[arg(short, long = "genre")]
        genres: Vec<String>,
    },

    /// List popular entries
    Popular {
        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Entries per page
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },

    /// Show full details for one title
    Info {
        /// Catalog identifier, as returned by search or browse
        #[arg(required = true)]
        identifier: String,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
