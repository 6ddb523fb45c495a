//! CLI argument definitions using clap

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Org chart stored as a nested-set tree, with per-language node names and an HTTP API
#[derive(Parser, Debug)]
#[command(name = "orgchart")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global one
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// SQLite database file (overrides config)
    #[arg(long, global = true, env = "ORGCHART_DATABASE", value_hint = ValueHint::FilePath)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the HTTP API until Ctrl-C
    Serve {
        /// Listen address (overrides config)
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },

    /// List nodes in pre-order
    List {
        /// Display language
        #[arg(short, long, default_value = "English")]
        language: String,
        /// Zero-based page index
        #[arg(long)]
        page_num: Option<String>,
        /// Page size, 0 for everything
        #[arg(long)]
        page_size: Option<String>,
    },

    /// Show one node
    Get {
        id: i64,
        /// Display language
        #[arg(short, long, default_value = "English")]
        language: String,
    },

    /// Search the direct children of a node by name
    Children {
        id: i64,
        /// Language to search and display in
        #[arg(short, long, default_value = "English")]
        language: String,
        /// Case-insensitive substring of the child's name
        #[arg(short, long)]
        search: String,
        /// Zero-based page index
        #[arg(long)]
        page_num: Option<String>,
        /// Page size, 0 for everything
        #[arg(long)]
        page_size: Option<String>,
    },

    /// Append a node as the last child of a parent
    Insert {
        /// Parent node id
        parent: i64,
        /// Name in one language, e.g. --name English=Legal --name Italian=Legale
        #[arg(short, long = "name", value_name = "LANG=NAME", required = true)]
        names: Vec<String>,
    },

    /// Render the whole chart as a tree
    Tree {
        /// Display language
        #[arg(short, long, default_value = "English")]
        language: String,
    },

    /// Validate nested-set invariants over the whole store
    Check,

    /// Load the reference org chart into an empty store
    Seed,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print a config template
    Template,

    /// Show config paths
    Path,
}
