//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::domain::ROOT_KEY;

/// In-memory hierarchical key-value store: inspect config and translation files
#[derive(Parser, Debug)]
#[command(name = "kvtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more: -d -d -d)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Data file to load (default: data_file from config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every value below a key
    Show {
        /// Key or dotted path
        #[arg(default_value = ROOT_KEY)]
        key: String,
    },

    /// Print the subtree below a key
    Tree {
        /// Key or dotted path
        #[arg(default_value = ROOT_KEY)]
        key: String,
    },

    /// Print the value of a leaf
    Get {
        /// Key or dotted path
        key: String,
    },

    /// Print the kind of a node (parent, string, integer)
    Type {
        /// Key or dotted path
        key: String,
    },

    /// Look up a translation, falling back to the configured language
    Text {
        /// Text key
        key: String,
        /// Language section to search first
        #[arg(short, long)]
        language: String,
    },

    /// Validate a data file
    Check,

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
    /// Show effective configuration
    Show,
    /// Show config file locations
    Path,
    /// Print a config template
    Template,
}
