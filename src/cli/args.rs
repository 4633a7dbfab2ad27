//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::domain::prerequisite::Language;

/// Program tree engine: inspect, check and edit curriculum trees stored in TOML fixtures
#[derive(Parser, Debug)]
#[command(name = "progtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level: -d info, -d -d debug, -d -d -d trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global one
    #[arg(short, long, global = true, env = "PROGTREE_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Fixture and root of the tree a command works on.
#[derive(Args, Debug, Clone)]
pub struct TreeArgs {
    /// TOML fixture seeding the store
    #[arg(value_hint = ValueHint::FilePath)]
    pub fixture: PathBuf,

    /// Code of the root node
    #[arg(long)]
    pub code: String,

    /// Academic year of the root node
    #[arg(long)]
    pub year: u32,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a tree
    Tree {
        #[command(flatten)]
        tree: TreeArgs,
    },

    /// Check the structure, prerequisites and 2M rules of a tree
    Check {
        #[command(flatten)]
        tree: TreeArgs,
    },

    /// Paste a stored node and print the resulting tree
    Paste {
        #[command(flatten)]
        tree: TreeArgs,

        /// Path of the new parent, e.g. "1|12"
        #[arg(long)]
        path: String,

        /// Code of the node to paste
        #[arg(long)]
        node_code: String,

        /// Year of the node to paste (default: tree year)
        #[arg(long)]
        node_year: Option<u32>,

        /// Attach by reference
        #[arg(long)]
        reference: bool,

        /// Attach as optional
        #[arg(long)]
        optional: bool,

        /// Years of study, e.g. 12
        #[arg(long)]
        block: Option<u32>,

        #[arg(long, allow_negative_numbers = true)]
        relative_credits: Option<i32>,

        /// Also detach the node from this path (cut and paste)
        #[arg(long)]
        detach_from: Option<String>,
    },

    /// Detach a node and print the resulting tree
    Detach {
        #[command(flatten)]
        tree: TreeArgs,

        /// Path of the node to detach
        #[arg(long)]
        path: String,
    },

    /// Copy a tree year after year up to its end
    Postpone {
        #[command(flatten)]
        tree: TreeArgs,
    },

    /// Parse a prerequisite expression and print its canonical forms
    Prerequisite {
        /// Expression, e.g. "LDROI1300 ET (LAGRO2400 OU LBIR5600)"
        expression: String,

        /// Language of the printed operators
        #[arg(long, default_value = "fr")]
        lang: Language,
    },

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
    /// Show the effective configuration
    Show,
    /// Print a commented template
    Template,
    /// Print the global config file location
    Path,
}
