//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Delete hierarchically related repository objects leaf-first
#[derive(Parser, Debug)]
#[command(name = "purgetree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory searched for a local .purgetree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    /// Container id, overrides config and manifest
    #[arg(short, long, global = true)]
    pub root: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify the batch is complete (no orphans, nothing unreachable)
    Check {
        /// Batch manifest (TOML), `-` for stdin
        #[arg(value_hint = ValueHint::FilePath)]
        manifest: PathBuf,
    },

    /// Print the deletion order
    Plan {
        /// Batch manifest (TOML), `-` for stdin
        #[arg(value_hint = ValueHint::FilePath)]
        manifest: PathBuf,
    },

    /// Show the batch as a tree
    Tree {
        /// Batch manifest (TOML), `-` for stdin
        #[arg(value_hint = ValueHint::FilePath)]
        manifest: PathBuf,
    },

    /// Delete the batch leaf-first with the configured remove command
    Run {
        /// Batch manifest (TOML), `-` for stdin
        #[arg(value_hint = ValueHint::FilePath)]
        manifest: PathBuf,
        /// Only log what would be removed
        #[arg(short = 'n', long)]
        dry_run: bool,
        /// Stop after this many removals
        #[arg(short, long)]
        limit: Option<usize>,
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
    /// Show effective settings
    Show,
    /// Show config file locations
    Path,
}
