//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Speciterator - iterative requirement clarification
#[derive(Parser)]
#[command(
    name = "si",
    about = "Turn rough requirements into complete specifications through clarification rounds",
    version = env!("CARGO_PKG_VERSION"),
    after_help = "Logs are written to: ~/.local/share/speciterator/logs/si.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute (defaults to repl)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Start the interactive clarification shell
    Repl {
        /// Requirement to start a session with
        requirement: Option<String>,

        /// Domain context, e.g. e-commerce or healthcare
        #[arg(short, long)]
        domain: Option<String>,

        /// Target audience: technical, business or mixed
        #[arg(short, long)]
        audience: Option<String>,
    },

    /// Show version, API key health and the scoring model
    Info,
}
