//! Command-line argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "roundtable")]
#[command(about = "Multi-persona discussion engine with moderator facilitation")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a config file (overrides discovered configs)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Skip all config files and use built-in defaults
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Emit JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a party discussion on a topic
    Run {
        /// The discussion topic
        #[arg(short, long)]
        topic: String,

        /// Participating persona ids (comma-separated or repeated)
        #[arg(short, long, value_delimiter = ',')]
        agents: Vec<String>,

        /// Turn ordering: round-robin, dynamic or moderator-directed
        #[arg(short, long)]
        ordering: Option<String>,

        /// Persona id to act as moderator
        #[arg(short, long)]
        moderator: Option<String>,

        /// Number of rounds to play
        #[arg(short, long, default_value_t = 1)]
        rounds: u32,

        /// A user message opening the second round (supports @mentions)
        #[arg(long)]
        message: Option<String>,
    },

    /// List the personas available to the catalog
    Personas,
}
