//! CLI argument definitions using clap
//!
//! Commands:
//! - condstore inspect --file <path> [--config <path>]
//! - condstore verify --file <path> [--config <path>]
//! - condstore objects --file <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// condstore - inspect and verify conditions catalogs
#[derive(Parser, Debug)]
#[command(name = "condstore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load a catalog and print its summary
    Inspect {
        /// Path to the storage container
        #[arg(long)]
        file: PathBuf,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Load a catalog and import it into a fresh manager
    Verify {
        /// Path to the storage container
        #[arg(long)]
        file: PathBuf,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the objects stored in a container
    Objects {
        /// Path to the storage container
        #[arg(long)]
        file: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
