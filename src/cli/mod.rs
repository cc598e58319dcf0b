//! CLI module for condstore
//!
//! Provides command-line interface for:
//! - inspect: Summarize a stored catalog
//! - verify: Import a stored catalog into a fresh manager
//! - objects: List the objects of a container

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{inspect, objects, run, run_command, verify, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
