//! IMEI Blackbird - TAC based IMEI generation and online validation
//!
//! Generates IMEIs from an 8-digit Type Allocation Code, checks them against
//! an online lookup one at a time, and keeps a small JSON list of device
//! templates with the latest result per row.

// Module declarations
pub mod application;
pub mod commands;
pub mod domain;
pub mod infrastructure;

use clap::Parser;

pub use commands::{Cli, Command};

/// Parses the process arguments and runs the selected command
pub async fn run() -> anyhow::Result<()> {
    commands::execute(Cli::parse()).await
}
