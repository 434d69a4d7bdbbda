//! dispatch - Route free-text tasks to the right AI CLI tool
//!
//! "Describe the task. Get the right tool."
//!
//! dispatch reads a YAML tool catalog and routing rules, matches the
//! task against keyword rules, scores the candidates (installed tools
//! and free, fast ones score higher), and recommends or runs the best
//! one. Every decision is logged for history and stats.

mod cli;
mod display;
mod run;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    cli::run(Cli::parse())
}
