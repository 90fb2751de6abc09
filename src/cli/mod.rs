//! `Serve` replaces the teacher's `Fixtures`/`Server { DryStart, Scan }`
//! subcommands (spec.md has no audio-library scanning — tracks arrive via
//! upload, not disk discovery).

use clap::{Parser, Subcommand};

#[derive(Parser)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Runs the HTTP server against the configured Postgres/Redis/S3 backends.
    Serve,
}
