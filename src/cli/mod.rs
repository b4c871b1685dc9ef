//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{CheckVersionCommand, GateCommand, RunCommand, ValidateCommand};

/// Release gating and publish sequencing for CI jobs
#[derive(Debug, Parser, Clone)]
#[command(name = "relgate")]
#[command(author = "relgate Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Release gating, version validation, and publish sequencing", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run a release sequence
    Run(RunCommand),

    /// Validate a release configuration
    Validate(ValidateCommand),

    /// Evaluate a skip gate (exit 0 = permit, 1 = deny)
    Gate(GateCommand),

    /// Check a version string against a build type
    CheckVersion(CheckVersionCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

use std::ffi::OsString;
