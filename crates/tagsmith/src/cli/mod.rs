//! CLI definition and command handling

pub mod commands;
mod context;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{ChangelogCommand, InitCommand, LintCommand, PackagesCommand, VersionCommand};

pub use context::RepoContext;

/// tagsmith - changelog and version automation for multi-package repositories
#[derive(Debug, Parser)]
#[command(name = "tagsmith")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Configuration file (searched upward from the working directory by default)
    #[arg(long, global = true, env = "TAGSMITH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write a default tagsmith configuration
    Init(InitCommand),

    /// Decide the next version of one or all packages
    Version(VersionCommand),

    /// Generate and merge a package changelog
    Changelog(ChangelogCommand),

    /// Check a commit message against the commit rules
    Lint(LintCommand),

    /// List the packages of the repository
    Packages(PackagesCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        // Change to specified directory if provided
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match self.command {
            Commands::Init(ref cmd) => cmd.execute(&self),
            Commands::Version(ref cmd) => cmd.execute(&self),
            Commands::Changelog(ref cmd) => cmd.execute(&self),
            Commands::Lint(ref cmd) => cmd.execute(&self),
            Commands::Packages(ref cmd) => cmd.execute(&self),
        }
    }
}
