//! CLI definition and command handling

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use herald_core::config::load_config_or_default;
use herald_core::Config;

use commands::{ChangelogCommand, InitCommand, ReleaseCommand, ValidateCommand, VersionCommand};

/// Herald - changelog, tag and release automation
#[derive(Debug, Parser)]
#[command(name = "herald")]
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
    /// Write a default herald.json
    Init(InitCommand),

    /// Calculate the next version
    Version(VersionCommand),

    /// Preview or write the changelog entry for the next release
    Changelog(ChangelogCommand),

    /// Update the changelog, tag, open pull requests and publish a release
    Release(ReleaseCommand),

    /// Validate configuration and repository state
    Validate(ValidateCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match self.command {
            Commands::Init(ref cmd) => cmd.execute(&self),
            Commands::Version(ref cmd) => cmd.execute(&self),
            Commands::Changelog(ref cmd) => cmd.execute(&self),
            Commands::Release(ref cmd) => cmd.execute(&self),
            Commands::Validate(ref cmd) => cmd.execute(&self),
        }
    }
}

/// Load the nearest config, telling the user when defaults are in use
pub fn load_config(cli: &Cli, dir: &Path) -> anyhow::Result<(Config, Option<PathBuf>)> {
    let (config, path) = load_config_or_default(dir)?;
    if path.is_none() && !cli.quiet && cli.format == OutputFormat::Text {
        output::warning("No herald.json found, using defaults. Run `herald init` to create one.");
    }
    Ok((config, path))
}
