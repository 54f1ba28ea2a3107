//! Version command

use clap::Args;
use console::style;
use tracing::info;

use herald_core::types::ReleaseType;
use herald_git::GitRepo;

use crate::cli::{load_config, Cli, OutputFormat};
use crate::workflow::resolve_version;

/// Show the current and next version
#[derive(Debug, Args)]
pub struct VersionCommand {
    /// Force a specific release type
    #[arg(short, long)]
    pub release_type: Option<ReleaseType>,

    /// Show current version only
    #[arg(long)]
    pub current: bool,
}

impl VersionCommand {
    /// Execute the version command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(release_type = ?self.release_type, current = self.current, "executing version command");
        let cwd = std::env::current_dir()?;
        let (config, _) = load_config(cli, &cwd)?;
        let repo = GitRepo::discover(&cwd)?;

        let resolved = resolve_version(&config, &repo, None, self.release_type)?;
        let current = resolved.current_version();

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "current": current,
                    "previous_tag": resolved.previous_name(),
                    "next": resolved.version,
                    "tag": resolved.tag,
                    "release_type": resolved.release_type.map(|r| r.to_string()),
                    "commits": resolved.commits.len(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text if self.current => println!("{}", current),
            OutputFormat::Text if cli.quiet => println!("{}", resolved.tag),
            OutputFormat::Text => {
                println!("{}", style("Version Calculation").bold());
                println!();
                println!("  Current version:  {}", style(current).cyan());
                println!("  Next version:     {}", style(&resolved.version).green().bold());
                println!("  Tag:              {}", style(&resolved.tag).yellow());
                if let Some(release_type) = resolved.release_type {
                    println!("  Bump type:        {}", style(release_type).yellow());
                }
                println!("  Commits analyzed: {}", resolved.commits.len());
            }
        }

        Ok(())
    }
}
