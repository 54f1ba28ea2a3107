//! Changelog command

use clap::Args;
use tracing::info;

use herald_core::workflow::write_changelog;
use herald_core::ReleaseType;
use herald_git::GitRepo;

use crate::cli::{load_config, output, Cli, OutputFormat};
use crate::workflow::{ReleaseOptions, ReleaseWorkflow};

/// Preview or write the changelog for the next release
#[derive(Debug, Args)]
pub struct ChangelogCommand {
    /// Version to generate the changelog for
    #[arg(long = "for-version", value_name = "VERSION")]
    pub for_version: Option<String>,

    /// Force a specific release type
    #[arg(short, long)]
    pub release_type: Option<ReleaseType>,

    /// Ticket to attach to the release
    #[arg(long)]
    pub ticket: Option<String>,

    /// Write the updated changelog file instead of printing the new section
    #[arg(short, long)]
    pub write: bool,
}

impl ChangelogCommand {
    /// Execute the changelog command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(version = ?self.for_version, write = self.write, "executing changelog command");
        let cwd = std::env::current_dir()?;
        let (config, _) = load_config(cli, &cwd)?;
        let repo = GitRepo::discover(&cwd)?;

        let options = ReleaseOptions {
            version: self.for_version.clone(),
            release_type: self.release_type,
            ticket: self.ticket.clone(),
            dry_run: !self.write,
            ..Default::default()
        };
        let workflow = ReleaseWorkflow::new(&config, &repo, options)?;
        let plan = workflow.plan()?;

        if self.write {
            let Some(content) = &plan.changelog else {
                output::warning("Changelog is disabled in the configuration.");
                return Ok(());
            };
            write_changelog(&plan.changelog_path, content)?;
            if !cli.quiet {
                output::success(&format!(
                    "Changelog written to {}",
                    output::path_style().apply_to(plan.changelog_path.display())
                ));
            }
            return Ok(());
        }

        match cli.format {
            OutputFormat::Json => {
                let groups: Vec<_> = plan
                    .notes
                    .groups
                    .iter()
                    .map(|g| serde_json::json!({ "title": g.title, "lines": g.lines }))
                    .collect();
                let output = serde_json::json!({
                    "tag": plan.tag_name(),
                    "ticket": plan.tag.ticket(),
                    "link": plan.tag.link,
                    "groups": groups,
                    "body": plan.tag.body,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if plan.notes.is_empty() && !cli.quiet {
                    output::warning("No commits found since last release.");
                }
                println!("## {}\n", plan.tag.section_header());
                println!("{}", plan.tag.body);
            }
        }

        Ok(())
    }
}
