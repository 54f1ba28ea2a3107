//! Release command

use clap::Args;
use console::style;
use dialoguer::Confirm;
use tracing::info;

use herald_core::error::WorkflowError;
use herald_core::types::{ReleaseMode, ReleaseSummary, ReleaseType};
use herald_git::GitRepo;

use crate::cli::{load_config, output, Cli, OutputFormat};
use crate::workflow::{ReleaseOptions, ReleasePlan, ReleaseWorkflow};

/// Update the changelog, tag the release and publish it
#[derive(Debug, Args)]
pub struct ReleaseCommand {
    /// Release type (major, minor, patch, prerelease)
    #[arg(short, long)]
    pub release_type: Option<ReleaseType>,

    /// Explicit version to release
    #[arg(long)]
    pub version: Option<String>,

    /// Ticket to attach to the release
    #[arg(long)]
    pub ticket: Option<String>,

    /// Dry run - don't make any changes
    #[arg(long)]
    pub dry_run: bool,

    /// Only open pull requests for an already tagged release
    #[arg(long, conflicts_with = "release_only")]
    pub pr_only: bool,

    /// Only create the hosted release for an already tagged release
    #[arg(long)]
    pub release_only: bool,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Allow release from non-release branch
    #[arg(long)]
    pub allow_branch: bool,
}

impl ReleaseCommand {
    fn mode(&self) -> ReleaseMode {
        if self.pr_only {
            ReleaseMode::PrOnly
        } else if self.release_only {
            ReleaseMode::ReleaseOnly
        } else {
            ReleaseMode::Full
        }
    }

    /// Execute the release command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            release_type = ?self.release_type,
            version = ?self.version,
            mode = ?self.mode(),
            dry_run = self.dry_run,
            "executing release command"
        );
        let cwd = std::env::current_dir()?;
        let (config, _) = load_config(cli, &cwd)?;
        let repo = GitRepo::discover(&cwd)?;

        let options = ReleaseOptions {
            mode: self.mode(),
            dry_run: self.dry_run,
            version: self.version.clone(),
            release_type: self.release_type,
            ticket: self.ticket.clone(),
            allow_branch: self.allow_branch,
        };
        let workflow = ReleaseWorkflow::new(&config, &repo, options)?;
        workflow.check_preconditions()?;
        let plan = workflow.plan()?;

        if !cli.quiet && cli.format == OutputFormat::Text {
            print_preview(&plan, self.mode(), self.dry_run);
        }

        if !self.yes && !self.dry_run {
            let confirmed = Confirm::new()
                .with_prompt("Proceed with release?")
                .default(true)
                .interact()?;

            if !confirmed {
                println!("{}", style("Aborted.").yellow());
                return Err(WorkflowError::Cancelled.into());
            }
        }

        let summary = workflow.execute(&plan)?;

        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            OutputFormat::Text if !cli.quiet => print_summary(&summary),
            OutputFormat::Text => {}
        }

        Ok(())
    }
}

fn print_preview(plan: &ReleasePlan, mode: ReleaseMode, dry_run: bool) {
    let resolution = &plan.resolution;

    println!("{}", output::header("Release Preview"));
    println!();
    println!(
        "{}",
        output::key_value(
            "Previous tag",
            resolution.previous_name().unwrap_or("(none)"),
        )
    );
    println!(
        "{}",
        output::key_value(
            "Next version",
            &output::version_style().apply_to(&resolution.version).to_string(),
        )
    );
    let tag = output::tag_style().apply_to(plan.tag_name()).to_string();
    let tag = if plan.tag_exists {
        format!("{} (already exists)", tag)
    } else {
        tag
    };
    println!("{}", output::key_value("Tag", &tag));
    if let Some(release_type) = resolution.release_type {
        println!("{}", output::key_value("Bump", release_type.as_str()));
    }
    if let Some(ticket) = plan.tag.ticket() {
        println!("{}", output::key_value("Ticket", ticket));
    }
    if let Some(link) = &plan.tag.link {
        println!("{}", output::key_value("Compare", link));
    }
    println!("{}", output::key_value("Mode", &format!("{:?}", mode)));
    println!("{}", output::key_value("Summary", &plan.notes.headline()));
    println!();

    if !plan.tag.body.is_empty() {
        println!("{}", output::indented(&plan.tag.body, "  "));
        println!();
    }

    if dry_run {
        println!("  {}", style("[DRY RUN - no changes will be made]").yellow().bold());
        println!();
    }
}

fn print_summary(summary: &ReleaseSummary) {
    if summary.dry_run {
        output::info(&format!("Dry run complete for {}", summary.tag));
        return;
    }

    output::success(&format!(
        "Released {}",
        output::tag_style().apply_to(&summary.tag)
    ));
    for note in &summary.notes {
        output::info(note);
    }
    for url in &summary.pull_requests {
        output::info(&format!("Pull request: {}", output::path_style().apply_to(url)));
    }
    if let Some(url) = &summary.release_url {
        output::info(&format!("Release: {}", output::path_style().apply_to(url)));
    }
}
