//! Validate command

use clap::Args;
use console::style;
use tracing::info;

use herald_core::config::{find_config, load_config};
use herald_core::Config;
use herald_changelog::Template;
use herald_git::{GhCli, GitRepo};

use crate::cli::{Cli, OutputFormat};

/// Validate configuration and repository state
#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,

    /// Check configuration only, skip repository checks
    #[arg(long)]
    pub config_only: bool,
}

#[derive(Default)]
struct Findings {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidateCommand {
    /// Execute the validate command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(strict = self.strict, config_only = self.config_only, "executing validate command");
        let cwd = std::env::current_dir()?;
        let mut findings = Findings::default();

        let config = match find_config(&cwd) {
            Some(path) => match load_config(&path) {
                Ok(config) => Some(config),
                Err(e) => {
                    findings.errors.push(format!("{}: {}", path.display(), e));
                    None
                }
            },
            None => {
                findings
                    .warnings
                    .push("No herald.json found, defaults would be used".to_string());
                Some(Config::default())
            }
        };

        if let Some(config) = &config {
            check_templates(config, &mut findings);
            if !self.config_only {
                check_repository(config, &cwd, &mut findings);
            }
        }

        let passed = findings.errors.is_empty() && !(self.strict && !findings.warnings.is_empty());

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "valid": passed,
                    "errors": findings.errors,
                    "warnings": findings.warnings,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                for error in &findings.errors {
                    println!("{} {}", style("✗").red().bold(), error);
                }
                for warning in &findings.warnings {
                    println!("{} {}", style("!").yellow().bold(), warning);
                }
                if passed && !cli.quiet {
                    println!("{} {}", style("✓").green().bold(), "Validation passed");
                }
            }
        }

        if !passed {
            anyhow::bail!(
                "Validation failed with {} error(s) and {} warning(s)",
                findings.errors.len(),
                findings.warnings.len()
            );
        }

        Ok(())
    }
}

fn check_templates(config: &Config, findings: &mut Findings) {
    let templates = [
        ("tag_message", &config.tag_message),
        ("pull_requests.title", &config.pull_requests.title),
        ("pull_requests.body", &config.pull_requests.body),
        ("release.title", &config.release.title),
        ("release.body", &config.release.body),
    ];

    for (name, template) in templates {
        if let Err(e) = Template::from_config(name, template) {
            findings.errors.push(e.to_string());
        }
    }
}

fn check_repository(config: &Config, cwd: &std::path::Path, findings: &mut Findings) {
    let repo = match GitRepo::discover(cwd) {
        Ok(repo) => repo,
        Err(e) => {
            findings.errors.push(e.to_string());
            return;
        }
    };

    match repo.is_clean() {
        Ok(false) if config.git.require_clean => findings
            .warnings
            .push("Working directory has uncommitted changes".to_string()),
        Ok(_) => {}
        Err(e) => findings.errors.push(e.to_string()),
    }

    match repo.current_branch() {
        Ok(Some(branch)) if branch != config.git.branch => findings.warnings.push(format!(
            "Current branch '{}' is not the release branch '{}'",
            branch, config.git.branch
        )),
        Ok(Some(_)) => {}
        Ok(None) => findings.warnings.push("HEAD is detached".to_string()),
        Err(e) => findings.errors.push(e.to_string()),
    }

    if config.repository.is_none() {
        if let Err(e) = repo.web_url(&config.git.remote) {
            findings
                .warnings
                .push(format!("Compare links disabled: {}", e));
        }
    }

    let needs_gh = (config.pull_requests.enabled && !config.pull_requests.branches.is_empty())
        || config.release.enabled;
    if needs_gh {
        if let Err(e) = GhCli::new(repo.root()) {
            findings.warnings.push(e.to_string());
        }
    }
}
