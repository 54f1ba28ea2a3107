//! Release orchestration
//!
//! A release is planned first (version, notes, changelog text, rendered
//! messages) with no side effects, then executed step by step: write the
//! changelog, commit, tag, push, open pull requests, publish the release.

use std::path::PathBuf;

use tracing::{debug, info, instrument, warn};

use herald_changelog::{
    autolink, Changelog, CommitGrouper, CompareLinks, ReleaseNotes, ReleaseNotesGenerator, Tag,
    Template, TemplateLoader,
};
use herald_core::error::{ChangelogError, GitError, HeraldError, WorkflowError};
use herald_core::types::ReleaseSummary;
use herald_core::workflow::{read_changelog, write_changelog};
use herald_core::{Config, ReleaseMode, ReleaseType, Result};
use herald_git::{git_commit_file, git_push_with_tags, GhCli, GitRepo, PullRequestRequest, ReleaseRequest};

use super::version::{resolve_version, VersionResolution};

/// Options for a release run
#[derive(Debug, Clone, Default)]
pub struct ReleaseOptions {
    pub mode: ReleaseMode,
    pub dry_run: bool,
    /// Explicit version or tag, e.g. `1.2.0` or `v1.2.0`
    pub version: Option<String>,
    pub release_type: Option<ReleaseType>,
    /// Ticket shown in titles; found in commits when absent
    pub ticket: Option<String>,
    /// Skip the release branch check
    pub allow_branch: bool,
}

/// Everything a release will do, computed up front
#[derive(Debug, Clone)]
pub struct ReleasePlan {
    pub resolution: VersionResolution,
    pub tag: Tag,
    pub notes: ReleaseNotes,
    /// The tag already exists (only allowed outside a full release)
    pub tag_exists: bool,
    pub repo_url: Option<String>,
    pub changelog_path: PathBuf,
    /// New changelog text; `None` when the changelog is left alone
    pub changelog: Option<String>,
    pub commit_message: String,
    pub tag_message: String,
}

impl ReleasePlan {
    pub fn tag_name(&self) -> &str {
        self.tag.key()
    }
}

/// Templates a release renders
struct ReleaseTemplates {
    tag_message: Template,
    pr_title: Template,
    pr_body: Template,
    release_title: Template,
    release_body: Template,
}

impl ReleaseTemplates {
    fn from_config(config: &Config) -> std::result::Result<Self, ChangelogError> {
        Ok(Self {
            tag_message: Template::from_config("tag_message", &config.tag_message)?,
            pr_title: Template::from_config("pull_requests.title", &config.pull_requests.title)?,
            pr_body: Template::from_config("pull_requests.body", &config.pull_requests.body)?,
            release_title: Template::from_config("release.title", &config.release.title)?,
            release_body: Template::from_config("release.body", &config.release.body)?,
        })
    }
}

/// Runs one release against a repository
pub struct ReleaseWorkflow<'a> {
    config: &'a Config,
    repo: &'a GitRepo,
    options: ReleaseOptions,
    templates: ReleaseTemplates,
    loader: TemplateLoader,
}

impl<'a> ReleaseWorkflow<'a> {
    pub fn new(config: &'a Config, repo: &'a GitRepo, options: ReleaseOptions) -> Result<Self> {
        Ok(Self {
            config,
            repo,
            options,
            templates: ReleaseTemplates::from_config(config)?,
            loader: TemplateLoader::new(repo.root()),
        })
    }

    /// Clean tree and release branch checks
    pub fn check_preconditions(&self) -> Result<()> {
        if self.options.dry_run {
            return Ok(());
        }

        if self.config.git.require_clean && !self.repo.is_clean()? {
            return Err(WorkflowError::PreConditionFailed(
                "working directory has uncommitted changes".to_string(),
            )
            .into());
        }

        if !self.options.allow_branch {
            let branch = self.repo.current_branch()?;
            if branch.as_deref() != Some(self.config.git.branch.as_str()) {
                return Err(WorkflowError::PreConditionFailed(format!(
                    "not on release branch '{}' (current: {})",
                    self.config.git.branch,
                    branch.as_deref().unwrap_or("detached HEAD")
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Web URL used for compare links
    fn repo_url(&self) -> Option<String> {
        if let Some(url) = &self.config.repository {
            return Some(url.trim_end_matches('/').to_string());
        }
        let from_remote = self.repo.web_url(&self.config.git.remote);
        let resolved = from_remote.or_else(|remote_err| {
            debug!(error = %remote_err, "remote has no web URL, asking gh");
            GhCli::new(self.repo.root()).and_then(|gh| gh.repo_url())
        });
        match resolved {
            Ok(url) => Some(url.trim_end_matches('/').to_string()),
            Err(e) => {
                warn!(error = %e, "no repository URL, compare links disabled");
                None
            }
        }
    }

    /// Compute the release without touching the repository
    #[instrument(skip(self))]
    pub fn plan(&self) -> Result<ReleasePlan> {
        let resolution = resolve_version(
            self.config,
            self.repo,
            self.options.version.as_deref(),
            self.options.release_type,
        )?;

        let tag_exists = self.repo.find_tag(&resolution.tag)?.is_some();
        if tag_exists && self.options.mode == ReleaseMode::Full {
            return Err(GitError::TagExists(resolution.tag.clone()).into());
        }

        let repo_url = self.repo_url();
        let links = repo_url.as_ref().map(|url| {
            CompareLinks::new(url.as_str()).with_first_ref(self.config.versioning.first_ref.clone())
        });

        let rules = autolink::compile(&self.config.autolinks)?;
        let grouper = CommitGrouper::from_config(&self.config.changelog, rules)?;
        let generator = ReleaseNotesGenerator::new(grouper);
        let (mut tag, notes) = generator.apply(
            Tag::new(&resolution.tag),
            &resolution.commits,
            self.options.ticket.clone(),
        );
        tag.link = links.as_ref().map(|l| {
            let base = resolution
                .previous_name()
                .or(l.first_ref.as_deref());
            l.compare(base, &resolution.tag)
        });

        let changelog_path = self.repo.root().join(&self.config.changelog.file);
        let changelog = if self.config.changelog.enabled {
            self.update_changelog(&changelog_path, &mut tag, links)?
        } else {
            None
        };

        let context = tag.context(repo_url.as_deref());
        let commit_message = herald_changelog::render(&self.config.git.commit_message, &context);
        let tag_message = self.templates.tag_message.render(&context, &self.loader)?;

        debug!(tag = tag.key(), tag_exists, "release planned");
        Ok(ReleasePlan {
            resolution,
            tag,
            notes,
            tag_exists,
            repo_url,
            changelog_path,
            changelog,
            commit_message,
            tag_message,
        })
    }

    /// New changelog text. Outside a full release an existing section for
    /// the tag supplies the body instead.
    fn update_changelog(
        &self,
        path: &std::path::Path,
        tag: &mut Tag,
        links: Option<CompareLinks>,
    ) -> Result<Option<String>> {
        let mut changelog = read_changelog(path)?
            .map(|raw| Changelog::parse(&raw))
            .unwrap_or_default();

        match changelog.add_tag(tag) {
            Ok(()) => {}
            Err(ChangelogError::DuplicateTag(key)) if !self.options.mode.mutates_changelog() => {
                debug!(tag = %key, "changelog already has this tag");
                if let Some(section) = changelog.section(&key) {
                    tag.body = section.body.clone();
                }
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        if !self.options.mode.mutates_changelog() {
            return Ok(None);
        }

        if let Some(links) = links {
            changelog.bump(links, tag.key());
        }
        Ok(Some(changelog.to_string()))
    }

    /// Run the side effects of a plan
    #[instrument(skip(self, plan), fields(tag = plan.tag_name(), mode = ?self.options.mode))]
    pub fn execute(&self, plan: &ReleasePlan) -> Result<ReleaseSummary> {
        let mut summary = ReleaseSummary::new(
            plan.tag_name(),
            plan.tag.link.clone().unwrap_or_default(),
        );
        summary.previous_tag = plan.resolution.previous.as_ref().map(|t| t.name.clone());
        summary.dry_run = self.options.dry_run;

        if self.options.dry_run {
            summary.add_note("dry run: no changes made");
            return Ok(summary);
        }

        let root = self.repo.root();

        if self.options.mode == ReleaseMode::Full {
            if let Some(content) = &plan.changelog {
                write_changelog(&plan.changelog_path, content)?;
                git_commit_file(root, &self.config.changelog.file, &plan.commit_message)
                    .map_err(|e| step_failed("commit changelog", e))?;
                summary.add_note(format!("updated {}", self.config.changelog.file.display()));
            }

            self.repo
                .create_tag(plan.tag_name(), &plan.tag_message, self.config.git.sign_tags)?;
            summary.add_note(format!("created tag {}", plan.tag_name()));

            if self.config.git.push {
                git_push_with_tags(root, &self.config.git.remote, &self.config.git.branch)
                    .map_err(|e| step_failed("push", e))?;
                summary.add_note(format!("pushed to {}", self.config.git.remote));
            }
        }

        let wants_prs = self.options.mode.opens_pull_requests()
            && self.config.pull_requests.enabled
            && !self.config.pull_requests.branches.is_empty();
        let wants_release = self.options.mode.creates_release() && self.config.release.enabled;

        if wants_prs || wants_release {
            let gh = GhCli::new(root)?;
            let context = plan.tag.context(plan.repo_url.as_deref());

            if wants_prs {
                let title = self.templates.pr_title.render(&context, &self.loader)?;
                let body = self.templates.pr_body.render(&context, &self.loader)?;
                for base in &self.config.pull_requests.branches {
                    let request = PullRequestRequest {
                        base: base.clone(),
                        head: self.config.git.branch.clone(),
                        title: title.clone(),
                        body: body.clone(),
                        draft: self.config.pull_requests.draft,
                    };
                    let url = gh
                        .create_pull_request(&request)
                        .map_err(|e| step_failed("pull request", e))?;
                    summary.pull_requests.push(url);
                }
            }

            if wants_release {
                let request = ReleaseRequest {
                    tag: plan.tag_name().to_string(),
                    title: self.templates.release_title.render(&context, &self.loader)?,
                    notes: self.templates.release_body.render(&context, &self.loader)?,
                    draft: self.config.release.draft,
                    prerelease: self.config.release.prerelease,
                };
                let url = gh
                    .create_release(&request)
                    .map_err(|e| step_failed("release", e))?;
                summary.release_url = Some(url);
            }
        }

        info!(tag = plan.tag_name(), prs = summary.pull_requests.len(), "release complete");
        Ok(summary)
    }
}

fn step_failed(step: &str, error: GitError) -> HeraldError {
    WorkflowError::StepFailed {
        step: step.to_string(),
        reason: error.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::test_support::{commit, init_repo};

    fn local_config() -> Config {
        let mut config = Config::default();
        config.repository = Some("https://github.com/acme/widgets".to_string());
        config.git.push = false;
        config.release.enabled = false;
        config
    }

    #[test]
    fn test_plan_first_release() {
        let (_temp, repo) = init_repo();
        commit(&repo, "a.txt", "feat(api): add endpoint (#4)");
        commit(&repo, "b.txt", "fix: crash");

        let config = local_config();
        let workflow = ReleaseWorkflow::new(&config, &repo, ReleaseOptions::default()).unwrap();
        let plan = workflow.plan().unwrap();

        assert_eq!(plan.tag_name(), "v0.1.0");
        assert!(!plan.tag_exists);
        assert_eq!(
            plan.tag.link.as_deref(),
            Some("https://github.com/acme/widgets/commits/v0.1.0")
        );
        assert!(plan.tag.body.starts_with("### Added\n\n- **api:** add endpoint"));
        assert_eq!(plan.commit_message, "chore(release): v0.1.0");
        assert!(plan.tag_message.starts_with("v0.1.0\n\n### Added"));

        let changelog = plan.changelog.as_deref().unwrap();
        assert!(changelog.starts_with(herald_changelog::DEFAULT_HEADER));
        assert!(changelog.contains("\n## [v0.1.0] - "));
        assert!(changelog.contains("[v0.1.0]: https://github.com/acme/widgets/commits/v0.1.0"));
    }

    #[test]
    fn test_execute_writes_commits_and_tags() {
        let (_temp, repo) = init_repo();
        commit(&repo, "a.txt", "feat: first");
        repo.create_tag("v1.0.0", "v1.0.0", false).unwrap();
        commit(&repo, "b.txt", "fix: second");

        let config = local_config();
        let workflow = ReleaseWorkflow::new(&config, &repo, ReleaseOptions::default()).unwrap();
        let plan = workflow.plan().unwrap();
        let summary = workflow.execute(&plan).unwrap();

        assert_eq!(summary.tag, "v1.0.1");
        assert_eq!(summary.previous_tag.as_deref(), Some("v1.0.0"));
        assert_eq!(
            summary.link,
            "https://github.com/acme/widgets/compare/v1.0.0...v1.0.1"
        );
        assert!(repo.find_tag("v1.0.1").unwrap().is_some());
        assert!(repo.is_clean().unwrap());

        let written = std::fs::read_to_string(repo.root().join("CHANGELOG.md")).unwrap();
        assert!(written.contains("### Fixed\n\n- second"));
        assert_eq!(
            repo.head_commit().unwrap().summary(),
            Some("chore(release): v1.0.1")
        );
    }

    #[test]
    fn test_dry_run_has_no_side_effects() {
        let (_temp, repo) = init_repo();
        commit(&repo, "a.txt", "feat: first");

        let config = local_config();
        let options = ReleaseOptions {
            dry_run: true,
            ..Default::default()
        };
        let workflow = ReleaseWorkflow::new(&config, &repo, options).unwrap();
        let plan = workflow.plan().unwrap();
        let summary = workflow.execute(&plan).unwrap();

        assert!(summary.dry_run);
        assert!(repo.find_tag("v0.1.0").unwrap().is_none());
        assert!(!repo.root().join("CHANGELOG.md").exists());
    }

    #[test]
    fn test_existing_tag_fails_full_release() {
        let (_temp, repo) = init_repo();
        commit(&repo, "a.txt", "feat: first");
        repo.create_tag("v1.0.0", "v1.0.0", false).unwrap();

        let config = local_config();
        let options = ReleaseOptions {
            version: Some("1.0.0".to_string()),
            ..Default::default()
        };
        let workflow = ReleaseWorkflow::new(&config, &repo, options).unwrap();
        assert!(matches!(
            workflow.plan(),
            Err(HeraldError::Git(GitError::TagExists(_)))
        ));
    }

    #[test]
    fn test_pr_only_reuses_existing_section() {
        let (_temp, repo) = init_repo();
        std::fs::write(
            repo.root().join("CHANGELOG.md"),
            "# Changelog\n\n## [v1.0.0] - 2024-01-01\n\n### Added\n\n- first\n",
        )
        .unwrap();
        commit(&repo, "a.txt", "feat: first");
        repo.create_tag("v1.0.0", "v1.0.0", false).unwrap();

        let config = local_config();
        let options = ReleaseOptions {
            mode: ReleaseMode::PrOnly,
            version: Some("v1.0.0".to_string()),
            ..Default::default()
        };
        let workflow = ReleaseWorkflow::new(&config, &repo, options).unwrap();
        let plan = workflow.plan().unwrap();

        assert!(plan.tag_exists);
        assert!(plan.changelog.is_none());
        assert_eq!(plan.tag.body, "### Added\n\n- first");
    }

    #[test]
    fn test_duplicate_changelog_entry_fails_full_release() {
        let (_temp, repo) = init_repo();
        commit(&repo, "a.txt", "feat: first");
        std::fs::write(
            repo.root().join("CHANGELOG.md"),
            "# Changelog\n\n## [v0.1.0] - 2024-01-01\n",
        )
        .unwrap();

        let config = local_config();
        let workflow = ReleaseWorkflow::new(&config, &repo, ReleaseOptions::default()).unwrap();
        let err = workflow.plan().unwrap_err();
        assert!(err.is_duplicate_tag());
    }

    #[test]
    fn test_dirty_tree_rejected() {
        let (_temp, repo) = init_repo();
        commit(&repo, "a.txt", "feat: first");
        std::fs::write(repo.root().join("stray.txt"), "x").unwrap();

        let config = local_config();
        let workflow = ReleaseWorkflow::new(&config, &repo, ReleaseOptions::default()).unwrap();
        assert!(matches!(
            workflow.check_preconditions(),
            Err(HeraldError::Workflow(WorkflowError::PreConditionFailed(_)))
        ));
    }

    #[test]
    fn test_malformed_template_rejected() {
        let (_temp, repo) = init_repo();
        let mut config = local_config();
        config.release.body = Default::default();
        let result = ReleaseWorkflow::new(&config, &repo, ReleaseOptions::default());
        assert!(matches!(
            result,
            Err(HeraldError::Changelog(ChangelogError::MalformedTemplateSource(_)))
        ));
    }
}
