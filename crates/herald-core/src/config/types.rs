//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults;

/// Main configuration for Herald
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON schema reference
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Repository web URL (derived from the git remote when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    /// Versioning configuration
    pub versioning: VersioningConfig,

    /// Git configuration
    pub git: GitConfig,

    /// Changelog configuration
    pub changelog: ChangelogConfig,

    /// Ticket autolink rules, checked in order
    pub autolinks: Vec<AutoLinkConfig>,

    /// Annotated tag message
    pub tag_message: TemplateConfig,

    /// Pull requests opened after tagging
    pub pull_requests: PullRequestConfig,

    /// Hosted release configuration
    pub release: ReleaseConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema: None,
            repository: None,
            versioning: VersioningConfig::default(),
            git: GitConfig::default(),
            changelog: ChangelogConfig::default(),
            autolinks: Vec::new(),
            tag_message: TemplateConfig::inline(defaults::DEFAULT_TAG_MESSAGE),
            pull_requests: PullRequestConfig::default(),
            release: ReleaseConfig::default(),
        }
    }
}

/// Versioning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VersioningConfig {
    /// Tag format (e.g., "v{version}")
    pub tag_format: String,

    /// Regex that existing tags must match to count as releases
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_pattern: Option<String>,

    /// Compare base for the oldest changelog section
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_ref: Option<String>,

    /// Pre-release identifier
    pub prerelease_identifier: String,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            tag_format: "v{version}".to_string(),
            tag_pattern: None,
            first_ref: None,
            prerelease_identifier: "alpha".to_string(),
        }
    }
}

/// Git configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Remote name
    pub remote: String,

    /// Branch to release from
    pub branch: String,

    /// Whether to require clean working directory
    pub require_clean: bool,

    /// Whether to push the release commit and tag
    pub push: bool,

    /// Commit message template
    pub commit_message: String,

    /// Whether to sign tags
    pub sign_tags: bool,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            branch: "main".to_string(),
            require_clean: true,
            push: true,
            commit_message: "chore(release): {tag}".to_string(),
            sign_tags: false,
        }
    }
}

/// Changelog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    /// Whether to update the changelog
    pub enabled: bool,

    /// Changelog file path
    pub file: PathBuf,

    /// Template used for each commit line
    pub commit_line: String,

    /// Title of the group collecting unmatched commits
    pub fallback_group: String,

    /// Commit groups, matched in declaration order
    pub groups: Vec<DiffGroupConfig>,

    /// Commit titles to drop (`*` suffix = prefix match)
    pub ignore: Vec<String>,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file: PathBuf::from("CHANGELOG.md"),
            commit_line: defaults::DEFAULT_COMMIT_LINE.to_string(),
            fallback_group: "Others".to_string(),
            groups: defaults::default_groups(),
            ignore: vec!["Merge branch*".to_string(), "Merge pull request*".to_string()],
        }
    }
}

/// A commit group in the changelog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffGroupConfig {
    /// Regexes tested against the commit title
    pub matches: Vec<String>,
    /// Section title
    pub title: String,
    /// Output ordering (higher first)
    #[serde(default)]
    pub priority: i32,
}

impl DiffGroupConfig {
    /// Create a new group config
    pub fn new(title: impl Into<String>, matches: &[&str], priority: i32) -> Self {
        Self {
            matches: matches.iter().map(|m| m.to_string()).collect(),
            title: title.into(),
            priority,
        }
    }
}

/// A ticket autolink rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoLinkConfig {
    /// Literal ticket prefixes (e.g. "PROJ-")
    pub matches: Vec<String>,
    /// Link template containing `{num}`
    pub link: String,
}

/// Template content source. Exactly one field must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Inline template text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Local file containing the template
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// File in a GitHub repository
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<GithubFileRef>,
}

impl TemplateConfig {
    /// Template with inline text
    pub fn inline(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// Number of sources that are set
    pub fn source_count(&self) -> usize {
        [
            self.value.is_some(),
            self.file.is_some(),
            self.github.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

/// Reference to a file in a GitHub repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubFileRef {
    /// Repository in `owner/name` form
    pub repo: String,
    /// Branch or ref to read from
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Path inside the repository
    pub path: String,
}

fn default_branch() -> String {
    "main".to_string()
}

/// Pull request configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PullRequestConfig {
    /// Whether to open pull requests
    pub enabled: bool,

    /// Base branches to open pull requests against
    pub branches: Vec<String>,

    /// Pull request title
    pub title: TemplateConfig,

    /// Pull request body
    pub body: TemplateConfig,

    /// Open as draft
    pub draft: bool,
}

impl Default for PullRequestConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            branches: Vec::new(),
            title: TemplateConfig::inline(defaults::DEFAULT_PR_TITLE),
            body: TemplateConfig::inline(defaults::DEFAULT_PR_BODY),
            draft: false,
        }
    }
}

/// Hosted release configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Whether to create a GitHub release
    pub enabled: bool,

    /// Release title
    pub title: TemplateConfig,

    /// Release notes
    pub body: TemplateConfig,

    /// Create as draft
    pub draft: bool,

    /// Mark as prerelease
    pub prerelease: bool,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: TemplateConfig::inline(defaults::DEFAULT_RELEASE_TITLE),
            body: TemplateConfig::inline(defaults::DEFAULT_RELEASE_BODY),
            draft: false,
            prerelease: false,
        }
    }
}
