//! GitHub CLI (`gh`) wrapper
//!
//! Pull requests, releases and remote file fetches are delegated to `gh`,
//! which owns authentication.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::command::run_command;
use crate::repository::Result;
use herald_core::error::GitError;

/// Request to open a pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRequest {
    /// Branch the pull request merges into
    pub base: String,
    /// Branch carrying the changes
    pub head: String,
    pub title: String,
    pub body: String,
    pub draft: bool,
}

impl PullRequestRequest {
    fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "pr".to_string(),
            "create".to_string(),
            "--base".to_string(),
            self.base.clone(),
            "--head".to_string(),
            self.head.clone(),
            "--title".to_string(),
            self.title.clone(),
            "--body".to_string(),
            self.body.clone(),
        ];
        if self.draft {
            args.push("--draft".to_string());
        }
        args
    }
}

/// Request to publish a GitHub release for an existing tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    pub tag: String,
    pub title: String,
    pub notes: String,
    pub draft: bool,
    pub prerelease: bool,
}

impl ReleaseRequest {
    fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "release".to_string(),
            "create".to_string(),
            self.tag.clone(),
            "--verify-tag".to_string(),
            "--title".to_string(),
            self.title.clone(),
            "--notes".to_string(),
            self.notes.clone(),
        ];
        if self.draft {
            args.push("--draft".to_string());
        }
        if self.prerelease {
            args.push("--prerelease".to_string());
        }
        args
    }
}

/// Handle to the `gh` executable, run from a fixed working directory
#[derive(Debug, Clone)]
pub struct GhCli {
    program: PathBuf,
    cwd: PathBuf,
}

impl GhCli {
    /// Locate `gh` on `PATH`
    pub fn new(cwd: &Path) -> Result<Self> {
        let program = which::which("gh").map_err(|_| GitError::ToolMissing("gh".to_string()))?;
        debug!(path = %program.display(), "found gh");
        Ok(Self {
            program,
            cwd: cwd.to_path_buf(),
        })
    }

    fn run(&self, args: &[String]) -> Result<String> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run_command(&self.program.to_string_lossy(), &args, Some(&self.cwd))
    }

    /// Open a pull request and return its URL
    #[instrument(skip(self, request), fields(base = %request.base, head = %request.head))]
    pub fn create_pull_request(&self, request: &PullRequestRequest) -> Result<String> {
        let url = self.run(&request.to_args())?;
        info!(url = %url, "opened pull request");
        Ok(url)
    }

    /// Publish a release and return its URL
    #[instrument(skip(self, request), fields(tag = %request.tag))]
    pub fn create_release(&self, request: &ReleaseRequest) -> Result<String> {
        let url = self.run(&request.to_args())?;
        info!(url = %url, "published release");
        Ok(url)
    }

    /// Web URL of the repository `gh` resolves for the working directory
    pub fn repo_url(&self) -> Result<String> {
        self.run(&[
            "repo".to_string(),
            "view".to_string(),
            "--json".to_string(),
            "url".to_string(),
            "--jq".to_string(),
            ".url".to_string(),
        ])
    }

    /// Raw contents of `path` in `repo` (`owner/name`) at `branch`
    #[instrument(skip(self))]
    pub fn fetch_file(&self, repo: &str, branch: &str, path: &str) -> Result<String> {
        self.run(&fetch_file_args(repo, branch, path))
    }
}

fn fetch_file_args(repo: &str, branch: &str, path: &str) -> Vec<String> {
    vec![
        "api".to_string(),
        format!(
            "repos/{}/contents/{}?ref={}",
            repo,
            path.trim_start_matches('/'),
            branch
        ),
        "-H".to_string(),
        "Accept: application/vnd.github.raw".to_string(),
    ]
}
