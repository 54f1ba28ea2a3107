//! Remote operations
//!
//! Pushing and committing go through the `git` CLI so the user's credential
//! helpers and hooks apply.

use std::path::Path;

use tracing::instrument;

use crate::command::run_command;
use crate::repository::{GitRepo, Result};
use herald_core::error::GitError;

impl GitRepo {
    /// Get the URL for a remote
    pub fn remote_url(&self, name: &str) -> Result<String> {
        match self.repo.find_remote(name) {
            Ok(remote) => remote
                .url()
                .map(|s| s.to_string())
                .ok_or_else(|| GitError::RemoteNotFound(name.to_string())),
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                Err(GitError::RemoteNotFound(name.to_string()))
            }
            Err(e) => Err(GitError::Git2(e)),
        }
    }

    /// Browser URL of a GitHub remote, e.g. `https://github.com/owner/repo`
    pub fn web_url(&self, remote: &str) -> Result<String> {
        web_url_from_remote(&self.remote_url(remote)?)
    }
}

/// Convert a GitHub remote URL (ssh, scp-like or https) into its web URL
pub fn web_url_from_remote(url: &str) -> Result<String> {
    let trimmed = url.trim();
    let path = if let Some(rest) = trimmed.strip_prefix("git@github.com:") {
        rest
    } else if let Some(rest) = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .or_else(|| trimmed.strip_prefix("ssh://git@"))
    {
        // drop optional `user@` credentials in https URLs
        let rest = rest.rsplit_once('@').map_or(rest, |(_, host)| host);
        match rest.strip_prefix("github.com/") {
            Some(path) => path,
            None => return Err(GitError::UnsupportedRemote(url.to_string())),
        }
    } else {
        return Err(GitError::UnsupportedRemote(url.to_string()));
    };

    let path = path.trim_end_matches('/').trim_end_matches(".git");
    match path.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok(format!("https://github.com/{}/{}", owner, repo))
        }
        _ => Err(GitError::UnsupportedRemote(url.to_string())),
    }
}

/// Stage a single file and commit it
#[instrument(fields(file = %file.display()))]
pub fn git_commit_file(root: &Path, file: &Path, message: &str) -> Result<()> {
    let file = file.to_string_lossy();
    run_command("git", &["add", "--", &file], Some(root))?;
    run_command("git", &["commit", "-m", message, "--", &file], Some(root))?;
    Ok(())
}

/// Push a branch and its annotated tags
#[instrument(fields(remote, branch))]
pub fn git_push_with_tags(root: &Path, remote: &str, branch: &str) -> Result<()> {
    run_command(
        "git",
        &["push", "--follow-tags", remote, branch],
        Some(root),
    )?;
    Ok(())
}
