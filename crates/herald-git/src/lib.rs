//! Herald Git - Git and GitHub operations for release automation
//!
//! This crate provides git repository access (commit history, tags, status),
//! helpers that shell out to the `git` CLI for authenticated operations, and
//! a thin wrapper around the GitHub CLI (`gh`).

mod command;
mod commits;
pub mod github;
mod remote;
mod repository;
mod status;
mod tags;
pub mod types;

pub use command::run_command;
pub use github::{GhCli, PullRequestRequest, ReleaseRequest};
pub use remote::{git_commit_file, git_push_with_tags, web_url_from_remote};
pub use repository::{GitRepo, Result};
pub use types::{CommitInfo, TagInfo};
