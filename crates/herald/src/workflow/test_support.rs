//! Git fixtures for workflow tests

use std::path::Path;

use tempfile::TempDir;

use herald_git::{git_commit_file, run_command, GitRepo};

/// Empty repository on `main` with a local identity
pub fn init_repo() -> (TempDir, GitRepo) {
    let temp = TempDir::new().unwrap();
    let dir = Some(temp.path());
    run_command("git", &["init", "-b", "main"], dir).unwrap();
    run_command("git", &["config", "user.name", "Test"], dir).unwrap();
    run_command("git", &["config", "user.email", "test@example.com"], dir).unwrap();
    run_command("git", &["config", "commit.gpgsign", "false"], dir).unwrap();
    run_command("git", &["config", "tag.gpgsign", "false"], dir).unwrap();

    let repo = GitRepo::open(temp.path()).unwrap();
    (temp, repo)
}

/// Write `name` and commit it with `message`
pub fn commit(repo: &GitRepo, name: &str, message: &str) {
    std::fs::write(repo.root().join(name), message).unwrap();
    git_commit_file(repo.root(), Path::new(name), message).unwrap();
}
