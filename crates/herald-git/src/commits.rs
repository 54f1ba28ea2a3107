//! Commit history operations

use chrono::{TimeZone, Utc};
use git2::{Oid, Sort};
use tracing::debug;

use crate::repository::{GitRepo, Result};
use crate::types::CommitInfo;

impl GitRepo {
    /// Commits reachable from HEAD but not from `since`, newest first.
    ///
    /// `since` is any revision git understands (tag name, hash, branch);
    /// `None` walks the whole history.
    pub fn commits_since(&self, since: Option<&str>) -> Result<Vec<CommitInfo>> {
        let hide = match since {
            Some(rev) => Some(self.repo.revparse_single(rev)?.peel_to_commit()?.id()),
            None => None,
        };
        self.walk(hide)
    }

    fn walk(&self, hide: Option<Oid>) -> Result<Vec<CommitInfo>> {
        let head = self.head_commit()?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(head.id())?;
        if let Some(oid) = hide {
            revwalk.hide(oid)?;
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            commits.push(commit_to_info(&commit));
        }

        debug!(count = commits.len(), "collected commits");
        Ok(commits)
    }
}

/// Convert a git2 Commit to CommitInfo
fn commit_to_info(commit: &git2::Commit<'_>) -> CommitInfo {
    let author = commit.author();

    let timestamp = Utc
        .timestamp_opt(commit.time().seconds(), 0)
        .single()
        .unwrap_or_else(Utc::now);

    CommitInfo::new(
        commit.id().to_string(),
        commit.summary().unwrap_or("(no message)"),
        author.name().unwrap_or("Unknown"),
        author.email().unwrap_or("unknown@example.com"),
        timestamp,
    )
    .with_body(commit.body().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Repository, Signature};
    use std::path::Path;
    use tempfile::TempDir;

    fn commit_file(repo: &Repository, root: &Path, name: &str, message: &str) -> Oid {
        let sig = Signature::now("Test", "test@example.com").unwrap();
        std::fs::write(root.join(name), message).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();

        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parents = match repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => Vec::new(),
        };
        let parent_refs: Vec<_> = parents.iter().collect();

        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    fn setup_repo() -> (TempDir, GitRepo) {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        let first = commit_file(&repo, temp.path(), "a.txt", "Initial commit");
        let commit = repo.find_commit(first).unwrap();
        repo.tag_lightweight("v1.0.0", commit.as_object(), false)
            .unwrap();

        commit_file(&repo, temp.path(), "b.txt", "fix: handle empty input");
        commit_file(
            &repo,
            temp.path(),
            "c.txt",
            "feat(api): add endpoint (#12)\n\nLonger explanation.",
        );

        let git_repo = GitRepo::open(temp.path()).unwrap();
        (temp, git_repo)
    }

    #[test]
    fn test_all_commits() {
        let (_temp, repo) = setup_repo();
        let commits = repo.commits_since(None).unwrap();
        assert_eq!(commits.len(), 3);
    }

    #[test]
    fn test_commits_since_tag_newest_first() {
        let (_temp, repo) = setup_repo();
        let commits = repo.commits_since(Some("v1.0.0")).unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].message, "feat(api): add endpoint (#12)");
        assert_eq!(commits[0].body.as_deref(), Some("Longer explanation."));
        assert_eq!(commits[1].message, "fix: handle empty input");
        assert!(commits[1].body.is_none());
    }

    #[test]
    fn test_commits_since_unknown_rev() {
        let (_temp, repo) = setup_repo();
        assert!(repo.commits_since(Some("v9.9.9")).is_err());
    }
}
