//! Release body assembly

use std::collections::BTreeSet;

use herald_git::CommitInfo;
use tracing::{debug, info, instrument};

use crate::autolink;
use crate::diff::{commit_context, CommitGrouper, RenderedGroup};
use crate::tag::Tag;

/// Builds the changelog body for a release from its commits
pub struct ReleaseNotesGenerator {
    grouper: CommitGrouper,
}

impl ReleaseNotesGenerator {
    pub fn new(grouper: CommitGrouper) -> Self {
        Self { grouper }
    }

    /// Group commits into `### Title` sections and link ticket mentions
    #[instrument(skip(self, commits), fields(commit_count = commits.len()))]
    pub fn generate(&self, commits: &[CommitInfo]) -> ReleaseNotes {
        let groups = self.grouper.classify(commits);
        let rules = self.grouper.autolinks();

        let raw = groups
            .iter()
            .map(RenderedGroup::to_markdown)
            .collect::<Vec<_>>()
            .join("\n\n");
        let body = autolink::inject(&raw, rules);

        let ticket = commits
            .iter()
            .map(|c| commit_context(c, rules).get("ticket").to_string())
            .find(|t| !t.is_empty());

        let contributors: BTreeSet<String> = commits.iter().map(|c| c.author.clone()).collect();

        let notes = ReleaseNotes {
            body,
            groups,
            ticket,
            commit_count: commits.len(),
            contributors: contributors.into_iter().collect(),
        };
        info!(
            groups = notes.groups.len(),
            lines = notes.line_count(),
            ticket = ?notes.ticket,
            "release notes generated"
        );
        notes
    }

    /// Generate notes and fill in a tag's body. An explicit ticket wins over
    /// one found in the commits.
    pub fn apply(
        &self,
        tag: Tag,
        commits: &[CommitInfo],
        ticket: Option<String>,
    ) -> (Tag, ReleaseNotes) {
        let notes = self.generate(commits);
        let ticket = ticket.or_else(|| notes.ticket.clone());
        let mut tag = tag.with_ticket(ticket);
        tag.body = notes.body.clone();
        debug!(tag = tag.key(), ticket = ?tag.ticket(), "tag body assembled");
        (tag, notes)
    }
}

/// Grouped changes for one release
#[derive(Debug, Clone)]
pub struct ReleaseNotes {
    /// Markdown body with ticket links
    pub body: String,
    pub groups: Vec<RenderedGroup>,
    /// First ticket mentioned by any commit
    pub ticket: Option<String>,
    pub commit_count: usize,
    pub contributors: Vec<String>,
}

impl ReleaseNotes {
    /// Number of changelog lines across all groups
    pub fn line_count(&self) -> usize {
        self.groups.iter().map(|g| g.lines.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// One-line summary, e.g. `3 changes in Added, Fixed`
    pub fn headline(&self) -> String {
        if self.groups.is_empty() {
            return "No changes.".to_string();
        }
        let count = self.line_count();
        let titles: Vec<&str> = self.groups.iter().map(|g| g.title.as_str()).collect();
        format!(
            "{} change{} in {}",
            count,
            if count == 1 { "" } else { "s" },
            titles.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use herald_core::config::{AutoLinkConfig, ChangelogConfig};

    fn generator() -> ReleaseNotesGenerator {
        let rules = autolink::compile(&[AutoLinkConfig {
            matches: vec!["EVAN-".to_string()],
            link: "https://linear.app/evan/issue/EVAN-{num}".to_string(),
        }])
        .unwrap();
        let mut config = ChangelogConfig::default();
        config.commit_line = "- {title}{\" \"ticket}".to_string();
        ReleaseNotesGenerator::new(CommitGrouper::from_config(&config, rules).unwrap())
    }

    fn commit(message: &str, author: &str) -> CommitInfo {
        CommitInfo::new("abcdef123456", message, author, "dev@example.com", Utc::now())
    }

    #[test]
    fn test_generate_body() {
        let commits = [
            commit("fix: crash EVAN-3", "Bo"),
            commit("feat: dark mode", "Ada"),
            commit("Merge branch 'x'", "Ada"),
        ];
        let notes = generator().generate(&commits);

        assert_eq!(
            notes.body,
            "### Added\n\n- dark mode\n\n### Fixed\n\n- crash [EVAN-3](https://linear.app/evan/issue/EVAN-3)"
        );
        assert_eq!(notes.ticket.as_deref(), Some("EVAN-3"));
        assert_eq!(notes.contributors, ["Ada", "Bo"]);
        assert_eq!(notes.commit_count, 3);
        assert_eq!(notes.headline(), "2 changes in Added, Fixed");
    }

    #[test]
    fn test_default_commit_line_links_tickets() {
        let rules = autolink::compile(&[AutoLinkConfig {
            matches: vec!["EVAN-".to_string()],
            link: "https://linear.app/evan/issue/EVAN-{num}".to_string(),
        }])
        .unwrap();
        let grouper = CommitGrouper::from_config(&ChangelogConfig::default(), rules).unwrap();
        let notes = ReleaseNotesGenerator::new(grouper).generate(&[commit("fix: crash EVAN-3", "Bo")]);

        assert_eq!(
            notes.body,
            "### Fixed\n\n- crash [EVAN-3](https://linear.app/evan/issue/EVAN-3) (abcdef1)"
        );
    }

    #[test]
    fn test_empty_notes() {
        let notes = generator().generate(&[]);
        assert!(notes.is_empty());
        assert_eq!(notes.body, "");
        assert_eq!(notes.headline(), "No changes.");
    }

    #[test]
    fn test_apply_prefers_explicit_ticket() {
        let commits = [commit("fix: crash EVAN-3", "Bo")];
        let (tag, _) = generator().apply(Tag::new("v1.0.1"), &commits, Some("OPS-1".to_string()));
        assert_eq!(tag.ticket(), Some("OPS-1"));
        assert!(tag.body.starts_with("### Fixed"));

        let (tag, _) = generator().apply(Tag::new("v1.0.1"), &commits, None);
        assert_eq!(tag.ticket(), Some("EVAN-3"));
    }
}
