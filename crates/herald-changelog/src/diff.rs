//! Commit grouping
//!
//! Commits are matched against the configured groups in declaration order;
//! the first group with a matching pattern takes the commit. Each commit is
//! rendered to a changelog line through the commit line template.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use herald_core::config::{compile_pattern, ChangelogConfig, DiffGroupConfig};
use herald_core::error::ConfigError;
use herald_git::CommitInfo;

use crate::autolink::{self, AutoLinkRule};
use crate::template::{self, Context, Node};

static CONVENTIONAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>\w+)(?:\((?P<scope>[^)]*)\))?!?:\s*(?P<rest>.*)$").expect("Invalid regex")
});

static TRAILING_PR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(#(\d+)\)\s*$").expect("Invalid regex"));

/// A compiled commit group
#[derive(Debug, Clone)]
pub struct DiffGroup {
    pub title: String,
    pub priority: i32,
    patterns: Vec<Regex>,
}

impl DiffGroup {
    pub fn from_config(index: usize, config: &DiffGroupConfig) -> Result<Self, ConfigError> {
        let patterns = config
            .matches
            .iter()
            .enumerate()
            .map(|(i, p)| compile_pattern(&format!("changelog.groups[{}].matches[{}]", index, i), p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            title: config.title.clone(),
            priority: config.priority,
            patterns,
        })
    }

    fn matches(&self, title: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(title))
    }
}

/// Compile all groups, keeping declaration order
pub fn compile_groups(configs: &[DiffGroupConfig]) -> Result<Vec<DiffGroup>, ConfigError> {
    configs
        .iter()
        .enumerate()
        .map(|(i, c)| DiffGroup::from_config(i, c))
        .collect()
}

/// A group's title and its rendered commit lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedGroup {
    pub title: String,
    pub priority: i32,
    pub lines: Vec<String>,
}

impl RenderedGroup {
    /// `### Title` followed by the lines
    pub fn to_markdown(&self) -> String {
        format!("### {}\n\n{}", self.title, self.lines.join("\n"))
    }
}

/// Whether an ignore entry drops this commit title
fn is_ignored(title: &str, ignore: &[String]) -> bool {
    ignore.iter().any(|entry| match entry.strip_suffix('*') {
        Some(prefix) => title.starts_with(prefix),
        None => title.contains(entry.as_str()),
    })
}

/// Template fields for one commit
pub fn commit_context(commit: &CommitInfo, autolinks: &[AutoLinkRule]) -> Context {
    let first_line = commit.message.lines().next().unwrap_or_default();

    let (commit_type, scope, rest) = match CONVENTIONAL.captures(first_line) {
        Some(caps) => (
            caps.name("type").map_or("", |m| m.as_str()),
            caps.name("scope").map_or("", |m| m.as_str()),
            caps.name("rest").map_or("", |m| m.as_str()),
        ),
        None => (
            "",
            "",
            first_line
                .split_once(':')
                .map_or(first_line, |(_, rest)| rest.trim_start()),
        ),
    };

    let pr = TRAILING_PR
        .captures(rest)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());
    let rest = TRAILING_PR.replace(rest, "");

    let ticket = autolink::extract(scope, autolinks)
        .or_else(|| autolink::extract(&rest, autolinks))
        .or_else(|| {
            commit
                .body
                .as_deref()
                .and_then(|body| autolink::extract(body, autolinks))
        });

    let mut context = Context::new()
        .with("hash", commit.short_hash.as_str())
        .with("hash_full", commit.hash.as_str())
        .with("type", commit_type)
        .with("scope", autolink::strip(scope, autolinks))
        .with("title", autolink::strip(&rest, autolinks))
        .with("author", commit.author.as_str());
    context.insert_opt("pr", pr);
    context.insert_opt("ticket", ticket);
    context
}

/// Classifies commits into rendered groups
#[derive(Debug, Clone)]
pub struct CommitGrouper {
    groups: Vec<DiffGroup>,
    fallback_title: String,
    ignore: Vec<String>,
    line_template: Vec<Node>,
    autolinks: Vec<AutoLinkRule>,
}

impl CommitGrouper {
    pub fn new(
        groups: Vec<DiffGroup>,
        fallback_title: impl Into<String>,
        line_template: &str,
        autolinks: Vec<AutoLinkRule>,
    ) -> Self {
        Self {
            groups,
            fallback_title: fallback_title.into(),
            ignore: Vec::new(),
            line_template: template::parse(line_template),
            autolinks,
        }
    }

    /// Build from the changelog config, compiling every pattern
    pub fn from_config(
        config: &ChangelogConfig,
        autolinks: Vec<AutoLinkRule>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(
            compile_groups(&config.groups)?,
            config.fallback_group.clone(),
            &config.commit_line,
            autolinks,
        )
        .with_ignore(config.ignore.clone()))
    }

    pub fn with_ignore(mut self, ignore: Vec<String>) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn autolinks(&self) -> &[AutoLinkRule] {
        &self.autolinks
    }

    /// Group and render commits. Groups are ordered by descending priority,
    /// ties by first appearance; the fallback group always comes last.
    #[instrument(skip_all, fields(commits = commits.len()))]
    pub fn classify(&self, commits: &[CommitInfo]) -> Vec<RenderedGroup> {
        // (group index or None for fallback, lines) in encounter order
        let mut buckets: Vec<(Option<usize>, Vec<String>)> = Vec::new();
        let mut ignored = 0;

        for commit in commits {
            let title = commit.message.lines().next().unwrap_or_default();
            if is_ignored(title, &self.ignore) {
                ignored += 1;
                continue;
            }

            let group = self.groups.iter().position(|g| g.matches(title));
            let line = template::render_nodes(
                &self.line_template,
                &commit_context(commit, &self.autolinks),
            );

            match buckets.iter_mut().find(|(g, _)| *g == group) {
                Some((_, lines)) => lines.push(line),
                None => buckets.push((group, vec![line])),
            }
        }

        let mut rendered: Vec<RenderedGroup> = buckets
            .into_iter()
            .map(|(group, lines)| match group {
                Some(i) => RenderedGroup {
                    title: self.groups[i].title.clone(),
                    priority: self.groups[i].priority,
                    lines,
                },
                None => RenderedGroup {
                    title: self.fallback_title.clone(),
                    priority: i32::MIN,
                    lines,
                },
            })
            .collect();
        rendered.sort_by(|a, b| b.priority.cmp(&a.priority));

        debug!(groups = rendered.len(), ignored, "classified commits");
        rendered
    }
}
