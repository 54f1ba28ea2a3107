//! Keep a Changelog document model
//!
//! A changelog is parsed into a free-text header, an optional `Unreleased`
//! section, released sections (newest first), the footer link table and any
//! trailing text. Serializing a parsed document and parsing it again yields
//! the same document.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, instrument};

use herald_core::error::ChangelogError;

use crate::tag::Tag;

/// Header used when the file has no sections yet
pub const DEFAULT_HEADER: &str = "# Changelog

All notable changes to this project will be documented in this file.

The format is based on [Keep a Changelog](https://keepachangelog.com/en/1.1.0/),
and this project adheres to [Semantic Versioning](https://semver.org/spec/v2.0.0.html).";

const UNRELEASED: &str = "unreleased";

/// Link used for a new section until compare links are known
const PLACEHOLDER_LINK: &str = "#";

static LINKED_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]]+)\]").expect("Invalid regex"));

static FOOTER_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\[[^\]]+\]:").expect("Invalid regex"));

static FOOTER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([^\]]+)\]:\s*(\S+)").expect("Invalid regex"));

/// One `## ` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// First line without the `## ` marker, e.g. `[v1.2.3] - 2022-01-01`
    pub header: String,
    /// Everything below the header line, trimmed
    pub body: String,
    /// URL from the matching footer
    pub link: Option<String>,
}

impl Section {
    pub fn new(header: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            body: body.into().trim().to_string(),
            link: None,
        }
    }

    /// The bracketed key in the header, e.g. `v1.2.3`
    pub fn linked_key(&self) -> Option<&str> {
        LINKED_KEY
            .captures(&self.header)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    fn has_key(&self, key: &str) -> bool {
        self.linked_key()
            .is_some_and(|k| k.eq_ignore_ascii_case(key))
    }

    fn parse(chunk: &str) -> Self {
        let (header, body) = chunk.split_once('\n').unwrap_or((chunk, ""));
        Self::new(header.trim_end(), body)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "## {}", self.header)?;
        if !self.body.is_empty() {
            write!(f, "\n\n{}", self.body)?;
        }
        Ok(())
    }
}

/// A `[key]: url` reference line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterLink {
    pub key: String,
    pub link: String,
}

impl FooterLink {
    pub fn new(key: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            link: link.into(),
        }
    }
}

impl fmt::Display for FooterLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]: {}", self.key, self.link)
    }
}

/// Builds GitHub compare URLs for section footers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareLinks {
    /// Repository web URL, e.g. `https://github.com/owner/repo`
    pub url: String,
    /// Compare base for the oldest section
    pub first_ref: Option<String>,
}

impl CompareLinks {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            first_ref: None,
        }
    }

    pub fn with_first_ref(mut self, first_ref: Option<String>) -> Self {
        self.first_ref = first_ref;
        self
    }

    /// `{url}/compare/{from}...{to}`, or `{url}/commits/{to}` without a base
    pub fn compare(&self, from: Option<&str>, to: &str) -> String {
        match from {
            Some(from) => format!("{}/compare/{}...{}", self.url, from, to),
            None => format!("{}/commits/{}", self.url, to),
        }
    }
}

/// A parsed changelog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changelog {
    header: String,
    unreleased: Option<Section>,
    sections: Vec<Section>,
    footers: Vec<FooterLink>,
    suffix: String,
    links: Option<CompareLinks>,
}

impl Default for Changelog {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER.to_string(),
            unreleased: None,
            sections: Vec::new(),
            footers: Vec::new(),
            suffix: String::new(),
            links: None,
        }
    }
}

impl Changelog {
    /// Parse changelog text. Never fails; unrecognized text stays in the
    /// header or suffix.
    pub fn parse(raw: &str) -> Self {
        let text = raw.replace("\r\n", "\n");

        let body_start = if text.starts_with("## ") {
            Some(0)
        } else {
            text.find("\n## ").map(|i| i + 1)
        };
        let Some(body_start) = body_start else {
            debug!("changelog has no sections, using default header");
            return Self::default();
        };

        let header = text[..body_start].trim_end().to_string();
        let rest = &text[body_start..];

        let (sections_text, footer_text) = match FOOTER_START.find(rest) {
            Some(m) => (&rest[..m.start()], &rest[m.start()..]),
            None => (rest, ""),
        };

        let mut sections: Vec<Section> = format!("\n{}", sections_text)
            .split("\n## ")
            .skip(1)
            .map(Section::parse)
            .collect();

        let (mut footers, suffix) = parse_footers(footer_text);

        let unreleased = if sections.first().is_some_and(|s| s.has_key(UNRELEASED)) {
            let mut section = sections.remove(0);
            if let Some(idx) = footers
                .iter()
                .position(|f| f.key.eq_ignore_ascii_case(UNRELEASED))
            {
                section.link = Some(footers.remove(idx).link);
            }
            Some(section)
        } else {
            None
        };

        for section in &mut sections {
            if let Some(key) = section.linked_key() {
                section.link = footers
                    .iter()
                    .find(|f| f.key.eq_ignore_ascii_case(key))
                    .map(|f| f.link.clone());
            }
        }

        debug!(
            sections = sections.len(),
            footers = footers.len(),
            unreleased = unreleased.is_some(),
            "parsed changelog"
        );

        Self {
            header,
            unreleased,
            sections,
            footers,
            suffix,
            links: None,
        }
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn unreleased(&self) -> Option<&Section> {
        self.unreleased.as_ref()
    }

    /// Released sections, newest first
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Whether a section (including `Unreleased`) has this key
    pub fn contains(&self, key: &str) -> bool {
        self.unreleased.iter().chain(&self.sections).any(|s| s.has_key(key))
    }

    /// Section for a key, compared case-insensitively
    pub fn section(&self, key: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.has_key(key))
    }

    /// Insert a section at the top with its footer link, a placeholder
    /// when the section has none yet
    pub fn prepend(&mut self, mut section: Section) {
        if let Some(key) = section.linked_key().map(str::to_string) {
            let link = section
                .link
                .get_or_insert_with(|| PLACEHOLDER_LINK.to_string())
                .clone();
            self.footers.insert(0, FooterLink::new(key, link));
        }
        self.sections.insert(0, section);
    }

    /// Add a section for a new tag.
    ///
    /// Fails with [`ChangelogError::DuplicateTag`] and leaves the document
    /// untouched when the key is already present.
    #[instrument(skip(self, tag), fields(tag = tag.key()))]
    pub fn add_tag(&mut self, tag: &Tag) -> Result<(), ChangelogError> {
        if self.contains(tag.key()) {
            return Err(ChangelogError::DuplicateTag(tag.key().to_string()));
        }

        let mut section = Section::new(tag.section_header(), tag.body.as_str());
        section.link = Some(
            tag.link
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_LINK.to_string()),
        );
        self.prepend(section);

        info!(tag = tag.key(), "added changelog section");
        Ok(())
    }

    /// Point every footer at compare URLs, the unreleased one at
    /// `newest_key...HEAD`
    pub fn bump(&mut self, links: CompareLinks, newest_key: &str) {
        if let Some(unreleased) = &mut self.unreleased {
            unreleased.link = Some(links.compare(Some(newest_key), "HEAD"));
        }

        let keys: Vec<Option<String>> = self
            .sections
            .iter()
            .map(|s| s.linked_key().map(str::to_string))
            .collect();

        for (i, section) in self.sections.iter_mut().enumerate() {
            let Some(key) = &keys[i] else { continue };
            let base = keys[i + 1..]
                .iter()
                .flatten()
                .next()
                .map(String::as_str)
                .or(links.first_ref.as_deref());
            let link = links.compare(base, key);

            if let Some(footer) = self
                .footers
                .iter_mut()
                .find(|f| f.key.eq_ignore_ascii_case(key))
            {
                footer.link = link.clone();
            }
            section.link = Some(link);
        }

        debug!(newest = newest_key, url = %links.url, "relinked changelog");
        self.links = Some(links);
    }

    /// The footer table as it will be written: unreleased first, then
    /// sections in order, then footers no section refers to.
    ///
    /// Once compare links are known every section link is derived from its
    /// next older keyed section, so sections added after [`bump`](Self::bump)
    /// are linked too.
    pub fn footer_links(&self) -> Vec<FooterLink> {
        let mut out = Vec::new();
        let keys: Vec<Option<&str>> = self.sections.iter().map(Section::linked_key).collect();

        if let Some(unreleased) = &self.unreleased {
            let newest = keys.iter().flatten().next().copied();
            let link = match (&self.links, newest) {
                (Some(links), Some(newest)) => Some(links.compare(Some(newest), "HEAD")),
                _ => unreleased.link.clone(),
            };
            if let Some(link) = link {
                out.push(FooterLink::new(UNRELEASED, link));
            }
        }

        for (i, section) in self.sections.iter().enumerate() {
            let Some(key) = keys[i] else { continue };
            let link = match &self.links {
                Some(links) => {
                    let base = keys[i + 1..]
                        .iter()
                        .flatten()
                        .next()
                        .copied()
                        .or(links.first_ref.as_deref());
                    Some(links.compare(base, key))
                }
                None => section.link.clone(),
            };
            if let Some(link) = link {
                out.push(FooterLink::new(key, link));
            }
        }

        out.extend(
            self.footers
                .iter()
                .filter(|f| !self.contains(&f.key))
                .cloned(),
        );
        out
    }
}

/// Split the footer block into links and trailing text
fn parse_footers(block: &str) -> (Vec<FooterLink>, String) {
    let lines: Vec<&str> = block.lines().collect();
    let mut footers = Vec::new();
    let mut last_footer = None;

    for (i, line) in lines.iter().enumerate() {
        if let Some(caps) = FOOTER_LINE.captures(line) {
            // first definition of a key wins, as in markdown
            let seen = footers
                .iter()
                .any(|f: &FooterLink| f.key.eq_ignore_ascii_case(&caps[1]));
            if !seen {
                footers.push(FooterLink::new(&caps[1], &caps[2]));
            }
            last_footer = Some(i);
        }
    }

    let suffix_start = last_footer.map_or(0, |i| i + 1);
    let suffix = lines[suffix_start..].join("\n").trim().to_string();
    (footers, suffix)
}

impl fmt::Display for Changelog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();

        if !self.header.is_empty() {
            parts.push(self.header.clone());
        }
        if let Some(unreleased) = &self.unreleased {
            parts.push(unreleased.to_string());
        }
        parts.extend(self.sections.iter().map(Section::to_string));

        let footers = self.footer_links();
        if !footers.is_empty() {
            parts.push(
                footers
                    .iter()
                    .map(FooterLink::to_string)
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
        }
        if !self.suffix.is_empty() {
            parts.push(self.suffix.clone());
        }

        writeln!(f, "{}", parts.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE: &str = "# Changelog

Intro text.

## [Unreleased]

- pending work

## [v1.1.0] - 2022-02-01

### Added

- thing

## [v1.0.0] - 2022-01-01

- first

[unreleased]: https://github.com/acme/widgets/compare/v1.1.0...HEAD
[v1.1.0]: https://github.com/acme/widgets/compare/v1.0.0...v1.1.0
[v1.0.0]: https://github.com/acme/widgets/commits/v1.0.0
[docs]: https://example.com/docs
";

    fn repo_links() -> CompareLinks {
        CompareLinks::new("https://github.com/acme/widgets")
    }

    fn tag(key: &str) -> Tag {
        Tag::new(key).with_date(NaiveDate::from_ymd_opt(2022, 3, 1).unwrap())
    }

    #[test]
    fn test_parse_structure() {
        let changelog = Changelog::parse(SAMPLE);
        assert_eq!(changelog.header(), "# Changelog\n\nIntro text.");

        let unreleased = changelog.unreleased().unwrap();
        assert_eq!(unreleased.body, "- pending work");
        assert_eq!(
            unreleased.link.as_deref(),
            Some("https://github.com/acme/widgets/compare/v1.1.0...HEAD")
        );

        assert_eq!(changelog.sections().len(), 2);
        let latest = &changelog.sections()[0];
        assert_eq!(latest.header, "[v1.1.0] - 2022-02-01");
        assert_eq!(latest.linked_key(), Some("v1.1.0"));
        assert_eq!(latest.body, "### Added\n\n- thing");
        assert_eq!(
            latest.link.as_deref(),
            Some("https://github.com/acme/widgets/compare/v1.0.0...v1.1.0")
        );
    }

    #[test]
    fn test_roundtrip_is_stable() {
        let first = Changelog::parse(SAMPLE);
        let text = first.to_string();
        assert_eq!(text, SAMPLE);

        let second = Changelog::parse(&text);
        assert_eq!(second, first);
        assert_eq!(second.to_string(), text);
    }

    #[test]
    fn test_crlf_normalized() {
        let changelog = Changelog::parse(&SAMPLE.replace('\n', "\r\n"));
        assert_eq!(changelog.to_string(), SAMPLE);
    }

    #[test]
    fn test_no_sections_uses_default_header() {
        let changelog = Changelog::parse("");
        assert_eq!(changelog.header(), DEFAULT_HEADER);
        assert!(changelog.sections().is_empty());
        assert_eq!(changelog.to_string(), format!("{}\n", DEFAULT_HEADER));
    }

    #[test]
    fn test_missing_footers() {
        let changelog = Changelog::parse("# Log\n\n## [v1.0.0]\n\n- one\n");
        assert_eq!(changelog.sections().len(), 1);
        assert!(changelog.sections()[0].link.is_none());
        assert!(changelog.footer_links().is_empty());
        assert_eq!(changelog.to_string(), "# Log\n\n## [v1.0.0]\n\n- one\n");
    }

    #[test]
    fn test_suffix_after_footers() {
        let text = "# Log\n\n## [v1.0.0]\n\n[v1.0.0]: https://x/1\n\n<!-- generated -->\n";
        let changelog = Changelog::parse(text);
        assert_eq!(changelog.suffix(), "<!-- generated -->");
        assert_eq!(changelog.to_string(), text);
    }

    #[test]
    fn test_non_footer_lines_in_footer_block_dropped() {
        let text = "## [v1.0.0]\n\n[v1.0.0]: https://x/1\nstray text\n[docs]: https://x/docs\n";
        let changelog = Changelog::parse(text);
        assert_eq!(changelog.suffix(), "");
        assert_eq!(
            changelog.to_string(),
            "## [v1.0.0]\n\n[v1.0.0]: https://x/1\n[docs]: https://x/docs\n"
        );
    }

    #[test]
    fn test_add_tag() {
        let mut changelog = Changelog::parse(SAMPLE);
        let mut new = tag("v1.2.0");
        new.body = "### Fixed\n\n- bug".to_string();
        new.link = Some("https://github.com/acme/widgets/compare/v1.1.0...v1.2.0".to_string());
        changelog.add_tag(&new).unwrap();

        let out = changelog.to_string();
        assert!(out.contains("## [v1.2.0] - 2022-03-01\n\n### Fixed\n\n- bug"));
        assert!(out.contains("[v1.2.0]: https://github.com/acme/widgets/compare/v1.1.0...v1.2.0"));

        let unreleased = out.find("## [Unreleased]").unwrap();
        let added = out.find("## [v1.2.0]").unwrap();
        let previous = out.find("## [v1.1.0]").unwrap();
        assert!(unreleased < added && added < previous);
    }

    #[test]
    fn test_add_tag_placeholder_link() {
        let mut changelog = Changelog::parse("# Log\n\n## [v1.0.0]\n");
        changelog.add_tag(&tag("v1.1.0")).unwrap();
        assert_eq!(changelog.footer_links()[0], FooterLink::new("v1.1.0", "#"));
    }

    #[test]
    fn test_duplicate_tag_leaves_document_unchanged() {
        let mut changelog = Changelog::parse(SAMPLE);
        let before = changelog.clone();

        let result = changelog.add_tag(&tag("V1.1.0"));
        assert!(matches!(result, Err(ChangelogError::DuplicateTag(key)) if key == "V1.1.0"));
        assert_eq!(changelog, before);
    }

    #[test]
    fn test_add_tag_and_bump_after_unreleased() {
        let mut changelog = Changelog::parse("# Changelog\n\n## [Unreleased]\n");
        changelog.add_tag(&tag("v1.0.0")).unwrap();
        changelog.bump(repo_links(), "v1.0.0");

        let out = changelog.to_string();
        assert!(out.contains("## [Unreleased]\n\n## [v1.0.0] - 2022-03-01"));
        assert!(out.contains("[unreleased]: https://github.com/acme/widgets/compare/v1.0.0...HEAD"));
        assert!(out.contains("[v1.0.0]: https://github.com/acme/widgets/commits/v1.0.0"));
    }

    #[test]
    fn test_bump_relinks_every_section() {
        let mut changelog = Changelog::parse(SAMPLE);
        let mut new = tag("v1.2.0");
        new.body = "- more".to_string();
        changelog.add_tag(&new).unwrap();
        changelog.bump(repo_links().with_first_ref(Some("abc123".to_string())), "v1.2.0");

        let links = changelog.footer_links();
        let keys: Vec<&str> = links.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, ["unreleased", "v1.2.0", "v1.1.0", "v1.0.0", "docs"]);
        assert_eq!(links[0].link, "https://github.com/acme/widgets/compare/v1.2.0...HEAD");
        assert_eq!(links[1].link, "https://github.com/acme/widgets/compare/v1.1.0...v1.2.0");
        assert_eq!(links[3].link, "https://github.com/acme/widgets/compare/abc123...v1.0.0");
        assert_eq!(links[4].link, "https://example.com/docs");
    }

    #[test]
    fn test_add_tag_after_bump_gets_compare_link() {
        let mut changelog = Changelog::parse(
            "# Changelog\n\n## [Unreleased]\n\n## [v1.0.0] - 2022-01-01\n\n[v1.0.0]: #\n",
        );
        changelog.bump(CompareLinks::new("https://github.com/a/b"), "v1.0.0");
        changelog.add_tag(&tag("v1.1.0")).unwrap();

        let out = changelog.to_string();
        assert!(out.contains("[unreleased]: https://github.com/a/b/compare/v1.1.0...HEAD"));
        assert!(out.contains("[v1.1.0]: https://github.com/a/b/compare/v1.0.0...v1.1.0"));
        assert!(out.contains("[v1.0.0]: https://github.com/a/b/commits/v1.0.0"));
        assert!(!out.contains("]: #"));
    }

    #[test]
    fn test_duplicate_footer_keys_keep_first() {
        let text = "## [v1]\n\n[v1]: https://x/a\n[V1]: https://x/b\n";
        let first = Changelog::parse(text);
        assert_eq!(first.sections()[0].link.as_deref(), Some("https://x/a"));

        let out = first.to_string();
        assert_eq!(out, "## [v1]\n\n[v1]: https://x/a\n");
        assert_eq!(Changelog::parse(&out), first);
    }

    #[test]
    fn test_footer_order_follows_sections() {
        let text = "## [v2]\n\n## [v1]\n\n[other]: https://x/o\n[v1]: https://x/1\n[v2]: https://x/2\n";
        let changelog = Changelog::parse(text);
        let keys: Vec<String> = changelog.footer_links().into_iter().map(|f| f.key).collect();
        assert_eq!(keys, ["v2", "v1", "other"]);
    }

    #[test]
    fn test_prepend_section() {
        let mut changelog = Changelog::parse("# Log\n\n## [v1.0.0]\n");
        let mut section = Section::new("[v0.9.0-hotfix]", "- patched");
        section.link = Some("https://x/hotfix".to_string());
        changelog.prepend(section);

        assert_eq!(changelog.sections()[0].linked_key(), Some("v0.9.0-hotfix"));
        assert_eq!(
            changelog.footer_links()[0],
            FooterLink::new("v0.9.0-hotfix", "https://x/hotfix")
        );
    }

    #[test]
    fn test_prepend_without_link_uses_placeholder() {
        let mut changelog = Changelog::parse("# Log\n\n## [v1.0.0]\n");
        changelog.prepend(Section::new("[v1.1.0]", "- new"));

        assert_eq!(changelog.sections()[0].link.as_deref(), Some("#"));
        assert_eq!(changelog.footer_links()[0], FooterLink::new("v1.1.0", "#"));
    }

    #[test]
    fn test_compare_links() {
        let links = CompareLinks::new("https://github.com/acme/widgets/");
        assert_eq!(
            links.compare(Some("v1.0.0"), "v1.1.0"),
            "https://github.com/acme/widgets/compare/v1.0.0...v1.1.0"
        );
        assert_eq!(links.compare(None, "v1.0.0"), "https://github.com/acme/widgets/commits/v1.0.0");
    }
}
