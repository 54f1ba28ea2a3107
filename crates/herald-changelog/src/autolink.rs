//! Ticket mention linking
//!
//! Rewrites plain `PROJ-123` style mentions into markdown links. A mention is
//! a configured prefix followed by digits, at the start of a line or after
//! whitespace. Mentions already inside `[...]` are left alone, which makes
//! [`inject`] idempotent.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use herald_core::config::{compile_pattern, AutoLinkConfig};
use herald_core::error::ConfigError;

static INSIDE_BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\[]*\]").expect("Invalid regex"));

static EMPTY_WRAPPERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*\)|\[\s*\]").expect("Invalid regex"));

/// A compiled prefix -> URL rule
#[derive(Debug, Clone)]
pub struct AutoLinkRule {
    prefixes: Vec<String>,
    link: String,
    pattern: Regex,
}

impl AutoLinkRule {
    /// Compile a rule; `link` should contain `{num}`
    pub fn new(prefixes: &[String], link: impl Into<String>) -> Result<Self, ConfigError> {
        let alternation = prefixes
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = compile_pattern(
            "autolinks.matches",
            &format!(r"(^|\s)({})(\d+)", alternation),
        )?;

        Ok(Self {
            prefixes: prefixes.to_vec(),
            link: link.into(),
            pattern,
        })
    }

    pub fn from_config(config: &AutoLinkConfig) -> Result<Self, ConfigError> {
        Self::new(&config.matches, config.link.clone())
    }

    fn url(&self, num: &str) -> String {
        self.link.replace("{num}", num)
    }

    /// The configured spelling of a prefix matched case-insensitively
    fn canonical_prefix<'a>(&'a self, matched: &'a str) -> &'a str {
        self.prefixes
            .iter()
            .find(|p| p.eq_ignore_ascii_case(matched))
            .map(String::as_str)
            .unwrap_or(matched)
    }
}

/// Compile every configured rule, preserving order
pub fn compile(configs: &[AutoLinkConfig]) -> Result<Vec<AutoLinkRule>, ConfigError> {
    configs.iter().map(AutoLinkRule::from_config).collect()
}

struct Mention<'r> {
    /// Byte range of prefix + digits
    start: usize,
    end: usize,
    prefix_end: usize,
    rule: &'r AutoLinkRule,
}

/// Earliest mention at or after `from`; ties go to the earlier rule.
fn next_mention<'r>(text: &str, from: usize, rules: &'r [AutoLinkRule]) -> Option<Mention<'r>> {
    rules
        .iter()
        .filter_map(|rule| {
            let caps = rule.pattern.captures_at(text, from)?;
            let prefix = caps.get(2)?;
            let digits = caps.get(3)?;
            Some(Mention {
                start: prefix.start(),
                end: digits.end(),
                prefix_end: prefix.end(),
                rule,
            })
        })
        .min_by_key(|m| m.start)
}

fn mentions<'a>(text: &'a str, rules: &'a [AutoLinkRule]) -> impl Iterator<Item = Mention<'a>> + 'a {
    let mut pos = 0;
    std::iter::from_fn(move || {
        let mention = next_mention(text, pos, rules)?;
        pos = mention.end;
        Some(mention)
    })
}

/// Replace plain mentions with `[mention](link)`
pub fn inject(text: &str, rules: &[AutoLinkRule]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut linked = 0;

    for m in mentions(text, rules) {
        out.push_str(&text[last..m.start]);
        let mention = &text[m.start..m.end];
        if INSIDE_BRACKETS.is_match(&text[m.end..]) {
            out.push_str(mention);
        } else {
            out.push_str(&format!("[{}]({})", mention, m.rule.url(&text[m.prefix_end..m.end])));
            linked += 1;
        }
        last = m.end;
    }
    out.push_str(&text[last..]);

    if linked > 0 {
        debug!(linked, "linked ticket mentions");
    }
    out
}

/// First mention in `text`, normalized to the configured prefix spelling
pub fn extract(text: &str, rules: &[AutoLinkRule]) -> Option<String> {
    let m = next_mention(text, 0, rules)?;
    let prefix = m.rule.canonical_prefix(&text[m.start..m.prefix_end]);
    Some(format!("{}{}", prefix, &text[m.prefix_end..m.end]))
}

/// Remove every mention, drop the empty `()`/`[]` left behind and collapse
/// whitespace
pub fn strip(text: &str, rules: &[AutoLinkRule]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in mentions(text, rules) {
        out.push_str(&text[last..m.start]);
        last = m.end;
    }
    out.push_str(&text[last..]);

    let out = EMPTY_WRAPPERS.replace_all(&out, "");
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<AutoLinkRule> {
        compile(&[
            AutoLinkConfig {
                matches: vec!["EVAN-".to_string()],
                link: "https://linear.app/evan/issue/EVAN-{num}".to_string(),
            },
            AutoLinkConfig {
                matches: vec!["GH-".to_string(), "#".to_string()],
                link: "https://github.com/acme/widgets/issues/{num}".to_string(),
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_inject_repeated_mentions() {
        let out = inject("fix EVAN-123 and EVAN-123 again", &rules());
        assert_eq!(
            out,
            "fix [EVAN-123](https://linear.app/evan/issue/EVAN-123) and \
             [EVAN-123](https://linear.app/evan/issue/EVAN-123) again"
        );
    }

    #[test]
    fn test_inject_no_mentions() {
        assert_eq!(inject("nothing to see", &rules()), "nothing to see");
        assert_eq!(inject("", &rules()), "");
        assert_eq!(inject("EVAN-1", &[]), "EVAN-1");
    }

    #[test]
    fn test_inject_adjacent_and_line_start() {
        let out = inject("EVAN-1 GH-2\n#3", &rules());
        assert_eq!(
            out,
            "[EVAN-1](https://linear.app/evan/issue/EVAN-1) \
             [GH-2](https://github.com/acme/widgets/issues/2)\n\
             [#3](https://github.com/acme/widgets/issues/3)"
        );
    }

    #[test]
    fn test_inject_is_idempotent() {
        let rules = rules();
        let once = inject("see EVAN-7, GH-8 and #9.", &rules);
        assert_eq!(inject(&once, &rules), once);
    }

    #[test]
    fn test_inject_skips_bracketed() {
        let text = "already [see EVAN-5] linked";
        assert_eq!(inject(text, &rules()), text);
    }

    #[test]
    fn test_inject_requires_leading_boundary() {
        let text = "xEVAN-1 EVAN-";
        assert_eq!(inject(text, &rules()), text);
    }

    #[test]
    fn test_inject_links_digits_before_trailing_text() {
        assert_eq!(
            inject("see EVAN-12a", &rules()),
            "see [EVAN-12](https://linear.app/evan/issue/EVAN-12)a"
        );
    }

    #[test]
    fn test_inject_case_insensitive() {
        assert_eq!(
            inject("evan-4", &rules()),
            "[evan-4](https://linear.app/evan/issue/EVAN-4)"
        );
    }

    #[test]
    fn test_extract_normalizes_prefix() {
        assert_eq!(extract("feat(evan-42): thing", &rules()), None);
        assert_eq!(extract("feat: thing evan-42", &rules()).as_deref(), Some("EVAN-42"));
        assert_eq!(extract("gh-3 then EVAN-1", &rules()).as_deref(), Some("GH-3"));
        assert_eq!(extract("plain", &rules()), None);
    }

    #[test]
    fn test_strip() {
        assert_eq!(strip("add endpoint EVAN-12", &rules()), "add endpoint");
        assert_eq!(strip("add endpoint ( EVAN-12 )", &rules()), "add endpoint");
        assert_eq!(strip("EVAN-1  fix   the thing", &rules()), "fix the thing");
        assert_eq!(strip("api EVAN-3", &rules()), "api");
    }
}
