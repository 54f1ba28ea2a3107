//! A release tag and its template context

use chrono::{Local, NaiveDate};

use crate::template::Context;

/// The release being cut.
///
/// One tag feeds the changelog section, the annotated tag message, pull
/// request text and the hosted release notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    key: String,
    ticket: Option<String>,
    date: Option<NaiveDate>,
    /// Changelog content for this release
    pub body: String,
    /// Compare URL
    pub link: Option<String>,
}

impl Tag {
    /// New tag dated today
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ticket: None,
            date: Some(Local::now().date_naive()),
            body: String::new(),
            link: None,
        }
    }

    pub fn with_ticket(mut self, ticket: Option<String>) -> Self {
        self.ticket = ticket.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Drop the date from the section header
    pub fn undated(mut self) -> Self {
        self.date = None;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn ticket(&self) -> Option<&str> {
        self.ticket.as_deref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// `[key] - YYYY-MM-DD`, or `[key]` when undated
    pub fn section_header(&self) -> String {
        match self.date {
            Some(date) => format!("[{}] - {}", self.key, date.format("%Y-%m-%d")),
            None => format!("[{}]", self.key),
        }
    }

    /// Template context: `tag`, `version`, `ticket`, `body`, `link`, `date`,
    /// plus `repo` when known
    pub fn context(&self, repo: Option<&str>) -> Context {
        let mut context = Context::new()
            .with("tag", self.key.as_str())
            .with("version", self.key.as_str())
            .with("body", self.body.as_str());
        context.insert_opt("ticket", self.ticket.as_deref());
        context.insert_opt("link", self.link.as_deref());
        context.insert_opt("date", self.date.map(|d| d.format("%Y-%m-%d").to_string()));
        context.insert_opt("repo", repo);
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::render;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    #[test]
    fn test_defaults_to_today() {
        assert_eq!(Tag::new("v1.0.0").date(), Some(Local::now().date_naive()));
    }

    #[test]
    fn test_section_header() {
        let tag = Tag::new("v1.0.0").with_date(date());
        assert_eq!(tag.section_header(), "[v1.0.0] - 2024-05-17");
        assert_eq!(tag.undated().section_header(), "[v1.0.0]");
    }

    #[test]
    fn test_blank_ticket_ignored() {
        let tag = Tag::new("v1.0.0").with_ticket(Some("  ".to_string()));
        assert_eq!(tag.ticket(), None);
    }

    #[test]
    fn test_context() {
        let mut tag = Tag::new("v1.2.0")
            .with_date(date())
            .with_ticket(Some("EVAN-9".to_string()));
        tag.body = "- fixed".to_string();
        tag.link = Some("https://x/compare".to_string());

        let context = tag.context(Some("https://github.com/acme/widgets"));
        assert_eq!(
            render("{tag}|{version|noprefix}|{ticket}|{date}|{link}|{repo}", &context),
            "v1.2.0|1.2.0|EVAN-9|2024-05-17|https://x/compare|https://github.com/acme/widgets"
        );
        assert_eq!(render("{body}", &context), "- fixed");
    }

    #[test]
    fn test_context_without_optionals() {
        let context = Tag::new("v1.2.0").undated().context(None);
        assert_eq!(render(r#"{tag}{" ("ticket")"}{" on "date}"#, &context), "v1.2.0");
    }
}
