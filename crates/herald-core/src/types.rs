//! Core types for Herald

use serde::{Deserialize, Serialize};

/// Type of version bump being performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    /// Pre-release version
    Prerelease,
    /// Patch version bump (bug fixes)
    Patch,
    /// Minor version bump (new features)
    Minor,
    /// Major version bump (breaking changes)
    Major,
}

impl ReleaseType {
    /// Returns the string representation of the release type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
            Self::Prerelease => "prerelease",
        }
    }
}

impl std::fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReleaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            "prerelease" | "pre" => Ok(Self::Prerelease),
            _ => Err(format!("Unknown release type: {}", s)),
        }
    }
}

/// Which part of the release workflow runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseMode {
    /// Changelog, commit, tag, push, pull requests and release
    #[default]
    Full,
    /// Only open pull requests for an existing tag
    PrOnly,
    /// Only create the hosted release for an existing tag
    ReleaseOnly,
}

impl ReleaseMode {
    /// Whether the changelog and tag are created in this mode
    pub fn mutates_changelog(&self) -> bool {
        matches!(self, Self::Full)
    }

    /// Whether pull requests are opened in this mode
    pub fn opens_pull_requests(&self) -> bool {
        matches!(self, Self::Full | Self::PrOnly)
    }

    /// Whether the hosted release is created in this mode
    pub fn creates_release(&self) -> bool {
        matches!(self, Self::Full | Self::ReleaseOnly)
    }
}

/// Result of a release run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseSummary {
    /// Previous tag, if any
    pub previous_tag: Option<String>,
    /// Tag that was (or would be) created
    pub tag: String,
    /// Compare link for the release
    pub link: String,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Pull request URLs that were opened
    pub pull_requests: Vec<String>,
    /// Release URL, if a release was created
    pub release_url: Option<String>,
    /// Any notes or warnings
    pub notes: Vec<String>,
}

impl ReleaseSummary {
    /// Create a new summary for a tag
    pub fn new(tag: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            previous_tag: None,
            tag: tag.into(),
            link: link.into(),
            dry_run: false,
            pull_requests: Vec::new(),
            release_url: None,
            notes: Vec::new(),
        }
    }

    /// Add a note
    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_type_from_str() {
        assert_eq!("major".parse::<ReleaseType>().unwrap(), ReleaseType::Major);
        assert_eq!("pre".parse::<ReleaseType>().unwrap(), ReleaseType::Prerelease);
        assert!("bogus".parse::<ReleaseType>().is_err());
    }

    #[test]
    fn test_release_type_ordering() {
        assert!(ReleaseType::Major > ReleaseType::Minor);
        assert!(ReleaseType::Minor > ReleaseType::Patch);
        assert_eq!(
            [ReleaseType::Patch, ReleaseType::Major, ReleaseType::Minor]
                .into_iter()
                .max(),
            Some(ReleaseType::Major)
        );
    }

    #[test]
    fn test_release_mode_steps() {
        assert!(ReleaseMode::Full.mutates_changelog());
        assert!(!ReleaseMode::PrOnly.mutates_changelog());
        assert!(ReleaseMode::PrOnly.opens_pull_requests());
        assert!(!ReleaseMode::PrOnly.creates_release());
        assert!(ReleaseMode::ReleaseOnly.creates_release());
        assert!(!ReleaseMode::ReleaseOnly.opens_pull_requests());
    }
}
