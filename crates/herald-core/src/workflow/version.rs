//! Version workflow operations

use std::sync::LazyLock;

use regex::Regex;
use semver::{Prerelease, Version};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Result, VersionError};
use crate::types::ReleaseType;

static BREAKING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+(\([^)]*\))?!:").expect("Invalid regex"));

static FEATURE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^feat(\([^)]*\))?:").expect("Invalid regex"));

static PATCH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(fix|perf)(\([^)]*\))?:").expect("Invalid regex"));

/// Parse the version part of a tag, ignoring any leading non-digit prefix
pub fn version_from_tag(tag: &str) -> Option<Version> {
    let start = tag.find(|c: char| c.is_ascii_digit())?;
    Version::parse(&tag[start..]).ok()
}

/// Infer the bump from commit messages (title line plus optional body)
pub fn infer_release_type<'a>(
    messages: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
) -> Option<ReleaseType> {
    messages
        .into_iter()
        .filter_map(|(title, body)| {
            let breaking_footer = body.is_some_and(|b| b.contains("BREAKING CHANGE"));
            if breaking_footer || BREAKING_REGEX.is_match(title) {
                Some(ReleaseType::Major)
            } else if FEATURE_REGEX.is_match(title) {
                Some(ReleaseType::Minor)
            } else if PATCH_REGEX.is_match(title) {
                Some(ReleaseType::Patch)
            } else {
                None
            }
        })
        .max()
}

/// Calculate the next version from the current one
pub fn calculate_next_version(
    current_version: &str,
    release_type: ReleaseType,
    prerelease_identifier: &str,
) -> Result<String> {
    debug!(current = current_version, release_type = ?release_type, "calculating next version");
    let trimmed = current_version.trim_start_matches(|c: char| !c.is_ascii_digit());
    let version = Version::parse(trimmed)
        .map_err(|e| VersionError::ParseFailed(current_version.to_string(), e.to_string()))?;

    let next = match release_type {
        ReleaseType::Major => Version::new(version.major + 1, 0, 0),
        ReleaseType::Minor => Version::new(version.major, version.minor + 1, 0),
        ReleaseType::Patch if !version.pre.is_empty() => {
            Version::new(version.major, version.minor, version.patch)
        }
        ReleaseType::Patch => Version::new(version.major, version.minor, version.patch + 1),
        ReleaseType::Prerelease => {
            let (base, pre) = if version.pre.is_empty() {
                (
                    Version::new(version.major, version.minor, version.patch + 1),
                    format!("{}.1", prerelease_identifier),
                )
            } else {
                (
                    Version::new(version.major, version.minor, version.patch),
                    increment_prerelease(version.pre.as_str()),
                )
            };
            let mut v = base;
            v.pre = Prerelease::new(&pre)
                .map_err(|e| VersionError::ParseFailed(pre.clone(), e.to_string()))?;
            v
        }
    };

    let next_str = next.to_string();
    info!(current = current_version, next = %next_str, release_type = ?release_type, "version calculated");
    Ok(next_str)
}

fn increment_prerelease(pre: &str) -> String {
    if let Some((identifier, number)) = pre.rsplit_once('.') {
        if let Ok(n) = number.parse::<u64>() {
            return format!("{}.{}", identifier, n + 1);
        }
    }
    format!("{}.1", pre)
}

/// Format a version tag based on the configuration
pub fn format_tag(config: &Config, version: &str) -> String {
    config.versioning.tag_format.replace("{version}", version)
}
