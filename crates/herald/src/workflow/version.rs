//! Next version resolution

use tracing::{debug, info, instrument};

use herald_core::error::VersionError;
use herald_core::workflow::{calculate_next_version, format_tag, infer_release_type, version_from_tag};
use herald_core::{Config, ReleaseType, Result};
use herald_git::{CommitInfo, GitRepo, TagInfo};

/// The version being released and the history it covers
#[derive(Debug, Clone)]
pub struct VersionResolution {
    /// Newest release tag older than the new version
    pub previous: Option<TagInfo>,
    /// Bump applied; `None` when the version was given explicitly
    pub release_type: Option<ReleaseType>,
    pub version: String,
    pub tag: String,
    /// Commits since `previous`, newest first
    pub commits: Vec<CommitInfo>,
}

impl VersionResolution {
    pub fn previous_name(&self) -> Option<&str> {
        self.previous.as_ref().map(|t| t.name.as_str())
    }

    pub fn current_version(&self) -> &str {
        self.previous
            .as_ref()
            .and_then(|t| t.version.as_deref())
            .unwrap_or("0.0.0")
    }
}

/// Work out the next version.
///
/// An explicit version wins; otherwise `release_type` or the bump inferred
/// from commits (breaking -> major, feat -> minor, anything else -> patch)
/// is applied to the latest tag.
#[instrument(skip(config, repo))]
pub fn resolve_version(
    config: &Config,
    repo: &GitRepo,
    explicit: Option<&str>,
    release_type: Option<ReleaseType>,
) -> Result<VersionResolution> {
    let pattern = config.versioning.tag_pattern.as_deref();

    let resolution = match explicit {
        Some(raw) => {
            let version = version_from_tag(raw).ok_or_else(|| {
                VersionError::ParseFailed(raw.to_string(), "not a semantic version".to_string())
            })?;
            let previous = repo.find_tag_before(pattern, &version)?;
            let commits = repo.commits_since(previous.as_ref().map(|t| t.name.as_str()))?;
            let version = version.to_string();

            VersionResolution {
                previous,
                release_type: None,
                tag: format_tag(config, &version),
                version,
                commits,
            }
        }
        None => {
            let previous = repo.find_latest_tag(pattern)?;
            let commits = repo.commits_since(previous.as_ref().map(|t| t.name.as_str()))?;

            let release_type = release_type
                .or_else(|| {
                    infer_release_type(
                        commits
                            .iter()
                            .map(|c| (c.message.as_str(), c.body.as_deref())),
                    )
                })
                .unwrap_or(ReleaseType::Patch);
            debug!(release_type = %release_type, commits = commits.len(), "bump selected");

            let current = previous
                .as_ref()
                .and_then(|t| t.version.clone())
                .unwrap_or_else(|| "0.0.0".to_string());
            let version = calculate_next_version(
                &current,
                release_type,
                &config.versioning.prerelease_identifier,
            )?;

            VersionResolution {
                previous,
                release_type: Some(release_type),
                tag: format_tag(config, &version),
                version,
                commits,
            }
        }
    };

    info!(
        previous = ?resolution.previous_name(),
        tag = %resolution.tag,
        commits = resolution.commits.len(),
        "version resolved"
    );
    Ok(resolution)
}
