//! Tag operations

use regex::Regex;
use semver::Version;
use tracing::{debug, info, instrument};

use crate::command::run_command;
use crate::repository::{GitRepo, Result};
use crate::types::TagInfo;
use herald_core::error::GitError;

impl GitRepo {
    /// Get all tags
    #[instrument(skip(self))]
    pub fn tags(&self) -> Result<Vec<TagInfo>> {
        let mut tags = Vec::new();

        self.repo.tag_foreach(|oid, name| {
            let name = String::from_utf8_lossy(name)
                .trim_start_matches("refs/tags/")
                .to_string();

            if let Ok(commit) = self.repo.find_commit(oid) {
                tags.push(TagInfo::new(&name, commit.id().to_string()));
            } else if let Ok(tag) = self.repo.find_tag(oid) {
                let mut info = TagInfo::new(&name, tag.target_id().to_string());
                if let Some(msg) = tag.message() {
                    info = info.with_message(msg);
                }
                tags.push(info);
            }

            true
        })?;

        debug!(count = tags.len(), "listed all tags");
        Ok(tags)
    }

    /// Get tags whose name matches a regex
    pub fn tags_matching(&self, pattern: &str) -> Result<Vec<TagInfo>> {
        let regex =
            Regex::new(pattern).map_err(|e| GitError::InvalidTagPattern(e.to_string()))?;

        Ok(self
            .tags()?
            .into_iter()
            .filter(|t| regex.is_match(&t.name))
            .collect())
    }

    /// Find the latest tag by semantic version
    #[instrument(skip(self))]
    pub fn find_latest_tag(&self, pattern: Option<&str>) -> Result<Option<TagInfo>> {
        self.latest_tag_where(pattern, |_| true)
    }

    /// Find the latest tag whose version is strictly below `version`
    #[instrument(skip(self))]
    pub fn find_tag_before(
        &self,
        pattern: Option<&str>,
        version: &Version,
    ) -> Result<Option<TagInfo>> {
        self.latest_tag_where(pattern, |v| v < version)
    }

    fn latest_tag_where(
        &self,
        pattern: Option<&str>,
        accept: impl Fn(&Version) -> bool,
    ) -> Result<Option<TagInfo>> {
        let tags = match pattern {
            Some(p) => self.tags_matching(p)?,
            None => self.tags()?,
        };

        let latest = tags
            .into_iter()
            .filter_map(|t| {
                let version = t.version.as_deref().and_then(|v| Version::parse(v).ok())?;
                Some((t, version))
            })
            .filter(|(_, v)| accept(v))
            .max_by(|a, b| a.1.cmp(&b.1))
            .map(|(t, _)| t);

        debug!(latest = ?latest.as_ref().map(|t| &t.name), "found latest tag");
        Ok(latest)
    }

    /// Find a specific tag by name
    pub fn find_tag(&self, name: &str) -> Result<Option<TagInfo>> {
        let tag_ref = format!("refs/tags/{}", name);

        match self.repo.find_reference(&tag_ref) {
            Ok(reference) => {
                let target = reference.peel_to_commit()?;
                Ok(Some(TagInfo::new(name, target.id().to_string())))
            }
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::Git2(e)),
        }
    }

    /// Create an annotated tag on HEAD.
    ///
    /// Signed tags go through the `git` CLI so the user's gpg/ssh signing
    /// setup applies.
    #[instrument(skip(self, message), fields(name, sign))]
    pub fn create_tag(&self, name: &str, message: &str, sign: bool) -> Result<TagInfo> {
        if self.find_tag(name)?.is_some() {
            return Err(GitError::TagExists(name.to_string()));
        }

        let head = self.head_commit()?;

        if sign {
            run_command("git", &["tag", "-s", name, "-m", message], Some(self.root()))?;
        } else {
            let sig = self.repo.signature()?;
            self.repo
                .tag(name, head.as_object(), &sig, message, false)?;
        }

        info!(name, sign, "created tag");
        Ok(TagInfo::new(name, head.id().to_string()).with_message(message))
    }
}
