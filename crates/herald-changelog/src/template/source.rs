//! Template content sources

use std::cell::OnceCell;
use std::path::PathBuf;

use tracing::{debug, instrument};

use herald_core::config::{GithubFileRef, TemplateConfig};
use herald_core::error::ChangelogError;
use herald_git::GhCli;

use super::Context;

/// Where a template's text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Value(String),
    File(PathBuf),
    Github(GithubFileRef),
}

impl TemplateSource {
    fn describe(&self) -> String {
        match self {
            Self::Value(_) => "inline value".to_string(),
            Self::File(path) => path.display().to_string(),
            Self::Github(r) => format!("github:{}@{}/{}", r.repo, r.branch, r.path),
        }
    }
}

/// Resolves file and GitHub template sources.
///
/// Relative file paths are taken from `base_dir`; the `gh` CLI is only
/// located the first time a GitHub source is loaded.
#[derive(Debug)]
pub struct TemplateLoader {
    base_dir: PathBuf,
    gh: OnceCell<GhCli>,
}

impl TemplateLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            gh: OnceCell::new(),
        }
    }

    fn gh(&self) -> Result<&GhCli, ChangelogError> {
        if let Some(gh) = self.gh.get() {
            return Ok(gh);
        }
        let gh = GhCli::new(&self.base_dir).map_err(|e| ChangelogError::TemplateLoad {
            origin: "github".to_string(),
            reason: e.to_string(),
        })?;
        Ok(self.gh.get_or_init(|| gh))
    }

    fn load(&self, source: &TemplateSource) -> Result<String, ChangelogError> {
        let load_error = |reason: String| ChangelogError::TemplateLoad {
            origin: source.describe(),
            reason,
        };

        match source {
            TemplateSource::Value(value) => Ok(value.clone()),
            TemplateSource::File(path) => {
                let path = if path.is_absolute() {
                    path.clone()
                } else {
                    self.base_dir.join(path)
                };
                std::fs::read_to_string(&path).map_err(|e| load_error(e.to_string()))
            }
            TemplateSource::Github(r) => self
                .gh()?
                .fetch_file(&r.repo, &r.branch, &r.path)
                .map_err(|e| load_error(e.to_string())),
        }
    }
}

/// A template with exactly one source, fetched at most once
#[derive(Debug)]
pub struct Template {
    source: TemplateSource,
    content: OnceCell<String>,
}

impl Template {
    /// Build from config, rejecting zero or several sources
    pub fn from_config(name: &str, config: &TemplateConfig) -> Result<Self, ChangelogError> {
        let source = match (&config.value, &config.file, &config.github) {
            (Some(value), None, None) => TemplateSource::Value(value.clone()),
            (None, Some(file), None) => TemplateSource::File(file.clone()),
            (None, None, Some(github)) => TemplateSource::Github(github.clone()),
            _ => {
                return Err(ChangelogError::MalformedTemplateSource(format!(
                    "{} sets {} sources",
                    name,
                    config.source_count()
                )))
            }
        };
        Ok(Self::new(source))
    }

    pub fn new(source: TemplateSource) -> Self {
        Self {
            source,
            content: OnceCell::new(),
        }
    }

    /// Template with inline text
    pub fn inline(value: impl Into<String>) -> Self {
        Self::new(TemplateSource::Value(value.into()))
    }

    /// Template read from a file
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(TemplateSource::File(path.into()))
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    /// Template text, loading it on first use
    pub fn content(&self, loader: &TemplateLoader) -> Result<&str, ChangelogError> {
        if let Some(content) = self.content.get() {
            return Ok(content);
        }
        let loaded = loader.load(&self.source)?;
        debug!(source = %self.source.describe(), bytes = loaded.len(), "loaded template");
        Ok(self.content.get_or_init(|| loaded))
    }

    /// Load and render against `context`
    #[instrument(skip_all, fields(source = %self.source.describe()))]
    pub fn render(&self, context: &Context, loader: &TemplateLoader) -> Result<String, ChangelogError> {
        Ok(super::render(self.content(loader)?, context))
    }
}
