//! Configuration validation

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::{Config, TemplateConfig};

/// Compile a user-supplied pattern (case-insensitive, multi-line)
pub fn compile_pattern(field: &str, pattern: &str) -> std::result::Result<Regex, ConfigError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .multi_line(true)
        .build()
        .map_err(|source| ConfigError::PatternCompile {
            field: field.to_string(),
            pattern: pattern.to_string(),
            source,
        })
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_versioning(config)?;
    validate_git(config)?;
    validate_changelog(config)?;
    validate_autolinks(config)?;
    validate_templates(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_versioning(config: &Config) -> Result<()> {
    if !config.versioning.tag_format.contains("{version}") {
        return Err(ConfigError::InvalidValue {
            field: "versioning.tag_format".to_string(),
            message: "must contain {version} placeholder".to_string(),
        }
        .into());
    }

    if let Some(pattern) = &config.versioning.tag_pattern {
        compile_pattern("versioning.tag_pattern", pattern)?;
    }

    Ok(())
}

fn validate_git(config: &Config) -> Result<()> {
    if config.git.remote.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "git.remote".to_string(),
            message: "remote cannot be empty".to_string(),
        }
        .into());
    }

    if config.git.branch.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "git.branch".to_string(),
            message: "branch cannot be empty".to_string(),
        }
        .into());
    }

    Ok(())
}

fn validate_changelog(config: &Config) -> Result<()> {
    if config.changelog.fallback_group.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "changelog.fallback_group".to_string(),
            message: "fallback group title cannot be empty".to_string(),
        }
        .into());
    }

    for (i, group) in config.changelog.groups.iter().enumerate() {
        if group.matches.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("changelog.groups[{}].matches", i),
                message: "group needs at least one pattern".to_string(),
            }
            .into());
        }
        for (j, pattern) in group.matches.iter().enumerate() {
            compile_pattern(&format!("changelog.groups[{}].matches[{}]", i, j), pattern)?;
        }
    }

    Ok(())
}

fn validate_autolinks(config: &Config) -> Result<()> {
    for (i, rule) in config.autolinks.iter().enumerate() {
        if rule.matches.is_empty() || rule.matches.iter().any(|m| m.is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: format!("autolinks[{}].matches", i),
                message: "prefixes cannot be empty".to_string(),
            }
            .into());
        }
        if !rule.link.contains("{num}") {
            return Err(ConfigError::InvalidValue {
                field: format!("autolinks[{}].link", i),
                message: "must contain {num} placeholder".to_string(),
            }
            .into());
        }
    }

    Ok(())
}

fn validate_templates(config: &Config) -> Result<()> {
    let templates: [(&str, &TemplateConfig); 5] = [
        ("tag_message", &config.tag_message),
        ("pull_requests.title", &config.pull_requests.title),
        ("pull_requests.body", &config.pull_requests.body),
        ("release.title", &config.release.title),
        ("release.body", &config.release.body),
    ];

    for (field, template) in templates {
        if template.source_count() != 1 {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                message: "exactly one of value, file or github must be set".to_string(),
            }
            .into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AutoLinkConfig, DiffGroupConfig};
    use crate::error::HeraldError;

    #[test]
    fn test_validate_default_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_invalid_tag_format() {
        let mut config = Config::default();
        config.versioning.tag_format = "no-placeholder".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_bad_group_pattern() {
        let mut config = Config::default();
        config
            .changelog
            .groups
            .push(DiffGroupConfig::new("Broken", &["[unclosed"], 0));

        match validate_config(&config) {
            Err(HeraldError::Config(ConfigError::PatternCompile { field, pattern, .. })) => {
                assert_eq!(field, "changelog.groups[5].matches[0]");
                assert_eq!(pattern, "[unclosed");
            }
            other => panic!("expected pattern error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_bad_tag_pattern() {
        let mut config = Config::default();
        config.versioning.tag_pattern = Some("(v".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_autolink_requires_num() {
        let mut config = Config::default();
        config.autolinks.push(AutoLinkConfig {
            matches: vec!["PROJ-".to_string()],
            link: "https://example.com/browse".to_string(),
        });
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_template_without_source() {
        let mut config = Config::default();
        config.release.body = TemplateConfig::default();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_template_with_two_sources() {
        let mut config = Config::default();
        config.tag_message.file = Some("TAG.md".into());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_compile_pattern_is_case_insensitive() {
        let regex = compile_pattern("test", "^fix").unwrap();
        assert!(regex.is_match("Fix: typo"));
    }
}
