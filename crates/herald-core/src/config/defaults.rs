//! Default configuration values

use super::types::{Config, DiffGroupConfig};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "herald.json";

/// Alternative (hidden) configuration file name
pub const ALT_CONFIG_FILE: &str = ".herald.json";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![DEFAULT_CONFIG_FILE, ALT_CONFIG_FILE]
}

/// One changelog line per commit. The ticket follows a space so autolinks
/// can match it.
pub const DEFAULT_COMMIT_LINE: &str =
    r#"- {"**"scope":** "}{title}{" "ticket} ({hash}){" (#"pr")"}"#;

/// Annotated tag message
pub const DEFAULT_TAG_MESSAGE: &str = r#"{tag}{<NL><NL>body}"#;

/// Pull request title
pub const DEFAULT_PR_TITLE: &str = r#"Release {tag}{" ("ticket")"}"#;

/// Pull request body
pub const DEFAULT_PR_BODY: &str = r###"{"## "tag}{<NL><NL>body}{<NL><NL>"**Compare**: "link}"###;

/// Hosted release title
pub const DEFAULT_RELEASE_TITLE: &str = "{tag}";

/// Hosted release notes
pub const DEFAULT_RELEASE_BODY: &str = r#"{body}{<NL><NL>"**Full changelog**: "link}"#;

/// Default commit groups, in match order
pub fn default_groups() -> Vec<DiffGroupConfig> {
    vec![
        DiffGroupConfig::new("Breaking Changes", &[r"^\w+(\([^)]*\))?!:"], 30),
        DiffGroupConfig::new("Added", &["^feat"], 20),
        DiffGroupConfig::new("Fixed", &["^fix"], 10),
        DiffGroupConfig::new("Performance", &["^perf"], 5),
        DiffGroupConfig::new("Documentation", &["^docs"], 0),
    ]
}

/// Generate the default configuration as pretty JSON
pub fn default_config_json() -> String {
    let config = Config {
        schema: Some(SCHEMA_URL.to_string()),
        ..Config::default()
    };
    serde_json::to_string_pretty(&config).unwrap_or_else(|_| "{}".to_string())
}

/// Published JSON schema for the config file
pub const SCHEMA_URL: &str = "https://raw.githubusercontent.com/example/herald/main/schema.json";
