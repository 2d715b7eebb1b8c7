//! Configuration types.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Runtime configuration for the `inbox-rules` binary.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON fixture describing the org, its labels, groups, messages and rules.
    pub fixture_path: PathBuf,
    /// Tracing filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Derive one keyword rule per org label, in addition to explicit rules.
    pub label_rules: bool,
    /// Record backend calls and print them instead of sending them.
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fixture_path: PathBuf::from("fixture.json"),
            log_filter: "info".to_string(),
            label_rules: true,
            dry_run: false,
        }
    }
}

impl Config {
    /// Build config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config through `lookup`, which maps a variable name to its
    /// value if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let fixture_path = lookup("INBOX_RULES_FIXTURE")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("INBOX_RULES_FIXTURE".into()))?;

        let log_filter = lookup("INBOX_RULES_LOG")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.log_filter);

        let label_rules = match lookup("INBOX_RULES_LABEL_RULES") {
            Some(raw) => parse_bool("INBOX_RULES_LABEL_RULES", &raw)?,
            None => defaults.label_rules,
        };

        let dry_run = match lookup("INBOX_RULES_DRY_RUN") {
            Some(raw) => parse_bool("INBOX_RULES_DRY_RUN", &raw)?,
            None => defaults.dry_run,
        };

        Ok(Self {
            fixture_path,
            log_filter,
            label_rules,
            dry_run,
        })
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.into(),
            message: format!("expected a boolean, got '{other}'"),
        }),
    }
}
