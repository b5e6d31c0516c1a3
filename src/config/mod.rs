//! Configuration loading and management.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    value::magic::RelativePathBuf,
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::assessment::Thresholds;
use crate::core::{Error, Principle, PrincipleSet, Profile, Result};
use crate::score::RuleTable;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Principle preset.
    pub profile: Profile,
    /// Explicit principle list; overrides `profile` when non-empty.
    pub principles: Vec<Principle>,
    /// Recommendation thresholds.
    pub thresholds: Thresholds,
    /// Score gating.
    pub score: ScoreConfig,
    /// TOML rule table replacing the built-in one. A relative path is
    /// resolved against the directory of the file that set it.
    pub rules_file: Option<RelativePathBuf>,
    /// Advice overrides keyed by principle identifier.
    pub advice: BTreeMap<String, String>,
    /// Output configuration.
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from an explicit file path.
    ///
    /// Errors if the file does not exist. Use this for explicit `--config` flags.
    /// Env vars with `TESTABILITY_` prefix override file values.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file_exact(path))
            .merge(Env::prefixed("TESTABILITY_").split("__"))
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;
        Ok(config)
    }

    /// Load configuration from directory, looking for testability.toml or
    /// .testability/testability.toml.
    ///
    /// Missing files are silently skipped (defaults are used).
    pub fn load_default(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(dir.join("testability.toml")))
            .merge(Toml::file(dir.join(".testability/testability.toml")))
            .merge(Env::prefixed("TESTABILITY_").split("__"))
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;
        Ok(config)
    }

    /// Default config file content.
    pub fn default_toml() -> &'static str {
        include_str!("default_config.toml")
    }

    /// Principles required for a run.
    pub fn principle_set(&self) -> Result<PrincipleSet> {
        if self.principles.is_empty() {
            return Ok(PrincipleSet::from_profile(self.profile));
        }
        PrincipleSet::new(self.principles.iter().copied())
            .ok_or_else(|| Error::config("principle list must not be empty"))
    }

    /// Rule table from `rules_file`, or the built-in table.
    pub fn rule_table(&self) -> Result<RuleTable> {
        match &self.rules_file {
            Some(path) => RuleTable::from_path(path.relative()).map_err(|e| match e {
                Error::FileNotFound { path } => {
                    Error::Config(format!("rules file not found: {}", path.display()))
                }
                other => other,
            }),
            None => Ok(RuleTable::default()),
        }
    }

    /// Replace the rule table path; relative paths resolve against the
    /// working directory.
    pub fn set_rules_file(&mut self, path: impl AsRef<Path>) {
        self.rules_file = Some(RelativePathBuf::from(path.as_ref()));
    }

    /// Parsed advice overrides.
    pub fn advice_overrides(&self) -> Result<HashMap<Principle, String>> {
        self.advice
            .iter()
            .map(|(key, text)| {
                key.parse::<Principle>()
                    .map(|p| (p, text.clone()))
                    .map_err(|e| Error::Config(format!("advice: {e}")))
            })
            .collect()
    }
}

/// Score configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    /// Minimum overall score to pass.
    pub fail_under: Option<u32>,
}

/// Output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format.
    pub format: OutputFormat,
    /// Include per-rule detail.
    pub breakdown: bool,
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON format.
    Json,
    /// Markdown format.
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(format!(
                "unknown output format '{other}' (expected text, json or markdown)"
            )),
        }
    }
}
