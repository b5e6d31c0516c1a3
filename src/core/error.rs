//! Error types for the testability library.

use std::path::PathBuf;

use thiserror::Error;

use super::Principle;

/// Result type alias using testability's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or running an assessment.
///
/// Missing observations are never errors: the affected sub-metric falls back
/// to its worst-case value. Everything in the configuration class
/// (see [`Error::is_configuration`]) indicates a setup bug and is surfaced.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required principle has no score in the aggregated map.
    #[error("Configuration error: no score for required principle '{principle}'")]
    MissingPrinciple { principle: Principle },

    /// A configured principle has no advice text.
    #[error("Configuration error: no advice configured for principle '{principle}'")]
    MissingAdvice { principle: Principle },

    /// A rule in the rule table is malformed.
    #[error("Configuration error: invalid rule '{rule}' for {principle}: {message}")]
    InvalidRule {
        principle: Principle,
        rule: String,
        message: String,
    },

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Threshold violation (for CI/CD integration).
    #[error("Threshold violation: {message}")]
    ThresholdViolation { message: String, score: u32 },
}

impl Error {
    /// Create a new config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new invalid rule error.
    pub fn invalid_rule(
        principle: Principle,
        rule: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidRule {
            principle,
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Create a threshold violation error.
    pub fn threshold_violation(message: impl Into<String>, score: u32) -> Self {
        Self::ThresholdViolation {
            message: message.into(),
            score,
        }
    }

    /// Whether this error signals a setup bug rather than bad runtime data.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::MissingPrinciple { .. }
                | Self::MissingAdvice { .. }
                | Self::InvalidRule { .. }
        )
    }
}
