//! Configuration errors
//!
//! Everything that can make composition refuse a base configuration. Failures
//! raised by the external bundler are not represented here; they surface as
//! the bundler's exit status.

use thiserror::Error;

/// A malformed base configuration or an unknown environment tag
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("entry_points must contain at least one entry")]
    EmptyEntryPoints,

    #[error("environment: unrecognized tag '{0}' (expected 'build' or 'develop')")]
    UnknownEnvironment(String),

    #[error("loader_rules[{index}].test: invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        index: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("loader_rules[{index}].test: pattern '{pattern}' uses inline flags, which the bundler's RegExp does not accept")]
    InlineFlags { index: usize, pattern: String },

    #[error("loader_rules[{second}].test: pattern '{pattern}' duplicates loader_rules[{first}] for the same include paths")]
    DuplicatePattern {
        first: usize,
        second: usize,
        pattern: String,
    },

    #[error("plugins[{index}].name: '{name}' is not a valid plugin identifier")]
    InvalidPluginName { index: usize, name: String },
}

impl ConfigurationError {
    /// Name of the configuration field the error points at
    pub fn field(&self) -> String {
        match self {
            Self::EmptyEntryPoints => "entry_points".to_string(),
            Self::UnknownEnvironment(_) => "environment".to_string(),
            Self::InvalidPattern { index, .. } => format!("loader_rules[{}].test", index),
            Self::InlineFlags { index, .. } => format!("loader_rules[{}].test", index),
            Self::DuplicatePattern { second, .. } => format!("loader_rules[{}].test", second),
            Self::InvalidPluginName { index, .. } => format!("plugins[{}].name", index),
        }
    }
}
