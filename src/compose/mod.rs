//! Environment composition
//!
//! Derives the `build` and `develop` bundler configurations from a shared
//! base. Composition is a pure function: the base is cloned, extended and
//! returned, and nothing is read or written along the way.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{Configuration, LoaderRule, PluginRef, TransformSettings};
use crate::error::ConfigurationError;
use crate::utils::clean_path;

/// Pattern of the JSX/ES6 rule appended to every environment
pub const JSX_PATTERN: &str = r"\.jsx?$";

/// Inline flag groups such as `(?i)` or `(?s:...)`, unknown to JavaScript
static INLINE_FLAGS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^\\])\(\?[A-Za-z-]+[:)]").unwrap());

static IDENTIFIER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

/// Target environment of a composed configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production bundle
    Build,
    /// Development server with hot reloading
    Develop,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Build => "build",
            Environment::Develop => "develop",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigurationError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "build" => Ok(Environment::Build),
            "develop" | "dev" => Ok(Environment::Develop),
            other => Err(ConfigurationError::UnknownEnvironment(other.to_string())),
        }
    }
}

/// Builds environment variants from a base configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigComposer {
    settings: TransformSettings,
}

impl ConfigComposer {
    pub fn new(settings: TransformSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &TransformSettings {
        &self.settings
    }

    /// Compose the configuration for a textual environment tag
    pub fn compose_tagged(
        &self,
        base: &Configuration,
        tag: &str,
    ) -> Result<Configuration, ConfigurationError> {
        self.compose(base, tag.parse()?)
    }

    /// Compose the configuration for `env` from `base`
    pub fn compose(
        &self,
        base: &Configuration,
        env: Environment,
    ) -> Result<Configuration, ConfigurationError> {
        self.validate(base)?;

        let mut derived = base.clone();

        let mut loaders = Vec::with_capacity(2);
        if env == Environment::Develop {
            loaders.push(self.settings.hot_loader.clone());
        }
        loaders.push(self.settings.loader.clone());

        derived.loader_rules.push(LoaderRule {
            test: JSX_PATTERN.to_string(),
            loaders,
            include: entry_directories(&base.entry_points),
        });

        for ext in &self.settings.extensions {
            if !derived.resolve_extensions.contains(ext) {
                derived.resolve_extensions.push(ext.clone());
            }
        }

        if env == Environment::Develop {
            derived.entry_points.push(self.settings.hot_entry.clone());
            derived.plugins.push(PluginRef::hot_module_replacement());
            derived.plugins.push(PluginRef::no_errors());
        }

        check_duplicate_patterns(&derived.loader_rules)?;

        debug!(
            "Composed {} configuration: {} entries, {} loader rules, {} plugins",
            env,
            derived.entry_points.len(),
            derived.loader_rules.len(),
            derived.plugins.len()
        );

        Ok(derived)
    }

    /// Check a base configuration without composing it
    pub fn validate(&self, base: &Configuration) -> Result<(), ConfigurationError> {
        if base.entry_points.is_empty() {
            return Err(ConfigurationError::EmptyEntryPoints);
        }

        for (index, rule) in base.loader_rules.iter().enumerate() {
            Regex::new(&rule.test).map_err(|source| ConfigurationError::InvalidPattern {
                index,
                pattern: rule.test.clone(),
                source,
            })?;
            if INLINE_FLAGS_REGEX.is_match(&rule.test) {
                return Err(ConfigurationError::InlineFlags {
                    index,
                    pattern: rule.test.clone(),
                });
            }
        }

        for (index, plugin) in base.plugins.iter().enumerate() {
            if !IDENTIFIER_REGEX.is_match(&plugin.name) {
                return Err(ConfigurationError::InvalidPluginName {
                    index,
                    name: plugin.name.clone(),
                });
            }
        }

        check_duplicate_patterns(&base.loader_rules)
    }
}

/// Directories holding the entry modules
fn entry_directories(entries: &[String]) -> BTreeSet<PathBuf> {
    entries
        .iter()
        .map(|entry| {
            let cleaned = clean_path(entry);
            match cleaned.rsplit_once('/') {
                Some(("", _)) => PathBuf::from("/"),
                Some((dir, _)) => PathBuf::from(dir),
                None => PathBuf::from("."),
            }
        })
        .collect()
}

fn check_duplicate_patterns(rules: &[LoaderRule]) -> Result<(), ConfigurationError> {
    for (second, rule) in rules.iter().enumerate() {
        if let Some(first) = rules[..second]
            .iter()
            .position(|earlier| earlier.test == rule.test && earlier.include_overlaps(rule))
        {
            return Err(ConfigurationError::DuplicatePattern {
                first,
                second,
                pattern: rule.test.clone(),
            });
        }
    }
    Ok(())
}
