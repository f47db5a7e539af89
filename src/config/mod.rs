//! Configuration handling for packrig
//!
//! Parses and manages packrig.toml project files. The `[bundle]` table is the
//! base bundler configuration every environment is composed from.

mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::compose::ConfigComposer;

pub use schema::*;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Project metadata
    pub project: ProjectConfig,

    /// Base bundler configuration
    pub bundle: Configuration,

    /// Identifiers appended while composing
    #[serde(default)]
    pub transform: TransformSettings,

    /// Development server settings
    #[serde(default)]
    pub dev: DevConfig,

    /// External bundler programs
    #[serde(default)]
    pub bundler: BundlerConfig,

    /// Root directory (computed from config file location)
    #[serde(skip)]
    pub root: PathBuf,
}

impl Config {
    /// Load configuration from a file path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let canonical_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };

        let content = fs::read_to_string(&canonical_path)
            .with_context(|| format!("Failed to read config file: {}", canonical_path.display()))?;

        let mut config = Self::parse(&content)?;

        // Set root directory to the directory containing the config file
        config.root = canonical_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML text, without a root or validation
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse packrig.toml")
    }

    /// Create a default configuration
    pub fn default_config(name: &str) -> Self {
        Self {
            project: ProjectConfig {
                name: name.to_string(),
                version: "0.1.0".to_string(),
            },
            bundle: Configuration::new(["app/main"]),
            transform: TransformSettings::default(),
            dev: DevConfig::default(),
            bundler: BundlerConfig::default(),
            root: PathBuf::from("."),
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        ConfigComposer::new(self.transform.clone()).validate(&self.bundle)?;

        // Missing entries are the bundler's to report; only point them out here
        for entry in &self.bundle.entry_points {
            if !self.entry_exists(entry) {
                warn!(
                    "Entry '{}' does not resolve to a file under {}",
                    entry,
                    self.root.display()
                );
            }
        }

        debug!(
            "Loaded {} entries, {} loader rules",
            self.bundle.entry_points.len(),
            self.bundle.loader_rules.len()
        );

        Ok(())
    }

    /// Whether an entry resolves to a file with any resolve extension
    pub fn entry_exists(&self, entry: &str) -> bool {
        let base = self.root.join(entry);
        self.bundle
            .resolve_extensions
            .iter()
            .chain(self.transform.extensions.iter())
            .any(|ext| {
                let candidate = PathBuf::from(format!("{}{}", base.display(), ext));
                candidate.is_file()
            })
    }

    /// Get the absolute output directory path
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.bundle.output_path)
    }

    /// Get the absolute directory emitted bundler configs go to
    pub fn config_dir(&self) -> PathBuf {
        self.root.join(&self.bundler.config_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PROJECT: &str = r#"
[project]
name = "todo"

[bundle]
entry = ["app/main"]
output_path = "build"

[[bundle.loaders]]
test = "\\.css$"
loaders = ["style", "css"]
include = ["app"]

[dev]
port = 3000
"#;

    #[test]
    fn test_parse_project_file() {
        let config = Config::parse(PROJECT).unwrap();
        assert_eq!(config.project.name, "todo");
        assert_eq!(config.project.version, "0.1.0");
        assert_eq!(config.bundle.loader_rules.len(), 1);
        assert_eq!(config.bundle.loader_rules[0].loaders, vec!["style", "css"]);
        assert_eq!(config.dev.port, 3000);
        assert_eq!(config.dev.host, "localhost");
        assert_eq!(config.transform.loader, "babel");
        assert_eq!(config.bundler.build, "webpack");
    }

    #[test]
    fn test_load_sets_root_and_finds_entries() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("app")).unwrap();
        fs::write(dir.path().join("app/main.jsx"), "").unwrap();
        fs::write(dir.path().join("packrig.toml"), PROJECT).unwrap();

        let config = Config::load(dir.path().join("packrig.toml")).unwrap();
        assert_eq!(config.root, dir.path());
        assert!(config.entry_exists("app/main"));
        assert!(!config.entry_exists("app/missing"));
        assert_eq!(config.output_dir(), dir.path().join("build"));
    }

    #[test]
    fn test_load_rejects_empty_entries() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("packrig.toml"),
            "[project]\nname = \"x\"\n\n[bundle]\nentry = []\n",
        )
        .unwrap();

        let err = Config::load(dir.path().join("packrig.toml")).unwrap_err();
        assert!(err.to_string().contains("entry_points"));
    }

    #[test]
    fn test_load_rejects_bad_pattern() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("packrig.toml"),
            "[project]\nname = \"x\"\n\n[bundle]\nentry = [\"a\"]\n\n[[bundle.loaders]]\ntest = \"(\"\nloaders = [\"x\"]\n",
        )
        .unwrap();

        let err = Config::load(dir.path().join("packrig.toml")).unwrap_err();
        assert!(err.to_string().contains("loader_rules[0].test"));
    }
}
