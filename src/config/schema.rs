//! Configuration schema definitions

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::utils::{clean_path, path_to_module_id};

/// Project metadata configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    pub name: String,

    /// Project version
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

/// Bundler configuration shared by every environment.
///
/// This is the value the composer derives `build` and `develop` variants
/// from. It is never modified in place once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Entry modules, in bundling order
    #[serde(rename = "entry")]
    pub entry_points: Vec<String>,

    /// Directory the bundle is written to
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Bundle file name
    #[serde(default = "default_output_filename")]
    pub output_filename: String,

    /// Loader rules, in declaration order
    #[serde(default, rename = "loaders")]
    pub loader_rules: Vec<LoaderRule>,

    /// Suffixes tried when an import omits its extension
    #[serde(default = "default_resolve_extensions")]
    pub resolve_extensions: Vec<String>,

    /// Bundler plugins, in registration order
    #[serde(default)]
    pub plugins: Vec<PluginRef>,
}

impl Configuration {
    /// Create a configuration with the given entries and default output settings
    pub fn new<I, S>(entry_points: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entry_points: entry_points.into_iter().map(Into::into).collect(),
            output_path: default_output_path(),
            output_filename: default_output_filename(),
            loader_rules: Vec::new(),
            resolve_extensions: default_resolve_extensions(),
            plugins: Vec::new(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("build")
}

fn default_output_filename() -> String {
    "bundle.js".to_string()
}

fn default_resolve_extensions() -> Vec<String> {
    vec![String::new(), ".js".to_string()]
}

/// Maps files matching a pattern to a chain of loaders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderRule {
    /// Regular expression matched against file paths
    pub test: String,

    /// Loader identifiers; the bundler applies them last to first
    pub loaders: Vec<String>,

    /// Directories the rule is restricted to (empty means everywhere)
    #[serde(default)]
    pub include: BTreeSet<PathBuf>,
}

impl LoaderRule {
    pub fn new<S: Into<String>>(test: impl Into<String>, loaders: impl IntoIterator<Item = S>) -> Self {
        Self {
            test: test.into(),
            loaders: loaders.into_iter().map(Into::into).collect(),
            include: BTreeSet::new(),
        }
    }

    pub fn with_include<P: Into<PathBuf>>(mut self, include: impl IntoIterator<Item = P>) -> Self {
        self.include = include.into_iter().map(Into::into).collect();
        self
    }

    /// Whether both rules may apply to the same directory
    pub fn include_overlaps(&self, other: &LoaderRule) -> bool {
        let ours = cleaned_include(&self.include);
        let theirs = cleaned_include(&other.include);

        // `.` covers the whole project, like an empty include
        if ours.is_empty() || theirs.is_empty() {
            return true;
        }
        ours.iter().any(|a| {
            theirs
                .iter()
                .any(|b| a.starts_with(b) || b.starts_with(a))
        })
    }
}

/// Normalized include paths; empty when any of them is the project root
fn cleaned_include(include: &BTreeSet<PathBuf>) -> Vec<PathBuf> {
    let cleaned: Vec<PathBuf> = include
        .iter()
        .map(|dir| PathBuf::from(clean_path(&path_to_module_id(dir))))
        .collect();

    if cleaned.iter().any(|dir| dir.as_os_str().is_empty()) {
        Vec::new()
    } else {
        cleaned
    }
}

/// Reference to a bundler plugin by constructor name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginRef {
    /// Plugin constructor name
    pub name: String,

    /// Options passed to the constructor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<toml::Table>,
}

pub const HOT_MODULE_REPLACEMENT_PLUGIN: &str = "HotModuleReplacementPlugin";
pub const NO_ERRORS_PLUGIN: &str = "NoErrorsPlugin";

impl PluginRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: None,
        }
    }

    /// Hot module replacement support in the running bundle
    pub fn hot_module_replacement() -> Self {
        Self::named(HOT_MODULE_REPLACEMENT_PLUGIN)
    }

    /// Skip emitting (and reloading) when compilation has errors
    pub fn no_errors() -> Self {
        Self::named(NO_ERRORS_PLUGIN)
    }
}

/// Loader and entry identifiers the composer appends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformSettings {
    /// JSX/ES6 transform loader
    #[serde(default = "default_transform_loader")]
    pub loader: String,

    /// Loader prepended to the transform chain in development
    #[serde(default = "default_hot_loader")]
    pub hot_loader: String,

    /// Hot reload bootstrap module added to the development entries
    #[serde(default = "default_hot_entry")]
    pub hot_entry: String,

    /// Extensions made resolvable for JSX sources
    #[serde(default = "default_jsx_extensions")]
    pub extensions: Vec<String>,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            loader: default_transform_loader(),
            hot_loader: default_hot_loader(),
            hot_entry: default_hot_entry(),
            extensions: default_jsx_extensions(),
        }
    }
}

fn default_transform_loader() -> String {
    "babel".to_string()
}

fn default_hot_loader() -> String {
    "react-hot".to_string()
}

fn default_hot_entry() -> String {
    "webpack/hot/only-dev-server".to_string()
}

fn default_jsx_extensions() -> Vec<String> {
    vec![".jsx".to_string()]
}

/// Development server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevConfig {
    /// Port to run dev server on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Open browser automatically
    #[serde(default)]
    pub open: bool,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            open: false,
        }
    }
}

impl DevConfig {
    /// Address the dev server is reachable at
    pub fn url(&self) -> Result<Url> {
        Url::parse(&format!("http://{}:{}/", self.host, self.port))
            .with_context(|| format!("Invalid dev server address {}:{}", self.host, self.port))
    }
}

fn default_port() -> u16 {
    8080
}

fn default_host() -> String {
    "localhost".to_string()
}

/// External tools the derived configurations are handed to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundlerConfig {
    /// Program run for `build`
    #[serde(default = "default_build_program")]
    pub build: String,

    /// Program run for `develop`
    #[serde(default = "default_develop_program")]
    pub develop: String,

    /// Extra arguments passed to either program
    #[serde(default)]
    pub args: Vec<String>,

    /// Directory (relative to the project root) emitted configs are written to
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,
}

impl Default for BundlerConfig {
    fn default() -> Self {
        Self {
            build: default_build_program(),
            develop: default_develop_program(),
            args: Vec::new(),
            config_dir: default_config_dir(),
        }
    }
}

fn default_build_program() -> String {
    "webpack".to_string()
}

fn default_develop_program() -> String {
    "webpack-dev-server".to_string()
}

fn default_config_dir() -> PathBuf {
    PathBuf::from(".packrig")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_overlap() {
        let app = LoaderRule::new(r"\.css$", ["css"]).with_include(["app"]);
        let nested = LoaderRule::new(r"\.css$", ["css"]).with_include(["app/styles"]);
        let vendor = LoaderRule::new(r"\.css$", ["css"]).with_include(["vendor"]);
        let anywhere = LoaderRule::new(r"\.css$", ["css"]);

        assert!(app.include_overlaps(&nested));
        assert!(!app.include_overlaps(&vendor));
        assert!(anywhere.include_overlaps(&vendor));
    }

    #[test]
    fn test_include_overlap_normalizes_paths() {
        let app = LoaderRule::new(r"\.jsx?$", ["babel"]).with_include(["app"]);
        let dotted = LoaderRule::new(r"\.jsx?$", ["babel"]).with_include(["./app"]);
        let root = LoaderRule::new(r"\.jsx?$", ["babel"]).with_include(["."]);
        let sibling = LoaderRule::new(r"\.jsx?$", ["babel"]).with_include(["../shared"]);
        let routed = LoaderRule::new(r"\.jsx?$", ["babel"]).with_include(["app/../../shared"]);

        assert!(app.include_overlaps(&dotted));
        assert!(root.include_overlaps(&app));
        assert!(app.include_overlaps(&root));
        assert!(sibling.include_overlaps(&routed));
        assert!(!sibling.include_overlaps(&app));
    }

    #[test]
    fn test_dev_url() {
        let dev = DevConfig::default();
        assert_eq!(dev.url().unwrap().as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_bundle_table_defaults() {
        let config: Configuration = toml::from_str(r#"entry = ["app/main"]"#).unwrap();
        assert_eq!(config.entry_points, vec!["app/main"]);
        assert_eq!(config.output_filename, "bundle.js");
        assert_eq!(config.resolve_extensions, vec!["", ".js"]);
        assert!(config.loader_rules.is_empty());
    }
}
