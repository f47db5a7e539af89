//! Loader rule matching
//!
//! Compiles the loader rules of a composed configuration so files can be
//! checked against them. The bundler gives no precedence guarantee when two
//! rules claim the same file, so `scan` reports such files.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::config::Configuration;
use crate::error::ConfigurationError;
use crate::utils::path_to_module_id;

/// Directory names never scanned
const IGNORED_DIRS: &[&str] = &["node_modules", ".*"];

/// A loader rule with its pattern compiled and include paths made absolute
#[derive(Debug)]
struct CompiledRule {
    pattern: Regex,
    include: Vec<PathBuf>,
}

impl CompiledRule {
    fn applies_to(&self, path: &Path) -> bool {
        let in_scope = self.include.is_empty() || self.include.iter().any(|dir| path.starts_with(dir));
        in_scope && self.pattern.is_match(&path_to_module_id(path))
    }
}

/// A file claimed by more than one loader rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguity {
    pub path: PathBuf,
    /// Indices into `loader_rules`
    pub rules: Vec<usize>,
}

/// Compiled loader rules of one configuration
#[derive(Debug)]
pub struct RuleSet {
    root: PathBuf,
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// Compile the rules of `config`, resolving include paths against `root`
    pub fn compile(config: &Configuration, root: &Path) -> Result<Self, ConfigurationError> {
        let rules = config
            .loader_rules
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                let pattern = Regex::new(&rule.test).map_err(|source| {
                    ConfigurationError::InvalidPattern {
                        index,
                        pattern: rule.test.clone(),
                        source,
                    }
                })?;
                Ok(CompiledRule {
                    pattern,
                    include: rule.include.iter().map(|dir| root.join(dir)).collect(),
                })
            })
            .collect::<Result<Vec<_>, ConfigurationError>>()?;

        Ok(Self {
            root: root.to_path_buf(),
            rules,
        })
    }

    /// Indices of the rules applying to `path`
    pub fn matching(&self, path: &Path) -> Vec<usize> {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };

        self.rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.applies_to(&path))
            .map(|(index, _)| index)
            .collect()
    }

    /// Walk the directories the rules cover and report ambiguous files
    pub fn scan(&self) -> Result<Vec<Ambiguity>> {
        let ignored = &ignored_dirs()?;

        let files: BTreeSet<PathBuf> = self
            .scan_roots()
            .into_iter()
            .filter(|dir| dir.is_dir())
            .flat_map(move |dir| {
                WalkDir::new(dir)
                    .into_iter()
                    .filter_entry(move |entry| !is_ignored(entry, ignored))
                    .filter_map(|entry| entry.ok())
                    .filter(|entry| entry.file_type().is_file())
                    .map(DirEntry::into_path)
            })
            .collect();

        debug!("Scanned {} files against {} rules", files.len(), self.rules.len());

        Ok(files
            .into_iter()
            .filter_map(|path| {
                let rules = self.matching(&path);
                (rules.len() > 1).then_some(Ambiguity { path, rules })
            })
            .collect())
    }

    fn scan_roots(&self) -> BTreeSet<PathBuf> {
        if self.rules.iter().any(|rule| rule.include.is_empty()) {
            return BTreeSet::from([self.root.clone()]);
        }
        self.rules
            .iter()
            .flat_map(|rule| rule.include.iter().cloned())
            .collect()
    }
}

fn ignored_dirs() -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in IGNORED_DIRS {
        builder.add(Glob::new(pattern).with_context(|| format!("Invalid glob: {}", pattern))?);
    }
    builder.build().context("Failed to build ignore set")
}

fn is_ignored(entry: &DirEntry, ignored: &GlobSet) -> bool {
    entry.depth() > 0 && entry.file_type().is_dir() && ignored.is_match(entry.file_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoaderRule;
    use std::fs;
    use tempfile::TempDir;

    fn config_with(rules: Vec<LoaderRule>) -> Configuration {
        let mut config = Configuration::new(["app/main"]);
        config.loader_rules = rules;
        config
    }

    #[test]
    fn test_matching_respects_include() {
        let config = config_with(vec![
            LoaderRule::new(r"\.jsx?$", ["babel"]).with_include(["app"]),
            LoaderRule::new(r"\.css$", ["style", "css"]),
        ]);
        let rules = RuleSet::compile(&config, Path::new("/project")).unwrap();

        assert_eq!(rules.matching(Path::new("app/main.jsx")), vec![0]);
        assert!(rules.matching(Path::new("vendor/lib.js")).is_empty());
        assert_eq!(rules.matching(Path::new("vendor/theme.css")), vec![1]);
    }

    #[test]
    fn test_compile_reports_bad_pattern() {
        let config = config_with(vec![LoaderRule::new("*.js", ["babel"])]);
        let err = RuleSet::compile(&config, Path::new("/project")).unwrap_err();
        assert_eq!(err.field(), "loader_rules[0].test");
    }

    #[test]
    fn test_scan_reports_overlapping_rules() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("app/node_modules/dep")).unwrap();
        fs::write(dir.path().join("app/main.jsx"), "").unwrap();
        fs::write(dir.path().join("app/util.js"), "").unwrap();
        fs::write(dir.path().join("app/style.css"), "").unwrap();
        fs::write(dir.path().join("app/node_modules/dep/index.js"), "").unwrap();

        let config = config_with(vec![
            LoaderRule::new(r"\.jsx?$", ["babel"]).with_include(["app"]),
            LoaderRule::new(r"\.js$", ["eslint"]).with_include(["app"]),
            LoaderRule::new(r"\.css$", ["css"]).with_include(["app"]),
        ]);
        let rules = RuleSet::compile(&config, dir.path()).unwrap();

        let ambiguities = rules.scan().unwrap();
        assert_eq!(
            ambiguities,
            vec![Ambiguity {
                path: dir.path().join("app/util.js"),
                rules: vec![0, 1],
            }]
        );
    }
}
