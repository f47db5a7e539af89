//! Bundler config emission
//!
//! Renders a composed configuration as the CommonJS module the external
//! bundler loads with `--config`.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::compose::Environment;
use crate::config::{Config, Configuration};
use crate::utils::{clean_path, hash_content, path_to_module_id};

/// A config module written (or found up to date) on disk
#[derive(Debug, Clone)]
pub struct Emitted {
    /// Location of the config module
    pub path: PathBuf,

    /// Content hash of the module
    pub hash: String,

    /// False when the file already had this content
    pub written: bool,
}

/// Render `config` as a bundler config module with paths resolved against `root`
pub fn render(config: &Configuration, env: Environment, root: &Path) -> Result<String> {
    let mut out = String::new();

    writeln!(out, "// Generated by packrig for the {} environment. Do not edit.", env)?;
    writeln!(out, "var webpack = require('webpack');")?;
    writeln!(out)?;
    writeln!(out, "module.exports = {{")?;

    writeln!(out, "  entry: {},", json(&config.entry_points)?)?;

    writeln!(out, "  output: {{")?;
    writeln!(out, "    path: {},", json(&absolute(root, &config.output_path))?)?;
    writeln!(out, "    filename: {}", json(&config.output_filename)?)?;
    writeln!(out, "  }},")?;

    writeln!(out, "  module: {{")?;
    writeln!(out, "    loaders: [")?;
    for (i, rule) in config.loader_rules.iter().enumerate() {
        let include: Vec<String> = rule.include.iter().map(|dir| absolute(root, dir)).collect();

        writeln!(out, "      {{")?;
        writeln!(out, "        test: new RegExp({}),", json(&rule.test)?)?;
        if include.is_empty() {
            writeln!(out, "        loaders: {}", json(&rule.loaders)?)?;
        } else {
            writeln!(out, "        loaders: {},", json(&rule.loaders)?)?;
            writeln!(out, "        include: {}", json(&include)?)?;
        }
        writeln!(out, "      }}{}", separator(i, config.loader_rules.len()))?;
    }
    writeln!(out, "    ]")?;
    writeln!(out, "  }},")?;

    writeln!(out, "  resolve: {{")?;
    writeln!(out, "    extensions: {}", json(&config.resolve_extensions)?)?;
    writeln!(out, "  }},")?;

    writeln!(out, "  plugins: [")?;
    for (i, plugin) in config.plugins.iter().enumerate() {
        let options = match &plugin.options {
            Some(options) => json(options)?,
            None => String::new(),
        };
        writeln!(
            out,
            "    new webpack.{}({}){}",
            plugin.name,
            options,
            separator(i, config.plugins.len())
        )?;
    }
    writeln!(out, "  ]")?;

    writeln!(out, "}};")?;

    Ok(out)
}

/// Write the config module for `env` into the project's config directory
pub fn write(config: &Configuration, env: Environment, project: &Config) -> Result<Emitted> {
    let content = render(config, env, &project.root)?;
    let hash = hash_content(content.as_bytes());

    let dir = project.config_dir();
    let path = dir.join(format!("webpack.{}.config.js", env));

    let unchanged = fs::read(&path)
        .map(|existing| hash_content(&existing) == hash)
        .unwrap_or(false);

    if unchanged {
        debug!("{} is up to date ({})", path.display(), hash);
        return Ok(Emitted {
            path,
            hash,
            written: false,
        });
    }

    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
    fs::write(&path, &content)
        .with_context(|| format!("Failed to write bundler config: {}", path.display()))?;

    debug!("Wrote {} ({})", path.display(), hash);

    Ok(Emitted {
        path,
        hash,
        written: true,
    })
}

fn json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).context("Failed to serialize config value")
}

/// Absolute, `..`-free form of `path`; the bundler compares include paths by prefix
fn absolute(root: &Path, path: &Path) -> String {
    clean_path(&path_to_module_id(&root.join(path)))
}

fn separator(index: usize, len: usize) -> &'static str {
    if index + 1 < len {
        ","
    } else {
        ""
    }
}
