//! Inspect command implementation

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::info;

use crate::compose::ConfigComposer;
use crate::config::Config;
use crate::rules::RuleSet;
use crate::utils::display_path;

/// Print the configuration composed for an environment
#[derive(Args, Debug)]
pub struct InspectCommand {
    /// Environment to compose (build, develop or dev)
    #[arg(default_value = "build")]
    pub env: String,

    /// Report source files claimed by more than one loader rule
    #[arg(long)]
    pub check: bool,
}

impl InspectCommand {
    pub fn execute(&self, config_path: &str) -> Result<()> {
        info!("Loading configuration from {}", config_path);
        let config = Config::load(config_path)?;

        let composed = ConfigComposer::new(config.transform.clone())
            .compose_tagged(&config.bundle, &self.env)?;

        let json = serde_json::to_string_pretty(&composed)
            .context("Failed to serialize composed configuration")?;
        println!("{}", json);

        if !self.check {
            return Ok(());
        }

        let ambiguities = RuleSet::compile(&composed, &config.root)?.scan()?;
        if ambiguities.is_empty() {
            eprintln!("\n{} No file is claimed by more than one loader rule\n", "✓".green().bold());
            return Ok(());
        }

        eprintln!();
        for ambiguity in &ambiguities {
            let rules = ambiguity
                .rules
                .iter()
                .map(|i| format!("loader_rules[{}] {}", i, composed.loader_rules[*i].test))
                .collect::<Vec<_>>()
                .join(", ");
            eprintln!(
                "  {} {} {}",
                "✗".red(),
                display_path(&config.root, &ambiguity.path).cyan(),
                rules.dimmed()
            );
        }
        eprintln!();

        anyhow::bail!(
            "{} file(s) match more than one loader rule",
            ambiguities.len()
        )
    }
}
