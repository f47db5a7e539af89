//! Build command implementation

use std::time::Instant;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::compose::Environment;
use crate::emit;
use crate::runner::Invocation;
use crate::utils::{display_path, format_duration};

/// Bundle the project for production
#[derive(Args, Debug)]
pub struct BuildCommand {
    /// Write the bundler config and print the command without running it
    #[arg(long)]
    pub dry_run: bool,
}

impl BuildCommand {
    pub async fn execute(&self, config_path: &str) -> Result<()> {
        let start = Instant::now();

        let (config, composed) = super::load_composed(config_path, Environment::Build)?;

        let emitted = emit::write(&composed, Environment::Build, &config)?;
        eprintln!(
            "{} {} {}",
            "→".blue(),
            display_path(&config.root, &emitted.path).cyan(),
            if emitted.written { "written" } else { "unchanged" }.dimmed()
        );

        let invocation = Invocation::new(&config, Environment::Build, &emitted.path);

        if self.dry_run {
            eprintln!("  {} {}\n", "•".dimmed(), invocation.command_line());
            return Ok(());
        }

        eprintln!("{} Bundling with {}...\n", "→".blue(), invocation.program.cyan());
        invocation.run_checked().await?;

        eprintln!(
            "\n{} Built {} in {}\n",
            "✓".green().bold(),
            display_path(
                &config.root,
                &config.output_dir().join(&composed.output_filename)
            )
            .cyan(),
            format_duration(start.elapsed())
        );

        Ok(())
    }
}
