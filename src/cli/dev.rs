//! Development server command implementation

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::compose::Environment;
use crate::emit;
use crate::runner::Invocation;
use crate::utils::display_path;

/// Start the development server with hot module replacement
#[derive(Args, Debug)]
pub struct DevCommand {
    /// Port to run the dev server on (overrides [dev] port)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides [dev] host)
    #[arg(long)]
    pub host: Option<String>,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,

    /// Write the bundler config and print the command without running it
    #[arg(long)]
    pub dry_run: bool,
}

impl DevCommand {
    pub async fn execute(&self, config_path: &str) -> Result<()> {
        let (mut config, composed) = super::load_composed(config_path, Environment::Develop)?;

        if let Some(port) = self.port {
            config.dev.port = port;
        }
        if let Some(host) = &self.host {
            config.dev.host = host.clone();
        }
        config.dev.open |= self.open;

        let url = config.dev.url()?;

        let emitted = emit::write(&composed, Environment::Develop, &config)?;
        eprintln!(
            "{} {} {}",
            "→".blue(),
            display_path(&config.root, &emitted.path).cyan(),
            if emitted.written { "written" } else { "unchanged" }.dimmed()
        );

        let invocation = Invocation::new(&config, Environment::Develop, &emitted.path);

        if self.dry_run {
            eprintln!("  {} {}\n", "•".dimmed(), invocation.command_line());
            return Ok(());
        }

        eprintln!(
            "{} Starting dev server at {}\n",
            "→".blue(),
            url.as_str().cyan().underline()
        );
        eprintln!(
            "  {} Hot Module Replacement {}",
            "•".dimmed(),
            "enabled".green()
        );
        eprintln!(
            "  {} Press {} to stop\n",
            "•".dimmed(),
            "Ctrl+C".yellow()
        );

        invocation.run_checked().await
    }
}
