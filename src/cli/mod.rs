//! Command-line interface for packrig
//!
//! Provides the main CLI structure using clap with subcommands for:
//! - `build`: Production bundle through the external bundler
//! - `dev`: Development server with hot module replacement
//! - `inspect`: Print a composed configuration
//! - `init`: Project scaffolding

mod build;
mod dev;
mod init;
mod inspect;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use crate::compose::{ConfigComposer, Environment};
use crate::config::{Config, Configuration};

pub use build::BuildCommand;
pub use dev::DevCommand;
pub use init::InitCommand;
pub use inspect::InspectCommand;

/// packrig - compose bundler configurations for JSX component apps
#[derive(Parser, Debug)]
#[command(name = "packrig")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to packrig.toml config file
    #[arg(short, long, global = true, default_value = "packrig.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bundle the project for production
    Build(BuildCommand),

    /// Start the development server with hot module replacement
    #[command(alias = "develop")]
    Dev(DevCommand),

    /// Print the configuration composed for an environment
    Inspect(InspectCommand),

    /// Initialize a new project
    Init(InitCommand),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        print_banner();

        match &self.command {
            Commands::Build(cmd) => cmd.execute(&self.config).await,
            Commands::Dev(cmd) => cmd.execute(&self.config).await,
            Commands::Inspect(cmd) => cmd.execute(&self.config),
            Commands::Init(cmd) => cmd.execute(),
        }
    }
}

/// Load the project file and compose its base for `env`
fn load_composed(config_path: &str, env: Environment) -> Result<(Config, Configuration)> {
    info!("Loading configuration from {}", config_path);
    let config = Config::load(config_path)?;

    let composed = ConfigComposer::new(config.transform.clone()).compose(&config.bundle, env)?;

    Ok((config, composed))
}

/// Print the packrig banner
fn print_banner() {
    eprintln!(
        "\n{} {} {}\n",
        "⚙".cyan(),
        "packrig".bold().cyan(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
