//! External bundler invocation
//!
//! Hands an emitted config to the bundler (for `build`) or its dev server
//! (for `develop`). Compilation output and errors belong to the child
//! process; only its exit status comes back.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::{debug, info};

use crate::compose::Environment;
use crate::config::Config;

/// A fully resolved bundler command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl Invocation {
    /// Build the command line for `env` using the emitted config at `config_file`
    pub fn new(project: &Config, env: Environment, config_file: &Path) -> Self {
        let program = match env {
            Environment::Build => project.bundler.build.clone(),
            Environment::Develop => project.bundler.develop.clone(),
        };

        let mut args = vec!["--config".to_string(), config_file.display().to_string()];

        if env == Environment::Develop {
            args.extend([
                "--hot".to_string(),
                "--inline".to_string(),
                "--host".to_string(),
                project.dev.host.clone(),
                "--port".to_string(),
                project.dev.port.to_string(),
            ]);
            if project.dev.open {
                args.push("--open".to_string());
            }
        }

        args.extend(project.bundler.args.iter().cloned());

        Self {
            program,
            args,
            cwd: project.root.clone(),
        }
    }

    /// Shell-style rendering, for display
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the program to completion, inheriting stdio
    pub async fn run(&self) -> Result<ExitStatus> {
        info!("Running {}", self.command_line());

        let status = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.cwd)
            .kill_on_drop(true)
            .status()
            .await
            .with_context(|| format!("Failed to start '{}'", self.program))?;

        debug!("{} exited with {}", self.program, status);

        Ok(status)
    }

    /// Run the program and fail unless it exits successfully
    pub async fn run_checked(&self) -> Result<()> {
        let status = self.run().await?;
        if !status.success() {
            anyhow::bail!("'{}' failed with {}", self.program, status);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn project() -> Config {
        let mut config = Config::default_config("todo");
        config.root = PathBuf::from("/srv/todo");
        config
    }

    #[test]
    fn test_build_invocation() {
        let mut project = project();
        project.bundler.args = vec!["--bail".to_string()];

        let invocation = Invocation::new(
            &project,
            Environment::Build,
            Path::new("/srv/todo/.packrig/webpack.build.config.js"),
        );

        assert_eq!(invocation.program, "webpack");
        assert_eq!(
            invocation.command_line(),
            "webpack --config /srv/todo/.packrig/webpack.build.config.js --bail"
        );
        assert_eq!(invocation.cwd, PathBuf::from("/srv/todo"));
    }

    #[test]
    fn test_develop_invocation() {
        let mut project = project();
        project.dev.host = "0.0.0.0".to_string();
        project.dev.open = true;

        let invocation = Invocation::new(&project, Environment::Develop, Path::new("dev.js"));

        assert_eq!(
            invocation.command_line(),
            "webpack-dev-server --config dev.js --hot --inline --host 0.0.0.0 --port 8080 --open"
        );
    }

    #[tokio::test]
    async fn test_missing_program_is_an_error() {
        let mut project = project();
        project.root = std::env::temp_dir();
        project.bundler.build = "packrig-no-such-bundler".to_string();

        let invocation = Invocation::new(&project, Environment::Build, Path::new("x.js"));
        let err = invocation.run_checked().await.unwrap_err();
        assert!(err.to_string().contains("packrig-no-such-bundler"));
    }
}
