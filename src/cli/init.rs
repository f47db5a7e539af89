//! Project initialization command

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

/// Initialize a new project
#[derive(Args, Debug)]
pub struct InitCommand {
    /// Project name / directory
    #[arg(default_value = ".")]
    pub name: String,

    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    pub fn execute(&self) -> Result<()> {
        let project_dir = Path::new(&self.name);

        eprintln!("{} Initializing new project...\n", "→".blue());

        if self.name != "." {
            fs::create_dir_all(project_dir).context("Failed to create project directory")?;
        }

        if !self.force && project_dir.join("packrig.toml").exists() {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                project_dir.join("packrig.toml").display()
            );
        }

        fs::create_dir_all(project_dir.join("app")).context("Failed to create app directory")?;

        let files = [
            ("packrig.toml", self.generate_config()),
            ("app/main.jsx", MAIN_JSX.to_string()),
            ("app/App.jsx", APP_JSX.to_string()),
            ("index.html", INDEX_HTML.to_string()),
            ("package.json", self.generate_package_json()),
        ];

        for (file, content) in files {
            fs::write(project_dir.join(file), content)
                .with_context(|| format!("Failed to write {}", file))?;
            eprintln!("  {} Created {}", "✓".green(), file.cyan());
        }

        eprintln!("\n{} Project initialized successfully!\n", "✓".green().bold());

        eprintln!("  Next steps:");
        if self.name != "." {
            eprintln!("    {} cd {}", "→".dimmed(), self.name.cyan());
        }
        eprintln!("    {} npm install", "→".dimmed());
        eprintln!("    {} packrig dev", "→".dimmed());
        eprintln!();

        Ok(())
    }

    fn project_name(&self) -> &str {
        if self.name == "." {
            "my-app"
        } else {
            &self.name
        }
    }

    fn generate_config(&self) -> String {
        format!(
            r#"# packrig configuration

[project]
name = "{name}"
version = "0.1.0"

[bundle]
entry = ["app/main"]
output_path = "build"
output_filename = "bundle.js"
resolve_extensions = ["", ".js"]

[[bundle.loaders]]
test = "\\.css$"
loaders = ["style", "css"]
include = ["app"]

[dev]
port = 8080
"#,
            name = self.project_name(),
        )
    }

    fn generate_package_json(&self) -> String {
        format!(
            r#"{{
  "name": "{}",
  "private": true,
  "version": "0.1.0",
  "scripts": {{
    "build": "packrig build",
    "dev": "packrig dev"
  }},
  "dependencies": {{
    "react": "^0.13.0"
  }},
  "devDependencies": {{
    "babel-loader": "^5.0.0",
    "css-loader": "^0.12.0",
    "react-hot-loader": "^1.2.0",
    "style-loader": "^0.12.0",
    "webpack": "^1.9.0",
    "webpack-dev-server": "^1.8.0"
  }}
}}
"#,
            self.project_name()
        )
    }
}

const MAIN_JSX: &str = r#"import React from 'react';
import App from './App';

React.render(<App />, document.getElementById('app'));
"#;

const APP_JSX: &str = r#"import React from 'react';

export default class App extends React.Component {
  render() {
    return <h1>Hello from packrig</h1>;
  }
}
"#;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="UTF-8" />
  </head>
  <body>
    <div id="app"></div>
    <script src="build/bundle.js"></script>
  </body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    #[test]
    fn test_generated_config_loads() {
        let dir = TempDir::new().unwrap();
        let cmd = InitCommand {
            name: dir.path().join("todo").display().to_string(),
            force: false,
        };
        cmd.execute().unwrap();

        let config = Config::load(dir.path().join("todo/packrig.toml")).unwrap();
        assert!(config.entry_exists("app/main"));
        assert_eq!(config.bundle.loader_rules[0].test, r"\.css$");

        let err = cmd.execute().unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
