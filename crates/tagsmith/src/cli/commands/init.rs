//! Init command

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use tagsmith_core::config::{DEFAULT_CONFIG_TEMPLATE, DEFAULT_CONFIG_TOML};

use crate::cli::output::{self, path_style};
use crate::cli::{Cli, OutputFormat};

/// Write a default tagsmith configuration
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, "executing init command");
        let cwd = std::env::current_dir()?;
        let config_path = self
            .output
            .clone()
            .unwrap_or_else(|| cwd.join(DEFAULT_CONFIG_TOML));

        write_config(&config_path, self.force)?;

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({ "path": config_path });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text if !cli.quiet => {
                output::success(&format!(
                    "Created configuration at {}",
                    path_style().apply_to(config_path.display())
                ));
                println!();
                println!("Next steps:");
                println!("  1. List your packages under [[packages]] or set workspace.globs");
                println!("  2. Run {} to check discovery", style("tagsmith packages").cyan());
                println!("  3. Run {} to preview the next release", style("tagsmith version --all --dry-run").cyan());
            }
            OutputFormat::Text => {}
        }

        Ok(())
    }
}

fn write_config(path: &std::path::Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)?;
    Ok(())
}
