//! Packages command

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use tagsmith_git::TagPattern;

use crate::cli::output::{self, path_style, tag_style, version_style};
use crate::cli::{Cli, OutputFormat, RepoContext};

/// List the packages of the repository
#[derive(Debug, Args)]
pub struct PackagesCommand {
    /// Also show each package's newest release tag
    #[arg(long)]
    pub tags: bool,
}

#[derive(Debug, Serialize)]
struct PackageRow {
    name: String,
    version: String,
    #[serde(rename = "type")]
    package_type: String,
    path: PathBuf,
    changelog: PathBuf,
    private: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    latest_tag: Option<String>,
}

impl PackagesCommand {
    /// Execute the packages command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(tags = self.tags, "executing packages command");
        let ctx = RepoContext::load(cli)?;
        let packages = ctx.packages()?;
        let tags = if self.tags { ctx.repo.tags()? } else { Vec::new() };

        let rows: Vec<PackageRow> = packages
            .into_iter()
            .map(|package| {
                let latest_tag = if self.tags {
                    TagPattern::new(&ctx.config.versioning.tag_format, &package.name)
                        .latest(tags.clone())
                        .map(|t| t.tag.name)
                } else {
                    None
                };
                let changelog = ctx
                    .changelog_path(&package)
                    .strip_prefix(ctx.root())
                    .map(|p| p.to_path_buf())
                    .unwrap_or_default();

                PackageRow {
                    name: package.name,
                    version: package.version,
                    package_type: package.package_type,
                    path: package.path,
                    changelog,
                    private: package.private,
                    latest_tag,
                }
            })
            .collect();

        match cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
            OutputFormat::Text if cli.quiet => {
                for row in &rows {
                    println!("{}", row.name);
                }
            }
            OutputFormat::Text => {
                if let Some(path) = &ctx.config_path {
                    output::info(&format!("Configuration: {}", path_style().apply_to(path.display())));
                }
                println!("{}", output::header(&format!("{} package(s)", rows.len())));
                for row in &rows {
                    let private = if row.private { " (private)" } else { "" };
                    println!(
                        "  {} {} [{}]{}",
                        style(&row.name).bold(),
                        version_style().apply_to(&row.version),
                        row.package_type,
                        private
                    );
                    let path = if row.path.as_os_str().is_empty() {
                        ".".to_string()
                    } else {
                        row.path.display().to_string()
                    };
                    println!("{}", output::key_value("  path", &path));
                    println!("{}", output::key_value("  changelog", &row.changelog.display().to_string()));
                    if let Some(tag) = &row.latest_tag {
                        println!("{}", output::key_value("  latest tag", &tag_style().apply_to(tag).to_string()));
                    }
                }
            }
        }

        Ok(())
    }
}
