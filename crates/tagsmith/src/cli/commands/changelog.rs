//! Changelog command

use std::time::Instant;

use clap::Args;
use tracing::info;

use crate::cli::output::{self, path_style};
use crate::cli::{Cli, OutputFormat, RepoContext};

/// Generate a package changelog and merge it with the file on disk
#[derive(Debug, Args)]
pub struct ChangelogCommand {
    /// Package name (optional in single-package repositories)
    #[arg(short, long)]
    pub package: Option<String>,

    /// Start of the commit range (defaults to the package's newest tag)
    #[arg(long)]
    pub from: Option<String>,

    /// End of the commit range
    #[arg(long, default_value = "HEAD")]
    pub to: String,

    /// Template to render with (default, compact)
    #[arg(short, long)]
    pub template: Option<String>,

    /// Write the merged changelog to the package's changelog file
    #[arg(short, long)]
    pub write: bool,

    /// Print what would be written without touching the file
    #[arg(long)]
    pub dry_run: bool,
}

impl ChangelogCommand {
    /// Execute the changelog command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(package = ?self.package, template = ?self.template, write = self.write, "executing changelog command");
        let start = Instant::now();
        let ctx = RepoContext::load(cli)?;
        let package = ctx.package_or_single(self.package.as_deref())?;
        let template = ctx.template(self.template.as_deref())?;

        let mut changelog = ctx.changelog_for(&package, template);
        let version = changelog.set_range(self.from.as_deref(), &self.to)?.clone();
        let commit_count = changelog.commit_count()?;

        let path = ctx.changelog_path(&package);
        let write = self.write && !self.dry_run;
        let content = if write {
            changelog.write_merged(&path)?
        } else {
            changelog.merge_with_file(&path)?
        };

        info!(
            package = %package.name,
            commit_count,
            written = write,
            duration_ms = start.elapsed().as_millis() as u64,
            "changelog generated"
        );

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "package": package.name,
                    "path": path,
                    "written": write,
                    "commit_count": commit_count,
                    "version": version,
                    "content": content,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if !write {
                    print!("{}", content);
                } else if !cli.quiet {
                    output::success(&format!(
                        "Wrote changelog for {} to {}",
                        package.name,
                        path_style().apply_to(path.display())
                    ));
                }
            }
        }

        Ok(())
    }
}
