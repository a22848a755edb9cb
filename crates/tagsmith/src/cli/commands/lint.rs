//! Lint command - check a commit message against the commit rules

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use console::style;
use tracing::{debug, info};

use tagsmith_changelog::{CommitParser, CommitRuleEngine, ConventionalParser};
use tagsmith_core::error::{ChangelogError, TagsmithError};

use crate::cli::output;
use crate::cli::{Cli, OutputFormat, RepoContext};

/// Check a commit message against the commit rules
#[derive(Debug, Args)]
pub struct LintCommand {
    /// Commit message to check (read from stdin when neither this nor --file is given)
    #[arg(conflicts_with = "file")]
    pub message: Option<String>,

    /// Read the message from a file, e.g. .git/COMMIT_EDITMSG in a commit-msg hook
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

impl LintCommand {
    /// Execute the lint command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(file = ?self.file, "executing lint command");
        let raw = strip_comments(&self.read_message()?);
        let ctx = RepoContext::load(cli)?;

        let package_names: Vec<String> = ctx.packages()?.into_iter().map(|p| p.name).collect();
        let engine = CommitRuleEngine::new(Arc::new(ctx.config.commit_rules.clone()), &package_names);
        let message = ConventionalParser::new().parse(&raw);

        if message.is_merge {
            debug!(subject = %message.subject(), "merge commit, skipping rules");
            if !cli.quiet && cli.format == OutputFormat::Text {
                output::info("Merge commit, nothing to check");
            }
            return Ok(());
        }

        let violations = engine.validate(&message);
        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "subject": message.subject(),
                    "valid": violations.is_empty(),
                    "violations": violations.iter().map(ToString::to_string).collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if violations.is_empty() {
                    if !cli.quiet {
                        output::success(&format!("{}", style(message.subject()).bold()));
                    }
                } else {
                    for violation in &violations {
                        output::error(&violation.to_string());
                    }
                }
            }
        }

        CommitRuleEngine::check(&message, &violations)
            .map_err(|e| TagsmithError::from(ChangelogError::from(e)))?;
        Ok(())
    }

    fn read_message(&self) -> anyhow::Result<String> {
        if let Some(message) = &self.message {
            return Ok(message.clone());
        }
        if let Some(path) = &self.file {
            return std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e));
        }

        let mut message = String::new();
        std::io::stdin().read_to_string(&mut message)?;
        Ok(message)
    }
}

/// Drop the `#` comment lines git puts into the commit message file
fn strip_comments(raw: &str) -> String {
    raw.lines()
        .filter(|line| !line.starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
