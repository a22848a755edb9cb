//! Commit and range queries backed by the `git` binary

use std::process::Command;
use std::time::Instant;

use tracing::{debug, instrument};

use tagsmith_core::error::GitError;

use crate::backend::{GitBackend, LogQuery};
use crate::repository::{GitRepo, Result};
use crate::types::{RawCommit, TagInfo};

/// Format passed to `git show`: hash, author, date, subject, raw body
pub const SHOW_FORMAT: &str = "--format=%H%n%an%n%ad%n%s%n%B";

impl GitRepo {
    /// Build a git command rooted at the working tree
    fn git_cmd(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(self.path());
        cmd.arg("-c").arg("core.quotePath=false");
        cmd.arg("-c").arg("log.showSignature=false");
        cmd
    }

    /// Run git with the given arguments and return stdout
    fn run_git<S: AsRef<str>>(&self, args: &[S]) -> Result<String> {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        let command = format!("git {}", args.join(" "));
        let start = Instant::now();

        let output = self
            .git_cmd()
            .args(&args)
            .output()
            .map_err(|e| GitError::CommandFailed {
                command: command.clone(),
                stderr: e.to_string(),
            })?;

        debug!(
            command = %command,
            success = output.status.success(),
            duration_ms = start.elapsed().as_millis(),
            "ran git"
        );

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl GitBackend for GitRepo {
    #[instrument(skip(self), fields(hash))]
    fn show_commit(&self, hash: &str) -> Result<RawCommit> {
        let output = self
            .run_git(&["show", SHOW_FORMAT, "--no-patch", hash])
            .map_err(|e| match e {
                GitError::CommandFailed { stderr, .. } => GitError::CommitLookup {
                    hash: hash.to_string(),
                    reason: stderr,
                },
                other => other,
            })?;

        RawCommit::from_show_output(&output).ok_or_else(|| GitError::MalformedOutput {
            command: format!("git show {}", hash),
            reason: "expected hash, author, date and subject lines".to_string(),
        })
    }

    #[instrument(skip(self), fields(range = %query.revision_range(), merges = query.merges_only))]
    fn log_hashes(&self, query: &LogQuery) -> Result<Vec<String>> {
        let output = self.run_git(query.to_args().as_slice())?;
        let hashes: Vec<String> = output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();

        debug!(count = hashes.len(), "listed commits");
        Ok(hashes)
    }

    fn rev_parse(&self, rev: &str) -> Result<String> {
        let spec = format!("{}^{{commit}}", rev);
        let output = self
            .run_git(&["rev-parse", "--verify", spec.as_str()])
            .map_err(|e| match e {
                GitError::CommandFailed { stderr, .. } => GitError::CommitLookup {
                    hash: rev.to_string(),
                    reason: stderr,
                },
                other => other,
            })?;

        Ok(output.trim().to_string())
    }

    fn tags(&self) -> Result<Vec<TagInfo>> {
        GitRepo::tags(self)
    }

    #[instrument(skip(self))]
    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        let ancestor = self.rev_parse(ancestor)?;
        let descendant = self.rev_parse(descendant)?;
        let command = format!("git merge-base --is-ancestor {} {}", ancestor, descendant);

        let output = self
            .git_cmd()
            .args(["merge-base", "--is-ancestor", ancestor.as_str(), descendant.as_str()])
            .output()
            .map_err(|e| GitError::CommandFailed {
                command: command.clone(),
                stderr: e.to_string(),
            })?;

        // Exit 1 means "not an ancestor"; anything else non-zero is a failure
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(GitError::CommandFailed {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }
}
