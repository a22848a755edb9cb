//! Abstraction over the git operations the release engine needs

use std::fmt;
use std::path::{Path, PathBuf};

use crate::repository::Result;
use crate::types::{RawCommit, TagInfo};

/// A `git log` query: a revision range plus optional filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    /// Exclusive start of the range; `None` walks the whole history of `to`
    pub from: Option<String>,
    /// Inclusive end of the range
    pub to: String,
    /// Only list merge commits
    pub merges_only: bool,
    /// Only list commits touching this path
    pub path: Option<PathBuf>,
}

impl LogQuery {
    /// Query the range `from..to`
    pub fn range(from: Option<&str>, to: impl Into<String>) -> Self {
        Self {
            from: from.map(str::to_string),
            to: to.into(),
            merges_only: false,
            path: None,
        }
    }

    /// Restrict to merge commits
    pub fn merges(mut self) -> Self {
        self.merges_only = true;
        self
    }

    /// Restrict to commits touching a path
    pub fn touching(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// The revision range argument as passed to git
    pub fn revision_range(&self) -> String {
        match &self.from {
            Some(from) => format!("{}..{}", from, self.to),
            None => self.to.clone(),
        }
    }

    /// Arguments for `git log`
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "log".to_string(),
            self.revision_range(),
            "--format=%H".to_string(),
        ];
        if self.merges_only {
            args.push("--merges".to_string());
        }
        if let Some(path) = &self.path {
            args.push("--".to_string());
            args.push(path.display().to_string());
        }
        args
    }
}

impl fmt::Display for LogQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "git {}", self.to_args().join(" "))
    }
}

/// Git operations used by commit reading, PR resolution and changelog bucketing.
///
/// Implemented by [`crate::GitRepo`] against a real repository and by
/// [`crate::mock::MockGit`] for tests.
pub trait GitBackend {
    /// Read one commit's metadata and raw message
    fn show_commit(&self, hash: &str) -> Result<RawCommit>;

    /// List commit hashes, newest first
    fn log_hashes(&self, query: &LogQuery) -> Result<Vec<String>>;

    /// Resolve a revision to a full commit hash
    fn rev_parse(&self, rev: &str) -> Result<String>;

    /// All tags in the repository
    fn tags(&self) -> Result<Vec<TagInfo>>;

    /// Whether `ancestor` is reachable from `descendant` (a commit is its own ancestor)
    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool>;
}

impl<T: GitBackend + ?Sized> GitBackend for &T {
    fn show_commit(&self, hash: &str) -> Result<RawCommit> {
        (**self).show_commit(hash)
    }

    fn log_hashes(&self, query: &LogQuery) -> Result<Vec<String>> {
        (**self).log_hashes(query)
    }

    fn rev_parse(&self, rev: &str) -> Result<String> {
        (**self).rev_parse(rev)
    }

    fn tags(&self) -> Result<Vec<TagInfo>> {
        (**self).tags()
    }

    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        (**self).is_ancestor(ancestor, descendant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_query_args() {
        let query = LogQuery::range(Some("ui@1.0.0"), "HEAD")
            .merges()
            .touching("packages/ui");

        assert_eq!(
            query.to_args(),
            vec!["log", "ui@1.0.0..HEAD", "--format=%H", "--merges", "--", "packages/ui"]
        );
    }

    #[test]
    fn test_log_query_without_start() {
        let query = LogQuery::range(None, "HEAD");
        assert_eq!(query.revision_range(), "HEAD");
        assert_eq!(query.to_string(), "git log HEAD --format=%H");
    }
}
