//! Changelog types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tagsmith_core::PrCategory;
use tagsmith_git::CommitInfo;
use tagsmith_strategies::BumpSignal;

use crate::formatter::compare_version_labels;

/// Version label for commits not yet released
pub const UNRELEASED: &str = "[Unreleased]";

/// Structured form of a commit message, derived purely from its text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMessage {
    /// Commit type (feat, fix, ... or the fallbacks merge, deps, other)
    pub commit_type: String,
    /// Scopes from the parenthesised part of the subject
    pub scopes: Vec<String>,
    /// Description after the colon, or the whole subject for fallbacks
    pub description: String,
    /// Non-blank lines after the subject
    pub body_lines: Vec<String>,
    /// Marked breaking with `!` or a BREAKING CHANGE footer
    pub is_breaking: bool,
    /// A merge commit subject
    pub is_merge: bool,
    /// A dependency update
    pub is_dependency: bool,
}

impl CommitMessage {
    /// Subject line reconstructed from the parsed parts
    pub fn subject(&self) -> String {
        match self.commit_type.as_str() {
            "merge" | "other" => self.description.clone(),
            _ => {
                let scope = if self.scopes.is_empty() {
                    String::new()
                } else {
                    format!("({})", self.scopes.join(","))
                };
                let bang = if self.is_breaking { "!" } else { "" };
                format!("{}{}{}: {}", self.commit_type, scope, bang, self.description)
            }
        }
    }

    /// Subject and body joined back into one text
    pub fn full_text(&self) -> String {
        let mut text = self.description.clone();
        for line in &self.body_lines {
            text.push('\n');
            text.push_str(line);
        }
        text
    }
}

/// Pull request counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrStats {
    /// Number of commits enclosed by the PR
    pub commit_count: usize,
}

/// A pull request resolved from a merge commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrInfo {
    /// PR number as written in the merge subject
    pub pr_number: String,
    /// Category decided from the enclosed commits
    pub pr_category: PrCategory,
    /// Counters
    pub pr_stats: PrStats,
    /// Enclosed commits
    pub pr_commits: Vec<ParsedCommit>,
    /// Source branch, without the user prefix
    pub pr_branch_name: String,
}

/// A commit with its message, metadata and, for merges, the resolved PR
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCommit {
    /// Parsed message
    pub message: CommitMessage,
    /// Git metadata
    pub info: CommitInfo,
    /// Resolved pull request
    pub pr: Option<PrInfo>,
}

impl ParsedCommit {
    /// Create a commit without PR data
    pub fn new(message: CommitMessage, info: CommitInfo) -> Self {
        Self {
            message,
            info,
            pr: None,
        }
    }

    /// Commit hash
    pub fn hash(&self) -> &str {
        &self.info.hash
    }

    /// The commits this entry stands for: a PR's enclosed commits, or itself
    pub fn effective_commits(&self) -> Vec<&ParsedCommit> {
        match &self.pr {
            Some(pr) if !pr.pr_commits.is_empty() => pr.pr_commits.iter().collect(),
            _ => vec![self],
        }
    }
}

impl BumpSignal for ParsedCommit {
    fn commit_type(&self) -> &str {
        &self.message.commit_type
    }

    fn is_breaking(&self) -> bool {
        self.message.is_breaking
    }
}

/// Content of one version section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionContent {
    /// Text carried over verbatim from an existing changelog, header included
    Raw(String),
    /// Freshly computed commits, newest first
    Commits(Vec<ParsedCommit>),
}

/// Version label to content mapping.
///
/// Keys are unique; iteration through [`ChangelogData::sorted`] puts
/// `[Unreleased]` first and then versions newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangelogData {
    entries: HashMap<String, VersionContent>,
    dates: HashMap<String, String>,
}

impl ChangelogData {
    /// Create empty data
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a version
    pub fn insert(&mut self, version: impl Into<String>, content: VersionContent) {
        self.entries.insert(version.into(), content);
    }

    /// Record a release date for a version
    pub fn set_date(&mut self, version: impl Into<String>, date: impl Into<String>) {
        self.dates.insert(version.into(), date.into());
    }

    /// Release date of a version
    pub fn date(&self, version: &str) -> Option<&str> {
        self.dates.get(version).map(String::as_str)
    }

    /// Content of a version
    pub fn get(&self, version: &str) -> Option<&VersionContent> {
        self.entries.get(version)
    }

    /// Remove a version
    pub fn remove(&mut self, version: &str) -> Option<VersionContent> {
        self.dates.remove(version);
        self.entries.remove(version)
    }

    /// Whether a version is present
    pub fn contains(&self, version: &str) -> bool {
        self.entries.contains_key(version)
    }

    /// Number of versions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no versions
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Version labels in display order
    pub fn versions(&self) -> Vec<&str> {
        self.sorted().into_iter().map(|(k, _)| k).collect()
    }

    /// Entries in display order
    pub fn sorted(&self) -> Vec<(&str, &VersionContent)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        entries.sort_by(|a, b| compare_version_labels(a.0, b.0));
        entries
    }

    /// Overlay `newer` on top of this data; newer entries win on key collision
    pub fn merge(mut self, newer: ChangelogData) -> ChangelogData {
        for (version, content) in newer.entries {
            self.dates.remove(&version);
            self.entries.insert(version, content);
        }
        self.dates.extend(newer.dates);
        self
    }
}
