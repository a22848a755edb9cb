//! In-memory [`GitBackend`] for tests.
//!
//! Commits form a small DAG: each commit records its parents and the paths it
//! touches, so range queries behave like `git log a..b` without a repository.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;

use tagsmith_core::error::GitError;

use crate::backend::{GitBackend, LogQuery};
use crate::repository::Result;
use crate::types::{CommitInfo, RawCommit, TagInfo};

#[derive(Debug, Clone)]
struct MockCommit {
    raw: RawCommit,
    parents: Vec<String>,
    paths: Vec<String>,
}

/// Fake repository for exercising commit reading, PR resolution and bucketing
#[derive(Debug, Clone, Default)]
pub struct MockGit {
    /// Commits, oldest first
    commits: Vec<MockCommit>,
    index: HashMap<String, usize>,
    tags: Vec<TagInfo>,
    broken: HashSet<String>,
    head: Option<String>,
}

impl MockGit {
    /// Create an empty mock
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a commit whose first parent is the current HEAD; moves HEAD
    pub fn commit(&mut self, hash: &str, message: &str, paths: &[&str]) -> &mut Self {
        let parents = self.head.iter().cloned().collect();
        self.insert(hash, message, parents, paths);
        self.head = Some(hash.to_string());
        self
    }

    /// Add a commit with explicit parents; does not move HEAD
    pub fn commit_with_parents(
        &mut self,
        hash: &str,
        message: &str,
        parents: &[&str],
        paths: &[&str],
    ) -> &mut Self {
        let parents = parents.iter().map(|p| p.to_string()).collect();
        self.insert(hash, message, parents, paths);
        self
    }

    /// Add a merge of `side` into HEAD; moves HEAD
    pub fn merge(&mut self, hash: &str, message: &str, side: &str) -> &mut Self {
        let mut parents: Vec<String> = self.head.iter().cloned().collect();
        parents.push(side.to_string());
        let paths = self.merged_paths(self.head.as_deref(), side);
        let paths: Vec<&str> = paths.iter().map(String::as_str).collect();
        self.insert(hash, message, parents, &paths);
        self.head = Some(hash.to_string());
        self
    }

    /// Tag a commit
    pub fn tag(&mut self, name: &str, hash: &str) -> &mut Self {
        self.tags.push(TagInfo::new(name, hash));
        self
    }

    /// Make `show_commit` fail for a hash that is still listed by `log`
    pub fn break_commit(&mut self, hash: &str) -> &mut Self {
        self.broken.insert(hash.to_string());
        self
    }

    fn insert(&mut self, hash: &str, message: &str, parents: Vec<String>, paths: &[&str]) {
        let info = CommitInfo::new(hash)
            .with_author("Test <test@example.com>")
            .with_date("Mon Jan 1 00:00:00 2024 +0000");
        self.index.insert(hash.to_string(), self.commits.len());
        self.commits.push(MockCommit {
            raw: RawCommit::new(info, message),
            parents,
            paths: paths.iter().map(|p| p.to_string()).collect(),
        });
    }

    fn find(&self, hash: &str) -> Option<&MockCommit> {
        self.index.get(hash).map(|&i| &self.commits[i])
    }

    /// Paths changed on `side` since it forked from `base`
    fn merged_paths(&self, base: Option<&str>, side: &str) -> Vec<String> {
        let known = base.map(|b| self.ancestors(b)).unwrap_or_default();
        let mut paths: Vec<String> = Vec::new();
        for hash in self.ancestors(side).difference(&known) {
            if let Some(commit) = self.find(hash) {
                for path in &commit.paths {
                    if !paths.contains(path) {
                        paths.push(path.clone());
                    }
                }
            }
        }
        paths
    }

    fn ancestors(&self, from: &str) -> HashSet<String> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([from.to_string()]);
        while let Some(hash) = queue.pop_front() {
            if !seen.insert(hash.clone()) {
                continue;
            }
            if let Some(commit) = self.find(&hash) {
                queue.extend(commit.parents.iter().cloned());
            }
        }
        seen
    }

    /// Resolve `HEAD`, tag names, hashes and `rev^`/`rev^N` suffixes
    fn resolve(&self, rev: &str) -> Option<String> {
        if let Some((base, n)) = rev.rsplit_once('^') {
            let n: usize = if n.is_empty() { 1 } else { n.parse().ok()? };
            let base = self.resolve(base)?;
            return self.find(&base)?.parents.get(n.checked_sub(1)?).cloned();
        }

        if rev == "HEAD" {
            return self.head.clone();
        }
        if let Some(tag) = self.tags.iter().find(|t| t.name == rev) {
            return Some(tag.commit_hash.clone());
        }
        self.find(rev).map(|_| rev.to_string())
    }

    fn lookup_error(rev: &str) -> GitError {
        GitError::CommitLookup {
            hash: rev.to_string(),
            reason: "unknown revision".to_string(),
        }
    }
}

impl GitBackend for MockGit {
    fn show_commit(&self, hash: &str) -> Result<RawCommit> {
        if self.broken.contains(hash) {
            return Err(GitError::CommitLookup {
                hash: hash.to_string(),
                reason: "object is corrupt".to_string(),
            });
        }
        self.find(hash)
            .map(|c| c.raw.clone())
            .ok_or_else(|| Self::lookup_error(hash))
    }

    fn log_hashes(&self, query: &LogQuery) -> Result<Vec<String>> {
        let to = self
            .resolve(&query.to)
            .ok_or_else(|| Self::lookup_error(&query.to))?;
        let included = self.ancestors(&to);
        let excluded = match &query.from {
            Some(from) => {
                let from = self.resolve(from).ok_or_else(|| Self::lookup_error(from))?;
                self.ancestors(&from)
            }
            None => HashSet::new(),
        };

        let hashes = self
            .commits
            .iter()
            .rev()
            .filter(|c| included.contains(&c.raw.info.hash))
            .filter(|c| !excluded.contains(&c.raw.info.hash))
            .filter(|c| !query.merges_only || c.parents.len() > 1)
            .filter(|c| match &query.path {
                Some(path) => c.paths.iter().any(|p| Path::new(p).starts_with(path)),
                None => true,
            })
            .map(|c| c.raw.info.hash.clone())
            .collect();

        Ok(hashes)
    }

    fn rev_parse(&self, rev: &str) -> Result<String> {
        self.resolve(rev).ok_or_else(|| Self::lookup_error(rev))
    }

    fn tags(&self) -> Result<Vec<TagInfo>> {
        Ok(self.tags.clone())
    }

    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        let ancestor = self
            .resolve(ancestor)
            .ok_or_else(|| Self::lookup_error(ancestor))?;
        let descendant = self
            .resolve(descendant)
            .ok_or_else(|| Self::lookup_error(descendant))?;
        Ok(self.ancestors(&descendant).contains(&ancestor))
    }
}
