//! Git types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata of a git commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Commit hash (full)
    pub hash: String,
    /// Author name
    pub author: Option<String>,
    /// Author date as printed by git
    pub date: Option<String>,
}

impl CommitInfo {
    /// Create a new CommitInfo
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            author: None,
            date: None,
        }
    }

    /// Set the author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the date
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Short hash (first 7 characters)
    pub fn short_hash(&self) -> &str {
        let end = self
            .hash
            .char_indices()
            .nth(7)
            .map_or(self.hash.len(), |(i, _)| i);
        &self.hash[..end]
    }
}

/// A commit as read from `git show`: metadata plus the raw message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommit {
    /// Commit metadata
    pub info: CommitInfo,
    /// Full commit message (subject, blank line, body)
    pub message: String,
}

impl RawCommit {
    /// Create a raw commit
    pub fn new(info: CommitInfo, message: impl Into<String>) -> Self {
        Self {
            info,
            message: message.into(),
        }
    }

    /// Parse the output of `git show --format=%H%n%an%n%ad%n%s%n%B --no-patch`.
    ///
    /// Returns `None` when the output is missing the header lines.
    pub fn from_show_output(output: &str) -> Option<Self> {
        let mut lines = output.lines();
        let hash = lines.next()?.trim();
        let author = lines.next()?.trim();
        let date = lines.next()?.trim();
        // %s is repeated at the top of %B
        let _subject = lines.next()?;

        if hash.is_empty() {
            return None;
        }

        let message = lines.collect::<Vec<_>>().join("\n").trim_end().to_string();

        let mut info = CommitInfo::new(hash);
        if !author.is_empty() {
            info = info.with_author(author);
        }
        if !date.is_empty() {
            info = info.with_date(date);
        }

        Some(Self { info, message })
    }
}

/// Information about a git tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagInfo {
    /// Tag name
    pub name: String,
    /// Commit hash the tag points to
    pub commit_hash: String,
    /// Tag message (for annotated tags)
    pub message: Option<String>,
    /// Tag timestamp (tagger date, or commit date for lightweight tags)
    pub timestamp: Option<DateTime<Utc>>,
    /// Extracted version from tag name
    pub version: Option<String>,
}

impl TagInfo {
    /// Create a new TagInfo
    pub fn new(name: impl Into<String>, commit_hash: impl Into<String>) -> Self {
        let name = name.into();
        let version = extract_version(&name);

        Self {
            name,
            commit_hash: commit_hash.into(),
            message: None,
            timestamp: None,
            version,
        }
    }

    /// Set the tag message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the timestamp
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Release date of the tag, formatted as `YYYY-MM-DD`
    pub fn date(&self) -> Option<String> {
        self.timestamp.map(|t| t.format("%Y-%m-%d").to_string())
    }
}

/// Extract version from a tag name
fn extract_version(tag: &str) -> Option<String> {
    // Handle common tag formats: v1.0.0, 1.0.0, package@1.0.0, @scope/package@1.0.0, package-v1.0.0
    let tag = tag.strip_prefix('v').unwrap_or(tag);

    if let Some(pos) = tag.rfind('@') {
        let version_part = &tag[pos + 1..];
        let version = version_part.strip_prefix('v').unwrap_or(version_part);
        if looks_like_version(version) {
            return Some(version.to_string());
        }
    }

    if let Some(pos) = tag.rfind("-v") {
        let version = &tag[pos + 2..];
        if looks_like_version(version) {
            return Some(version.to_string());
        }
    }

    if looks_like_version(tag) {
        return Some(tag.to_string());
    }

    None
}

/// Check if a string looks like a semantic version
fn looks_like_version(s: &str) -> bool {
    let parts: Vec<&str> = s.split('.').collect();
    if parts.len() < 2 {
        return false;
    }

    parts[0].parse::<u64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_version() {
        assert_eq!(extract_version("v1.0.0"), Some("1.0.0".to_string()));
        assert_eq!(extract_version("1.0.0"), Some("1.0.0".to_string()));
        assert_eq!(extract_version("ui@1.0.0"), Some("1.0.0".to_string()));
        assert_eq!(extract_version("@acme/ui@v1.0.0"), Some("1.0.0".to_string()));
        assert_eq!(extract_version("pkg-v2.0.0"), Some("2.0.0".to_string()));
        assert_eq!(extract_version("not-a-version"), None);
    }

    #[test]
    fn test_short_hash() {
        let info = CommitInfo::new("abc1234567890");
        assert_eq!(info.short_hash(), "abc1234");
        assert_eq!(CommitInfo::new("abc").short_hash(), "abc");
    }

    #[test]
    fn test_from_show_output() {
        let output = "abc123\nAlice\nMon Jan 1 10:00:00 2024 +0000\nfeat(ui): add button\n\
                      feat(ui): add button\n\nAdds a primary button.\n\n";
        let raw = RawCommit::from_show_output(output).unwrap();

        assert_eq!(raw.info.hash, "abc123");
        assert_eq!(raw.info.author.as_deref(), Some("Alice"));
        assert_eq!(raw.message, "feat(ui): add button\n\nAdds a primary button.");
    }

    #[test]
    fn test_from_show_output_truncated() {
        assert!(RawCommit::from_show_output("abc123\nAlice\n").is_none());
        assert!(RawCommit::from_show_output("").is_none());
    }
}
