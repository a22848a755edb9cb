//! Conventional Commits parser
//!
//! Parses commits following the Conventional Commits specification:
//! https://www.conventionalcommits.org/
//!
//! Subjects that do not follow the pattern fall back to `merge` (GitHub and
//! git merge subjects), `deps` (dependency bot commits) or `other`.

use regex::Regex;
use std::sync::LazyLock;

use super::CommitParser;
use crate::types::CommitMessage;

/// Regex for parsing conventional commit subjects
static CONVENTIONAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<type>[a-zA-Z]+)(?:\((?P<scope>[^)]*)\))?(?P<breaking>!)?: (?P<description>.+)$",
    )
    .expect("Invalid regex")
});

/// Regex for the breaking change footer
static BREAKING_FOOTER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^BREAKING[ -]CHANGE: ").expect("Invalid regex"));

/// Scopes that mark a commit as a dependency update
pub const DEPENDENCY_SCOPES: &[&str] = &["deps", "dependencies", "dep", "renovate", "dependabot"];

/// Bot signatures of dependency update commits
pub(crate) const DEPENDENCY_BOTS: &[&str] = &["renovate[bot]", "dependabot[bot]"];

/// Parser for Conventional Commits format
#[derive(Debug, Clone, Default)]
pub struct ConventionalParser;

impl ConventionalParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    fn fallback_type(subject: &str, raw: &str) -> &'static str {
        if subject.starts_with("Merge pull request") || subject.starts_with("Merge branch") {
            "merge"
        } else if DEPENDENCY_BOTS.iter().any(|bot| raw.contains(bot)) {
            "deps"
        } else {
            "other"
        }
    }
}

impl CommitParser for ConventionalParser {
    fn parse(&self, raw: &str) -> CommitMessage {
        let mut lines = raw.lines();
        let subject = lines.next().unwrap_or_default().trim();
        let body_lines: Vec<String> = lines
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.trim_end().to_string())
            .collect();

        let (commit_type, scopes, description, is_breaking) =
            match CONVENTIONAL_REGEX.captures(subject) {
                Some(caps) => {
                    let scopes = caps
                        .name("scope")
                        .map(|m| {
                            m.as_str()
                                .split(',')
                                .map(str::trim)
                                .filter(|s| !s.is_empty())
                                .map(str::to_string)
                                .collect()
                        })
                        .unwrap_or_default();
                    let breaking_footer =
                        body_lines.iter().any(|l| BREAKING_FOOTER_REGEX.is_match(l));

                    (
                        caps["type"].to_lowercase(),
                        scopes,
                        caps["description"].trim().to_string(),
                        caps.name("breaking").is_some() || breaking_footer,
                    )
                }
                None => (
                    Self::fallback_type(subject, raw).to_string(),
                    Vec::new(),
                    subject.to_string(),
                    false,
                ),
            };

        let is_merge = commit_type == "merge";
        let is_dependency = commit_type == "deps"
            || scopes
                .iter()
                .any(|s: &String| DEPENDENCY_SCOPES.contains(&s.to_lowercase().as_str()));

        CommitMessage {
            commit_type,
            scopes,
            description,
            body_lines,
            is_breaking,
            is_merge,
            is_dependency,
        }
    }
}
