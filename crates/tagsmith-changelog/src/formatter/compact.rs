//! Compact changelog template: every commit in one list per type

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::{debug, instrument};

use super::helpers::{self, TemplateOptions};
use super::ChangelogTemplate;
use crate::types::{ChangelogData, ParsedCommit};

/// Flat template; PRs are unpacked and each commit hash is listed once
#[derive(Debug, Clone, Default)]
pub struct CompactTemplate {
    options: TemplateOptions,
}

/// A commit together with the PR it came from
struct Entry<'a> {
    commit: &'a ParsedCommit,
    pr_number: Option<&'a str>,
}

impl CompactTemplate {
    /// Create the template
    pub fn new(options: TemplateOptions) -> Self {
        Self { options }
    }

    fn flatten(commits: &[ParsedCommit]) -> Vec<Entry<'_>> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for commit in commits {
            let pr_number = commit.pr.as_ref().map(|pr| pr.pr_number.as_str());
            for inner in commit.effective_commits() {
                if seen.insert(inner.hash()) {
                    entries.push(Entry {
                        commit: inner,
                        pr_number,
                    });
                }
            }
        }

        entries
    }

    fn line(&self, entry: &Entry<'_>) -> String {
        let message = &entry.commit.message;
        let mut line = String::from("- ");
        if message.is_breaking {
            line.push_str("**BREAKING** ");
        }
        if !message.scopes.is_empty() {
            line.push_str(&format!("**{}:** ", message.scopes.join(",")));
        }
        line.push_str(&message.description);
        if let Some(number) = entry.pr_number {
            line.push_str(&format!(
                " ({})",
                helpers::pr_link(number, self.options.repo_url.as_deref())
            ));
        }
        line.push_str(&format!(
            " ({})",
            helpers::hash_link(entry.commit, self.options.repo_url.as_deref())
        ));
        line
    }

    fn render_version(&self, version: &str, date: Option<&str>, commits: &[ParsedCommit]) -> String {
        let rules = &self.options.rules;
        let mut out = helpers::version_header(version, date);
        let entries = Self::flatten(commits);

        if entries.is_empty() {
            out.push_str("\n\n_No changes._");
            return out;
        }

        for commit_type in helpers::ordered_types(entries.iter().map(|e| e.commit), rules) {
            out.push_str(&format!("\n\n### {}\n\n", helpers::type_heading(&commit_type, rules)));
            let lines: Vec<String> = entries
                .iter()
                .filter(|e| e.commit.message.commit_type == commit_type)
                .map(|e| self.line(e))
                .collect();
            out.push_str(&lines.join("\n"));
        }

        out
    }
}

impl ChangelogTemplate for CompactTemplate {
    fn name(&self) -> &'static str {
        "compact"
    }

    #[instrument(skip(self, data), fields(versions = data.len()))]
    fn render(&self, data: &ChangelogData) -> String {
        let sections = helpers::render_sections(data, |version, date, commits| {
            self.render_version(version, date, commits)
        });
        debug!(sections = sections.len(), "rendered compact changelog");
        helpers::render_document(&self.options.title, sections)
    }

    fn parse(&self, markdown: &str) -> ChangelogData {
        helpers::parse_versions(markdown)
    }

    fn compare_versions(&self, a: &str, b: &str) -> Ordering {
        helpers::compare_version_labels(a, b)
    }
}
