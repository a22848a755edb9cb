//! Building blocks shared by the templates

use std::cmp::Ordering;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use semver::Version;
use tracing::debug;

use tagsmith_core::config::{ChangelogConfig, CommitRulesConfig};

use crate::types::{ChangelogData, CommitMessage, ParsedCommit, VersionContent, UNRELEASED};

/// `## [Unreleased]`
static UNRELEASED_HEADER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^## \[Unreleased\]").expect("Invalid regex"));

/// `## 1.2.3`, `## v1.2.3`, `## [1.2.3] - date`, `## pkg@1.2.3 (date)`
static VERSION_HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^## \S*?(\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?)").expect("Invalid regex")
});

const SHIELDS_URL: &str = "https://img.shields.io/badge";

/// Settings shared by the templates
#[derive(Debug, Clone)]
pub struct TemplateOptions {
    /// Commit type metadata: labels, emoji, badge colours, ordering
    pub rules: Arc<CommitRulesConfig>,
    /// Repository URL for commit and PR links
    pub repo_url: Option<String>,
    /// Document title
    pub title: String,
}

impl TemplateOptions {
    /// Options with default type metadata and no links
    pub fn new(rules: Arc<CommitRulesConfig>) -> Self {
        Self {
            rules,
            repo_url: None,
            title: "Changelog".to_string(),
        }
    }

    /// Options from the loaded configuration
    pub fn from_config(changelog: &ChangelogConfig, rules: Arc<CommitRulesConfig>) -> Self {
        Self {
            rules,
            repo_url: changelog
                .repo_url
                .as_ref()
                .map(|u| u.trim_end_matches('/').to_string()),
            title: changelog.title.clone(),
        }
    }

    /// Set the repository URL
    pub fn with_repo_url(mut self, url: impl Into<String>) -> Self {
        self.repo_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self::new(Arc::new(CommitRulesConfig::default()))
    }
}

/// Order version labels: `[Unreleased]` first, then semver descending.
/// Labels that are not versions sort last, alphabetically.
pub fn compare_version_labels(a: &str, b: &str) -> Ordering {
    match (a == UNRELEASED, b == UNRELEASED) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }

    let parse = |s: &str| Version::parse(s.trim_start_matches('v')).ok();
    match (parse(a), parse(b)) {
        (Some(va), Some(vb)) => vb.cmp(&va),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Version label of a changelog header line
pub fn header_version(line: &str) -> Option<String> {
    if UNRELEASED_HEADER_REGEX.is_match(line) {
        return Some(UNRELEASED.to_string());
    }
    VERSION_HEADER_REGEX
        .captures(line)
        .map(|caps| caps[1].to_string())
}

/// Split a changelog into raw per-version blocks, headers included.
///
/// Text before the first version header is dropped; the title is rendered
/// fresh. A version appearing twice keeps its first block.
pub fn parse_versions(markdown: &str) -> ChangelogData {
    let mut data = ChangelogData::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in markdown.lines() {
        if let Some(version) = header_version(line) {
            flush(current.take(), &mut data);
            current = Some((version, vec![line]));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }
    flush(current, &mut data);

    debug!(versions = data.len(), "parsed changelog versions");
    data
}

fn flush(block: Option<(String, Vec<&str>)>, data: &mut ChangelogData) {
    let Some((version, lines)) = block else {
        return;
    };
    if data.contains(&version) {
        debug!(version = %version, "duplicate version section ignored");
        return;
    }
    let text = lines.join("\n").trim_end().to_string();
    data.insert(version, VersionContent::Raw(text));
}

/// Version section header
pub fn version_header(version: &str, date: Option<&str>) -> String {
    match date {
        Some(date) if version != UNRELEASED => format!("## {} ({})", version, date),
        _ => format!("## {}", version),
    }
}

/// Document title line
pub fn title_line(title: &str) -> String {
    format!("# {}", title)
}

fn shields_escape(text: &str) -> String {
    text.replace('-', "--")
        .replace('_', "__")
        .replace(' ', "%20")
}

/// shields.io badge for a commit's type and scopes
pub fn badge(message: &CommitMessage, rules: &CommitRulesConfig) -> String {
    let color = rules.badge_color(&message.commit_type);
    let bang = if message.is_breaking { "!" } else { "" };
    let kind = format!("{}{}", message.commit_type, bang);

    if message.scopes.is_empty() {
        format!(
            "![{}]({}/{}-{})",
            kind,
            SHIELDS_URL,
            shields_escape(&kind),
            color
        )
    } else {
        let scopes = message.scopes.join(",");
        format!(
            "![{}({})]({}/{}-{}-{})",
            kind,
            scopes,
            SHIELDS_URL,
            shields_escape(&kind),
            shields_escape(&scopes),
            color
        )
    }
}

/// Short hash, linked to the commit when the repository URL is known
pub fn hash_link(commit: &ParsedCommit, repo_url: Option<&str>) -> String {
    let short = commit.info.short_hash();
    match repo_url {
        Some(url) => format!("[{}]({}/commit/{})", short, url, commit.hash()),
        None => format!("`{}`", short),
    }
}

/// PR number, linked to the pull request when the repository URL is known
pub fn pr_link(number: &str, repo_url: Option<&str>) -> String {
    match repo_url {
        Some(url) => format!("[#{}]({}/pull/{})", number, url, number),
        None => format!("#{}", number),
    }
}

/// Author credit; a mailto link when the author carries an email address
pub fn author_credit(author: &str) -> String {
    let author = author.trim();
    if !author.contains('@') {
        return author.to_string();
    }

    match (author.find('<'), author.rfind('>')) {
        (Some(start), Some(end)) if start < end => {
            let email = &author[start + 1..end];
            let name = author[..start].trim();
            let name = if name.is_empty() { email } else { name };
            format!("[{}](mailto:{})", name, email)
        }
        _ => format!("[{}](mailto:{})", author, author),
    }
}

/// Commit types present in a list, in display order
pub fn ordered_types<'a>(
    commits: impl IntoIterator<Item = &'a ParsedCommit>,
    rules: &CommitRulesConfig,
) -> Vec<String> {
    let mut types: Vec<String> = Vec::new();
    for commit in commits {
        if !types.contains(&commit.message.commit_type) {
            types.push(commit.message.commit_type.clone());
        }
    }
    types.sort_by_key(|t| rules.type_order(t));
    types
}

/// Heading for a commit type group
pub fn type_heading(commit_type: &str, rules: &CommitRulesConfig) -> String {
    let emoji = rules.emoji(commit_type);
    let label = rules.label(commit_type);
    format!("{} {}", emoji, label)
}

/// Join rendered version sections under the title
pub fn render_document(title: &str, sections: Vec<String>) -> String {
    let mut out = title_line(title);
    out.push_str("\n\n");
    out.push_str(&sections.join("\n\n"));
    out.push('\n');
    out
}

/// Render each version with `render_version`, carrying raw blocks verbatim
pub fn render_sections<F>(data: &ChangelogData, mut render_version: F) -> Vec<String>
where
    F: FnMut(&str, Option<&str>, &[ParsedCommit]) -> String,
{
    data.sorted()
        .into_iter()
        .map(|(version, content)| match content {
            VersionContent::Raw(text) => text.trim_end().to_string(),
            VersionContent::Commits(commits) => {
                render_version(version, data.date(version), commits)
            }
        })
        .collect()
}
