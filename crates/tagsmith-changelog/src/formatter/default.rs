//! Default changelog template: pull requests first, then direct commits

use std::cmp::Ordering;

use tracing::{debug, instrument};

use super::helpers::{self, TemplateOptions};
use super::ChangelogTemplate;
use crate::types::{ChangelogData, ParsedCommit, PrInfo};

/// Verbose template with PR sections and badge-decorated commit lines
#[derive(Debug, Clone, Default)]
pub struct DefaultTemplate {
    options: TemplateOptions,
}

impl DefaultTemplate {
    /// Create the template
    pub fn new(options: TemplateOptions) -> Self {
        Self { options }
    }

    fn commit_line(&self, commit: &ParsedCommit) -> String {
        let mut line = format!(
            "- {} {} ({})",
            helpers::badge(&commit.message, &self.options.rules),
            commit.message.description,
            helpers::hash_link(commit, self.options.repo_url.as_deref())
        );
        if let Some(author) = &commit.info.author {
            line.push_str(" by ");
            line.push_str(&helpers::author_credit(author));
        }
        line
    }

    fn render_pr(&self, merge: &ParsedCommit, pr: &PrInfo) -> String {
        let rules = &self.options.rules;
        let count = pr.pr_stats.commit_count;
        let header = format!(
            "#### {} {} · {} · `{}` · {} commit{}",
            rules.category_emoji(pr.pr_category),
            pr.pr_category.title(),
            helpers::pr_link(&pr.pr_number, self.options.repo_url.as_deref()),
            pr.pr_branch_name,
            count,
            if count == 1 { "" } else { "s" }
        );

        let lines: Vec<String> = if pr.pr_commits.is_empty() {
            vec![self.commit_line(merge)]
        } else {
            pr.pr_commits.iter().map(|c| self.commit_line(c)).collect()
        };

        format!(
            "{}\n\n<details>\n<summary>{}</summary>\n\n{}\n\n</details>",
            header,
            merge.message.description,
            lines.join("\n")
        )
    }

    fn render_version(&self, version: &str, date: Option<&str>, commits: &[ParsedCommit]) -> String {
        let rules = &self.options.rules;
        let mut out = helpers::version_header(version, date);

        let (prs, orphans): (Vec<&ParsedCommit>, Vec<&ParsedCommit>) =
            commits.iter().partition(|c| c.pr.is_some());

        if prs.is_empty() && orphans.is_empty() {
            out.push_str("\n\n_No changes._");
            return out;
        }

        if !prs.is_empty() {
            out.push_str("\n\n### Pull Requests");
            for merge in &prs {
                if let Some(pr) = &merge.pr {
                    out.push_str("\n\n");
                    out.push_str(&self.render_pr(merge, pr));
                }
            }
        }

        if !orphans.is_empty() {
            out.push_str("\n\n### Direct Commits");
            for commit_type in helpers::ordered_types(orphans.iter().copied(), rules) {
                out.push_str(&format!("\n\n#### {}\n\n", helpers::type_heading(&commit_type, rules)));
                let lines: Vec<String> = orphans
                    .iter()
                    .filter(|c| c.message.commit_type == commit_type)
                    .map(|c| self.commit_line(c))
                    .collect();
                out.push_str(&lines.join("\n"));
            }
        }

        out
    }
}

impl ChangelogTemplate for DefaultTemplate {
    fn name(&self) -> &'static str {
        "default"
    }

    #[instrument(skip(self, data), fields(versions = data.len()))]
    fn render(&self, data: &ChangelogData) -> String {
        let sections = helpers::render_sections(data, |version, date, commits| {
            self.render_version(version, date, commits)
        });
        debug!(sections = sections.len(), "rendered changelog");
        helpers::render_document(&self.options.title, sections)
    }

    fn parse(&self, markdown: &str) -> ChangelogData {
        helpers::parse_versions(markdown)
    }

    fn compare_versions(&self, a: &str, b: &str) -> Ordering {
        helpers::compare_version_labels(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{CommitParser, ConventionalParser};
    use crate::types::{PrStats, VersionContent, UNRELEASED};
    use tagsmith_core::PrCategory;
    use tagsmith_git::CommitInfo;

    fn commit(hash: &str, raw: &str) -> ParsedCommit {
        let info = CommitInfo::new(hash).with_author("Jane <jane@example.com>");
        ParsedCommit::new(ConventionalParser::new().parse(raw), info)
    }

    fn template() -> DefaultTemplate {
        DefaultTemplate::new(TemplateOptions::default().with_repo_url("https://github.com/acme/repo/"))
    }

    fn sample() -> ChangelogData {
        let mut merge = commit("m1", "Merge pull request #12 from alice:feature/login");
        merge.pr = Some(PrInfo {
            pr_number: "12".into(),
            pr_category: PrCategory::Features,
            pr_stats: PrStats { commit_count: 2 },
            pr_commits: vec![
                commit("c2", "fix(ui): validate email"),
                commit("c1", "feat(ui): add login form"),
            ],
            pr_branch_name: "feature/login".into(),
        });

        let mut data = ChangelogData::new();
        data.insert(
            "1.3.0",
            VersionContent::Commits(vec![
                merge,
                commit("d2", "deps: bump serde"),
                commit("d1", "fix(core): handle null"),
                commit("d0", "feat: add export"),
            ]),
        );
        data.set_date("1.3.0", "2024-05-01");
        data.insert("1.2.0", VersionContent::Raw("## 1.2.0\n\nOlder notes".into()));
        data
    }

    #[test]
    fn test_render_sections() {
        let out = template().render(&sample());

        assert!(out.starts_with("# Changelog\n\n## 1.3.0 (2024-05-01)"));
        assert!(out.contains("### Pull Requests"));
        assert!(out.contains(
            "#### ✨ Features · [#12](https://github.com/acme/repo/pull/12) · `feature/login` · 2 commits"
        ));
        assert!(out.contains("<summary>Merge pull request #12 from alice:feature/login</summary>"));
        assert!(out.contains("- ![feat(ui)](https://img.shields.io/badge/feat-ui-brightgreen) add login form ([c1](https://github.com/acme/repo/commit/c1)) by [Jane](mailto:jane@example.com)"));
        assert!(out.contains("### Direct Commits"));
        assert!(out.ends_with("## 1.2.0\n\nOlder notes\n"));
    }

    #[test]
    fn test_direct_commit_order() {
        let out = template().render(&sample());
        let direct = &out[out.find("### Direct Commits").unwrap()..];

        let features = direct.find("#### ✨ Features").unwrap();
        let fixes = direct.find("#### 🐛 Bug Fixes").unwrap();
        let deps = direct.find("#### 📦 Dependencies").unwrap();
        assert!(features < fixes && fixes < deps);
    }

    #[test]
    fn test_round_trip_keys() {
        let template = template();
        let rendered = template.render(&sample());
        let parsed = template.parse(&rendered);
        assert_eq!(parsed.versions(), vec!["1.3.0", "1.2.0"]);

        let mut raw_only = ChangelogData::new();
        raw_only.insert(UNRELEASED, VersionContent::Raw("## [Unreleased]\n\n- wip".into()));
        raw_only.insert("0.2.0", VersionContent::Raw("## v0.2.0\n\nnotes".into()));
        raw_only.insert("0.1.0", VersionContent::Raw("## 0.1.0".into()));

        let reparsed = template.parse(&template.render(&raw_only));
        assert_eq!(reparsed.versions(), raw_only.versions());
        assert_eq!(reparsed, raw_only);
    }

    #[test]
    fn test_empty_version() {
        let mut data = ChangelogData::new();
        data.insert(UNRELEASED, VersionContent::Commits(vec![]));
        let out = template().render(&data);
        assert!(out.contains("## [Unreleased]\n\n_No changes._"));
    }
}
