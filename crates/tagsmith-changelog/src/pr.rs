//! Pull request resolution from merge commits
//!
//! A merge commit `M` encloses the commits in `M^..M^2`. Those commits are
//! read and scored to decide which changelog category the PR belongs to.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use tagsmith_core::{PrCategory, Result};
use tagsmith_git::{CommitInfo, GitBackend, LogQuery};

use crate::parser::DEPENDENCY_BOTS;
use crate::types::{CommitMessage, ParsedCommit, PrInfo, PrStats};

/// PR number patterns, most specific first
static PR_NUMBER_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"Merge pull request #(\d+)",
        r"Merge PR #(\d+)",
        r"Merge.*#(\d+)",
        r"#(\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid regex"))
    .collect()
});

/// `from <branch>` marker in a merge message
static BRANCH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)\bfrom ([^\n]*)").expect("Invalid regex"));

/// Branch assumed when a merge message names none
pub const DEFAULT_BRANCH: &str = "main";

/// Description words that make a chore a dependency update
const DEPENDENCY_WORDS: &[&str] = &["deps", "dependency", "dependencies", "bump", "upgrade"];

/// Resolves merge commits into [`PrInfo`]
#[derive(Debug, Clone, Default)]
pub struct PrResolver;

impl PrResolver {
    /// Create a resolver
    pub fn new() -> Self {
        Self
    }

    /// Resolve a merge commit.
    ///
    /// Returns `None` when the subject carries no PR number; numbers in the
    /// body are issue references, not PRs. `read` parses an
    /// enclosed commit by hash; enclosed commits that fail to read are kept
    /// as placeholders so the PR still counts them.
    pub fn resolve<G, F>(&self, git: &G, merge: &ParsedCommit, read: F) -> Option<PrInfo>
    where
        G: GitBackend,
        F: Fn(&str) -> Result<ParsedCommit>,
    {
        let pr_number = extract_pr_number(&merge.message.description)?;
        let text = merge.message.full_text();
        let hash = merge.hash();

        let query = LogQuery::range(Some(&format!("{}^", hash)), format!("{}^2", hash));
        let enclosed = git.log_hashes(&query).unwrap_or_else(|e| {
            warn!(merge = %hash, error = %e, "could not list PR commits");
            Vec::new()
        });

        let pr_commits = match enclosed.as_slice() {
            [] => Vec::new(),
            [single] => match read(single) {
                Ok(mut commit) => {
                    commit.message.description = format!(
                        "Squashed changes from PR (#{}): {}",
                        pr_number, commit.message.description
                    );
                    vec![commit]
                }
                Err(e) => {
                    warn!(commit = %single, error = %e, "could not read PR commit");
                    vec![placeholder(single)]
                }
            },
            hashes => hashes
                .iter()
                .map(|h| {
                    read(h).unwrap_or_else(|e| {
                        warn!(commit = %h, error = %e, "could not read PR commit");
                        placeholder(h)
                    })
                })
                .collect(),
        };

        let pr_branch_name = extract_branch(&text);
        let pr_category = categorize(&text, &pr_branch_name, &pr_commits);

        debug!(
            merge = %hash,
            pr = %pr_number,
            branch = %pr_branch_name,
            category = %pr_category,
            commits = pr_commits.len(),
            "resolved pull request"
        );

        Some(PrInfo {
            pr_number,
            pr_category,
            pr_stats: PrStats {
                commit_count: pr_commits.len(),
            },
            pr_commits,
            pr_branch_name,
        })
    }
}

/// PR number from a merge message
pub fn extract_pr_number(text: &str) -> Option<String> {
    PR_NUMBER_REGEXES
        .iter()
        .find_map(|re| re.captures(text))
        .map(|caps| caps[1].to_string())
}

/// Source branch from a merge message, without the `user:` or `user/` prefix
pub fn extract_branch(text: &str) -> String {
    let Some(caps) = BRANCH_REGEX.captures(text) else {
        return DEFAULT_BRANCH.to_string();
    };

    let raw = caps[1].trim();
    let branch = match raw.find([':', '/']) {
        Some(pos) => &raw[pos + 1..],
        None => raw,
    };

    if branch.is_empty() {
        DEFAULT_BRANCH.to_string()
    } else {
        branch.to_string()
    }
}

/// Category of a PR from its message, branch and enclosed commits.
///
/// Bot PRs are always dependency updates. Otherwise each commit scores
/// towards a category and the highest total wins, ties going to the
/// category listed first in [`PrCategory::PRIORITY`].
pub fn categorize(text: &str, branch: &str, commits: &[ParsedCommit]) -> PrCategory {
    let bot_text = DEPENDENCY_BOTS.iter().any(|bot| text.contains(bot));
    let bot_branch = branch.starts_with("renovate/") || branch.starts_with("dependabot/");
    if bot_text || bot_branch {
        return PrCategory::Dependencies;
    }

    let mut scores: HashMap<PrCategory, u32> = HashMap::new();
    for commit in commits {
        if let Some((category, points)) = score(&commit.message) {
            *scores.entry(category).or_default() += points;
        }
    }

    let best = scores.values().copied().max().unwrap_or(0);
    if best == 0 {
        return PrCategory::Other;
    }

    PrCategory::PRIORITY
        .into_iter()
        .find(|c| scores.get(c) == Some(&best))
        .unwrap_or(PrCategory::Other)
}

fn score(message: &CommitMessage) -> Option<(PrCategory, u32)> {
    let scored = match message.commit_type.as_str() {
        "feat" => (PrCategory::Features, 3),
        "fix" => (PrCategory::Bugfixes, 2),
        "docs" => (PrCategory::Documentation, 2),
        "refactor" | "style" | "perf" => (PrCategory::Refactoring, 2),
        "ci" | "build" => (PrCategory::Infrastructure, 3),
        "chore" | "deps" if is_dependency_update(message) => (PrCategory::Dependencies, 5),
        "chore" => (PrCategory::Infrastructure, 2),
        _ => return None,
    };
    Some(scored)
}

fn is_dependency_update(message: &CommitMessage) -> bool {
    if message.is_dependency {
        return true;
    }
    let description = message.description.to_lowercase();
    DEPENDENCY_WORDS.iter().any(|w| description.contains(w))
}

fn placeholder(hash: &str) -> ParsedCommit {
    let message = CommitMessage {
        commit_type: "other".to_string(),
        scopes: Vec::new(),
        description: format!("Unreadable commit {}", hash),
        body_lines: Vec::new(),
        is_breaking: false,
        is_merge: false,
        is_dependency: false,
    };
    ParsedCommit::new(message, CommitInfo::new(hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{CommitParser, ConventionalParser};
    use tagsmith_git::mock::MockGit;

    fn parsed(hash: &str, raw: &str) -> ParsedCommit {
        ParsedCommit::new(ConventionalParser::new().parse(raw), CommitInfo::new(hash))
    }

    #[test]
    fn test_extract_pr_number() {
        assert_eq!(extract_pr_number("Merge pull request #42 from a/b").as_deref(), Some("42"));
        assert_eq!(extract_pr_number("Merge PR #7").as_deref(), Some("7"));
        assert_eq!(extract_pr_number("Merge branch 'x' (#15)").as_deref(), Some("15"));
        assert_eq!(extract_pr_number("fix things #99").as_deref(), Some("99"));
        assert_eq!(extract_pr_number("Merge branch 'main' into dev"), None);
    }

    #[test]
    fn test_issue_reference_in_body_is_not_a_pr() {
        let mut git = MockGit::new();
        git.commit("a1", "chore: init", &["a"])
            .commit_with_parents("s1", "fix: side", &["a1"], &["b"])
            .merge("m1", "Merge branch 'dev'\n\nRelated to issue #77", "s1");

        let merge = parsed("m1", "Merge branch 'dev'\n\nRelated to issue #77");
        let read = |h: &str| -> Result<ParsedCommit> { Ok(parsed(h, "fix: side")) };
        assert!(PrResolver::new().resolve(&git, &merge, read).is_none());

        let merge = parsed("m1", "Merge pull request #12 from alice/dev\n\nCloses #77");
        let pr = PrResolver::new().resolve(&git, &merge, read).unwrap();
        assert_eq!(pr.pr_number, "12");
        assert_eq!(pr.pr_branch_name, "dev");
    }

    #[test]
    fn test_extract_branch() {
        assert_eq!(extract_branch("Merge pull request #1 from alice:feature/login"), "feature/login");
        assert_eq!(extract_branch("Merge pull request #1 from alice/feature-x"), "feature-x");
        assert_eq!(extract_branch("Merge pull request #1 from hotfix"), "hotfix");
        assert_eq!(extract_branch("Merge pull request #1"), DEFAULT_BRANCH);
        assert_eq!(extract_branch("Merge pull request #1 from alice/"), DEFAULT_BRANCH);
    }

    #[test]
    fn test_categorize_scores() {
        let commits = vec![
            parsed("a", "feat: add page"),
            parsed("b", "fix: typo"),
            parsed("c", "fix: crash"),
        ];
        // fix 4 beats feat 3
        assert_eq!(categorize("", "x", &commits), PrCategory::Bugfixes);

        let commits = vec![parsed("a", "feat: add page"), parsed("b", "ci: cache")];
        assert_eq!(categorize("", "x", &commits), PrCategory::Features);

        let commits = vec![parsed("a", "chore: bump serde to 1.0.200")];
        assert_eq!(categorize("", "x", &commits), PrCategory::Dependencies);

        let commits = vec![parsed("a", "chore: tidy scripts")];
        assert_eq!(categorize("", "x", &commits), PrCategory::Infrastructure);

        let commits = vec![parsed("a", "test: more cases"), parsed("b", "random text")];
        assert_eq!(categorize("", "x", &commits), PrCategory::Other);
        assert_eq!(categorize("", "x", &[]), PrCategory::Other);
    }

    #[test]
    fn test_categorize_bots() {
        let commits = vec![parsed("a", "feat: add page")];
        assert_eq!(
            categorize("Merge pull request #3 from acme/renovate/serde", "renovate/serde", &commits),
            PrCategory::Dependencies
        );
        assert_eq!(
            categorize("", "dependabot/npm/lodash", &commits),
            PrCategory::Dependencies
        );
        assert_eq!(
            categorize("Signed-off-by: dependabot[bot]", "x", &commits),
            PrCategory::Dependencies
        );
    }

    #[test]
    fn test_categorize_tie_uses_priority() {
        let commits = vec![parsed("a", "docs: guide"), parsed("b", "fix: bug")];
        assert_eq!(categorize("", "x", &commits), PrCategory::Bugfixes);
    }
}
