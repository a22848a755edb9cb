//! Reading and parsing commits from git

use std::sync::Arc;

use tracing::{debug, instrument};

use tagsmith_core::Result;
use tagsmith_git::GitBackend;

use crate::parser::{CommitParser, ConventionalParser};
use crate::pr::PrResolver;
use crate::types::ParsedCommit;

/// Reads commits by hash and turns them into [`ParsedCommit`]s
pub struct GitCommitReader<G: GitBackend> {
    git: G,
    parser: Arc<dyn CommitParser>,
    resolver: PrResolver,
}

impl<G: GitBackend> GitCommitReader<G> {
    /// Create a reader using the conventional commit parser
    pub fn new(git: G) -> Self {
        Self {
            git,
            parser: Arc::new(ConventionalParser::new()),
            resolver: PrResolver::new(),
        }
    }

    /// The underlying git backend
    pub fn git(&self) -> &G {
        &self.git
    }

    /// Read a commit without resolving pull requests
    pub fn read_plain(&self, hash: &str) -> Result<ParsedCommit> {
        let raw = self.git.show_commit(hash)?;
        let message = self.parser.parse(&raw.message);
        Ok(ParsedCommit::new(message, raw.info))
    }

    /// Read a commit, resolving its pull request when the subject is a merge
    #[instrument(skip(self))]
    pub fn parse_by_hash(&self, hash: &str) -> Result<ParsedCommit> {
        let commit = self.read_plain(hash)?;
        if commit.message.is_merge {
            return Ok(self.attach_pr(commit));
        }
        debug!(commit_type = %commit.message.commit_type, "parsed commit");
        Ok(commit)
    }

    /// Read a commit known to have several parents and resolve its pull request
    #[instrument(skip(self))]
    pub fn read_merge(&self, hash: &str) -> Result<ParsedCommit> {
        let commit = self.read_plain(hash)?;
        Ok(self.attach_pr(commit))
    }

    fn attach_pr(&self, mut commit: ParsedCommit) -> ParsedCommit {
        commit.pr = self
            .resolver
            .resolve(&self.git, &commit, |h| self.read_plain(h));
        commit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagsmith_core::error::GitError;
    use tagsmith_core::{PrCategory, TagsmithError};
    use tagsmith_git::mock::MockGit;
    use tagsmith_git::test_support::FixtureRepo;

    fn pr_repo() -> MockGit {
        let mut git = MockGit::new();
        git.commit("base", "chore: init", &["README.md"])
            .commit_with_parents("f1", "feat(ui): add login form", &["base"], &["packages/ui/a.ts"])
            .commit_with_parents("f2", "fix(ui): validate email", &["f1"], &["packages/ui/b.ts"])
            .commit_with_parents("f3", "feat(ui): remember me", &["f2"], &["packages/ui/c.ts"])
            .merge(
                "m1",
                "Merge pull request #12 from alice:feature/login\n\nLogin page",
                "f3",
            );
        git
    }

    #[test]
    fn test_parse_plain_commit() {
        let git = pr_repo();
        let reader = GitCommitReader::new(&git);
        let commit = reader.parse_by_hash("f1").unwrap();

        assert_eq!(commit.message.commit_type, "feat");
        assert_eq!(commit.info.author.as_deref(), Some("Test <test@example.com>"));
        assert!(commit.pr.is_none());
    }

    #[test]
    fn test_parse_merge_resolves_pr() {
        let git = pr_repo();
        let reader = GitCommitReader::new(&git);
        let merge = reader.parse_by_hash("m1").unwrap();

        let pr = merge.pr.expect("merge should resolve to a PR");
        assert_eq!(pr.pr_number, "12");
        assert_eq!(pr.pr_branch_name, "feature/login");
        assert_eq!(pr.pr_category, PrCategory::Features);
        assert_eq!(pr.pr_stats.commit_count, 3);
        let hashes: Vec<&str> = pr.pr_commits.iter().map(|c| c.hash()).collect();
        assert_eq!(hashes, vec!["f3", "f2", "f1"]);
    }

    #[test]
    fn test_squashed_single_commit_pr() {
        let mut git = MockGit::new();
        git.commit("base", "chore: init", &["README.md"])
            .commit_with_parents("s1", "fix: handle timeout", &["base"], &["src/net.rs"])
            .merge("m2", "Merge pull request #8 from bob/timeouts", "s1");

        let reader = GitCommitReader::new(&git);
        let pr = reader.parse_by_hash("m2").unwrap().pr.unwrap();

        assert_eq!(pr.pr_commits.len(), 1);
        assert!(pr.pr_commits[0]
            .message
            .description
            .starts_with("Squashed changes from PR ("));
        assert_eq!(pr.pr_category, PrCategory::Bugfixes);
    }

    #[test]
    fn test_unreadable_pr_commit_becomes_placeholder() {
        let mut git = pr_repo();
        git.break_commit("f2");

        let reader = GitCommitReader::new(&git);
        let pr = reader.parse_by_hash("m1").unwrap().pr.unwrap();

        assert_eq!(pr.pr_stats.commit_count, 3);
        let broken = pr.pr_commits.iter().find(|c| c.hash() == "f2").unwrap();
        assert_eq!(broken.message.commit_type, "other");
    }

    #[test]
    fn test_merge_without_number_has_no_pr() {
        let mut git = MockGit::new();
        git.commit("base", "chore: init", &["a"])
            .commit_with_parents("x1", "feat: side work", &["base"], &["b"])
            .merge("m3", "Merge branch 'dev'", "x1");

        let reader = GitCommitReader::new(&git);
        let merge = reader.parse_by_hash("m3").unwrap();
        assert!(merge.message.is_merge);
        assert!(merge.pr.is_none());
    }

    #[test]
    fn test_pr_commits_from_real_repository() {
        let fixture = FixtureRepo::new();
        let base = fixture.commit("chore: init", &[("README.md", "readme")]);
        let f1 = fixture.commit_on(&base, "feat(ui): add login form", &[("ui/a.ts", "a")]);
        let f2 = fixture.commit_on(&f1, "fix(ui): validate email", &[("ui/b.ts", "b")]);
        let regular = fixture.merge(&f2, "Merge pull request #12 from alice:feature/login");
        let s1 = fixture.commit_on(&regular, "fix: handle timeout", &[("net.rs", "n")]);
        let squash = fixture.merge(&s1, "Merge pull request #8 from bob/timeouts");

        let reader = GitCommitReader::new(fixture.repo());

        let pr = reader.read_merge(&regular).unwrap().pr.unwrap();
        assert_eq!(pr.pr_number, "12");
        assert_eq!(pr.pr_branch_name, "feature/login");
        assert_eq!(pr.pr_stats.commit_count, 2);
        let mut hashes: Vec<&str> = pr.pr_commits.iter().map(|c| c.hash()).collect();
        hashes.sort();
        let mut expected = vec![f1.as_str(), f2.as_str()];
        expected.sort();
        assert_eq!(hashes, expected);
        assert_eq!(pr.pr_commits[0].info.author.as_deref(), Some("Test"));

        let pr = reader.read_merge(&squash).unwrap().pr.unwrap();
        assert_eq!(pr.pr_number, "8");
        assert_eq!(pr.pr_commits.len(), 1);
        assert_eq!(pr.pr_commits[0].hash(), s1);
        assert_eq!(
            pr.pr_commits[0].message.description,
            "Squashed changes from PR (#8): handle timeout"
        );
        assert_eq!(pr.pr_category, PrCategory::Bugfixes);
    }

    #[test]
    fn test_unknown_hash_is_lookup_error() {
        let git = MockGit::new();
        let err = GitCommitReader::new(&git).parse_by_hash("nope").unwrap_err();
        assert!(matches!(err, TagsmithError::Git(GitError::CommitLookup { .. })));
    }
}
