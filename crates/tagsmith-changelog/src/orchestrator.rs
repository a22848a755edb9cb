//! Per-package changelog orchestration
//!
//! [`PackageChangelog`] resolves a commit range for one package, splits it
//! into pull requests and direct commits, buckets them by release tag, runs
//! the version decision on the unreleased bucket and renders the result.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, instrument};

use tagsmith_core::config::Config;
use tagsmith_core::error::{ChangelogError, Result, TagsmithError, WorkflowError};
use tagsmith_git::{GitBackend, LogQuery, PackageTag, TagPattern};
use tagsmith_strategies::{BumpType, DecisionContext, VersionData, VersionDecisionEngine};

use crate::formatter::ChangelogTemplate;
use crate::reader::GitCommitReader;
use crate::types::{ChangelogData, ParsedCommit, VersionContent, UNRELEASED};

/// The package a changelog is built for
#[derive(Debug, Clone)]
pub struct PackageTarget {
    /// Package name, as used in tags
    pub name: String,
    /// Package directory relative to the repository root; `""` or `.` is the whole repository
    pub path: PathBuf,
    /// Version currently in the package manifest
    pub manifest_version: Option<String>,
}

impl PackageTarget {
    /// Create a target
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            manifest_version: None,
        }
    }

    /// Set the manifest version
    pub fn with_manifest_version(mut self, version: impl Into<String>) -> Self {
        self.manifest_version = Some(version.into());
        self
    }

    fn is_repository_root(&self) -> bool {
        self.path.as_os_str().is_empty() || self.path == Path::new(".")
    }
}

struct RangeResult {
    data: ChangelogData,
    version_data: VersionData,
    commit_count: usize,
}

enum State {
    Uninitialized,
    Ranged(RangeResult),
    Failed(String),
}

/// A commit bucket: everything between one release tag and the next
struct Bucket {
    label: String,
    date: Option<String>,
    commits: Vec<ParsedCommit>,
}

/// Changelog and version decision for one package
pub struct PackageChangelog<G: GitBackend> {
    reader: GitCommitReader<G>,
    target: PackageTarget,
    tag_pattern: TagPattern,
    template: Arc<dyn ChangelogTemplate>,
    engine: VersionDecisionEngine,
    include_dates: bool,
    state: State,
}

impl<G: GitBackend> PackageChangelog<G> {
    /// Create an orchestrator; nothing is read until [`Self::set_range`]
    pub fn new(
        git: G,
        target: PackageTarget,
        config: &Config,
        template: Arc<dyn ChangelogTemplate>,
    ) -> Self {
        let tag_pattern = TagPattern::new(&config.versioning.tag_format, &target.name);
        Self {
            reader: GitCommitReader::new(git),
            target,
            tag_pattern,
            template,
            engine: VersionDecisionEngine::new(),
            include_dates: config.changelog.include_dates,
            state: State::Uninitialized,
        }
    }

    /// The package being processed
    pub fn target(&self) -> &PackageTarget {
        &self.target
    }

    /// Resolve the commit range `from..to` and decide the next version.
    ///
    /// When `from` is `None` the range starts at the newest package tag
    /// reachable from `to`, or covers the whole history when there is none.
    /// The next version is always computed from that reachable tag, else the
    /// manifest version; an explicit `from` only widens the commit range.
    /// May be called again to recompute; after a failure the changelog is
    /// unusable.
    #[instrument(skip(self), fields(package = %self.target.name))]
    pub fn set_range(&mut self, from: Option<&str>, to: &str) -> Result<&VersionData> {
        if let State::Failed(reason) = &self.state {
            return Err(self.state_error(format!("an earlier set_range failed: {}", reason)));
        }

        let start = Instant::now();
        match self.compute_range(from, to) {
            Ok(result) => {
                info!(
                    commit_count = result.commit_count,
                    versions = result.data.len(),
                    bump = %result.version_data.bump_type,
                    target = %result.version_data.target_version,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "range resolved"
                );
                self.state = State::Ranged(result);
            }
            Err(e) => {
                self.state = State::Failed(e.to_string());
                return Err(e);
            }
        }

        self.version_data()
    }

    /// Render only the freshly computed versions
    pub fn generate_changelog(&self) -> Result<String> {
        let range = self.ranged()?;
        Ok(self.template.render(&range.data))
    }

    /// Render the computed versions over an existing changelog.
    ///
    /// Versions present in both are replaced. The existing `[Unreleased]`
    /// section is dropped only when this range produced a new one or turned
    /// it into a release; otherwise it is kept as written.
    pub fn generate_merged_changelog(&self, existing: &str) -> Result<String> {
        let range = self.ranged()?;
        let mut current = self.template.parse(existing);
        if range.data.contains(UNRELEASED) || range.version_data.bump_type != BumpType::None {
            current.remove(UNRELEASED);
        }
        let merged = current.merge(range.data.clone());
        debug!(versions = merged.len(), "merged changelog");
        Ok(self.template.render(&merged))
    }

    /// Merge with the changelog file at `path`; a missing file counts as empty
    pub fn merge_with_file(&self, path: &Path) -> Result<String> {
        let existing = if path.exists() {
            std::fs::read_to_string(path).map_err(ChangelogError::Io)?
        } else {
            String::new()
        };
        self.generate_merged_changelog(&existing)
    }

    /// Merge with the changelog file at `path` and write the result back
    #[instrument(skip(self), fields(package = %self.target.name))]
    pub fn write_merged(&self, path: &Path) -> Result<String> {
        let content = self.merge_with_file(path)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ChangelogError::WriteFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }
        std::fs::write(path, &content).map_err(|e| ChangelogError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        info!(path = %path.display(), "changelog written");
        Ok(content)
    }

    /// The version decision of the last range
    pub fn version_data(&self) -> Result<&VersionData> {
        Ok(&self.ranged()?.version_data)
    }

    /// Number of commits in the last range, PRs counted by their enclosed commits
    pub fn commit_count(&self) -> Result<usize> {
        Ok(self.ranged()?.commit_count)
    }

    /// Computed changelog data of the last range
    pub fn data(&self) -> Result<&ChangelogData> {
        Ok(&self.ranged()?.data)
    }

    fn ranged(&self) -> Result<&RangeResult> {
        match &self.state {
            State::Ranged(result) => Ok(result),
            State::Uninitialized => Err(self.state_error("call set_range first")),
            State::Failed(reason) => {
                Err(self.state_error(format!("set_range failed: {}", reason)))
            }
        }
    }

    fn state_error(&self, message: impl Into<String>) -> TagsmithError {
        WorkflowError::State {
            package: self.target.name.clone(),
            message: message.into(),
        }
        .into()
    }

    fn compute_range(&self, from: Option<&str>, to: &str) -> Result<RangeResult> {
        let git = self.reader.git();
        let tags = self.tag_pattern.package_tags(git.tags()?);
        let to_hash = git.rev_parse(to)?;
        let base_tag = newest_reachable(git, &tags, &to_hash)?;

        let from = match from {
            Some(from) => Some(from.to_string()),
            None => base_tag.map(|t| t.tag.name.clone()),
        };
        let from_hash = match &from {
            Some(rev) => Some(git.rev_parse(rev)?),
            None => None,
        };

        let range = LogQuery::range(from_hash.as_deref(), to_hash);
        let all = git.log_hashes(&range)?;
        let package_set: HashSet<String> = if self.target.is_repository_root() {
            all.iter().cloned().collect()
        } else {
            git.log_hashes(&range.clone().touching(&self.target.path))?
                .into_iter()
                .collect()
        };
        let merges = git.log_hashes(&range.clone().merges())?;
        debug!(
            from = ?from,
            total = all.len(),
            package = package_set.len(),
            merges = merges.len(),
            "listed range"
        );

        let merge_set: HashSet<&str> = merges.iter().map(String::as_str).collect();
        let mut kept: HashMap<String, ParsedCommit> = HashMap::new();
        let mut claimed: HashSet<String> = HashSet::new();

        for hash in &merges {
            let mut merge = self.reader.read_merge(hash)?;
            let relevant = match merge.pr.as_mut() {
                Some(pr) => {
                    let enclosed: Vec<String> =
                        pr.pr_commits.iter().map(|c| c.hash().to_string()).collect();
                    let touches = enclosed.iter().any(|h| package_set.contains(h));
                    claimed.extend(enclosed.iter().cloned());

                    if touches {
                        pr.pr_commits.retain(|c| package_set.contains(c.hash()));
                        pr.pr_stats.commit_count = pr.pr_commits.len();
                        true
                    } else {
                        enclosed.is_empty() && package_set.contains(hash)
                    }
                }
                None => package_set.contains(hash),
            };

            if relevant {
                kept.insert(hash.clone(), merge);
            }
        }

        let tag_commits = tag_commits(&tags);
        let mut buckets = vec![Bucket {
            label: UNRELEASED.to_string(),
            date: None,
            commits: Vec::new(),
        }];

        for hash in &all {
            if let Some(tag) = tag_commits.get(hash.as_str()) {
                buckets.push(Bucket {
                    label: tag.version.to_string(),
                    date: tag.tag.date().filter(|_| self.include_dates),
                    commits: Vec::new(),
                });
            }

            let commit = if let Some(merge) = kept.remove(hash) {
                merge
            } else if package_set.contains(hash)
                && !merge_set.contains(hash.as_str())
                && !claimed.contains(hash)
            {
                self.reader.read_plain(hash)?
            } else {
                continue;
            };

            if let Some(bucket) = buckets.last_mut() {
                bucket.commits.push(commit);
            }
        }

        let unreleased: Vec<&ParsedCommit> = buckets[0]
            .commits
            .iter()
            .flat_map(|c| c.effective_commits())
            .collect();

        let current = base_tag
            .map(|t| t.version.to_string())
            .or_else(|| self.target.manifest_version.clone())
            .unwrap_or_else(|| "0.0.0".to_string());

        let mut ctx = DecisionContext::new(&self.target.name);
        if let Some(manifest) = &self.target.manifest_version {
            ctx = ctx.with_manifest_version(manifest);
        }
        if let Some(tag) = base_tag {
            ctx = ctx.with_last_tag_version(tag.version.to_string());
        }
        for tag in &tags {
            ctx = ctx.with_tag(tag.version.to_string(), &tag.tag.name);
        }

        let version_data = self.engine.decide(&current, &unreleased, &ctx)?;

        if version_data.bump_type != BumpType::None {
            buckets[0].label = version_data.target_version.clone();
            if self.include_dates {
                buckets[0].date = Some(Utc::now().format("%Y-%m-%d").to_string());
            }
        }

        let mut data = ChangelogData::new();
        let mut commit_count = 0;
        for bucket in buckets.into_iter().filter(|b| !b.commits.is_empty()) {
            commit_count += bucket
                .commits
                .iter()
                .map(|c| c.effective_commits().len())
                .sum::<usize>();
            if let Some(date) = bucket.date {
                data.set_date(&bucket.label, date);
            }
            data.insert(bucket.label, VersionContent::Commits(bucket.commits));
        }

        Ok(RangeResult {
            data,
            version_data,
            commit_count,
        })
    }
}

/// The highest package tag whose commit is reachable from `to`
fn newest_reachable<'a, G: GitBackend>(
    git: &G,
    tags: &'a [PackageTag],
    to: &str,
) -> Result<Option<&'a PackageTag>> {
    for tag in tags {
        if git.is_ancestor(&tag.tag.commit_hash, to)? {
            return Ok(Some(tag));
        }
    }
    Ok(None)
}

/// Commit hash to the highest package tag pointing at it
fn tag_commits(tags: &[PackageTag]) -> HashMap<&str, &PackageTag> {
    let mut by_commit = HashMap::new();
    for tag in tags {
        by_commit.entry(tag.tag.commit_hash.as_str()).or_insert(tag);
    }
    by_commit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::{DefaultTemplate, TemplateOptions};
    use tagsmith_core::error::VersionError;
    use tagsmith_core::{PrCategory, TagsmithError};
    use tagsmith_git::mock::MockGit;
    use tempfile::TempDir;

    fn config() -> Config {
        let mut config = Config::default();
        config.changelog.include_dates = false;
        config
    }

    fn changelog<'a>(git: &'a MockGit, target: PackageTarget) -> PackageChangelog<&'a MockGit> {
        let template = Arc::new(DefaultTemplate::new(TemplateOptions::default()));
        PackageChangelog::new(git, target, &config(), template)
    }

    fn ui() -> PackageTarget {
        PackageTarget::new("ui", "packages/ui")
    }

    /// ui@1.0.0, then a PR touching ui and core, then direct commits
    fn monorepo() -> MockGit {
        let mut git = MockGit::new();
        git.commit("c1", "feat(ui): initial ui", &["packages/ui/index.ts"])
            .commit("c2", "feat(core): initial core", &["packages/core/lib.rs"])
            .tag("ui@1.0.0", "c2")
            .tag("core@1.0.0", "c2")
            .commit_with_parents("p1", "feat(ui): add login form", &["c2"], &["packages/ui/login.ts"])
            .commit_with_parents("p2", "fix(core): session expiry", &["p1"], &["packages/core/session.rs"])
            .merge("m1", "Merge pull request #12 from alice:feature/login", "p2")
            .commit("c3", "fix(ui): null check", &["packages/ui/index.ts"])
            .commit("c4", "docs(core): api docs", &["packages/core/README.md"]);
        git
    }

    #[test]
    fn test_set_range_from_last_tag() {
        let git = monorepo();
        let mut ui = changelog(&git, ui());
        let data = ui.set_range(None, "HEAD").unwrap().clone();

        assert_eq!(data.current_version, "1.0.0");
        assert_eq!(data.bump_type, BumpType::Minor);
        assert_eq!(data.target_version, "1.1.0");
        assert!(data.should_bump);
        // p1 through the PR and c3 directly
        assert_eq!(ui.commit_count().unwrap(), 2);

        let changelog = ui.data().unwrap();
        assert_eq!(changelog.versions(), vec!["1.1.0"]);
        let Some(VersionContent::Commits(commits)) = changelog.get("1.1.0") else {
            panic!("expected commits");
        };
        let hashes: Vec<&str> = commits.iter().map(|c| c.hash()).collect();
        assert_eq!(hashes, vec!["c3", "m1"]);

        let pr = commits[1].pr.as_ref().unwrap();
        assert_eq!(pr.pr_number, "12");
        assert_eq!(pr.pr_stats.commit_count, 1);
        assert_eq!(pr.pr_commits[0].hash(), "p1");
        assert_eq!(pr.pr_category, PrCategory::Features);
    }

    #[test]
    fn test_other_package_sees_its_own_commits() {
        let git = monorepo();
        let mut core = changelog(&git, PackageTarget::new("core", "packages/core"));
        let data = core.set_range(None, "HEAD").unwrap().clone();

        // fix in the PR plus a docs commit
        assert_eq!(data.bump_type, BumpType::Patch);
        assert_eq!(data.target_version, "1.0.1");
        assert_eq!(core.commit_count().unwrap(), 2);
    }

    #[test]
    fn test_orphans_exclude_pr_commits() {
        let git = monorepo();
        let mut ui = changelog(&git, ui());
        ui.set_range(None, "HEAD").unwrap();

        let Some(VersionContent::Commits(commits)) = ui.data().unwrap().get("1.1.0") else {
            panic!("expected commits");
        };
        assert!(commits.iter().all(|c| c.hash() != "p1"));
    }

    #[test]
    fn test_buckets_by_tag() {
        let mut git = MockGit::new();
        git.commit("c1", "feat: start", &["src/a"])
            .commit("c2", "fix: one", &["src/b"])
            .tag("app@1.0.0", "c2")
            .commit("c3", "feat: two", &["src/c"])
            .commit("c4", "fix: three", &["src/d"])
            .tag("app@1.1.0", "c4")
            .commit("c5", "fix: four", &["src/e"]);

        let mut app = changelog(&git, PackageTarget::new("app", "."));
        let data = app.set_range(Some("c1"), "HEAD").unwrap().clone();

        assert_eq!(data.target_version, "1.1.1");
        let versions = app.data().unwrap().versions();
        assert_eq!(versions, vec!["1.1.1", "1.1.0", "1.0.0"]);
        assert_eq!(app.commit_count().unwrap(), 4);

        let Some(VersionContent::Commits(commits)) = app.data().unwrap().get("1.1.0") else {
            panic!("expected commits");
        };
        assert_eq!(commits.len(), 2);
    }

    #[test]
    fn test_older_from_tag_versions_from_newest_tag() {
        let mut git = MockGit::new();
        git.commit("c1", "chore: init", &["src/a"])
            .tag("app@1.0.0", "c1")
            .commit("c2", "feat: two", &["src/b"])
            .tag("app@1.1.0", "c2")
            .commit("c3", "fix: later", &["src/c"]);

        let target = PackageTarget::new("app", ".").with_manifest_version("1.1.0");
        let mut app = changelog(&git, target);
        let data = app.set_range(Some("app@1.0.0"), "HEAD").unwrap().clone();

        assert_eq!(data.current_version, "1.1.0");
        assert_eq!(data.bump_type, BumpType::Patch);
        assert_eq!(data.target_version, "1.1.1");
        // The wider range still renders the released bucket
        assert_eq!(app.data().unwrap().versions(), vec!["1.1.1", "1.1.0"]);
    }

    #[test]
    fn test_tag_on_other_branch_is_not_the_base() {
        let mut git = MockGit::new();
        git.commit("c1", "chore: init", &["src/a"])
            .tag("app@1.0.0", "c1")
            .commit_with_parents("h1", "fix: hotfix", &["c1"], &["src/h"])
            .tag("app@2.0.0", "h1")
            .commit("c2", "feat: main line", &["src/b"]);

        let mut app = changelog(&git, PackageTarget::new("app", ""));
        let data = app.set_range(None, "HEAD").unwrap().clone();

        assert_eq!(data.current_version, "1.0.0");
        assert_eq!(data.target_version, "1.1.0");
        assert_eq!(app.commit_count().unwrap(), 1);
    }

    #[test]
    fn test_untagged_package_releases_manifest_version() {
        let mut git = MockGit::new();
        git.commit("c1", "feat: start", &["lib/a"]);

        let target = PackageTarget::new("lib", "lib").with_manifest_version("0.3.0");
        let mut lib = changelog(&git, target.clone());
        let data = lib.set_range(None, "HEAD").unwrap().clone();

        assert_eq!(data.current_version, "0.3.0");
        assert_eq!(data.bump_type, BumpType::Synced);
        assert!(!data.should_bump);
        assert_eq!(data.target_version, "0.3.0");
        assert_eq!(lib.data().unwrap().versions(), vec!["0.3.0"]);

        // A second run on the same history does not move the target
        let mut again = changelog(&git, target);
        assert_eq!(again.set_range(None, "HEAD").unwrap(), &data);
    }

    #[test]
    fn test_no_changes_keeps_unreleased_empty() {
        let git = monorepo();
        let mut ui = changelog(&git, ui());
        ui.set_range(None, "c2").unwrap();

        let data = ui.version_data().unwrap();
        assert_eq!(data.bump_type, BumpType::None);
        assert!(ui.data().unwrap().is_empty());
    }

    #[test]
    fn test_target_already_tagged() {
        let mut git = MockGit::new();
        git.commit("c1", "chore: init", &["src/a"])
            .tag("app@1.0.0", "c1")
            .commit_with_parents("h1", "fix: hotfix", &["c1"], &["src/h"])
            .tag("app@1.0.1", "h1")
            .commit("c2", "fix: bug", &["src/b"]);

        let mut app = changelog(&git, PackageTarget::new("app", ""));
        let data = app.set_range(None, "HEAD").unwrap().clone();

        assert_eq!(data.current_version, "1.0.0");
        assert!(!data.should_bump);
        assert_eq!(data.bump_type, BumpType::None);
        assert!(data.reason.contains("app@1.0.1"));
    }

    #[test]
    fn test_fix_after_newest_tag_bumps_past_it() {
        let mut git = MockGit::new();
        git.commit("c1", "chore: init", &["src/a"])
            .tag("app@1.0.0", "c1")
            .commit("c2", "fix: bug", &["src/b"])
            .tag("app@1.0.1", "c2")
            .commit("c3", "fix: other", &["src/c"]);

        let mut app = changelog(&git, PackageTarget::new("app", ""));
        let data = app.set_range(Some("app@1.0.0"), "HEAD").unwrap().clone();

        assert!(data.should_bump);
        assert_eq!(data.target_version, "1.0.2");
    }

    #[test]
    fn test_drift_fails_and_poisons() {
        let git = monorepo();
        let target = ui().with_manifest_version("3.0.0");
        let mut ui = changelog(&git, target);

        let err = ui.set_range(None, "HEAD").unwrap_err();
        assert!(matches!(err, TagsmithError::Version(VersionError::Drift { .. })));

        let err = ui.generate_changelog().unwrap_err();
        assert!(matches!(err, TagsmithError::Workflow(WorkflowError::State { .. })));
        assert!(ui.set_range(None, "HEAD").is_err());
    }

    #[test]
    fn test_calls_before_set_range() {
        let git = monorepo();
        let ui = changelog(&git, ui());

        let err = ui.generate_changelog().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("ui"));
        assert!(msg.contains("call set_range first"));
        assert!(ui.version_data().is_err());
        assert!(ui.commit_count().is_err());
        assert!(ui.generate_merged_changelog("").is_err());
    }

    #[test]
    fn test_unknown_revision_is_fatal() {
        let git = monorepo();
        let mut ui = changelog(&git, ui());
        let err = ui.set_range(Some("nope"), "HEAD").unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_set_range_is_idempotent() {
        let git = monorepo();
        let mut ui = changelog(&git, ui());

        let first = ui.set_range(None, "HEAD").unwrap().clone();
        let first_doc = ui.generate_changelog().unwrap();
        let second = ui.set_range(None, "HEAD").unwrap().clone();
        let second_doc = ui.generate_changelog().unwrap();

        assert_eq!(first, second);
        assert_eq!(first_doc, second_doc);
    }

    #[test]
    fn test_merged_changelog_replaces_stale_unreleased() {
        let git = monorepo();
        let mut ui = changelog(&git, ui());
        ui.set_range(None, "HEAD").unwrap();

        let existing = "# Changelog\n\n## [Unreleased]\n\n- stale\n\n## 1.0.0\n\nFirst release\n";
        let merged = ui.generate_merged_changelog(existing).unwrap();

        assert!(!merged.contains("stale"));
        assert!(merged.contains("## 1.1.0"));
        assert!(merged.ends_with("## 1.0.0\n\nFirst release\n"));
        assert_eq!(merged.matches("# Changelog").count(), 1);
    }

    #[test]
    fn test_merged_changelog_keeps_unreleased_without_changes() {
        let mut git = MockGit::new();
        git.commit("c1", "feat: start", &["src/a"]).tag("app@1.0.0", "c1");

        let mut app = changelog(&git, PackageTarget::new("app", "."));
        let data = app.set_range(None, "HEAD").unwrap().clone();
        assert_eq!(data.bump_type, BumpType::None);

        let existing =
            "# Changelog\n\n## [Unreleased]\n\n- manual note for next release\n\n## 1.0.0\n\nFirst\n";
        let merged = app.generate_merged_changelog(existing).unwrap();

        assert!(merged.contains("## [Unreleased]"));
        assert!(merged.contains("- manual note for next release"));
        assert!(merged.contains("## 1.0.0\n\nFirst"));
    }

    #[test]
    fn test_write_merged_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("packages/ui/CHANGELOG.md");

        let git = monorepo();
        let mut ui = changelog(&git, ui());
        ui.set_range(None, "HEAD").unwrap();

        let first = ui.write_merged(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);

        let second = ui.write_merged(&path).unwrap();
        assert_eq!(first, second);
    }
}
