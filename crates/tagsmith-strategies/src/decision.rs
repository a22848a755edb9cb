//! Version decision: should a package be released, and as which version

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use tagsmith_core::error::{Result, VersionError};

use crate::semver::SemVerStrategy;
use crate::traits::VersionStrategy;
use crate::types::{BumpSignal, BumpType};

/// Result of a version decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionData {
    /// Version the decision started from
    pub current_version: String,
    /// Kind of bump decided
    pub bump_type: BumpType,
    /// Whether the caller should write the target version and tag it
    pub should_bump: bool,
    /// Version the package should be released as
    pub target_version: String,
    /// Human-readable explanation
    pub reason: String,
}

impl VersionData {
    fn unchanged(current: &str, bump_type: BumpType, reason: impl Into<String>) -> Self {
        Self {
            current_version: current.to_string(),
            bump_type,
            should_bump: false,
            target_version: current.to_string(),
            reason: reason.into(),
        }
    }
}

/// Repository facts the decision depends on
#[derive(Debug, Clone, Default)]
pub struct DecisionContext {
    /// Package name, used in messages
    pub package: String,
    /// Version currently written in the package manifest
    pub manifest_version: Option<String>,
    /// Version of the package's newest tag
    pub last_tag_version: Option<String>,
    /// Existing package tags, keyed by version
    pub tags: BTreeMap<String, String>,
}

impl DecisionContext {
    /// Create a context for a package
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            ..Default::default()
        }
    }

    /// Set the on-disk manifest version
    pub fn with_manifest_version(mut self, version: impl Into<String>) -> Self {
        self.manifest_version = Some(version.into());
        self
    }

    /// Set the newest tagged version
    pub fn with_last_tag_version(mut self, version: impl Into<String>) -> Self {
        self.last_tag_version = Some(version.into());
        self
    }

    /// Record an existing tag for a version
    pub fn with_tag(mut self, version: impl Into<String>, tag_name: impl Into<String>) -> Self {
        self.tags.insert(version.into(), tag_name.into());
        self
    }
}

/// Computes bump type and target version for a set of commits
#[derive(Clone)]
pub struct VersionDecisionEngine {
    strategy: Arc<dyn VersionStrategy>,
}

impl VersionDecisionEngine {
    /// Create an engine using semantic versioning
    pub fn new() -> Self {
        Self {
            strategy: Arc::new(SemVerStrategy::new()),
        }
    }

    /// Decide the next version of a package.
    ///
    /// A package without a release tag but with a manifest version is
    /// `Synced` at that version, so re-running before tagging is stable.
    /// Fails on a malformed current or manifest version, and when the manifest
    /// was bumped past the last tag to something other than the computed target.
    #[instrument(skip(self, commits, ctx), fields(package = %ctx.package, commit_count = commits.len()))]
    pub fn decide<C: BumpSignal>(
        &self,
        current: &str,
        commits: &[C],
        ctx: &DecisionContext,
    ) -> Result<VersionData> {
        if commits.is_empty() {
            debug!("no commits, nothing to release");
            return Ok(VersionData::unchanged(current, BumpType::None, "No commits in range"));
        }

        // An untagged package releases its manifest version first
        if let (None, Some(manifest)) = (&ctx.last_tag_version, &ctx.manifest_version) {
            let manifest = self.strategy.format(&self.strategy.parse(manifest)?);
            if let Some(tag) = ctx.tags.get(&manifest) {
                return Ok(VersionData::unchanged(
                    current,
                    BumpType::None,
                    format!("Version {} already exists as tag {}", manifest, tag),
                ));
            }
            info!(target = %manifest, "untagged package, releasing manifest version");
            return Ok(VersionData {
                current_version: current.to_string(),
                bump_type: BumpType::Synced,
                should_bump: false,
                target_version: manifest.clone(),
                reason: format!("{} has no release tag; first release is {}", ctx.package, manifest),
            });
        }

        let signals: Vec<&dyn BumpSignal> = commits.iter().map(|c| c as &dyn BumpSignal).collect();
        let bump_type = self.strategy.determine_bump_type(&signals);

        let current_components = self.strategy.parse(current)?;
        let target_components = self.strategy.bump(&current_components, bump_type)?;
        let target = self.strategy.format(&target_components);
        let current_normalized = self.strategy.format(&current_components);

        if let Some(tag) = ctx.tags.get(&target) {
            info!(target = %target, tag = %tag, "target version already tagged");
            return Ok(VersionData::unchanged(
                current,
                BumpType::None,
                format!("Version {} already exists as tag {}", target, tag),
            ));
        }

        if target == current_normalized {
            return Ok(VersionData::unchanged(
                current,
                BumpType::None,
                format!("Version {} is already current", target),
            ));
        }

        if let Some(manifest) = &ctx.manifest_version {
            let manifest_cmp = self.strategy.compare(manifest, &target)?;
            if manifest_cmp == Ordering::Equal {
                info!(target = %target, "manifest already at target version");
                return Ok(VersionData {
                    current_version: current.to_string(),
                    bump_type: BumpType::Synced,
                    should_bump: false,
                    target_version: target.clone(),
                    reason: format!("Package version already matches target {}", target),
                });
            }

            if let Some(tagged) = &ctx.last_tag_version {
                if self.strategy.compare(manifest, tagged)? == Ordering::Greater {
                    return Err(VersionError::Drift {
                        package: ctx.package.clone(),
                        manifest_version: manifest.clone(),
                        tagged_version: tagged.clone(),
                        target_version: target,
                    }
                    .into());
                }
            }
        }

        info!(bump = %bump_type, target = %target, "version bump decided");
        Ok(VersionData {
            current_version: current.to_string(),
            bump_type,
            should_bump: true,
            target_version: target.clone(),
            reason: format!(
                "{} bump from {} commit(s): {} -> {}",
                bump_type,
                commits.len(),
                current,
                target
            ),
        })
    }
}

impl Default for VersionDecisionEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagsmith_core::TagsmithError;

    struct Commit(&'static str, bool);

    impl BumpSignal for Commit {
        fn commit_type(&self) -> &str {
            self.0
        }

        fn is_breaking(&self) -> bool {
            self.1
        }
    }

    fn decide(current: &str, commits: &[Commit], ctx: &DecisionContext) -> Result<VersionData> {
        VersionDecisionEngine::new().decide(current, commits, ctx)
    }

    #[test]
    fn test_empty_range() {
        let data = decide("1.0.0", &[], &DecisionContext::new("ui")).unwrap();
        assert_eq!(data.bump_type, BumpType::None);
        assert!(!data.should_bump);
        assert_eq!(data.reason, "No commits in range");
    }

    #[test]
    fn test_feat_beats_fix() {
        let commits = [Commit("feat", false), Commit("fix", false)];
        let data = decide("1.2.3", &commits, &DecisionContext::new("core")).unwrap();

        assert_eq!(data.bump_type, BumpType::Minor);
        assert_eq!(data.target_version, "1.3.0");
        assert!(data.should_bump);
    }

    #[test]
    fn test_breaking_always_major() {
        let sets: [&[Commit]; 3] = [
            &[Commit("fix", true)],
            &[Commit("feat", false), Commit("docs", true)],
            &[Commit("chore", false), Commit("feat", false), Commit("refactor", true)],
        ];

        for commits in sets {
            let data = decide("0.4.1", commits, &DecisionContext::new("ui")).unwrap();
            assert_eq!(data.bump_type, BumpType::Major);
            assert_eq!(data.target_version, "1.0.0");
        }
    }

    #[test]
    fn test_other_types_patch() {
        let commits = [Commit("docs", false), Commit("other", false)];
        let data = decide("2.0.0", &commits, &DecisionContext::new("ui")).unwrap();
        assert_eq!(data.bump_type, BumpType::Patch);
        assert_eq!(data.target_version, "2.0.1");
    }

    #[test]
    fn test_target_greater_than_current_when_bumping() {
        let engine = VersionDecisionEngine::new();
        let strategy = SemVerStrategy::new();
        for current in ["0.0.0", "0.9.9", "1.2.3", "10.0.99", "3.1.0-rc.2"] {
            for commits in [
                vec![Commit("fix", false)],
                vec![Commit("feat", false)],
                vec![Commit("feat", true)],
            ] {
                let data = engine
                    .decide(current, &commits, &DecisionContext::new("ui"))
                    .unwrap();
                assert!(data.should_bump);
                assert_eq!(
                    strategy.compare(&data.target_version, current).unwrap(),
                    Ordering::Greater
                );
            }
        }
    }

    #[test]
    fn test_malformed_current_version() {
        let err = decide("1.two.3", &[Commit("fix", false)], &DecisionContext::new("ui")).unwrap_err();
        assert!(matches!(err, TagsmithError::Version(VersionError::InvalidVersion { .. })));
        assert!(err.to_string().contains("1.two.3"));
    }

    #[test]
    fn test_target_already_tagged() {
        let ctx = DecisionContext::new("ui")
            .with_last_tag_version("1.0.0")
            .with_tag("1.0.0", "ui@1.0.0")
            .with_tag("1.1.0", "ui@1.1.0");
        let data = decide("1.0.0", &[Commit("feat", false)], &ctx).unwrap();

        assert_eq!(data.bump_type, BumpType::None);
        assert!(!data.should_bump);
        assert!(data.reason.contains("ui@1.1.0"));
    }

    #[test]
    fn test_manifest_synced() {
        let ctx = DecisionContext::new("ui")
            .with_last_tag_version("1.0.0")
            .with_manifest_version("1.1.0");
        let data = decide("1.0.0", &[Commit("feat", false)], &ctx).unwrap();

        assert_eq!(data.bump_type, BumpType::Synced);
        assert!(!data.should_bump);
        assert_eq!(data.target_version, "1.1.0");
    }

    #[test]
    fn test_manifest_drift() {
        let ctx = DecisionContext::new("ui")
            .with_last_tag_version("1.0.0")
            .with_manifest_version("3.0.0");
        let err = decide("1.0.0", &[Commit("fix", false)], &ctx).unwrap_err();

        let msg = err.to_string();
        assert!(matches!(err, TagsmithError::Version(VersionError::Drift { .. })));
        assert!(msg.contains("ui"));
        assert!(msg.contains("3.0.0"));
        assert!(msg.contains("1.0.1"));
    }

    #[test]
    fn test_manifest_behind_tag_is_not_drift() {
        let ctx = DecisionContext::new("ui")
            .with_last_tag_version("1.0.0")
            .with_manifest_version("0.9.0");
        let data = decide("1.0.0", &[Commit("fix", false)], &ctx).unwrap();
        assert!(data.should_bump);
    }

    #[test]
    fn test_untagged_package_releases_manifest_version() {
        let ctx = DecisionContext::new("lib").with_manifest_version("0.3.0");
        let commits = [Commit("feat", false)];

        let first = decide("0.3.0", &commits, &ctx).unwrap();
        assert_eq!(first.bump_type, BumpType::Synced);
        assert!(!first.should_bump);
        assert_eq!(first.target_version, "0.3.0");
        assert!(first.reason.contains("no release tag"));

        // Same git state, same answer
        let second = decide("0.3.0", &commits, &ctx).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_untagged_manifest_version_tagged_elsewhere() {
        let ctx = DecisionContext::new("lib")
            .with_manifest_version("0.3.0")
            .with_tag("0.3.0", "lib@0.3.0");
        let data = decide("0.3.0", &[Commit("fix", false)], &ctx).unwrap();

        assert_eq!(data.bump_type, BumpType::None);
        assert!(data.reason.contains("lib@0.3.0"));
    }

    #[test]
    fn test_untagged_without_manifest_bumps() {
        let data = decide("0.0.0", &[Commit("feat", false)], &DecisionContext::new("lib")).unwrap();
        assert_eq!(data.bump_type, BumpType::Minor);
        assert_eq!(data.target_version, "0.1.0");
    }

    #[test]
    fn test_decision_is_repeatable() {
        let ctx = DecisionContext::new("ui").with_last_tag_version("1.0.0");
        let commits = [Commit("fix", false)];
        let first = decide("1.0.0", &commits, &ctx).unwrap();
        let second = decide("1.0.0", &commits, &ctx).unwrap();
        assert_eq!(first, second);
    }
}
