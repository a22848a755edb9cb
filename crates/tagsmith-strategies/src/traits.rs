//! Version strategy traits

use tagsmith_core::error::Result;

use crate::types::{BumpSignal, BumpType, VersionComponents};

/// Trait for version strategies
pub trait VersionStrategy: Send + Sync {
    /// Parse a version string into components
    fn parse(&self, version: &str) -> Result<VersionComponents>;

    /// Format version components into a string
    fn format(&self, components: &VersionComponents) -> String;

    /// Bump the version according to the bump type
    fn bump(&self, current: &VersionComponents, bump_type: BumpType) -> Result<VersionComponents>;

    /// Determine the bump type from a non-empty set of commits.
    ///
    /// Any breaking commit wins, then any `feat`; everything else is a patch.
    fn determine_bump_type(&self, commits: &[&dyn BumpSignal]) -> BumpType {
        if commits.iter().any(|c| c.is_breaking()) {
            BumpType::Major
        } else if commits.iter().any(|c| c.commit_type() == "feat") {
            BumpType::Minor
        } else {
            BumpType::Patch
        }
    }

    /// Check if a version string is valid for this strategy
    fn is_valid(&self, version: &str) -> bool {
        self.parse(version).is_ok()
    }

    /// Compare two versions
    fn compare(&self, a: &str, b: &str) -> Result<std::cmp::Ordering>;
}
