//! SemVer version strategy

use std::cmp::Ordering;

use tagsmith_core::error::{Result, VersionError};

use crate::traits::VersionStrategy;
use crate::types::{BumpType, VersionComponents};

/// Semantic Versioning strategy
///
/// Follows the SemVer 2.0.0 specification: https://semver.org/
#[derive(Debug, Clone, Default)]
pub struct SemVerStrategy;

impl SemVerStrategy {
    /// Create a new SemVer strategy
    pub fn new() -> Self {
        Self
    }

    /// Parse into a `semver::Version`, tolerating a leading `v`
    pub fn parse_version(version: &str) -> Result<semver::Version> {
        let trimmed = version.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);

        semver::Version::parse(trimmed).map_err(|e| {
            VersionError::InvalidVersion {
                version: version.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

impl VersionStrategy for SemVerStrategy {
    fn parse(&self, version: &str) -> Result<VersionComponents> {
        Self::parse_version(version).map(|v| VersionComponents::from(&v))
    }

    fn format(&self, components: &VersionComponents) -> String {
        components.to_version_string()
    }

    fn bump(&self, current: &VersionComponents, bump_type: BumpType) -> Result<VersionComponents> {
        let mut result = current.clone();

        match bump_type {
            BumpType::Major => {
                result.major += 1;
                result.minor = 0;
                result.patch = 0;
            }
            BumpType::Minor => {
                result.minor += 1;
                result.patch = 0;
            }
            BumpType::Patch => {
                result.patch += 1;
            }
            BumpType::Synced | BumpType::None => return Ok(result),
        }

        // A release never carries the old pre-release or build tags
        result.prerelease = None;
        result.build = None;

        Ok(result)
    }

    fn compare(&self, a: &str, b: &str) -> Result<Ordering> {
        let va = Self::parse_version(a)?;
        let vb = Self::parse_version(b)?;
        Ok(va.cmp(&vb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagsmith_core::TagsmithError;

    #[test]
    fn test_parse_with_v_prefix() {
        let strategy = SemVerStrategy::new();
        let v = strategy.parse("v1.2.3").unwrap();

        assert_eq!((v.major, v.minor, v.patch), (1, 2, 3));
    }

    #[test]
    fn test_parse_non_numeric_component() {
        let strategy = SemVerStrategy::new();
        let err = strategy.parse("1.x.3").unwrap_err();

        assert!(matches!(
            err,
            TagsmithError::Version(VersionError::InvalidVersion { ref version, .. }) if version == "1.x.3"
        ));
        assert!(!strategy.is_valid("1.2"));
    }

    #[test]
    fn test_bump_zeroes_lower_components() {
        let strategy = SemVerStrategy::new();
        let current = VersionComponents::new(1, 2, 3);

        assert_eq!(strategy.bump(&current, BumpType::Major).unwrap().to_string(), "2.0.0");
        assert_eq!(strategy.bump(&current, BumpType::Minor).unwrap().to_string(), "1.3.0");
        assert_eq!(strategy.bump(&current, BumpType::Patch).unwrap().to_string(), "1.2.4");
        assert_eq!(strategy.bump(&current, BumpType::None).unwrap(), current);
    }

    #[test]
    fn test_bump_drops_prerelease() {
        let strategy = SemVerStrategy::new();
        let current = VersionComponents::new(1, 2, 3).with_prerelease("rc.1");
        let next = strategy.bump(&current, BumpType::Patch).unwrap();

        assert_eq!(next.to_string(), "1.2.4");
    }

    #[test]
    fn test_compare() {
        let strategy = SemVerStrategy::new();

        assert_eq!(strategy.compare("1.0.0", "1.0.1").unwrap(), Ordering::Less);
        assert_eq!(strategy.compare("1.10.0", "1.9.1").unwrap(), Ordering::Greater);
        assert_eq!(strategy.compare("v1.0.0", "1.0.0").unwrap(), Ordering::Equal);
        assert!(strategy.compare("1.0.0", "one").is_err());
    }
}
