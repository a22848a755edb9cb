//! Tag operations

use chrono::{TimeZone, Utc};
use semver::Version;
use tracing::{debug, instrument};

use crate::repository::{GitRepo, Result};
use crate::types::TagInfo;

impl GitRepo {
    /// Get all tags
    #[instrument(skip(self))]
    pub fn tags(&self) -> Result<Vec<TagInfo>> {
        let mut tags = Vec::new();

        self.repo.tag_foreach(|oid, name| {
            let name = String::from_utf8_lossy(name)
                .trim_start_matches("refs/tags/")
                .to_string();

            if let Ok(commit) = self.repo.find_commit(oid) {
                // Lightweight tag: date it by its commit
                let timestamp = Utc.timestamp_opt(commit.time().seconds(), 0).single();
                let mut tag_info = TagInfo::new(&name, commit.id().to_string());
                if let Some(timestamp) = timestamp {
                    tag_info = tag_info.with_timestamp(timestamp);
                }
                tags.push(tag_info);
            } else if let Ok(tag) = self.repo.find_tag(oid) {
                let target_id = tag
                    .target()
                    .and_then(|t| t.peel_to_commit())
                    .map(|c| c.id())
                    .unwrap_or_else(|_| tag.target_id());
                let mut tag_info = TagInfo::new(&name, target_id.to_string());

                if let Some(msg) = tag.message() {
                    tag_info = tag_info.with_message(msg.trim());
                }

                if let Some(tagger) = tag.tagger() {
                    if let Some(timestamp) =
                        Utc.timestamp_opt(tagger.when().seconds(), 0).single()
                    {
                        tag_info = tag_info.with_timestamp(timestamp);
                    }
                }

                tags.push(tag_info);
            }

            true
        })?;

        debug!(count = tags.len(), "listed all tags");
        Ok(tags)
    }
}

/// A tag that belongs to a package, with its parsed version
#[derive(Debug, Clone)]
pub struct PackageTag {
    /// The tag
    pub tag: TagInfo,
    /// Version encoded in the tag name
    pub version: Version,
}

/// Matches tag names produced by a tag format for one package.
///
/// The format uses `{package}` and `{version}` placeholders, e.g.
/// `{package}@{version}` or `v{version}`.
#[derive(Debug, Clone)]
pub struct TagPattern {
    prefix: String,
    suffix: String,
}

impl TagPattern {
    /// Build the pattern for a package
    pub fn new(format: &str, package: &str) -> Self {
        let format = format.replace("{package}", package);
        let (prefix, suffix) = match format.split_once("{version}") {
            Some((prefix, suffix)) => (prefix.to_string(), suffix.to_string()),
            None => (format, String::new()),
        };

        Self { prefix, suffix }
    }

    /// Tag name for a version of the package
    pub fn tag_name(&self, version: &str) -> String {
        format!("{}{}{}", self.prefix, version, self.suffix)
    }

    /// Version encoded in a tag name, when the tag belongs to the package
    pub fn version_of(&self, tag_name: &str) -> Option<Version> {
        let version = tag_name
            .strip_prefix(&self.prefix)?
            .strip_suffix(&self.suffix)?;
        Version::parse(version).ok()
    }

    /// Tags of this package, newest version first
    pub fn package_tags(&self, tags: Vec<TagInfo>) -> Vec<PackageTag> {
        let mut matching: Vec<PackageTag> = tags
            .into_iter()
            .filter_map(|tag| {
                self.version_of(&tag.name)
                    .map(|version| PackageTag { tag, version })
            })
            .collect();

        matching.sort_by(|a, b| b.version.cmp(&a.version));
        debug!(
            prefix = %self.prefix,
            count = matching.len(),
            latest = ?matching.first().map(|t| &t.tag.name),
            "matched package tags"
        );
        matching
    }

    /// The package's newest tag
    pub fn latest(&self, tags: Vec<TagInfo>) -> Option<PackageTag> {
        self.package_tags(tags).into_iter().next()
    }
}
