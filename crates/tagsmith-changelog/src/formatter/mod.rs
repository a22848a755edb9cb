//! Changelog templates
//!
//! A template renders [`ChangelogData`] to markdown and parses an existing
//! changelog back into per-version blocks.

mod compact;
mod default;
mod helpers;
mod registry;

pub use compact::CompactTemplate;
pub use default::DefaultTemplate;
pub use helpers::{compare_version_labels, parse_versions, TemplateOptions};
pub use registry::TemplateRegistry;

use std::cmp::Ordering;

use crate::types::ChangelogData;

/// Trait for changelog templates
pub trait ChangelogTemplate: Send + Sync {
    /// Template name used in configuration
    fn name(&self) -> &'static str;

    /// Render a whole changelog document
    fn render(&self, data: &ChangelogData) -> String;

    /// Split an existing changelog into raw per-version blocks
    fn parse(&self, markdown: &str) -> ChangelogData;

    /// Display order of two version labels
    fn compare_versions(&self, a: &str, b: &str) -> Ordering;
}
