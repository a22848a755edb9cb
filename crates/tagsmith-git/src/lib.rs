//! tagsmith git - the git boundary of the release engine
//!
//! Tag enumeration goes through libgit2; commit lookups and range listings
//! run the `git` binary. Everything above this crate talks to the
//! [`GitBackend`] trait so it can be driven by [`mock::MockGit`] in tests.

mod backend;
mod commands;
pub mod mock;
mod repository;
mod tags;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod types;

pub use backend::{GitBackend, LogQuery};
pub use commands::SHOW_FORMAT;
pub use repository::{GitRepo, Result};
pub use tags::{PackageTag, TagPattern};
pub use types::{CommitInfo, RawCommit, TagInfo};
