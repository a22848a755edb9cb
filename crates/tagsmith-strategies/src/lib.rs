//! tagsmith strategies - version calculation and release decisions
//!
//! This crate provides the SemVer strategy and the engine that turns a set of
//! commits into a bump decision for one package.

mod decision;
mod semver;
mod traits;
pub mod types;

pub use decision::{DecisionContext, VersionData, VersionDecisionEngine};
pub use semver::SemVerStrategy;
pub use traits::VersionStrategy;
pub use types::{BumpSignal, BumpType, VersionComponents};
