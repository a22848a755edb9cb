//! tagsmith core - shared foundations for tagsmith release automation
//!
//! This crate provides the error taxonomy, configuration loading and the
//! types shared by the git, versioning and changelog crates.

pub mod config;
pub mod error;
pub mod types;

pub use error::{Result, TagsmithError};
pub use types::{PackageInfo, PrCategory};
