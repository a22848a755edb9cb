//! tagsmith adapters - package manifest access
//!
//! Adapters read a package's name and version from its manifest and write
//! new versions back. npm (`package.json`) and Cargo (`Cargo.toml`) are
//! built in.

pub mod cargo;
pub mod detector;
pub mod npm;
pub mod registry;
mod traits;

pub use cargo::CargoAdapter;
pub use detector::{detect_packages, find_package};
pub use npm::NpmAdapter;
pub use registry::AdapterRegistry;
pub use traits::PackageAdapter;
