//! Configuration validation

use std::collections::HashSet;

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::defaults::TEMPLATE_NAMES;
use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_versioning(config)?;
    validate_changelog(config)?;
    validate_commit_rules(config)?;
    validate_packages(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> crate::TagsmithError {
    ConfigError::InvalidValue {
        field: field.into(),
        message: message.into(),
    }
    .into()
}

fn validate_versioning(config: &Config) -> Result<()> {
    let format = &config.versioning.tag_format;
    if !format.contains("{version}") {
        return Err(invalid(
            "versioning.tag_format",
            "must contain {version} placeholder",
        ));
    }

    // Per-package tags need the package name to tell packages apart
    if !format.contains("{package}") && (config.packages.len() > 1 || !config.workspace.globs.is_empty()) {
        return Err(invalid(
            "versioning.tag_format",
            "must contain {package} placeholder when several packages are released",
        ));
    }

    Ok(())
}

fn validate_changelog(config: &Config) -> Result<()> {
    if !TEMPLATE_NAMES.contains(&config.changelog.template.as_str()) {
        return Err(invalid(
            "changelog.template",
            format!("must be one of: {}", TEMPLATE_NAMES.join(", ")),
        ));
    }

    if config.changelog.file_name.as_os_str().is_empty() {
        return Err(invalid("changelog.file_name", "file name cannot be empty"));
    }

    Ok(())
}

fn validate_commit_rules(config: &Config) -> Result<()> {
    let rules = &config.commit_rules;

    if rules.description_min > rules.description_max {
        return Err(invalid(
            "commit_rules.description_min",
            format!(
                "{} is greater than description_max {}",
                rules.description_min, rules.description_max
            ),
        ));
    }

    if rules.body_min > rules.body_max {
        return Err(invalid(
            "commit_rules.body_min",
            format!("{} is greater than body_max {}", rules.body_min, rules.body_max),
        ));
    }

    let mut seen = HashSet::new();
    for (i, commit_type) in rules.types.iter().enumerate() {
        if commit_type.name.is_empty() {
            return Err(invalid(
                format!("commit_rules.types[{}].name", i),
                "type name cannot be empty",
            ));
        }
        if !seen.insert(commit_type.name.as_str()) {
            return Err(invalid(
                format!("commit_rules.types[{}].name", i),
                format!("duplicate type '{}'", commit_type.name),
            ));
        }
    }

    Ok(())
}

fn validate_packages(config: &Config) -> Result<()> {
    if !config.packages.is_empty() {
        debug!(count = config.packages.len(), "validating packages");
    }

    let valid_types = ["npm", "cargo"];
    for (i, package) in config.packages.iter().enumerate() {
        if package.name.is_empty() {
            return Err(invalid(
                format!("packages[{}].name", i),
                "package name cannot be empty",
            ));
        }

        if let Some(package_type) = &package.package_type {
            if !valid_types.contains(&package_type.as_str()) {
                return Err(invalid(
                    format!("packages[{}].type", i),
                    format!("must be one of: {}", valid_types.join(", ")),
                ));
            }
        }
    }

    Ok(())
}
