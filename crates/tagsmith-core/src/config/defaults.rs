//! Default configuration values

use super::types::Config;

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "tagsmith.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "tagsmith.yaml";

/// Alternative configuration file name
pub const ALT_CONFIG_FILE: &str = ".tagsmith.toml";

/// Template names accepted by `changelog.template`
pub const TEMPLATE_NAMES: &[&str] = &["default", "compact"];

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ALT_CONFIG_FILE,
        ".tagsmith.yaml",
    ]
}

/// Generate default configuration TOML
pub fn default_config_toml() -> String {
    let config = Config::default();
    toml::to_string_pretty(&config).unwrap_or_else(|_| DEFAULT_CONFIG_TEMPLATE.to_string())
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# tagsmith configuration

[versioning]
tag_format = "{package}@{version}"

[changelog]
file_name = "CHANGELOG.md"
template = "default"
title = "Changelog"
include_dates = true

[commit_rules]
extra_scopes = []
description_min = 3
description_max = 100
body_min = 0
body_max = 200

[workspace]
globs = ["packages/*"]
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.workspace.globs, vec!["packages/*"]);
    }

    #[test]
    fn test_default_config_toml_contains_types() {
        let rendered = default_config_toml();
        assert!(rendered.contains("[[commit_rules.types]]"));
    }
}
