//! Commit message rules
//!
//! Checks parsed messages against the configured commit rules: allowed
//! types and scopes, description and body length bands, and which types may
//! carry a breaking change.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use tagsmith_core::config::CommitRulesConfig;
use tagsmith_core::error::ValidationError;

use crate::types::CommitMessage;

/// Minimum description length of a breaking change
const BREAKING_DESCRIPTION_MIN: usize = 10;

/// Which rule a message broke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Type not in the allow-list
    Type,
    /// Scope not in the allow-list
    Scope,
    /// Description too short or too long
    DescriptionLength,
    /// Description ends with a period
    DescriptionPunctuation,
    /// Description repeats the type as its first word
    DescriptionRepeatsType,
    /// Body line too short or too long
    BodyLength,
    /// Breaking change on a type that does not allow one
    BreakingType,
    /// Breaking change without enough explanation
    BreakingDescription,
}

/// A single broken rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleViolation {
    /// Rule that was broken
    pub kind: RuleKind,
    /// Human-readable explanation
    pub message: String,
}

impl RuleViolation {
    fn new(kind: RuleKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Validates commit messages against the configured rules
#[derive(Debug, Clone)]
pub struct CommitRuleEngine {
    rules: Arc<CommitRulesConfig>,
    scopes: Vec<String>,
}

impl CommitRuleEngine {
    /// Create an engine. Allowed scopes are the package names plus the
    /// configured extra scopes; an empty list disables the scope check.
    pub fn new(rules: Arc<CommitRulesConfig>, package_names: &[String]) -> Self {
        let mut scopes: Vec<String> = package_names.to_vec();
        for scope in &rules.extra_scopes {
            if !scopes.contains(scope) {
                scopes.push(scope.clone());
            }
        }

        Self { rules, scopes }
    }

    /// Allowed scopes
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// All rules the message breaks; empty when valid
    pub fn validate(&self, message: &CommitMessage) -> Vec<RuleViolation> {
        let mut violations = Vec::new();
        let rules = &self.rules;

        let types = rules.type_names();
        if !types.is_empty() && !types.contains(&message.commit_type.as_str()) {
            violations.push(RuleViolation::new(
                RuleKind::Type,
                format!(
                    "type '{}' is not one of: {}",
                    message.commit_type,
                    types.join(", ")
                ),
            ));
        }

        if !self.scopes.is_empty() {
            for scope in message.scopes.iter().filter(|s| !self.scopes.contains(s)) {
                violations.push(RuleViolation::new(
                    RuleKind::Scope,
                    format!("scope '{}' is not one of: {}", scope, self.scopes.join(", ")),
                ));
            }
        }

        let description = message.description.trim();
        let length = description.chars().count();
        if length < rules.description_min || length > rules.description_max {
            violations.push(RuleViolation::new(
                RuleKind::DescriptionLength,
                format!(
                    "description is {} characters, expected {} to {}",
                    length, rules.description_min, rules.description_max
                ),
            ));
        }

        if description.ends_with('.') {
            violations.push(RuleViolation::new(
                RuleKind::DescriptionPunctuation,
                "description must not end with a period",
            ));
        }

        if let Some(first) = description.split_whitespace().next() {
            if first.eq_ignore_ascii_case(&message.commit_type) {
                violations.push(RuleViolation::new(
                    RuleKind::DescriptionRepeatsType,
                    format!("description must not start with the type '{}'", message.commit_type),
                ));
            }
        }

        for (i, line) in message.body_lines.iter().enumerate() {
            let length = line.chars().count();
            if length < rules.body_min || length > rules.body_max {
                violations.push(RuleViolation::new(
                    RuleKind::BodyLength,
                    format!(
                        "body line {} is {} characters, expected {} to {}",
                        i + 1,
                        length,
                        rules.body_min,
                        rules.body_max
                    ),
                ));
            }
        }

        if message.is_breaking {
            if !rules.breaking_allowed(&message.commit_type) {
                violations.push(RuleViolation::new(
                    RuleKind::BreakingType,
                    format!("type '{}' cannot carry a breaking change", message.commit_type),
                ));
            }
            if length < BREAKING_DESCRIPTION_MIN {
                violations.push(RuleViolation::new(
                    RuleKind::BreakingDescription,
                    format!(
                        "breaking changes need a description of at least {} characters",
                        BREAKING_DESCRIPTION_MIN
                    ),
                ));
            }
        }

        debug!(
            commit_type = %message.commit_type,
            violations = violations.len(),
            "validated commit message"
        );
        violations
    }

    /// Turn the violations [`Self::validate`] found into an error
    pub fn check(message: &CommitMessage, violations: &[RuleViolation]) -> Result<(), ValidationError> {
        if violations.is_empty() {
            return Ok(());
        }

        Err(ValidationError {
            subject: message.subject(),
            violations: violations.iter().map(ToString::to_string).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{CommitParser, ConventionalParser};

    fn engine() -> CommitRuleEngine {
        CommitRuleEngine::new(
            Arc::new(CommitRulesConfig::default()),
            &["ui".to_string(), "core".to_string()],
        )
    }

    fn kinds(raw: &str) -> Vec<RuleKind> {
        let message = ConventionalParser::new().parse(raw);
        engine().validate(&message).into_iter().map(|v| v.kind).collect()
    }

    #[test]
    fn test_valid_message() {
        assert!(kinds("feat(ui): add dark mode toggle").is_empty());
        assert!(kinds("fix: handle empty input\n\nThe parser crashed on empty files").is_empty());
    }

    #[test]
    fn test_unknown_type_and_scope() {
        assert_eq!(kinds("wip(ui): half done"), vec![RuleKind::Type]);
        assert_eq!(kinds("feat(server): add endpoint"), vec![RuleKind::Scope]);
    }

    #[test]
    fn test_extra_scopes_allowed() {
        let mut rules = CommitRulesConfig::default();
        rules.extra_scopes = vec!["deps".to_string()];
        let engine = CommitRuleEngine::new(Arc::new(rules), &["ui".to_string()]);
        let message = ConventionalParser::new().parse("chore(deps): bump serde");

        assert!(engine.validate(&message).is_empty());
        assert_eq!(engine.scopes(), ["ui", "deps"]);
    }

    #[test]
    fn test_description_rules() {
        assert_eq!(kinds("fix: ab"), vec![RuleKind::DescriptionLength]);
        assert_eq!(kinds("fix: handle null."), vec![RuleKind::DescriptionPunctuation]);
        assert_eq!(kinds("fix: Fix the login"), vec![RuleKind::DescriptionRepeatsType]);

        let long = format!("feat: {}", "a".repeat(101));
        assert_eq!(kinds(&long), vec![RuleKind::DescriptionLength]);
    }

    #[test]
    fn test_body_line_length() {
        let raw = format!("docs: update guide\n\n{}", "x".repeat(201));
        assert_eq!(kinds(&raw), vec![RuleKind::BodyLength]);
    }

    #[test]
    fn test_breaking_rules() {
        assert_eq!(kinds("docs!: rewrite the whole guide"), vec![RuleKind::BreakingType]);
        assert_eq!(kinds("feat!: drop v1"), vec![RuleKind::BreakingDescription]);
        assert!(kinds("feat!: remove the legacy config loader").is_empty());
    }

    #[test]
    fn test_check_collects_violations() {
        let message = ConventionalParser::new().parse("wip: x.");
        let violations = engine().validate(&message);
        let err = CommitRuleEngine::check(&message, &violations).unwrap_err();

        assert_eq!(err.subject, "wip: x.");
        assert_eq!(err.violations.len(), 3);
        assert!(err.to_string().contains("3 rule(s)"));
    }

    #[test]
    fn test_check_accepts_clean_message() {
        let message = ConventionalParser::new().parse("feat(ui): add login form");
        let violations = engine().validate(&message);
        assert!(CommitRuleEngine::check(&message, &violations).is_ok());
    }

    #[test]
    fn test_empty_allow_lists_disable_checks() {
        let rules = CommitRulesConfig {
            types: vec![],
            ..Default::default()
        };
        let engine = CommitRuleEngine::new(Arc::new(rules), &[]);
        let message = ConventionalParser::new().parse("anything(goes): works fine");
        assert!(engine.validate(&message).is_empty());
    }
}
