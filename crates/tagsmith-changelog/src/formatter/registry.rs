//! Template registry

use std::sync::Arc;

use tagsmith_core::error::{ChangelogError, Result};

use super::{ChangelogTemplate, CompactTemplate, DefaultTemplate, TemplateOptions};

/// Registry of available changelog templates
pub struct TemplateRegistry {
    templates: Vec<Arc<dyn ChangelogTemplate>>,
}

impl TemplateRegistry {
    /// Create a registry with the built-in templates
    pub fn new(options: TemplateOptions) -> Self {
        Self {
            templates: vec![
                Arc::new(DefaultTemplate::new(options.clone())),
                Arc::new(CompactTemplate::new(options)),
            ],
        }
    }

    /// Get a template by name
    pub fn get(&self, name: &str) -> Result<Arc<dyn ChangelogTemplate>> {
        self.templates
            .iter()
            .find(|t| t.name() == name)
            .cloned()
            .ok_or_else(|| ChangelogError::UnknownTemplate(name.to_string()).into())
    }

    /// Names of all registered templates
    pub fn names(&self) -> Vec<&'static str> {
        self.templates.iter().map(|t| t.name()).collect()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new(TemplateOptions::default())
    }
}
