//! Flat string template

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, TemplateError};
use crate::render::{Bindings, missing_from, substitute};
use crate::template::input_schema;
use crate::variables::VariableSet;

/// A single parameterized string
///
/// `declared_variables` may hold names the content never mentions; callers use
/// that to require extra inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatTemplate {
    content: String,
    declared_variables: VariableSet,
}

impl FlatTemplate {
    /// Create a template with an explicit variable list
    pub fn new(content: impl Into<String>, declared_variables: impl Into<VariableSet>) -> Self {
        let content = content.into();
        let declared_variables = declared_variables.into();
        debug!(content_len = content.len(), declared = ?declared_variables, "FlatTemplate::new: called");
        Self {
            content,
            declared_variables,
        }
    }

    /// Create a template declaring exactly the placeholders found in `content`
    pub fn from_template(content: impl Into<String>) -> Self {
        let content = content.into();
        let declared_variables = VariableSet::from_text(&content);
        Self::new(content, declared_variables)
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn declared_variables(&self) -> &VariableSet {
        &self.declared_variables
    }

    /// Every declared name is required
    pub fn required_variables(&self) -> VariableSet {
        self.declared_variables.clone()
    }

    /// Required names absent from `bindings`
    pub fn missing_variables(&self, bindings: &Bindings) -> Vec<String> {
        missing_from(self.declared_variables.iter(), bindings)
    }

    pub fn validate(&self, bindings: &Bindings) -> bool {
        self.missing_variables(bindings).is_empty()
    }

    /// Substitute `bindings` into the content
    pub fn render(&self, bindings: &Bindings) -> Result<String> {
        debug!(bindings = bindings.len(), "FlatTemplate::render: called");
        let missing = self.missing_variables(bindings);
        if !missing.is_empty() {
            debug!(?missing, "FlatTemplate::render: validation failed");
            return Err(TemplateError::MissingVariables { missing });
        }
        substitute(&self.content, bindings)
    }

    pub fn input_schema(&self) -> Value {
        input_schema(&self.declared_variables)
    }
}
