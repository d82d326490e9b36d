//! Template error types

use thiserror::Error;

/// Errors that can occur while rendering or editing templates
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Missing required variables: {}", missing.join(", "))]
    MissingVariables { missing: Vec<String> },

    #[error("Turn index {index} out of range for sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

impl TemplateError {
    /// Build a missing-variables error from any list of names
    pub fn missing<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingVariables {
            missing: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Names that were missing from the binding, if this is a missing-variables error
    pub fn missing_variables(&self) -> Option<&[String]> {
        match self {
            TemplateError::MissingVariables { missing } => Some(missing),
            TemplateError::IndexOutOfRange { .. } => None,
        }
    }

    /// Check if this is an index error
    pub fn is_index_error(&self) -> bool {
        matches!(self, TemplateError::IndexOutOfRange { .. })
    }
}

/// Result alias for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;
