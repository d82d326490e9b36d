//! Fluent builder for chat sequences

use tracing::debug;

use crate::chat::{ChatSequence, ChatTurn, Role};
use crate::variables::{VariableSet, extract_variables};

/// Collects turns and their placeholders before producing a [`ChatSequence`]
///
/// Every collected variable becomes part of the built sequence's baseline.
#[derive(Debug, Clone, Default)]
pub struct ChatPromptBuilder {
    turns: Vec<ChatTurn>,
    variables: VariableSet,
}

impl ChatPromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_message(mut self, role: impl Into<Role>, content: impl Into<String>) -> Self {
        let turn = ChatTurn::new(role, content);
        debug!(role = %turn.role, "ChatPromptBuilder::add_message: called");
        self.variables.extend(extract_variables(&turn.content));
        self.turns.push(turn);
        self
    }

    pub fn add_system_message(self, content: impl Into<String>) -> Self {
        self.add_message(Role::System, content)
    }

    pub fn add_user_message(self, content: impl Into<String>) -> Self {
        self.add_message(Role::User, content)
    }

    pub fn add_assistant_message(self, content: impl Into<String>) -> Self {
        self.add_message(Role::Assistant, content)
    }

    /// Variables collected so far
    pub fn variables(&self) -> &VariableSet {
        &self.variables
    }

    pub fn build(&self) -> ChatSequence {
        debug!(turns = self.turns.len(), "ChatPromptBuilder::build: called");
        ChatSequence::new(self.turns.clone(), self.variables.clone())
    }

    /// Drop every collected turn and variable
    pub fn reset(mut self) -> Self {
        self.turns.clear();
        self.variables = VariableSet::new();
        self
    }

    /// Start from a copy of an existing sequence
    pub fn from_template(template: &ChatSequence) -> Self {
        Self {
            turns: template.turns().to_vec(),
            variables: template.declared_variables().clone(),
        }
    }
}
