//! Chat sequence template with variable-tracking edits
//!
//! A [`ChatSequence`] owns an ordered list of role-tagged turns plus the set
//! of declared variables. Insert, update and remove keep that set consistent:
//! new placeholders are appended on introduction, and a name is dropped only
//! when no remaining turn references it and it was not part of the baseline
//! given at construction.
//!
//! Orphan detection rescans every remaining turn. Prompt sequences hold tens
//! of turns, so the O(turns) pass is kept over a reference-count index.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, TemplateError};
use crate::render::{Bindings, missing_from, substitute};
use crate::template::input_schema;
use crate::variables::{VariableSet, extract_variables, references};

/// Speaker of a chat turn
///
/// Any string is accepted; the three conventional roles get their own variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    System,
    User,
    Assistant,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Other(name) => name,
        }
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        match name {
            "system" => Role::System,
            "user" => Role::User,
            "assistant" => Role::Assistant,
            other => Role::Other(other.to_string()),
        }
    }
}

impl From<String> for Role {
    fn from(name: String) -> Self {
        match name.as_str() {
            "system" | "user" | "assistant" => Role::from(name.as_str()),
            _ => Role::Other(name),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One template turn; content may contain placeholders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: impl Into<Role>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A turn after substitution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedTurn {
    pub role: Role,
    pub content: String,
}

impl fmt::Display for RenderedTurn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]: {}", self.role.as_str().to_uppercase(), self.content)
    }
}

/// Ordered, editable list of chat turns
///
/// Deserialized sequences declare every baseline name, even when the input
/// left it out of `declared_variables`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ChatSequenceFields")]
pub struct ChatSequence {
    turns: Vec<ChatTurn>,
    declared_variables: VariableSet,
    baseline_variables: VariableSet,
}

#[derive(Deserialize)]
struct ChatSequenceFields {
    turns: Vec<ChatTurn>,
    #[serde(default)]
    declared_variables: VariableSet,
    #[serde(default)]
    baseline_variables: VariableSet,
}

impl From<ChatSequenceFields> for ChatSequence {
    fn from(fields: ChatSequenceFields) -> Self {
        let mut declared_variables = fields.declared_variables;
        declared_variables.extend(fields.baseline_variables.iter());
        Self {
            turns: fields.turns,
            declared_variables,
            baseline_variables: fields.baseline_variables,
        }
    }
}

impl ChatSequence {
    /// Create a sequence; `declared_variables` also becomes the baseline that
    /// edits never remove
    pub fn new(turns: Vec<ChatTurn>, declared_variables: impl Into<VariableSet>) -> Self {
        let declared_variables = declared_variables.into();
        debug!(turns = turns.len(), declared = ?declared_variables, "ChatSequence::new: called");
        Self {
            turns,
            baseline_variables: declared_variables.clone(),
            declared_variables,
        }
    }

    /// Create a sequence from `(role, content)` pairs, declaring every
    /// placeholder in first-seen order
    ///
    /// The baseline is empty, so inferred variables are dropped again once
    /// no turn references them.
    pub fn from_messages<I, R, C>(messages: I) -> Self
    where
        I: IntoIterator<Item = (R, C)>,
        R: Into<Role>,
        C: Into<String>,
    {
        let turns: Vec<ChatTurn> = messages.into_iter().map(|(r, c)| ChatTurn::new(r, c)).collect();
        let declared_variables: VariableSet = turns.iter().flat_map(|t| extract_variables(&t.content)).collect();
        debug!(turns = turns.len(), declared = ?declared_variables, "ChatSequence::from_messages: called");
        Self {
            turns,
            declared_variables,
            baseline_variables: VariableSet::new(),
        }
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn declared_variables(&self) -> &VariableSet {
        &self.declared_variables
    }

    pub fn baseline_variables(&self) -> &VariableSet {
        &self.baseline_variables
    }

    /// Insert a turn at `index` (end when `None`), declaring any new placeholders
    pub fn insert(&mut self, role: impl Into<Role>, content: impl Into<String>, index: Option<usize>) -> Result<()> {
        let turn = ChatTurn::new(role, content);
        let index = index.unwrap_or(self.turns.len());
        debug!(%index, role = %turn.role, "ChatSequence::insert: called");
        if index > self.turns.len() {
            return Err(TemplateError::IndexOutOfRange {
                index,
                len: self.turns.len(),
            });
        }

        self.declared_variables.extend(extract_variables(&turn.content));
        self.turns.insert(index, turn);
        Ok(())
    }

    pub fn add_system(&mut self, content: impl Into<String>, index: Option<usize>) -> Result<()> {
        self.insert(Role::System, content, index)
    }

    pub fn add_user(&mut self, content: impl Into<String>, index: Option<usize>) -> Result<()> {
        self.insert(Role::User, content, index)
    }

    pub fn add_assistant(&mut self, content: impl Into<String>, index: Option<usize>) -> Result<()> {
        self.insert(Role::Assistant, content, index)
    }

    /// Replace the content and/or role of the turn at `index`
    pub fn update(&mut self, index: usize, new_content: Option<String>, new_role: Option<Role>) -> Result<()> {
        debug!(%index, has_content = new_content.is_some(), ?new_role, "ChatSequence::update: called");
        self.check_index(index)?;

        if let Some(new_content) = new_content {
            let old_vars = VariableSet::from_text(&self.turns[index].content);
            let new_vars = VariableSet::from_text(&new_content);
            self.turns[index].content = new_content;

            for name in old_vars.iter().filter(|n| !new_vars.contains(n)) {
                if self.baseline_variables.contains(name) {
                    continue;
                }
                let used_elsewhere = self
                    .turns
                    .iter()
                    .enumerate()
                    .any(|(i, t)| i != index && references(&t.content, name));
                if !used_elsewhere {
                    debug!(%name, "ChatSequence::update: dropping orphaned variable");
                    self.declared_variables.remove(name);
                }
            }
            self.declared_variables.extend(new_vars.into_vec());
        }

        if let Some(role) = new_role {
            self.turns[index].role = role;
        }
        Ok(())
    }

    /// Remove and return the turn at `index`, dropping variables it alone used
    pub fn remove(&mut self, index: usize) -> Result<ChatTurn> {
        debug!(%index, len = self.turns.len(), "ChatSequence::remove: called");
        self.check_index(index)?;

        let removed = self.turns.remove(index);
        let surviving: VariableSet = self.turns.iter().flat_map(|t| extract_variables(&t.content)).collect();
        let baseline = &self.baseline_variables;
        self.declared_variables
            .retain(|name| surviving.contains(name) || baseline.contains(name));
        debug!(declared = ?self.declared_variables, "ChatSequence::remove: recomputed variables");
        Ok(removed)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.turns.len() {
            debug!(%index, len = self.turns.len(), "ChatSequence::check_index: out of range");
            return Err(TemplateError::IndexOutOfRange {
                index,
                len: self.turns.len(),
            });
        }
        Ok(())
    }

    /// Declared names that some turn actually references
    pub fn required_variables(&self) -> VariableSet {
        let referenced: VariableSet = self.turns.iter().flat_map(|t| extract_variables(&t.content)).collect();
        referenced
            .iter()
            .filter(|name| self.declared_variables.contains(name))
            .collect()
    }

    pub fn missing_variables(&self, bindings: &Bindings) -> Vec<String> {
        let required = self.required_variables();
        missing_from(required.iter(), bindings)
    }

    pub fn validate(&self, bindings: &Bindings) -> bool {
        self.missing_variables(bindings).is_empty()
    }

    /// Render every turn; either all turns render or an error is returned
    pub fn render(&self, bindings: &Bindings) -> Result<Vec<RenderedTurn>> {
        debug!(turns = self.turns.len(), bindings = bindings.len(), "ChatSequence::render: called");
        let missing = self.missing_variables(bindings);
        if !missing.is_empty() {
            return Err(TemplateError::MissingVariables { missing });
        }

        self.turns
            .iter()
            .map(|turn| {
                Ok(RenderedTurn {
                    role: turn.role.clone(),
                    content: substitute(&turn.content, bindings)?,
                })
            })
            .collect()
    }

    pub fn input_schema(&self) -> Value {
        input_schema(&self.declared_variables)
    }
}
