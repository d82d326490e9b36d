//! Tagged union over the three template variants

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::chat::ChatSequence;
use crate::error::Result;
use crate::few_shot::FewShotBlock;
use crate::flat::FlatTemplate;
use crate::render::{Bindings, Rendered};
use crate::variables::VariableSet;

/// Which variant a template is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateKind {
    Flat,
    Chat,
    FewShot,
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat => write!(f, "flat"),
            Self::Chat => write!(f, "chat"),
            Self::FewShot => write!(f, "few-shot"),
        }
    }
}

/// Any prompt template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PromptTemplate {
    Flat(FlatTemplate),
    Chat(ChatSequence),
    FewShot(FewShotBlock),
}

impl PromptTemplate {
    pub fn kind(&self) -> TemplateKind {
        match self {
            Self::Flat(_) => TemplateKind::Flat,
            Self::Chat(_) => TemplateKind::Chat,
            Self::FewShot(_) => TemplateKind::FewShot,
        }
    }

    pub fn declared_variables(&self) -> &VariableSet {
        match self {
            Self::Flat(t) => t.declared_variables(),
            Self::Chat(t) => t.declared_variables(),
            Self::FewShot(t) => t.declared_variables(),
        }
    }

    pub fn required_variables(&self) -> VariableSet {
        match self {
            Self::Flat(t) => t.required_variables(),
            Self::Chat(t) => t.required_variables(),
            Self::FewShot(t) => t.required_variables(),
        }
    }

    pub fn missing_variables(&self, bindings: &Bindings) -> Vec<String> {
        match self {
            Self::Flat(t) => t.missing_variables(bindings),
            Self::Chat(t) => t.missing_variables(bindings),
            Self::FewShot(t) => t.missing_variables(bindings),
        }
    }

    pub fn validate(&self, bindings: &Bindings) -> bool {
        self.missing_variables(bindings).is_empty()
    }

    pub fn render(&self, bindings: &Bindings) -> Result<Rendered> {
        match self {
            Self::Flat(t) => t.render(bindings).map(Rendered::Text),
            Self::Chat(t) => t.render(bindings).map(Rendered::Turns),
            Self::FewShot(t) => t.render(bindings).map(Rendered::Text),
        }
    }

    pub fn input_schema(&self) -> Value {
        input_schema(self.declared_variables())
    }

    pub fn as_flat(&self) -> Option<&FlatTemplate> {
        match self {
            Self::Flat(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_chat(&self) -> Option<&ChatSequence> {
        match self {
            Self::Chat(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_few_shot(&self) -> Option<&FewShotBlock> {
        match self {
            Self::FewShot(t) => Some(t),
            _ => None,
        }
    }
}

impl From<FlatTemplate> for PromptTemplate {
    fn from(t: FlatTemplate) -> Self {
        Self::Flat(t)
    }
}

impl From<ChatSequence> for PromptTemplate {
    fn from(t: ChatSequence) -> Self {
        Self::Chat(t)
    }
}

impl From<FewShotBlock> for PromptTemplate {
    fn from(t: FewShotBlock) -> Self {
        Self::FewShot(t)
    }
}

/// JSON-Schema-shaped description: every variable is a required string
pub fn input_schema(variables: &VariableSet) -> Value {
    let properties: serde_json::Map<String, Value> = variables
        .iter()
        .map(|name| (name.to_string(), json!({ "type": "string" })))
        .collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": variables.as_slice(),
    })
}
