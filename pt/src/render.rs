//! Placeholder substitution
//!
//! Single pass over the text: substituted values are never rescanned, so a
//! value that itself looks like `{name}` stays literal in the output.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chat::RenderedTurn;
use crate::error::{Result, TemplateError};
use crate::variables::{PLACEHOLDER, VariableSet};

/// Variable binding supplied at render time
pub type Bindings = HashMap<String, String>;

/// Output of rendering any template variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rendered {
    Text(String),
    Turns(Vec<RenderedTurn>),
}

impl Rendered {
    /// Get the text if this came from a flat or few-shot template
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Rendered::Text(text) => Some(text),
            Rendered::Turns(_) => None,
        }
    }

    /// Get the turns if this came from a chat sequence
    pub fn as_turns(&self) -> Option<&[RenderedTurn]> {
        match self {
            Rendered::Text(_) => None,
            Rendered::Turns(turns) => Some(turns),
        }
    }
}

/// Replace every placeholder in `text` with its bound value
///
/// `{{` and `}}` collapse to literal braces; malformed braces are copied
/// through unchanged. Fails with every unbound name, first-seen order, and
/// produces no output in that case.
pub fn substitute(text: &str, bindings: &Bindings) -> Result<String> {
    debug!(text_len = text.len(), bindings = bindings.len(), "substitute: called");
    let mut out = String::with_capacity(text.len());
    let mut missing = VariableSet::new();
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&text[last..whole.start()]);
        last = whole.end();

        match caps.get(1) {
            Some(name) => match bindings.get(name.as_str()) {
                Some(value) => out.push_str(value),
                None => {
                    missing.insert(name.as_str());
                }
            },
            None if whole.as_str() == "{{" => out.push('{'),
            None => out.push('}'),
        }
    }
    out.push_str(&text[last..]);

    if !missing.is_empty() {
        debug!(missing = ?missing, "substitute: unbound placeholders");
        return Err(TemplateError::MissingVariables {
            missing: missing.into_vec(),
        });
    }
    Ok(out)
}

/// Names in `required` that `bindings` does not supply, in order
pub fn missing_from<'a>(required: impl IntoIterator<Item = &'a str>, bindings: &Bindings) -> Vec<String> {
    required
        .into_iter()
        .filter(|name| !bindings.contains_key(*name))
        .map(str::to_string)
        .collect()
}

/// Build a binding from `(name, value)` pairs
pub fn bindings<I, K, V>(pairs: I) -> Bindings
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: ToString,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.to_string())).collect()
}
