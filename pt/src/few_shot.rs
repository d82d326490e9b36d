//! Few-shot block: prefix, rendered examples, suffix

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, TemplateError};
use crate::flat::FlatTemplate;
use crate::render::{Bindings, missing_from, substitute};
use crate::template::input_schema;
use crate::variables::{VariableSet, extract_variables};

/// Values for one example, keyed by the renderer's placeholder names
pub type Example = BTreeMap<String, String>;

/// Build an example from `(name, value)` pairs
pub fn example<I, K, V>(pairs: I) -> Example
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FewShotBlock {
    prefix: String,
    suffix: String,
    example_renderer: FlatTemplate,
    examples: Vec<Example>,
    declared_variables: VariableSet,
    separator: String,
}

impl FewShotBlock {
    pub fn new(
        prefix: impl Into<String>,
        suffix: impl Into<String>,
        example_renderer: FlatTemplate,
        examples: Vec<Example>,
        declared_variables: impl Into<VariableSet>,
        separator: impl Into<String>,
    ) -> Self {
        let declared_variables = declared_variables.into();
        debug!(examples = examples.len(), declared = ?declared_variables, "FewShotBlock::new: called");
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
            example_renderer,
            examples,
            declared_variables,
            separator: separator.into(),
        }
    }

    /// Create a block joined with the default example separator
    pub fn from_examples(
        examples: Vec<Example>,
        example_renderer: FlatTemplate,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
        declared_variables: impl Into<VariableSet>,
    ) -> Self {
        Self::new(
            prefix,
            suffix,
            example_renderer,
            examples,
            declared_variables,
            crate::DEFAULT_EXAMPLE_SEPARATOR,
        )
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn example_renderer(&self) -> &FlatTemplate {
        &self.example_renderer
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn declared_variables(&self) -> &VariableSet {
        &self.declared_variables
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Declared names used by the prefix, the suffix, or as example keys
    pub fn required_variables(&self) -> VariableSet {
        let mut used: VariableSet = extract_variables(&self.prefix).into_iter().collect();
        used.extend(extract_variables(&self.suffix));
        for example in &self.examples {
            used.extend(example.keys().map(String::as_str));
        }
        used.retain(|name| self.declared_variables.contains(name));
        used
    }

    pub fn missing_variables(&self, bindings: &Bindings) -> Vec<String> {
        let required = self.required_variables();
        missing_from(required.iter(), bindings)
    }

    pub fn validate(&self, bindings: &Bindings) -> bool {
        self.missing_variables(bindings).is_empty()
    }

    /// Render prefix, every example joined by the separator, then suffix
    ///
    /// Each example sees the declared part of `bindings` with its own values
    /// laid on top.
    pub fn render(&self, bindings: &Bindings) -> Result<String> {
        debug!(examples = self.examples.len(), bindings = bindings.len(), "FewShotBlock::render: called");
        let missing = self.missing_variables(bindings);
        if !missing.is_empty() {
            return Err(TemplateError::MissingVariables { missing });
        }

        let shared: Bindings = bindings
            .iter()
            .filter(|(name, _)| self.declared_variables.contains(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        let rendered = self
            .examples
            .iter()
            .map(|example| {
                let mut vars = shared.clone();
                vars.extend(example.iter().map(|(k, v)| (k.clone(), v.clone())));
                self.example_renderer.render(&vars)
            })
            .collect::<Result<Vec<_>>>()?;

        let prefix = substitute(&self.prefix, bindings)?;
        let suffix = substitute(&self.suffix, bindings)?;
        Ok(format!("{}{}{}", prefix, rendered.join(&self.separator), suffix))
    }

    pub fn input_schema(&self) -> Value {
        input_schema(&self.declared_variables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::bindings;

    fn arithmetic() -> FewShotBlock {
        FewShotBlock::new(
            "Solve:\n",
            "\nQ:{question} A:",
            FlatTemplate::new("Q:{q} A:{a}", ["q", "a"]),
            vec![example([("q", "2+2"), ("a", "4")]), example([("q", "3*3"), ("a", "9")])],
            ["question"],
            "\n",
        )
    }

    #[test]
    fn test_render_examples_and_suffix() {
        let out = arithmetic().render(&bindings([("question", "5-1")])).unwrap();
        assert_eq!(out, "Solve:\nQ:2+2 A:4\nQ:3*3 A:9\nQ:5-1 A:");
    }

    #[test]
    fn test_render_missing_suffix_variable() {
        let err = arithmetic().render(&Bindings::new()).unwrap_err();
        assert_eq!(err.missing_variables(), Some(&["question".to_string()][..]));
    }

    #[test]
    fn test_undeclared_suffix_placeholder_fails_render() {
        let block = FewShotBlock::from_examples(
            vec![],
            FlatTemplate::new("{x}", ["x"]),
            "",
            "{stray}",
            VariableSet::new(),
        );
        assert!(block.validate(&Bindings::new()));
        assert!(block.render(&Bindings::new()).is_err());
    }

    #[test]
    fn test_example_values_win_over_bindings() {
        let block = FewShotBlock::from_examples(
            vec![example([("input", "hi"), ("output", "hello")])],
            FlatTemplate::new("{input} -> {output}", ["input", "output"]),
            "",
            "{input} ->",
            ["input"],
        );
        let out = block.render(&bindings([("input", "bye"), ("output", "ignored")])).unwrap();
        assert_eq!(out, "hi -> hellobye ->");
    }

    #[test]
    fn test_binding_fills_slots_examples_lack() {
        let block = FewShotBlock::from_examples(
            vec![example([("q", "2+2")])],
            FlatTemplate::new("[{style}] {q}", ["style", "q"]),
            "",
            "",
            ["style"],
        );
        assert_eq!(block.render(&bindings([("style", "math")])).unwrap(), "[math] 2+2");
    }

    #[test]
    fn test_required_variables() {
        let block = FewShotBlock::from_examples(
            vec![example([("q", "1"), ("a", "2")])],
            FlatTemplate::new("{q}{a}", ["q", "a"]),
            "{lead}",
            "{question}",
            ["question", "lead", "q", "other"],
        );
        assert_eq!(block.required_variables(), VariableSet::from(["lead", "question", "q"]));
        assert_eq!(block.separator(), crate::DEFAULT_EXAMPLE_SEPARATOR);
    }
}
