//! Conversion between template variants
//!
//! Every direction is a pure function of the source. Some directions lose
//! information; the notes on each method say what is kept.

use tracing::debug;

use crate::chat::{ChatSequence, ChatTurn};
use crate::few_shot::{Example, FewShotBlock};
use crate::flat::FlatTemplate;
use crate::template::{PromptTemplate, TemplateKind};

/// Renderer used for examples paired from chat turns
pub const PAIR_EXAMPLE_TEMPLATE: &str = "Question: {input}\nAnswer: {output}";

/// Lead-in used when a chat sequence becomes a few-shot block without a prefix
pub const DEFAULT_FEW_SHOT_PREFIX: &str = "Solve the following problems:\n\n";

/// Key holding a user turn in a paired example
pub const INPUT_KEY: &str = "input";

/// Key holding an assistant turn in a paired example
pub const OUTPUT_KEY: &str = "output";

/// Optional parameters for conversions that produce a few-shot block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOptions {
    pub example_separator: String,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            example_separator: crate::DEFAULT_EXAMPLE_SEPARATOR.to_string(),
            prefix: None,
            suffix: None,
        }
    }
}

impl ConversionOptions {
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.example_separator = separator.into();
        self
    }
}

/// Convert `source` into `target` with default options
pub fn convert_template(source: &PromptTemplate, target: TemplateKind) -> PromptTemplate {
    auto_convert(source, target, &ConversionOptions::default())
}

/// Convert `source` into `target`; converting to the same kind returns a copy
pub fn auto_convert(source: &PromptTemplate, target: TemplateKind, options: &ConversionOptions) -> PromptTemplate {
    debug!(from = %source.kind(), to = %target, "auto_convert: called");
    match (source, target) {
        (PromptTemplate::Flat(_), TemplateKind::Flat)
        | (PromptTemplate::Chat(_), TemplateKind::Chat)
        | (PromptTemplate::FewShot(_), TemplateKind::FewShot) => source.clone(),
        (PromptTemplate::Flat(t), TemplateKind::Chat) => t.to_chat().into(),
        (PromptTemplate::Flat(t), TemplateKind::FewShot) => t.to_few_shot(options).into(),
        (PromptTemplate::Chat(t), TemplateKind::Flat) => t.to_flat().into(),
        (PromptTemplate::Chat(t), TemplateKind::FewShot) => t.to_few_shot(options).into(),
        (PromptTemplate::FewShot(t), TemplateKind::Flat) => t.to_flat().into(),
        (PromptTemplate::FewShot(t), TemplateKind::Chat) => t.to_chat().into(),
    }
}

impl PromptTemplate {
    /// Shorthand for [`convert_template`]
    pub fn convert(&self, target: TemplateKind) -> PromptTemplate {
        convert_template(self, target)
    }
}

impl FlatTemplate {
    /// One user turn holding the content; declared variables become the baseline
    pub fn to_chat(&self) -> ChatSequence {
        debug!("FlatTemplate::to_chat: called");
        ChatSequence::new(
            vec![ChatTurn::user(self.content())],
            self.declared_variables().clone(),
        )
    }

    /// One-example block whose example renders back to bare placeholders
    ///
    /// The suffix defaults to the flat content itself and the prefix to "".
    pub fn to_few_shot(&self, options: &ConversionOptions) -> FewShotBlock {
        debug!(?options, "FlatTemplate::to_few_shot: called");
        let placeholder_example: Example = self
            .declared_variables()
            .iter()
            .map(|name| (name.to_string(), format!("{{{}}}", name)))
            .collect();

        FewShotBlock::new(
            options.prefix.clone().unwrap_or_default(),
            options.suffix.clone().unwrap_or_else(|| self.content().to_string()),
            self.clone(),
            vec![placeholder_example],
            self.declared_variables().clone(),
            options.example_separator.clone(),
        )
    }
}

impl ChatSequence {
    /// `[ROLE]: content` lines joined by newlines
    pub fn to_flat(&self) -> FlatTemplate {
        debug!(turns = self.len(), "ChatSequence::to_flat: called");
        let content = self
            .turns()
            .iter()
            .map(|turn| format!("[{}]: {}", turn.role.as_str().to_uppercase(), turn.content))
            .collect::<Vec<_>>()
            .join("\n");
        FlatTemplate::new(content, self.declared_variables().clone())
    }

    /// Pair user/assistant turns into `{input, output}` examples
    ///
    /// Turns pair by role name, so `Role::Other("user")` counts as a user turn.
    /// A user turn with no assistant reply is kept with `input` only. The
    /// result declares exactly `input`; other variables of the sequence are
    /// not carried over.
    ///
    /// A sequence ending in a user turn (the usual shape of a prompt) yields
    /// a trailing example without `output`. The block's renderer needs both
    /// keys, so `render` fails with `MissingVariables(["output"])` until that
    /// example is completed or dropped.
    pub fn to_few_shot(&self, options: &ConversionOptions) -> FewShotBlock {
        debug!(turns = self.len(), ?options, "ChatSequence::to_few_shot: called");
        let mut examples: Vec<Example> = Vec::new();
        let mut pending: Option<Example> = None;

        for turn in self.turns() {
            match turn.role.as_str() {
                "user" => {
                    if let Some(unanswered) = pending.take() {
                        examples.push(unanswered);
                    }
                    pending = Some(Example::from([(INPUT_KEY.to_string(), turn.content.clone())]));
                }
                "assistant" => {
                    if let Some(mut example) = pending.take() {
                        example.insert(OUTPUT_KEY.to_string(), turn.content.clone());
                        examples.push(example);
                    } else {
                        debug!("ChatSequence::to_few_shot: skipping assistant turn with no question");
                    }
                }
                _ => {}
            }
        }
        if let Some(unanswered) = pending {
            examples.push(unanswered);
        }

        let prefix = options
            .prefix
            .clone()
            .unwrap_or_else(|| DEFAULT_FEW_SHOT_PREFIX.to_string());
        let suffix = options.suffix.clone().unwrap_or_else(|| {
            let last_question = self
                .turns()
                .iter()
                .rev()
                .find(|t| t.role.as_str() == "user")
                .map(|t| t.content.as_str())
                .unwrap_or("{input}");
            format!("\nQuestion: {}\nAnswer:", last_question)
        });

        FewShotBlock::new(
            prefix,
            suffix,
            FlatTemplate::new(PAIR_EXAMPLE_TEMPLATE, [INPUT_KEY, OUTPUT_KEY]),
            examples,
            [INPUT_KEY],
            options.example_separator.clone(),
        )
    }
}

impl FewShotBlock {
    /// Prefix, raw example templates and suffix on separate lines
    ///
    /// Example values are not substituted: each example contributes the
    /// renderer content as written, so the result stays a template.
    pub fn to_flat(&self) -> FlatTemplate {
        debug!(examples = self.examples().len(), "FewShotBlock::to_flat: called");
        let examples = vec![self.example_renderer().content(); self.examples().len()];
        let content = format!("{}\n{}\n{}", self.prefix(), examples.join(self.separator()), self.suffix());
        FlatTemplate::new(content, self.declared_variables().clone())
    }

    /// Prefix as a system turn, examples as user/assistant turns, suffix as
    /// the final user turn
    pub fn to_chat(&self) -> ChatSequence {
        debug!(examples = self.examples().len(), "FewShotBlock::to_chat: called");
        let mut turns = Vec::new();

        if !self.prefix().trim().is_empty() {
            turns.push(ChatTurn::system(self.prefix()));
        }
        for example in self.examples() {
            match (example.get(INPUT_KEY), example.get(OUTPUT_KEY)) {
                (Some(input), Some(output)) => {
                    turns.push(ChatTurn::user(input.as_str()));
                    turns.push(ChatTurn::assistant(output.as_str()));
                }
                _ => turns.push(ChatTurn::user(self.example_renderer().content())),
            }
        }
        if !self.suffix().trim().is_empty() {
            turns.push(ChatTurn::user(self.suffix()));
        }

        ChatSequence::new(turns, self.declared_variables().clone())
    }
}
