//! prompt-templates - prompt templates with variable tracking
//!
//! Three interchangeable representations of a prompt:
//!
//! - [`FlatTemplate`] - a single string with `{name}` placeholders
//! - [`ChatSequence`] - role-tagged turns that can be edited in place
//! - [`FewShotBlock`] - prefix, rendered examples and suffix
//!
//! Each keeps a list of declared variables. Chat sequence edits keep that list
//! in step with the turns, and [`auto_convert`] moves a template between the
//! three forms.
//!
//! # Example
//!
//! ```
//! use prompt_templates::{ChatSequence, TemplateKind, PromptTemplate, bindings};
//!
//! let mut chat = ChatSequence::from_messages([("system", "You are {role}"), ("user", "Explain {concept}")]);
//! chat.add_user("Show {concept} in code", None)?;
//! assert_eq!(chat.declared_variables().as_slice(), ["role", "concept"]);
//!
//! let turns = chat.render(&bindings([("role", "a tutor"), ("concept", "traits")]))?;
//! assert_eq!(turns[1].content, "Explain traits");
//!
//! let flat = PromptTemplate::from(chat).convert(TemplateKind::Flat);
//! assert!(flat.as_flat().unwrap().content().starts_with("[SYSTEM]: You are {role}"));
//! # Ok::<(), prompt_templates::TemplateError>(())
//! ```

pub mod builder;
pub mod chat;
pub mod cli;
pub mod config;
pub mod convert;
mod error;
pub mod few_shot;
pub mod flat;
pub mod render;
pub mod template;
pub mod variables;

pub use builder::ChatPromptBuilder;
pub use chat::{ChatSequence, ChatTurn, RenderedTurn, Role};
pub use convert::{ConversionOptions, auto_convert, convert_template};
pub use error::{Result, TemplateError};
pub use few_shot::{Example, FewShotBlock, example};
pub use flat::FlatTemplate;
pub use render::{Bindings, Rendered, bindings, substitute};
pub use template::{PromptTemplate, TemplateKind, input_schema};
pub use variables::{VariableSet, extract_variables};

/// Default separator placed between rendered examples
pub const DEFAULT_EXAMPLE_SEPARATOR: &str = "\n\n";
