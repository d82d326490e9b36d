//! CLI argument parsing for pt

use clap::{Args, Parser, Subcommand, ValueEnum};
use eyre::{Result, eyre};
use std::path::PathBuf;

use crate::chat::ChatSequence;
use crate::flat::FlatTemplate;
use crate::render::Bindings;
use crate::template::{PromptTemplate, TemplateKind};

#[derive(Parser, Debug)]
#[command(name = "pt")]
#[command(author, version, about = "Render, inspect and convert prompt templates", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the placeholders referenced by a text
    Vars {
        /// Template text
        text: String,
    },

    /// Render a template with variable values
    Render {
        #[command(flatten)]
        template: TemplateArgs,

        /// Variable value as NAME=VALUE (repeatable)
        #[arg(long = "var", value_name = "NAME=VALUE")]
        vars: Vec<String>,
    },

    /// Check that all required variables are supplied
    Validate {
        #[command(flatten)]
        template: TemplateArgs,

        /// Variable value as NAME=VALUE (repeatable)
        #[arg(long = "var", value_name = "NAME=VALUE")]
        vars: Vec<String>,
    },

    /// Convert a template to another representation and print it as JSON
    Convert {
        #[command(flatten)]
        template: TemplateArgs,

        /// Target representation
        #[arg(short, long, value_enum)]
        to: KindArg,

        /// Few-shot prefix (overrides config)
        #[arg(long)]
        prefix: Option<String>,

        /// Few-shot suffix
        #[arg(long)]
        suffix: Option<String>,

        /// Separator between few-shot examples (overrides config)
        #[arg(long)]
        separator: Option<String>,
    },

    /// Print the JSON schema of a template's inputs
    Schema {
        #[command(flatten)]
        template: TemplateArgs,
    },

    /// Write a config file holding the default settings
    InitConfig {
        /// Destination (defaults to the user config directory)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// A flat template text, or chat messages
#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// Flat template text
    #[arg(conflicts_with = "messages", required_unless_present = "messages")]
    pub text: Option<String>,

    /// Chat message as ROLE=CONTENT (repeatable, keeps order)
    #[arg(short = 'm', long = "message", value_name = "ROLE=CONTENT")]
    pub messages: Vec<String>,
}

impl TemplateArgs {
    /// Build the template these arguments describe
    pub fn to_template(&self) -> Result<PromptTemplate> {
        if let Some(text) = &self.text {
            return Ok(FlatTemplate::from_template(text.as_str()).into());
        }
        let pairs = self
            .messages
            .iter()
            .map(|m| split_pair(m, "ROLE=CONTENT"))
            .collect::<Result<Vec<_>>>()?;
        Ok(ChatSequence::from_messages(pairs).into())
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    Flat,
    Chat,
    FewShot,
}

impl From<KindArg> for TemplateKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Flat => TemplateKind::Flat,
            KindArg::Chat => TemplateKind::Chat,
            KindArg::FewShot => TemplateKind::FewShot,
        }
    }
}

/// Parse repeated NAME=VALUE arguments into a binding
pub fn parse_bindings(vars: &[String]) -> Result<Bindings> {
    vars.iter().map(|v| split_pair(v, "NAME=VALUE")).collect()
}

fn split_pair(raw: &str, expected: &str) -> Result<(String, String)> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| eyre!("Expected {}, got '{}'", expected, raw))
}
