//! # Command Layer
//!
//! Business logic for each operation, UI-agnostic. Commands operate on
//! the store and return a structured [`CmdResult`]; they never print and
//! never touch stdout, stderr, or exit codes. Counters that a global
//! logger would otherwise accumulate are returned explicitly in the
//! [`MutationReport`] so the CLI layer decides how to present them.

pub mod add;
pub mod archive;
pub mod show;
pub mod tag;

use serde::Serialize;

use crate::model::Item;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

/// Counters describing what a mutation did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MutationReport {
    pub items_affected: usize,
    pub tags_added: usize,
    pub tags_removed: usize,
}

impl MutationReport {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Structured outcome of a command.
#[derive(Debug, Default)]
pub struct CmdResult {
    /// Items to display, already in final display order.
    pub listed: Vec<Item>,
    pub messages: Vec<CmdMessage>,
    pub report: MutationReport,
}

impl CmdResult {
    pub fn with_listed(mut self, items: Vec<Item>) -> Self {
        self.listed = items;
        self
    }

    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }
}
