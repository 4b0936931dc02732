//! Export and import plugin contracts.
//!
//! A renderer receives items in **final display order** (the filter
//! engine's output, already sorted and truncated) and must not re-sort.
//! Import adapters mutate the store directly through `push_item`/`dedup`
//! and never touch the raw file format.

use std::path::Path;

use serde_json::json;

use crate::error::Result;
use crate::format;
use crate::model::{Item, TIMESTAMP_FORMAT};
use crate::store::ContentStore;

/// Context handed to renderers alongside the item sequence.
#[derive(Debug, Clone, Default)]
pub struct ExportVariables {
    pub page_title: String,
    /// The full options configuration of the invoking command, for
    /// templates that want to echo it.
    pub options: serde_json::Value,
}

pub trait ExportRenderer {
    fn render(&self, items: &[Item], variables: &ExportVariables) -> Result<String>;
}

pub struct JsonRenderer;

impl ExportRenderer for JsonRenderer {
    fn render(&self, items: &[Item], variables: &ExportVariables) -> Result<String> {
        let entries: Vec<serde_json::Value> = items
            .iter()
            .map(|item| {
                json!({
                    "date": item.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                    "title": item.title,
                    "section": item.section,
                    "note": item.note.lines(),
                    "tags": item.tag_names(),
                })
            })
            .collect();
        let document = json!({
            "title": variables.page_title,
            "items": entries,
        });
        Ok(serde_json::to_string_pretty(&document)?)
    }
}

pub struct MarkdownRenderer;

impl ExportRenderer for MarkdownRenderer {
    fn render(&self, items: &[Item], variables: &ExportVariables) -> Result<String> {
        let mut out = String::new();
        if !variables.page_title.is_empty() {
            out.push_str(&format!("# {}\n\n", variables.page_title));
        }
        for item in items {
            out.push_str(&format!(
                "- `{}` {} *({})*\n",
                item.timestamp.format(TIMESTAMP_FORMAT),
                item.title,
                item.section
            ));
            for line in item.note.lines() {
                out.push_str(&format!("    - {}\n", line));
            }
        }
        Ok(out)
    }
}

/// Looks up a built-in renderer by name.
pub fn renderer_for(name: &str) -> Option<Box<dyn ExportRenderer>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(JsonRenderer)),
        "markdown" | "md" => Some(Box::new(MarkdownRenderer)),
        _ => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Force imported entries into this section instead of the ones the
    /// source file declares.
    pub section: Option<String>,
}

pub trait ImportAdapter {
    /// Imports entries from `path` into the store, returning the number
    /// of new items after deduplication.
    fn import(&self, store: &mut ContentStore, path: &Path, options: &ImportOptions)
        -> Result<usize>;
}

/// Imports another daybook-format file.
pub struct TextImporter;

impl ImportAdapter for TextImporter {
    fn import(
        &self,
        store: &mut ContentStore,
        path: &Path,
        options: &ImportOptions,
    ) -> Result<usize> {
        let text = std::fs::read_to_string(path)?;
        let incoming = format::parse(&text);
        let mut pushed: usize = 0;
        for item in incoming.items() {
            let mut item = item.clone();
            if let Some(section) = &options.section {
                item.section = section.clone();
            }
            store.push_item(item)?;
            pushed += 1;
        }
        let duplicates = store.dedup();
        Ok(pushed.saturating_sub(duplicates))
    }
}
