//! Archiving into a section and rotating out to a sibling file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::filter::dates::{resolve_expression, DayAnchor, TimeBias};
use crate::filter::CaseMode;
use crate::format;
use crate::store::archive::{archive, extract, ArchiveOptions};
use crate::store::ContentStore;
use crate::tags::TagBool;

#[derive(Debug, Clone)]
pub struct ArchiveArgs {
    /// Source section, or "All".
    pub section: String,
    pub destination: String,
    pub keep: usize,
    pub tags: Vec<String>,
    pub tag_bool: TagBool,
    pub search: Option<String>,
    pub case: CaseMode,
    pub before: Option<String>,
    pub label: bool,
}

impl Default for ArchiveArgs {
    fn default() -> Self {
        Self {
            section: crate::model::ALL_SECTIONS.to_string(),
            destination: "Archive".to_string(),
            keep: 0,
            tags: Vec::new(),
            tag_bool: TagBool::default(),
            search: None,
            case: CaseMode::default(),
            before: None,
            label: true,
        }
    }
}

impl ArchiveArgs {
    fn options(&self, now: NaiveDateTime) -> Result<ArchiveOptions> {
        let before = self
            .before
            .as_deref()
            .map(|e| resolve_expression(e, now, TimeBias::Past, DayAnchor::End))
            .transpose()?;
        Ok(ArchiveOptions {
            keep: self.keep,
            tags: self.tags.clone(),
            tag_bool: self.tag_bool,
            search: self.search.clone(),
            case: self.case,
            before,
            label: self.label,
        })
    }
}

/// Moves matching items into the destination section.
pub fn run(store: &mut ContentStore, args: &ArchiveArgs, now: NaiveDateTime) -> Result<CmdResult> {
    let options = args.options(now)?;
    let moved = archive(store, &args.section, &args.destination, &options)?;

    let mut result = CmdResult::default();
    result.report.items_affected = moved;
    result.add_message(CmdMessage::success(format!(
        "Archived {} items from {} to {}",
        moved, args.section, args.destination
    )));
    Ok(result)
}

/// Sibling path for a rotation on `date`: `daybook.md` becomes
/// `daybook_2024-01-10.md`.
pub fn rotation_path(journal: &Path, date: NaiveDateTime) -> PathBuf {
    let stem = journal
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("daybook");
    let name = match journal.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_{}.{}", stem, date.format("%Y-%m-%d"), ext),
        None => format!("{}_{}", stem, date.format("%Y-%m-%d")),
    };
    journal.with_file_name(name)
}

/// Removes matching items from the live store and merges them into the
/// dated sibling file, deduplicated against its existing content.
pub fn rotate(
    store: &mut ContentStore,
    journal: &Path,
    args: &ArchiveArgs,
    now: NaiveDateTime,
) -> Result<CmdResult> {
    let options = args.options(now)?;
    let removed = extract(store, &args.section, &options)?;

    let mut result = CmdResult::default();
    if removed.is_empty() {
        result.add_message(CmdMessage::info("Nothing to rotate"));
        return Ok(result);
    }

    let sibling = rotation_path(journal, now);
    let mut rotated = match fs::read_to_string(&sibling) {
        Ok(text) => format::parse(&text),
        Err(_) => ContentStore::new(),
    };
    let count = removed.len();
    for item in removed {
        rotated.push_item(item)?;
    }
    rotated.dedup();
    fs::write(&sibling, format::serialize(&rotated))?;

    result.report.items_affected = count;
    result.add_message(CmdMessage::success(format!(
        "Rotated {} items to {}",
        count,
        sibling.display()
    )));
    Ok(result)
}
