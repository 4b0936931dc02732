//! # File format
//!
//! Converts between raw journal text and the [`ContentStore`]. The format
//! is line oriented:
//!
//! ```text
//! Currently:
//! - 2024-01-10 09:15 | write the parser @devel
//!     a note line attached to the entry above
//! ```
//!
//! The parser is lenient by design. It never rejects a malformed line;
//! anything it does not understand degrades to leading text (before the
//! first entry), trailing text (top-level lines after entries started),
//! or a note continuation (indented lines under the latest entry). Those
//! buffers are carried verbatim so the serializer can reproduce them byte
//! for byte.
//!
//! Round-trip law: for any file consisting of well-formed section headers
//! and entry lines, `serialize(&parse(text)) == text`, including the
//! original header text. Serialized output is stripped of ANSI escapes so
//! terminal styling can never leak into the file.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Item, Section, TIMESTAMP_FORMAT, UNCATEGORIZED};
use crate::store::ContentStore;

static SECTION_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\S[\S ]+):\s*(?:@\S+\s*)*$").expect("section header regex"));
static ENTRY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*- (\d{4}-\d\d-\d\d \d\d:\d\d) \| (.*)$").expect("entry line regex")
});

/// Prefix used when writing note continuation lines.
const NOTE_INDENT: &str = "\t";

/// Parses raw journal text into a content store. Infallible: malformed
/// lines degrade instead of erroring, and unreadable input is the I/O
/// layer's concern.
pub fn parse(text: &str) -> ContentStore {
    let mut store = ContentStore::new();
    store.final_newline = text.is_empty() || text.ends_with('\n');

    let mut current_section: Option<String> = None;
    let mut last_item: Option<usize> = None;

    for line in text.lines() {
        if let Some(caps) = SECTION_HEADER.captures(line) {
            let name = caps[1].to_string();
            let stored = store.register_section(Section::with_header(name, line));
            current_section = Some(stored);
            continue;
        }
        if let Some(caps) = ENTRY_LINE.captures(line) {
            if let Ok(timestamp) = NaiveDateTime::parse_from_str(&caps[1], TIMESTAMP_FORMAT) {
                let section = match &current_section {
                    Some(name) => name.clone(),
                    None => {
                        // Raw entries before any header land in a
                        // synthesized section.
                        let name =
                            store.register_section(Section::new(UNCATEGORIZED.to_string()));
                        current_section = Some(name.clone());
                        name
                    }
                };
                last_item = Some(store.append_parsed(Item::new(
                    timestamp,
                    caps[2].to_string(),
                    section,
                )));
                continue;
            }
            // A dash line with an impossible date is not an entry; fall
            // through to the degradation rules.
        }
        if line.trim().is_empty() {
            continue;
        }
        match last_item {
            None => store.leading_text.push(line.to_string()),
            Some(index) => {
                if line.starts_with(|c: char| !c.is_whitespace()) {
                    store.trailing_text.push(line.to_string());
                } else {
                    store.note_line(index, line);
                }
            }
        }
    }
    store
}

/// Serializes the store back to journal text.
pub fn serialize(store: &ContentStore) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.extend(store.leading_text.iter().cloned());
    for section in store.sections() {
        lines.push(section.header_line());
        for item in store.items_in(&section.name) {
            lines.push(format!(
                "- {} | {}",
                item.timestamp.format(TIMESTAMP_FORMAT),
                item.title
            ));
            for note_line in item.note.lines() {
                lines.push(format!("{}{}", NOTE_INDENT, note_line));
            }
        }
    }
    lines.extend(store.trailing_text.iter().cloned());

    if lines.is_empty() {
        return String::new();
    }
    let mut output = lines.join("\n");
    if store.final_newline {
        output.push('\n');
    }
    // Styling must never reach the file.
    console::strip_ansi_codes(&output).into_owned()
}
