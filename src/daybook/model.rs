//! # Domain Model: Items, Notes, Sections
//!
//! An [`Item`] is one journal entry: a timestamp at minute resolution, a
//! single-line title that may embed `@name` / `@name(value)` tags, the name
//! of the section it lives in, and an optional [`Note`] of continuation
//! lines. A [`Section`] is a named partition of items; the original header
//! line is kept verbatim so files round-trip byte for byte.
//!
//! Timestamps are `NaiveDateTime`: journal lines carry no timezone, and the
//! file is interpreted in the wall clock it was written in. Entries may be
//! backdated, so no global ordering is enforced here.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use uuid::Uuid;

use crate::tags;

/// Timestamp format used on entry lines (`%F %R`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Section name given to raw entries that appear before any header.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Reserved pseudo-section meaning "no section filter". Never stored.
pub const ALL_SECTIONS: &str = "All";

/// Ordered continuation lines attached to one item.
///
/// An empty note means "no note"; it is distinct from a note containing
/// empty lines. Lines are stored without their leading indentation, the
/// serializer re-indents with a single tab.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Note(Vec<String>);

impl Note {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Builds a note from free text, one line per text line, trimmed.
    /// Returns an empty note for blank input.
    pub fn from_text(text: &str) -> Self {
        Self(
            text.lines()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
        )
    }

    pub fn push_line(&mut self, line: &str) {
        self.0.push(line.trim().to_string());
    }

    pub fn lines(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends the lines of `other`, skipping exact duplicates.
    pub fn merge(&mut self, other: &Note) {
        for line in other.lines() {
            if !self.0.contains(line) {
                self.0.push(line.clone());
            }
        }
    }
}

/// One journal entry.
#[derive(Debug, Clone, Serialize)]
pub struct Item {
    /// Stable identity for one load→mutate→save cycle. Assigned at parse
    /// or creation time; update/delete address items by this id.
    pub id: Uuid,
    pub timestamp: NaiveDateTime,
    pub title: String,
    pub section: String,
    pub note: Note,
}

impl Item {
    pub fn new(timestamp: NaiveDateTime, title: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            title: title.into(),
            section: section.into(),
            note: Note::new(),
        }
    }

    pub fn with_note(mut self, note: Note) -> Self {
        self.note = note;
        self
    }

    /// Elapsed duration between the item's start and its `@done` stamp.
    /// `None` when the item is unfinished or the stamp has no parseable
    /// value.
    pub fn interval(&self) -> Option<Duration> {
        let value = tags::tag_value(&self.title, "done")?;
        let end = NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).ok()?;
        Some(end - self.timestamp)
    }

    /// True if the title carries a `@done` tag, with or without a value.
    pub fn finished(&self) -> bool {
        tags::has_tag(&self.title, "done")
    }

    /// Lowercased names of all tags embedded in the title.
    pub fn tag_names(&self) -> Vec<String> {
        tags::tag_names(&self.title)
    }

    /// Title plus note text, used by free-text search.
    pub fn search_text(&self) -> String {
        if self.note.is_empty() {
            self.title.clone()
        } else {
            let mut text = self.title.clone();
            for line in self.note.lines() {
                text.push('\n');
                text.push_str(line);
            }
            text
        }
    }

    /// Two items are considered the same entry for dedup purposes when
    /// timestamp and title agree. Ids are deliberately ignored.
    pub fn same_entry(&self, other: &Item) -> bool {
        self.timestamp == other.timestamp && self.title == other.title
    }
}

/// A named partition of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Case-preserving unique name.
    pub name: String,
    /// The exact header line as read from the file, including any trailing
    /// tag annotations. `None` for sections created in memory; the
    /// serializer then synthesizes `"<name>:"`.
    pub original_header: Option<String>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            original_header: None,
        }
    }

    pub fn with_header(name: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            original_header: Some(header.into()),
        }
    }

    /// The header line to write for this section.
    pub fn header_line(&self) -> String {
        match &self.original_header {
            Some(h) => h.clone(),
            None => format!("{}:", self.name),
        }
    }
}

/// Canonical "cap-first" form used when synthesizing section names from
/// user input. Matching stays case-insensitive; this only decides how a
/// new section is spelled.
pub fn cap_first(name: &str) -> String {
    let mut chars = name.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn interval_from_done_tag() {
        let item = Item::new(ts("2024-01-10 09:00"), "task @done(2024-01-10 10:30)", "Work");
        assert_eq!(item.interval(), Some(Duration::minutes(90)));
    }

    #[test]
    fn interval_missing_without_done() {
        let item = Item::new(ts("2024-01-10 09:00"), "task @started", "Work");
        assert_eq!(item.interval(), None);
        assert!(!item.finished());
    }

    #[test]
    fn interval_missing_with_unparseable_done() {
        let item = Item::new(ts("2024-01-10 09:00"), "task @done(soonish)", "Work");
        assert!(item.finished());
        assert_eq!(item.interval(), None);
    }

    #[test]
    fn note_from_text_drops_blank_lines() {
        let note = Note::from_text("first\n\n  second  \n");
        assert_eq!(note.lines(), ["first", "second"]);
    }

    #[test]
    fn note_merge_skips_duplicates() {
        let mut a = Note::from_text("one\ntwo");
        a.merge(&Note::from_text("two\nthree"));
        assert_eq!(a.lines(), ["one", "two", "three"]);
    }

    #[test]
    fn search_text_includes_note() {
        let item = Item::new(ts("2024-01-10 09:00"), "title", "Work")
            .with_note(Note::from_text("note line"));
        assert_eq!(item.search_text(), "title\nnote line");
    }

    #[test]
    fn section_header_synthesized_when_absent() {
        assert_eq!(Section::new("Work").header_line(), "Work:");
        assert_eq!(
            Section::with_header("Work", "Work: @hidden").header_line(),
            "Work: @hidden"
        );
    }

    #[test]
    fn cap_first_forms() {
        assert_eq!(cap_first("work"), "Work");
        assert_eq!(cap_first("WORK"), "WORK");
        assert_eq!(cap_first("  later  "), "Later");
        assert_eq!(cap_first(""), "");
    }

    #[test]
    fn same_entry_ignores_id_and_section() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let a = Item::new(date, "task", "Work");
        let b = Item::new(date, "task", "Archive");
        assert!(a.same_entry(&b));
        assert_ne!(a.id, b.id);
    }
}
