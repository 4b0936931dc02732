//! # Content Store
//!
//! [`ContentStore`] owns all sections and items for one load→mutate→save
//! cycle, plus the two opaque buffers holding text the parser did not
//! understand (`leading_text` before the first section header,
//! `trailing_text` after the last parseable line). Nothing here touches
//! the filesystem; parsing and serialization live in [`crate::format`]
//! and file I/O in the api facade.
//!
//! Mutations address items by id. A stale id is a caller bug and fails
//! with [`DaybookError::ItemNotFound`] rather than being silently
//! ignored.
//!
//! Invariants:
//! - section names are unique under case-insensitive comparison, and the
//!   reserved pseudo-section "All" is never stored;
//! - every item's `section` names a stored section;
//! - item order is insertion order (file order), which the serializer and
//!   the filter engine's tie-break rules both rely on.

pub mod archive;

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::error::{DaybookError, Result};
use crate::model::{cap_first, Item, Note, Section, ALL_SECTIONS, TIMESTAMP_FORMAT};
use crate::tags::{self, TagEdit};

#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    sections: Vec<Section>,
    items: Vec<Item>,
    /// Unparseable content positioned before the first section header.
    pub leading_text: Vec<String>,
    /// Unparseable top-level content after entries have started.
    pub trailing_text: Vec<String>,
    /// Whether the source file ended with a newline. Serialization
    /// preserves this so round-trips are byte exact.
    pub(crate) final_newline: bool,
}

/// Options for [`ContentStore::add_item`].
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    pub note: Option<Note>,
    /// Close out the most recent open entry by stamping it
    /// `@done(<new entry's date>)` before this one is appended.
    pub timed: bool,
}

impl ContentStore {
    pub fn new() -> Self {
        Self {
            final_newline: true,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
            && self.items.is_empty()
            && self.leading_text.is_empty()
            && self.trailing_text.is_empty()
    }

    // --- Sections ---

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Ensures a section with this name exists and returns its stored
    /// spelling. New sections are spelled cap-first; matching is
    /// case-insensitive. "All" is reserved and never created.
    pub fn ensure_section(&mut self, name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case(ALL_SECTIONS) {
            return Err(DaybookError::InvalidSection(name.to_string()));
        }
        if let Some(existing) = self.section(name) {
            return Ok(existing.name.clone());
        }
        let canonical = cap_first(name);
        self.sections.push(Section::new(canonical.clone()));
        Ok(canonical)
    }

    /// Registers a section parsed from a header line. A repeated header
    /// folds into the first occurrence, keeping its original text.
    pub fn register_section(&mut self, section: Section) -> String {
        if let Some(existing) = self.section(&section.name) {
            return existing.name.clone();
        }
        let name = section.name.clone();
        self.sections.push(section);
        name
    }

    /// Resolves user input to a stored section name: case-insensitive
    /// exact match, then unique prefix, then unique substring. "All"
    /// passes through untouched.
    pub fn guess_section(&self, input: &str) -> Result<String> {
        let input = input.trim();
        if input.eq_ignore_ascii_case(ALL_SECTIONS) {
            return Ok(ALL_SECTIONS.to_string());
        }
        if let Some(section) = self.section(input) {
            return Ok(section.name.clone());
        }
        let lowered = input.to_lowercase();
        let prefixed: Vec<&Section> = self
            .sections
            .iter()
            .filter(|s| s.name.to_lowercase().starts_with(&lowered))
            .collect();
        if let [only] = prefixed.as_slice() {
            return Ok(only.name.clone());
        }
        let contained: Vec<&Section> = self
            .sections
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&lowered))
            .collect();
        if let [only] = contained.as_slice() {
            return Ok(only.name.clone());
        }
        Err(DaybookError::InvalidSection(input.to_string()))
    }

    // --- Items ---

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn items_in(&self, section: &str) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|i| i.section.eq_ignore_ascii_case(section))
            .collect()
    }

    pub fn item(&self, id: Uuid) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    /// Appends an item whose section the parser has already registered.
    /// Returns the item's index for note attachment.
    pub(crate) fn append_parsed(&mut self, item: Item) -> usize {
        self.items.push(item);
        self.items.len() - 1
    }

    /// Attaches a continuation line to the item at `index`.
    pub(crate) fn note_line(&mut self, index: usize, line: &str) {
        if let Some(item) = self.items.get_mut(index) {
            item.note.push_line(line);
        }
    }

    /// Appends a fully formed item, creating its section if needed. Used
    /// by the parser and by rotate's merge path.
    pub fn push_item(&mut self, mut item: Item) -> Result<Uuid> {
        item.section = self.ensure_section(&item.section)?;
        let id = item.id;
        self.items.push(item);
        Ok(id)
    }

    /// Creates and appends a new entry. The title's internal whitespace
    /// is normalized; autotagging and default tags are the caller's
    /// concern (see `commands::add`).
    pub fn add_item(
        &mut self,
        title: &str,
        section: &str,
        date: NaiveDateTime,
        opts: AddOptions,
    ) -> Result<Uuid> {
        let section = self.ensure_section(section)?;
        if opts.timed {
            self.close_last_open(date);
        }
        let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
        let mut item = Item::new(date, title, section);
        if let Some(note) = opts.note {
            item.note = note;
        }
        let id = item.id;
        self.items.push(item);
        Ok(id)
    }

    /// Stamps `@done(<backdate>)` on the most recent entry that has no
    /// done tag yet. The walk is reverse chronological so "the previous
    /// open entry" wins even in a backdated file.
    fn close_last_open(&mut self, backdate: NaiveDateTime) {
        let mut order: Vec<usize> = (0..self.items.len()).collect();
        order.sort_by_key(|&i| self.items[i].timestamp);
        for index in order.into_iter().rev() {
            if !self.items[index].finished() {
                let stamp = backdate.format(TIMESTAMP_FORMAT).to_string();
                let (title, _) =
                    tags::set_tag(&self.items[index].title, "done", &TagEdit::add_value(stamp));
                self.items[index].title = title;
                return;
            }
        }
    }

    /// Reassigns an item to another section, creating the target if it
    /// does not exist. With `label` the item is stamped
    /// `@from(<original section>)`, overwriting any prior `@from`.
    pub fn move_item(&mut self, id: Uuid, target: &str, label: bool) -> Result<()> {
        let target = self.ensure_section(target)?;
        let position = self.position(id).ok_or(DaybookError::ItemNotFound(id))?;
        let origin = self.items[position].section.clone();
        if label {
            let (title, _) = tags::set_tag(
                &self.items[position].title,
                "from",
                &TagEdit::forced(Some(origin)),
            );
            self.items[position].title = title;
        }
        self.items[position].section = target;
        Ok(())
    }

    pub fn delete_item(&mut self, id: Uuid) -> Result<Item> {
        let position = self.position(id).ok_or(DaybookError::ItemNotFound(id))?;
        Ok(self.items.remove(position))
    }

    /// Replaces the item at `id`'s position. The replacement keeps the
    /// original id so held references stay live across the update.
    pub fn update_item(&mut self, id: Uuid, mut new_item: Item) -> Result<()> {
        let position = self.position(id).ok_or(DaybookError::ItemNotFound(id))?;
        new_item.section = self.ensure_section(&new_item.section)?;
        new_item.id = id;
        self.items[position] = new_item;
        Ok(())
    }

    /// Removes items whose `(timestamp, title)` duplicates an earlier
    /// entry. Returns the number removed. Import adapters and rotate's
    /// merge both rely on this.
    pub fn dedup(&mut self) -> usize {
        let mut kept: Vec<Item> = Vec::with_capacity(self.items.len());
        let mut removed = 0;
        for item in self.items.drain(..) {
            if kept.iter().any(|k| k.same_entry(&item)) {
                removed += 1;
            } else {
                kept.push(item);
            }
        }
        self.items = kept;
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Note;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    fn store_with(entries: &[(&str, &str, &str)]) -> ContentStore {
        let mut store = ContentStore::new();
        for (date, title, section) in entries {
            store
                .add_item(title, section, ts(date), AddOptions::default())
                .unwrap();
        }
        store
    }

    #[test]
    fn sections_created_cap_first_and_deduped() {
        let mut store = ContentStore::new();
        store.ensure_section("work").unwrap();
        store.ensure_section("WORK").unwrap();
        assert_eq!(store.sections().len(), 1);
        assert_eq!(store.sections()[0].name, "Work");
    }

    #[test]
    fn all_is_reserved() {
        let mut store = ContentStore::new();
        assert!(matches!(
            store.ensure_section("All"),
            Err(DaybookError::InvalidSection(_))
        ));
    }

    #[test]
    fn add_item_normalizes_whitespace() {
        let store = store_with(&[("2024-01-10 09:00", "fix   the \t parser", "Work")]);
        assert_eq!(store.items()[0].title, "fix the parser");
    }

    #[test]
    fn guess_section_prefix_and_substring() {
        let store = store_with(&[
            ("2024-01-10 09:00", "a", "Work"),
            ("2024-01-10 09:01", "b", "Later"),
        ]);
        assert_eq!(store.guess_section("wo").unwrap(), "Work");
        assert_eq!(store.guess_section("ate").unwrap(), "Later");
        assert_eq!(store.guess_section("All").unwrap(), "All");
        assert!(store.guess_section("nope").is_err());
    }

    #[test]
    fn timed_add_closes_previous_open_entry() {
        let mut store = store_with(&[
            ("2024-01-10 09:00", "first task", "Work"),
            ("2024-01-10 10:00", "second task @done(2024-01-10 10:30)", "Work"),
        ]);
        store
            .add_item(
                "third task",
                "Work",
                ts("2024-01-10 11:00"),
                AddOptions {
                    timed: true,
                    ..AddOptions::default()
                },
            )
            .unwrap();
        // "first task" was the most recent entry without a done tag.
        assert_eq!(
            store.items()[0].title,
            "first task @done(2024-01-10 11:00)"
        );
        assert_eq!(store.items()[2].title, "third task");
    }

    #[test]
    fn move_item_labels_origin() {
        let mut store = store_with(&[("2024-01-10 09:00", "task", "Work")]);
        let id = store.items()[0].id;
        store.move_item(id, "Archive", true).unwrap();
        let item = store.item(id).unwrap();
        assert_eq!(item.section, "Archive");
        assert_eq!(item.title, "task @from(Work)");
        assert!(store.has_section("Archive"));
    }

    #[test]
    fn move_item_relabel_overwrites_from() {
        let mut store = store_with(&[("2024-01-10 09:00", "task", "Work")]);
        let id = store.items()[0].id;
        store.move_item(id, "Later", true).unwrap();
        store.move_item(id, "Archive", true).unwrap();
        assert_eq!(store.item(id).unwrap().title, "task @from(Later)");
    }

    #[test]
    fn delete_by_stale_id_fails() {
        let mut store = store_with(&[("2024-01-10 09:00", "task", "Work")]);
        let id = store.items()[0].id;
        store.delete_item(id).unwrap();
        assert!(matches!(
            store.delete_item(id),
            Err(DaybookError::ItemNotFound(_))
        ));
    }

    #[test]
    fn update_keeps_id_and_position() {
        let mut store = store_with(&[
            ("2024-01-10 09:00", "first", "Work"),
            ("2024-01-10 10:00", "second", "Work"),
        ]);
        let id = store.items()[0].id;
        let mut replacement = store.item(id).unwrap().clone();
        replacement.title = "first edited".into();
        replacement.note = Note::from_text("added a note");
        store.update_item(id, replacement).unwrap();
        assert_eq!(store.items()[0].title, "first edited");
        assert_eq!(store.items()[0].id, id);
    }

    #[test]
    fn dedup_removes_repeated_entries() {
        let mut store = store_with(&[
            ("2024-01-10 09:00", "task", "Work"),
            ("2024-01-10 09:00", "task", "Work"),
            ("2024-01-10 09:00", "task", "Later"),
        ]);
        // Same timestamp and title counts as the same entry even across
        // sections.
        assert_eq!(store.dedup(), 2);
        assert_eq!(store.items().len(), 1);
    }
}
