//! Bulk relocation of old entries.
//!
//! Archive moves items into a destination section inside the same store;
//! rotate extracts them so the caller can merge them into a dated sibling
//! file. Both share one selection rule: per source section, the most
//! recent `keep` items stay put, and of the rest only items passing the
//! tag, search, and date gates are taken.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::error::Result;
use crate::filter::{search_matches, CaseMode};
use crate::model::{Item, ALL_SECTIONS};
use crate::tags::{self, TagBool};

use super::ContentStore;

/// Selection and labelling options shared by archive and rotate.
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// Number of most recent items per source section left untouched.
    pub keep: usize,
    /// Only items whose tags satisfy this combination are taken.
    pub tags: Vec<String>,
    pub tag_bool: TagBool,
    /// Only items matching this query are taken.
    pub search: Option<String>,
    pub case: CaseMode,
    /// Only items at or before this instant are taken.
    pub before: Option<NaiveDateTime>,
    /// Stamp moved items with `@from(<source section>)`.
    pub label: bool,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
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

impl ArchiveOptions {
    fn eligible(&self, item: &Item) -> bool {
        if !self.tags.is_empty() && !tags::matches_tags(&item.title, &self.tags, self.tag_bool) {
            return false;
        }
        if let Some(query) = &self.search {
            if !search_matches(&item.search_text(), query, self.case) {
                return false;
            }
        }
        if let Some(cutoff) = self.before {
            if item.timestamp > cutoff {
                return false;
            }
        }
        true
    }
}

/// Ids of the items the options select from `source` ("All" for every
/// section). The destination section, when given, is never a source.
fn select(
    store: &ContentStore,
    source: &str,
    destination: Option<&str>,
    opts: &ArchiveOptions,
) -> Result<Vec<Uuid>> {
    let sources: Vec<String> = if source.eq_ignore_ascii_case(ALL_SECTIONS) {
        store
            .sections()
            .iter()
            .map(|s| s.name.clone())
            .filter(|name| {
                destination
                    .map(|d| !d.eq_ignore_ascii_case(name))
                    .unwrap_or(true)
            })
            .collect()
    } else {
        vec![store.guess_section(source)?]
    };

    let mut selected = Vec::new();
    for section in sources {
        let mut in_section = store.items_in(&section);
        in_section.sort_by_key(|i| std::cmp::Reverse(i.timestamp));
        selected.extend(
            in_section
                .into_iter()
                .skip(opts.keep)
                .filter(|i| opts.eligible(i))
                .map(|i| i.id),
        );
    }
    Ok(selected)
}

/// Moves selected items from `source` into `destination`, creating the
/// destination section if needed. Returns the number moved.
pub fn archive(
    store: &mut ContentStore,
    source: &str,
    destination: &str,
    opts: &ArchiveOptions,
) -> Result<usize> {
    let destination = store.ensure_section(destination)?;
    if source.eq_ignore_ascii_case(&destination) {
        return Err(crate::error::DaybookError::Runtime(format!(
            "cannot archive {} into itself",
            destination
        )));
    }
    let ids = select(store, source, Some(&destination), opts)?;
    for id in &ids {
        store.move_item(*id, &destination, opts.label)?;
    }
    Ok(ids.len())
}

/// Removes selected items from the store and returns them in file order,
/// for merging into a rotation sibling file.
pub fn extract(
    store: &mut ContentStore,
    source: &str,
    opts: &ArchiveOptions,
) -> Result<Vec<Item>> {
    let ids = select(store, source, None, opts)?;
    let mut removed: Vec<Item> = Vec::with_capacity(ids.len());
    // Delete in file order so the sibling file reads like the original.
    let mut ordered: Vec<(usize, Uuid)> = ids
        .into_iter()
        .filter_map(|id| store.items().iter().position(|i| i.id == id).map(|p| (p, id)))
        .collect();
    ordered.sort_by_key(|(position, _)| *position);
    for (_, id) in ordered {
        removed.push(store.delete_item(id)?);
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TIMESTAMP_FORMAT;
    use crate::store::AddOptions;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    fn work_store() -> ContentStore {
        let mut store = ContentStore::new();
        for (date, title) in [
            ("2024-01-06 09:00", "first"),
            ("2024-01-07 09:00", "second"),
            ("2024-01-08 09:00", "third"),
            ("2024-01-09 09:00", "fourth"),
            ("2024-01-10 09:00", "fifth"),
        ] {
            store
                .add_item(title, "Work", ts(date), AddOptions::default())
                .unwrap();
        }
        store
    }

    #[test]
    fn archive_keeps_most_recent() {
        let mut store = work_store();
        let opts = ArchiveOptions {
            keep: 2,
            label: false,
            ..ArchiveOptions::default()
        };
        let moved = archive(&mut store, "Work", "Archive", &opts).unwrap();
        assert_eq!(moved, 3);

        let remaining: Vec<&str> = store
            .items_in("Work")
            .iter()
            .map(|i| i.title.as_str())
            .collect();
        assert_eq!(remaining, ["fourth", "fifth"]);
        assert_eq!(store.items_in("Archive").len(), 3);
    }

    #[test]
    fn archive_labels_origin() {
        let mut store = work_store();
        let moved = archive(&mut store, "Work", "Archive", &ArchiveOptions::default()).unwrap();
        assert_eq!(moved, 5);
        for item in store.items_in("Archive") {
            assert!(item.title.ends_with("@from(Work)"), "{}", item.title);
        }
    }

    #[test]
    fn archive_all_sections_skips_destination() {
        let mut store = work_store();
        store
            .add_item("already archived", "Archive", ts("2024-01-05 09:00"), AddOptions::default())
            .unwrap();
        let opts = ArchiveOptions {
            label: false,
            ..ArchiveOptions::default()
        };
        let moved = archive(&mut store, "All", "Archive", &opts).unwrap();
        assert_eq!(moved, 5);
        assert_eq!(store.items_in("Archive").len(), 6);
    }

    #[test]
    fn archive_respects_tag_gate() {
        let mut store = ContentStore::new();
        store
            .add_item("keep me", "Work", ts("2024-01-06 09:00"), AddOptions::default())
            .unwrap();
        store
            .add_item("take me @old", "Work", ts("2024-01-07 09:00"), AddOptions::default())
            .unwrap();
        let opts = ArchiveOptions {
            tags: vec!["old".into()],
            label: false,
            ..ArchiveOptions::default()
        };
        let moved = archive(&mut store, "Work", "Archive", &opts).unwrap();
        assert_eq!(moved, 1);
        assert_eq!(store.items_in("Work")[0].title, "keep me");
    }

    #[test]
    fn archive_respects_before_gate() {
        let mut store = work_store();
        let opts = ArchiveOptions {
            before: Some(ts("2024-01-08 09:00")),
            label: false,
            ..ArchiveOptions::default()
        };
        let moved = archive(&mut store, "Work", "Archive", &opts).unwrap();
        assert_eq!(moved, 3);
        assert_eq!(store.items_in("Work").len(), 2);
    }

    #[test]
    fn extract_removes_in_file_order() {
        let mut store = work_store();
        let opts = ArchiveOptions {
            keep: 3,
            label: false,
            ..ArchiveOptions::default()
        };
        let removed = extract(&mut store, "Work", &opts).unwrap();
        let titles: Vec<&str> = removed.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["first", "second"]);
        assert_eq!(store.items().len(), 3);
        // The section registry survives even when emptied.
        assert!(store.has_section("Work"));
    }

    #[test]
    fn unknown_source_section_fails() {
        let mut store = work_store();
        let result = archive(&mut store, "Nowhere", "Archive", &ArchiveOptions::default());
        assert!(result.is_err());
    }
}
