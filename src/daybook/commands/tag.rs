//! Batch tag mutation over a filtered selection.

use chrono::NaiveDateTime;

use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::filter::{filter_items, FilterCriteria};
use crate::hooks::HookSet;
use crate::store::ContentStore;
use crate::tags::{set_tag, TagEdit};

#[derive(Debug, Clone, Default)]
pub struct TagArgs {
    /// Tag names to apply or remove.
    pub tags: Vec<String>,
    pub value: Option<String>,
    pub remove: bool,
    /// Rename the (single) named tag to this.
    pub rename_to: Option<String>,
    pub force: bool,
}

impl TagArgs {
    fn edit(&self) -> TagEdit {
        TagEdit {
            value: self.value.clone(),
            remove: self.remove,
            rename_to: self.rename_to.clone(),
            force: self.force,
        }
    }
}

/// Applies the tag edit to every item matching the criteria. Items whose
/// title actually changed are updated in place and reported.
pub fn run(
    store: &mut ContentStore,
    hooks: &HookSet,
    criteria: &FilterCriteria,
    args: &TagArgs,
    now: NaiveDateTime,
) -> Result<CmdResult> {
    let selection = filter_items(store.items(), criteria, now)?;
    let mut result = CmdResult::default();

    for selected in &selection {
        let mut item = match store.item(selected.id) {
            Some(item) => item.clone(),
            None => continue,
        };
        let original = item.title.clone();
        for name in &args.tags {
            let (next, change) = set_tag(&item.title, name, &args.edit());
            result.report.tags_added += change.added.len();
            result.report.tags_removed += change.removed.len();
            item.title = next;
        }
        if item.title != original {
            store.update_item(item.id, item.clone())?;
            hooks.post_entry_updated(&item);
            result.report.items_affected += 1;
            result.listed.push(item);
        }
    }

    let verb = if args.remove { "Untagged" } else { "Tagged" };
    result.add_message(CmdMessage::success(format!(
        "{} {} of {} matching entries",
        verb,
        result.report.items_affected,
        selection.len()
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TIMESTAMP_FORMAT;
    use crate::store::AddOptions;
    use crate::tags::tag_names;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    fn now() -> NaiveDateTime {
        ts("2024-01-10 12:00")
    }

    fn store_with_items() -> ContentStore {
        let mut store = ContentStore::new();
        store
            .add_item("first", "Work", ts("2024-01-09 09:00"), AddOptions::default())
            .unwrap();
        store
            .add_item("second @urgent", "Work", ts("2024-01-09 10:00"), AddOptions::default())
            .unwrap();
        store
    }

    #[test]
    fn tags_most_recent_entry() {
        let mut store = store_with_items();
        let criteria = FilterCriteria {
            count: 1,
            ..FilterCriteria::default()
        };
        let args = TagArgs {
            tags: vec!["urgent".into()],
            ..TagArgs::default()
        };
        let result = run(&mut store, &HookSet::new(), &criteria, &args, now()).unwrap();
        // The most recent entry already carries @urgent, so nothing
        // changes.
        assert_eq!(result.report.items_affected, 0);
    }

    #[test]
    fn tags_filtered_selection() {
        let mut store = store_with_items();
        let args = TagArgs {
            tags: vec!["review".into()],
            ..TagArgs::default()
        };
        let result = run(
            &mut store,
            &HookSet::new(),
            &FilterCriteria::default(),
            &args,
            now(),
        )
        .unwrap();
        assert_eq!(result.report.items_affected, 2);
        assert_eq!(result.report.tags_added, 2);
        for item in store.items() {
            assert!(tag_names(&item.title).contains(&"review".to_string()));
        }
    }

    #[test]
    fn remove_reports_counts() {
        let mut store = store_with_items();
        let args = TagArgs {
            tags: vec!["urgent".into()],
            remove: true,
            ..TagArgs::default()
        };
        let result = run(
            &mut store,
            &HookSet::new(),
            &FilterCriteria::default(),
            &args,
            now(),
        )
        .unwrap();
        assert_eq!(result.report.items_affected, 1);
        assert_eq!(result.report.tags_removed, 1);
        assert_eq!(store.items()[1].title, "second");
    }

    #[test]
    fn rename_carries_value() {
        let mut store = ContentStore::new();
        store
            .add_item("task @est(2h)", "Work", ts("2024-01-09 09:00"), AddOptions::default())
            .unwrap();
        let args = TagArgs {
            tags: vec!["est".into()],
            rename_to: Some("estimate".into()),
            ..TagArgs::default()
        };
        run(
            &mut store,
            &HookSet::new(),
            &FilterCriteria::default(),
            &args,
            now(),
        )
        .unwrap();
        assert_eq!(store.items()[0].title, "task @estimate(2h)");
    }
}
