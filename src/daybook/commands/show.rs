//! Listing entries through the filter engine.

use chrono::NaiveDateTime;

use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::filter::{filter_items, FilterCriteria};
use crate::store::ContentStore;

/// Runs the criteria and returns matching items in final display order.
pub fn run(
    store: &ContentStore,
    criteria: &FilterCriteria,
    now: NaiveDateTime,
) -> Result<CmdResult> {
    let listed = filter_items(store.items(), criteria, now)?;
    let mut result = CmdResult::default().with_listed(listed);
    if result.listed.is_empty() {
        result.add_message(CmdMessage::info("No matching entries"));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TIMESTAMP_FORMAT;
    use crate::store::AddOptions;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn lists_matching_items() {
        let mut store = ContentStore::new();
        store
            .add_item("a @x", "Work", ts("2024-01-09 09:00"), AddOptions::default())
            .unwrap();
        store
            .add_item("b", "Work", ts("2024-01-09 10:00"), AddOptions::default())
            .unwrap();

        let criteria = FilterCriteria {
            tags: vec!["x".into()],
            ..FilterCriteria::default()
        };
        let result = run(&store, &criteria, ts("2024-01-10 12:00")).unwrap();
        assert_eq!(result.listed.len(), 1);
        assert!(result.messages.is_empty());
    }

    #[test]
    fn empty_result_carries_a_message() {
        let store = ContentStore::new();
        let result = run(&store, &FilterCriteria::default(), ts("2024-01-10 12:00")).unwrap();
        assert!(result.listed.is_empty());
        assert_eq!(result.messages.len(), 1);
    }
}
