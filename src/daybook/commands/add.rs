//! Creating entries.

use chrono::NaiveDateTime;

use crate::commands::{CmdMessage, CmdResult};
use crate::config::DaybookConfig;
use crate::error::Result;
use crate::filter::dates::{resolve_expression, DayAnchor, TimeBias};
use crate::model::{Note, TIMESTAMP_FORMAT};
use crate::store::{AddOptions, ContentStore};
use crate::tags::{autotag::autotag, set_tag, TagEdit};

#[derive(Debug, Clone, Default)]
pub struct AddArgs {
    pub entry: String,
    pub section: String,
    /// Backdate expression; the entry is stamped `now` when absent.
    pub back: Option<String>,
    pub note: Option<String>,
    /// Close out the previous open entry when this one starts.
    pub timed: bool,
    /// Stamp the new entry `@done` immediately, optionally at the given
    /// expression instead of its start time.
    pub finished: bool,
    pub finished_at: Option<String>,
}

/// Adds one entry: autotags the title, applies the configured default
/// tags, and appends to the store.
pub fn run(
    store: &mut ContentStore,
    config: &DaybookConfig,
    args: &AddArgs,
    now: NaiveDateTime,
) -> Result<CmdResult> {
    let date = match &args.back {
        Some(expr) => resolve_expression(expr, now, TimeBias::Past, DayAnchor::Begin)?,
        None => now,
    };

    let mut result = CmdResult::default();
    let mut title = args.entry.trim().to_string();

    let outcome = autotag(&title, &config.autotag);
    if outcome.changed {
        result.report.tags_added += outcome.added.len()
            + outcome.whitelisted.len()
            + outcome.replaced.len();
        title = outcome.title;
    }
    for tag in &config.default_tags {
        let (next, change) = set_tag(&title, tag, &TagEdit::add());
        result.report.tags_added += change.added.len();
        title = next;
    }
    if args.finished {
        let stamp = match &args.finished_at {
            Some(expr) => resolve_expression(expr, now, TimeBias::Past, DayAnchor::Begin)?,
            None => date,
        };
        let (next, change) = set_tag(
            &title,
            "done",
            &TagEdit::add_value(stamp.format(TIMESTAMP_FORMAT).to_string()),
        );
        result.report.tags_added += change.added.len();
        title = next;
    }

    let section = match store.guess_section(&args.section) {
        Ok(existing) => existing,
        // Unknown input names a brand new section.
        Err(_) => args.section.clone(),
    };

    let options = AddOptions {
        note: args.note.as_deref().map(Note::from_text).filter(|n| !n.is_empty()),
        timed: args.timed,
    };
    let id = store.add_item(&title, &section, date, options)?;
    result.report.items_affected = 1;

    let item = store
        .item(id)
        .expect("freshly added item is present")
        .clone();
    result.add_message(CmdMessage::success(format!(
        "Added \"{}\" to {}",
        item.title, item.section
    )));
    result.listed.push(item);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    fn now() -> NaiveDateTime {
        ts("2024-01-10 12:00")
    }

    fn args(entry: &str) -> AddArgs {
        AddArgs {
            entry: entry.into(),
            section: "Currently".into(),
            ..AddArgs::default()
        }
    }

    #[test]
    fn adds_with_defaults() {
        let mut store = ContentStore::new();
        let config = DaybookConfig::default();
        let result = run(&mut store, &config, &args("write the report"), now()).unwrap();
        assert_eq!(result.report.items_affected, 1);
        assert_eq!(store.items().len(), 1);
        assert_eq!(store.items()[0].section, "Currently");
        assert_eq!(store.items()[0].timestamp, now());
    }

    #[test]
    fn applies_default_tags_and_autotag() {
        let mut store = ContentStore::new();
        let mut config = DaybookConfig::default();
        config.default_tags = vec!["daily".into()];
        config.autotag.whitelist = vec!["meeting".into()];

        let result = run(&mut store, &config, &args("standup meeting"), now()).unwrap();
        assert_eq!(store.items()[0].title, "standup @meeting @daily");
        assert_eq!(result.report.tags_added, 2);
    }

    #[test]
    fn backdates_with_expression() {
        let mut store = ContentStore::new();
        let config = DaybookConfig::default();
        let mut a = args("earlier work");
        a.back = Some("2h".into());
        run(&mut store, &config, &a, now()).unwrap();
        assert_eq!(store.items()[0].timestamp, ts("2024-01-10 10:00"));
    }

    #[test]
    fn finished_entries_get_done_stamp() {
        let mut store = ContentStore::new();
        let config = DaybookConfig::default();
        let mut a = args("quick fix");
        a.finished = true;
        run(&mut store, &config, &a, now()).unwrap();
        assert_eq!(store.items()[0].title, "quick fix @done(2024-01-10 12:00)");
    }

    #[test]
    fn fuzzy_section_resolution() {
        let mut store = ContentStore::new();
        store.ensure_section("Projects").unwrap();
        let config = DaybookConfig::default();
        let mut a = args("ship it");
        a.section = "proj".into();
        run(&mut store, &config, &a, now()).unwrap();
        assert_eq!(store.items()[0].section, "Projects");
    }

    #[test]
    fn note_attaches_to_new_entry() {
        let mut store = ContentStore::new();
        let config = DaybookConfig::default();
        let mut a = args("task");
        a.note = Some("line one\nline two".into());
        run(&mut store, &config, &a, now()).unwrap();
        assert_eq!(store.items()[0].note.lines(), ["line one", "line two"]);
    }

    #[test]
    fn invalid_backdate_fails() {
        let mut store = ContentStore::new();
        let config = DaybookConfig::default();
        let mut a = args("task");
        a.back = Some("someday".into());
        assert!(run(&mut store, &config, &a, now()).is_err());
    }
}
