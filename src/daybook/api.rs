//! # API Facade
//!
//! [`Daybook`] is the single entry point for one load→mutate→save cycle.
//! It owns the parsed store, the configuration, and the registered hooks,
//! and dispatches to the command layer. The file write in [`Daybook::save`]
//! is the only externally observable side effect of a command execution:
//! the full serialized text is computed in memory and written in one shot,
//! optionally after copying the previous file to a `~`-suffixed backup.
//!
//! Every method that touches dates takes an explicit `now`, so the whole
//! facade can be driven against a fixed clock in tests. The CLI passes the
//! wall clock.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::commands::{self, add::AddArgs, archive::ArchiveArgs, tag::TagArgs, CmdMessage, CmdResult};
use crate::config::DaybookConfig;
use crate::error::{DaybookError, Result};
use crate::export::{renderer_for, ExportVariables, ImportAdapter, ImportOptions, TextImporter};
use crate::filter::FilterCriteria;
use crate::format;
use crate::hooks::{Hooks, HookSet};
use crate::model::{Note, TIMESTAMP_FORMAT};
use crate::store::ContentStore;

pub struct Daybook {
    config: DaybookConfig,
    store: ContentStore,
    path: PathBuf,
    hooks: HookSet,
}

impl Daybook {
    /// Opens the journal the config points at. A missing file yields an
    /// empty store; an unreadable one is a parse error.
    pub fn open(config: DaybookConfig) -> Result<Self> {
        let path = config.journal_path();
        Self::open_at(config, path)
    }

    pub fn open_at(config: DaybookConfig, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let store = if path.exists() {
            let text = fs::read_to_string(&path).map_err(|e| match e.kind() {
                io::ErrorKind::InvalidData => {
                    DaybookError::Parse(format!("{} is not valid UTF-8", path.display()))
                }
                _ => DaybookError::Io(e),
            })?;
            format::parse(&text)
        } else {
            ContentStore::new()
        };
        let book = Self {
            config,
            store,
            path,
            hooks: HookSet::new(),
        };
        book.hooks.post_read(&book.store);
        Ok(book)
    }

    pub fn register_hooks(&mut self, hooks: Box<dyn Hooks>) {
        self.hooks.register(hooks);
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn config(&self) -> &DaybookConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // --- Commands ---

    pub fn add(&mut self, args: &AddArgs, now: NaiveDateTime) -> Result<CmdResult> {
        commands::add::run(&mut self.store, &self.config, args, now)
    }

    pub fn show(&self, criteria: &FilterCriteria, now: NaiveDateTime) -> Result<CmdResult> {
        commands::show::run(&self.store, criteria, now)
    }

    pub fn tag(
        &mut self,
        criteria: &FilterCriteria,
        args: &TagArgs,
        now: NaiveDateTime,
    ) -> Result<CmdResult> {
        commands::tag::run(&mut self.store, &self.hooks, criteria, args, now)
    }

    /// Stamps `@done(now)` on the most recent `count` unfinished entries.
    pub fn finish(&mut self, count: usize, now: NaiveDateTime) -> Result<CmdResult> {
        let criteria = FilterCriteria {
            unfinished: true,
            count: count.max(1),
            ..FilterCriteria::default()
        };
        let args = TagArgs {
            tags: vec!["done".into()],
            value: Some(now.format(TIMESTAMP_FORMAT).to_string()),
            ..TagArgs::default()
        };
        self.tag(&criteria, &args, now)
    }

    /// Toggles the configured marker tag on the most recent entry.
    pub fn mark(&mut self, remove: bool, now: NaiveDateTime) -> Result<CmdResult> {
        let criteria = FilterCriteria {
            count: 1,
            ..FilterCriteria::default()
        };
        let args = TagArgs {
            tags: vec![self.config.marker_tag.clone()],
            remove,
            ..TagArgs::default()
        };
        self.tag(&criteria, &args, now)
    }

    /// Moves every item matching the criteria into `target`.
    pub fn move_items(
        &mut self,
        criteria: &FilterCriteria,
        target: &str,
        label: bool,
        now: NaiveDateTime,
    ) -> Result<CmdResult> {
        let selection = crate::filter::filter_items(self.store.items(), criteria, now)?;
        let mut result = CmdResult::default();
        for item in &selection {
            self.store.move_item(item.id, target, label)?;
            if let Some(moved) = self.store.item(item.id) {
                self.hooks.post_entry_updated(moved);
                result.listed.push(moved.clone());
            }
        }
        result.report.items_affected = selection.len();
        result.add_message(CmdMessage::success(format!(
            "Moved {} items to {}",
            selection.len(),
            target
        )));
        Ok(result)
    }

    /// Deletes every item matching the criteria.
    pub fn delete(&mut self, criteria: &FilterCriteria, now: NaiveDateTime) -> Result<CmdResult> {
        let selection = crate::filter::filter_items(self.store.items(), criteria, now)?;
        let mut result = CmdResult::default();
        for item in &selection {
            result.listed.push(self.store.delete_item(item.id)?);
        }
        result.report.items_affected = selection.len();
        result.add_message(CmdMessage::success(format!(
            "Deleted {} items",
            selection.len()
        )));
        Ok(result)
    }

    /// Replaces an entry's title and note, keeping its timestamp and
    /// section.
    pub fn update_entry(&mut self, id: Uuid, title: String, note: Note) -> Result<()> {
        let mut item = self
            .store
            .item(id)
            .ok_or(DaybookError::ItemNotFound(id))?
            .clone();
        item.title = title;
        item.note = note;
        self.store.update_item(id, item.clone())?;
        self.hooks.post_entry_updated(&item);
        Ok(())
    }

    pub fn archive(&mut self, args: &ArchiveArgs, now: NaiveDateTime) -> Result<CmdResult> {
        commands::archive::run(&mut self.store, args, now)
    }

    pub fn rotate(&mut self, args: &ArchiveArgs, now: NaiveDateTime) -> Result<CmdResult> {
        commands::archive::rotate(&mut self.store, &self.path, args, now)
    }

    pub fn sections(&self) -> Vec<String> {
        self.store.sections().iter().map(|s| s.name.clone()).collect()
    }

    /// Criteria for a saved view from the config.
    pub fn view_criteria(&self, name: &str) -> Result<FilterCriteria> {
        Ok(self.config.view(name)?.criteria())
    }

    pub fn import_file(&mut self, path: &Path, options: &ImportOptions) -> Result<CmdResult> {
        let added = TextImporter.import(&mut self.store, path, options)?;
        let mut result = CmdResult::default();
        result.report.items_affected = added;
        result.add_message(CmdMessage::success(format!(
            "Imported {} new items from {}",
            added,
            path.display()
        )));
        Ok(result)
    }

    /// Renders the filtered items with a named built-in renderer.
    pub fn export(
        &self,
        format_name: &str,
        criteria: &FilterCriteria,
        page_title: &str,
        now: NaiveDateTime,
    ) -> Result<String> {
        let renderer = renderer_for(format_name).ok_or_else(|| {
            DaybookError::Runtime(format!("no export format named {:?}", format_name))
        })?;
        let items = crate::filter::filter_items(self.store.items(), criteria, now)?;
        let variables = ExportVariables {
            page_title: page_title.to_string(),
            options: serde_json::json!({ "format": format_name }),
        };
        renderer.render(&items, &variables)
    }

    /// Serializes the store and writes the journal in one shot, after an
    /// optional `~`-suffixed backup of the previous file.
    pub fn save(&self) -> Result<()> {
        self.hooks.pre_write(&self.store);
        let text = format::serialize(&self.store);
        if self.config.backup && self.path.exists() {
            let backup = backup_path(&self.path);
            fs::copy(&self.path, backup)?;
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, text)?;
        Ok(())
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("daybook.md");
    path.with_file_name(format!("{}~", name))
}
