//! Configuration, stored as JSON in the user's config directory.
//!
//! A missing file yields the defaults; unknown fields are ignored so old
//! binaries keep reading newer configs.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::error::{DaybookError, Result};
use crate::filter::{Age, CaseMode, FilterCriteria, TagFilter};
use crate::tags::autotag::AutotagRules;
use crate::tags::TagBool;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_JOURNAL_NAME: &str = "daybook.md";
const DEFAULT_MARKER_TAG: &str = "flagged";

fn default_backup() -> bool {
    true
}

fn default_marker_tag() -> String {
    DEFAULT_MARKER_TAG.to_string()
}

/// A saved view: a named, reusable filter configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub section: Option<String>,
    pub tags: Vec<String>,
    pub bool_mode: TagBool,
    pub search: Option<String>,
    pub case: CaseMode,
    pub count: usize,
    pub age: Age,
    pub only_timed: bool,
}

impl ViewConfig {
    /// Expands the view into filter criteria. Views carry their tag
    /// request through the structured `tag_filter` criterion.
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            section: self.section.clone(),
            search: self.search.clone(),
            case: self.case,
            tag_filter: (!self.tags.is_empty()).then(|| TagFilter {
                tags: self.tags.clone(),
                bool_mode: self.bool_mode,
            }),
            count: self.count,
            age: self.age,
            only_timed: self.only_timed,
            ..FilterCriteria::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaybookConfig {
    /// Journal file location; defaults to `daybook.md` in the home
    /// directory.
    pub doing_file: Option<PathBuf>,
    /// Editor command, e.g. `"vim"` or `"code -w"`. Falls back to
    /// `$VISUAL` / `$EDITOR`.
    pub editor_app: Option<String>,
    /// Copy the journal to a `~`-suffixed backup before each write.
    pub backup: bool,
    /// Tags applied to every new entry.
    pub default_tags: Vec<String>,
    /// Tag used by the mark command.
    pub marker_tag: String,
    pub autotag: AutotagRules,
    pub views: BTreeMap<String, ViewConfig>,
}

impl Default for DaybookConfig {
    fn default() -> Self {
        Self {
            doing_file: None,
            editor_app: None,
            backup: default_backup(),
            default_tags: Vec::new(),
            marker_tag: default_marker_tag(),
            autotag: AutotagRules::default(),
            views: BTreeMap::new(),
        }
    }
}

impl DaybookConfig {
    /// Load config from the given directory, or return defaults if not
    /// found.
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&config_path).map_err(DaybookError::Io)?;
        let config: DaybookConfig =
            serde_json::from_str(&content).map_err(DaybookError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory, creating it if needed.
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(DaybookError::Io)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(DaybookError::Serialization)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content).map_err(DaybookError::Io)?;
        Ok(())
    }

    /// Default per-user config directory.
    pub fn default_dir() -> Option<PathBuf> {
        BaseDirs::new().map(|dirs| dirs.config_dir().join("daybook"))
    }

    /// The journal file this config points at.
    pub fn journal_path(&self) -> PathBuf {
        if let Some(path) = &self.doing_file {
            return path.clone();
        }
        BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(DEFAULT_JOURNAL_NAME))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_JOURNAL_NAME))
    }

    pub fn view(&self, name: &str) -> Result<&ViewConfig> {
        self.views
            .get(name)
            .ok_or_else(|| DaybookError::InvalidView(name.to_string()))
    }
}
