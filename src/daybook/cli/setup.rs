//! clap argument types for the daybook binary.
//!
//! The CLI owns its own little enums for boolean mode, case mode, and age
//! instead of deriving `ValueEnum` on the library types; the conversion
//! functions keep the library free of clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::filter::{Age, CaseMode};
use crate::tags::TagBool;

#[derive(Debug, Parser)]
#[command(name = "daybook", version, about = "A plain-text, append-only journal")]
pub struct Cli {
    /// Journal file to use instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Directory holding config.json
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BoolArg {
    And,
    Or,
    Not,
    Pattern,
}

impl From<BoolArg> for TagBool {
    fn from(arg: BoolArg) -> Self {
        match arg {
            BoolArg::And => TagBool::And,
            BoolArg::Or => TagBool::Or,
            BoolArg::Not => TagBool::Not,
            BoolArg::Pattern => TagBool::Pattern,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CaseArg {
    Sensitive,
    Ignore,
    Smart,
}

impl From<CaseArg> for CaseMode {
    fn from(arg: CaseArg) -> Self {
        match arg {
            CaseArg::Sensitive => CaseMode::Sensitive,
            CaseArg::Ignore => CaseMode::Ignore,
            CaseArg::Smart => CaseMode::Smart,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AgeArg {
    Newest,
    Oldest,
}

impl From<AgeArg> for Age {
    fn from(arg: AgeArg) -> Self {
        match arg {
            AgeArg::Newest => Age::Newest,
            AgeArg::Oldest => Age::Oldest,
        }
    }
}

/// Filter flags shared by show, grep, tag, move, delete, and export.
#[derive(Debug, Clone, clap::Args, Default)]
pub struct FilterFlags {
    /// Restrict to a section ("All" for no restriction)
    #[arg(short, long)]
    pub section: Option<String>,

    /// Tag names, comma separated; supports * and ? wildcards
    #[arg(short, long, value_delimiter = ',')]
    pub tag: Vec<String>,

    /// Boolean combining the requested tags
    #[arg(long, value_enum, default_value = "and")]
    pub boolean: Option<BoolArg>,

    /// Free-text query: plain, /regex/, or 'exact
    #[arg(long)]
    pub search: Option<String>,

    /// Case handling for searches
    #[arg(long, value_enum, default_value = "smart")]
    pub case: Option<CaseArg>,

    /// Keep only entries without a done tag
    #[arg(short, long)]
    pub unfinished: bool,

    /// Keep only entries with a measurable interval
    #[arg(long)]
    pub only_timed: bool,

    /// Entries at or before this time expression
    #[arg(long, value_name = "EXPR")]
    pub before: Option<String>,

    /// Entries at or after this time expression
    #[arg(long, value_name = "EXPR")]
    pub after: Option<String>,

    /// Entries from today only
    #[arg(long)]
    pub today: bool,

    /// Entries from yesterday only
    #[arg(long)]
    pub yesterday: bool,

    /// Invert each matching rule
    #[arg(long)]
    pub not: bool,

    /// Limit to this many entries
    #[arg(short, long, default_value_t = 0)]
    pub count: usize,

    /// Which end of the timeline --count keeps
    #[arg(long, value_enum, default_value = "newest")]
    pub age: Option<AgeArg>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record what you are doing now
    Now {
        /// Entry text; opens the editor when omitted
        entry: Vec<String>,
        #[arg(short, long, default_value = "Currently")]
        section: String,
        /// Backdate expression, e.g. "20", "2h30m", "yesterday 3pm"
        #[arg(short, long)]
        back: Option<String>,
        /// Note text attached to the entry
        #[arg(short, long)]
        note: Option<String>,
        /// Close the previous open entry when this one starts
        #[arg(short, long)]
        finish_last: bool,
    },

    /// Record an entry that is already done
    Done {
        entry: Vec<String>,
        #[arg(short, long, default_value = "Currently")]
        section: String,
        #[arg(short, long)]
        back: Option<String>,
        /// Completion time expression; defaults to the entry time
        #[arg(long)]
        at: Option<String>,
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Stamp @done on the most recent open entries
    Finish {
        #[arg(default_value_t = 1)]
        count: usize,
    },

    /// List entries
    Show {
        #[command(flatten)]
        filter: FilterFlags,
    },

    /// Search entries (shorthand for show --search)
    Grep {
        pattern: String,
        #[command(flatten)]
        filter: FilterFlags,
    },

    /// Add or remove tags on matching entries
    Tag {
        /// Tag names, comma separated
        #[arg(value_delimiter = ',', required = true)]
        tags: Vec<String>,
        /// Value to stamp, e.g. a date or a number
        #[arg(short, long)]
        value: Option<String>,
        /// Remove instead of add
        #[arg(short, long)]
        remove: bool,
        /// Rename the named tag to this
        #[arg(long, value_name = "NEW")]
        rename: Option<String>,
        /// Remove and re-add an existing tag to refresh its value
        #[arg(long)]
        force: bool,
        #[command(flatten)]
        filter: FilterFlags,
    },

    /// Toggle the marker tag on the latest entry
    Mark {
        #[arg(short, long)]
        remove: bool,
    },

    /// Move matching entries to another section
    Move {
        target: String,
        /// Stamp moved entries with @from(<origin>)
        #[arg(long)]
        label: bool,
        #[command(flatten)]
        filter: FilterFlags,
    },

    /// Move old entries into an archive section
    Archive {
        /// Source section, or "All"
        #[arg(default_value = "All")]
        section: String,
        #[arg(long, default_value = "Archive")]
        to: String,
        /// Most recent entries per section to leave in place
        #[arg(short, long, default_value_t = 0)]
        keep: usize,
        #[arg(short, long, value_delimiter = ',')]
        tag: Vec<String>,
        #[arg(long, value_enum, default_value = "and")]
        boolean: Option<BoolArg>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_name = "EXPR")]
        before: Option<String>,
        /// Skip the @from(<origin>) label
        #[arg(long)]
        no_label: bool,
    },

    /// Move old entries out to a dated sibling file
    Rotate {
        #[arg(default_value = "All")]
        section: String,
        #[arg(short, long, default_value_t = 0)]
        keep: usize,
        #[arg(short, long, value_delimiter = ',')]
        tag: Vec<String>,
        #[arg(long, value_enum, default_value = "and")]
        boolean: Option<BoolArg>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_name = "EXPR")]
        before: Option<String>,
    },

    /// List section names
    Sections,

    /// Delete matching entries
    Delete {
        #[command(flatten)]
        filter: FilterFlags,
    },

    /// Edit the most recent entry in your editor
    Edit {
        #[command(flatten)]
        filter: FilterFlags,
    },

    /// Show a saved view from the config
    View { name: String },

    /// Import entries from another daybook file
    Import {
        path: PathBuf,
        /// Force imported entries into this section
        #[arg(short, long)]
        section: Option<String>,
    },

    /// Render matching entries with a built-in format
    Export {
        #[arg(short, long, default_value = "json")]
        format: String,
        #[arg(long, default_value = "Daybook export")]
        title: String,
        #[command(flatten)]
        filter: FilterFlags,
    },
}

impl FilterFlags {
    pub fn criteria(&self) -> crate::filter::FilterCriteria {
        crate::filter::FilterCriteria {
            section: self.section.clone(),
            unfinished: self.unfinished,
            tags: self.tag.clone(),
            tag_bool: self.boolean.unwrap_or(BoolArg::And).into(),
            search: self.search.clone(),
            case: self.case.unwrap_or(CaseArg::Smart).into(),
            only_timed: self.only_timed,
            before: self.before.clone(),
            after: self.after.clone(),
            today: self.today,
            yesterday: self.yesterday,
            negate: self.not,
            count: self.count,
            age: self.age.unwrap_or(AgeArg::Newest).into(),
            ..crate::filter::FilterCriteria::default()
        }
    }
}
