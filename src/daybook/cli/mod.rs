//! # CLI Layer
//!
//! The only place in the crate that knows about terminal I/O, argument
//! parsing, and process concerns. Everything from the api facade inward
//! takes plain Rust values and returns structured results; this module
//! turns shell arguments into those calls and renders what comes back.

pub mod render;
pub mod setup;

use chrono::Local;
use clap::Parser;

use crate::api::Daybook;
use crate::commands::add::AddArgs;
use crate::commands::archive::ArchiveArgs;
use crate::commands::tag::TagArgs;
use crate::config::DaybookConfig;
use crate::editor::{edit_text, EntryBuffer};
use crate::error::Result;
use crate::export::ImportOptions;
use crate::filter::FilterCriteria;

use self::setup::{Cli, Commands, FilterFlags};

const EDITOR_TEMPLATE_FOOTER: &str =
    "\n# The first line is the entry, every following line becomes its note.\n# Lines starting with # are ignored.\n";

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut config = match cli.config_dir.clone().or_else(DaybookConfig::default_dir) {
        Some(dir) => DaybookConfig::load(dir)?,
        None => DaybookConfig::default(),
    };
    if let Some(file) = &cli.file {
        config.doing_file = Some(file.clone());
    }

    let now = Local::now().naive_local();
    let mut book = Daybook::open(config)?;
    let command = cli.command.unwrap_or(Commands::Show {
        filter: FilterFlags::default(),
    });

    match command {
        Commands::Now {
            entry,
            section,
            back,
            note,
            finish_last,
        } => {
            let (entry, note) = entry_or_editor(entry, note, &book)?;
            let args = AddArgs {
                entry,
                section,
                back,
                note,
                timed: finish_last,
                ..AddArgs::default()
            };
            let result = book.add(&args, now)?;
            render::print_result(&result, now);
            book.save()?;
        }

        Commands::Done {
            entry,
            section,
            back,
            at,
            note,
        } => {
            let (entry, note) = entry_or_editor(entry, note, &book)?;
            let args = AddArgs {
                entry,
                section,
                back,
                note,
                finished: true,
                finished_at: at,
                ..AddArgs::default()
            };
            let result = book.add(&args, now)?;
            render::print_result(&result, now);
            book.save()?;
        }

        Commands::Finish { count } => {
            let result = book.finish(count, now)?;
            render::print_result(&result, now);
            book.save()?;
        }

        Commands::Show { filter } => {
            let result = book.show(&filter.criteria(), now)?;
            render::print_result(&result, now);
        }

        Commands::Grep { pattern, filter } => {
            let mut criteria = filter.criteria();
            criteria.search = Some(pattern);
            let result = book.show(&criteria, now)?;
            render::print_result(&result, now);
        }

        Commands::Tag {
            tags,
            value,
            remove,
            rename,
            force,
            filter,
        } => {
            let criteria = latest_when_unfiltered(&filter);
            let args = TagArgs {
                tags,
                value,
                remove,
                rename_to: rename,
                force,
            };
            let result = book.tag(&criteria, &args, now)?;
            render::print_result(&result, now);
            book.save()?;
        }

        Commands::Mark { remove } => {
            let result = book.mark(remove, now)?;
            render::print_result(&result, now);
            book.save()?;
        }

        Commands::Move {
            target,
            label,
            filter,
        } => {
            let criteria = latest_when_unfiltered(&filter);
            let result = book.move_items(&criteria, &target, label, now)?;
            render::print_result(&result, now);
            book.save()?;
        }

        Commands::Archive {
            section,
            to,
            keep,
            tag,
            boolean,
            search,
            before,
            no_label,
        } => {
            let args = ArchiveArgs {
                section,
                destination: to,
                keep,
                tags: tag,
                tag_bool: boolean.unwrap_or(setup::BoolArg::And).into(),
                search,
                before,
                label: !no_label,
                ..ArchiveArgs::default()
            };
            let result = book.archive(&args, now)?;
            render::print_result(&result, now);
            book.save()?;
        }

        Commands::Rotate {
            section,
            keep,
            tag,
            boolean,
            search,
            before,
        } => {
            let args = ArchiveArgs {
                section,
                keep,
                tags: tag,
                tag_bool: boolean.unwrap_or(setup::BoolArg::And).into(),
                search,
                before,
                label: false,
                ..ArchiveArgs::default()
            };
            let result = book.rotate(&args, now)?;
            render::print_result(&result, now);
            book.save()?;
        }

        Commands::Sections => {
            for name in book.sections() {
                println!("{}", name);
            }
        }

        Commands::Delete { filter } => {
            let criteria = latest_when_unfiltered(&filter);
            let result = book.delete(&criteria, now)?;
            render::print_result(&result, now);
            book.save()?;
        }

        Commands::Edit { filter } => {
            let criteria = latest_when_unfiltered(&filter);
            let shown = book.show(&criteria, now)?;
            match shown.listed.last() {
                None => render::print_result(&shown, now),
                Some(item) => {
                    let buffer = EntryBuffer::new(item.title.clone(), item.note.clone());
                    let initial = format!("{}{}", buffer.to_buffer(), EDITOR_TEMPLATE_FOOTER);
                    let edited = edit_text(&initial, book.config().editor_app.as_deref())?;
                    let parsed = EntryBuffer::from_buffer(&edited)?;
                    book.update_entry(item.id, parsed.title, parsed.note)?;
                    book.save()?;
                }
            }
        }

        Commands::View { name } => {
            let criteria = book.view_criteria(&name)?;
            let result = book.show(&criteria, now)?;
            render::print_result(&result, now);
        }

        Commands::Import { path, section } => {
            let options = ImportOptions { section };
            let result = book.import_file(&path, &options)?;
            render::print_result(&result, now);
            book.save()?;
        }

        Commands::Export {
            format,
            title,
            filter,
        } => {
            let text = book.export(&format, &filter.criteria(), &title, now)?;
            print!("{}", text);
        }
    }

    Ok(())
}

/// Joined entry text, or an editor round-trip when none was given on the
/// command line.
fn entry_or_editor(
    entry: Vec<String>,
    note: Option<String>,
    book: &Daybook,
) -> Result<(String, Option<String>)> {
    if !entry.is_empty() {
        return Ok((entry.join(" "), note));
    }
    let edited = edit_text(EDITOR_TEMPLATE_FOOTER, book.config().editor_app.as_deref())?;
    let parsed = EntryBuffer::from_buffer(&edited)?;
    let note = if parsed.note.is_empty() {
        note
    } else {
        Some(parsed.note.lines().join("\n"))
    };
    Ok((parsed.title, note))
}

/// Mutation commands act on the single most recent entry unless the user
/// narrowed the selection explicitly.
fn latest_when_unfiltered(filter: &FilterFlags) -> FilterCriteria {
    let mut criteria = filter.criteria();
    let narrowed = filter.section.is_some()
        || !filter.tag.is_empty()
        || filter.search.is_some()
        || filter.unfinished
        || filter.only_timed
        || filter.before.is_some()
        || filter.after.is_some()
        || filter.today
        || filter.yesterday
        || filter.count > 0;
    if !narrowed {
        criteria.count = 1;
    }
    criteria
}
