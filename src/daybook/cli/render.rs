//! Terminal rendering for command results.
//!
//! The only place in the crate that styles text. Styling never reaches
//! the journal file; the serializer strips ANSI defensively, but nothing
//! here ever touches the store either.

use chrono::{Duration, NaiveDateTime};
use colored::Colorize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::commands::{CmdMessage, CmdResult, MessageLevel};
use crate::model::{Item, TIMESTAMP_FORMAT};
use crate::tags::{tokenize, Span};

/// Prints listed items, then messages, then the mutation counters.
pub fn print_result(result: &CmdResult, now: NaiveDateTime) {
    if !result.listed.is_empty() {
        print!("{}", render_items(&result.listed, now));
    }
    for message in &result.messages {
        println!("{}", render_message(message));
    }
    let report = &result.report;
    if report.tags_added > 0 || report.tags_removed > 0 {
        println!(
            "{}",
            format!(
                "{} tags added, {} removed",
                report.tags_added, report.tags_removed
            )
            .dimmed()
        );
    }
}

/// Renders items one per line, grouped under their section headers in
/// order of first appearance.
pub fn render_items(items: &[Item], now: NaiveDateTime) -> String {
    let width = terminal_width();
    let mut out = String::new();
    let mut current_section: Option<&str> = None;
    for item in items {
        if current_section != Some(item.section.as_str()) {
            out.push_str(&format!("{}\n", item.section.cyan().bold()));
            current_section = Some(item.section.as_str());
        }
        out.push_str(&render_item(item, now, width));
    }
    out
}

fn render_item(item: &Item, now: NaiveDateTime, width: usize) -> String {
    let timestamp = item.timestamp.format(TIMESTAMP_FORMAT).to_string();
    // Fixed prefix: two spaces, timestamp, " | ".
    let budget = width.saturating_sub(timestamp.width() + 5).max(16);
    let title = colorize_title(&truncate(&item.title, budget));

    let mut line = format!("  {} {} {}", timestamp.dimmed(), "|".dimmed(), title);
    if let Some(interval) = item.interval() {
        line.push_str(&format!(" {}", format_interval(interval).green()));
    } else {
        line.push_str(&format!(" {}", relative_age(item.timestamp, now).dimmed()));
    }
    line.push('\n');
    for note_line in item.note.lines() {
        line.push_str(&format!("      {}\n", note_line.dimmed()));
    }
    line
}

/// Highlights `@tag` spans inside a title.
fn colorize_title(title: &str) -> String {
    tokenize(title)
        .iter()
        .map(|span| match span {
            Span::Text(text) => text.clone(),
            Span::Tag { name, value } => {
                let rendered = match value {
                    Some(v) => format!("@{}({})", name, v),
                    None => format!("@{}", name),
                };
                rendered.magenta().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncates to a display width, respecting wide characters.
fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

fn format_interval(interval: Duration) -> String {
    let minutes = interval.num_minutes().max(0);
    if minutes >= 60 {
        format!("[{}h {}m]", minutes / 60, minutes % 60)
    } else {
        format!("[{}m]", minutes)
    }
}

fn relative_age(timestamp: NaiveDateTime, now: NaiveDateTime) -> String {
    let elapsed = (now - timestamp).to_std().unwrap_or_default();
    format!("({})", timeago::Formatter::new().convert(elapsed))
}

fn render_message(message: &CmdMessage) -> String {
    match message.level {
        MessageLevel::Info => message.content.dimmed().to_string(),
        MessageLevel::Success => message.content.green().to_string(),
        MessageLevel::Warning => message.content.yellow().to_string(),
        MessageLevel::Error => message.content.red().to_string(),
    }
}

fn terminal_width() -> usize {
    let (_, cols) = console::Term::stdout().size();
    if cols == 0 {
        100
    } else {
        cols as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn truncate_respects_width() {
        assert_eq!(truncate("short", 20), "short");
        let cut = truncate("a very long title indeed", 10);
        assert!(cut.ends_with('…'));
        assert!(cut.width() <= 10);
    }

    #[test]
    fn interval_formatting() {
        assert_eq!(format_interval(Duration::minutes(45)), "[45m]");
        assert_eq!(format_interval(Duration::minutes(90)), "[1h 30m]");
    }

    #[test]
    fn items_grouped_by_section() {
        colored::control::set_override(false);
        let items = vec![
            Item::new(ts("2024-01-09 09:00"), "one", "Work"),
            Item::new(ts("2024-01-09 10:00"), "two", "Work"),
            Item::new(ts("2024-01-09 11:00"), "three", "Later"),
        ];
        let out = render_items(&items, ts("2024-01-10 12:00"));
        colored::control::unset_override();
        assert_eq!(out.matches("Work\n").count(), 1);
        assert!(out.contains("Later\n"));
        assert!(out.contains("2024-01-09 09:00 | one"));
    }
}
