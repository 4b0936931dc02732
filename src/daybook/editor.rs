//! External editor integration.
//!
//! Editing is a scoped, synchronous child-process call: write a buffer to
//! a temp file, block until the editor exits, read the result back. A
//! non-zero exit aborts the whole mutation; nothing is written to the
//! journal in that case.

use std::env;
use std::fs;
use std::process::Command;

use uuid::Uuid;

use crate::error::{DaybookError, Result};
use crate::model::Note;

/// An entry as presented in the editor buffer: first line is the title,
/// every following non-empty line a note line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryBuffer {
    pub title: String,
    pub note: Note,
}

impl EntryBuffer {
    pub fn new(title: impl Into<String>, note: Note) -> Self {
        Self {
            title: title.into(),
            note,
        }
    }

    pub fn to_buffer(&self) -> String {
        let mut buffer = self.title.clone();
        buffer.push('\n');
        for line in self.note.lines() {
            buffer.push_str(line);
            buffer.push('\n');
        }
        buffer
    }

    /// Parses an edited buffer. Comment lines (`#`) and blank lines are
    /// stripped first; an empty result is an error, not an empty entry.
    pub fn from_buffer(buffer: &str) -> Result<Self> {
        let content = strip_comments(buffer)?;
        let mut lines = content.lines();
        let title = lines.next().unwrap_or_default().trim().to_string();
        let note = Note::from_text(&lines.collect::<Vec<_>>().join("\n"));
        Ok(Self { title, note })
    }
}

/// Removes `#` comment lines and blank lines. Fails with `EmptyInput`
/// when nothing usable remains.
pub fn strip_comments(input: &str) -> Result<String> {
    let kept: Vec<&str> = input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .collect();
    if kept.is_empty() {
        return Err(DaybookError::EmptyInput);
    }
    Ok(kept.join("\n"))
}

/// Resolves the editor command: config first, then `$VISUAL`, then
/// `$EDITOR`.
fn editor_command(configured: Option<&str>) -> Result<String> {
    configured
        .map(str::to_string)
        .or_else(|| env::var("VISUAL").ok().filter(|v| !v.is_empty()))
        .or_else(|| env::var("EDITOR").ok().filter(|v| !v.is_empty()))
        .ok_or_else(|| DaybookError::Editor("no editor configured, set $EDITOR".to_string()))
}

/// Runs the user's editor over `initial` and returns the edited text.
pub fn edit_text(initial: &str, configured: Option<&str>) -> Result<String> {
    let command = editor_command(configured)?;
    let mut parts = command.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| DaybookError::Editor("empty editor command".to_string()))?;

    let path = env::temp_dir().join(format!("daybook-{}.md", Uuid::new_v4()));
    fs::write(&path, initial)?;

    let status = Command::new(program)
        .args(parts)
        .arg(&path)
        .status()
        .map_err(|e| DaybookError::Editor(format!("{}: {}", program, e)))?;
    if !status.success() {
        let _ = fs::remove_file(&path);
        return Err(DaybookError::Editor(format!(
            "editor exited with {}",
            status
        )));
    }

    let edited = fs::read_to_string(&path)?;
    let _ = fs::remove_file(&path);
    Ok(edited)
}
