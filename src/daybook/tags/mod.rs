//! Tag support for daybook.
//!
//! Tags are not standalone entities; they are a structural pattern inside
//! an item's title: `@name` or `@name(value)`. The value is free text and
//! may itself contain spaces (`@done(2024-01-10 12:00)`), which rules out
//! naive whitespace splitting.
//!
//! All mutation here goes through a tokenized representation: the title is
//! split into plain-text and tag [`Span`]s, edited as a list, and
//! re-rendered. That keeps the two invariants easy to hold:
//!
//! - a title never contains two tags with the same name after a mutation
//!   (a dedup pass runs on every edit), and
//! - edits are idempotent (removing an absent tag, or re-adding a present
//!   one, is a no-op apart from a value refresh).
//!
//! Tag names match case-insensitively and support glob wildcards (`*`,
//! `?`) in queries; case is preserved on write. New tags append at the end
//! of the title, existing tags are never reordered.

pub mod autotag;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One segment of a tokenized title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    /// A run of plain words, single-spaced.
    Text(String),
    /// An `@name` or `@name(value)` tag.
    Tag { name: String, value: Option<String> },
}

impl Span {
    fn render(&self) -> String {
        match self {
            Span::Text(t) => t.clone(),
            Span::Tag { name, value } => match value {
                Some(v) => format!("@{}({})", name, v),
                None => format!("@{}", name),
            },
        }
    }

    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Span::Tag { name, .. } => Some(name),
            Span::Text(_) => None,
        }
    }
}

static TAG_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@([A-Za-z0-9_.]+)$").expect("tag token regex"));
static TAG_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@([A-Za-z0-9_.]+)\((.*)$").expect("tag open regex"));

/// Splits a title into text and tag spans.
///
/// Tags are recognized only at word boundaries, so `mail@example.com`
/// stays plain text. A `@name(` whose value never closes is treated as
/// text rather than guessed at.
pub fn tokenize(title: &str) -> Vec<Span> {
    let tokens: Vec<&str> = title.split_whitespace().collect();
    let mut spans: Vec<Span> = Vec::new();
    let mut text_run: Vec<&str> = Vec::new();
    let mut i = 0;

    fn flush(spans: &mut Vec<Span>, run: &mut Vec<&str>) {
        if !run.is_empty() {
            spans.push(Span::Text(run.join(" ")));
            run.clear();
        }
    }

    while i < tokens.len() {
        let token = tokens[i];
        if let Some(caps) = TAG_TOKEN.captures(token) {
            flush(&mut spans, &mut text_run);
            spans.push(Span::Tag {
                name: caps[1].to_string(),
                value: None,
            });
            i += 1;
        } else if let Some(caps) = TAG_OPEN.captures(token) {
            // A valued tag; the value may span several whitespace tokens
            // up to the token holding the closing paren.
            let name = caps[1].to_string();
            let mut parts = vec![caps[2].to_string()];
            let mut end = i;
            let closed = loop {
                if parts.last().map(|p| p.ends_with(')')).unwrap_or(false) {
                    break true;
                }
                end += 1;
                match tokens.get(end) {
                    Some(t) => parts.push(t.to_string()),
                    None => break false,
                }
            };
            if closed {
                flush(&mut spans, &mut text_run);
                let mut value = parts.join(" ");
                value.pop(); // trailing ')'
                spans.push(Span::Tag {
                    name,
                    value: Some(value),
                });
                i = end + 1;
            } else {
                text_run.push(token);
                i += 1;
            }
        } else {
            text_run.push(token);
            i += 1;
        }
    }
    flush(&mut spans, &mut text_run);
    spans
}

/// Joins spans back into a title. Internal whitespace is normalized to
/// single spaces, which every mutation operation is specified to do.
pub fn render(spans: &[Span]) -> String {
    spans
        .iter()
        .map(Span::render)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compiles a tag name with optional glob wildcards into an anchored,
/// case-insensitive matcher.
fn name_matcher(pattern: &str) -> Regex {
    let mut source = String::from("(?i)^");
    for ch in pattern.chars() {
        match ch {
            '*' => source.push_str(".*?"),
            '?' => source.push('.'),
            _ => source.push_str(&regex::escape(&ch.to_string())),
        }
    }
    source.push('$');
    // The source is escaped except for the wildcard expansions.
    Regex::new(&source).expect("glob matcher")
}

fn span_matches(span: &Span, matcher: &Regex) -> bool {
    span.tag_name().map(|n| matcher.is_match(n)).unwrap_or(false)
}

/// Lowercased names of all tags in the title, in order of appearance.
pub fn tag_names(title: &str) -> Vec<String> {
    tokenize(title)
        .iter()
        .filter_map(|s| s.tag_name().map(str::to_lowercase))
        .collect()
}

/// Value of the first tag matching `name`, if any.
pub fn tag_value(title: &str, name: &str) -> Option<String> {
    let matcher = name_matcher(name);
    tokenize(title).into_iter().find_map(|s| match s {
        Span::Tag { name, value } if matcher.is_match(&name) => value,
        _ => None,
    })
}

/// True if the title carries a tag matching `name` (glob-aware).
pub fn has_tag(title: &str, name: &str) -> bool {
    let matcher = name_matcher(name);
    tokenize(title).iter().any(|s| span_matches(s, &matcher))
}

/// Boolean composition modes for multi-tag matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagBool {
    #[default]
    And,
    Or,
    Not,
    Pattern,
}

/// True if the title's tag set satisfies the boolean combination of the
/// requested names. In `Pattern` mode the names are joined and
/// reinterpreted as a pattern expression, see [`matches_tag_pattern`].
pub fn matches_tags(title: &str, names: &[String], mode: TagBool) -> bool {
    if names.is_empty() {
        return true;
    }
    match mode {
        TagBool::And => names.iter().all(|n| has_tag(title, n)),
        TagBool::Or => names.iter().any(|n| has_tag(title, n)),
        TagBool::Not => !names.iter().any(|n| has_tag(title, n)),
        TagBool::Pattern => matches_tag_pattern(title, &names.join(" ")),
    }
}

/// Evaluates a tag pattern expression left to right: `+name` must be
/// present, `-name` (or `!name`) must be absent, bare names form an OR
/// group. Names support glob wildcards.
pub fn matches_tag_pattern(title: &str, expr: &str) -> bool {
    let mut must = Vec::new();
    let mut not = Vec::new();
    let mut any = Vec::new();
    for raw in expr.split(|c: char| c.is_whitespace() || c == ',') {
        let token = raw.trim();
        if token.is_empty() {
            continue;
        }
        if let Some(name) = token.strip_prefix('+') {
            must.push(name);
        } else if let Some(name) = token.strip_prefix('-').or_else(|| token.strip_prefix('!')) {
            not.push(name);
        } else {
            any.push(token);
        }
    }
    (any.is_empty() || any.iter().any(|n| has_tag(title, n)))
        && must.iter().all(|n| has_tag(title, n))
        && !not.iter().any(|n| has_tag(title, n))
}

/// Options for a single [`set_tag`] call.
#[derive(Debug, Clone, Default)]
pub struct TagEdit {
    /// Value to stamp on the tag.
    pub value: Option<String>,
    /// Strip the tag (and its value) instead of adding it.
    pub remove: bool,
    /// Remove the tag and re-add it under this name, carrying the old
    /// value unless `value` supplies a new one.
    pub rename_to: Option<String>,
    /// Remove and reinsert an existing tag of the same name. Used to
    /// refresh a value and move the tag to the end of the title.
    pub force: bool,
}

impl TagEdit {
    pub fn add() -> Self {
        Self::default()
    }

    pub fn add_value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn removal() -> Self {
        Self {
            remove: true,
            ..Self::default()
        }
    }

    pub fn rename(to: impl Into<String>) -> Self {
        Self {
            rename_to: Some(to.into()),
            ..Self::default()
        }
    }

    pub fn forced(value: Option<String>) -> Self {
        Self {
            value,
            force: true,
            ..Self::default()
        }
    }
}

/// Names touched by a [`set_tag`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagChange {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl TagChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Applies one tag mutation to a title and returns the new title plus a
/// record of what changed.
///
/// Idempotent by construction: removing an absent tag or re-adding a
/// present one (without a new value) leaves the tag set unchanged. After
/// every call the title holds at most one tag of any given name.
pub fn set_tag(title: &str, name: &str, edit: &TagEdit) -> (String, TagChange) {
    let mut spans = tokenize(title);
    let mut change = TagChange::default();
    let matcher = name_matcher(name);

    if edit.remove {
        spans.retain(|s| {
            if span_matches(s, &matcher) {
                change.removed.push(s.tag_name().unwrap().to_lowercase());
                false
            } else {
                true
            }
        });
    } else if let Some(new_name) = &edit.rename_to {
        for span in spans.iter_mut() {
            if span_matches(span, &matcher) {
                if let Span::Tag { name: n, value } = span {
                    change.removed.push(n.to_lowercase());
                    change.added.push(new_name.to_lowercase());
                    *n = new_name.clone();
                    if edit.value.is_some() {
                        *value = edit.value.clone();
                    }
                }
            }
        }
    } else {
        let existing = spans.iter().position(|s| span_matches(s, &matcher));
        match existing {
            Some(_) if edit.force => {
                spans.retain(|s| {
                    if span_matches(s, &matcher) {
                        change.removed.push(s.tag_name().unwrap().to_lowercase());
                        false
                    } else {
                        true
                    }
                });
                spans.push(Span::Tag {
                    name: name.to_string(),
                    value: edit.value.clone(),
                });
                change.added.push(name.to_lowercase());
            }
            Some(pos) => {
                // Already tagged. Refresh the value in place when one is
                // supplied; the tag keeps its position and spelling.
                if edit.value.is_some() {
                    if let Span::Tag { value, .. } = &mut spans[pos] {
                        *value = edit.value.clone();
                    }
                }
            }
            None => {
                spans.push(Span::Tag {
                    name: name.to_string(),
                    value: edit.value.clone(),
                });
                change.added.push(name.to_lowercase());
            }
        }
    }

    dedup_spans(&mut spans);
    (render(&spans), change)
}

/// Drops all but the first tag of each name. Runs after every mutation.
fn dedup_spans(spans: &mut Vec<Span>) {
    let mut seen: Vec<String> = Vec::new();
    spans.retain(|s| match s.tag_name() {
        Some(name) => {
            let key = name.to_lowercase();
            if seen.contains(&key) {
                false
            } else {
                seen.push(key);
                true
            }
        }
        None => true,
    });
}
