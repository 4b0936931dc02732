//! Rule-driven tag enrichment.
//!
//! The autotagger takes a title and the configured rule sets and returns
//! an enriched title plus a record of what it did. Three passes run in
//! order:
//!
//! 1. **Whitelist**: a whitelisted word appearing as a standalone token is
//!    converted in place to a tag, first untagged occurrence only.
//! 2. **Synonyms**: a tag is queued when one of its trigger words appears
//!    as a standalone token and the tag is not already present.
//! 3. **Transforms**: `pattern:replacement[/r]` rules matched against
//!    whole tokens. With the `/r` flag the matched token is rewritten to
//!    the computed tag(s); without it the title is left alone and the
//!    computed tag(s) are queued.
//!
//! Queued tags are appended sorted and deduplicated through the tag
//! engine. A tag already present is never duplicated by any pass, and an
//! untouched title is returned verbatim so callers can detect change by
//! string comparison.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{has_tag, set_tag, tag_names, tokenize, Span, TagEdit};

/// Autotag rule sets, loaded from configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutotagRules {
    /// Words converted in place to tags.
    pub whitelist: Vec<String>,
    /// Tag name to the words that trigger it.
    pub synonyms: BTreeMap<String, Vec<String>>,
    /// `pattern:replacement[/r]` rules; `\1`-style back references in the
    /// replacement are substituted from the pattern's capture groups.
    pub transform: Vec<String>,
}

impl AutotagRules {
    pub fn is_empty(&self) -> bool {
        self.whitelist.is_empty() && self.synonyms.is_empty() && self.transform.is_empty()
    }
}

/// What one autotag run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutotagOutcome {
    pub title: String,
    /// Converted in place by the whitelist pass.
    pub whitelisted: Vec<String>,
    /// Appended from the synonym/transform queues.
    pub added: Vec<String>,
    /// Tokens rewritten by `/r` transform rules.
    pub replaced: Vec<String>,
    /// Queued by non-`/r` transform rules.
    pub transformed: Vec<String>,
    pub changed: bool,
}

/// Flat token stream used by the passes. Spans are word-exploded so a
/// single word can be swapped for a tag without span surgery.
#[derive(Debug, Clone)]
enum Tok {
    Word(String),
    Tag { name: String, value: Option<String> },
}

fn explode(title: &str) -> Vec<Tok> {
    let mut toks = Vec::new();
    for span in tokenize(title) {
        match span {
            Span::Text(text) => {
                toks.extend(text.split(' ').map(|w| Tok::Word(w.to_string())));
            }
            Span::Tag { name, value } => toks.push(Tok::Tag { name, value }),
        }
    }
    toks
}

fn rebuild(toks: &[Tok]) -> String {
    let mut spans: Vec<Span> = Vec::new();
    for tok in toks {
        match tok {
            Tok::Word(w) => match spans.last_mut() {
                Some(Span::Text(t)) => {
                    t.push(' ');
                    t.push_str(w);
                }
                _ => spans.push(Span::Text(w.clone())),
            },
            Tok::Tag { name, value } => spans.push(Span::Tag {
                name: name.clone(),
                value: value.clone(),
            }),
        }
    }
    super::render(&spans)
}

fn current_tags(toks: &[Tok]) -> Vec<String> {
    toks.iter()
        .filter_map(|t| match t {
            Tok::Tag { name, .. } => Some(name.to_lowercase()),
            Tok::Word(_) => None,
        })
        .collect()
}

/// A computed tag spec, `name` or `name(value)`, optionally `@`-prefixed.
fn parse_tag_spec(spec: &str) -> Option<(String, Option<String>)> {
    let spec = spec.trim().trim_start_matches('@');
    if spec.is_empty() {
        return None;
    }
    match spec.find('(') {
        Some(open) if spec.ends_with(')') => {
            let name = &spec[..open];
            let value = &spec[open + 1..spec.len() - 1];
            Some((name.to_string(), Some(value.to_string())))
        }
        _ => Some((spec.to_string(), None)),
    }
}

/// Substitutes `\1`..`\9` back references from the captures.
fn expand_replacement(caps: &regex::Captures, template: &str) -> String {
    let mut out = String::new();
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
                chars.next();
                if let Some(m) = caps.get(digit as usize) {
                    out.push_str(m.as_str());
                }
                continue;
            }
        }
        out.push(ch);
    }
    out
}

struct TransformRule {
    regex: Regex,
    replacement: String,
    rewrite: bool,
}

impl TransformRule {
    /// Parses `pattern:replacement[/r]`. The pattern is anchored to whole
    /// tokens, which realizes the `(?<= |^)…(?= |$)` boundary rule
    /// without look-around.
    fn parse(rule: &str) -> Option<Self> {
        let (pattern, rest) = rule.split_once(':')?;
        let (replacement, rewrite) = match rest.strip_suffix("/r") {
            Some(r) => (r, true),
            None => (rest, false),
        };
        let regex = Regex::new(&format!("^(?:{})$", pattern)).ok()?;
        Some(Self {
            regex,
            replacement: replacement.to_string(),
            rewrite,
        })
    }
}

/// Runs all three passes over `title` and returns the outcome.
pub fn autotag(title: &str, rules: &AutotagRules) -> AutotagOutcome {
    let mut outcome = AutotagOutcome::default();
    if rules.is_empty() {
        outcome.title = title.to_string();
        return outcome;
    }

    let mut toks = explode(title);
    let mut mutated = false;
    let mut queue: Vec<(String, Option<String>)> = Vec::new();

    // Whitelist pass: first untagged standalone occurrence per keyword.
    for entry in &rules.whitelist {
        let tagged = current_tags(&toks);
        if tagged.contains(&entry.to_lowercase()) {
            continue;
        }
        let lowercase_entry = entry.chars().all(|c| !c.is_uppercase());
        for tok in toks.iter_mut() {
            let word = match tok {
                Tok::Word(w) => w.clone(),
                Tok::Tag { .. } => continue,
            };
            if word.eq_ignore_ascii_case(entry) {
                let name = if lowercase_entry {
                    word.to_lowercase()
                } else {
                    word
                };
                outcome.whitelisted.push(name.to_lowercase());
                *tok = Tok::Tag { name, value: None };
                mutated = true;
                break;
            }
        }
    }

    // Synonym pass: queue tags triggered by standalone words.
    let words: Vec<String> = toks
        .iter()
        .filter_map(|t| match t {
            Tok::Word(w) => Some(w.to_lowercase()),
            Tok::Tag { .. } => None,
        })
        .collect();
    let tagged = current_tags(&toks);
    for (tag, triggers) in &rules.synonyms {
        if tagged.contains(&tag.to_lowercase()) {
            continue;
        }
        if triggers.iter().any(|w| words.contains(&w.to_lowercase())) {
            queue.push((tag.clone(), None));
        }
    }

    // Transform pass.
    for rule in rules.transform.iter().filter_map(|r| TransformRule::parse(r)) {
        if rule.rewrite {
            let mut i = 0;
            while i < toks.len() {
                let word = match &toks[i] {
                    Tok::Word(w) => w.clone(),
                    Tok::Tag { .. } => {
                        i += 1;
                        continue;
                    }
                };
                if let Some(caps) = rule.regex.captures(&word) {
                    let computed = expand_replacement(&caps, &rule.replacement);
                    let specs: Vec<_> = computed
                        .split_whitespace()
                        .filter_map(parse_tag_spec)
                        .collect();
                    if !specs.is_empty() {
                        toks.splice(
                            i..=i,
                            specs.iter().map(|(name, value)| Tok::Tag {
                                name: name.clone(),
                                value: value.clone(),
                            }),
                        );
                        for (name, _) in &specs {
                            let key = name.to_lowercase();
                            if !outcome.replaced.contains(&key) {
                                outcome.replaced.push(key);
                            }
                        }
                        mutated = true;
                        i += specs.len();
                        continue;
                    }
                }
                i += 1;
            }
        } else {
            // Match only; the title is not rewritten, the computed tags
            // are queued for appending.
            let matched = toks.iter().find_map(|t| match t {
                Tok::Word(w) => rule.regex.captures(w),
                Tok::Tag { .. } => None,
            });
            if let Some(caps) = matched {
                let computed = expand_replacement(&caps, &rule.replacement);
                for spec in computed.split_whitespace().filter_map(parse_tag_spec) {
                    outcome.transformed.push(spec.0.to_lowercase());
                    queue.push(spec);
                }
            }
        }
    }

    let mut result = if mutated {
        rebuild(&toks)
    } else {
        title.to_string()
    };

    // Append the queue: sorted, deduplicated, never duplicating a tag
    // that is already present.
    queue.sort_by(|a, b| a.0.cmp(&b.0));
    queue.dedup_by(|a, b| a.0.eq_ignore_ascii_case(&b.0));
    for (name, value) in queue {
        if has_tag(&result, &name) {
            continue;
        }
        let edit = TagEdit {
            value,
            ..TagEdit::default()
        };
        let (next, change) = set_tag(&result, &name, &edit);
        outcome.added.extend(change.added);
        result = next;
    }

    outcome.changed = result != title;
    outcome.title = result;
    outcome
}

/// Names present after a run, convenience for callers that log.
pub fn applied_tags(outcome: &AutotagOutcome) -> Vec<String> {
    let mut names: Vec<String> = outcome
        .whitelisted
        .iter()
        .chain(&outcome.added)
        .chain(&outcome.replaced)
        .cloned()
        .collect();
    names.sort();
    names.dedup();
    names
}
