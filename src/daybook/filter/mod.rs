//! # Filter Engine
//!
//! Evaluates a [`FilterCriteria`] against a slice of items and returns an
//! ordered subset. Every present criterion must pass (logical AND at the
//! top level); tag criteria compose internally via [`TagBool`].
//!
//! Ordering is part of the contract, not a presentation detail: items are
//! pre-sorted by `(timestamp, lowercased title)` ascending and then
//! reversed, so ties break by reverse-lexicographic title. `count`
//! truncation slices that sequence, which is exactly why the ordering
//! must be reproduced here and not downstream. Export renderers receive
//! this output as final display order and must not re-sort.
//!
//! The `negate` flag inverts each match-style predicate independently
//! rather than negating the final result. That mirrors the observable
//! behavior this engine is specified against; see DESIGN.md.

pub mod dates;

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Item, ALL_SECTIONS};
use crate::tags::{self, TagBool};
use self::dates::{resolve_expression, same_day, DayAnchor, TimeBias};

/// Case handling for free-text search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    Sensitive,
    Ignore,
    /// Case-sensitive only when the query contains an uppercase letter.
    #[default]
    Smart,
}

/// Which end of the timeline `count` keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Age {
    #[default]
    Newest,
    Oldest,
}

/// The structured `{tags, bool}` tag criterion used by saved views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagFilter {
    pub tags: Vec<String>,
    #[serde(default)]
    pub bool_mode: TagBool,
}

/// A same-day or inclusive-range timestamp criterion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateFilter {
    pub start: NaiveDateTime,
    /// With an end the match is an inclusive range; without one, the
    /// item must fall on the same calendar day as `start`.
    pub end: Option<NaiveDateTime>,
}

/// Independently-optional filter criteria, combined with AND.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    /// Restrict to one section; `None` or "All" means no restriction.
    pub section: Option<String>,
    /// Keep only items without a `done` tag.
    pub unfinished: bool,
    pub tags: Vec<String>,
    pub tag_bool: TagBool,
    /// Free-text query: plain substring, `/regex/`, or `'exact`.
    pub search: Option<String>,
    pub case: CaseMode,
    /// Saved-view tag criterion, independent of `tags`.
    pub tag_filter: Option<TagFilter>,
    pub date_filter: Option<DateFilter>,
    /// Keep only items with a defined interval.
    pub only_timed: bool,
    /// Cutoff expressions, resolved at filter time against `now`.
    pub before: Option<String>,
    pub after: Option<String>,
    pub today: bool,
    pub yesterday: bool,
    /// Invert each match-style predicate independently.
    pub negate: bool,
    /// Truncate the result to this many items; 0 means no truncation.
    pub count: usize,
    pub age: Age,
}

impl FilterCriteria {
    pub fn in_section(section: impl Into<String>) -> Self {
        Self {
            section: Some(section.into()),
            ..Self::default()
        }
    }
}

/// Runs the criteria over `items` and returns matching clones in final
/// display order.
pub fn filter_items(
    items: &[Item],
    criteria: &FilterCriteria,
    now: NaiveDateTime,
) -> Result<Vec<Item>> {
    // Cutoffs resolve once, up front, so a bad expression fails the whole
    // call instead of silently matching nothing.
    let before = criteria
        .before
        .as_deref()
        .map(|e| resolve_expression(e, now, TimeBias::Past, DayAnchor::End))
        .transpose()?;
    let after = criteria
        .after
        .as_deref()
        .map(|e| resolve_expression(e, now, TimeBias::Past, DayAnchor::Begin))
        .transpose()?;

    let mut ordered: Vec<&Item> = items.iter().collect();
    ordered.sort_by(|a, b| {
        (a.timestamp, a.title.to_lowercase()).cmp(&(b.timestamp, b.title.to_lowercase()))
    });
    ordered.reverse();

    let negate = criteria.negate;
    let keep = |item: &Item| -> bool {
        if let Some(section) = &criteria.section {
            if !section.eq_ignore_ascii_case(ALL_SECTIONS)
                && !item.section.eq_ignore_ascii_case(section)
            {
                return false;
            }
        }
        if criteria.unfinished && (!item.finished()) == negate {
            return false;
        }
        if !criteria.tags.is_empty()
            && tags::matches_tags(&item.title, &criteria.tags, criteria.tag_bool) == negate
        {
            return false;
        }
        if let Some(query) = &criteria.search {
            if search_matches(&item.search_text(), query, criteria.case) == negate {
                return false;
            }
        }
        if let Some(tag_filter) = &criteria.tag_filter {
            if !tag_filter.tags.is_empty()
                && tags::matches_tags(&item.title, &tag_filter.tags, tag_filter.bool_mode)
                    == negate
            {
                return false;
            }
        }
        if let Some(date_filter) = &criteria.date_filter {
            let matched = match date_filter.end {
                Some(end) => item.timestamp >= date_filter.start && item.timestamp <= end,
                None => same_day(item.timestamp, date_filter.start),
            };
            if matched == negate {
                return false;
            }
        }
        if criteria.only_timed && item.interval().is_some() == negate {
            return false;
        }
        if let Some(cutoff) = before {
            if (item.timestamp <= cutoff) == negate {
                return false;
            }
        }
        if let Some(cutoff) = after {
            if (item.timestamp >= cutoff) == negate {
                return false;
            }
        }
        if criteria.today {
            if same_day(item.timestamp, now) == negate {
                return false;
            }
        } else if criteria.yesterday {
            let yesterday = now - chrono::Duration::days(1);
            if same_day(item.timestamp, yesterday) == negate {
                return false;
            }
        }
        true
    };

    let mut matched: Vec<Item> = ordered
        .into_iter()
        .filter(|i| keep(i))
        .cloned()
        .collect();

    if criteria.count > 0 && matched.len() > criteria.count {
        match criteria.age {
            Age::Newest => matched.truncate(criteria.count),
            Age::Oldest => {
                matched = matched.split_off(matched.len() - criteria.count);
            }
        }
    }
    if criteria.count > 0 {
        // The truncated slice reads chronologically ascending.
        matched.reverse();
    }
    Ok(matched)
}

static REGEX_QUERY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/(.+)/$").expect("regex query pattern"));

/// Matches a free-text query against searchable text (title plus note
/// lines). Three modes: plain substring, `/…/` regex, and `'`-prefixed
/// exact (the whole title or a whole note line must equal the query).
pub fn search_matches(text: &str, query: &str, case: CaseMode) -> bool {
    if let Some(caps) = REGEX_QUERY.captures(query) {
        let body = &caps[1];
        let sensitive = is_sensitive(body, case);
        let source = if sensitive {
            body.to_string()
        } else {
            format!("(?i){}", body)
        };
        return match Regex::new(&source) {
            Ok(re) => re.is_match(text),
            Err(_) => false,
        };
    }
    if let Some(exact) = query.strip_prefix('\'') {
        let sensitive = is_sensitive(exact, case);
        return text.lines().any(|line| {
            if sensitive {
                line == exact
            } else {
                line.eq_ignore_ascii_case(exact)
            }
        });
    }
    if is_sensitive(query, case) {
        text.contains(query)
    } else {
        text.to_lowercase().contains(&query.to_lowercase())
    }
}

fn is_sensitive(query: &str, case: CaseMode) -> bool {
    match case {
        CaseMode::Sensitive => true,
        CaseMode::Ignore => false,
        CaseMode::Smart => query.chars().any(|c| c.is_uppercase()),
    }
}
