//! Cutoff and date-expression resolution.
//!
//! Everything here is pure: callers pass the reference instant ("now")
//! explicitly, so date logic stays testable against a fixed clock.
//!
//! A cutoff string resolves through three forms, tried in order:
//!
//! 1. a bare integer, meaning that many minutes ago;
//! 2. a compound duration `NdNhNm` with each component optional;
//! 3. an absolute or word-anchored date-time expression, resolved
//!    relative to now. When only a time of day is given the day is
//!    chosen per the future/past bias; when only a date is given the
//!    time comes from the begin/end guess anchor.
//!
//! Anything else is an [`DaybookError::InvalidTimeExpression`].

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{DaybookError, Result};

/// Which day to assume when an expression names only a time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeBias {
    /// The nearest such time not after now.
    #[default]
    Past,
    /// The nearest such time not before now.
    Future,
}

/// Which end of the day to assume when an expression names only a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayAnchor {
    #[default]
    Begin,
    End,
}

impl DayAnchor {
    fn time(self) -> NaiveTime {
        match self {
            DayAnchor::Begin => NaiveTime::from_hms_opt(0, 0, 0).expect("midnight"),
            // Minute resolution, so the day ends at 23:59.
            DayAnchor::End => NaiveTime::from_hms_opt(23, 59, 0).expect("end of day"),
        }
    }
}

static MINUTES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("minutes regex"));
static DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+)\s*d)?\s*(?:(\d+)\s*h)?\s*(?:(\d+)\s*m)?$").expect("duration regex")
});

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y-%m-%dt%H:%M", "%Y-%m-%d %H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];
const TIME_FORMATS: &[&str] = &["%H:%M", "%I:%M%p", "%I%p"];

/// Resolves a cutoff expression against `now`.
pub fn resolve_expression(
    expr: &str,
    now: NaiveDateTime,
    bias: TimeBias,
    anchor: DayAnchor,
) -> Result<NaiveDateTime> {
    let raw = expr.trim();
    if raw.is_empty() {
        return Err(DaybookError::InvalidTimeExpression(expr.to_string()));
    }
    let lowered = raw.to_lowercase();

    if MINUTES.is_match(&lowered) {
        let minutes: i64 = lowered
            .parse()
            .map_err(|_| DaybookError::InvalidTimeExpression(expr.to_string()))?;
        return Ok(now - Duration::minutes(minutes));
    }

    if let Some(caps) = DURATION.captures(&lowered) {
        let days = caps.get(1).map(|m| m.as_str().parse().unwrap_or(0)).unwrap_or(0);
        let hours = caps.get(2).map(|m| m.as_str().parse().unwrap_or(0)).unwrap_or(0);
        let minutes = caps.get(3).map(|m| m.as_str().parse().unwrap_or(0)).unwrap_or(0);
        if days > 0 || hours > 0 || minutes > 0 {
            let span =
                Duration::days(days) + Duration::hours(hours) + Duration::minutes(minutes);
            return Ok(now - span);
        }
    }

    match lowered.as_str() {
        "now" => return Ok(now),
        "today" => return Ok(now.date().and_time(anchor.time())),
        "yesterday" => return Ok((now.date() - Duration::days(1)).and_time(anchor.time())),
        "tomorrow" => return Ok((now.date() + Duration::days(1)).and_time(anchor.time())),
        _ => {}
    }

    // Day word followed by a time, e.g. "yesterday 3pm".
    if let Some((word, rest)) = lowered.split_once(' ') {
        let date = match word {
            "today" => Some(now.date()),
            "yesterday" => Some(now.date() - Duration::days(1)),
            "tomorrow" => Some(now.date() + Duration::days(1)),
            _ => None,
        };
        if let Some(date) = date {
            for format in TIME_FORMATS {
                if let Ok(time) = NaiveTime::parse_from_str(rest.trim(), format) {
                    return Ok(date.and_time(time));
                }
            }
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&lowered, format) {
            return Ok(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&lowered, format) {
            return Ok(date.and_time(anchor.time()));
        }
    }
    for format in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(&lowered, format) {
            let same_day = now.date().and_time(time);
            let resolved = match bias {
                TimeBias::Past if same_day > now => same_day - Duration::days(1),
                TimeBias::Future if same_day < now => same_day + Duration::days(1),
                _ => same_day,
            };
            return Ok(resolved);
        }
    }

    Err(DaybookError::InvalidTimeExpression(expr.to_string()))
}

pub fn same_day(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.date() == b.date()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    const NOW: &str = "2024-01-10 12:00";

    fn resolve(expr: &str) -> Result<NaiveDateTime> {
        resolve_expression(expr, ts(NOW), TimeBias::default(), DayAnchor::default())
    }

    #[test]
    fn bare_integer_is_minutes_ago() {
        assert_eq!(resolve("90").unwrap(), ts("2024-01-10 10:30"));
    }

    #[test]
    fn compound_durations() {
        assert_eq!(resolve("1d").unwrap(), ts("2024-01-09 12:00"));
        assert_eq!(resolve("2h30m").unwrap(), ts("2024-01-10 09:30"));
        assert_eq!(resolve("1d1h1m").unwrap(), ts("2024-01-09 10:59"));
    }

    #[test]
    fn word_anchors() {
        assert_eq!(resolve("now").unwrap(), ts(NOW));
        assert_eq!(resolve("today").unwrap(), ts("2024-01-10 00:00"));
        assert_eq!(resolve("yesterday").unwrap(), ts("2024-01-09 00:00"));
        let end = resolve_expression("today", ts(NOW), TimeBias::Past, DayAnchor::End).unwrap();
        assert_eq!(end, ts("2024-01-10 23:59"));
    }

    #[test]
    fn absolute_formats() {
        assert_eq!(resolve("2023-12-24 08:15").unwrap(), ts("2023-12-24 08:15"));
        assert_eq!(resolve("2023-12-24").unwrap(), ts("2023-12-24 00:00"));
        assert_eq!(resolve("12/24/2023").unwrap(), ts("2023-12-24 00:00"));
    }

    #[test]
    fn time_of_day_biased_past() {
        // 15:00 has not happened yet at noon, so past bias lands on
        // yesterday afternoon.
        assert_eq!(resolve("15:00").unwrap(), ts("2024-01-09 15:00"));
        assert_eq!(resolve("9:00").unwrap(), ts("2024-01-10 09:00"));
        assert_eq!(resolve("3pm").unwrap(), ts("2024-01-09 15:00"));
    }

    #[test]
    fn day_word_with_time() {
        assert_eq!(resolve("yesterday 3pm").unwrap(), ts("2024-01-09 15:00"));
        assert_eq!(resolve("today 9:30").unwrap(), ts("2024-01-10 09:30"));
    }

    #[test]
    fn time_of_day_biased_future() {
        let resolved =
            resolve_expression("9:00", ts(NOW), TimeBias::Future, DayAnchor::Begin).unwrap();
        assert_eq!(resolved, ts("2024-01-11 09:00"));
    }

    #[test]
    fn rejects_empty_and_garbage() {
        assert!(matches!(
            resolve(""),
            Err(DaybookError::InvalidTimeExpression(_))
        ));
        assert!(matches!(
            resolve("not a date"),
            Err(DaybookError::InvalidTimeExpression(_))
        ));
    }
}
