//! Course-length clauses ("x 5 days", "7/7", "for 2 weeks").

use std::sync::LazyLock;

use regex::Regex;

static RE_TRAILING_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.,;:!?]+$").unwrap());

// Separator is optional: x, *, / or "for".
static RE_WEEK_NOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:[x*/]\s*|for\s+)?(\d+)/7$").unwrap());
static RE_WEEKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:[x*/]\s*|for\s+)?(\d+)\s*weeks?$").unwrap());
static RE_DAYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:[x*/]\s*|for\s+)?(\d+)\s*(?:days?|d)?$").unwrap());

/// A parsed course length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duration {
    /// Display form ("5 days", "2 weeks")
    pub duration: String,
    /// Total days covered
    pub days: u32,
}

impl Duration {
    fn days(days: u32) -> Self {
        Self {
            duration: plural(days, "day"),
            days,
        }
    }
}

pub(crate) fn plural(n: u32, unit: &str) -> String {
    if n == 1 {
        format!("{} {}", n, unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

/// Parse a duration clause.
///
/// Tried in order, first match wins:
/// 1. `N/7` week notation (before plain days, since `/` is also a separator)
/// 2. `N week(s)`
/// 3. `N day(s)`, `N d`, `Nd`, or a bare `N`
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    let input = RE_TRAILING_PUNCTUATION.replace(input, "");
    let input = input.trim();

    if let Some(caps) = RE_WEEK_NOTATION.captures(input) {
        let days = caps[1].parse().ok()?;
        return Some(Duration::days(days));
    }

    if let Some(caps) = RE_WEEKS.captures(input) {
        let weeks: u32 = caps[1].parse().ok()?;
        return Some(Duration {
            duration: plural(weeks, "week"),
            days: weeks.checked_mul(7)?,
        });
    }

    if let Some(caps) = RE_DAYS.captures(input) {
        let days = caps[1].parse().ok()?;
        return Some(Duration::days(days));
    }

    None
}
