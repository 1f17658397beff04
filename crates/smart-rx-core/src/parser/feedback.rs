//! Feedback for orders no grammar recognized.

use std::sync::LazyLock;

use regex::Regex;
use strsim::jaro_winkler;

use crate::models::{Fragments, ParsedResult};

use super::duration::parse_duration;
use super::frequency::{parse_frequency, Frequency, FREQUENCY_TABLE};

/// Minimum Jaro-Winkler similarity for a "did you mean" hint.
const SUGGESTION_THRESHOLD: f64 = 0.85;

pub const MISSING_DOSE: &str =
    "Could not find dose quantity. Start with a number (e.g., \"2 BD x 5 days\")";
pub const MISSING_FREQUENCY: &str =
    "Could not find frequency. Use OD, BD, TDS, QDS, Q6H, Q8H, or Q12H";
pub const MISSING_DURATION: &str = "Could not find duration. Add \"x N days\" or \"x N/7\"";
pub const UNRECOGNIZED_ORDER: &str =
    "Could not parse prescription. Try formats like '2 BD x 5 days' or '1-0-1 x 7 days'";

static RE_LEADING_DOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+(?:\.\d+)?)\s*(ml|mg|tabs?|capsules?|caps?)?").unwrap()
});

static RE_FREQUENCY_WORDS: LazyLock<Vec<(Regex, Frequency)>> = LazyLock::new(|| {
    FREQUENCY_TABLE
        .iter()
        .map(|(abbreviation, frequency)| {
            // a code may follow the dose directly ("2BD") but not sit inside a word
            let pattern = format!(
                r"(?i)(?:^|[^A-Za-z]){}(?:$|[^A-Za-z0-9])",
                regex::escape(abbreviation)
            );
            (Regex::new(&pattern).unwrap(), *frequency)
        })
        .collect()
});

static RE_DURATION_CLAUSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)x\s*(.+)$").unwrap());

static RE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z][A-Za-z0-9]{1,4}").unwrap());

/// Build a partial result naming each missing component.
pub fn synthesize_feedback(input: &str) -> ParsedResult {
    let mut fragments = Fragments::default();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if let Some(caps) = RE_LEADING_DOSE.captures(input) {
        fragments.dose_quantity = Some(match caps.get(2) {
            Some(unit) => format!("{} {}", &caps[1], unit.as_str()),
            None => caps[1].to_string(),
        });
    }

    if let Some(frequency) = RE_FREQUENCY_WORDS
        .iter()
        .find(|(re, _)| re.is_match(input))
        .map(|(_, frequency)| frequency)
    {
        fragments.frequency = Some(frequency.description.into());
        fragments.frequency_code = Some(frequency.code.into());
    }

    if let Some(duration) = RE_DURATION_CLAUSE
        .captures(input)
        .and_then(|caps| parse_duration(&caps[1]))
    {
        fragments.duration = Some(duration.duration);
        fragments.duration_days = Some(duration.days);
    }

    if fragments.dose_quantity.is_none() {
        errors.push(MISSING_DOSE.to_string());
    }
    if fragments.frequency_code.is_none() {
        errors.push(MISSING_FREQUENCY.to_string());
        if let Some((word, code)) = suggest_frequency(input) {
            warnings.push(format!(
                "Unrecognized frequency '{}'. Did you mean {}?",
                word, code
            ));
        }
    }
    if fragments.duration_days.is_none() {
        errors.push(MISSING_DURATION.to_string());
    }

    // every component present, yet no grammar accepted the combination
    if errors.is_empty() {
        errors.push(UNRECOGNIZED_ORDER.to_string());
    }

    ParsedResult::partial(errors, warnings, fragments)
}

/// Find a word that looks like a misspelt frequency code.
///
/// Words that already are codes never qualify.
fn suggest_frequency(input: &str) -> Option<(String, &'static str)> {
    RE_WORD
        .find_iter(input)
        .map(|m| m.as_str())
        .filter(|word| parse_frequency(word).is_none())
        .filter_map(|word| {
            let upper = word.to_uppercase();
            FREQUENCY_TABLE
                .iter()
                .map(|(abbreviation, frequency)| (jaro_winkler(&upper, abbreviation), frequency.code))
                .max_by(|a, b| a.0.total_cmp(&b.0))
                .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
                .map(|(score, code)| (score, word.to_string(), code))
        })
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, word, code)| (word, code))
}
