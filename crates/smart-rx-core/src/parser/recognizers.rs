//! Order grammars.
//!
//! Each recognizer returns `None` when its shape does not match, letting the
//! dispatcher move on. Once a shape has matched, the recognizer owns the
//! answer: a bad duration clause yields a partial result rather than `None`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::models::{Drug, Dosing, Fragments, ParsedResult, SchedulePattern, ScheduleType, SplitPattern};

use super::duration::{parse_duration, plural};
use super::frequency::{frequency_alternation, parse_frequency};
use super::quantity::ceil_count;

/// A single grammar in the dispatch order.
pub(crate) type Recognizer = fn(&str, Option<&Drug>) -> Option<ParsedResult>;

/// Dispatch order. Earlier grammars win; taper must precede split dose.
pub(crate) const RECOGNIZERS: [(&str, Recognizer); 8] = [
    ("stat", parse_stat),
    ("patch", parse_patch),
    ("prn", parse_prn),
    ("taper", parse_taper),
    ("injectable", parse_injectable_schedule),
    ("custom_interval", parse_custom_intervals),
    ("split_dose", parse_split_dose),
    ("standard", parse_standard),
];

static RE_STAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+(?:\.\d+)?)?\s*(tabs?|capsules?|caps?|ml)?\s*STAT$").unwrap()
});

static RE_PATCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:change\s+)?every\s+(\d+)\s*days?\s*x\s*(\d+)\s*days?$").unwrap()
});

static RE_PRN_MAX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(\d+(?:\.\d+)?)?\s*(tabs?|capsules?|caps?|ml)?\s*PRN\s+max\s+(\d+)/24h\s*x\s*(\d+)\s*days?$",
    )
    .unwrap()
});
static RE_PRN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+(?:\.\d+)?)?\s*(tabs?|capsules?|caps?|ml)?\s*PRN$").unwrap()
});

static RE_TAPER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^((?:\d+(?:\.\d+)?-)+\d+(?:\.\d+)?)\s*(?:taper)?$").unwrap()
});

static RE_INJECTABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+(?:\.\d+)?)\s*(mg|ml|units?)?\s*0-12-24\s*(?:H|HRS?)$").unwrap()
});

// Custom-interval sub-grammars, tried in this order.
static RE_INTERVALS_SUFFIXED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+(?:\.\d+)?)\s*(tabs?|capsules?|caps?|ml|mg)?\s*((?:\d+h?,?\s*)+)$").unwrap()
});
static RE_INTERVALS_AT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+(?:\.\d+)?)\s*(tabs?|capsules?|caps?|ml|mg)?\s*at\s*((?:\d+,?\s*)+)$").unwrap()
});
static RE_INTERVALS_HRS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+(?:\.\d+)?)\s*(mg|ml)\s+((?:\d+,)+\d+)\s*(?:hrs?)?$").unwrap()
});
static RE_INTERVAL_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,\s]+").unwrap());

static RE_SPLIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+(?:\.\d+)?)-(\d+(?:\.\d+)?)-(\d+(?:\.\d+)?)\s*[x*/]\s*(.+)$").unwrap()
});
static RE_SPLIT_FOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+(?:\.\d+)?)-(\d+(?:\.\d+)?)-(\d+(?:\.\d+)?)\s+for\s+(.+)$").unwrap()
});

static RE_STANDARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^(\d+(?:\.\d+)?)\s*(ml|mg|tabs?|capsules?|caps?)?\s*({})\s*[x*/]\s*(.+)$",
        frequency_alternation()
    ))
    .unwrap()
});
static RE_STANDARD_FOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^(\d+(?:\.\d+)?)\s*(ml|mg|tabs?|capsules?|caps?)?\s*({})\s+for\s+(.+)$",
        frequency_alternation()
    ))
    .unwrap()
});

/// Dose value plus optional unit, e.g. "2" or "5 ml".
fn dose_quantity(value: &str, unit: Option<&str>) -> String {
    match unit {
        Some(unit) if !unit.is_empty() => format!("{} {}", value, unit),
        _ => value.to_string(),
    }
}

fn duration_error(fragment: &str) -> String {
    format!(
        "Could not parse duration: '{}'. Try 'x 5 days', '5d', or just '5'",
        fragment
    )
}

/// Partial result for a matched shape whose count does not fit.
///
/// Quotes the clause from the offending number to the end of the input.
fn count_error(input: &str, caps: &Captures<'_>, i: usize) -> ParsedResult {
    let start = caps.get(i).map_or(0, |m| m.start());
    ParsedResult::partial(
        vec![duration_error(&input[start..])],
        Vec::new(),
        Fragments::default(),
    )
}

fn optional_group<'h>(caps: &Captures<'h>, i: usize) -> Option<&'h str> {
    caps.get(i).map(|m| m.as_str())
}

/// `[N] [unit] STAT`: a single immediate dose.
pub fn parse_stat(input: &str, _drug: Option<&Drug>) -> Option<ParsedResult> {
    let caps = RE_STAT.captures(input)?;

    let value = optional_group(&caps, 1).unwrap_or("1");
    let dose: f64 = value.parse().ok()?;

    Some(ParsedResult::stat(
        dose_quantity(value, optional_group(&caps, 2)),
        ceil_count(dose),
    ))
}

/// `[change] every N days x D days`: patches and other devices replaced on a cycle.
pub fn parse_patch(input: &str, _drug: Option<&Drug>) -> Option<ParsedResult> {
    let caps = RE_PATCH.captures(input)?;

    let Ok(change_interval) = caps[1].parse::<u32>() else {
        return Some(count_error(input, &caps, 1));
    };
    if change_interval < 1 {
        return None;
    }
    let Ok(duration_days) = caps[2].parse::<u32>() else {
        return Some(count_error(input, &caps, 2));
    };

    Some(ParsedResult::valid(Dosing {
        dose_quantity: "1".into(),
        frequency: format!("Every {}", plural(change_interval, "day")),
        frequency_code: "INTERVAL".into(),
        duration: plural(duration_days, "day"),
        duration_days: Some(duration_days),
        quantity_to_dispense: duration_days.div_ceil(change_interval),
        schedule_type: ScheduleType::Interval,
        schedule_pattern: Some(SchedulePattern::Interval {
            change_interval_days: change_interval,
            duration_days,
        }),
        display_text: Some(format!(
            "Change every {} x {}",
            plural(change_interval, "day"),
            plural(duration_days, "day")
        )),
    }))
}

/// `[N] [unit] PRN [max M/24h x D days]`: as-needed dosing, optionally capped.
pub fn parse_prn(input: &str, _drug: Option<&Drug>) -> Option<ParsedResult> {
    if let Some(caps) = RE_PRN_MAX.captures(input) {
        let value = optional_group(&caps, 1).unwrap_or("1");
        let Ok(max_daily) = caps[3].parse::<u32>() else {
            return Some(count_error(input, &caps, 3));
        };
        let Ok(duration_days) = caps[4].parse::<u32>() else {
            return Some(count_error(input, &caps, 4));
        };
        let dose = dose_quantity(value, optional_group(&caps, 2));
        let duration = plural(duration_days, "day");

        return Some(ParsedResult::valid(Dosing {
            display_text: Some(format!("{} PRN (max {}/24h) x {}", dose, max_daily, duration)),
            dose_quantity: dose,
            frequency: format!("As needed (max {}/24h)", max_daily),
            frequency_code: "PRN".into(),
            duration,
            duration_days: Some(duration_days),
            quantity_to_dispense: max_daily.saturating_mul(duration_days),
            schedule_type: ScheduleType::Prn,
            schedule_pattern: Some(SchedulePattern::Prn {
                max_daily,
                duration_days,
            }),
        }));
    }

    let caps = RE_PRN.captures(input)?;
    let value = optional_group(&caps, 1).unwrap_or("1");
    let dose: f64 = value.parse().ok()?;

    Some(ParsedResult::prn(
        dose_quantity(value, optional_group(&caps, 2)),
        ceil_count(dose),
    ))
}

/// `d1-d2-...-dn [taper]`: one dose per day, stepping down.
///
/// Without the keyword the sequence must be non-increasing, otherwise
/// "1-0-1"-style input belongs to the split-dose grammar.
pub fn parse_taper(input: &str, _drug: Option<&Drug>) -> Option<ParsedResult> {
    let caps = RE_TAPER.captures(input)?;

    let doses = caps[1]
        .split('-')
        .map(|d| d.parse::<f64>().ok())
        .collect::<Option<Vec<_>>>()?;
    if doses.len() < 2 {
        return None;
    }

    let has_keyword = input.to_lowercase().contains("taper");
    let is_decreasing = doses.windows(2).all(|pair| pair[1] <= pair[0]);
    if !has_keyword && !is_decreasing {
        return None;
    }

    let duration_days = doses.len() as u32;
    let dose_text = doses
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("-");

    Some(ParsedResult::valid(Dosing {
        display_text: Some(format!("{} taper", dose_text)),
        dose_quantity: dose_text,
        frequency: "Taper schedule".into(),
        frequency_code: "TAPER".into(),
        duration: plural(duration_days, "day"),
        duration_days: Some(duration_days),
        quantity_to_dispense: ceil_count(doses.iter().sum()),
        schedule_type: ScheduleType::Taper,
        schedule_pattern: Some(SchedulePattern::Taper {
            doses,
            duration_days,
        }),
    }))
}

/// `N [unit] 0-12-24H`: three injections at hours 0, 12 and 24.
///
/// Only injectable forms may use this schedule.
pub fn parse_injectable_schedule(input: &str, drug: Option<&Drug>) -> Option<ParsedResult> {
    let caps = RE_INJECTABLE.captures(input)?;

    if let Some(drug) = drug {
        if !drug.form.is_injectable() {
            return Some(ParsedResult::invalid(vec![
                "0-12-24H schedule is only valid for injectable drugs.".into(),
                format!("This drug is a '{}', not an injection.", drug.form),
            ]));
        }
    }

    let value = &caps[1];
    let dose: f64 = value.parse().ok()?;
    let dose_text = dose_quantity(value, optional_group(&caps, 2));
    let total_doses = 3;

    Some(ParsedResult::valid(Dosing {
        display_text: Some(format!("{} at 0, 12, 24 hours", dose_text)),
        dose_quantity: dose_text,
        frequency: "At 0, 12, 24 hours (0-12-24H)".into(),
        frequency_code: "0-12-24H".into(),
        duration: "24 hours (3 doses)".into(),
        duration_days: Some(1),
        quantity_to_dispense: ceil_count(dose * total_doses as f64),
        schedule_type: ScheduleType::InjectableInterval,
        schedule_pattern: Some(SchedulePattern::InjectableInterval {
            intervals_hours: vec![0, 12, 24],
            dose_per_interval: dose,
            total_doses,
        }),
    }))
}

/// Hour offsets from "0h,8h,24h", "0, 8, 24" or "0,8,24", in ascending order.
fn parse_interval_list(list: &str) -> Option<Vec<u32>> {
    let cleaned = list.replace(['h', 'H'], "");
    let mut intervals = RE_INTERVAL_SPLIT
        .split(cleaned.trim())
        .filter(|token| !token.is_empty())
        .map(|token| token.parse::<u32>().ok())
        .collect::<Option<Vec<_>>>()?;

    if intervals.len() < 2 {
        return None;
    }
    if !intervals.contains(&0) {
        intervals.push(0);
    }
    intervals.sort_unstable();

    let mut distinct = intervals.clone();
    distinct.dedup();
    if distinct.len() < 2 {
        return None;
    }

    Some(intervals)
}

/// `N [unit] 0h,8h,24h`, `N [unit] at 0,8,24` or `N mg 0,8,24 HRS`.
pub fn parse_custom_intervals(input: &str, _drug: Option<&Drug>) -> Option<ParsedResult> {
    let caps = RE_INTERVALS_SUFFIXED
        .captures(input)
        .or_else(|| RE_INTERVALS_AT.captures(input))
        .or_else(|| RE_INTERVALS_HRS.captures(input))?;

    let value = &caps[1];
    let dose: f64 = value.parse().ok()?;
    let intervals = parse_interval_list(&caps[3])?;

    let total_doses = intervals.len() as u32;
    let last_offset = intervals.iter().copied().max().unwrap_or(0);
    let dose_text = dose_quantity(value, optional_group(&caps, 2));
    let offsets = intervals
        .iter()
        .map(|h| format!("{}h", h))
        .collect::<Vec<_>>()
        .join(", ");

    Some(ParsedResult::valid(Dosing {
        display_text: Some(format!("{} at {}", dose_text, offsets)),
        dose_quantity: dose_text,
        frequency: format!("Custom intervals ({} doses)", total_doses),
        frequency_code: "CUSTOM".into(),
        duration: "Custom schedule".into(),
        // calendar days touched: offsets 0..60h span days 0, 1 and 2
        duration_days: Some(last_offset / 24 + 1),
        quantity_to_dispense: ceil_count(dose * total_doses as f64),
        schedule_type: ScheduleType::CustomInterval,
        schedule_pattern: Some(SchedulePattern::CustomInterval {
            intervals_hours: intervals,
            dose_per_interval: dose,
            total_doses,
        }),
    }))
}

/// `m-n-e x duration`: morning, noon and evening doses every day.
pub fn parse_split_dose(input: &str, _drug: Option<&Drug>) -> Option<ParsedResult> {
    let caps = RE_SPLIT
        .captures(input)
        .or_else(|| RE_SPLIT_FOR.captures(input))?;

    let split = SplitPattern {
        morning: caps[1].parse().ok()?,
        noon: caps[2].parse().ok()?,
        evening: caps[3].parse().ok()?,
    };
    let dose_text = format!("{}-{}-{}", split.morning, split.noon, split.evening);
    let duration_part = &caps[4];

    let Some(duration) = parse_duration(duration_part) else {
        return Some(ParsedResult::partial(
            vec![duration_error(duration_part)],
            Vec::new(),
            Fragments {
                dose_quantity: Some(dose_text),
                ..Fragments::default()
            },
        ));
    };

    let daily_total = split.daily_total();
    let parts = [
        (split.morning, "morning"),
        (split.noon, "noon"),
        (split.evening, "evening"),
    ]
    .iter()
    .filter(|(dose, _)| *dose > 0.0)
    .map(|(dose, label)| format!("{} {}", dose, label))
    .collect::<Vec<_>>();
    let frequency = format!("{} ({}/day)", parts.join(", "), daily_total)
        .trim_start()
        .to_string();

    Some(ParsedResult::valid(Dosing {
        display_text: Some(format!("{} x {}", dose_text, duration.duration)),
        dose_quantity: dose_text,
        frequency,
        frequency_code: "SPLIT".into(),
        duration: duration.duration,
        duration_days: Some(duration.days),
        quantity_to_dispense: ceil_count(daily_total * duration.days as f64),
        schedule_type: ScheduleType::SplitDose,
        schedule_pattern: Some(SchedulePattern::SplitDose {
            pattern: split,
            daily_total,
        }),
    }))
}

/// `N [unit] FREQ x duration`, e.g. "2 BD x 5 days" or "5ml TDS for 7".
pub fn parse_standard(input: &str, _drug: Option<&Drug>) -> Option<ParsedResult> {
    let caps = RE_STANDARD
        .captures(input)
        .or_else(|| RE_STANDARD_FOR.captures(input))?;

    let value = &caps[1];
    let dose: f64 = value.parse().ok()?;
    let frequency = parse_frequency(&caps[3])?;
    let dose_text = dose_quantity(value, optional_group(&caps, 2));
    let duration_part = &caps[4];

    let Some(duration) = parse_duration(duration_part) else {
        return Some(ParsedResult::partial(
            vec![duration_error(duration_part)],
            Vec::new(),
            Fragments {
                dose_quantity: Some(dose_text),
                frequency: Some(frequency.description.into()),
                frequency_code: Some(frequency.code.into()),
                ..Fragments::default()
            },
        ));
    };

    let total = dose * frequency.times_per_day as f64 * duration.days as f64;

    Some(ParsedResult::valid(Dosing {
        display_text: Some(format!(
            "{} {} x {}",
            dose_text, frequency.code, duration.duration
        )),
        dose_quantity: dose_text,
        frequency: frequency.description.into(),
        frequency_code: frequency.code.into(),
        duration: duration.duration,
        duration_days: Some(duration.days),
        quantity_to_dispense: ceil_count(total),
        schedule_type: ScheduleType::Standard,
        schedule_pattern: Some(SchedulePattern::Standard {
            frequency_code: frequency.code.into(),
            times_per_day: frequency.times_per_day,
        }),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DrugForm;

    #[test]
    fn test_stat_variants() {
        for (input, dose, qty) in [
            ("STAT", "1", 1),
            ("2 STAT", "2", 2),
            ("2 tabs STAT", "2 tabs", 2),
            ("1 cap STAT", "1 cap", 1),
            ("1.5 ml stat", "1.5 ml", 2),
        ] {
            let result = parse_stat(input, None).unwrap();
            assert_eq!(result.dose_quantity.as_deref(), Some(dose), "{}", input);
            assert_eq!(result.quantity_to_dispense, Some(qty), "{}", input);
            assert_eq!(result.duration_days, Some(1));
            assert_eq!(result.frequency_code.as_deref(), Some("STAT"));
        }
        assert!(parse_stat("STAT x 5 days", None).is_none());
    }

    #[test]
    fn test_patch_interval() {
        let result = parse_patch("change every 3 days x 30 days", None).unwrap();

        assert_eq!(result.schedule_type, ScheduleType::Interval);
        assert_eq!(result.quantity_to_dispense, Some(10));
        assert_eq!(result.duration_days, Some(30));
        assert_eq!(
            result.schedule_pattern,
            Some(SchedulePattern::Interval {
                change_interval_days: 3,
                duration_days: 30
            })
        );

        let uneven = parse_patch("every 7 days x 30 days", None).unwrap();
        assert_eq!(uneven.quantity_to_dispense, Some(5));

        assert!(parse_patch("every 0 days x 30 days", None).is_none());
    }

    #[test]
    fn test_patch_count_overflow_is_partial() {
        let result = parse_patch("every 3 days x 99999999999 days", None).unwrap();

        assert!(!result.is_valid);
        assert_eq!(result.quantity_to_dispense, None);
        assert_eq!(
            result.errors,
            vec![
                "Could not parse duration: '99999999999 days'. Try 'x 5 days', '5d', or just '5'"
                    .to_string()
            ]
        );

        let interval = parse_patch("every 99999999999 days x 30 days", None).unwrap();
        assert!(!interval.is_valid);
        assert!(interval.errors[0].contains("'99999999999 days x 30 days'"));
    }

    #[test]
    fn test_prn_cap_overflow_is_partial() {
        let result = parse_prn("2 PRN max 6/24h x 99999999999 days", None).unwrap();

        assert!(!result.is_valid);
        assert!(result.errors[0].contains("'99999999999 days'"));
    }

    #[test]
    fn test_prn_with_cap() {
        let result = parse_prn("2 PRN max 6/24h x 5 days", None).unwrap();

        assert_eq!(result.quantity_to_dispense, Some(30));
        assert_eq!(result.duration_days, Some(5));
        assert_eq!(result.frequency.as_deref(), Some("As needed (max 6/24h)"));
        assert_eq!(
            result.schedule_pattern,
            Some(SchedulePattern::Prn {
                max_daily: 6,
                duration_days: 5
            })
        );
        assert_eq!(
            result.display_text.as_deref(),
            Some("2 PRN (max 6/24h) x 5 days")
        );
    }

    #[test]
    fn test_simple_prn() {
        let result = parse_prn("2 tabs PRN", None).unwrap();

        assert_eq!(result.dose_quantity.as_deref(), Some("2 tabs"));
        assert_eq!(result.quantity_to_dispense, Some(2));
        assert_eq!(result.duration_days, None);
        assert_eq!(result.schedule_pattern, None);

        let bare = parse_prn("PRN", None).unwrap();
        assert_eq!(bare.dose_quantity.as_deref(), Some("1"));
    }

    #[test]
    fn test_taper_quantities() {
        for (input, qty, days) in [
            ("4-3-2-1 taper", 10, 4),
            ("6-5-4-3-2-1 taper", 21, 6),
            ("3-2-1 taper", 6, 3),
            ("3-2-1", 6, 3),
            ("2.5-1.5 TAPER", 4, 2),
        ] {
            let result = parse_taper(input, None).unwrap();
            assert_eq!(result.quantity_to_dispense, Some(qty), "{}", input);
            assert_eq!(result.duration_days, Some(days), "{}", input);
        }
    }

    #[test]
    fn test_taper_rejects_split_shape() {
        assert!(parse_taper("1-0-1", None).is_none());
        assert!(parse_taper("1-2-3-4", None).is_none());
        assert!(parse_taper("1-2-3-4 taper", None).is_some());
    }

    #[test]
    fn test_taper_pattern_and_display() {
        let result = parse_taper("4-3-2-1 taper", None).unwrap();

        assert_eq!(result.dose_quantity.as_deref(), Some("4-3-2-1"));
        assert_eq!(result.display_text.as_deref(), Some("4-3-2-1 taper"));
        assert_eq!(
            result.schedule_pattern,
            Some(SchedulePattern::Taper {
                doses: vec![4.0, 3.0, 2.0, 1.0],
                duration_days: 4
            })
        );
    }

    #[test]
    fn test_injectable_schedule() {
        let result = parse_injectable_schedule("60mg 0-12-24 HRS", None).unwrap();

        assert!(result.is_valid);
        assert_eq!(result.dose_quantity.as_deref(), Some("60 mg"));
        assert_eq!(result.quantity_to_dispense, Some(180));
        assert_eq!(result.schedule_type, ScheduleType::InjectableInterval);

        let vial = Drug::new(DrugForm::Injection);
        assert!(parse_injectable_schedule("2 0-12-24H", Some(&vial)).unwrap().is_valid);
    }

    #[test]
    fn test_injectable_schedule_rejects_tablets() {
        let tablet = Drug::new(DrugForm::Tablet);
        let result = parse_injectable_schedule("2 0-12-24H", Some(&tablet)).unwrap();

        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[1].contains("'tablet'"));
    }

    #[test]
    fn test_custom_intervals() {
        for (input, per_dose, doses, qty) in [
            ("4 tabs 0h,8h,24h,36h,48h,60h", 4.0, 6, 24),
            ("2 tabs 0h,12h,24h,36h", 2.0, 4, 8),
            ("3 tabs 0h,8h,24h", 3.0, 3, 9),
            ("4 tabs at 0,8,24,36,48,60", 4.0, 6, 24),
            ("4mg 0,8,12,24 HRS", 4.0, 4, 16),
            ("4mg 0,8,12,24", 4.0, 4, 16),
        ] {
            let result = parse_custom_intervals(input, None).unwrap();
            assert_eq!(result.quantity_to_dispense, Some(qty), "{}", input);
            match result.schedule_pattern {
                Some(SchedulePattern::CustomInterval {
                    dose_per_interval,
                    total_doses,
                    ..
                }) => {
                    assert_eq!(dose_per_interval, per_dose, "{}", input);
                    assert_eq!(total_doses, doses, "{}", input);
                }
                other => panic!("unexpected pattern for {}: {:?}", input, other),
            }
        }
    }

    #[test]
    fn test_custom_intervals_insert_zero() {
        let result = parse_custom_intervals("2 tabs 8h,16h", None).unwrap();

        assert_eq!(
            result.schedule_pattern,
            Some(SchedulePattern::CustomInterval {
                intervals_hours: vec![0, 8, 16],
                dose_per_interval: 2.0,
                total_doses: 3
            })
        );
        assert_eq!(result.quantity_to_dispense, Some(6));
        assert_eq!(result.duration_days, Some(1));
        assert_eq!(result.display_text.as_deref(), Some("2 tabs at 0h, 8h, 16h"));
    }

    #[test]
    fn test_custom_intervals_are_sorted() {
        let result = parse_custom_intervals("2 tabs 8h,0h", None).unwrap();

        assert_eq!(
            result.schedule_pattern,
            Some(SchedulePattern::CustomInterval {
                intervals_hours: vec![0, 8],
                dose_per_interval: 2.0,
                total_doses: 2
            })
        );
        assert_eq!(result.display_text.as_deref(), Some("2 tabs at 0h, 8h"));

        let shuffled = parse_custom_intervals("1 tab at 24, 8", None).unwrap();
        assert_eq!(shuffled.display_text.as_deref(), Some("1 tab at 0h, 8h, 24h"));
        assert_eq!(shuffled.duration_days, Some(2));
    }

    #[test]
    fn test_custom_intervals_need_two_offsets() {
        assert!(parse_custom_intervals("4 tabs 8h", None).is_none());
        assert!(parse_custom_intervals("4 tabs 0h,0h", None).is_none());
        assert!(parse_custom_intervals("25", None).is_none());
    }

    #[test]
    fn test_split_dose() {
        for (input, qty, days) in [
            ("1-0-1 x 30 days", 60, 30),
            ("2-1-1 x 7 days", 28, 7),
            ("1-1-1 x 5 days", 15, 5),
            ("2-0-2 x 14 days", 56, 14),
            ("1-0-1 for 30", 60, 30),
            ("0.5-0-0.5 * 7/7", 7, 7),
        ] {
            let result = parse_split_dose(input, None).unwrap();
            assert!(result.is_valid, "{}", input);
            assert_eq!(result.quantity_to_dispense, Some(qty), "{}", input);
            assert_eq!(result.duration_days, Some(days), "{}", input);
        }
    }

    #[test]
    fn test_split_dose_description() {
        let result = parse_split_dose("1-0-1 x 7 days", None).unwrap();

        assert_eq!(result.frequency.as_deref(), Some("1 morning, 1 evening (2/day)"));
        assert_eq!(result.display_text.as_deref(), Some("1-0-1 x 7 days"));
        assert_eq!(
            result.schedule_pattern,
            Some(SchedulePattern::SplitDose {
                pattern: SplitPattern {
                    morning: 1.0,
                    noon: 0.0,
                    evening: 1.0
                },
                daily_total: 2.0
            })
        );
    }

    #[test]
    fn test_split_dose_bad_duration_is_partial() {
        let result = parse_split_dose("1-0-1 x forever", None).unwrap();

        assert!(!result.is_valid);
        assert_eq!(result.dose_quantity.as_deref(), Some("1-0-1"));
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("'forever'"));
    }

    #[test]
    fn test_standard() {
        for (input, dose, code, days, qty) in [
            ("2 BD x 5 days", "2", "BD", 5, 20),
            ("1 TDS x 7/7", "1", "TDS", 7, 21),
            ("1 OD x 30 days", "1", "OD", 30, 30),
            ("5ml TDS x 5 days", "5 ml", "TDS", 5, 75),
            ("2 tabs QDS x 7 days", "2 tabs", "QDS", 7, 56),
            ("1 bid for 2 weeks", "1", "BD", 14, 28),
            ("0.5 Q12H * 3", "0.5", "Q12H", 3, 3),
        ] {
            let result = parse_standard(input, None).unwrap();
            assert!(result.is_valid, "{}", input);
            assert_eq!(result.dose_quantity.as_deref(), Some(dose), "{}", input);
            assert_eq!(result.frequency_code.as_deref(), Some(code), "{}", input);
            assert_eq!(result.duration_days, Some(days), "{}", input);
            assert_eq!(result.quantity_to_dispense, Some(qty), "{}", input);
        }
    }

    #[test]
    fn test_standard_bad_duration_is_partial() {
        let result = parse_standard("2 BD x soon", None).unwrap();

        assert!(!result.is_valid);
        assert_eq!(result.dose_quantity.as_deref(), Some("2"));
        assert_eq!(result.frequency_code.as_deref(), Some("BD"));
        assert_eq!(
            result.errors,
            vec!["Could not parse duration: 'soon'. Try 'x 5 days', '5d', or just '5'".to_string()]
        );
        assert_eq!(result.quantity_to_dispense, None);
    }

    #[test]
    fn test_standard_requires_known_code() {
        assert!(parse_standard("2 XYZ x 5 days", None).is_none());
        assert!(parse_standard("2 BD", None).is_none());
    }
}
