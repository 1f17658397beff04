//! Rendering parsed orders back to prescription shorthand.

use crate::models::{ParsedResult, SchedulePattern, ScheduleType};

/// Codes that are implied by the dose text and never printed.
const IMPLIED_CODES: [&str; 3] = ["SPLIT", "CUSTOM", "TAPER"];

/// Canonical display string for a result.
///
/// Empty for invalid results. Recognizer-supplied display text wins;
/// otherwise the string is assembled as `dose [code] [x duration]`.
pub fn format(result: &ParsedResult) -> String {
    if !result.is_valid {
        return String::new();
    }

    if let Some(display) = &result.display_text {
        return display.clone();
    }

    let mut parts = Vec::new();
    if let Some(dose) = &result.dose_quantity {
        parts.push(dose.clone());
    }
    if let Some(code) = result
        .frequency_code
        .as_ref()
        .filter(|code| !IMPLIED_CODES.contains(&code.as_str()))
    {
        parts.push(code.clone());
    }
    if !matches!(result.schedule_type, ScheduleType::Stat | ScheduleType::Prn) {
        if let Some(duration) = &result.duration {
            parts.push(format!("x {}", duration));
        }
    }

    parts.join(" ")
}

/// Schedule pattern of a valid result, for administration charting.
pub fn to_schedule_pattern(result: &ParsedResult) -> Option<&SchedulePattern> {
    if !result.is_valid {
        return None;
    }
    result.schedule_pattern.as_ref()
}
