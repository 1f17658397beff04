//! Prescription shorthand parser.
//!
//! Pipeline: Trim → Recognizers (first match wins) → Partial feedback
//!                              │
//!                     Drug-aware quantity (valid results only)

mod duration;
mod feedback;
mod format;
mod frequency;
mod quantity;
mod recognizers;

pub use duration::*;
pub use feedback::*;
pub use format::*;
pub use frequency::*;
pub use quantity::*;
pub use recognizers::{
    parse_custom_intervals, parse_injectable_schedule, parse_patch, parse_prn, parse_split_dose,
    parse_standard, parse_stat, parse_taper,
};

use crate::models::{Drug, ParsedResult, SchedulePattern};

use recognizers::RECOGNIZERS;

pub const EMPTY_INPUT: &str = "Please enter a prescription";

/// Stateless parser for prescription orders.
///
/// Holds no data; compiled patterns are process-wide statics, so a single
/// instance can be shared across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrescriptionParser;

impl PrescriptionParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse an order such as "2 BD x 5 days".
    ///
    /// Never fails: unrecognized input comes back as an invalid result whose
    /// `errors` say what was missing. When `drug` is given, valid results get
    /// the drug-specific dispensing quantity.
    pub fn parse(&self, input: &str, drug: Option<&Drug>) -> ParsedResult {
        let input = input.trim();
        if input.is_empty() {
            return ParsedResult::invalid(vec![EMPTY_INPUT.into()]);
        }

        for (name, recognize) in RECOGNIZERS {
            if let Some(result) = recognize(input, drug) {
                tracing::debug!(recognizer = name, valid = result.is_valid, "order recognized");
                return match drug {
                    Some(drug) if result.is_valid => apply_drug_quantity(&result, drug),
                    _ => result,
                };
            }
        }

        tracing::trace!(input, "no grammar matched, building feedback");
        synthesize_feedback(input)
    }

    /// Look up a frequency abbreviation.
    pub fn parse_frequency(&self, token: &str) -> Option<Frequency> {
        parse_frequency(token)
    }

    /// Parse a duration clause.
    pub fn parse_duration(&self, input: &str) -> Option<Duration> {
        parse_duration(input)
    }

    /// Canonical display string; empty for invalid results.
    pub fn format(&self, result: &ParsedResult) -> String {
        format(result)
    }

    pub fn to_schedule_pattern<'r>(&self, result: &'r ParsedResult) -> Option<&'r SchedulePattern> {
        to_schedule_pattern(result)
    }

    pub fn calculate_quantity(&self, result: &ParsedResult, drug: &Drug) -> u32 {
        calculate_quantity(result, drug)
    }

    pub fn apply_drug_quantity(&self, result: &ParsedResult, drug: &Drug) -> ParsedResult {
        apply_drug_quantity(result, drug)
    }
}
