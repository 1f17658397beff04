//! Parse a list of order lines and export the results.

use serde::Serialize;

use crate::models::{Drug, ParsedResult};
use crate::parser::PrescriptionParser;

use super::ExportResult;

/// One order as it appeared in the source list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    /// 1-based line number in the source
    pub line_no: usize,
    /// Raw order text
    pub input: String,
}

impl OrderLine {
    pub fn new(line_no: usize, input: impl Into<String>) -> Self {
        Self {
            line_no,
            input: input.into(),
        }
    }
}

/// Split order-list text into lines, skipping blanks and `#` comments.
///
/// Line numbers refer to the original text, so skipped lines leave gaps.
pub fn order_lines_from_str(text: &str) -> Vec<OrderLine> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line_no, line)| OrderLine::new(line_no, line))
        .collect()
}

/// Parse result for a single line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedLine {
    pub line_no: usize,
    pub input: String,
    pub result: ParsedResult,
}

/// Counts across a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    /// Sum of dispensing quantities over valid lines
    pub total_quantity: u64,
}

/// Results for a list of orders.
#[derive(Debug, Clone, Serialize)]
pub struct ParseBatch {
    pub summary: BatchSummary,
    pub lines: Vec<ParsedLine>,
}

impl ParseBatch {
    pub fn all_valid(&self) -> bool {
        self.summary.invalid == 0
    }

    /// Export to JSON.
    pub fn to_json(&self) -> ExportResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        // Header
        csv.push_str("line,input,valid,dose,frequency_code,duration_days,quantity,schedule_type,errors\n");

        for line in &self.lines {
            let result = &line.result;
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{}\n",
                line.line_no,
                escape_csv(&line.input),
                result.is_valid,
                escape_csv(result.dose_quantity.as_deref().unwrap_or("")),
                escape_csv(result.frequency_code.as_deref().unwrap_or("")),
                result.duration_days.map(|d| d.to_string()).unwrap_or_default(),
                result
                    .quantity_to_dispense
                    .map(|q| q.to_string())
                    .unwrap_or_default(),
                result.schedule_type.as_str(),
                escape_csv(&result.errors.join("; ")),
            ));
        }

        csv
    }
}

/// Parses order lists against an optional drug.
pub struct BatchParser<'a> {
    parser: PrescriptionParser,
    drug: Option<&'a Drug>,
}

impl<'a> BatchParser<'a> {
    pub fn new(drug: Option<&'a Drug>) -> Self {
        Self {
            parser: PrescriptionParser::new(),
            drug,
        }
    }

    /// Parse every line, in order.
    pub fn parse_all(&self, lines: &[OrderLine]) -> ParseBatch {
        let mut summary = BatchSummary::default();

        let lines: Vec<ParsedLine> = lines
            .iter()
            .map(|line| {
                let result = self.parser.parse(&line.input, self.drug);
                summary.total += 1;
                if result.is_valid {
                    summary.valid += 1;
                    summary.total_quantity += u64::from(result.quantity_to_dispense.unwrap_or(0));
                } else {
                    summary.invalid += 1;
                }
                ParsedLine {
                    line_no: line.line_no,
                    input: line.input.clone(),
                    result,
                }
            })
            .collect();

        tracing::debug!(
            total = summary.total,
            invalid = summary.invalid,
            "batch parsed"
        );

        ParseBatch { summary, lines }
    }
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
