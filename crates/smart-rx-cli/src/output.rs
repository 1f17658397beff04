//! Rendering a parsed batch.

use anyhow::Result;
use clap::ValueEnum;
use smart_rx_core::parser::format;
use smart_rx_core::ParseBatch;

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One human-readable line per order
    #[default]
    Text,
    /// Pretty-printed batch with summary
    Json,
    /// One row per order
    Csv,
}

/// Render a batch in the requested format.
pub fn render(batch: &ParseBatch, output: OutputFormat) -> Result<String> {
    Ok(match output {
        OutputFormat::Text => render_text(batch),
        OutputFormat::Json => batch.to_json()?,
        OutputFormat::Csv => batch.to_csv(),
    })
}

fn render_text(batch: &ParseBatch) -> String {
    let mut out = String::new();

    for line in &batch.lines {
        let result = &line.result;
        if result.is_valid {
            out.push_str(&format!(
                "{:>4}  {}  [{}, qty {}]\n",
                line.line_no,
                format(result),
                result.schedule_type.as_str(),
                result.quantity_to_dispense.unwrap_or(0)
            ));
        } else {
            out.push_str(&format!("{:>4}  INVALID: {}\n", line.line_no, line.input));
            for error in &result.errors {
                out.push_str(&format!("        error: {}\n", error));
            }
        }
        for warning in &result.warnings {
            out.push_str(&format!("        warning: {}\n", warning));
        }
    }

    let summary = &batch.summary;
    out.push_str(&format!(
        "{} orders, {} valid, {} invalid, {} units to dispense\n",
        summary.total, summary.valid, summary.invalid, summary.total_quantity
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use smart_rx_core::{BatchParser, OrderLine};

    fn make_batch() -> ParseBatch {
        BatchParser::new(None).parse_all(&[
            OrderLine::new(1, "2 BD x 5 days"),
            OrderLine::new(2, "2 BDD x 5 days"),
        ])
    }

    #[test]
    fn test_text_output() {
        let text = render(&make_batch(), OutputFormat::Text).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "   1  2 BD x 5 days  [standard, qty 20]");
        assert_eq!(lines[1], "   2  INVALID: 2 BDD x 5 days");
        assert!(text.contains("warning: Unrecognized frequency 'BDD'. Did you mean BD?"));
        assert_eq!(
            lines.last().copied(),
            Some("2 orders, 1 valid, 1 invalid, 20 units to dispense")
        );
    }

    #[test]
    fn test_json_and_csv_output() {
        let batch = make_batch();

        let json = render(&batch, OutputFormat::Json).unwrap();
        assert!(json.contains("\"invalid\": 1"));

        let csv = render(&batch, OutputFormat::Csv).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }
}
