//! Order sources: arguments, files and stdin.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use smart_rx_core::export::order_lines_from_str;
use smart_rx_core::OrderLine;

/// Orders given directly on the command line, numbered from 1.
pub fn order_lines_from_args(inputs: &[String]) -> Vec<OrderLine> {
    inputs
        .iter()
        .enumerate()
        .map(|(i, input)| OrderLine::new(i + 1, input.trim()))
        .collect()
}

/// Read an order list from a file.
pub fn read_order_file(path: &Path) -> Result<Vec<OrderLine>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read order file {}", path.display()))?;
    Ok(order_lines_from_str(&text))
}

/// Read an order list from any reader (stdin in practice).
pub fn read_order_stream<R: Read>(mut reader: R) -> Result<Vec<OrderLine>> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .context("Failed to read orders from stdin")?;
    Ok(order_lines_from_str(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_args_are_numbered() {
        let lines = order_lines_from_args(&["2 BD x 5 days".into(), " STAT ".into()]);

        assert_eq!(lines[0], OrderLine::new(1, "2 BD x 5 days"));
        assert_eq!(lines[1], OrderLine::new(2, "STAT"));
    }

    #[test]
    fn test_read_order_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# morning round").unwrap();
        writeln!(file, "2 BD x 5 days").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "1-0-1 x 30 days").unwrap();

        let lines = read_order_file(file.path()).unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line_no, 2);
        assert_eq!(lines[1], OrderLine::new(4, "1-0-1 x 30 days"));
    }

    #[test]
    fn test_missing_file_has_context() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("orders.txt");

        let err = read_order_file(&missing).unwrap_err();
        assert!(err.to_string().contains("Failed to read order file"));
    }

    #[test]
    fn test_read_order_stream() {
        let lines = read_order_stream("STAT\n\n2 PRN\n".as_bytes()).unwrap();

        assert_eq!(lines, vec![OrderLine::new(1, "STAT"), OrderLine::new(3, "2 PRN")]);
    }
}
