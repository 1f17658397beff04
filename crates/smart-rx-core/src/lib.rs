//! Smart Rx Core Library
//!
//! Parses free-text prescription shorthand ("2 BD x 5 days", "1-0-1 x 30 days")
//! into structured dosing with a dispensing quantity.
//!
//! # Architecture
//!
//! ```text
//! Order text → Trim → Recognizers (ordered, first match wins)
//!                          │                    │
//!                       matched             no match
//!                          │                    │
//!             Drug-aware quantity      Partial feedback
//!              (valid results)     (errors + "did you mean")
//!                          │                    │
//!                          └─────────┬──────────┘
//!                                    ▼
//!                              ParsedResult
//!                                    │
//!                   ┌────────────────┼────────────────┐
//!                   ▼                ▼                ▼
//!               Display          Schedule        Batch export
//!                string          pattern        (JSON / CSV)
//! ```
//!
//! # Core Principle
//!
//! **Parsing never fails.** Unrecognized orders come back invalid with
//! errors that tell the prescriber what to fix.
//!
//! # Modules
//!
//! - [`models`]: Domain types (ParsedResult, SchedulePattern, Drug, etc.)
//! - [`parser`]: Recognizers, duration/frequency tables, quantity rules
//! - [`export`]: Batch parsing with JSON and CSV export

pub mod export;
pub mod models;
pub mod parser;

// Re-export commonly used types
pub use export::{BatchParser, ExportError, OrderLine, ParseBatch};
pub use models::{
    Drug, DrugForm, ParsedResult, SchedulePattern, ScheduleType, SplitPattern, UnknownDrugForm,
};
pub use parser::PrescriptionParser;

/// Parse an order, optionally against a drug.
pub fn parse_prescription(input: &str, drug: Option<&Drug>) -> ParsedResult {
    PrescriptionParser::new().parse(input, drug)
}

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum SmartRxError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<UnknownDrugForm> for SmartRxError {
    fn from(e: UnknownDrugForm) -> Self {
        SmartRxError::InvalidInput(e.to_string())
    }
}

impl From<serde_json::Error> for SmartRxError {
    fn from(e: serde_json::Error) -> Self {
        SmartRxError::SerializationError(e.to_string())
    }
}

impl From<ExportError> for SmartRxError {
    fn from(e: ExportError) -> Self {
        SmartRxError::SerializationError(e.to_string())
    }
}

// =========================================================================
// Functions (exported to FFI)
// =========================================================================

/// Parse an order for a mobile client.
#[uniffi::export]
pub fn parse_prescription_ffi(
    input: String,
    drug: Option<FfiDrug>,
) -> Result<FfiParsedResult, SmartRxError> {
    let drug = drug.map(Drug::try_from).transpose()?;
    let result = parse_prescription(&input, drug.as_ref());
    FfiParsedResult::try_from(result)
}

/// Parse an order and render its display string (empty when invalid).
#[uniffi::export]
pub fn format_prescription_ffi(input: String) -> String {
    parser::format(&parse_prescription(&input, None))
}

/// Parse an order and return the result as JSON.
#[uniffi::export]
pub fn parse_prescription_json(
    input: String,
    drug: Option<FfiDrug>,
) -> Result<String, SmartRxError> {
    let drug = drug.map(Drug::try_from).transpose()?;
    Ok(parse_prescription(&input, drug.as_ref()).to_json()?)
}

/// Parse newline-separated orders and export them as CSV.
#[uniffi::export]
pub fn export_orders_csv(text: String, drug: Option<FfiDrug>) -> Result<String, SmartRxError> {
    let drug = drug.map(Drug::try_from).transpose()?;
    let lines = export::order_lines_from_str(&text);
    Ok(BatchParser::new(drug.as_ref()).parse_all(&lines).to_csv())
}

/// Parse newline-separated orders and export them as JSON.
#[uniffi::export]
pub fn export_orders_json(text: String, drug: Option<FfiDrug>) -> Result<String, SmartRxError> {
    let drug = drug.map(Drug::try_from).transpose()?;
    let lines = export::order_lines_from_str(&text);
    Ok(BatchParser::new(drug.as_ref()).parse_all(&lines).to_json()?)
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe drug metadata.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDrug {
    /// Drug form name, e.g. "tablet", "syrup", "cream"
    pub form: String,
    /// Bottle size in mL for liquids
    pub bottle_size: Option<u32>,
}

impl TryFrom<FfiDrug> for Drug {
    type Error = SmartRxError;

    fn try_from(drug: FfiDrug) -> Result<Self, Self::Error> {
        if drug.bottle_size == Some(0) {
            return Err(SmartRxError::InvalidInput(
                "Bottle size must be greater than zero".into(),
            ));
        }
        Ok(Drug {
            form: drug.form.parse()?,
            bottle_size: drug.bottle_size,
        })
    }
}

/// FFI-safe parse result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiParsedResult {
    pub is_valid: bool,
    pub dose_quantity: Option<String>,
    pub frequency: Option<String>,
    pub frequency_code: Option<String>,
    pub duration: Option<String>,
    pub duration_days: Option<u32>,
    pub quantity_to_dispense: Option<u32>,
    pub schedule_type: String,
    /// Schedule pattern serialized as JSON
    pub schedule_pattern: Option<String>,
    pub display_text: Option<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl TryFrom<ParsedResult> for FfiParsedResult {
    type Error = SmartRxError;

    fn try_from(result: ParsedResult) -> Result<Self, Self::Error> {
        let schedule_pattern = result
            .schedule_pattern
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        Ok(Self {
            is_valid: result.is_valid,
            dose_quantity: result.dose_quantity,
            frequency: result.frequency,
            frequency_code: result.frequency_code,
            duration: result.duration,
            duration_days: result.duration_days,
            quantity_to_dispense: result.quantity_to_dispense,
            schedule_type: result.schedule_type.as_str().to_string(),
            schedule_pattern,
            display_text: result.display_text,
            errors: result.errors,
            warnings: result.warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ffi_drug(form: &str, bottle_size: Option<u32>) -> FfiDrug {
        FfiDrug {
            form: form.to_string(),
            bottle_size,
        }
    }

    #[test]
    fn test_ffi_parse() {
        let result = parse_prescription_ffi("2 BD x 5 days".into(), None).unwrap();

        assert!(result.is_valid);
        assert_eq!(result.quantity_to_dispense, Some(20));
        assert_eq!(result.schedule_type, "standard");

        let pattern: serde_json::Value =
            serde_json::from_str(result.schedule_pattern.as_deref().unwrap()).unwrap();
        assert_eq!(pattern["type"], "standard");
    }

    #[test]
    fn test_ffi_parse_with_drug() {
        let result =
            parse_prescription_ffi("5ml TDS x 7 days".into(), Some(ffi_drug("Syrup", Some(100))))
                .unwrap();
        assert_eq!(result.quantity_to_dispense, Some(2));
    }

    #[test]
    fn test_ffi_rejects_bad_drug() {
        let unknown = parse_prescription_ffi("2 BD x 5 days".into(), Some(ffi_drug("potion", None)));
        assert!(matches!(unknown, Err(SmartRxError::InvalidInput(_))));

        let empty_bottle =
            parse_prescription_ffi("2 BD x 5 days".into(), Some(ffi_drug("syrup", Some(0))));
        assert!(matches!(empty_bottle, Err(SmartRxError::InvalidInput(_))));
    }

    #[test]
    fn test_ffi_format() {
        assert_eq!(format_prescription_ffi("2 bid x 7/7".into()), "2 BD x 7 days");
        assert_eq!(format_prescription_ffi("nonsense".into()), "");
    }

    #[test]
    fn test_ffi_json() {
        let json = parse_prescription_json("STAT".into(), None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["scheduleType"], "stat");
        assert_eq!(value["quantityToDispense"], 1);
    }

    #[test]
    fn test_ffi_batch_export() {
        let csv = export_orders_csv("2 BD x 5 days\n\n# note\n2 BD\n".into(), None).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("1,"));
        assert!(lines[2].starts_with("4,"));

        let json = export_orders_json("STAT".into(), None).unwrap();
        assert!(json.contains("\"totalQuantity\": 1"));
    }
}
