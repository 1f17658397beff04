//! Structured result of parsing a prescription.

use serde::{Deserialize, Serialize};

use crate::parser::parse_frequency;

/// Shape of a parsed dosing schedule.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleType {
    #[default]
    Standard,
    SplitDose,
    CustomInterval,
    Taper,
    Interval,
    Stat,
    Prn,
    InjectableInterval,
}

impl ScheduleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleType::Standard => "standard",
            ScheduleType::SplitDose => "split_dose",
            ScheduleType::CustomInterval => "custom_interval",
            ScheduleType::Taper => "taper",
            ScheduleType::Interval => "interval",
            ScheduleType::Stat => "stat",
            ScheduleType::Prn => "prn",
            ScheduleType::InjectableInterval => "injectable_interval",
        }
    }
}

/// Morning/noon/evening split of a daily dose.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SplitPattern {
    pub morning: f64,
    pub noon: f64,
    pub evening: f64,
}

impl SplitPattern {
    pub fn daily_total(&self) -> f64 {
        self.morning + self.noon + self.evening
    }
}

/// Machine-readable schedule consumed by administration charting.
///
/// Serialized with a `type` discriminator matching [`ScheduleType`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchedulePattern {
    Standard {
        frequency_code: String,
        times_per_day: u32,
    },
    SplitDose {
        pattern: SplitPattern,
        daily_total: f64,
    },
    CustomInterval {
        intervals_hours: Vec<u32>,
        dose_per_interval: f64,
        total_doses: u32,
    },
    Taper {
        doses: Vec<f64>,
        duration_days: u32,
    },
    Interval {
        change_interval_days: u32,
        duration_days: u32,
    },
    Prn {
        max_daily: u32,
        duration_days: u32,
    },
    InjectableInterval {
        intervals_hours: Vec<u32>,
        dose_per_interval: f64,
        total_doses: u32,
    },
}

impl SchedulePattern {
    /// The schedule type this pattern belongs to.
    pub fn schedule_type(&self) -> ScheduleType {
        match self {
            SchedulePattern::Standard { .. } => ScheduleType::Standard,
            SchedulePattern::SplitDose { .. } => ScheduleType::SplitDose,
            SchedulePattern::CustomInterval { .. } => ScheduleType::CustomInterval,
            SchedulePattern::Taper { .. } => ScheduleType::Taper,
            SchedulePattern::Interval { .. } => ScheduleType::Interval,
            SchedulePattern::Prn { .. } => ScheduleType::Prn,
            SchedulePattern::InjectableInterval { .. } => ScheduleType::InjectableInterval,
        }
    }
}

/// Everything a recognizer knows about a fully parsed order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dosing {
    pub dose_quantity: String,
    pub frequency: String,
    pub frequency_code: String,
    pub duration: String,
    pub duration_days: Option<u32>,
    pub quantity_to_dispense: u32,
    pub schedule_type: ScheduleType,
    pub schedule_pattern: Option<SchedulePattern>,
    pub display_text: Option<String>,
}

/// Components recovered from an order that could not be fully parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragments {
    pub dose_quantity: Option<String>,
    pub frequency: Option<String>,
    pub frequency_code: Option<String>,
    pub duration: Option<String>,
    pub duration_days: Option<u32>,
}

/// Result of parsing a prescription string.
///
/// Never mutated after construction; adjustments return a new value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedResult {
    pub is_valid: bool,
    pub dose_quantity: Option<String>,
    pub frequency: Option<String>,
    pub frequency_code: Option<String>,
    pub duration: Option<String>,
    pub duration_days: Option<u32>,
    pub quantity_to_dispense: Option<u32>,
    pub schedule_type: ScheduleType,
    pub schedule_pattern: Option<SchedulePattern>,
    pub display_text: Option<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ParsedResult {
    /// A fully recognized order.
    pub fn valid(dosing: Dosing) -> Self {
        Self {
            is_valid: true,
            dose_quantity: Some(dosing.dose_quantity),
            frequency: Some(dosing.frequency),
            frequency_code: Some(dosing.frequency_code),
            duration: Some(dosing.duration),
            duration_days: dosing.duration_days,
            quantity_to_dispense: Some(dosing.quantity_to_dispense),
            schedule_type: dosing.schedule_type,
            schedule_pattern: dosing.schedule_pattern,
            display_text: dosing.display_text,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// An order with nothing usable in it.
    pub fn invalid(errors: Vec<String>) -> Self {
        Self::partial(errors, Vec::new(), Fragments::default())
    }

    /// An order where some components were recognized.
    pub fn partial(errors: Vec<String>, warnings: Vec<String>, fragments: Fragments) -> Self {
        debug_assert!(!errors.is_empty(), "partial results must explain themselves");
        Self {
            is_valid: false,
            dose_quantity: fragments.dose_quantity,
            frequency: fragments.frequency,
            frequency_code: fragments.frequency_code,
            duration: fragments.duration,
            duration_days: fragments.duration_days,
            quantity_to_dispense: None,
            schedule_type: ScheduleType::Standard,
            schedule_pattern: None,
            display_text: None,
            errors,
            warnings,
        }
    }

    /// Single immediate dose.
    pub fn stat(dose_quantity: String, quantity_to_dispense: u32) -> Self {
        Self::valid(Dosing {
            dose_quantity,
            frequency: "Immediately (STAT)".into(),
            frequency_code: "STAT".into(),
            duration: "Single dose".into(),
            duration_days: Some(1),
            quantity_to_dispense,
            schedule_type: ScheduleType::Stat,
            schedule_pattern: None,
            display_text: None,
        })
    }

    /// Open-ended as-needed order.
    pub fn prn(dose_quantity: String, quantity_to_dispense: u32) -> Self {
        Self::valid(Dosing {
            dose_quantity,
            frequency: "As needed (PRN)".into(),
            frequency_code: "PRN".into(),
            duration: "As needed".into(),
            duration_days: None,
            quantity_to_dispense,
            schedule_type: ScheduleType::Prn,
            schedule_pattern: None,
            display_text: None,
        })
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Administrations per day, when the frequency code is a table abbreviation.
    pub fn times_per_day(&self) -> Option<u32> {
        self.frequency_code
            .as_deref()
            .and_then(parse_frequency)
            .map(|f| f.times_per_day)
    }

    /// Copy of this result with a different dispensing quantity.
    pub fn with_quantity(&self, quantity_to_dispense: u32) -> Self {
        Self {
            quantity_to_dispense: Some(quantity_to_dispense),
            ..self.clone()
        }
    }

    /// Serialize to the JSON shape consumed by order entry.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
