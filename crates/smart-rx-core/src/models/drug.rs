//! Drug metadata supplied by the formulary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a drug form string is not part of the formulary vocabulary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown drug form: '{0}'")]
pub struct UnknownDrugForm(pub String);

/// Pharmaceutical form of a drug as recorded in the formulary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DrugForm {
    Tablet,
    Capsule,
    Syrup,
    Suspension,
    Solution,
    Liquid,
    Cream,
    Ointment,
    Gel,
    Lotion,
    Drops,
    Inhaler,
    Injection,
    IvBag,
    CombinationPack,
    Patch,
    Other,
}

/// How a drug form is counted when dispensing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispensingClass {
    /// One container covers the whole course (tube, bottle of drops, inhaler).
    FixedUnit,
    /// Dispensed in bottles of a configured volume.
    Liquid,
    /// Counted as discrete pieces (tablets, capsules, vials).
    Piece,
}

impl DrugForm {
    /// All known forms, in formulary order.
    pub const ALL: [DrugForm; 17] = [
        DrugForm::Tablet,
        DrugForm::Capsule,
        DrugForm::Syrup,
        DrugForm::Suspension,
        DrugForm::Solution,
        DrugForm::Liquid,
        DrugForm::Cream,
        DrugForm::Ointment,
        DrugForm::Gel,
        DrugForm::Lotion,
        DrugForm::Drops,
        DrugForm::Inhaler,
        DrugForm::Injection,
        DrugForm::IvBag,
        DrugForm::CombinationPack,
        DrugForm::Patch,
        DrugForm::Other,
    ];

    /// Formulary identifier (e.g., "combination_pack").
    pub fn as_str(&self) -> &'static str {
        match self {
            DrugForm::Tablet => "tablet",
            DrugForm::Capsule => "capsule",
            DrugForm::Syrup => "syrup",
            DrugForm::Suspension => "suspension",
            DrugForm::Solution => "solution",
            DrugForm::Liquid => "liquid",
            DrugForm::Cream => "cream",
            DrugForm::Ointment => "ointment",
            DrugForm::Gel => "gel",
            DrugForm::Lotion => "lotion",
            DrugForm::Drops => "drops",
            DrugForm::Inhaler => "inhaler",
            DrugForm::Injection => "injection",
            DrugForm::IvBag => "iv_bag",
            DrugForm::CombinationPack => "combination_pack",
            DrugForm::Patch => "patch",
            DrugForm::Other => "other",
        }
    }

    /// Classify the form for quantity calculation.
    ///
    /// Adding a form forces a decision here.
    pub fn dispensing_class(&self) -> DispensingClass {
        match self {
            DrugForm::Cream
            | DrugForm::Ointment
            | DrugForm::Gel
            | DrugForm::Lotion
            | DrugForm::Drops
            | DrugForm::Inhaler
            | DrugForm::CombinationPack => DispensingClass::FixedUnit,
            DrugForm::Syrup | DrugForm::Suspension | DrugForm::Solution | DrugForm::Liquid => {
                DispensingClass::Liquid
            }
            DrugForm::Tablet
            | DrugForm::Capsule
            | DrugForm::Injection
            | DrugForm::IvBag
            | DrugForm::Patch
            | DrugForm::Other => DispensingClass::Piece,
        }
    }

    /// Whether the 0-12-24H injectable schedule may be used with this form.
    pub fn is_injectable(&self) -> bool {
        matches!(self, DrugForm::Injection | DrugForm::IvBag)
    }
}

impl fmt::Display for DrugForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DrugForm {
    type Err = UnknownDrugForm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        DrugForm::ALL
            .iter()
            .copied()
            .find(|form| form.as_str() == lower)
            .ok_or_else(|| UnknownDrugForm(s.to_string()))
    }
}

/// The drug a prescription is written against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Drug {
    /// Pharmaceutical form
    pub form: DrugForm,
    /// Millilitres per bottle, for liquids
    pub bottle_size: Option<u32>,
}

impl Drug {
    /// Create a drug with no bottle size.
    pub fn new(form: DrugForm) -> Self {
        Self {
            form,
            bottle_size: None,
        }
    }

    /// Set the bottle size in mL.
    pub fn with_bottle_size(mut self, bottle_size: u32) -> Self {
        self.bottle_size = Some(bottle_size);
        self
    }
}
