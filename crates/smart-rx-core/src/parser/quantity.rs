//! Dispensing quantity by drug form.
//!
//! Rules, first match wins:
//! 1. STAT and PRN keep the recognizer's count.
//! 2. Fixed-unit forms (creams, drops, inhalers, packs) dispense one container.
//! 3. Liquids dosed in mL dispense whole bottles.
//! 4. Everything else keeps the recognizer's count.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{DispensingClass, Drug, ParsedResult, ScheduleType};

static RE_NON_NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9.]").unwrap());

/// Relative slack under which a product counts as a whole number.
const WHOLE_EPSILON: f64 = 1e-9;

/// Round a unit count up to whole units.
///
/// Decimal doses are not exact in binary (0.1 x 3 x 10 = 3.0000000000000004),
/// so values within rounding noise of an integer snap to it before rounding up.
pub(crate) fn ceil_count(value: f64) -> u32 {
    let nearest = value.round();
    let count = if (value - nearest).abs() <= WHOLE_EPSILON * nearest.abs().max(1.0) {
        nearest
    } else {
        value.ceil()
    };
    // float-to-int casts saturate
    count.max(0.0) as u32
}

/// Numeric part of a dose token ("5 ml" → 5.0).
fn dose_value(dose_quantity: Option<&str>) -> f64 {
    let digits = RE_NON_NUMERIC.replace_all(dose_quantity.unwrap_or("1"), "");
    digits.parse().unwrap_or(0.0)
}

fn is_millilitre_dose(dose_quantity: Option<&str>) -> bool {
    dose_quantity.is_some_and(|dose| dose.to_lowercase().contains("ml"))
}

/// Quantity to dispense for a valid result against a specific drug.
///
/// Invalid results yield 0. Liquids without a configured bottle size also
/// yield 0, meaning the pharmacist enters the quantity by hand.
pub fn calculate_quantity(result: &ParsedResult, drug: &Drug) -> u32 {
    if !result.is_valid {
        return 0;
    }

    let recognized = result.quantity_to_dispense.unwrap_or(0);

    if matches!(result.schedule_type, ScheduleType::Stat | ScheduleType::Prn) {
        return recognized;
    }

    match drug.form.dispensing_class() {
        DispensingClass::FixedUnit => 1,
        DispensingClass::Liquid if is_millilitre_dose(result.dose_quantity.as_deref()) => {
            let Some(bottle_size) = drug.bottle_size.filter(|size| *size > 0) else {
                return 0;
            };
            let total_ml = dose_value(result.dose_quantity.as_deref())
                * result.times_per_day().unwrap_or(1) as f64
                * result.duration_days.unwrap_or(1) as f64;
            ceil_count(total_ml / bottle_size as f64)
        }
        DispensingClass::Liquid | DispensingClass::Piece => recognized,
    }
}

/// Return a copy of `result` with the drug-specific quantity.
///
/// Invalid results come back unchanged. Applying twice gives the same answer
/// as applying once.
pub fn apply_drug_quantity(result: &ParsedResult, drug: &Drug) -> ParsedResult {
    if !result.is_valid {
        return result.clone();
    }

    let quantity = calculate_quantity(result, drug);
    if result.quantity_to_dispense != Some(quantity) {
        tracing::debug!(
            form = %drug.form,
            from = ?result.quantity_to_dispense,
            to = quantity,
            "adjusted dispensing quantity"
        );
    }
    result.with_quantity(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DrugForm;
    use crate::parser::PrescriptionParser;

    fn parse(input: &str) -> ParsedResult {
        PrescriptionParser::new().parse(input, None)
    }

    #[test]
    fn test_ceil_count_ignores_rounding_noise() {
        assert_eq!(ceil_count(0.1 * 3.0 * 10.0), 3);
        assert_eq!(ceil_count(0.7 * 4.0 * 5.0), 14);
        assert_eq!(ceil_count(1.1 * 2.0 * 10.0), 22);
        assert_eq!(ceil_count(2.01), 3);
        assert_eq!(ceil_count(0.5), 1);
        assert_eq!(ceil_count(0.0), 0);
        assert_eq!(ceil_count(-1.0), 0);
        assert_eq!(ceil_count(1e12), u32::MAX);
    }

    #[test]
    fn test_decimal_doses_are_not_over_dispensed() {
        for (input, qty) in [
            ("0.1 TDS x 10 days", 3),
            ("0.7 QDS x 5 days", 14),
            ("1.1 BD x 10 days", 22),
            ("0.1-0.1-0.1 x 10 days", 3),
            ("0.1 tabs 0h,8h,16h", 1),
        ] {
            assert_eq!(parse(input).quantity_to_dispense, Some(qty), "{}", input);
        }

        // 0.1ml x 3 x 1000 days = 300ml = 3 bottles of 100ml
        let syrup = Drug::new(DrugForm::Syrup).with_bottle_size(100);
        assert_eq!(calculate_quantity(&parse("0.1ml TDS x 1000 days"), &syrup), 3);
    }

    #[test]
    fn test_tablets_keep_recognized_quantity() {
        let result = parse("2 BD x 5 days");
        let tablet = Drug::new(DrugForm::Tablet);

        assert_eq!(calculate_quantity(&result, &tablet), 20);
    }

    #[test]
    fn test_fixed_unit_forms_dispense_one() {
        let result = parse("1 OD x 30 days");
        for form in [
            DrugForm::Cream,
            DrugForm::Ointment,
            DrugForm::Gel,
            DrugForm::Drops,
            DrugForm::Inhaler,
            DrugForm::CombinationPack,
        ] {
            assert_eq!(calculate_quantity(&result, &Drug::new(form)), 1, "{}", form);
        }
    }

    #[test]
    fn test_liquid_bottles() {
        // 5ml TDS x 7 days = 105ml = 2 bottles of 100ml
        let result = parse("5ml TDS x 7 days");
        let syrup = Drug::new(DrugForm::Syrup).with_bottle_size(100);

        assert_eq!(calculate_quantity(&result, &syrup), 2);
    }

    #[test]
    fn test_liquid_without_bottle_size_needs_manual_entry() {
        let result = parse("5ml TDS x 7 days");
        let syrup = Drug::new(DrugForm::Suspension);

        assert_eq!(calculate_quantity(&result, &syrup), 0);
    }

    #[test]
    fn test_liquid_without_ml_dose_keeps_quantity() {
        let result = parse("2 BD x 5 days");
        let syrup = Drug::new(DrugForm::Syrup).with_bottle_size(100);

        assert_eq!(calculate_quantity(&result, &syrup), 20);
    }

    #[test]
    fn test_liquid_without_table_frequency() {
        // CUSTOM has no per-day count: 5ml x 1 x 2 days
        let result = parse("5 ml at 0,8,24");
        let syrup = Drug::new(DrugForm::Syrup).with_bottle_size(100);

        assert_eq!(result.duration_days, Some(2));
        assert_eq!(calculate_quantity(&result, &syrup), 1);

        let hourly = parse("10ml Q8H x 5 days");
        assert_eq!(calculate_quantity(&hourly, &syrup), 2);
    }

    #[test]
    fn test_stat_and_prn_ignore_form() {
        let cream = Drug::new(DrugForm::Cream);

        assert_eq!(calculate_quantity(&parse("3 STAT"), &cream), 3);
        assert_eq!(calculate_quantity(&parse("2 PRN max 6/24h x 5 days"), &cream), 30);
    }

    #[test]
    fn test_invalid_results_are_untouched() {
        let result = parse("2 BD");
        let cream = Drug::new(DrugForm::Cream);

        assert_eq!(calculate_quantity(&result, &cream), 0);
        assert_eq!(apply_drug_quantity(&result, &cream), result);
    }

    #[test]
    fn test_apply_is_idempotent_and_pure() {
        let result = parse("5ml TDS x 7 days");
        let syrup = Drug::new(DrugForm::Syrup).with_bottle_size(100);

        let once = apply_drug_quantity(&result, &syrup);
        let twice = apply_drug_quantity(&once, &syrup);

        assert_eq!(once, twice);
        assert_eq!(once.quantity_to_dispense, Some(2));
        assert_eq!(result.quantity_to_dispense, Some(105));
    }
}
