//! Clinical frequency abbreviations.

/// A frequency resolved from the abbreviation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frequency {
    /// Canonical code (BID/TID/QID collapse to BD/TDS/QDS)
    pub code: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Administrations per day
    pub times_per_day: u32,
}

const fn entry(
    abbreviation: &'static str,
    code: &'static str,
    description: &'static str,
    times_per_day: u32,
) -> (&'static str, Frequency) {
    (
        abbreviation,
        Frequency {
            code,
            description,
            times_per_day,
        },
    )
}

/// Abbreviation table, in the order partial feedback scans it.
pub const FREQUENCY_TABLE: [(&str, Frequency); 10] = [
    entry("OD", "OD", "Once daily (OD)", 1),
    entry("BD", "BD", "Twice daily (BD)", 2),
    entry("BID", "BD", "Twice daily (BD)", 2),
    entry("TDS", "TDS", "Three times daily (TDS)", 3),
    entry("TID", "TDS", "Three times daily (TDS)", 3),
    entry("QDS", "QDS", "Four times daily (QDS)", 4),
    entry("QID", "QDS", "Four times daily (QDS)", 4),
    entry("Q6H", "Q6H", "Every 6 hours (Q6H)", 4),
    entry("Q8H", "Q8H", "Every 8 hours (Q8H)", 3),
    entry("Q12H", "Q12H", "Every 12 hours (Q12H)", 2),
];

/// Look up a frequency abbreviation.
///
/// Case-insensitive, and the whole token must match: "BDX" is not "BD".
pub fn parse_frequency(token: &str) -> Option<Frequency> {
    let token = token.trim();
    FREQUENCY_TABLE
        .iter()
        .find(|(abbreviation, _)| abbreviation.eq_ignore_ascii_case(token))
        .map(|(_, frequency)| *frequency)
}

/// Regex alternation over every abbreviation, in table order.
pub(crate) fn frequency_alternation() -> String {
    FREQUENCY_TABLE
        .iter()
        .map(|(abbreviation, _)| *abbreviation)
        .collect::<Vec<_>>()
        .join("|")
}
