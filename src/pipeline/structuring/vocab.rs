//! Word lists and compiled patterns used by the medication parser.
//!
//! All patterns are case-insensitive. Lists are lowercase.

use std::sync::LazyLock;

use regex::Regex;

use super::types::UNKNOWN_MEDICATION_INFO;

/// Tokens that are never a medication name (exact, lowercase match).
pub const STOPWORDS: &[&str] = &[
    "prescription", "rx", "sig", "follow", "stare", "note", "date", "name", "age", "sex",
    "m", "f", "address", "doctor", "physician", "dose", "dosage", "advice", "morning",
    "evening", "night", "daily", "day", "days",
];

/// Dosage-form words. Matched as substrings of the line and as exact tokens.
pub const FORM_KEYWORDS: &[&str] = &[
    "tab", "tabs", "tablet", "tablets", "cap", "caps", "capsule", "capsules", "syrup",
    "drops", "drop", "ointment", "cream", "gel",
];

/// A line containing any of these whitespace tokens is a header, not a drug row.
pub const HEADER_TOKENS: &[&str] = &[
    "chief", "diagnosis", "advice", "after", "weight", "closed", "medicine", "medicines",
];

/// Substrings that open the medication table (the line itself is skipped).
pub const TABLE_START_MARKERS: &[&str] = &["medicine name", "medicine", "medicines"];

/// Substrings that close the medication table.
pub const TABLE_END_MARKERS: &[&str] = &["advice", "follow up", "follow-up", "followup"];

/// Phrases collected into a record's `instructions`, in this order.
pub const INSTRUCTION_KEYWORDS: &[&str] = &[
    "before meals",
    "after meals",
    "with meals",
    "empty stomach",
    "with water",
    "do not crush",
    "take with food",
    "avoid alcohol",
];

/// Reference descriptions, searched in order by the known-name strategy.
pub const MEDICATION_INFO: &[(&str, &str)] = &[
    ("paracetamol", "Pain relief and fever reducer"),
    ("acetaminophen", "Pain relief and fever reducer"),
    ("ibuprofen", "Anti-inflammatory and pain relief"),
    ("aspirin", "Pain relief and blood thinner"),
    ("amoxicillin", "Antibiotic for bacterial infections"),
    ("azithromycin", "Antibiotic for bacterial infections"),
    ("metformin", "Diabetes medication"),
    ("omeprazole", "Acid reflux and stomach acid reducer"),
    ("cetirizine", "Antihistamine for allergies"),
    ("loratadine", "Antihistamine for allergies"),
    ("cough syrup", "Relief from cough symptoms"),
    ("vitamin d", "Vitamin supplement for bone health"),
    ("calcium", "Mineral supplement for bone health"),
    ("iron", "Supplement for anemia"),
];

/// Safety notes keyed by a substring of the lowercase medication name.
pub const MEDICATION_WARNINGS: &[(&str, &str)] = &[
    ("paracetamol", "Do not exceed 4g per day. Avoid alcohol."),
    ("ibuprofen", "Take with food. May cause stomach irritation."),
    ("aspirin", "May cause bleeding. Consult doctor if on blood thinners."),
    ("antibiotics", "Complete the full course even if feeling better."),
];

const ANTIBIOTIC_WARNING_KEY: &str = "antibiotics";

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token.to_lowercase().as_str())
}

pub fn is_form_keyword(token: &str) -> bool {
    FORM_KEYWORDS.contains(&token.to_lowercase().as_str())
}

/// Description for `name` (case-insensitive exact key), or the "not available" sentinel.
pub fn medication_info(name: &str) -> &'static str {
    let key = name.trim().to_lowercase();
    MEDICATION_INFO
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, info)| *info)
        .unwrap_or(UNKNOWN_MEDICATION_INFO)
}

/// Safety note for `name`, if any.
///
/// Keys match as substrings of the lowercase name. Drugs described as
/// antibiotics in [`MEDICATION_INFO`] get the antibiotic course warning.
pub fn medication_warning(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    let direct = MEDICATION_WARNINGS
        .iter()
        .find(|(key, _)| lower.contains(key))
        .map(|(_, warning)| *warning);

    direct.or_else(|| {
        if medication_info(name).starts_with("Antibiotic") {
            MEDICATION_WARNINGS
                .iter()
                .find(|(key, _)| *key == ANTIBIOTIC_WARNING_KEY)
                .map(|(_, warning)| *warning)
        } else {
            None
        }
    })
}

// ── Patterns ──────────────────────────────────────────────

/// A strength such as `500mg`, `650 mg`, `5 ml`.
pub static STRENGTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d+\s*(?:mg|mcg|g|ml|iu)").unwrap());

/// Token ending in a unit suffix.
pub static UNIT_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:mg|mcg|g|ml|iu)$").unwrap());

/// Separator for anchor tokenisation.
pub static TOKEN_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9+-]+").unwrap());

/// Plausible single-word drug name.
pub static NAME_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9]*$").unwrap());

/// Printed row: optional numbering, optional form marker, name, optional strength.
pub static PRINTED_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:\d+[).]\s*)?(?:TAB\.?|CAP\.?|SYRUP|DROPS|OINT\.?|CREAM|GEL)?\s*([A-Za-z][A-Za-z0-9_-]{3,})(?:\s+(\d+\s*(?:mg|mcg|g|ml|iu)))?",
    )
    .unwrap()
});

/// Two or more spaces between table columns.
pub static COLUMN_GAP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

/// Row numbering such as `1)` or `2.`.
pub static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[).]\s*").unwrap());

/// Dosage-form marker inside a table cell.
pub static FORM_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:tab\.?|caps?\.?|syrup|drops|ointment|cream|gel)\b\.?").unwrap()
});

/// Name followed by a strength anywhere in the text.
pub static NAME_WITH_STRENGTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([A-Za-z][A-Za-z0-9-]{3,})\s+(\d+\s*(?:mg|mcg|g|ml|iu))").unwrap()
});

/// Dosage patterns, tried in order; the first pattern that matches wins.
pub static DOSAGE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\d+\s*mg",
        r"(?i)\d+\s*ml",
        r"(?i)\d+\s*tablets?",
        r"(?i)\d+\s*capsules?",
        r"\d+-\d+-\d+",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

pub static FREQUENCY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)once\s+daily",
        r"(?i)twice\s+daily",
        r"(?i)thrice\s+daily",
        r"(?i)\d+\s+times?\s+(?:a\s+)?day",
        r"(?i)before\s+meals?",
        r"(?i)after\s+meals?",
        r"(?i)with\s+meals?",
        r"(?i)empty\s+stomach",
        r"(?i)at\s+bedtime",
        r"(?i)morning",
        r"(?i)evening",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

pub static DURATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)for\s+\d+\s+days?",
        r"(?i)for\s+\d+\s+weeks?",
        r"(?i)for\s+\d+\s+months?",
        r"(?i)continue\s+for\s+\d+",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});
