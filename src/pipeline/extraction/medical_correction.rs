//! Post-OCR drug name correction.
//!
//! Handwritten prescriptions routinely come back as "Amoxicilin" or
//! "Paracetanol". A word is rewritten only when exactly one dictionary term
//! lies within edit distance 2 and the word has at least 5 letters.
//! Disabled by default in the analyzer.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

/// Drug names commonly seen on outpatient prescriptions. Lowercase, sorted.
const DRUG_TERMS: &[&str] = &[
    "aceclofenac", "acetaminophen", "albendazole", "amlodipine", "amoxicillin",
    "aspirin", "atenolol", "atorvastatin", "azithromycin", "calcium",
    "cefixime", "cefuroxime", "cetirizine", "ciprofloxacin", "clavulanate",
    "clopidogrel", "dexamethasone", "diclofenac", "domperidone", "doxycycline",
    "esomeprazole", "fexofenadine", "fluconazole", "gliclazide", "glimepiride",
    "ibuprofen", "insulin", "levocetirizine", "levofloxacin", "levothyroxine",
    "loratadine", "losartan", "metformin", "methylcobalamin", "metronidazole",
    "montelukast", "nimesulide", "ofloxacin", "omeprazole", "ondansetron",
    "pantoprazole", "paracetamol", "prednisolone", "rabeprazole", "ranitidine",
    "salbutamol", "telmisartan", "tramadol", "vitamin",
];

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z]+").unwrap());

/// Minimum word length considered for correction.
const MIN_WORD_LEN: usize = 5;

/// Maximum accepted Levenshtein distance.
const MAX_DISTANCE: usize = 2;

/// Rewrite near-miss drug names in `text`, keeping everything else verbatim.
pub fn correct_medical_terms(text: &str) -> String {
    let mut fixed = 0usize;
    let corrected = WORD.replace_all(text, |caps: &Captures| {
        let word = &caps[0];
        match closest_term(word) {
            Some(term) => {
                fixed += 1;
                match_case(word, term)
            }
            None => word.to_string(),
        }
    });

    if fixed > 0 {
        debug!(fixed, "Corrected drug names in OCR text");
    }
    corrected.into_owned()
}

/// The single dictionary term within range of `word`, if there is exactly one
/// at the minimum distance. Exact matches return `None` (nothing to fix).
fn closest_term(word: &str) -> Option<&'static str> {
    if word.len() < MIN_WORD_LEN {
        return None;
    }
    let lower = word.to_ascii_lowercase();
    if DRUG_TERMS.binary_search(&lower.as_str()).is_ok() {
        return None;
    }

    let mut best: Option<(usize, &'static str)> = None;
    let mut tied = false;

    for &term in DRUG_TERMS {
        if lower.len().abs_diff(term.len()) > MAX_DISTANCE {
            continue;
        }
        let distance = levenshtein(&lower, term);
        if distance > MAX_DISTANCE {
            continue;
        }
        match best {
            Some((d, _)) if distance > d => {}
            Some((d, _)) if distance == d => tied = true,
            _ => {
                best = Some((distance, term));
                tied = false;
            }
        }
    }

    match best {
        Some((_, term)) if !tied => Some(term),
        _ => None,
    }
}

/// Re-apply the casing shape of `original` (ALL CAPS, Capitalized, lower).
fn match_case(original: &str, term: &str) -> String {
    if original.chars().all(|c| c.is_ascii_uppercase()) {
        return term.to_ascii_uppercase();
    }
    if original.starts_with(|c: char| c.is_ascii_uppercase()) {
        let mut out = term.to_string();
        out[..1].make_ascii_uppercase();
        return out;
    }
    term.to_string()
}

/// Levenshtein distance over bytes (inputs are ASCII letters).
fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, &ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = diagonal + usize::from(ca != cb);
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(row[j + 1] + 1);
        }
    }
    row[b.len()]
}
