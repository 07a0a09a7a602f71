//! Rule-based worker health-risk triage.
//!
//! Additive points for self-reported symptoms and chronic conditions,
//! infectious-disease keywords and flagged medications found in OCR text,
//! a vaccination discount, then clamp to 0..=100 and bucket.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

// ═══════════════════════════════════════════
// Scoring tables
// ═══════════════════════════════════════════

pub const SYMPTOM_POINTS: &[(&str, i32)] = &[
    ("fever", 20),
    ("cough", 10),
    ("fatigue", 5),
    ("rash", 15),
    ("breathlessness", 25),
    ("sore_throat", 10),
    ("body_ache", 8),
    ("headache", 8),
];

/// Exact-key chronic condition points.
pub const CHRONIC_POINTS: &[(&str, i32)] = &[
    ("diabetes_uncontrolled", 15),
    ("hypertension", 10),
    ("asthma", 10),
    ("copd", 15),
    ("ckd", 20),
];

/// Points for any condition mentioning diabetes without "controlled".
/// Stacks with the exact-key table.
const UNCONTROLLED_DIABETES_POINTS: i32 = 15;

pub const INFECTIOUS_KEYWORDS: &[&str] = &[
    "flu", "influenza", "covid", "sars-cov-2", "measles", "rubeola", "dengue", "tb",
    "tuberculosis", "malaria", "chikungunya",
];

const INFECTIOUS_POINTS_PER_HIT: i32 = 25;
const INFECTIOUS_POINTS_CAP: i32 = 40;

/// Medications that suggest an active illness when no infection is named.
pub const MEDICATION_FLAGS: &[&str] =
    &["azithromycin", "amoxicillin", "paracetamol", "acetaminophen", "ibuprofen"];

const MEDICATION_FLAG_POINTS: i32 = 10;
const VACCINATION_DISCOUNT: i32 = 10;

pub const MAX_SCORE: u8 = 100;

// ═══════════════════════════════════════════
// Result types
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskBucket {
    Healthy,
    Moderate,
    #[serde(rename = "High-Risk")]
    HighRisk,
}

impl RiskBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::Moderate => "Moderate",
            Self::HighRisk => "High-Risk",
        }
    }
}

impl fmt::Display for RiskBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// 0..=100.
    pub score: u8,
    pub bucket: RiskBucket,
    /// Matched infectious keywords, sorted.
    pub infectious_hits: Vec<String>,
}

/// ≤20 Healthy, 21–50 Moderate, >50 High-Risk.
pub fn classify(score: u8) -> RiskBucket {
    match score {
        0..=20 => RiskBucket::Healthy,
        21..=50 => RiskBucket::Moderate,
        _ => RiskBucket::HighRisk,
    }
}

fn table_points(table: &[(&str, i32)], key: &str) -> i32 {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, p)| *p)
        .unwrap_or(0)
}

/// Score one worker. Total over all inputs: unknown symptoms and conditions
/// are worth zero and an empty text contributes nothing.
pub fn score_worker<S, C>(
    symptoms: &[S],
    chronic_conditions: &[C],
    vaccinated: bool,
    extracted_text: &str,
) -> RiskAssessment
where
    S: AsRef<str>,
    C: AsRef<str>,
{
    let mut score: i32 = 0;

    for symptom in symptoms {
        score += table_points(SYMPTOM_POINTS, &symptom.as_ref().trim().to_lowercase());
    }

    for condition in chronic_conditions {
        let key = condition.as_ref().trim().to_lowercase();
        if key.contains("diabetes") && !key.contains("controlled") {
            score += UNCONTROLLED_DIABETES_POINTS;
        }
        score += table_points(CHRONIC_POINTS, &key);
    }

    let text = extracted_text.to_lowercase();
    let hits: BTreeSet<&str> = INFECTIOUS_KEYWORDS
        .iter()
        .copied()
        .filter(|k| text.contains(k))
        .collect();

    if !hits.is_empty() {
        score += (INFECTIOUS_POINTS_PER_HIT * hits.len() as i32).min(INFECTIOUS_POINTS_CAP);
    } else if MEDICATION_FLAGS.iter().any(|m| text.contains(m)) {
        score += MEDICATION_FLAG_POINTS;
    }

    if vaccinated {
        score -= VACCINATION_DISCOUNT;
    }

    let score = score.clamp(0, MAX_SCORE as i32) as u8;
    let bucket = classify(score);
    debug!(score, bucket = %bucket, hits = hits.len(), "Scored worker");

    RiskAssessment {
        score,
        bucket,
        infectious_hits: hits.into_iter().map(str::to_string).collect(),
    }
}
