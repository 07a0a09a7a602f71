use regex::Regex;
use tracing::debug;

use super::strategies::{default_strategies, Candidate, LineContext, NameStrategy};
use super::types::MedicationRecord;
use super::vocab::{
    is_stopword, medication_info, medication_warning, DOSAGE_PATTERNS, DURATION_PATTERNS,
    FREQUENCY_PATTERNS, HEADER_TOKENS, INSTRUCTION_KEYWORDS, NAME_WITH_STRENGTH,
    TABLE_END_MARKERS, TABLE_START_MARKERS,
};

/// Minimum name length (chars) for a record with no dosage, frequency or duration.
const MIN_BARE_NAME_LEN: usize = 5;

/// Parse OCR text into medication records.
///
/// Never fails: unparseable text yields an empty list. Output is
/// deterministic for a given input.
pub fn parse_medications(text: &str) -> Vec<MedicationRecord> {
    MedicationParser::new().parse(text)
}

/// Line-oriented medication parser with a pluggable name-strategy chain.
pub struct MedicationParser {
    strategies: Vec<Box<dyn NameStrategy>>,
}

impl Default for MedicationParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MedicationParser {
    pub fn new() -> Self {
        Self::with_strategies(default_strategies())
    }

    pub fn with_strategies(strategies: Vec<Box<dyn NameStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn parse(&self, text: &str) -> Vec<MedicationRecord> {
        let mut records = Vec::new();
        let mut ctx = LineContext::default();

        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            // Header rows are dropped before they can toggle the table.
            let lower = line.to_lowercase();
            if lower.split_whitespace().any(|t| HEADER_TOKENS.contains(&t)) {
                continue;
            }
            if TABLE_START_MARKERS.iter().any(|m| lower.contains(m)) {
                ctx.in_table = true;
                continue;
            }
            if TABLE_END_MARKERS.iter().any(|m| lower.contains(m)) {
                ctx.in_table = false;
            }

            if let Some(candidate) = self.first_candidate(line, &ctx) {
                records.push(build_record(line, candidate));
            }
        }

        sweep_name_strength_pairs(text, &mut records);

        let before = records.len();
        let records = retain_plausible(records);
        debug!(kept = records.len(), dropped = before - records.len(), "Parsed medications");
        records
    }

    fn first_candidate(&self, line: &str, ctx: &LineContext) -> Option<Candidate> {
        self.strategies.iter().find_map(|s| {
            let candidate = s.propose(line, ctx)?;
            debug!(strategy = s.label(), "Medication name candidate");
            Some(candidate)
        })
    }
}

fn build_record(line: &str, candidate: Candidate) -> MedicationRecord {
    let mut record = MedicationRecord::named(candidate.name);
    record.dosage = extract_dosage(line).or(candidate.guessed_dosage);
    record.frequency = extract_frequency(line);
    record.duration = extract_duration(line);
    record.instructions = extract_instructions(line);
    record.info = medication_info(&record.name).to_string();
    record.warning = medication_warning(&record.name).map(str::to_string);
    record
}

/// Pick up `Name 500 mg` pairs the line pass missed (e.g. several per line).
/// Only adds names not already present (case-insensitive), dosage only.
fn sweep_name_strength_pairs(text: &str, records: &mut Vec<MedicationRecord>) {
    let joined = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" \n");

    for caps in NAME_WITH_STRENGTH.captures_iter(&joined) {
        let name = title_case(&caps[1]);
        if is_stopword(&name) {
            continue;
        }
        let lower = name.to_lowercase();
        if records.iter().any(|r| r.name.to_lowercase() == lower) {
            continue;
        }

        let mut record = MedicationRecord::named(name);
        record.dosage = Some(caps[2].to_string());
        record.info = medication_info(&record.name).to_string();
        record.warning = medication_warning(&record.name).map(str::to_string);
        records.push(record);
    }
}

/// Drop records that fail the plausibility rule: the name must be non-empty
/// and not a stopword, and the record must carry a detail or a name of at
/// least five characters.
pub fn retain_plausible(records: Vec<MedicationRecord>) -> Vec<MedicationRecord> {
    records
        .into_iter()
        .filter(|r| {
            let name = r.name.trim();
            !name.is_empty()
                && !is_stopword(name)
                && (r.has_detail() || r.name.chars().count() >= MIN_BARE_NAME_LEN)
        })
        .collect()
}

fn first_match(patterns: &[Regex], text: &str) -> Option<String> {
    patterns
        .iter()
        .find_map(|p| p.find(text))
        .map(|m| m.as_str().to_string())
}

/// First dosage match, by pattern priority (mg, ml, tablets, capsules, 1-0-1).
pub fn extract_dosage(text: &str) -> Option<String> {
    first_match(&DOSAGE_PATTERNS, text)
}

pub fn extract_frequency(text: &str) -> Option<String> {
    first_match(&FREQUENCY_PATTERNS, text)
}

pub fn extract_duration(text: &str) -> Option<String> {
    first_match(&DURATION_PATTERNS, text)
}

/// All instruction phrases present, comma-joined in keyword order.
pub fn extract_instructions(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    let found: Vec<&str> = INSTRUCTION_KEYWORDS
        .iter()
        .copied()
        .filter(|k| lower.contains(k))
        .collect();
    (!found.is_empty()).then(|| found.join(", "))
}

/// Title case: each run of letters starts uppercase, the rest lowercase.
/// `"vitamin-d3"` becomes `"Vitamin-D3"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(c);
            prev_letter = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::structuring::types::UNKNOWN_MEDICATION_INFO;

    fn names(records: &[MedicationRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(parse_medications("").is_empty());
        assert!(parse_medications("   \n\n  ").is_empty());
    }

    #[test]
    fn unit_anchored_line_with_all_fields() {
        let meds = parse_medications("2) Paracetamol 650 mg 1-0-1 for 3 days");
        assert_eq!(meds.len(), 1);
        let m = &meds[0];
        assert_eq!(m.name, "Paracetamol");
        assert_eq!(m.dosage.as_deref(), Some("650 mg"));
        assert_eq!(m.duration.as_deref(), Some("for 3 days"));
        assert_eq!(m.frequency, None);
        assert_eq!(m.info, "Pain relief and fever reducer");
        assert_eq!(
            m.warning.as_deref(),
            Some("Do not exceed 4g per day. Avoid alcohol.")
        );
    }

    #[test]
    fn form_marker_line_falls_back_to_known_name() {
        let meds = parse_medications("1) TAB. Amoxicillin 500mg twice daily for 5 days");
        assert_eq!(names(&meds), vec!["Amoxicillin"]);
        let m = &meds[0];
        assert_eq!(m.dosage.as_deref(), Some("500mg"));
        assert_eq!(m.frequency.as_deref(), Some("twice daily"));
        assert_eq!(m.duration.as_deref(), Some("for 5 days"));
        assert_eq!(m.info, "Antibiotic for bacterial infections");
    }

    #[test]
    fn header_lines_are_skipped() {
        assert!(parse_medications("Diagnosis viral fever").is_empty());
        assert!(parse_medications("Chief complaints: cough and cold").is_empty());
    }

    #[test]
    fn header_token_must_match_exactly() {
        // "diagnosis:" is not a header token; the printed-row strategy names it.
        let meds = parse_medications("Diagnosis: Viral fever");
        assert_eq!(names(&meds), vec!["Diagnosis"]);
        assert!(!meds[0].has_detail());
    }

    #[test]
    fn header_row_does_not_open_table() {
        let row = "• Dolo 650      1-0-1      5 days";
        assert!(parse_medications(row).is_empty());
        assert!(parse_medications(&format!("Medicine Name      Dosage\n{row}")).is_empty());
    }

    #[test]
    fn column_split_only_inside_table() {
        let text = "\
• Dolo 650      1-0-1      5 days
MEDICINES:
• Dolo 650      1-0-1      5 days
• Follow up in 2 weeks
• Dolo 650      1-0-1      5 days";
        let meds = parse_medications(text);
        assert_eq!(names(&meds), vec!["• Dolo 650"]);
        assert_eq!(meds[0].dosage.as_deref(), Some("1-0-1"));
    }

    #[test]
    fn sweep_recovers_strength_from_skipped_line() {
        // "after" makes this a header line; only the name + strength sweep sees it.
        let meds = parse_medications("Metformin 500mg after food");
        assert_eq!(names(&meds), vec!["Metformin"]);
        assert_eq!(meds[0].dosage.as_deref(), Some("500mg"));
        assert_eq!(meds[0].frequency, None);
        assert_eq!(meds[0].info, "Diabetes medication");
    }

    #[test]
    fn stopword_names_are_filtered() {
        // "Date" comes out of the printed-row strategy and is removed as a stopword.
        assert!(parse_medications("Date: 12/03/2024").is_empty());
    }

    #[test]
    fn instructions_are_collected_in_order() {
        let meds = parse_medications("Ibuprofen 400mg with water, take with food, before meals");
        assert_eq!(meds.len(), 1);
        assert_eq!(
            meds[0].instructions.as_deref(),
            Some("before meals, with water, take with food")
        );
        assert_eq!(meds[0].frequency.as_deref(), Some("before meals"));
    }

    #[test]
    fn printed_table_rows() {
        let text = "\
Medicine Name        Dosage        Duration
1) TAB. ACBCIXIMAB          1 Morning          8 Days
2) CAP. Omez 20 mg          1 Night            5 Days
Follow up after 1 week";
        let meds = parse_medications(text);
        assert_eq!(names(&meds), vec!["Acbciximab", "Omez"]);
        assert_eq!(meds[0].frequency.as_deref(), Some("Morning"));
        assert_eq!(meds[1].dosage.as_deref(), Some("20 mg"));
    }

    #[test]
    fn global_sweep_adds_second_drug_on_line() {
        let meds = parse_medications("Cetirizine 10mg and Montelukast 10mg at bedtime");
        assert_eq!(names(&meds), vec!["Cetirizine", "Montelukast"]);
        assert_eq!(meds[0].frequency.as_deref(), Some("at bedtime"));
        let sweep = &meds[1];
        assert_eq!(sweep.dosage.as_deref(), Some("10mg"));
        assert_eq!(sweep.frequency, None);
        assert_eq!(sweep.info, UNKNOWN_MEDICATION_INFO);
    }

    #[test]
    fn sweep_does_not_duplicate_case_insensitively() {
        let meds = parse_medications("AMOXICILLIN 250 mg\namoxicillin 250 mg");
        assert_eq!(
            meds.iter().filter(|m| m.name.eq_ignore_ascii_case("amoxicillin")).count(),
            2,
            "line pass keeps both lines; the sweep adds nothing"
        );
    }

    #[test]
    fn short_bare_name_never_survives() {
        let records = vec![
            MedicationRecord::named("Xa"),
            MedicationRecord::named("Iron"),
            MedicationRecord::named("Calcium"),
        ];
        assert_eq!(names(&retain_plausible(records)), vec!["Calcium"]);
    }

    #[test]
    fn short_name_with_detail_survives() {
        let mut rec = MedicationRecord::named("Iron");
        rec.duration = Some("for 30 days".into());
        assert_eq!(retain_plausible(vec![rec]).len(), 1);
    }

    #[test]
    fn stopword_and_empty_names_dropped() {
        let mut dose = MedicationRecord::named("Dosage");
        dose.dosage = Some("5 ml".into());
        let blank = MedicationRecord::named("  ");
        assert!(retain_plausible(vec![dose, blank]).is_empty());
    }

    #[test]
    fn parser_is_deterministic() {
        let text = "Rx\nTab Azithromycin 500 mg once daily for 3 days\nCetirizine 10 mg at night";
        assert_eq!(parse_medications(text), parse_medications(text));
        assert_eq!(names(&parse_medications(text)), vec!["Azithromycin", "Cetirizine"]);
    }

    #[test]
    fn dosage_pattern_priority() {
        assert_eq!(extract_dosage("1-0-1 x 5 ml").as_deref(), Some("5 ml"));
        assert_eq!(extract_dosage("2 tablets").as_deref(), Some("2 tablets"));
        assert_eq!(extract_dosage("1-0-1").as_deref(), Some("1-0-1"));
        assert_eq!(extract_dosage("none"), None);
    }

    #[test]
    fn frequency_and_duration_patterns() {
        assert_eq!(extract_frequency("3 times a day").as_deref(), Some("3 times a day"));
        assert_eq!(extract_frequency("2 time day").as_deref(), Some("2 time day"));
        assert_eq!(extract_duration("Continue for 6").as_deref(), Some("Continue for 6"));
        assert_eq!(extract_duration("for 2 weeks").as_deref(), Some("for 2 weeks"));
    }

    #[test]
    fn title_case_behaviour() {
        assert_eq!(title_case("ACBCIXIMAB"), "Acbciximab");
        assert_eq!(title_case("cough syrup"), "Cough Syrup");
        assert_eq!(title_case("vitamin-d3"), "Vitamin-D3");
        assert_eq!(title_case("b12x"), "B12X");
    }
}
