//! Name-finding strategies, tried in order on every candidate line.
//!
//! Each strategy looks at one trimmed line and either proposes a
//! medication name (title-cased) or passes. The first proposal wins.

use super::parser::title_case;
use super::vocab::{
    is_form_keyword, is_stopword, COLUMN_GAP, FORM_KEYWORDS, FORM_MARKER, LEADING_NUMBER,
    MEDICATION_INFO, NAME_WORD, PRINTED_ROW, STRENGTH, TOKEN_SEPARATOR, UNIT_SUFFIX,
};

/// Parser state visible to strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineContext {
    /// Inside the medication table of a printed prescription.
    pub in_table: bool,
}

/// A proposed medication name plus any strength the strategy saw next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    /// Used only when the line itself has no dosage match.
    pub guessed_dosage: Option<String>,
}

impl Candidate {
    fn name_only(name: String) -> Self {
        Self {
            name,
            guessed_dosage: None,
        }
    }
}

pub trait NameStrategy: Send + Sync {
    fn label(&self) -> &'static str;

    fn propose(&self, line: &str, ctx: &LineContext) -> Option<Candidate>;
}

/// The fixed chain: unit/form anchor, known name, printed row, column split.
pub fn default_strategies() -> Vec<Box<dyn NameStrategy>> {
    vec![
        Box::new(UnitFormAnchor),
        Box::new(KnownName),
        Box::new(PrintedRow),
        Box::new(ColumnSplit),
    ]
}

fn acceptable_name(word: &str) -> bool {
    !is_stopword(word) && word.chars().count() > 3
}

// ── A: unit / form anchored ───────────────────────────────

/// Name = nearest purely alphabetic token among the three before the first
/// strength or dosage-form token.
pub struct UnitFormAnchor;

impl NameStrategy for UnitFormAnchor {
    fn label(&self) -> &'static str {
        "unit_form_anchor"
    }

    fn propose(&self, line: &str, _ctx: &LineContext) -> Option<Candidate> {
        let lower = line.to_lowercase();
        let strength = STRENGTH.find(&lower).map(|m| m.as_str());
        let has_form = FORM_KEYWORDS.iter().any(|f| lower.contains(f));
        if strength.is_none() && !has_form {
            return None;
        }

        let tokens: Vec<&str> = TOKEN_SEPARATOR.split(line).collect();
        let anchor = tokens
            .iter()
            .position(|t| UNIT_SUFFIX.is_match(t) || is_form_keyword(t))
            .or_else(|| {
                let number = strength?.split_whitespace().next()?;
                tokens.iter().position(|t| t.contains(number))
            })?;

        let start = anchor.saturating_sub(3);
        let nearest = tokens[start..anchor]
            .iter()
            .rev()
            .find(|t| !t.is_empty() && t.chars().all(char::is_alphabetic))?;

        acceptable_name(nearest).then(|| Candidate::name_only(title_case(nearest)))
    }
}

// ── B: known name / leading word ──────────────────────────

/// First reference-dictionary name found in the line, else a plausible first word.
pub struct KnownName;

impl NameStrategy for KnownName {
    fn label(&self) -> &'static str {
        "known_name"
    }

    fn propose(&self, line: &str, _ctx: &LineContext) -> Option<Candidate> {
        let lower = line.to_lowercase();
        if let Some((known, _)) = MEDICATION_INFO.iter().find(|(k, _)| lower.contains(k)) {
            return Some(Candidate::name_only(title_case(known)));
        }

        let first = line
            .split_whitespace()
            .next()?
            .trim_matches(|c: char| matches!(c, '.' | ',' | '(' | ')' | '[' | ']'));
        (NAME_WORD.is_match(first) && first.len() > 3)
            .then(|| Candidate::name_only(title_case(first)))
    }
}

// ── C: printed row ────────────────────────────────────────

/// `1) TAB. NAME 500 mg` style rows; the optional strength becomes the guess.
pub struct PrintedRow;

impl NameStrategy for PrintedRow {
    fn label(&self) -> &'static str {
        "printed_row"
    }

    fn propose(&self, line: &str, _ctx: &LineContext) -> Option<Candidate> {
        let caps = PRINTED_ROW.captures(line)?;
        let name = caps.get(1)?.as_str();
        Some(Candidate {
            name: title_case(name),
            guessed_dosage: caps.get(2).map(|m| m.as_str().to_string()),
        })
    }
}

// ── D: column split ───────────────────────────────────────

/// Table rows separated by wide gaps. Only active inside the medication table.
pub struct ColumnSplit;

impl NameStrategy for ColumnSplit {
    fn label(&self) -> &'static str {
        "column_split"
    }

    fn propose(&self, line: &str, ctx: &LineContext) -> Option<Candidate> {
        if !ctx.in_table {
            return None;
        }

        let columns: Vec<&str> = COLUMN_GAP.split(line).collect();
        let first_column = columns.first()?;
        let unnumbered = LEADING_NUMBER.replace(first_column, "");
        let cell = FORM_MARKER.replace_all(&unnumbered, "");
        let cell = cell.trim();

        if cell.is_empty() || !acceptable_name(cell) {
            return None;
        }

        let guessed_dosage = if columns.len() >= 2 {
            super::parser::extract_dosage(columns[0])
                .or_else(|| super::parser::extract_dosage(columns[1]))
        } else {
            None
        };

        Some(Candidate {
            name: title_case(cell),
            guessed_dosage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTSIDE: LineContext = LineContext { in_table: false };
    const INSIDE: LineContext = LineContext { in_table: true };

    fn name(strategy: &dyn NameStrategy, line: &str, ctx: &LineContext) -> Option<String> {
        strategy.propose(line, ctx).map(|c| c.name)
    }

    #[test]
    fn anchor_takes_word_before_strength() {
        assert_eq!(
            name(&UnitFormAnchor, "2) Paracetamol 650 mg 1-0-1 for 3 days", &OUTSIDE).as_deref(),
            Some("Paracetamol")
        );
        assert_eq!(
            name(&UnitFormAnchor, "Amoxicillin 500mg twice daily", &OUTSIDE).as_deref(),
            Some("Amoxicillin")
        );
    }

    #[test]
    fn anchor_on_form_keyword() {
        // "tab" is the anchor; nothing alphabetic precedes it.
        assert_eq!(name(&UnitFormAnchor, "1) TAB. Amoxicillin 500mg", &OUTSIDE), None);
        assert_eq!(
            name(&UnitFormAnchor, "Cetirizine tab at night", &OUTSIDE).as_deref(),
            Some("Cetirizine")
        );
    }

    #[test]
    fn anchor_only_checks_nearest_token() {
        // Nearest alphabetic token is the stopword "daily"; earlier words are not tried.
        assert_eq!(name(&UnitFormAnchor, "Metformin daily 500mg", &OUTSIDE), None);
    }

    #[test]
    fn anchor_rejects_short_names() {
        assert_eq!(name(&UnitFormAnchor, "Xa 500mg", &OUTSIDE), None);
    }

    #[test]
    fn anchor_needs_strength_or_form() {
        assert_eq!(name(&UnitFormAnchor, "Take rest and fluids", &OUTSIDE), None);
    }

    #[test]
    fn known_name_dictionary_first() {
        assert_eq!(
            name(&KnownName, "give cough syrup 2 spoons", &OUTSIDE).as_deref(),
            Some("Cough Syrup")
        );
        assert_eq!(
            name(&KnownName, "1) TAB. AMOXICILLIN", &OUTSIDE).as_deref(),
            Some("Amoxicillin")
        );
    }

    #[test]
    fn known_name_first_word_fallback() {
        assert_eq!(
            name(&KnownName, "(Pantoprazole) before breakfast", &OUTSIDE).as_deref(),
            Some("Pantoprazole")
        );
        assert_eq!(name(&KnownName, "Dr. Sharma", &OUTSIDE), None);
        assert_eq!(name(&KnownName, "B12 injection", &OUTSIDE), None);
    }

    #[test]
    fn printed_row_captures_strength() {
        let cand = PrintedRow.propose("3. CAP. Omez 20 mg", &OUTSIDE).unwrap();
        assert_eq!(cand.name, "Omez");
        assert_eq!(cand.guessed_dosage.as_deref(), Some("20 mg"));
    }

    #[test]
    fn printed_row_requires_four_chars() {
        assert_eq!(PrintedRow.propose("1) Xa", &OUTSIDE), None);
    }

    #[test]
    fn column_split_only_in_table() {
        let line = "1) TAB. ACBCIXIMAB          1 Morning          8 Days";
        assert_eq!(name(&ColumnSplit, line, &OUTSIDE), None);
        assert_eq!(name(&ColumnSplit, line, &INSIDE).as_deref(), Some("Acbciximab"));
    }

    #[test]
    fn column_split_guesses_dosage_from_columns() {
        let cand = ColumnSplit
            .propose("SYRUP Benadryl    10 ml    3 days", &INSIDE)
            .unwrap();
        assert_eq!(cand.name, "Benadryl");
        assert_eq!(cand.guessed_dosage.as_deref(), Some("10 ml"));
    }

    #[test]
    fn column_split_rejects_stopword_cell() {
        assert_eq!(name(&ColumnSplit, "Dose    1 tablet", &INSIDE), None);
    }

    #[test]
    fn default_chain_order() {
        let labels: Vec<&str> = default_strategies().iter().map(|s| s.label()).collect();
        assert_eq!(
            labels,
            vec!["unit_form_anchor", "known_name", "printed_row", "column_split"]
        );
    }
}
