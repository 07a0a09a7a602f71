use serde::{Deserialize, Serialize};

/// Info text used when a medication is not in the reference dictionary.
pub const UNKNOWN_MEDICATION_INFO: &str = "Medication information not available";

/// One medication line recovered from OCR text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationRecord {
    /// Title-cased name, never empty in parser output.
    pub name: String,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub duration: Option<String>,
    /// Comma-joined instruction phrases, e.g. "after meals, avoid alcohol".
    pub instructions: Option<String>,
    /// Short description, or [`UNKNOWN_MEDICATION_INFO`].
    pub info: String,
    /// Safety note for well-known drugs (paracetamol, ibuprofen, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl MedicationRecord {
    /// A record with only a name. Info and warning are left for the caller.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dosage: None,
            frequency: None,
            duration: None,
            instructions: None,
            info: UNKNOWN_MEDICATION_INFO.to_string(),
            warning: None,
        }
    }

    /// True when dosage, frequency or duration was found.
    pub fn has_detail(&self) -> bool {
        self.dosage.is_some() || self.frequency.is_some() || self.duration.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_record_has_sentinel_info() {
        let rec = MedicationRecord::named("Metformin");
        assert_eq!(rec.info, UNKNOWN_MEDICATION_INFO);
        assert!(!rec.has_detail());
    }

    #[test]
    fn serializes_missing_fields_as_null_and_omits_warning() {
        let mut rec = MedicationRecord::named("Cetirizine");
        rec.duration = Some("for 5 days".into());
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["name"], "Cetirizine");
        assert!(json["dosage"].is_null());
        assert_eq!(json["duration"], "for 5 days");
        assert!(json.get("warning").is_none());
        assert!(rec.has_detail());
    }
}
