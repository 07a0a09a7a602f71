use std::time::Instant;

use image::DynamicImage;
use serde::Serialize;
use tracing::{info, info_span, warn};
use uuid::Uuid;

use super::medical_correction::correct_medical_terms;
use super::ocr::TesseractCli;
use super::preprocess::{decode_image, VariantGenerator};
use super::quality::QualityReport;
use super::types::{ExtractedText, OcrEngine, OCR_CONFIGS};
use super::voting::vote_best_text;
use super::ExtractionError;
use crate::config::{is_valid_language_pack, OcrSettings, DEFAULT_LANGUAGE_PACK};
use crate::pipeline::structuring::{parse_medications, MedicationRecord};
use crate::translation::{CachedTranslator, Translator};

/// Per-call analysis options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Tesseract language pack, e.g. `eng` or `eng+hin`.
    pub language_pack: String,
    /// Output language code; `en` leaves the text untranslated.
    pub target_language: String,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            language_pack: DEFAULT_LANGUAGE_PACK.to_string(),
            target_language: "en".to_string(),
        }
    }
}

/// Full result of one prescription photo analysis.
#[derive(Debug, Clone, Serialize)]
pub struct PrescriptionAnalysis {
    pub analysis_id: Uuid,
    /// Extracted text, translated when a target language was requested.
    pub extracted_text: String,
    /// Extracted text exactly as recognized. Parsing always runs on this.
    pub source_text: String,
    pub medications: Vec<MedicationRecord>,
    pub quality: QualityReport,
    /// User advice, populated only when nothing could be read.
    pub guidance: Vec<String>,
    pub winning_variant: Option<String>,
    pub winning_config: Option<String>,
    pub attempts: usize,
    pub failures: usize,
    pub target_language: String,
}

impl PrescriptionAnalysis {
    pub fn is_inconclusive(&self) -> bool {
        self.source_text.trim().is_empty()
    }
}

/// Prescription photo → text → medication records.
///
/// Holds the OCR engine and variant generator as injected services so the
/// whole flow can run against mocks.
pub struct PrescriptionAnalyzer {
    engine: Box<dyn OcrEngine>,
    variants: VariantGenerator,
    settings: OcrSettings,
    correct_terms: bool,
    translator: Option<CachedTranslator<Box<dyn Translator>>>,
}

impl PrescriptionAnalyzer {
    pub fn new(engine: Box<dyn OcrEngine>) -> Self {
        Self {
            engine,
            variants: VariantGenerator::detect(),
            settings: OcrSettings::default(),
            correct_terms: false,
            translator: None,
        }
    }

    /// Tesseract CLI engine configured from the environment.
    pub fn from_env() -> Self {
        let settings = OcrSettings::from_env();
        Self::new(Box::new(TesseractCli::new(settings.clone()))).with_settings(settings)
    }

    pub fn with_variant_generator(mut self, variants: VariantGenerator) -> Self {
        self.variants = variants;
        self
    }

    pub fn with_settings(mut self, settings: OcrSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Enable dictionary correction of near-miss drug names before parsing.
    pub fn with_term_correction(mut self, enabled: bool) -> Self {
        self.correct_terms = enabled;
        self
    }

    pub fn with_translator(mut self, translator: CachedTranslator<Box<dyn Translator>>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn settings(&self) -> &OcrSettings {
        &self.settings
    }

    /// Options using the configured language pack and no translation.
    pub fn default_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            language_pack: self.settings.language_pack.clone(),
            ..AnalysisOptions::default()
        }
    }

    /// Engine version string, or `EngineUnavailable`.
    pub fn engine_version(&self) -> Result<String, ExtractionError> {
        self.engine.version().map_err(|e| match e {
            ExtractionError::EngineUnavailable(_) => e,
            other => ExtractionError::EngineUnavailable(other.to_string()),
        })
    }

    pub fn is_engine_available(&self) -> bool {
        match self.engine_version() {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "OCR engine unavailable");
                false
            }
        }
    }

    /// Run the variant x config OCR sweep over `image`.
    ///
    /// Fails only when the language pack is malformed or the engine is
    /// unavailable. A sweep that reads nothing returns empty text.
    pub fn extract_text(
        &self,
        image: &DynamicImage,
        language_pack: &str,
    ) -> Result<ExtractedText, ExtractionError> {
        if !is_valid_language_pack(language_pack) {
            return Err(ExtractionError::InvalidLanguagePack(language_pack.to_string()));
        }
        let version = self.engine_version()?;

        let start = Instant::now();
        let variants = self.variants.generate(image);
        let mut extracted = vote_best_text(&*self.engine, &variants, &OCR_CONFIGS, language_pack);

        if self.correct_terms && !extracted.is_inconclusive() {
            extracted.text = correct_medical_terms(&extracted.text);
        }

        info!(
            engine = %version,
            language_pack,
            variants = variants.len(),
            attempts = extracted.attempts,
            failures = extracted.failures,
            chars = extracted.text.trim().len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "OCR sweep complete"
        );
        Ok(extracted)
    }

    /// Extract text and parse medications from it.
    pub fn extract_and_parse(
        &self,
        image: &DynamicImage,
        language_pack: &str,
    ) -> Result<(ExtractedText, Vec<MedicationRecord>), ExtractionError> {
        let extracted = self.extract_text(image, language_pack)?;
        let medications = parse_medications(&extracted.text);
        Ok((extracted, medications))
    }

    /// Decode raw photo bytes (EXIF orientation applied) and analyze them.
    pub fn analyze_bytes(
        &self,
        bytes: &[u8],
        options: &AnalysisOptions,
    ) -> Result<PrescriptionAnalysis, ExtractionError> {
        let image = decode_image(bytes)?;
        self.analyze(&image, options)
    }

    /// Full analysis: quality report, OCR, parsing, guidance and translation.
    pub fn analyze(
        &self,
        image: &DynamicImage,
        options: &AnalysisOptions,
    ) -> Result<PrescriptionAnalysis, ExtractionError> {
        let analysis_id = Uuid::new_v4();
        let _span = info_span!("prescription_analysis", analysis_id = %analysis_id).entered();
        let start = Instant::now();

        let quality = QualityReport::assess(image);
        let (extracted, mut medications) = self.extract_and_parse(image, &options.language_pack)?;

        let guidance = if extracted.is_inconclusive() {
            quality.guidance()
        } else {
            Vec::new()
        };

        let extracted_text = self.localize(&extracted.text, &mut medications, &options.target_language);

        info!(
            medications = medications.len(),
            inconclusive = extracted.is_inconclusive(),
            warnings = quality.warnings.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Prescription analysis complete"
        );

        Ok(PrescriptionAnalysis {
            analysis_id,
            extracted_text,
            source_text: extracted.text,
            medications,
            quality,
            guidance,
            winning_variant: extracted.variant,
            winning_config: extracted.config,
            attempts: extracted.attempts,
            failures: extracted.failures,
            target_language: options.target_language.clone(),
        })
    }

    /// Translate the text and each record's instructions. Names, dosages and
    /// info stay as parsed.
    fn localize(
        &self,
        text: &str,
        medications: &mut [MedicationRecord],
        target_language: &str,
    ) -> String {
        let translator = match &self.translator {
            Some(t) if target_language != "en" => t,
            _ => return text.to_string(),
        };

        for med in medications.iter_mut() {
            if let Some(instructions) = &med.instructions {
                med.instructions = Some(translator.translate(instructions, target_language));
            }
        }
        translator.translate(text, target_language)
    }
}
