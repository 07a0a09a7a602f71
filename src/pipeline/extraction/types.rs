use std::fmt;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// One enhanced rendering of the source image.
/// Created per analysis call and dropped once voting completes.
#[derive(Debug, Clone)]
pub struct ImageVariant {
    /// Transform name, for diagnostics only.
    pub name: &'static str,
    pub image: DynamicImage,
}

impl ImageVariant {
    pub fn new(name: &'static str, image: DynamicImage) -> Self {
        Self { name, image }
    }
}

/// A fixed OCR invocation profile: recognition engine mode + page segmentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcrConfig {
    pub name: &'static str,
    /// Tesseract `--oem` (0 legacy, 1 LSTM, 3 default).
    pub engine_mode: u8,
    /// Tesseract `--psm`.
    pub segmentation_mode: u8,
    /// Extra `-c key=value` variable, if any.
    pub variable: Option<&'static str>,
}

impl OcrConfig {
    /// Command-line arguments for this profile, in tesseract order.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "--oem".to_string(),
            self.engine_mode.to_string(),
            "--psm".to_string(),
            self.segmentation_mode.to_string(),
        ];
        if let Some(var) = self.variable {
            args.push("-c".to_string());
            args.push(var.to_string());
        }
        args
    }
}

impl fmt::Display for OcrConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.args().join(" "))
    }
}

/// Engine profiles tried against every variant, most general first.
pub const OCR_CONFIGS: [OcrConfig; 5] = [
    OcrConfig {
        name: "uniform_block",
        engine_mode: 3,
        segmentation_mode: 6,
        variable: Some("preserve_interword_spaces=1"),
    },
    OcrConfig {
        name: "single_column",
        engine_mode: 3,
        segmentation_mode: 4,
        variable: Some("preserve_interword_spaces=1"),
    },
    OcrConfig {
        name: "single_line",
        engine_mode: 1,
        segmentation_mode: 7,
        variable: None,
    },
    OcrConfig {
        name: "sparse_text",
        engine_mode: 3,
        segmentation_mode: 11,
        variable: None,
    },
    OcrConfig {
        name: "sparse_text_osd",
        engine_mode: 3,
        segmentation_mode: 12,
        variable: None,
    },
];

/// Winning OCR output of a variant x config sweep.
///
/// `text` is never absent: an empty string means the sweep was inconclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedText {
    pub text: String,
    /// Variant that produced `text`, `None` when nothing usable was found.
    pub variant: Option<String>,
    /// Config that produced `text`.
    pub config: Option<String>,
    /// Number of (variant, config) pairs attempted.
    pub attempts: usize,
    /// Number of attempts that errored or timed out.
    pub failures: usize,
}

impl ExtractedText {
    /// True when no attempt produced non-whitespace text.
    pub fn is_inconclusive(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Quality issues detected on the source image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QualityWarning {
    BlankImage,
    DarkImage,
    BlurryImage,
    PoorContrast,
    LowResolution { width: u32, height: u32 },
}

/// OCR engine abstraction (allows mocking for tests).
///
/// Implementations must be safe to call repeatedly; the sweep calls
/// `recognize` once per (variant, config) pair.
pub trait OcrEngine: Send + Sync {
    /// Availability probe. Fails when the engine cannot run at all.
    fn version(&self) -> Result<String, ExtractionError>;

    fn recognize(
        &self,
        image: &DynamicImage,
        language_pack: &str,
        config: &OcrConfig,
    ) -> Result<String, ExtractionError>;
}
