pub mod types;
pub mod preprocess;
pub mod quality;
pub mod ocr;
pub mod voting;
pub mod medical_correction;
pub mod orchestrator;

pub use types::*;
pub use preprocess::*;
pub use quality::*;
pub use ocr::*;
pub use voting::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The engine could not be probed at all (missing binary, broken install).
    /// Distinct from a sweep that ran and found nothing.
    #[error("OCR engine not available: {0}")]
    EngineUnavailable(String),

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),

    #[error("OCR call timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Invalid language pack: {0:?}")]
    InvalidLanguagePack(String),
}
