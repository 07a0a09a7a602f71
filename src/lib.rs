//! Prescription photo OCR, medication parsing and worker health-risk triage.
//!
//! The entry points are [`PrescriptionAnalyzer`] for photos and
//! [`score_worker`] for triage. Both are synchronous and hold no global state.

pub mod config;
pub mod pipeline;
pub mod translation;
pub mod triage;

pub use pipeline::extraction::{
    AnalysisOptions, ExtractedText, ExtractionError, OcrEngine, PrescriptionAnalysis,
    PrescriptionAnalyzer, QualityReport, TesseractCli,
};
pub use pipeline::structuring::{parse_medications, MedicationRecord};
pub use translation::{CachedTranslator, Translator};
pub use triage::{score_worker, RiskAssessment, RiskBucket};

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` wins over the default filter.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    }
}
