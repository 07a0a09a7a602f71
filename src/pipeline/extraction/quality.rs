//! Read-only quality assessment of the source photo.
//!
//! Quality never blocks extraction: the report only explains an empty or
//! weak result to the user and is attached to every analysis.

use image::{DynamicImage, GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

use super::preprocess::rgb_to_gray;
use super::types::QualityWarning;

/// Laplacian variance below this = blurry.
const BLUR_THRESHOLD: f32 = 100.0;

/// RMS contrast below this = poor contrast (near-uniform image).
const CONTRAST_THRESHOLD: f32 = 25.0;

/// Fraction of near-white pixels above which the photo is considered blank.
const BLANK_RATIO: f32 = 0.95;

/// Fraction of near-black pixels above which the photo is considered dark.
const DARK_RATIO: f32 = 0.80;

const WHITE_LEVEL: u8 = 240;
const DARK_LEVEL: u8 = 15;

/// Shortest side (pixels) below which handwriting is rarely legible.
const MIN_SHORT_SIDE: u32 = 300;

/// Quality assessment report with numeric scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub warnings: Vec<QualityWarning>,
    /// Photo appears mostly blank (>95% near-white).
    pub is_blank: bool,
    /// Photo appears mostly dark (>80% near-black).
    pub is_dark: bool,
    /// Laplacian variance, higher = sharper. Blurry < 100.
    pub blur_score: f32,
    /// RMS contrast (0-255). Low contrast < 25.
    pub contrast_score: f32,
}

impl QualityReport {
    /// Assess a decoded photo.
    pub fn assess(image: &DynamicImage) -> Self {
        let rgb = image.to_rgb8();
        let mut report = Self::default();
        let pixel_count = (rgb.width() as usize) * (rgb.height() as usize);
        if pixel_count == 0 {
            report.is_blank = true;
            report.warnings.push(QualityWarning::BlankImage);
            return report;
        }

        if rgb.width().min(rgb.height()) < MIN_SHORT_SIDE {
            report.warnings.push(QualityWarning::LowResolution {
                width: rgb.width(),
                height: rgb.height(),
            });
        }

        let white = count_pixels(&rgb, |c| c > WHITE_LEVEL);
        if white as f32 / pixel_count as f32 > BLANK_RATIO {
            report.is_blank = true;
            report.warnings.push(QualityWarning::BlankImage);
        }

        let dark = count_pixels(&rgb, |c| c < DARK_LEVEL);
        if dark as f32 / pixel_count as f32 > DARK_RATIO {
            report.is_dark = true;
            report.warnings.push(QualityWarning::DarkImage);
        }

        let gray = rgb_to_gray(&rgb);

        report.blur_score = compute_laplacian_variance(&gray);
        if report.blur_score < BLUR_THRESHOLD && !report.is_blank && !report.is_dark {
            report.warnings.push(QualityWarning::BlurryImage);
        }

        report.contrast_score = compute_contrast_score(&gray);
        if report.contrast_score < CONTRAST_THRESHOLD && !report.is_blank && !report.is_dark {
            report.warnings.push(QualityWarning::PoorContrast);
        }

        report
    }

    /// User-facing advice for an inconclusive extraction.
    ///
    /// Always returns at least one line, since an empty result with no
    /// explanation is the worst outcome for the user.
    pub fn guidance(&self) -> Vec<String> {
        let mut tips: Vec<String> = self
            .warnings
            .iter()
            .map(|w| match w {
                QualityWarning::BlankImage => {
                    "The photo looks blank. Make sure the prescription fills the frame.".to_string()
                }
                QualityWarning::DarkImage => {
                    "The photo is too dark. Retake it in better lighting.".to_string()
                }
                QualityWarning::BlurryImage => {
                    "The photo looks blurry. Hold the camera steady and tap to focus.".to_string()
                }
                QualityWarning::PoorContrast => {
                    "The text is faint. Avoid glare and shadows on the paper.".to_string()
                }
                QualityWarning::LowResolution { width, height } => format!(
                    "The photo is small ({width}x{height}). Move closer or use a higher resolution."
                ),
            })
            .collect();

        if tips.is_empty() {
            tips.push(
                "No text could be read. Retake the photo with the prescription flat and well lit."
                    .to_string(),
            );
        }
        tips
    }
}

fn count_pixels(rgb: &RgbImage, test: impl Fn(u8) -> bool) -> usize {
    rgb.pixels()
        .filter(|p| test(p.0[0]) && test(p.0[1]) && test(p.0[2]))
        .count()
}

/// Laplacian variance over the interior: `[0,1,0; 1,-4,1; 0,1,0]`.
/// Higher variance = sharper image.
pub fn compute_laplacian_variance(img: &GrayImage) -> f32 {
    let (w, h) = (img.width(), img.height());
    if w < 3 || h < 3 {
        return 0.0;
    }

    let px = |x: u32, y: u32| img.get_pixel(x, y).0[0] as f64;
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    let mut count = 0u64;

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let laplacian =
                px(x, y - 1) + px(x, y + 1) + px(x - 1, y) + px(x + 1, y) - 4.0 * px(x, y);
            sum += laplacian;
            sum_sq += laplacian * laplacian;
            count += 1;
        }
    }

    let mean = sum / count as f64;
    let variance = (sum_sq / count as f64) - (mean * mean);
    variance.max(0.0) as f32
}

/// RMS contrast: standard deviation of grayscale intensities.
pub fn compute_contrast_score(img: &GrayImage) -> f32 {
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    let mut count = 0u64;

    for pixel in img.pixels() {
        let val = pixel.0[0] as f64;
        sum += val;
        sum_sq += val * val;
        count += 1;
    }

    if count == 0 {
        return 0.0;
    }

    let mean = sum / count as f64;
    let variance = (sum_sq / count as f64) - (mean * mean);
    variance.max(0.0).sqrt() as f32
}
