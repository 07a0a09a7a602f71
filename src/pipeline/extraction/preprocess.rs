//! Image preprocessing: builds the ordered variant set fed to OCR voting.
//!
//! **Services architecture**: variant generation is delegated to a
//! `VariantBackend` chosen at construction time. The enhanced backend adds
//! thresholded and sharpened renderings; the basic backend only needs
//! grayscale, median and autocontrast. Both are pure Rust over `image`.
//!
//! Variant order (fixed, voting relies on it for tie-breaks):
//! 1. original
//! 2. upscaled x1.5, upscaled x2.0
//! 3. backend variants
//!
//! Key rules:
//! - the original is always first and always present
//! - a failing enhanced backend degrades to the basic set, never to zero variants

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage, Luma, RgbImage};
use tracing::{debug, warn};

use super::types::ImageVariant;
use super::ExtractionError;

// ═══════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════

/// Maximum input image size (in bytes) before rejecting.
/// Prevents OOM on corrupt/adversarial files.
const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024; // 50 MB

/// Minimum valid image size in bytes (smallest valid PNG is ~67 bytes).
const MIN_IMAGE_BYTES: usize = 67;

/// Linear upscale factors applied to every source image.
pub const UPSCALE_FACTORS: [(f32, &str); 2] = [(1.5, "upscale_1_5x"), (2.0, "upscale_2x")];

/// Median filter window (pixels per side).
const MEDIAN_WINDOW: u32 = 3;

/// Adaptive threshold neighbourhood (pixels per side, odd).
const ADAPTIVE_BLOCK_SIZE: u32 = 31;

/// Constant subtracted from the Gaussian-weighted local mean.
const ADAPTIVE_C: f32 = 11.0;

/// 3x3 unsharp kernel: `[0,-1,0; -1,5,-1; 0,-1,0]`.
const SHARPEN_KERNEL: [[f32; 3]; 3] = [[0.0, -1.0, 0.0], [-1.0, 5.0, -1.0], [0.0, -1.0, 0.0]];

// ═══════════════════════════════════════════════════════════
// Service traits
// ═══════════════════════════════════════════════════════════

/// Produces the backend-specific variants appended after the upscales.
pub trait VariantBackend: Send + Sync {
    /// Backend name, for logs.
    fn name(&self) -> &'static str;

    /// Build enhanced renderings of `image`. Errors make the generator
    /// fall back to `BasicBackend`.
    fn enhance(&self, image: &DynamicImage) -> Result<Vec<ImageVariant>, ExtractionError>;
}

// ═══════════════════════════════════════════════════════════
// VariantGenerator: composes original + upscales + backend
// ═══════════════════════════════════════════════════════════

pub struct VariantGenerator {
    backend: Box<dyn VariantBackend>,
}

impl VariantGenerator {
    pub fn new(backend: Box<dyn VariantBackend>) -> Self {
        Self { backend }
    }

    /// Threshold + sharpen variant set (eight variants in total).
    pub fn enhanced() -> Self {
        Self::new(Box::new(EnhancedBackend))
    }

    /// Grayscale + autocontrast variant set (six variants in total).
    pub fn basic() -> Self {
        Self::new(Box::new(BasicBackend))
    }

    /// Pick the best backend compiled into this build.
    pub fn detect() -> Self {
        if cfg!(feature = "enhanced-preprocess") {
            Self::enhanced()
        } else {
            Self::basic()
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Build the ordered variant list. Never empty.
    pub fn generate(&self, image: &DynamicImage) -> Vec<ImageVariant> {
        let mut variants = vec![ImageVariant::new("original", image.clone())];
        variants.extend(upscaled_variants(image));

        let enhanced = match self.backend.enhance(image) {
            Ok(v) => v,
            Err(e) => {
                warn!(
                    backend = self.backend.name(),
                    error = %e,
                    "Variant backend failed, degrading to basic variants"
                );
                BasicBackend.basic_variants(image)
            }
        };
        variants.extend(enhanced);

        debug!(
            backend = self.backend.name(),
            count = variants.len(),
            "Generated OCR variants"
        );
        variants
    }
}

impl Default for VariantGenerator {
    fn default() -> Self {
        Self::detect()
    }
}

/// Upscaled copies. Upscaling helps recognition on small/dense print.
/// Skipped for degenerate (zero-sized) images.
fn upscaled_variants(image: &DynamicImage) -> Vec<ImageVariant> {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return Vec::new();
    }

    UPSCALE_FACTORS
        .iter()
        .map(|&(factor, name)| {
            let new_w = ((w as f32 * factor) as u32).max(1);
            let new_h = ((h as f32 * factor) as u32).max(1);
            ImageVariant::new(name, image.resize_exact(new_w, new_h, FilterType::CatmullRom))
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════
// Production backends
// ═══════════════════════════════════════════════════════════

// ── EnhancedBackend ───────────────────────────────────────

/// Grayscale, median-blurred, Otsu-thresholded, adaptive-thresholded and
/// sharpened renderings. Both thresholds run on the blurred image.
pub struct EnhancedBackend;

impl VariantBackend for EnhancedBackend {
    fn name(&self) -> &'static str {
        "enhanced"
    }

    fn enhance(&self, image: &DynamicImage) -> Result<Vec<ImageVariant>, ExtractionError> {
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return Err(ExtractionError::ImageProcessing(format!(
                "Cannot threshold a {w}x{h} image"
            )));
        }

        let gray = rgb_to_gray(&image.to_rgb8());
        let blur = median_filter(&gray, MEDIAN_WINDOW);
        let otsu = binarize(&blur, otsu_level(&blur));
        let adaptive = adaptive_gaussian_threshold(&blur, ADAPTIVE_BLOCK_SIZE, ADAPTIVE_C);
        let sharp = sharpen(&gray);

        Ok(vec![
            gray_variant("grayscale", gray),
            gray_variant("median_blur", blur),
            gray_variant("otsu_threshold", otsu),
            gray_variant("adaptive_threshold", adaptive),
            gray_variant("sharpened", sharp),
        ])
    }
}

// ── BasicBackend ──────────────────────────────────────────

/// Degraded variant set: grayscale, median + autocontrast, autocontrast + invert.
/// Works on any image, including zero-sized ones.
pub struct BasicBackend;

impl BasicBackend {
    fn basic_variants(&self, image: &DynamicImage) -> Vec<ImageVariant> {
        let gray = rgb_to_gray(&image.to_rgb8());
        let denoised = autocontrast(&median_filter(&gray, MEDIAN_WINDOW));
        let inverted = invert(&autocontrast(&gray));

        vec![
            gray_variant("grayscale", gray),
            gray_variant("median_autocontrast", denoised),
            gray_variant("inverted_autocontrast", inverted),
        ]
    }
}

impl VariantBackend for BasicBackend {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn enhance(&self, image: &DynamicImage) -> Result<Vec<ImageVariant>, ExtractionError> {
        Ok(self.basic_variants(image))
    }
}

fn gray_variant(name: &'static str, gray: GrayImage) -> ImageVariant {
    ImageVariant::new(name, DynamicImage::ImageLuma8(gray))
}

// ═══════════════════════════════════════════════════════════
// Decoding
// ═══════════════════════════════════════════════════════════

/// Decode raw image bytes (PNG, JPEG, TIFF) and fix EXIF orientation.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, ExtractionError> {
    validate_image_bytes(bytes)?;

    let img = image::load_from_memory(bytes).map_err(|e| {
        ExtractionError::ImageProcessing(format!("Failed to decode image: {e}"))
    })?;

    let orientation = read_exif_orientation(bytes);
    if orientation != 1 {
        debug!(orientation, "Applying EXIF orientation");
    }
    Ok(apply_orientation(img, orientation))
}

/// Validate image bytes before decoding.
/// Rejects clearly invalid input before decoding.
pub fn validate_image_bytes(bytes: &[u8]) -> Result<(), ExtractionError> {
    if bytes.len() < MIN_IMAGE_BYTES {
        return Err(ExtractionError::ImageProcessing(
            "Image data too small to be valid".into(),
        ));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ExtractionError::ImageProcessing(format!(
            "Image data exceeds {}MB limit",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Read EXIF orientation tag from raw image bytes.
/// Returns 1 (normal) if no EXIF data or tag not present.
pub fn read_exif_orientation(bytes: &[u8]) -> u32 {
    let mut cursor = Cursor::new(bytes);
    let reader = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(r) => r,
        Err(_) => return 1,
    };

    reader
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(1)
}

/// Apply EXIF orientation transform to a `DynamicImage`.
///
/// 1 = Normal, 2 = Mirrored, 3 = 180deg, 4 = Flipped V,
/// 5 = Mirrored + 90deg CW, 6 = 90deg CW, 7 = Mirrored + 270deg CW, 8 = 270deg CW
pub fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

// ═══════════════════════════════════════════════════════════
// Pixel operations (reusable)
// ═══════════════════════════════════════════════════════════

/// Convert RGB image to grayscale using ITU-R BT.601 luminance.
pub fn rgb_to_gray(rgb: &RgbImage) -> GrayImage {
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let p = rgb.get_pixel(x, y);
        let luma = 0.299 * p.0[0] as f32 + 0.587 * p.0[1] as f32 + 0.114 * p.0[2] as f32;
        Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}

/// Read a pixel with edge replication for out-of-bounds coordinates.
#[inline]
fn clamped(img: &GrayImage, x: i64, y: i64) -> u8 {
    let cx = x.clamp(0, img.width() as i64 - 1) as u32;
    let cy = y.clamp(0, img.height() as i64 - 1) as u32;
    img.get_pixel(cx, cy).0[0]
}

/// Median filter over a `window` x `window` neighbourhood (edges replicated).
pub fn median_filter(img: &GrayImage, window: u32) -> GrayImage {
    let radius = (window / 2) as i64;
    let mut neighbourhood = Vec::with_capacity((window * window) as usize);

    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        neighbourhood.clear();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                neighbourhood.push(clamped(img, x as i64 + dx, y as i64 + dy));
            }
        }
        neighbourhood.sort_unstable();
        Luma([neighbourhood[neighbourhood.len() / 2]])
    })
}

/// Otsu's global threshold: the level maximising between-class variance.
pub fn otsu_level(img: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for p in img.pixels() {
        histogram[p.0[0] as usize] += 1;
    }

    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 0;
    }
    let weighted_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(level, &count)| level as f64 * count as f64)
        .sum();

    let mut background_weight = 0u64;
    let mut background_sum = 0.0f64;
    let mut best_variance = 0.0f64;
    let mut best_level = 0u8;

    for (level, &count) in histogram.iter().enumerate() {
        background_weight += count;
        if background_weight == 0 {
            continue;
        }
        let foreground_weight = total - background_weight;
        if foreground_weight == 0 {
            break;
        }

        background_sum += level as f64 * count as f64;
        let background_mean = background_sum / background_weight as f64;
        let foreground_mean = (weighted_total - background_sum) / foreground_weight as f64;
        let diff = background_mean - foreground_mean;
        let variance = background_weight as f64 * foreground_weight as f64 * diff * diff;

        if variance > best_variance {
            best_variance = variance;
            best_level = level as u8;
        }
    }

    best_level
}

/// Binary threshold: strictly above `level` becomes white, the rest black.
pub fn binarize(img: &GrayImage, level: u8) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        if img.get_pixel(x, y).0[0] > level {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Adaptive threshold against a Gaussian-weighted local mean.
///
/// A pixel becomes white when it is brighter than `mean - c`, where `mean` is
/// taken over a `block_size` neighbourhood. Sigma follows the usual
/// `0.3 * ((block_size - 1) / 2 - 1) + 0.8` rule.
pub fn adaptive_gaussian_threshold(img: &GrayImage, block_size: u32, c: f32) -> GrayImage {
    let (w, h) = (img.width(), img.height());
    if w == 0 || h == 0 {
        return img.clone();
    }

    let kernel = gaussian_kernel(block_size);
    let radius = (kernel.len() / 2) as i64;

    // Separable blur: horizontal pass into a float buffer, then vertical.
    let mut horizontal = vec![0.0f32; (w * h) as usize];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (k, weight) in kernel.iter().enumerate() {
                acc += weight * clamped(img, x as i64 + k as i64 - radius, y as i64) as f32;
            }
            horizontal[(y * w + x) as usize] = acc;
        }
    }

    GrayImage::from_fn(w, h, |x, y| {
        let mut mean = 0.0f32;
        for (k, weight) in kernel.iter().enumerate() {
            let sy = (y as i64 + k as i64 - radius).clamp(0, h as i64 - 1) as u32;
            mean += weight * horizontal[(sy * w + x) as usize];
        }
        let value = img.get_pixel(x, y).0[0] as f32;
        if value > mean - c {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Normalized 1-D Gaussian kernel of odd length `size`.
fn gaussian_kernel(size: u32) -> Vec<f32> {
    let size = size.max(1) | 1;
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let radius = (size / 2) as i32;

    let raw: Vec<f32> = (-radius..=radius)
        .map(|i| (-(i * i) as f32 / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = raw.iter().sum();
    raw.into_iter().map(|v| v / sum).collect()
}

/// Sharpen with the 3x3 unsharp kernel (edges replicated).
pub fn sharpen(img: &GrayImage) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let mut acc = 0.0f32;
        for (ky, row) in SHARPEN_KERNEL.iter().enumerate() {
            for (kx, weight) in row.iter().enumerate() {
                if *weight == 0.0 {
                    continue;
                }
                let sx = x as i64 + kx as i64 - 1;
                let sy = y as i64 + ky as i64 - 1;
                acc += weight * clamped(img, sx, sy) as f32;
            }
        }
        Luma([acc.round().clamp(0.0, 255.0) as u8])
    })
}

/// Stretch intensities so the darkest pixel maps to 0 and the brightest to 255.
/// Uniform images are returned unchanged.
pub fn autocontrast(img: &GrayImage) -> GrayImage {
    let (lo, hi) = img.pixels().fold((u8::MAX, u8::MIN), |(lo, hi), p| {
        (lo.min(p.0[0]), hi.max(p.0[0]))
    });
    if hi <= lo {
        return img.clone();
    }

    let scale = 255.0 / (hi - lo) as f32;
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let v = (img.get_pixel(x, y).0[0] - lo) as f32 * scale;
        Luma([v.round().clamp(0.0, 255.0) as u8])
    })
}

/// Photographic negative.
pub fn invert(img: &GrayImage) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        Luma([255 - img.get_pixel(x, y).0[0]])
    })
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, Rgb};

    /// Create a test image with the given dimensions and color.
    fn solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    fn png_bytes(img: &DynamicImage) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        img.write_to(&mut cursor, ImageOutputFormat::Png).unwrap();
        cursor.into_inner()
    }

    /// Gray image from explicit rows.
    fn gray_from_rows(rows: &[&[u8]]) -> GrayImage {
        let h = rows.len() as u32;
        let w = rows[0].len() as u32;
        GrayImage::from_fn(w, h, |x, y| Luma([rows[y as usize][x as usize]]))
    }

    struct FailingBackend;

    impl VariantBackend for FailingBackend {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn enhance(&self, _image: &DynamicImage) -> Result<Vec<ImageVariant>, ExtractionError> {
            Err(ExtractionError::ImageProcessing("backend missing".into()))
        }
    }

    fn names(variants: &[ImageVariant]) -> Vec<&'static str> {
        variants.iter().map(|v| v.name).collect()
    }

    // ── VariantGenerator ──

    #[test]
    fn enhanced_variant_order() {
        let variants = VariantGenerator::enhanced().generate(&solid(40, 20, [200, 200, 200]));
        assert_eq!(
            names(&variants),
            vec![
                "original",
                "upscale_1_5x",
                "upscale_2x",
                "grayscale",
                "median_blur",
                "otsu_threshold",
                "adaptive_threshold",
                "sharpened",
            ]
        );
    }

    #[test]
    fn basic_variant_order() {
        let variants = VariantGenerator::basic().generate(&solid(40, 20, [200, 200, 200]));
        assert_eq!(
            names(&variants),
            vec![
                "original",
                "upscale_1_5x",
                "upscale_2x",
                "grayscale",
                "median_autocontrast",
                "inverted_autocontrast",
            ]
        );
    }

    #[test]
    fn failing_backend_degrades_to_basic() {
        let generator = VariantGenerator::new(Box::new(FailingBackend));
        let variants = generator.generate(&solid(10, 10, [0, 0, 0]));
        assert!(variants.len() >= 4, "got {}", variants.len());
        assert_eq!(variants[0].name, "original");
        assert_eq!(variants.last().unwrap().name, "inverted_autocontrast");
    }

    #[test]
    fn zero_sized_image_still_yields_variants() {
        let variants = VariantGenerator::enhanced().generate(&DynamicImage::new_rgb8(0, 0));
        assert_eq!(
            names(&variants),
            vec!["original", "grayscale", "median_autocontrast", "inverted_autocontrast"]
        );
    }

    #[test]
    fn upscales_use_linear_factors() {
        let variants = VariantGenerator::basic().generate(&solid(41, 20, [255, 255, 255]));
        assert_eq!(variants[1].image.dimensions(), (61, 30));
        assert_eq!(variants[2].image.dimensions(), (82, 40));
    }

    #[test]
    fn original_is_untouched() {
        let source = solid(8, 8, [10, 120, 230]);
        let variants = VariantGenerator::enhanced().generate(&source);
        assert_eq!(variants[0].image.to_rgb8(), source.to_rgb8());
    }

    #[test]
    fn detect_matches_feature() {
        let expected = if cfg!(feature = "enhanced-preprocess") { "enhanced" } else { "basic" };
        assert_eq!(VariantGenerator::detect().backend_name(), expected);
    }

    // ── Decoding ──

    #[test]
    fn decode_round_trips_png() {
        let bytes = png_bytes(&solid(30, 12, [255, 0, 0]));
        let decoded = decode_image(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (30, 12));
    }

    #[test]
    fn decode_rejects_tiny_input() {
        let result = decode_image(&[0x89, 0x50]);
        assert!(matches!(result, Err(ExtractionError::ImageProcessing(_))));
    }

    #[test]
    fn decode_rejects_garbage() {
        let result = decode_image(&[7u8; 200]);
        assert!(matches!(result, Err(ExtractionError::ImageProcessing(_))));
    }

    #[test]
    fn exif_missing_defaults_to_normal() {
        let bytes = png_bytes(&solid(4, 4, [0, 0, 0]));
        assert_eq!(read_exif_orientation(&bytes), 1);
    }

    #[test]
    fn orientation_rotates_dimensions() {
        let img = solid(30, 10, [0, 0, 0]);
        assert_eq!(apply_orientation(img.clone(), 6).dimensions(), (10, 30));
        assert_eq!(apply_orientation(img.clone(), 3).dimensions(), (30, 10));
        assert_eq!(apply_orientation(img, 42).dimensions(), (30, 10));
    }

    // ── Pixel operations ──

    #[test]
    fn gray_conversion_extremes() {
        let white = rgb_to_gray(&RgbImage::from_pixel(2, 2, Rgb([255, 255, 255])));
        let black = rgb_to_gray(&RgbImage::from_pixel(2, 2, Rgb([0, 0, 0])));
        assert!(white.pixels().all(|p| p.0[0] == 255));
        assert!(black.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn median_removes_salt_noise() {
        let img = gray_from_rows(&[&[10, 10, 10], &[10, 255, 10], &[10, 10, 10]]);
        let filtered = median_filter(&img, 3);
        assert_eq!(filtered.get_pixel(1, 1).0[0], 10);
    }

    #[test]
    fn otsu_splits_bimodal_histogram() {
        let img = gray_from_rows(&[&[20, 20, 20, 20], &[220, 220, 220, 220]]);
        let level = otsu_level(&img);
        assert!((20..220).contains(&level), "level {level}");
        let bin = binarize(&img, level);
        assert_eq!(bin.get_pixel(0, 0).0[0], 0);
        assert_eq!(bin.get_pixel(0, 1).0[0], 255);
    }

    #[test]
    fn otsu_uniform_image_is_zero() {
        let img = GrayImage::from_pixel(5, 5, Luma([128]));
        assert_eq!(otsu_level(&img), 0);
    }

    #[test]
    fn adaptive_threshold_keeps_dark_text_black() {
        // White page with a dark 3x3 glyph in the middle.
        let mut img = GrayImage::from_pixel(40, 40, Luma([240]));
        for y in 18..21 {
            for x in 18..21 {
                img.put_pixel(x, y, Luma([30]));
            }
        }
        let out = adaptive_gaussian_threshold(&img, 31, 11.0);
        assert_eq!(out.get_pixel(19, 19).0[0], 0);
        assert_eq!(out.get_pixel(2, 2).0[0], 255);
    }

    #[test]
    fn gaussian_kernel_is_normalized_and_symmetric() {
        let k = gaussian_kernel(31);
        assert_eq!(k.len(), 31);
        assert!((k.iter().sum::<f32>() - 1.0).abs() < 1e-4);
        assert!((k[0] - k[30]).abs() < f32::EPSILON);
        assert!(k[15] > k[0]);
    }

    #[test]
    fn sharpen_preserves_flat_regions() {
        let img = GrayImage::from_pixel(6, 6, Luma([100]));
        assert!(sharpen(&img).pixels().all(|p| p.0[0] == 100));
    }

    #[test]
    fn sharpen_boosts_edges() {
        let img = gray_from_rows(&[&[50, 50, 50], &[50, 150, 50], &[50, 50, 50]]);
        // 5*150 - 4*50 = 550 -> clamped
        assert_eq!(sharpen(&img).get_pixel(1, 1).0[0], 255);
    }

    #[test]
    fn autocontrast_stretches_range() {
        let img = gray_from_rows(&[&[100, 150, 200]]);
        let out = autocontrast(&img);
        assert_eq!(out.get_pixel(0, 0).0[0], 0);
        assert_eq!(out.get_pixel(1, 0).0[0], 128);
        assert_eq!(out.get_pixel(2, 0).0[0], 255);
    }

    #[test]
    fn autocontrast_uniform_passthrough() {
        let img = GrayImage::from_pixel(3, 3, Luma([77]));
        assert_eq!(autocontrast(&img), img);
    }

    #[test]
    fn invert_flips_values() {
        let img = gray_from_rows(&[&[0, 255, 55]]);
        let out = invert(&img);
        assert_eq!(out.as_raw(), &vec![255, 0, 200]);
    }
}
