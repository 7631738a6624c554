//! Template matching: the [`MatchBackend`] boundary, its `imageproc`
//! implementation, and [`VisualMatcher`] which turns raw scores into
//! [`MatchCandidate`]s.

use std::path::Path;

use image::{DynamicImage, GrayImage, ImageBuffer, Luma, RgbImage};
use imageproc::integral_image::{integral_image, integral_squared_image, sum_image_pixels};
use imageproc::template_matching::{find_extremes, match_template, MatchTemplateMethod};
use serde::{Deserialize, Serialize};

use crate::core::coords::Position;
use crate::errors::{NavigatorError, Result};

/// How both operands are reduced before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Both operands must be 3-channel.
    #[default]
    Color,
    Grayscale,
    /// Grayscale, then thresholded.
    Binary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Squared error scaled by the largest possible error, so 0..1.
    SumOfSquaredErrors,
    SumOfSquaredErrorsNormalized,
    CrossCorrelation,
    CrossCorrelationNormalized,
    /// Zero-mean normalized correlation, -1..1. Insensitive to brightness
    /// offsets, so flat bright regions do not score high.
    #[default]
    CorrelationCoefficientNormalized,
}

impl MatchMethod {
    /// Squared-error methods score a perfect match as 0.
    pub fn lower_is_better(self) -> bool {
        matches!(self, MatchMethod::SumOfSquaredErrors | MatchMethod::SumOfSquaredErrorsNormalized)
    }

    /// `None` for the methods computed here rather than by `imageproc`.
    fn imageproc(self) -> Option<MatchTemplateMethod> {
        match self {
            MatchMethod::SumOfSquaredErrors => Some(MatchTemplateMethod::SumOfSquaredErrors),
            MatchMethod::SumOfSquaredErrorsNormalized => Some(MatchTemplateMethod::SumOfSquaredErrorsNormalized),
            MatchMethod::CrossCorrelation => Some(MatchTemplateMethod::CrossCorrelation),
            MatchMethod::CrossCorrelationNormalized => Some(MatchTemplateMethod::CrossCorrelationNormalized),
            MatchMethod::CorrelationCoefficientNormalized => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchOptions {
    pub mode: MatchMode,
    pub method: MatchMethod,
    /// Binary mode: pixels above this become `binary_max`, the rest 0.
    pub binary_cutoff: u8,
    pub binary_max: u8,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            mode: MatchMode::Color,
            method: MatchMethod::CorrelationCoefficientNormalized,
            binary_cutoff: 127,
            binary_max: 255,
        }
    }
}

/// Raw output of one scoring pass, like OpenCV's `minMaxLoc`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreExtremes {
    pub min: f32,
    pub max: f32,
    pub min_loc: (u32, u32),
    pub max_loc: (u32, u32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchSource {
    Template(String),
    Text(String),
}

/// One matching attempt. `location` is the top-left of the matched region
/// in capture-image (window-relative) space.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    pub score: f32,
    pub location: Position,
    pub size: (u32, u32),
    pub source: MatchSource,
}

impl MatchCandidate {
    pub fn center(&self) -> Position {
        self.location + Position::window(self.size.0 as i32 / 2, self.size.1 as i32 / 2)
    }
}

/// A template image to look for.
#[derive(Debug, Clone)]
pub struct Target {
    pub label: String,
    pub image: DynamicImage,
}

impl Target {
    pub fn new(label: impl Into<String>, image: DynamicImage) -> Self {
        Self { label: label.into(), image }
    }

    /// Load a template from disk. Files are always decoded to 3-channel RGB
    /// so they can be used in color mode.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| NavigatorError::TemplateLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let label = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(label, DynamicImage::ImageRgb8(image.to_rgb8())))
    }

    pub fn size(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// The pixel-matching primitive.
pub trait MatchBackend {
    fn score(&self, image: &DynamicImage, template: &DynamicImage, method: MatchMethod) -> Result<ScoreExtremes>;

    fn to_grayscale(&self, image: &DynamicImage) -> DynamicImage {
        DynamicImage::ImageLuma8(image.to_luma8())
    }

    fn threshold_binarize(&self, image: &DynamicImage, cutoff: u8, max_value: u8) -> DynamicImage {
        let mut gray = image.to_luma8();
        for pixel in gray.pixels_mut() {
            pixel.0[0] = if pixel.0[0] > cutoff { max_value } else { 0 };
        }
        DynamicImage::ImageLuma8(gray)
    }

    /// Every top-left location whose correlation coefficient reaches `threshold`.
    fn find_all(&self, image: &DynamicImage, template: &DynamicImage, threshold: f32) -> Result<Vec<Position>>;
}

/// [`MatchBackend`] on `imageproc`. Single-channel operands are matched
/// directly; color operands are matched per channel and the three score
/// maps averaged. Plain squared error is divided by `255² · w · h` so every
/// method except raw cross-correlation stays in a fixed range.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageprocBackend;

type ScoreMap = ImageBuffer<Luma<f32>, Vec<f32>>;

fn channel(rgb: &RgbImage, index: usize) -> GrayImage {
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| Luma([rgb.get_pixel(x, y)[index]]))
}

/// Zero-mean normalized correlation of `template` at every offset in `image`.
/// Window sums come from integral images; a flat window or template scores 0.
fn coefficient_map(image: &GrayImage, template: &GrayImage) -> ScoreMap {
    let (iw, ih) = image.dimensions();
    let (tw, th) = template.dimensions();
    let n = (tw * th) as f64;

    let mean = template.pixels().map(|p| p.0[0] as f64).sum::<f64>() / n;
    let centered: Vec<f64> = template.pixels().map(|p| p.0[0] as f64 - mean).collect();
    let template_norm = centered.iter().map(|v| v * v).sum::<f64>().sqrt();

    let sums = integral_image::<_, u64>(image);
    let squares = integral_squared_image::<_, u64>(image);
    let raw = image.as_raw();

    ScoreMap::from_fn(iw - tw + 1, ih - th + 1, |x, y| {
        let (right, bottom) = (x + tw - 1, y + th - 1);
        let sum = sum_image_pixels(&sums, x, y, right, bottom)[0] as f64;
        let sum_sq = sum_image_pixels(&squares, x, y, right, bottom)[0] as f64;
        let window_norm = (sum_sq - sum * sum / n).max(0.0).sqrt();
        let denom = window_norm * template_norm;
        if denom < 1e-9 {
            return Luma([0.0]);
        }

        let mut cross = 0.0;
        for (j, row) in centered.chunks(tw as usize).enumerate() {
            let start = ((y + j as u32) * iw + x) as usize;
            for (pixel, t) in raw[start..start + tw as usize].iter().zip(row) {
                cross += *pixel as f64 * t;
            }
        }
        Luma([(cross / denom).clamp(-1.0, 1.0) as f32])
    })
}

fn gray_map(image: &GrayImage, template: &GrayImage, method: MatchMethod) -> ScoreMap {
    match method.imageproc() {
        None => coefficient_map(image, template),
        Some(MatchTemplateMethod::SumOfSquaredErrors) => {
            let mut map = match_template(image, template, MatchTemplateMethod::SumOfSquaredErrors);
            let worst = 255.0 * 255.0 * (template.width() * template.height()) as f32;
            for p in map.pixels_mut() {
                p.0[0] /= worst;
            }
            map
        }
        Some(m) => match_template(image, template, m),
    }
}

impl ImageprocBackend {
    pub fn new() -> Self {
        Self
    }

    fn score_map(&self, image: &DynamicImage, template: &DynamicImage, method: MatchMethod) -> Result<ScoreMap> {
        let (iw, ih) = (image.width(), image.height());
        let (tw, th) = (template.width(), template.height());
        if tw == 0 || th == 0 || tw > iw || th > ih {
            return Err(NavigatorError::TemplateTooLarge { template: (tw, th), image: (iw, ih) });
        }

        let single = image.color().channel_count() == 1 || template.color().channel_count() == 1;
        if single {
            return Ok(gray_map(&image.to_luma8(), &template.to_luma8(), method));
        }

        let (image_rgb, template_rgb) = (image.to_rgb8(), template.to_rgb8());
        let mut combined: Option<ScoreMap> = None;
        for c in 0..3 {
            let map = gray_map(&channel(&image_rgb, c), &channel(&template_rgb, c), method);
            match combined.as_mut() {
                None => combined = Some(map),
                Some(acc) => {
                    for (a, b) in acc.pixels_mut().zip(map.pixels()) {
                        a.0[0] += b.0[0];
                    }
                }
            }
        }

        let mut map = combined.unwrap_or_else(|| ScoreMap::new(iw - tw + 1, ih - th + 1));
        for p in map.pixels_mut() {
            p.0[0] /= 3.0;
        }
        Ok(map)
    }
}

impl MatchBackend for ImageprocBackend {
    fn score(&self, image: &DynamicImage, template: &DynamicImage, method: MatchMethod) -> Result<ScoreExtremes> {
        let map = self.score_map(image, template, method)?;
        let extremes = find_extremes(&map);
        Ok(ScoreExtremes {
            min: extremes.min_value,
            max: extremes.max_value,
            min_loc: extremes.min_value_location,
            max_loc: extremes.max_value_location,
        })
    }

    fn find_all(&self, image: &DynamicImage, template: &DynamicImage, threshold: f32) -> Result<Vec<Position>> {
        let map = self.score_map(image, template, MatchMethod::CorrelationCoefficientNormalized)?;
        Ok(map
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] >= threshold)
            .map(|(x, y, _)| Position::window(x as i32, y as i32))
            .collect())
    }
}

/// Uniform "is the target here, and where" over a [`MatchBackend`].
pub struct VisualMatcher {
    backend: Box<dyn MatchBackend>,
}

impl VisualMatcher {
    pub fn new(backend: impl MatchBackend + 'static) -> Self {
        Self { backend: Box::new(backend) }
    }

    pub fn backend(&self) -> &dyn MatchBackend {
        self.backend.as_ref()
    }

    fn prepare(&self, image: &DynamicImage, options: &MatchOptions) -> DynamicImage {
        match options.mode {
            MatchMode::Color => image.clone(),
            MatchMode::Grayscale => self.backend.to_grayscale(image),
            MatchMode::Binary => {
                let gray = self.backend.to_grayscale(image);
                self.backend.threshold_binarize(&gray, options.binary_cutoff, options.binary_max)
            }
        }
    }

    /// Score one target against `image`.
    pub fn match_image(&self, image: &DynamicImage, target: &Target, options: &MatchOptions) -> Result<MatchCandidate> {
        if options.mode == MatchMode::Color {
            let (ic, tc) = (image.color().channel_count(), target.image.color().channel_count());
            if ic != 3 || tc != 3 {
                return Err(NavigatorError::ChannelMismatch(format!(
                    "color matching needs 3-channel image and template, got {} and {} ({})",
                    ic, tc, target.label
                )));
            }
        }

        let extremes = if options.mode == MatchMode::Color {
            self.backend.score(image, &target.image, options.method)?
        } else {
            let prepared_image = self.prepare(image, options);
            let prepared_template = self.prepare(&target.image, options);
            self.backend.score(&prepared_image, &prepared_template, options.method)?
        };

        let (score, (x, y)) = if options.method.lower_is_better() {
            (1.0 - extremes.min, extremes.min_loc)
        } else {
            (extremes.max, extremes.max_loc)
        };
        let candidate = MatchCandidate {
            score,
            location: Position::window(x as i32, y as i32),
            size: target.size(),
            source: MatchSource::Template(target.label.clone()),
        };
        log::debug!("match {}: score={:.3} at {}", target.label, score, candidate.location);
        Ok(candidate)
    }

    /// First target scoring at least `threshold`, in order. On failure the
    /// error reports the closest miss.
    pub fn match_best_of(
        &self,
        image: &DynamicImage,
        targets: &[Target],
        threshold: f32,
        options: &MatchOptions,
    ) -> Result<MatchCandidate> {
        log::debug!("match best of {} targets: threshold={}, mode={:?}", targets.len(), threshold, options.mode);
        let mut best: Option<MatchCandidate> = None;
        for target in targets {
            let candidate = self.match_image(image, target, options)?;
            if candidate.score >= threshold {
                log::debug!("max_val={:.3}, threshold={}", candidate.score, threshold);
                return Ok(candidate);
            }
            if best.as_ref().map_or(true, |b| candidate.score > b.score) {
                best = Some(candidate);
            }
        }

        let (best_score, best_location) = best
            .map(|b| (b.score, b.location))
            .unwrap_or((0.0, Position::window(0, 0)));
        log::error!("template matching failure, max value is {:.3}", best_score);
        Err(NavigatorError::NoMatch { threshold, best_score, best_location })
    }

    pub fn find_all(&self, image: &DynamicImage, target: &Target, threshold: f32) -> Result<Vec<Position>> {
        self.backend.find_all(image, &target.image, threshold)
    }
}
