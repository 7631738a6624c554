//! Text location on captures.
//!
//! [`OcrEngine`] is the recognition boundary; [`locate_text`] applies the
//! selection policy (highest-confidence exact match, else highest-confidence
//! substring match) on top of whatever an engine detects.

use std::fs;
use std::path::Path;

use image::DynamicImage;
use ocrs::{DecodeMethod, ImageSource, OcrEngineParams, TextItem};
use serde::{Deserialize, Serialize};

use crate::core::coords::Position;
use crate::errors::{NavigatorError, Result};

/// One recognized text region. Corners are window-relative, in the order
/// top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Clone, PartialEq)]
pub struct TextDetection {
    pub text: String,
    pub confidence: f32,
    pub corners: [Position; 4],
}

impl TextDetection {
    pub fn from_box(text: &str, confidence: f32, left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            text: text.to_string(),
            confidence,
            corners: [
                Position::window(left, top),
                Position::window(right, top),
                Position::window(right, bottom),
                Position::window(left, bottom),
            ],
        }
    }
}

pub trait OcrEngine {
    fn detect_and_recognize(&self, image: &DynamicImage) -> Result<Vec<TextDetection>>;
}

/// Which point of a text box to click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAnchor {
    /// Midpoint of the left edge.
    Left,
    #[default]
    Center,
    /// Midpoint of the right edge.
    Right,
}

impl TextAnchor {
    /// `None` unless `corners` holds exactly four points.
    pub fn point(self, corners: &[Position]) -> Option<Position> {
        let [tl, tr, br, bl] = <[Position; 4]>::try_from(corners).ok()?;
        let (x, y) = match self {
            TextAnchor::Left => ((tl.x + bl.x) / 2, (tl.y + bl.y) / 2),
            TextAnchor::Right => ((tr.x + br.x) / 2, (tr.y + br.y) / 2),
            TextAnchor::Center => ((tl.x + tr.x + br.x + bl.x) / 4, (tl.y + tr.y + br.y + bl.y) / 4),
        };
        Some(Position { x, y, space: tl.space })
    }
}

fn most_confident<'a>(detections: impl Iterator<Item = &'a TextDetection>) -> Option<&'a TextDetection> {
    detections.fold(None, |best: Option<&TextDetection>, d| match best {
        Some(b) if b.confidence >= d.confidence => Some(b),
        _ => Some(d),
    })
}

/// Pick the detection for `text`: exact matches win over substring matches,
/// ties broken by confidence.
pub fn select_text<'a>(detections: &'a [TextDetection], text: &str) -> Option<&'a TextDetection> {
    most_confident(detections.iter().filter(|d| d.text == text))
        .or_else(|| most_confident(detections.iter().filter(|d| d.text.contains(text))))
}

/// Corners of `text` in `image`, or an empty list when it is not there.
pub fn locate_text(ocr: &dyn OcrEngine, image: &DynamicImage, text: &str) -> Result<Vec<Position>> {
    let detections = ocr.detect_and_recognize(image)?;
    log::debug!("ocr found {} text regions", detections.len());
    match select_text(&detections, text) {
        Some(found) => {
            log::debug!("text {:?} at {:?} (confidence {:.2})", text, found.corners, found.confidence);
            Ok(found.corners.to_vec())
        }
        None => Ok(Vec::new()),
    }
}

pub fn text_in_image(ocr: &dyn OcrEngine, image: &DynamicImage, text: &str) -> Result<bool> {
    Ok(!locate_text(ocr, image, text)?.is_empty())
}

/// [`OcrEngine`] backed by `ocrs` with `rten` models.
///
/// `ocrs` does not report per-line confidence, so every detection carries 1.0
/// and selection among equal candidates falls back to detection order.
pub struct OcrsEngine {
    engine: ocrs::OcrEngine,
}

impl OcrsEngine {
    pub fn from_model_files(
        detection: impl AsRef<Path>,
        recognition: impl AsRef<Path>,
        beam_width: Option<u32>,
    ) -> Result<Self> {
        Self::from_model_bytes(fs::read(detection)?, fs::read(recognition)?, beam_width)
    }

    /// Greedy decoding unless `beam_width` is given.
    pub fn from_model_bytes(detection: Vec<u8>, recognition: Vec<u8>, beam_width: Option<u32>) -> Result<Self> {
        let detection_model = rten::Model::load(detection)
            .map_err(|e| NavigatorError::Ocr(format!("detection model: {:?}", e)))?;
        let recognition_model = rten::Model::load(recognition)
            .map_err(|e| NavigatorError::Ocr(format!("recognition model: {:?}", e)))?;

        let decode_method = match beam_width {
            Some(width) => DecodeMethod::BeamSearch { width: width.max(2) },
            None => DecodeMethod::Greedy,
        };
        let engine = ocrs::OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            decode_method,
            ..Default::default()
        })
        .map_err(|e| NavigatorError::Ocr(format!("engine init: {:?}", e)))?;
        log::info!("OCR engine ready (beam width {:?})", beam_width);
        Ok(Self { engine })
    }
}

impl OcrEngine for OcrsEngine {
    fn detect_and_recognize(&self, image: &DynamicImage) -> Result<Vec<TextDetection>> {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height))
            .map_err(|e| NavigatorError::Ocr(format!("image: {:?}", e)))?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|e| NavigatorError::Ocr(format!("prepare: {:?}", e)))?;
        let words = self
            .engine
            .detect_words(&input)
            .map_err(|e| NavigatorError::Ocr(format!("detect: {:?}", e)))?;
        let lines = self.engine.find_text_lines(&input, &words);
        let recognized = self
            .engine
            .recognize_text(&input, &lines)
            .map_err(|e| NavigatorError::Ocr(format!("recognize: {:?}", e)))?;

        Ok(recognized
            .into_iter()
            .flatten()
            .filter_map(|line| {
                let text = line.to_string();
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }
                let rect = line.bounding_rect();
                Some(TextDetection::from_box(
                    text,
                    1.0,
                    rect.left() as i32,
                    rect.top() as i32,
                    rect.right() as i32,
                    rect.bottom() as i32,
                ))
            })
            .collect())
    }
}
