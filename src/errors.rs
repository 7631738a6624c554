//! Error types for `game_navigator`.
//!
//! Every failure in the crate is a [`NavigatorError`]. Targeting failures
//! (`OutOfBounds`, `NoMatch`, `TextNotFound`, `Timeout`) are the ones the
//! [`GameController`](crate::automation::context::GameController) writes a
//! diagnostic screenshot for before handing them back.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::core::coords::{Position, Rectangle};

pub type Result<T> = std::result::Result<T, NavigatorError>;

#[derive(Debug, Error)]
pub enum NavigatorError {
    /// The target window was not found or has closed since it was resolved.
    #[error("window unavailable: {0}")]
    WindowUnavailable(String),

    #[error("the given coordinate {point} is outside the game window bounds {bounds}")]
    OutOfBounds { point: Position, bounds: Rectangle },

    /// No template reached the threshold. Carries the closest miss.
    #[error("template matching failure: best score {best_score:.3} < {threshold:.3} at {best_location}")]
    NoMatch {
        threshold: f32,
        best_score: f32,
        best_location: Position,
    },

    #[error("text {text:?} does not exist in the capture")]
    TextNotFound { text: String },

    #[error("channel mismatch: {0}")]
    ChannelMismatch(String),

    #[error("template {template:?} is larger than the image {image:?}")]
    TemplateTooLarge { template: (u32, u32), image: (u32, u32) },

    #[error("wait timeout after {timeout:?} (spacing {spacing:?})")]
    Timeout { timeout: Duration, spacing: Duration },

    #[error("wait cancelled")]
    Cancelled,

    #[error("a sub-interface named {name:?} already exists under {parent:?}")]
    DuplicateName { parent: String, name: String },

    #[error("interface {parent:?} has no sub-interface named {name:?}")]
    ChildNotFound { parent: String, name: String },

    #[error("interface {0:?} has no transition action bound")]
    NoActionBound(String),

    #[error("interface {0:?} is already attached to a parent")]
    AlreadyAttached(String),

    #[error("cannot attach {child:?} under {parent:?}: would create a cycle")]
    InvalidAttachment { parent: String, child: String },

    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error("unknown key name {0:?}")]
    UnknownKey(String),

    #[error("input error: {0}")]
    Input(String),

    #[error("capture error: {0}")]
    Capture(String),

    #[error("ocr error: {0}")]
    Ocr(String),

    #[error("failed to load template {path:?}: {source}")]
    TemplateLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),
}

impl NavigatorError {
    /// Failures that mean "the target was not where we looked". The
    /// controller captures a diagnostic screenshot for these.
    pub fn is_targeting_failure(&self) -> bool {
        matches!(
            self,
            NavigatorError::OutOfBounds { .. }
                | NavigatorError::NoMatch { .. }
                | NavigatorError::TextNotFound { .. }
                | NavigatorError::Timeout { .. }
        )
    }
}

#[cfg(windows)]
impl From<windows::core::Error> for NavigatorError {
    fn from(err: windows::core::Error) -> Self {
        NavigatorError::WindowUnavailable(format!("Win32 error: {err}"))
    }
}
