//! Recognition and orchestration: template matching, OCR, polling, mouse
//! sequences, diagnostics and the [`context::GameController`] tying them
//! to a window.

pub mod context;
pub mod detection;
pub mod diagnostics;
pub mod interaction;
pub mod ocr;
pub mod wait;
