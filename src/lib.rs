//! `game_navigator` -- screen targeting and interface navigation for
//! automating a single game window.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`errors`] | `NavigatorError` enum via `thiserror` |
//! | [`core`] | Coordinates, window adapter, `BitBlt` capture, `SendInput`, key-hold worker |
//! | [`automation`] | `imageproc` template matching, `ocrs` text location, waits, `GameController` |
//! | [`interface`] | Named screen tree with transition actions and a shared cursor |
//! | [`settings`] | JSON settings via `serde` |
//!
//! Win32 implementations are compiled on Windows only; everything else is
//! platform independent and works against the [`core::window::WindowAdapter`]
//! and [`core::input::InputDriver`] traits.

pub mod automation;
pub mod core;
pub mod errors;
pub mod interface;
pub mod settings;

#[cfg(test)]
mod testing;

pub use automation::context::GameController;
pub use automation::detection::{
    ImageprocBackend, MatchBackend, MatchCandidate, MatchMethod, MatchMode, MatchOptions, Target, VisualMatcher,
};
pub use automation::ocr::{OcrEngine, OcrsEngine, TextAnchor, TextDetection};
pub use automation::wait::{CancelFlag, WaitMode, WaitOptions};
pub use core::coords::{CoordSpace, Position, Rectangle};
pub use core::input::{InputDriver, MouseButton};
pub use core::window::{WindowAdapter, WindowHandle};
pub use errors::{NavigatorError, Result};
pub use interface::{InterfaceTree, NodeId};
pub use settings::NavigatorSettings;
