//! Coordinate model and the OS boundary: window adapter, screen capture,
//! input dispatch, and the background key-hold worker.

pub mod coords;
pub mod input;
#[cfg(windows)]
pub mod screen_capture;
pub mod window;
pub mod worker;
