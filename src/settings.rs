use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::automation::detection::{MatchMethod, MatchMode, MatchOptions};
use crate::automation::wait::{WaitMode, WaitOptions};
use crate::errors::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavigatorSettings {
    #[serde(default)]
    pub window: WindowSettings,

    #[serde(default)]
    pub matching: MatchingSettings,

    #[serde(default)]
    pub wait: WaitSettings,

    #[serde(default)]
    pub input: InputSettings,

    #[serde(default)]
    pub diagnostics: DiagnosticsSettings,

    #[serde(default)]
    pub ocr: OcrSettings,
}

/// How the game window is found.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WindowSettings {
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    #[serde(default)]
    pub mode: MatchMode,
    #[serde(default)]
    pub method: MatchMethod,
    #[serde(default = "default_binary_cutoff")]
    pub binary_cutoff: u8,
    #[serde(default = "default_binary_max")]
    pub binary_max: u8,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            mode: MatchMode::default(),
            method: MatchMethod::default(),
            binary_cutoff: default_binary_cutoff(),
            binary_max: default_binary_max(),
        }
    }
}

impl MatchingSettings {
    pub fn options(&self) -> MatchOptions {
        MatchOptions {
            mode: self.mode,
            method: self.method,
            binary_cutoff: self.binary_cutoff,
            binary_max: self.binary_max,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitSettings {
    #[serde(default = "default_wait_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_wait_spacing_ms")]
    pub spacing_ms: u64,
    #[serde(default)]
    pub mode: WaitMode,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_wait_timeout_ms(),
            spacing_ms: default_wait_spacing_ms(),
            mode: WaitMode::default(),
        }
    }
}

/// Pauses around input, all in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSettings {
    /// Settle time after bringing the window to the front.
    #[serde(default = "default_focus_settle_ms")]
    pub focus_settle_ms: u64,
    #[serde(default = "default_click_hold_ms")]
    pub click_hold_ms: u64,
    #[serde(default = "default_scroll_pause_ms")]
    pub scroll_pause_ms: u64,
    #[serde(default = "default_drag_ms")]
    pub drag_ms: u64,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            focus_settle_ms: default_focus_settle_ms(),
            click_hold_ms: default_click_hold_ms(),
            scroll_pause_ms: default_scroll_pause_ms(),
            drag_ms: default_drag_ms(),
        }
    }
}

impl InputSettings {
    pub fn focus_settle(&self) -> Duration {
        Duration::from_millis(self.focus_settle_ms)
    }

    pub fn click_hold(&self) -> Duration {
        Duration::from_millis(self.click_hold_ms)
    }

    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }

    pub fn drag(&self) -> Duration {
        Duration::from_millis(self.drag_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticsSettings {
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl DiagnosticsSettings {
    /// Screenshots are written only in debug mode with a directory set.
    pub fn enabled(&self) -> bool {
        self.debug && self.directory.is_some()
    }
}

/// Model files for the `ocrs` engine. OCR is off unless both are set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrSettings {
    #[serde(default)]
    pub detection_model: Option<PathBuf>,
    #[serde(default)]
    pub recognition_model: Option<PathBuf>,
    /// Beam search width; greedy decoding when absent.
    #[serde(default)]
    pub beam_width: Option<u32>,
}

fn default_threshold() -> f32 {
    0.8
}

fn default_binary_cutoff() -> u8 {
    127
}

fn default_binary_max() -> u8 {
    255
}

fn default_wait_timeout_ms() -> u64 {
    60_000
}

fn default_wait_spacing_ms() -> u64 {
    1_000
}

fn default_focus_settle_ms() -> u64 {
    1_000
}

fn default_click_hold_ms() -> u64 {
    150
}

fn default_scroll_pause_ms() -> u64 {
    100
}

fn default_drag_ms() -> u64 {
    1_000
}

impl NavigatorSettings {
    pub const SETTINGS_FILE: &'static str = "navigator_settings.json";

    /// Load settings from `path`, or defaults if the file doesn't exist.
    /// A file that exists but doesn't parse is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        match fs::read_to_string(path.as_ref()) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("no settings at {}, using defaults", path.as_ref().display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Polling defaults for `wait_image`, from the wait and matching sections.
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            mode: self.wait.mode,
            timeout: Duration::from_millis(self.wait.timeout_ms),
            spacing: Duration::from_millis(self.wait.spacing_ms),
            threshold: self.matching.threshold,
            matching: self.matching.options(),
            cancel: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::NavigatorError;

    #[test]
    fn test_defaults() {
        let s = NavigatorSettings::default();
        assert_eq!(s.matching.threshold, 0.8);
        assert_eq!(s.matching.options(), MatchOptions::default());
        assert_eq!(s.input.click_hold(), Duration::from_millis(150));
        assert!(!s.diagnostics.enabled());

        let wait = s.wait_options();
        assert_eq!(wait.timeout, Duration::from_secs(60));
        assert_eq!(wait.spacing, Duration::from_secs(1));
        assert_eq!(wait.mode, WaitMode::Any);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = NavigatorSettings::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(s.wait.timeout_ms, 60_000);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        fs::write(&path, r#"{"window": {"title": "Game"}, "matching": {"mode": "binary"}}"#).unwrap();

        let s = NavigatorSettings::load(&path).unwrap();
        assert_eq!(s.window.title, "Game");
        assert_eq!(s.window.class_name, None);
        assert_eq!(s.matching.mode, MatchMode::Binary);
        assert_eq!(s.matching.binary_cutoff, 127);
        assert_eq!(s.input.focus_settle_ms, 1_000);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(NavigatorSettings::SETTINGS_FILE);
        let mut s = NavigatorSettings::default();
        s.diagnostics.debug = true;
        s.diagnostics.directory = Some(dir.path().join("shots"));
        s.wait.mode = WaitMode::All;
        s.save(&path).unwrap();

        let loaded = NavigatorSettings::load(&path).unwrap();
        assert!(loaded.diagnostics.enabled());
        assert_eq!(loaded.wait.mode, WaitMode::All);
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(NavigatorSettings::load(&path), Err(NavigatorError::Settings(_))));
    }
}
