use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use image::DynamicImage;

use crate::automation::detection::{MatchCandidate, MatchOptions, Target, VisualMatcher};
use crate::automation::diagnostics::{DiagnosticSink, DirectorySink};
use crate::automation::interaction::{click_at_screen, delay, drag, scroll_at};
use crate::automation::ocr::{locate_text, OcrEngine, TextAnchor};
use crate::automation::wait::{wait_for, WaitOptions};
use crate::core::coords::{self, Position, Rectangle};
use crate::core::input::{InputDriver, MouseButton};
use crate::core::window::{WindowAdapter, WindowHandle};
use crate::core::worker::{self, HoldHandle};
use crate::errors::{NavigatorError, Result};
use crate::settings::NavigatorSettings;

/// Drives one game window: re-resolves it, brings it to the front, resolves
/// targets and dispatches input. Targeting failures leave a diagnostic
/// screenshot behind (in debug mode) and are returned unchanged.
pub struct GameController {
    window: Box<dyn WindowAdapter>,
    input: Arc<dyn InputDriver>,
    matcher: VisualMatcher,
    ocr: Option<Box<dyn OcrEngine>>,
    diagnostics: Option<Box<dyn DiagnosticSink>>,
    settings: NavigatorSettings,
    screenshot: Option<DynamicImage>,
}

impl GameController {
    pub fn new(
        window: impl WindowAdapter + 'static,
        input: Arc<dyn InputDriver>,
        matcher: VisualMatcher,
        settings: NavigatorSettings,
    ) -> Self {
        let diagnostics = match &settings.diagnostics.directory {
            Some(dir) if settings.diagnostics.enabled() => {
                Some(Box::new(DirectorySink::new(dir.clone())) as Box<dyn DiagnosticSink>)
            }
            _ => None,
        };
        Self {
            window: Box::new(window),
            input,
            matcher,
            ocr: None,
            diagnostics,
            settings,
            screenshot: None,
        }
    }

    /// Win32 window and `SendInput`, `imageproc` matching, and `ocrs` when
    /// both model paths are configured.
    #[cfg(windows)]
    pub fn from_settings(settings: NavigatorSettings) -> Result<Self> {
        use crate::automation::detection::ImageprocBackend;
        use crate::automation::ocr::OcrsEngine;
        use crate::core::input::SendInputDriver;
        use crate::core::window::Win32Window;

        let ocr = match (&settings.ocr.detection_model, &settings.ocr.recognition_model) {
            (Some(det), Some(rec)) => Some(OcrsEngine::from_model_files(det, rec, settings.ocr.beam_width)?),
            _ => None,
        };
        let window = Win32Window::new(settings.window.class_name.clone(), settings.window.title.clone());
        let mut controller = Self::new(
            window,
            Arc::new(SendInputDriver::new()),
            VisualMatcher::new(ImageprocBackend::new()),
            settings,
        );
        if let Some(engine) = ocr {
            controller = controller.with_ocr(engine);
        }
        Ok(controller)
    }

    pub fn with_ocr(mut self, ocr: impl OcrEngine + 'static) -> Self {
        self.ocr = Some(Box::new(ocr));
        self
    }

    /// Replace the directory sink. Saving still requires debug mode.
    pub fn with_diagnostic_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.diagnostics = Some(Box::new(sink));
        self
    }

    pub fn settings(&self) -> &NavigatorSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut NavigatorSettings {
        &mut self.settings
    }

    /// The most recent capture taken by any operation.
    pub fn screenshot(&self) -> Option<&DynamicImage> {
        self.screenshot.as_ref()
    }

    pub fn handle(&self) -> Result<WindowHandle> {
        self.window.resolve()
    }

    pub fn rect(&self) -> Result<Rectangle> {
        let handle = self.window.resolve()?;
        self.window.rect(&handle)
    }

    pub fn width(&self) -> Result<i32> {
        Ok(self.rect()?.width())
    }

    pub fn height(&self) -> Result<i32> {
        Ok(self.rect()?.height())
    }

    pub fn top_left(&self) -> Result<Position> {
        Ok(self.rect()?.top_left())
    }

    pub fn scale_factor(&self) -> Result<f64> {
        let handle = self.window.resolve()?;
        self.window.scale_factor(&handle)
    }

    pub fn name(&self) -> Result<String> {
        Ok(self.window.resolve()?.title)
    }

    pub fn class_name(&self) -> Result<String> {
        Ok(self.window.resolve()?.class_name)
    }

    /// Resolve the window and bring it to the front if it isn't already.
    pub fn set_foreground(&self) -> Result<WindowHandle> {
        let handle = self.window.resolve()?;
        if !self.window.is_foreground(&handle)? {
            log::debug!("bringing {:?} to the foreground", handle.title);
            self.window.bring_to_foreground(&handle)?;
            delay(self.settings.input.focus_settle());
        }
        Ok(handle)
    }

    pub fn capture(&mut self) -> Result<&DynamicImage> {
        let handle = self.set_foreground()?;
        let frame = self.window.capture(&handle)?;
        Ok(&*self.screenshot.insert(frame))
    }

    fn grab(&mut self, handle: &WindowHandle) -> Result<DynamicImage> {
        let frame = self.window.capture(handle)?;
        self.screenshot = Some(frame.clone());
        Ok(frame)
    }

    /// Save the last capture (or a fresh one if there is none) through the
    /// diagnostic sink. Best-effort: failures are logged, never returned.
    pub fn save_diagnostic(&self, label: &str) -> Option<PathBuf> {
        self.save_diagnostic_from(label, true)
    }

    /// With `reuse_last` false a new capture is always taken, for operations
    /// that never captured and would otherwise save an older frame.
    fn save_diagnostic_from(&self, label: &str, reuse_last: bool) -> Option<PathBuf> {
        if !self.settings.diagnostics.debug {
            return None;
        }
        let sink = self.diagnostics.as_ref()?;

        let fresh;
        let image = match self.screenshot.as_ref().filter(|_| reuse_last) {
            Some(image) => image,
            None => {
                fresh = match self.window.resolve().and_then(|h| self.window.capture(&h)) {
                    Ok(image) => image,
                    Err(e) => {
                        log::warn!("no diagnostic screenshot for {:?}: {}", label, e);
                        return None;
                    }
                };
                &fresh
            }
        };

        match sink.save(image, label, Local::now()) {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("failed to save diagnostic screenshot {:?}: {}", label, e);
                None
            }
        }
    }

    /// For operations that captured the frame they failed on.
    fn report<T>(&self, result: Result<T>) -> Result<T> {
        self.report_from(result, true)
    }

    /// For pointer operations, which never capture.
    fn report_fresh<T>(&self, result: Result<T>) -> Result<T> {
        self.report_from(result, false)
    }

    fn report_from<T>(&self, result: Result<T>, reuse_last: bool) -> Result<T> {
        if let Err(err) = &result {
            if err.is_targeting_failure() {
                self.save_diagnostic_from("Error", reuse_last);
            }
        }
        result
    }

    fn to_screen(&self, handle: &WindowHandle, pos: Position) -> Result<Position> {
        let rect = self.window.rect(handle)?;
        coords::resolve(pos, rect)
    }

    fn click_at(&self, handle: &WindowHandle, pos: Position, button: MouseButton) -> Result<Position> {
        let point = self.to_screen(handle, pos)?;
        click_at_screen(self.input.as_ref(), point, button, self.settings.input.click_hold())?;
        Ok(point)
    }

    /// Left-click `pos`. Window-space points are offset by the window's
    /// top-left; both kinds must land inside the window.
    pub fn click_pos(&mut self, pos: Position) -> Result<Position> {
        self.click_pos_with(pos, MouseButton::Left)
    }

    pub fn click_pos_with(&mut self, pos: Position, button: MouseButton) -> Result<Position> {
        let result = self.set_foreground().and_then(|handle| self.click_at(&handle, pos, button));
        self.report_fresh(result)
    }

    pub fn move_to(&mut self, pos: Position, duration: Duration) -> Result<Position> {
        let result = self.set_foreground().and_then(|handle| {
            let point = self.to_screen(&handle, pos)?;
            self.input.move_to(point, duration)?;
            Ok(point)
        });
        self.report_fresh(result)
    }

    /// Left-button drag over the configured drag duration.
    pub fn drag(&mut self, start: Position, end: Position) -> Result<()> {
        let result = self.set_foreground().and_then(|handle| {
            let from = self.to_screen(&handle, start)?;
            let to = self.to_screen(&handle, end)?;
            drag(self.input.as_ref(), from, to, self.settings.input.drag())
        });
        self.report_fresh(result)
    }

    /// Scroll `notches` at `pos`, `repetitions` times. Positive is up.
    pub fn scroll(&mut self, pos: Position, notches: i32, repetitions: u32, travel: Duration) -> Result<()> {
        let result = self.set_foreground().and_then(|handle| {
            let point = self.to_screen(&handle, pos)?;
            scroll_at(
                self.input.as_ref(),
                point,
                notches,
                repetitions,
                travel,
                self.settings.input.scroll_pause(),
            )
        });
        self.report_fresh(result)
    }

    /// Best match among `targets` on a fresh capture, with the configured
    /// threshold and match options. Does not click.
    pub fn locate_image(&mut self, targets: &[Target]) -> Result<MatchCandidate> {
        let threshold = self.settings.matching.threshold;
        let options = self.settings.matching.options();
        let result = self.set_foreground().and_then(|handle| {
            let frame = self.grab(&handle)?;
            self.matcher.match_best_of(&frame, targets, threshold, &options)
        });
        self.report(result)
    }

    pub fn image_exists(&mut self, targets: &[Target]) -> Result<bool> {
        let threshold = self.settings.matching.threshold;
        let options = self.settings.matching.options();
        let handle = self.set_foreground()?;
        let frame = self.grab(&handle)?;
        match self.matcher.match_best_of(&frame, targets, threshold, &options) {
            Ok(_) => Ok(true),
            Err(NavigatorError::NoMatch { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Every window-space location where `target` scores at least `threshold`.
    pub fn find_all(&mut self, target: &Target, threshold: f32) -> Result<Vec<Position>> {
        let handle = self.set_foreground()?;
        let frame = self.grab(&handle)?;
        self.matcher.find_all(&frame, target, threshold)
    }

    pub fn click_image(&mut self, targets: &[Target]) -> Result<MatchCandidate> {
        let threshold = self.settings.matching.threshold;
        let options = self.settings.matching.options();
        self.click_image_with(targets, threshold, &options, MouseButton::Left)
    }

    /// Click the center of the first target reaching `threshold`.
    pub fn click_image_with(
        &mut self,
        targets: &[Target],
        threshold: f32,
        options: &MatchOptions,
        button: MouseButton,
    ) -> Result<MatchCandidate> {
        let result = self.set_foreground().and_then(|handle| {
            let frame = self.grab(&handle)?;
            let candidate = self.matcher.match_best_of(&frame, targets, threshold, options)?;
            self.click_at(&handle, candidate.center(), button)?;
            Ok(candidate)
        });
        self.report(result)
    }

    pub fn wait_image(&mut self, targets: &[Target]) -> Result<()> {
        let options = self.settings.wait_options();
        self.wait_image_with(targets, &options)
    }

    pub fn wait_image_with(&mut self, targets: &[Target], options: &WaitOptions) -> Result<()> {
        let result = self.set_foreground().and_then(|handle| {
            let window = &self.window;
            let screenshot = &mut self.screenshot;
            let capture = || -> Result<DynamicImage> {
                let frame = window.capture(&handle)?;
                *screenshot = Some(frame.clone());
                Ok(frame)
            };
            wait_for(capture, &self.matcher, targets, options)
        });
        self.report(result)
    }

    fn ocr(&self) -> Result<&dyn OcrEngine> {
        self.ocr
            .as_deref()
            .ok_or(NavigatorError::Unsupported("no OCR engine configured"))
    }

    /// Click `anchor` of the box around `text` on a fresh capture.
    pub fn click_text(&mut self, text: &str, anchor: TextAnchor) -> Result<Position> {
        let result = self.click_text_inner(text, anchor);
        self.report(result)
    }

    fn click_text_inner(&mut self, text: &str, anchor: TextAnchor) -> Result<Position> {
        self.ocr()?;
        let handle = self.set_foreground()?;
        let frame = self.grab(&handle)?;
        let corners = locate_text(self.ocr()?, &frame, text)?;
        let point = anchor.point(&corners).ok_or_else(|| {
            log::error!("{:?} does not exist on the screen", text);
            NavigatorError::TextNotFound { text: text.to_string() }
        })?;
        self.click_at(&handle, point, MouseButton::Left)
    }

    pub fn text_exists(&mut self, text: &str) -> Result<bool> {
        self.ocr()?;
        let handle = self.set_foreground()?;
        let frame = self.grab(&handle)?;
        Ok(!locate_text(self.ocr()?, &frame, text)?.is_empty())
    }

    pub fn press(&self, key: &str) -> Result<()> {
        self.set_foreground()?;
        self.input.key_press(key)?;
        log::debug!("keyboard press: {}", key);
        Ok(())
    }

    /// Hold `key` for `duration`, blocking the caller.
    pub fn hold_key(&self, key: &str, duration: Duration) -> Result<()> {
        self.set_foreground()?;
        worker::hold_key(self.input.as_ref(), key, duration)
    }

    /// Hold `key` for `duration` on a worker thread.
    pub fn hold_key_background(&self, key: &str, duration: Duration) -> Result<HoldHandle> {
        self.set_foreground()?;
        Ok(worker::spawn_key_hold(self.input.clone(), key.to_string(), duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        detection, scripted_target, FakeWindow, FixedOcr, InputEvent, RecordingInput, ScriptedBackend,
    };
    use std::path::Path;

    fn fast_settings() -> NavigatorSettings {
        let mut s = NavigatorSettings::default();
        s.input.focus_settle_ms = 0;
        s.input.click_hold_ms = 0;
        s.input.scroll_pause_ms = 0;
        s.input.drag_ms = 0;
        s.wait.spacing_ms = 1;
        s.wait.timeout_ms = 50;
        s
    }

    fn debug_settings(dir: &Path) -> NavigatorSettings {
        let mut s = fast_settings();
        s.diagnostics.debug = true;
        s.diagnostics.directory = Some(dir.to_path_buf());
        s
    }

    fn controller(backend: ScriptedBackend, settings: NavigatorSettings) -> (GameController, FakeWindow, RecordingInput) {
        let window = FakeWindow::default();
        let input = RecordingInput::default();
        let c = GameController::new(window.clone(), Arc::new(input.clone()), VisualMatcher::new(backend), settings);
        (c, window, input)
    }

    fn saved_files(dir: &Path) -> Vec<String> {
        match std::fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    fn clicked(p: Position) -> Vec<InputEvent> {
        vec![
            InputEvent::Move(p, Duration::ZERO),
            InputEvent::Down(p, MouseButton::Left),
            InputEvent::Up(p, MouseButton::Left),
        ]
    }

    #[test]
    fn test_click_pos_converts_window_space() {
        let (mut c, _, input) = controller(ScriptedBackend::default(), fast_settings());
        let point = c.click_pos(Position::window(10, 20)).unwrap();
        assert_eq!(point, Position::screen(110, 120));
        assert_eq!(input.events(), clicked(Position::screen(110, 120)));
    }

    #[test]
    fn test_click_pos_screen_passthrough() {
        let (mut c, _, input) = controller(ScriptedBackend::default(), fast_settings());
        c.click_pos(Position::screen(500, 500)).unwrap();
        assert_eq!(input.events(), clicked(Position::screen(500, 500)));
    }

    #[test]
    fn test_out_of_bounds_saves_diagnostic_and_reraises() {
        let dir = tempfile::tempdir().unwrap();
        let (mut c, window, input) = controller(ScriptedBackend::default(), debug_settings(dir.path()));

        let err = c.click_pos(Position::window(900, 10)).unwrap_err();
        match err {
            NavigatorError::OutOfBounds { point, bounds } => {
                assert_eq!(point, Position::screen(1000, 110));
                assert_eq!(bounds, Rectangle::new(100, 100, 900, 700));
            }
            other => panic!("expected OutOfBounds, got {other:?}"),
        }
        assert!(input.events().is_empty());
        // no prior screenshot, so a fresh one was taken
        assert_eq!(window.state.captures.get(), 1);
        let files = saved_files(dir.path());
        assert_eq!(files.len(), 1);
        assert!(files[0].starts_with("[Error]") && files[0].ends_with(".png"));
    }

    #[test]
    fn test_no_diagnostic_without_debug() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = debug_settings(&dir.path().join("shots"));
        settings.diagnostics.debug = false;
        let (mut c, window, _) = controller(ScriptedBackend::default(), settings);
        assert!(c.diagnostics.is_none());

        assert!(c.click_pos(Position::screen(0, 0)).is_err());
        assert!(saved_files(&dir.path().join("shots")).is_empty());
        assert_eq!(window.state.captures.get(), 0);
    }

    #[test]
    fn test_debug_without_directory_has_no_sink() {
        let mut settings = fast_settings();
        settings.diagnostics.debug = true;
        let (c, _, _) = controller(ScriptedBackend::default(), settings);
        assert!(c.diagnostics.is_none());
        assert_eq!(c.save_diagnostic("Manual"), None);
    }

    #[test]
    fn test_pointer_failure_saves_fresh_capture() {
        let dir = tempfile::tempdir().unwrap();
        let backend = ScriptedBackend::with_scores(&[(1, &[0.9])]);
        let (mut c, window, _) = controller(backend, debug_settings(dir.path()));

        c.click_image(&[scripted_target(1)]).unwrap();
        assert_eq!(window.state.captures.get(), 1);

        assert!(c.click_pos(Position::window(900, 10)).is_err());
        // the click_image frame is stale, so a new capture is taken
        assert_eq!(window.state.captures.get(), 2);
        assert_eq!(saved_files(dir.path()).len(), 1);
    }

    #[test]
    fn test_foreground_reasserted_once() {
        let (mut c, window, _) = controller(ScriptedBackend::default(), fast_settings());
        window.state.foreground.set(false);

        c.click_pos(Position::window(1, 1)).unwrap();
        c.click_pos(Position::window(2, 2)).unwrap();
        assert_eq!(window.state.raised.get(), 1);
    }

    #[test]
    fn test_click_image_clicks_center() {
        let backend = ScriptedBackend::with_scores(&[(1, &[0.6]), (2, &[0.9])]);
        let (mut c, _, input) = controller(backend, fast_settings());

        let candidate = c.click_image(&[scripted_target(1), scripted_target(2)]).unwrap();
        assert_eq!(candidate.location, Position::window(20, 10));
        // 2x2 template at (20, 10) in a window at (100, 100)
        assert_eq!(input.events(), clicked(Position::screen(121, 111)));
        assert!(c.screenshot().is_some());
    }

    #[test]
    fn test_click_image_no_match() {
        let dir = tempfile::tempdir().unwrap();
        let backend = ScriptedBackend::with_scores(&[(1, &[0.5]), (2, &[0.6])]);
        let (mut c, window, input) = controller(backend, debug_settings(dir.path()));

        let err = c.click_image(&[scripted_target(1), scripted_target(2)]).unwrap_err();
        assert!(matches!(err, NavigatorError::NoMatch { best_score, .. } if best_score == 0.6));
        assert!(input.events().is_empty());
        // the match capture is reused for the diagnostic
        assert_eq!(window.state.captures.get(), 1);
        assert_eq!(saved_files(dir.path()).len(), 1);
    }

    #[test]
    fn test_image_exists() {
        let backend = ScriptedBackend::with_scores(&[(1, &[0.5, 0.95])]);
        let (mut c, _, _) = controller(backend, fast_settings());
        assert!(!c.image_exists(&[scripted_target(1)]).unwrap());
        assert!(c.image_exists(&[scripted_target(1)]).unwrap());
    }

    #[test]
    fn test_click_text() {
        let (c, _, input) = controller(ScriptedBackend::default(), fast_settings());
        let mut c = c.with_ocr(FixedOcr::new(vec![detection("Start", 0.9, 10, 10, 50, 30)]));

        let point = c.click_text("Start", TextAnchor::Center).unwrap();
        assert_eq!(point, Position::screen(130, 120));
        assert_eq!(input.events(), clicked(Position::screen(130, 120)));

        assert!(c.text_exists("Sta").unwrap());
        assert!(!c.text_exists("Quit").unwrap());
    }

    #[test]
    fn test_click_text_missing() {
        let dir = tempfile::tempdir().unwrap();
        let (c, _, input) = controller(ScriptedBackend::default(), debug_settings(dir.path()));
        let mut c = c.with_ocr(FixedOcr::new(vec![detection("Options", 0.9, 10, 10, 50, 30)]));

        let err = c.click_text("Start", TextAnchor::Left).unwrap_err();
        assert!(matches!(err, NavigatorError::TextNotFound { ref text } if text == "Start"));
        assert!(input.events().is_empty());
        assert_eq!(saved_files(dir.path()).len(), 1);
    }

    #[test]
    fn test_click_text_without_ocr() {
        let (mut c, window, _) = controller(ScriptedBackend::default(), fast_settings());
        let err = c.click_text("Start", TextAnchor::Center).unwrap_err();
        assert!(matches!(err, NavigatorError::Unsupported(_)));
        assert_eq!(window.state.captures.get(), 0);
    }

    #[test]
    fn test_wait_image_records_last_capture() {
        let backend = ScriptedBackend::with_scores(&[(1, &[0.1, 0.9])]);
        let (mut c, window, _) = controller(backend, fast_settings());

        c.wait_image(&[scripted_target(1)]).unwrap();
        assert_eq!(window.state.captures.get(), 2);
        assert!(c.screenshot().is_some());
    }

    #[test]
    fn test_wait_image_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let (mut c, _, _) = controller(ScriptedBackend::default(), debug_settings(dir.path()));

        let err = c.wait_image(&[scripted_target(1)]).unwrap_err();
        assert!(matches!(err, NavigatorError::Timeout { .. }));
        assert_eq!(saved_files(dir.path()).len(), 1);
    }

    #[test]
    fn test_closed_window_is_not_a_targeting_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (mut c, window, input) = controller(ScriptedBackend::default(), debug_settings(dir.path()));
        window.state.closed.set(true);

        let err = c.click_pos(Position::window(1, 1)).unwrap_err();
        assert!(matches!(err, NavigatorError::WindowUnavailable(_)));
        assert!(input.events().is_empty());
        assert!(saved_files(dir.path()).is_empty());
    }

    #[test]
    fn test_geometry_is_read_fresh() {
        let (c, window, _) = controller(ScriptedBackend::default(), fast_settings());
        assert_eq!(c.width().unwrap(), 800);
        assert_eq!(c.height().unwrap(), 600);
        assert_eq!(c.top_left().unwrap(), Position::screen(100, 100));
        assert_eq!(c.scale_factor().unwrap(), 1.25);
        assert_eq!(c.name().unwrap(), "Fake Game");
        assert_eq!(c.class_name().unwrap(), "FakeClass");

        window.state.rect.set(Rectangle::new(0, 0, 640, 480));
        assert_eq!(c.width().unwrap(), 640);
    }

    #[test]
    fn test_scroll_and_drag() {
        let (mut c, _, input) = controller(ScriptedBackend::default(), fast_settings());
        c.scroll(Position::window(10, 10), -2, 2, Duration::ZERO).unwrap();
        c.drag(Position::window(0, 0), Position::window(50, 0)).unwrap();

        let (a, b) = (Position::screen(100, 100), Position::screen(150, 100));
        assert_eq!(
            input.events(),
            vec![
                InputEvent::Move(Position::screen(110, 110), Duration::ZERO),
                InputEvent::Scroll(-2),
                InputEvent::Scroll(-2),
                InputEvent::Move(a, Duration::ZERO),
                InputEvent::Down(a, MouseButton::Left),
                InputEvent::Move(b, Duration::ZERO),
                InputEvent::Up(b, MouseButton::Left),
            ]
        );
    }

    #[test]
    fn test_drag_out_of_bounds_sends_nothing() {
        let (mut c, _, input) = controller(ScriptedBackend::default(), fast_settings());
        let err = c.drag(Position::window(0, 0), Position::window(5000, 0)).unwrap_err();
        assert!(matches!(err, NavigatorError::OutOfBounds { .. }));
        assert!(input.events().is_empty());
    }

    #[test]
    fn test_keyboard() {
        let (c, _, input) = controller(ScriptedBackend::default(), fast_settings());
        c.press("enter").unwrap();
        c.hold_key_background("w", Duration::from_millis(10)).unwrap().join().unwrap();
        assert_eq!(
            input.events(),
            vec![
                InputEvent::KeyDown("enter".into()),
                InputEvent::KeyUp("enter".into()),
                InputEvent::KeyDown("w".into()),
                InputEvent::KeyUp("w".into()),
            ]
        );
        assert!(matches!(c.press(RecordingInput::REJECTED_KEY), Err(NavigatorError::UnknownKey(_))));
    }
}
