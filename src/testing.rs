//! In-memory fakes for the platform and recognition boundaries.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{DynamicImage, RgbImage};

use crate::automation::detection::{MatchBackend, MatchMethod, ScoreExtremes, Target};
use crate::automation::ocr::{OcrEngine, TextDetection};
use crate::core::coords::{Position, Rectangle};
use crate::core::input::{virtual_key_code, InputDriver, MouseButton};
use crate::core::window::{WindowAdapter, WindowHandle};
use crate::errors::{NavigatorError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Move(Position, Duration),
    Down(Position, MouseButton),
    Up(Position, MouseButton),
    Scroll(i32),
    KeyDown(String),
    KeyUp(String),
}

/// Records every event. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingInput {
    log: Arc<Mutex<Vec<InputEvent>>>,
}

impl RecordingInput {
    /// A key name the fake refuses, like a real driver would.
    pub const REJECTED_KEY: &'static str = "not-a-key";

    pub fn events(&self) -> Vec<InputEvent> {
        self.log.lock().unwrap().clone()
    }

    fn push(&self, event: InputEvent) {
        self.log.lock().unwrap().push(event);
    }

    fn check_key(key: &str) -> Result<()> {
        virtual_key_code(key)
            .map(|_| ())
            .ok_or_else(|| NavigatorError::UnknownKey(key.to_string()))
    }
}

impl InputDriver for RecordingInput {
    fn move_to(&self, point: Position, duration: Duration) -> Result<()> {
        self.push(InputEvent::Move(point, duration));
        Ok(())
    }

    fn button_down(&self, point: Position, button: MouseButton) -> Result<()> {
        self.push(InputEvent::Down(point, button));
        Ok(())
    }

    fn button_up(&self, point: Position, button: MouseButton) -> Result<()> {
        self.push(InputEvent::Up(point, button));
        Ok(())
    }

    fn scroll(&self, notches: i32) -> Result<()> {
        self.push(InputEvent::Scroll(notches));
        Ok(())
    }

    fn key_down(&self, key: &str) -> Result<()> {
        Self::check_key(key)?;
        self.push(InputEvent::KeyDown(key.to_string()));
        Ok(())
    }

    fn key_up(&self, key: &str) -> Result<()> {
        Self::check_key(key)?;
        self.push(InputEvent::KeyUp(key.to_string()));
        Ok(())
    }
}

#[derive(Debug)]
pub struct WindowState {
    pub rect: Cell<Rectangle>,
    pub frame: RefCell<DynamicImage>,
    pub foreground: Cell<bool>,
    pub raised: Cell<u32>,
    pub captures: Cell<u32>,
    pub closed: Cell<bool>,
}

/// A window at (100, 100, 900, 700) showing a blank 64x48 RGB frame.
#[derive(Debug, Clone)]
pub struct FakeWindow {
    pub state: Rc<WindowState>,
}

impl Default for FakeWindow {
    fn default() -> Self {
        Self {
            state: Rc::new(WindowState {
                rect: Cell::new(Rectangle::new(100, 100, 900, 700)),
                frame: RefCell::new(DynamicImage::ImageRgb8(RgbImage::new(64, 48))),
                foreground: Cell::new(true),
                raised: Cell::new(0),
                captures: Cell::new(0),
                closed: Cell::new(false),
            }),
        }
    }
}

impl WindowAdapter for FakeWindow {
    fn resolve(&self) -> Result<WindowHandle> {
        if self.state.closed.get() {
            return Err(NavigatorError::WindowUnavailable("fake window closed".into()));
        }
        Ok(WindowHandle { id: 1, title: "Fake Game".into(), class_name: "FakeClass".into() })
    }

    fn rect(&self, _handle: &WindowHandle) -> Result<Rectangle> {
        Ok(self.state.rect.get())
    }

    fn scale_factor(&self, _handle: &WindowHandle) -> Result<f64> {
        Ok(1.25)
    }

    fn bring_to_foreground(&self, _handle: &WindowHandle) -> Result<()> {
        self.state.raised.set(self.state.raised.get() + 1);
        self.state.foreground.set(true);
        Ok(())
    }

    fn capture(&self, _handle: &WindowHandle) -> Result<DynamicImage> {
        self.state.captures.set(self.state.captures.get() + 1);
        Ok(self.state.frame.borrow().clone())
    }

    fn is_foreground(&self, _handle: &WindowHandle) -> Result<bool> {
        Ok(self.state.foreground.get())
    }
}

#[derive(Debug, Default)]
struct Script {
    queues: HashMap<u8, VecDeque<f32>>,
    last: HashMap<u8, f32>,
    calls: HashMap<u8, u32>,
    channels: Vec<(u8, u8)>,
}

/// Scores templates by their width (the "id"). Each id replays a queue of
/// scores, one per call, then repeats the last one. Unknown ids score 0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBackend {
    script: Rc<RefCell<Script>>,
}

impl ScriptedBackend {
    pub fn with_scores(entries: &[(u8, &[f32])]) -> Self {
        let backend = Self::default();
        {
            let mut script = backend.script.borrow_mut();
            for (id, scores) in entries {
                script.queues.insert(*id, scores.iter().copied().collect());
            }
        }
        backend
    }

    /// How many times the template with this id was scored.
    pub fn calls(&self, id: u8) -> u32 {
        self.script.borrow().calls.get(&id).copied().unwrap_or(0)
    }

    /// Channel counts of (image, template) for every scoring call.
    pub fn channel_log(&self) -> Vec<(u8, u8)> {
        self.script.borrow().channels.clone()
    }
}

impl MatchBackend for ScriptedBackend {
    fn score(&self, image: &DynamicImage, template: &DynamicImage, _method: MatchMethod) -> Result<ScoreExtremes> {
        let id = template.width() as u8;
        let mut script = self.script.borrow_mut();
        script
            .channels
            .push((image.color().channel_count(), template.color().channel_count()));
        *script.calls.entry(id).or_insert(0) += 1;

        let next = script.queues.get_mut(&id).and_then(|q| q.pop_front());
        let score = match next {
            Some(s) => {
                script.last.insert(id, s);
                s
            }
            None => script.last.get(&id).copied().unwrap_or(0.0),
        };
        let loc = (id as u32 * 10, id as u32 * 5);
        Ok(ScoreExtremes { min: 1.0 - score, max: score, min_loc: loc, max_loc: loc })
    }

    fn find_all(&self, _image: &DynamicImage, _template: &DynamicImage, _threshold: f32) -> Result<Vec<Position>> {
        Ok(Vec::new())
    }
}

/// An RGB target the [`ScriptedBackend`] knows as `id` (its width).
pub fn scripted_target(id: u8) -> Target {
    Target::new(format!("t{id}"), DynamicImage::ImageRgb8(RgbImage::new(id as u32, 2)))
}

/// OCR that always "reads" the same detections.
#[derive(Debug, Clone, Default)]
pub struct FixedOcr {
    pub detections: Vec<TextDetection>,
}

impl FixedOcr {
    pub fn new(detections: Vec<TextDetection>) -> Self {
        Self { detections }
    }
}

impl OcrEngine for FixedOcr {
    fn detect_and_recognize(&self, _image: &DynamicImage) -> Result<Vec<TextDetection>> {
        Ok(self.detections.clone())
    }
}

/// Axis-aligned detection box from `(left, top)` to `(right, bottom)`.
pub fn detection(text: &str, confidence: f32, left: i32, top: i32, right: i32, bottom: i32) -> TextDetection {
    TextDetection::from_box(text, confidence, left, top, right, bottom)
}
