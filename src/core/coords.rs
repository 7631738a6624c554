use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::errors::{NavigatorError, Result};

/// Which origin a [`Position`] is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoordSpace {
    /// Relative to the top-left corner of the game window (also capture-image space).
    Window,
    /// Absolute desktop pixels.
    Screen,
}

/// Integer pixel coordinate tagged with its coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub space: CoordSpace,
}

impl Position {
    pub const fn window(x: i32, y: i32) -> Self {
        Self { x, y, space: CoordSpace::Window }
    }

    pub const fn screen(x: i32, y: i32) -> Self {
        Self { x, y, space: CoordSpace::Screen }
    }

    pub fn is_screen(&self) -> bool {
        self.space == CoordSpace::Screen
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, other: Position) -> Position {
        Position { x: self.x + other.x, y: self.y + other.y, space: self.space }
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, other: Position) -> Position {
        Position { x: self.x - other.x, y: self.y - other.y, space: self.space }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}, {})", self.x, self.y)
    }
}

/// Screen extent of the game window in physical pixels.
///
/// The constructor does not check `left <= right` / `top <= bottom`;
/// use [`Rectangle::is_normalized`] where it matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rectangle {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn top_left(&self) -> Position {
        Position::screen(self.left, self.top)
    }

    pub fn is_normalized(&self) -> bool {
        self.left <= self.right && self.top <= self.bottom
    }

    /// Edges are inclusive.
    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }

    /// Multiply every edge by `factor`, truncating toward zero.
    pub fn scaled(&self, factor: f64) -> Rectangle {
        let s = |v: i32| (v as f64 * factor) as i32;
        Rectangle::new(s(self.left), s(self.top), s(self.right), s(self.bottom))
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.left, self.top, self.right, self.bottom)
    }
}

/// Convert a window-relative point to screen coordinates.
pub fn to_absolute(window_relative: Position, window_rect: Rectangle) -> Position {
    Position::screen(window_relative.x + window_rect.left, window_relative.y + window_rect.top)
}

/// Fail with `OutOfBounds` when an absolute point lies outside the window.
pub fn validate_within(point: Position, window_rect: Rectangle) -> Result<Position> {
    if window_rect.contains(point) {
        Ok(point)
    } else {
        log::error!("the given coordinate {} is outside {}", point, window_rect);
        Err(NavigatorError::OutOfBounds { point, bounds: window_rect })
    }
}

/// Turn any tagged position into a validated screen coordinate.
/// Screen-absolute points skip the conversion.
pub fn resolve(point: Position, window_rect: Rectangle) -> Result<Position> {
    let absolute = match point.space {
        CoordSpace::Screen => point,
        CoordSpace::Window => to_absolute(point, window_rect),
    };
    validate_within(absolute, window_rect)
}
