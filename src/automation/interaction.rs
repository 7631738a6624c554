//! Mouse sequences built from [`InputDriver`] primitives. All points here are
//! already screen-absolute and validated.

use std::thread;
use std::time::Duration;

use crate::core::coords::Position;
use crate::core::input::{InputDriver, MouseButton};
use crate::errors::{NavigatorError, Result};

pub fn delay(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}

/// Move, press, hold for `hold`, release.
pub fn click_at_screen(input: &dyn InputDriver, point: Position, button: MouseButton, hold: Duration) -> Result<()> {
    input.move_to(point, Duration::ZERO)?;
    input.button_down(point, button)?;
    delay(hold);
    input.button_up(point, button)?;
    log::debug!("mouse click({:?}): {}", button, point);
    Ok(())
}

/// Press at `start`, travel to `end` over `duration`, release.
pub fn drag(input: &dyn InputDriver, start: Position, end: Position, duration: Duration) -> Result<()> {
    input.move_to(start, Duration::ZERO)?;
    input.button_down(start, MouseButton::Left)?;
    input.move_to(end, duration)?;
    input.button_up(end, MouseButton::Left)?;
    log::debug!("mouse drag: {} -> {}", start, end);
    Ok(())
}

/// Move to `point` over `travel`, then scroll `notches` `repetitions` times
/// with `pause` after each.
pub fn scroll_at(
    input: &dyn InputDriver,
    point: Position,
    notches: i32,
    repetitions: u32,
    travel: Duration,
    pause: Duration,
) -> Result<()> {
    if repetitions < 1 {
        return Err(NavigatorError::Input("scroll repetitions must be at least 1".into()));
    }
    input.move_to(point, travel)?;
    for _ in 0..repetitions {
        input.scroll(notches)?;
        delay(pause);
    }
    log::debug!("mouse scroll {} x{} at {}", notches, repetitions, point);
    Ok(())
}
