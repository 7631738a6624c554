//! Input-dispatch boundary and the Win32 `SendInput` implementation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::coords::Position;
use crate::errors::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Low-level input events. All points are screen-absolute.
///
/// `Send + Sync` so a driver can be shared with the key-hold worker.
pub trait InputDriver: Send + Sync {
    /// Move the cursor to `point`, spreading the motion over `duration`.
    fn move_to(&self, point: Position, duration: Duration) -> Result<()>;

    fn button_down(&self, point: Position, button: MouseButton) -> Result<()>;

    fn button_up(&self, point: Position, button: MouseButton) -> Result<()>;

    /// Positive notches scroll up, negative down.
    fn scroll(&self, notches: i32) -> Result<()>;

    fn key_down(&self, key: &str) -> Result<()>;

    fn key_up(&self, key: &str) -> Result<()>;

    fn key_press(&self, key: &str) -> Result<()> {
        self.key_down(key)?;
        self.key_up(key)
    }
}

/// Map a key name (`"a"`, `"f5"`, `"enter"`, `"pagedown"` ...) to its
/// Windows virtual-key code.
pub fn virtual_key_code(name: &str) -> Option<u16> {
    let lower = name.trim().to_lowercase();
    let mut chars = lower.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_lowercase() {
            return Some(c.to_ascii_uppercase() as u16);
        }
        if c.is_ascii_digit() {
            return Some(c as u16);
        }
    }

    if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u16>().ok()) {
        if (1..=24).contains(&n) {
            return Some(0x70 + n - 1);
        }
    }

    let code = match lower.as_str() {
        "backspace" | "back" => 0x08,
        "tab" => 0x09,
        "enter" | "return" => 0x0D,
        "shift" => 0x10,
        "ctrl" | "control" => 0x11,
        "alt" => 0x12,
        "pause" => 0x13,
        "capslock" => 0x14,
        "esc" | "escape" => 0x1B,
        "space" | "spacebar" => 0x20,
        "pageup" | "pgup" => 0x21,
        "pagedown" | "pgdn" => 0x22,
        "end" => 0x23,
        "home" => 0x24,
        "left" => 0x25,
        "up" => 0x26,
        "right" => 0x27,
        "down" => 0x28,
        "insert" => 0x2D,
        "delete" | "del" => 0x2E,
        "win" | "winleft" => 0x5B,
        _ => return None,
    };
    Some(code)
}

#[cfg(windows)]
pub use win32::SendInputDriver;

#[cfg(windows)]
mod win32 {
    use std::thread;
    use std::time::Duration;

    use windows::Win32::Foundation::POINT;
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT, KEYBD_EVENT_FLAGS,
        KEYEVENTF_KEYUP, MOUSEEVENTF_ABSOLUTE, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP,
        MOUSEEVENTF_MIDDLEDOWN, MOUSEEVENTF_MIDDLEUP, MOUSEEVENTF_MOVE, MOUSEEVENTF_RIGHTDOWN,
        MOUSEEVENTF_RIGHTUP, MOUSEEVENTF_VIRTUALDESK, MOUSEEVENTF_WHEEL, MOUSEINPUT,
        MOUSE_EVENT_FLAGS, VIRTUAL_KEY,
    };
    use windows::Win32::UI::WindowsAndMessaging::{
        GetCursorPos, GetSystemMetrics, SM_CXVIRTUALSCREEN, SM_CYVIRTUALSCREEN,
        SM_XVIRTUALSCREEN, SM_YVIRTUALSCREEN,
    };

    use super::{virtual_key_code, InputDriver, MouseButton};
    use crate::core::coords::Position;
    use crate::errors::{NavigatorError, Result};

    const INPUT_SIZE: i32 = std::mem::size_of::<INPUT>() as i32;
    const WHEEL_DELTA: i32 = 120;
    const MOVE_STEP: Duration = Duration::from_millis(10);

    const ABSOLUTE_MOVE: MOUSE_EVENT_FLAGS =
        MOUSE_EVENT_FLAGS(MOUSEEVENTF_ABSOLUTE.0 | MOUSEEVENTF_MOVE.0 | MOUSEEVENTF_VIRTUALDESK.0);

    /// Injects input with `SendInput`. Stateless, so it is freely shared
    /// with worker threads.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct SendInputDriver;

    impl SendInputDriver {
        pub fn new() -> Self {
            Self
        }
    }

    fn screen_geometry() -> (i32, i32, i32, i32) {
        unsafe {
            let x = GetSystemMetrics(SM_XVIRTUALSCREEN);
            let y = GetSystemMetrics(SM_YVIRTUALSCREEN);
            let w = GetSystemMetrics(SM_CXVIRTUALSCREEN);
            let h = GetSystemMetrics(SM_CYVIRTUALSCREEN);
            if w > 0 && h > 0 {
                (x, y, w, h)
            } else {
                (0, 0, 1920, 1080)
            }
        }
    }

    /// Pixel coordinates to the 0..65535 virtual-desktop space.
    fn normalise_coords(x: i32, y: i32) -> (i32, i32) {
        let (origin_x, origin_y, screen_w, screen_h) = screen_geometry();
        if screen_w <= 1 || screen_h <= 1 {
            return (0, 0);
        }
        let abs_x = (((x - origin_x) as i64 * 65535) / (screen_w as i64 - 1)).clamp(0, 65535) as i32;
        let abs_y = (((y - origin_y) as i64 * 65535) / (screen_h as i64 - 1)).clamp(0, 65535) as i32;
        (abs_x, abs_y)
    }

    fn mouse_input(abs_x: i32, abs_y: i32, data: i32, flags: MOUSE_EVENT_FLAGS) -> INPUT {
        INPUT {
            r#type: INPUT_MOUSE,
            Anonymous: INPUT_0 {
                mi: MOUSEINPUT {
                    dx: abs_x,
                    dy: abs_y,
                    // wheel deltas are signed; the field type differs across windows-rs releases
                    mouseData: data as _,
                    dwFlags: flags,
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        }
    }

    fn key_input(vk: u16, key_up: bool) -> INPUT {
        let flags = if key_up { KEYEVENTF_KEYUP } else { KEYBD_EVENT_FLAGS(0) };
        INPUT {
            r#type: INPUT_KEYBOARD,
            Anonymous: INPUT_0 {
                ki: KEYBDINPUT {
                    wVk: VIRTUAL_KEY(vk),
                    wScan: 0,
                    dwFlags: flags,
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        }
    }

    fn send(inputs: &[INPUT]) -> Result<()> {
        let sent = unsafe { SendInput(inputs, INPUT_SIZE) };
        if sent as usize != inputs.len() {
            return Err(NavigatorError::Input(format!(
                "SendInput injected {} of {} events",
                sent,
                inputs.len()
            )));
        }
        Ok(())
    }

    fn send_move(x: i32, y: i32) -> Result<()> {
        let (abs_x, abs_y) = normalise_coords(x, y);
        send(&[mouse_input(abs_x, abs_y, 0, ABSOLUTE_MOVE)])
    }

    fn button_flags(button: MouseButton) -> (MOUSE_EVENT_FLAGS, MOUSE_EVENT_FLAGS) {
        match button {
            MouseButton::Left => (MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP),
            MouseButton::Right => (MOUSEEVENTF_RIGHTDOWN, MOUSEEVENTF_RIGHTUP),
            MouseButton::Middle => (MOUSEEVENTF_MIDDLEDOWN, MOUSEEVENTF_MIDDLEUP),
        }
    }

    fn key(name: &str) -> Result<u16> {
        virtual_key_code(name).ok_or_else(|| NavigatorError::UnknownKey(name.to_string()))
    }

    impl InputDriver for SendInputDriver {
        fn move_to(&self, point: Position, duration: Duration) -> Result<()> {
            let steps = (duration.as_millis() / MOVE_STEP.as_millis()) as i32;
            let mut start = POINT::default();
            if steps > 1 && unsafe { GetCursorPos(&mut start) }.is_ok() {
                for i in 1..steps {
                    let x = start.x + (point.x - start.x) * i / steps;
                    let y = start.y + (point.y - start.y) * i / steps;
                    send_move(x, y)?;
                    thread::sleep(MOVE_STEP);
                }
            }
            send_move(point.x, point.y)
        }

        fn button_down(&self, point: Position, button: MouseButton) -> Result<()> {
            let (abs_x, abs_y) = normalise_coords(point.x, point.y);
            let (down, _) = button_flags(button);
            send(&[mouse_input(abs_x, abs_y, 0, MOUSE_EVENT_FLAGS(ABSOLUTE_MOVE.0 | down.0))])
        }

        fn button_up(&self, point: Position, button: MouseButton) -> Result<()> {
            let (abs_x, abs_y) = normalise_coords(point.x, point.y);
            let (_, up) = button_flags(button);
            send(&[mouse_input(abs_x, abs_y, 0, MOUSE_EVENT_FLAGS(ABSOLUTE_MOVE.0 | up.0))])
        }

        fn scroll(&self, notches: i32) -> Result<()> {
            send(&[mouse_input(0, 0, notches * WHEEL_DELTA, MOUSEEVENTF_WHEEL)])
        }

        fn key_down(&self, name: &str) -> Result<()> {
            send(&[key_input(key(name)?, false)])
        }

        fn key_up(&self, name: &str) -> Result<()> {
            send(&[key_input(key(name)?, true)])
        }

        fn key_press(&self, name: &str) -> Result<()> {
            let vk = key(name)?;
            send(&[key_input(vk, false), key_input(vk, true)])
        }
    }
}
