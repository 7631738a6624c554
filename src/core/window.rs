//! Window adapter boundary.
//!
//! [`WindowAdapter`] is everything the engine needs from the OS about the
//! target window. Handles are re-resolved per query; rect and scale are
//! never cached because the window may move, resize or close between calls.

use image::DynamicImage;

use crate::core::coords::Rectangle;
use crate::errors::Result;

/// Opaque native window id plus the name and class it had when resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowHandle {
    pub id: isize,
    pub title: String,
    pub class_name: String,
}

pub trait WindowAdapter {
    /// Locate the target window. Fails with `WindowUnavailable` if absent.
    fn resolve(&self) -> Result<WindowHandle>;

    /// Window bounds in physical pixels, consistent with [`WindowAdapter::capture`].
    fn rect(&self, handle: &WindowHandle) -> Result<Rectangle>;

    /// Per-window display scale (1.0 at 96 DPI).
    fn scale_factor(&self, handle: &WindowHandle) -> Result<f64>;

    fn bring_to_foreground(&self, handle: &WindowHandle) -> Result<()>;

    /// Pixels of `rect(handle)`, top-left aligned to the rect.
    fn capture(&self, handle: &WindowHandle) -> Result<DynamicImage>;

    fn is_foreground(&self, handle: &WindowHandle) -> Result<bool>;
}

#[cfg(windows)]
pub use win32::Win32Window;

#[cfg(windows)]
mod win32 {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;

    use image::DynamicImage;
    use windows::core::{HSTRING, PCWSTR};
    use windows::Win32::Foundation::{HWND, RECT};
    use windows::Win32::Graphics::Gdi::{GetDC, GetDeviceCaps, ReleaseDC, DESKTOPHORZRES};
    use windows::Win32::UI::HiDpi::GetDpiForWindow;
    use windows::Win32::UI::WindowsAndMessaging::{
        FindWindowW, GetClassNameW, GetForegroundWindow, GetSystemMetrics, GetWindowRect,
        GetWindowTextLengthW, GetWindowTextW, IsWindow, SetForegroundWindow, ShowWindow,
        SM_CXSCREEN, SW_RESTORE,
    };

    use super::{WindowAdapter, WindowHandle};
    use crate::core::coords::Rectangle;
    use crate::core::screen_capture::capture_screen_rect;
    use crate::errors::{NavigatorError, Result};

    /// Game window located by class name and/or title via `FindWindowW`.
    #[derive(Debug, Clone)]
    pub struct Win32Window {
        class_name: Option<String>,
        title: String,
    }

    impl Win32Window {
        pub fn new(class_name: Option<String>, title: impl Into<String>) -> Self {
            Self { class_name, title: title.into() }
        }

        fn live_hwnd(&self, handle: &WindowHandle) -> Result<HWND> {
            let hwnd = HWND(handle.id);
            if unsafe { IsWindow(hwnd) }.as_bool() {
                Ok(hwnd)
            } else {
                Err(NavigatorError::WindowUnavailable(format!(
                    "window {:?} (hwnd {}) has closed",
                    handle.title, handle.id
                )))
            }
        }
    }

    fn read_window_title(hwnd: HWND) -> String {
        let len = unsafe { GetWindowTextLengthW(hwnd) };
        if len <= 0 {
            return String::new();
        }
        let mut buf = vec![0u16; (len + 1) as usize];
        let copied = unsafe { GetWindowTextW(hwnd, &mut buf) };
        if copied <= 0 {
            return String::new();
        }
        OsString::from_wide(&buf[..copied as usize]).to_string_lossy().into_owned()
    }

    fn read_class_name(hwnd: HWND) -> String {
        let mut buf = [0u16; 256];
        let len = unsafe { GetClassNameW(hwnd, &mut buf) };
        if len <= 0 {
            return String::new();
        }
        OsString::from_wide(&buf[..len as usize]).to_string_lossy().into_owned()
    }

    /// Ratio between the physical desktop width and the logical width
    /// reported to DPI-unaware callers, rounded to two decimals.
    fn desktop_scaling() -> f64 {
        unsafe {
            let logical = GetSystemMetrics(SM_CXSCREEN);
            let hdc = GetDC(HWND(0));
            let physical = GetDeviceCaps(hdc, DESKTOPHORZRES);
            let _ = ReleaseDC(HWND(0), hdc);
            if logical <= 0 || physical <= 0 {
                return 1.0;
            }
            ((physical as f64 / logical as f64) * 100.0).round() / 100.0
        }
    }

    impl WindowAdapter for Win32Window {
        fn resolve(&self) -> Result<WindowHandle> {
            let class = self.class_name.as_deref().map(HSTRING::from);
            let title = HSTRING::from(self.title.as_str());
            let class_ptr = class
                .as_ref()
                .map(|c| PCWSTR(c.as_ptr()))
                .unwrap_or(PCWSTR::null());

            let hwnd = unsafe { FindWindowW(class_ptr, PCWSTR(title.as_ptr())) };
            if hwnd.is_invalid() || !unsafe { IsWindow(hwnd) }.as_bool() {
                return Err(NavigatorError::WindowUnavailable(format!(
                    "no window with class {:?} and title {:?}",
                    self.class_name, self.title
                )));
            }

            let handle = WindowHandle {
                id: hwnd.0,
                title: read_window_title(hwnd),
                class_name: read_class_name(hwnd),
            };
            log::debug!("class: {:?}, name: {:?}, hwnd: {}", handle.class_name, handle.title, handle.id);
            Ok(handle)
        }

        fn rect(&self, handle: &WindowHandle) -> Result<Rectangle> {
            let hwnd = self.live_hwnd(handle)?;
            let mut raw = RECT::default();
            unsafe { GetWindowRect(hwnd, &mut raw) }?;

            let rect = Rectangle::new(raw.left, raw.top, raw.right, raw.bottom).scaled(desktop_scaling());
            if !rect.is_normalized() {
                log::warn!("window {:?} reported an inverted rectangle {}", handle.title, rect);
            }
            Ok(rect)
        }

        fn scale_factor(&self, handle: &WindowHandle) -> Result<f64> {
            let hwnd = self.live_hwnd(handle)?;
            let dpi = unsafe { GetDpiForWindow(hwnd) };
            if dpi == 0 {
                return Err(NavigatorError::WindowUnavailable(format!(
                    "GetDpiForWindow failed for {:?}",
                    handle.title
                )));
            }
            Ok(dpi as f64 / 96.0)
        }

        fn bring_to_foreground(&self, handle: &WindowHandle) -> Result<()> {
            let hwnd = self.live_hwnd(handle)?;
            unsafe {
                let _ = ShowWindow(hwnd, SW_RESTORE);
                if !SetForegroundWindow(hwnd).as_bool() {
                    log::warn!("SetForegroundWindow refused for {:?}", handle.title);
                }
            }
            Ok(())
        }

        fn capture(&self, handle: &WindowHandle) -> Result<DynamicImage> {
            let rect = self.rect(handle)?;
            capture_screen_rect(rect).map(DynamicImage::ImageRgb8)
        }

        fn is_foreground(&self, handle: &WindowHandle) -> Result<bool> {
            self.live_hwnd(handle)?;
            let foreground = unsafe { GetForegroundWindow() };
            if foreground.is_invalid() {
                return Ok(false);
            }
            Ok(read_window_title(foreground) == handle.title)
        }
    }
}
