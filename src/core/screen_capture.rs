use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Gdi::{
    BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, DeleteDC, DeleteObject, GetDC, GetDIBits,
    ReleaseDC, SelectObject, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS, SRCCOPY,
};
use image::{ImageBuffer, Rgb, RgbImage};

use crate::core::coords::Rectangle;
use crate::errors::{NavigatorError, Result};

/// Capture a rectangle of the desktop using BitBlt.
/// Note: This captures visible pixels, so the window should be in front.
pub fn capture_screen_rect(rect: Rectangle) -> Result<RgbImage> {
    let width = rect.width();
    let height = rect.height();
    if width <= 0 || height <= 0 {
        return Err(NavigatorError::Capture(format!("empty capture rectangle {}", rect)));
    }

    unsafe {
        let hdc = GetDC(HWND(0));
        if hdc.is_invalid() {
            return Err(NavigatorError::Capture("Failed to get screen device context".into()));
        }

        let mem_dc = CreateCompatibleDC(hdc);
        if mem_dc.is_invalid() {
            let _ = ReleaseDC(HWND(0), hdc);
            return Err(NavigatorError::Capture("Failed to create compatible DC".into()));
        }

        let bitmap = CreateCompatibleBitmap(hdc, width, height);
        if bitmap.is_invalid() {
            let _ = DeleteDC(mem_dc);
            let _ = ReleaseDC(HWND(0), hdc);
            return Err(NavigatorError::Capture("Failed to create compatible bitmap".into()));
        }

        let old_bitmap = SelectObject(mem_dc, bitmap);

        let blit = BitBlt(mem_dc, 0, 0, width, height, hdc, rect.left, rect.top, SRCCOPY);
        if blit.is_err() {
            let _ = SelectObject(mem_dc, old_bitmap);
            let _ = DeleteObject(bitmap);
            let _ = DeleteDC(mem_dc);
            let _ = ReleaseDC(HWND(0), hdc);
            return Err(NavigatorError::Capture(format!("BitBlt failed for {}", rect)));
        }

        // 32 bpp keeps rows DWORD-aligned without padding
        let mut bmi = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width,
                biHeight: -height, // top-down
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0 as u32,
                biSizeImage: 0,
                biXPelsPerMeter: 0,
                biYPelsPerMeter: 0,
                biClrUsed: 0,
                biClrImportant: 0,
            },
            bmiColors: [Default::default(); 1],
        };

        let mut buffer: Vec<u8> = vec![0; (width * height * 4) as usize];
        let scan_lines = GetDIBits(
            mem_dc,
            bitmap,
            0,
            height as u32,
            Some(buffer.as_mut_ptr() as *mut _),
            &mut bmi,
            DIB_RGB_COLORS,
        );

        let _ = SelectObject(mem_dc, old_bitmap);
        let _ = DeleteObject(bitmap);
        let _ = DeleteDC(mem_dc);
        let _ = ReleaseDC(HWND(0), hdc);

        if scan_lines == 0 {
            return Err(NavigatorError::Capture("Failed to get bitmap bits".into()));
        }

        // BGRA -> RGB
        let img: RgbImage = ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
            let idx = ((y * width as u32 + x) * 4) as usize;
            Rgb([buffer[idx + 2], buffer[idx + 1], buffer[idx]])
        });
        Ok(img)
    }
}
