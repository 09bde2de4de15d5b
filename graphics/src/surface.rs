//! Device-surface contract.
//!
//! The canvas never touches a bus directly. Everything it needs from the
//! display controller goes through [`DeviceSurface`], which a board
//! support crate implements for its particular controller and wiring.

use crate::color::Rgb565;
use crate::config::Orientation;

/// Display controller backend.
///
/// Coordinates handed to the surface are in the canvas' oriented frame
/// after scroll mapping; translating them to controller RAM addresses
/// (rotation, mirroring) is the backend's job.
pub trait DeviceSurface {
    /// Take ownership of the bus (assert chip select).
    fn select(&mut self);

    /// Release the bus.
    fn deselect(&mut self);

    /// Set the inclusive window that subsequent pixel writes fill in
    /// row-major order.
    fn set_address_window(&mut self, x0: i32, y0: i32, x1: i32, y1: i32);

    /// Stream one pixel word into the current window.
    fn write_pixel(&mut self, color: Rgb565);

    /// Update the hardware vertical scroll register.
    fn set_scroll_offset(&mut self, lines: i32);

    /// Block the calling thread for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);

    /// Fill an inclusive rectangle with a single color.
    ///
    /// The default sets one window and streams the pixel count. Controllers
    /// with a hardware fill or a DMA path override this.
    fn fill_window(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb565) {
        self.select();
        self.set_address_window(x0, y0, x1, y1);
        let count = (x1 - x0 + 1) as u32 * (y1 - y0 + 1) as u32;
        for _ in 0..count {
            self.write_pixel(color);
        }
        self.deselect();
    }

    /// Orientation changed; reprogram the memory access control if needed.
    fn set_orientation(&mut self, _orientation: Orientation) {}
}

impl<S: DeviceSurface + ?Sized> DeviceSurface for &mut S {
    fn select(&mut self) {
        (**self).select()
    }

    fn deselect(&mut self) {
        (**self).deselect()
    }

    fn set_address_window(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        (**self).set_address_window(x0, y0, x1, y1)
    }

    fn write_pixel(&mut self, color: Rgb565) {
        (**self).write_pixel(color)
    }

    fn set_scroll_offset(&mut self, lines: i32) {
        (**self).set_scroll_offset(lines)
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }

    fn fill_window(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb565) {
        (**self).fill_window(x0, y0, x1, y1, color)
    }

    fn set_orientation(&mut self, orientation: Orientation) {
        (**self).set_orientation(orientation)
    }
}
