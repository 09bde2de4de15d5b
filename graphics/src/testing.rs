//! In-memory device used by the unit tests.

use std::vec;
use std::vec::Vec;

use crate::color::{Rgb, Rgb565};
use crate::config::Orientation;
use crate::surface::DeviceSurface;

/// RGB565 framebuffer addressed in the canvas' oriented frame.
pub struct MemorySurface {
    pub width: i32,
    pub height: i32,
    pub pixels: Vec<u16>,
    /// Pixel words streamed through `write_pixel`.
    pub writes: usize,
    pub windows: usize,
    pub scroll_offsets: Vec<i32>,
    pub delays: Vec<u32>,
    pub selected: bool,
    pub orientation: Orientation,
    window: (i32, i32, i32, i32),
    cursor: (i32, i32),
}

/// Value of a pixel never written.
pub const UNTOUCHED: u16 = 0x0821;

impl MemorySurface {
    /// A surface large enough for any orientation of a `w`x`h` panel.
    pub fn new(width: i32, height: i32) -> Self {
        let side = width.max(height);
        Self {
            width: side,
            height: side,
            pixels: vec![UNTOUCHED; (side * side) as usize],
            writes: 0,
            windows: 0,
            scroll_offsets: Vec::new(),
            delays: Vec::new(),
            selected: false,
            orientation: Orientation::Portrait,
            window: (0, 0, 0, 0),
            cursor: (0, 0),
        }
    }

    pub fn get(&self, x: i32, y: i32) -> u16 {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn color_at(&self, x: i32, y: i32) -> Rgb {
        Rgb::from_rgb565(Rgb565(self.get(x, y)))
    }

    pub fn is_painted(&self, x: i32, y: i32) -> bool {
        self.get(x, y) != UNTOUCHED
    }

    /// Coordinates of every painted pixel, row-major.
    pub fn painted(&self) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.is_painted(x, y) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    pub fn reset(&mut self) {
        self.pixels.fill(UNTOUCHED);
        self.writes = 0;
        self.windows = 0;
    }
}

impl DeviceSurface for MemorySurface {
    fn select(&mut self) {
        self.selected = true;
    }

    fn deselect(&mut self) {
        self.selected = false;
    }

    fn set_address_window(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        self.windows += 1;
        self.window = (x0, y0, x1, y1);
        self.cursor = (x0, y0);
    }

    fn write_pixel(&mut self, color: Rgb565) {
        let (x0, _, x1, y1) = self.window;
        let (x, y) = self.cursor;
        if x >= 0 && y >= 0 && x < self.width && y < self.height && y <= y1 {
            let idx = (y * self.width + x) as usize;
            // Reassembled as an 8-bit bus would deliver it.
            self.pixels[idx] = u16::from_be_bytes([color.high_byte(), color.low_byte()]);
        }
        self.writes += 1;
        self.cursor = if x >= x1 { (x0, y + 1) } else { (x + 1, y) };
    }

    fn set_scroll_offset(&mut self, lines: i32) {
        self.scroll_offsets.push(lines);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
    }

    fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }
}
