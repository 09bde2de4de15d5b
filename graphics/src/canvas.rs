//! Canvas state and the low-level pixel funnel.
//!
//! Every primitive ends up in one of three places: [`Canvas::draw_pixel`]
//! for single pixels, [`Canvas::fill`] for rectangles, or
//! [`Canvas::put_color`] for coverage-weighted pixels. All three route
//! through the scroll and addressing rules in [`crate::scroll`] before the
//! device sees a coordinate.

use crate::color::{Rgb, Rgb565};
use crate::config::{CanvasConfig, Orientation};
use crate::font::Font;
use crate::surface::DeviceSurface;

/// Drawing context bound to one physical display.
///
/// The canvas owns its device handle. The active font is borrowed for
/// `'f` and never copied.
pub struct Canvas<'f, S: DeviceSurface> {
    pub(crate) surface: S,
    /// Short physical side.
    pub(crate) device_width: i32,
    /// Long physical side; also the scroll period.
    pub(crate) device_height: i32,
    /// Logical width for the current orientation.
    pub(crate) width: i32,
    /// Logical height for the current orientation.
    pub(crate) height: i32,
    pub(crate) orientation: Orientation,
    pub(crate) landscape: bool,
    pub(crate) foreground: Rgb,
    pub(crate) background: Rgb,
    pub(crate) line_width: i32,
    pub(crate) antialiasing: bool,
    pub(crate) relative_origin: bool,
    pub(crate) current_scroll: i32,
    pub(crate) flip_scroll: i32,
    pub(crate) scroll_enabled: bool,
    pub(crate) scroll_supported: bool,
    /// Set while a scroll paints the band it just exposed.
    pub(crate) scroll_clean_mode: bool,
    pub(crate) font: Option<Font<'f>>,
}

impl<'f, S: DeviceSurface> Canvas<'f, S> {
    /// Bind a canvas to `surface`.
    pub fn new(surface: S, config: CanvasConfig) -> Self {
        let w = config.width as i32;
        let h = config.height as i32;
        let orientation = config.orientation.unwrap_or(if w > h {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        });

        let mut canvas = Canvas {
            surface,
            device_width: w.min(h),
            device_height: w.max(h),
            width: w,
            height: h,
            orientation,
            landscape: false,
            foreground: config.foreground,
            background: config.background,
            line_width: (config.line_width as i32).max(1),
            antialiasing: false,
            relative_origin: config.relative_origin,
            current_scroll: 0,
            flip_scroll: 0,
            scroll_enabled: true,
            scroll_supported: config.scroll_supported,
            scroll_clean_mode: false,
            font: None,
        };
        canvas.set_orientation(orientation);
        canvas.enable_antialiasing(config.antialiasing);
        canvas
    }

    /// Release the device handle.
    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Switch orientation. Logical width/height follow the long/short
    /// device sides accordingly.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
        if orientation.is_landscape() {
            self.width = self.device_height;
            self.height = self.device_width;
            self.landscape = true;
        } else {
            self.width = self.device_width;
            self.height = self.device_height;
            self.landscape = false;
        }
        self.surface.set_orientation(orientation);
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn is_landscape(&self) -> bool {
        self.landscape
    }

    /// Logical width.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Logical height.
    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn device_width(&self) -> i32 {
        self.device_width
    }

    pub fn device_height(&self) -> i32 {
        self.device_height
    }

    /// Toggle antialiasing. Always off when built without the
    /// `antialiasing` feature.
    pub fn enable_antialiasing(&mut self, enable: bool) {
        self.antialiasing = enable && cfg!(feature = "antialiasing");
    }

    pub fn is_antialiased(&self) -> bool {
        self.antialiasing
    }

    pub fn set_line_width(&mut self, width: i32) {
        self.line_width = width.max(1);
    }

    pub fn line_width(&self) -> i32 {
        self.line_width
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.foreground = color;
    }

    pub fn color(&self) -> Rgb {
        self.foreground
    }

    pub fn set_background(&mut self, color: Rgb) {
        self.background = color;
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    /// Clip mode: scrolled-past content is discarded.
    pub fn set_origin_relative(&mut self) {
        self.relative_origin = true;
    }

    /// Wrap mode: coordinates follow the hardware circular buffer.
    pub fn set_origin_absolute(&mut self) {
        self.relative_origin = false;
    }

    pub fn is_origin_relative(&self) -> bool {
        self.relative_origin
    }

    /// Sample used as the blending reference for antialiased pixels.
    ///
    /// There is no framebuffer readback, so this is always the nominal
    /// background color.
    pub fn get_pixel(&self, _x: i32, _y: i32) -> Rgb {
        self.background
    }

    /// Paint the whole logical area with the background color.
    pub fn clear(&mut self) {
        let color = self.background.to_rgb565();
        self.fill(color, 0, 0, self.width - 1, self.height - 1);
    }

    /// Paint one pixel in the foreground color.
    pub fn draw_pixel(&mut self, x: i32, y: i32) {
        self.plot(x, y, self.foreground);
    }

    pub(crate) fn plot(&mut self, x: i32, y: i32, color: Rgb) {
        let Some((dx, dy)) = self.resolve_pixel(x, y) else {
            return;
        };
        self.surface.select();
        self.surface.set_address_window(dx, dy, dx, dy);
        self.surface.write_pixel(color.to_rgb565());
        self.surface.deselect();
    }

    /// Fill the inclusive rectangle `(x1, y1)`-`(x2, y2)` with `color`.
    ///
    /// Corners may come in any order. The rectangle is clipped to the
    /// logical area and, in wrap mode, split at the scroll boundary.
    pub fn fill(&mut self, color: Rgb565, x1: i32, y1: i32, x2: i32, y2: i32) {
        for rect in self.resolve_fill(x1, y1, x2, y2).iter() {
            self.surface
                .fill_window(rect.x0, rect.y0, rect.x1, rect.y1, color);
        }
    }

    /// Horizontal 1px line, both ends inclusive.
    pub fn h_line(&mut self, x1: i32, y: i32, x2: i32) {
        self.fill(self.foreground.to_rgb565(), x1, y, x2, y);
    }

    /// Vertical 1px line, both ends inclusive.
    pub fn v_line(&mut self, x: i32, y1: i32, y2: i32) {
        self.fill(self.foreground.to_rgb565(), x, y1, x, y2);
    }

    /// Coverage-weighted pixel.
    ///
    /// `transpose` swaps the axes back for callers that rasterize in a
    /// transposed frame. Partial coverage blends the foreground against
    /// [`Canvas::get_pixel`].
    pub(crate) fn put_color(&mut self, x: i32, y: i32, transpose: bool, alpha: f64) {
        let (x, y) = if transpose { (y, x) } else { (x, y) };
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return;
        }
        if alpha != 1.0 {
            let bg = self.get_pixel(x, y);
            let blended = Rgb::blend_linear(bg, self.foreground, alpha);
            self.plot(x, y, blended);
        } else {
            self.plot(x, y, self.foreground);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemorySurface;

    fn canvas() -> Canvas<'static, MemorySurface> {
        Canvas::new(MemorySurface::new(64, 128), CanvasConfig::new(64, 128))
    }

    #[test]
    fn test_dimensions_follow_orientation() {
        let mut c = canvas();
        assert_eq!((c.width(), c.height()), (64, 128));
        assert_eq!(c.orientation(), Orientation::Portrait);

        c.set_orientation(Orientation::LandscapeFlip);
        assert_eq!((c.width(), c.height()), (128, 64));
        assert!(c.is_landscape());
        assert_eq!(c.surface().orientation, Orientation::LandscapeFlip);
        assert_eq!((c.device_width(), c.device_height()), (64, 128));
    }

    #[test]
    fn test_wide_panel_starts_landscape() {
        let c = Canvas::new(MemorySurface::new(160, 128), CanvasConfig::new(160, 128));
        assert_eq!(c.orientation(), Orientation::Landscape);
        assert_eq!((c.width(), c.height()), (160, 128));
        assert_eq!((c.device_width(), c.device_height()), (128, 160));
    }

    #[test]
    fn test_draw_pixel_single_write() {
        let mut c = canvas();
        c.set_color(Rgb::RED);
        c.draw_pixel(3, 4);
        let s = c.surface();
        assert_eq!(s.writes, 1);
        assert_eq!(s.windows, 1);
        assert_eq!(s.get(3, 4), 0xF800);
        assert!(!s.selected);
    }

    #[test]
    fn test_draw_pixel_out_of_bounds_is_noop() {
        let mut c = canvas();
        c.draw_pixel(-1, 0);
        c.draw_pixel(0, -1);
        c.draw_pixel(64, 0);
        c.draw_pixel(0, 128);
        assert_eq!(c.surface().writes, 0);
    }

    #[test]
    fn test_fill_canonicalizes_and_clamps() {
        let mut c = canvas();
        c.fill(Rgb565(0x1234), 5, 6, -3, 2);
        let painted = c.surface().painted();
        assert_eq!(painted.len(), 6 * 5);
        assert!(painted.iter().all(|&(x, y)| (0..=5).contains(&x) && (2..=6).contains(&y)));

        c.surface_mut().reset();
        c.fill(Rgb565(0x1234), 60, 120, 200, 300);
        assert_eq!(c.surface().painted().len(), 4 * 8);

        c.surface_mut().reset();
        c.fill(Rgb565(0x1234), -10, -10, -1, -1);
        c.fill(Rgb565(0x1234), 64, 0, 70, 10);
        assert_eq!(c.surface().writes, 0);
    }

    #[test]
    fn test_put_color_blends_against_background() {
        let mut c = canvas();
        c.set_color(Rgb::WHITE);
        c.set_background(Rgb::BLACK);
        c.put_color(2, 1, true, 0.5);
        let got = c.surface().color_at(1, 2);
        assert_eq!(got, Rgb::from_rgb565(Rgb::new(128, 128, 128).to_rgb565()));
        assert_eq!(c.color(), Rgb::WHITE);

        c.put_color(5, 5, false, 1.0);
        assert_eq!(c.surface().get(5, 5), 0xFFFF);
    }

    #[test]
    fn test_clear_uses_background() {
        let mut c = canvas();
        c.set_background(Rgb::BLUE);
        c.set_color(Rgb::RED);
        c.clear();
        assert_eq!(c.surface().get(0, 0), 0x001F);
        assert_eq!(c.surface().get(63, 127), 0x001F);
        assert_eq!(c.color(), Rgb::RED);
    }

    #[test]
    fn test_into_surface_keeps_device_state() {
        let mut c = canvas();
        c.set_color(Rgb::GREEN);
        c.draw_pixel(7, 8);
        let surface = c.into_surface();
        assert_eq!(surface.get(7, 8), 0x07E0);
        assert_eq!(surface.writes, 1);
    }

    #[test]
    fn test_line_width_floor() {
        let mut c = canvas();
        c.set_line_width(0);
        assert_eq!(c.line_width(), 1);
        c.set_line_width(4);
        assert_eq!(c.line_width(), 4);
    }
}
