//! Aliased shape rasterization.
//!
//! Integer-only Bresenham-family algorithms. Antialiased variants live in
//! [`crate::antialias`]; the entry points here dispatch to them when the
//! canvas has antialiasing enabled.

use crate::canvas::Canvas;
use crate::color::Rgb565;
use crate::surface::DeviceSurface;
use crate::GraphicsError;

/// Change-detection marker for the oval steppers; no real offset is
/// negative.
const UNSET: i32 = -1;

impl<'f, S: DeviceSurface> Canvas<'f, S> {
    /// Draw a line between two inclusive endpoints.
    ///
    /// Lines wider than one pixel are always antialiased.
    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        if self.line_width == 1 {
            if y1 == y2 {
                self.h_line(x1, y1, x2);
            } else if x1 == x2 {
                self.v_line(x1, y1, y2);
            } else if self.antialiasing {
                self.draw_line_antialiased(x1, y1, x2, y2);
            } else {
                self.draw_line_bresenham(x1, y1, x2, y2);
            }
        } else if cfg!(feature = "antialiasing") {
            self.draw_thick_line_antialiased(x1, y1, x2, y2);
        } else {
            self.draw_line_bresenham(x1, y1, x2, y2);
        }
    }

    fn draw_line_bresenham(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let (dx, sx) = if x2 > x1 { (x2 - x1, 1) } else { (x1 - x2, -1) };
        let (dy, sy) = if y2 > y1 { (y2 - y1, 1) } else { (y1 - y2, -1) };

        let (mut x, mut y) = (x1, y1);
        let mut err = dx - dy;
        loop {
            self.draw_pixel(x, y);
            if x == x2 && y == y2 {
                break;
            }
            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x += sx;
            }
            if e2 < dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Outline a `width` x `height` rectangle.
    ///
    /// Each edge stops one pixel short of the next so no corner is
    /// painted twice.
    pub fn draw_rectangle(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.h_line(x, y, x + width - 2);
        self.v_line(x + width - 1, y, y + height - 2);
        self.h_line(x + 1, y + height - 1, x + width - 1);
        self.v_line(x, y + 1, y + height - 1);
    }

    pub fn fill_rectangle(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.fill(
            self.foreground.to_rgb565(),
            x,
            y,
            x + width - 1,
            y + height - 1,
        );
    }

    /// Outline a rectangle with corners of radius `r`.
    pub fn draw_round_rectangle(&mut self, x: i32, y: i32, width: i32, height: i32, r: i32) {
        if r < 1 {
            self.draw_rectangle(x, y, width, height);
            return;
        }
        let radius = r.min(height / 2).min(width / 2);

        if self.antialiasing {
            self.rasterize_rounded_rect(x, y, width, height, radius, radius, true);
            return;
        }

        self.h_line(x + radius, y + height, x + width - radius);
        self.h_line(x + radius, y, x + width - radius);
        self.v_line(x + width, y + radius, y + height - radius);
        self.v_line(x, y + radius, y + height - radius);

        let shift_x = width - radius * 2;
        let shift_y = height - radius * 2;
        let (cx, cy) = (x + radius, y + radius);
        for (dx, dy) in MidpointArc::new(radius) {
            self.draw_pixel(cx + dx + shift_x, cy + dy + shift_y);
            self.draw_pixel(cx - dx, cy + dy + shift_y);
            self.draw_pixel(cx + dx + shift_x, cy - dy);
            self.draw_pixel(cx - dx, cy - dy);
            self.draw_pixel(cx + dy + shift_x, cy + dx + shift_y);
            self.draw_pixel(cx - dy, cy + dx + shift_y);
            self.draw_pixel(cx + dy + shift_x, cy - dx);
            self.draw_pixel(cx - dy, cy - dx);
        }
    }

    /// Fill a rectangle with corners of radius `r`.
    pub fn fill_round_rectangle(&mut self, x: i32, y: i32, width: i32, height: i32, r: i32) {
        if r < 1 {
            self.fill_rectangle(x, y, width, height);
            return;
        }
        let radius = r.min((height - 1) / 2).min((width - 1) / 2);

        if self.antialiasing {
            self.rasterize_rounded_rect(x, y, width - 1, height - 1, radius, radius, false);
        }

        for j in 0..height {
            let inset = if j < radius || j > height - radius {
                radius
            } else {
                0
            };
            self.h_line(x + inset, y + j, x + width - 1 - inset);
        }

        let shift_x = width - 1 - radius * 2;
        let shift_y = height - 1 - radius * 2;
        let (cx, cy) = (x + radius, y + radius);
        for (dx, dy) in MidpointArc::new(radius) {
            self.h_line(cx + shift_x, cy - dy, cx + shift_x + dx);
            self.h_line(cx - dx, cy - dy, cx);
            self.h_line(cx + shift_x, cy - dx, cx + shift_x + dy);
            self.h_line(cx - dy, cy - dx, cx);

            self.h_line(cx + shift_x, cy + dy + shift_y, cx + dx + shift_x);
            self.h_line(cx + shift_x, cy + dx + shift_y, cx + shift_x + dy);
            self.h_line(cx - dx, cy + dy + shift_y, cx);
            self.h_line(cx - dy, cy + dx + shift_y, cx);
        }
    }

    /// Outline a circle of radius `r` centered on `(x, y)`.
    pub fn draw_circle(&mut self, x: i32, y: i32, r: i32) {
        if self.antialiasing {
            self.draw_circle_antialiased(x, y, r, true);
            return;
        }

        self.draw_pixel(x, y + r);
        self.draw_pixel(x, y - r);
        self.draw_pixel(x + r, y);
        self.draw_pixel(x - r, y);

        for (dx, dy) in MidpointArc::new(r) {
            self.draw_pixel(x + dx, y + dy);
            self.draw_pixel(x - dx, y + dy);
            self.draw_pixel(x + dx, y - dy);
            self.draw_pixel(x - dx, y - dy);
            self.draw_pixel(x + dy, y + dx);
            self.draw_pixel(x - dy, y + dx);
            self.draw_pixel(x + dy, y - dx);
            self.draw_pixel(x - dy, y - dx);
        }
    }

    /// Fill a circle: every pixel with `dx² + dy² <= r²`.
    pub fn fill_circle(&mut self, x: i32, y: i32, r: i32) {
        if self.antialiasing {
            self.draw_circle_antialiased(x, y, r, false);
        }

        let r2 = r * r;
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r2 {
                    self.draw_pixel(x + dx, y + dy);
                }
            }
        }
    }

    /// Outline the ellipse inscribed in the `width` x `height` box at
    /// `(x, y)`.
    pub fn draw_oval(&mut self, x: i32, y: i32, width: i32, height: i32) {
        if self.antialiasing {
            self.rasterize_rounded_rect(
                x,
                y,
                width - 1,
                height - 1,
                (width - 1) / 2,
                (height - 1) / 2,
                true,
            );
            return;
        }

        if width <= 0 || height <= 0 {
            return;
        }

        let rx = (width - 1) / 2;
        let ry = (height - 1) / 2;
        let (cx, cy) = (x + rx, y + ry);

        if width == 1 {
            self.v_line(cx, cy, cy + height - 1);
            return;
        }
        if height == 1 {
            self.h_line(cx, cy, cx + width - 1);
            return;
        }

        let (mut oh, mut oi, mut oj, mut ok) = (UNSET, UNSET, UNSET, UNSET);

        if width > height {
            for (h, i, j, k) in OvalSteps::new(rx, ry) {
                if (ok != k && oj != k) || (oj != j && ok != j) || k != j {
                    self.mirror_points(cx, cy, h, k);
                    ok = k;
                    self.mirror_points(cx, cy, i, j);
                    oj = j;
                }
            }
        } else {
            for (h, i, j, k) in OvalSteps::new(ry, rx) {
                if (oi != i && oh != i) || (oh != h && oi != h && i != h) {
                    self.mirror_points(cx, cy, j, i);
                    oi = i;
                    self.mirror_points(cx, cy, k, h);
                    oh = h;
                }
            }
        }
    }

    /// Four-way mirrored points at `(cx ± dx, cy ± dy)`; the axis points
    /// are emitted once.
    fn mirror_points(&mut self, cx: i32, cy: i32, dx: i32, dy: i32) {
        if dy > 0 {
            self.draw_pixel(cx - dx, cy + dy);
            self.draw_pixel(cx + dx, cy + dy);
            self.draw_pixel(cx - dx, cy - dy);
            self.draw_pixel(cx + dx, cy - dy);
        } else {
            self.draw_pixel(cx - dx, cy);
            self.draw_pixel(cx + dx, cy);
        }
    }

    /// Fill the ellipse inscribed in the `width` x `height` box at
    /// `(x, y)`.
    pub fn fill_oval(&mut self, x: i32, y: i32, width: i32, height: i32) {
        let rx = (width - 1) / 2;
        let ry = (height - 1) / 2;
        let (cx, cy) = (x + rx, y + ry);

        if rx < 0 || ry < 0 {
            return;
        }
        if width < 2 {
            self.v_line(x, y, y + height - 1);
            return;
        }
        if height < 2 {
            self.h_line(x, y, x + width - 1);
            return;
        }

        if self.antialiasing {
            self.rasterize_rounded_rect(cx - rx, cy - ry, rx * 2, ry * 2, rx, ry, false);
        }

        let (mut oh, mut oi, mut oj, mut ok) = (UNSET, UNSET, UNSET, UNSET);

        if rx > ry {
            for (h, i, j, k) in OvalSteps::new(rx, ry) {
                if ok != k && oj != k {
                    self.mirror_spans(cx, cy, h, k);
                    ok = k;
                }
                if oj != j && ok != j && k != j {
                    self.mirror_spans(cx, cy, i, j);
                    oj = j;
                }
            }
        } else {
            for (h, i, j, k) in OvalSteps::new(ry, rx) {
                if oi != i && oh != i {
                    self.mirror_spans(cx, cy, j, i);
                    oi = i;
                }
                if oh != h && oi != h && i != h {
                    self.mirror_spans(cx, cy, k, h);
                    oh = h;
                }
            }
        }
    }

    /// Spans `cx - half..=cx + half` at `cy ± dy`.
    fn mirror_spans(&mut self, cx: i32, cy: i32, half: i32, dy: i32) {
        if dy > 0 {
            self.h_line(cx - half, cy + dy, cx + half);
            self.h_line(cx - half, cy - dy, cx + half);
        } else {
            self.h_line(cx - half, cy, cx + half);
        }
    }

    /// Blit a row-major block of packed pixels.
    ///
    /// Pixels go straight to the device window at `(x, y)`; they are not
    /// clipped or scroll-mapped.
    pub fn draw_bitmap(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        pixels: &[u16],
    ) -> Result<(), GraphicsError> {
        if width <= 0 || height <= 0 {
            return Ok(());
        }
        let expected = width as usize * height as usize;
        if pixels.len() < expected {
            return Err(GraphicsError::BitmapTooSmall {
                expected,
                actual: pixels.len(),
            });
        }

        self.surface.select();
        self.surface
            .set_address_window(x, y, x + width - 1, y + height - 1);
        for &px in &pixels[..expected] {
            self.surface.write_pixel(Rgb565(px));
        }
        self.surface.deselect();
        Ok(())
    }
}

/// One octant of the midpoint circle, after the axis points.
///
/// Yields `(x, y)` offsets with `x` rising from 1 until it meets `y`.
struct MidpointArc {
    f: i32,
    ddf_x: i32,
    ddf_y: i32,
    x: i32,
    y: i32,
}

impl MidpointArc {
    fn new(radius: i32) -> Self {
        Self {
            f: 1 - radius,
            ddf_x: 1,
            ddf_y: -2 * radius,
            x: 0,
            y: radius,
        }
    }
}

impl Iterator for MidpointArc {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<(i32, i32)> {
        if self.x >= self.y {
            return None;
        }
        if self.f >= 0 {
            self.y -= 1;
            self.ddf_y += 2;
            self.f += self.ddf_y;
        }
        self.x += 1;
        self.ddf_x += 2;
        self.f += self.ddf_x;
        Some((self.x, self.y))
    }
}

/// Fixed-point (x64) ellipse stepper driven along the major radius.
///
/// Each step yields `(h, i, j, k)`: `h` and `i` are the rounded major-axis
/// offsets, `j` and `k` their minor-axis counterparts scaled by
/// `minor / major`.
struct OvalSteps {
    major: i32,
    minor: i32,
    ix: i32,
    iy: i32,
    done: bool,
}

impl OvalSteps {
    fn new(major: i32, minor: i32) -> Self {
        Self {
            major,
            minor,
            ix: 0,
            iy: major * 64,
            done: major < 0,
        }
    }
}

impl Iterator for OvalSteps {
    type Item = (i32, i32, i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.major == 0 {
            self.done = true;
            return Some((0, 0, 0, 0));
        }
        let h = (self.ix + 32) >> 6;
        let i = (self.iy + 32) >> 6;
        let j = h * self.minor / self.major;
        let k = i * self.minor / self.major;

        self.ix += self.iy / self.major;
        self.iy -= self.ix / self.major;
        self.done = i <= h;
        Some((h, i, j, k))
    }
}
