//! Antialiased rasterization.
//!
//! Everything here emits coverage-weighted pixels through
//! [`Canvas::put_color`], which blends against the nominal background.
//!
//! - Wu lines for 1px strokes.
//! - Perpendicular-distance coverage for wide strokes.
//! - One incremental ellipse rasterizer shared by circles, ovals and
//!   rounded rectangles.

use crate::canvas::Canvas;
use crate::surface::DeviceSurface;

#[inline]
fn fpart(x: f64) -> f64 {
    x - libm::floor(x)
}

#[inline]
fn rfpart(x: f64) -> f64 {
    1.0 - fpart(x)
}

#[inline]
fn ipart(x: f64) -> i32 {
    libm::floor(x) as i32
}

impl<'f, S: DeviceSurface> Canvas<'f, S> {
    /// Wu line, one pixel wide.
    pub(crate) fn draw_line_antialiased(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let (mut x1, mut y1, mut x2, mut y2) = (x1, y1, x2, y2);

        let steep = (y2 - y1).abs() > (x2 - x1).abs();
        if steep {
            core::mem::swap(&mut x1, &mut y1);
            core::mem::swap(&mut x2, &mut y2);
        }
        if x1 > x2 {
            core::mem::swap(&mut x1, &mut x2);
            core::mem::swap(&mut y1, &mut y2);
        }

        let dx = x2 - x1;
        let dy = y2 - y1;
        let gradient = if dx == 0 { 0.0 } else { dy as f64 / dx as f64 };

        // Endpoints sit on integer coordinates; xgap weighs them at half
        // coverage.
        let yend = y1 as f64;
        let xgap = rfpart(x1 as f64 + 0.5);
        let ypxl1 = ipart(yend);
        self.put_color(x1, ypxl1, steep, rfpart(yend) * xgap);
        self.put_color(x1, ypxl1 + 1, steep, fpart(yend) * xgap);
        let mut intery = yend + gradient;

        let yend = y2 as f64;
        let xgap = rfpart(x2 as f64 + 0.5);
        let ypxl2 = ipart(yend);
        self.put_color(x2, ypxl2, steep, rfpart(yend) * xgap);
        self.put_color(x2, ypxl2 + 1, steep, fpart(yend) * xgap);

        for x in x1 + 1..x2 {
            let y = ipart(intery);
            self.put_color(x, y, steep, rfpart(intery));
            self.put_color(x, y + 1, steep, fpart(intery));
            intery += gradient;
        }
    }

    /// Line of the current line width with antialiased edges.
    ///
    /// Bresenham stepping along the center line; at each step a
    /// perpendicular slice is walked out to half the width, each pixel
    /// weighted by its distance to the ideal edge.
    pub(crate) fn draw_thick_line_antialiased(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let (mut x1, mut y1) = (x1, y1);
        let wd = (self.line_width as f64 + 1.0) / 2.0;

        let dx = (x2 - x1).abs();
        let sx = if x1 < x2 { 1 } else { -1 };
        let dy = (y2 - y1).abs();
        let sy = if y1 < y2 { 1 } else { -1 };
        let mut err = dx - dy;

        let ed = if dx + dy == 0 {
            1.0
        } else {
            libm::sqrt((dx as f64) * (dx as f64) + (dy as f64) * (dy as f64))
        };
        let reach = ed * wd;
        let coverage = |e: i32| 1.0 - f64::max(0.0, e.abs() as f64 / ed - wd + 1.0);

        loop {
            self.put_color(x1, y1, false, coverage(err - dx + dy));
            let mut e2 = err;
            let mut x = x1;
            let mut done = false;

            if 2 * e2 >= -dx {
                // x step
                e2 += dy;
                let mut y = y1;
                while (e2 as f64) < reach && (y2 != y || dx > dy) {
                    y += sy;
                    self.put_color(x1, y, false, coverage(e2));
                    e2 += dx;
                }
                if x1 == x2 {
                    done = true;
                }
                e2 = err;
                err -= dy;
                x1 += sx;
            }

            if 2 * e2 <= dy {
                // y step
                e2 = dx - e2;
                while (e2 as f64) < reach && (x2 != x || dx < dy) {
                    x += sx;
                    self.put_color(x, y1, false, coverage(e2));
                    e2 += dy;
                }
                if y1 == y2 {
                    done = true;
                }
                err += dx;
                y1 += sy;
            }

            if done {
                break;
            }
        }
    }

    pub(crate) fn draw_circle_antialiased(&mut self, x: i32, y: i32, radius: i32, hard_edge: bool) {
        self.rasterize_rounded_rect(
            x - radius,
            y - radius,
            radius * 2,
            radius * 2,
            radius,
            radius,
            hard_edge,
        );
    }

    /// Antialiased outline of a `width` x `height` box at `(x, y)` with
    /// elliptic corners of radii `rx`, `ry`.
    ///
    /// The straight edges are plain lines. One corner arc is stepped with
    /// the incremental midpoint-ellipse recurrences, producing at each step
    /// a pair of candidate pixels weighted by the residual ratio; the arc
    /// is then reflected about the box center into the other three
    /// corners. Circles and ovals are the case where the straight edges
    /// collapse to single points.
    ///
    /// With `hard_edge` set, the inner candidate of the first octant is
    /// painted at full coverage.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn rasterize_rounded_rect(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        rx: i32,
        ry: i32,
        hard_edge: bool,
    ) {
        if rx < 0 || ry < 0 {
            return;
        }
        if rx == 0 {
            self.v_line(x, y - ry, y + ry);
            return;
        }
        if ry == 0 {
            self.h_line(x - rx, y, x + rx);
            return;
        }

        let a2 = rx * rx;
        let b2 = ry * ry;
        let ds = 2 * a2;
        let dt = 2 * b2;
        let xc2 = 2 * x;
        let yc2 = 2 * y;

        let sab = libm::sqrt((a2 + b2) as f64);
        let od = libm::round(sab * 0.01) as i32 + 1;
        let dxt = libm::round(a2 as f64 / sab) as i32 + od;
        let dyt = libm::round(b2 as f64 / sab) as i32 + od;

        let mut t = 0;
        let mut s = -2 * a2 * ry;
        let mut d = 0;

        let mut xp = x + rx;
        let mut yp = y;

        self.h_line(x + rx, y + height, x + width - rx);
        self.h_line(x + rx, y, x + width - rx);
        self.v_line(x + width, y + ry, y + height - ry);
        self.v_line(x, y + ry, y + height - ry);

        // Octant where x changes fastest.
        for _ in 0..dxt {
            xp -= 1;
            d += t - b2;

            let ys;
            if d >= 0 {
                ys = yp - 1;
            } else if d - s - a2 > 0 {
                if 2 * d - s - a2 >= 0 {
                    ys = yp + 1;
                } else {
                    ys = yp;
                    yp += 1;
                    d -= s + a2;
                    s += ds;
                }
            } else {
                yp += 1;
                ys = yp + 1;
                d -= s + a2;
                s += ds;
            }

            t -= dt;

            let mut weight = residual_ratio(d, s);
            let mut iweight = 1.0 - weight;
            if hard_edge {
                if yp > ys {
                    iweight = 1.0;
                }
                if ys > yp {
                    weight = 1.0;
                }
            }

            let xx = xc2 - xp + width;
            self.put_color(xp, yp, false, iweight);
            self.put_color(xx, yp, false, iweight);
            self.put_color(xp, ys, false, weight);
            self.put_color(xx, ys, false, weight);

            let yy = yc2 - yp + height;
            self.put_color(xp, yy, false, iweight);
            self.put_color(xx, yy, false, iweight);
            let yy = yc2 - ys + height;
            self.put_color(xp, yy, false, weight);
            self.put_color(xx, yy, false, weight);
        }

        // Octant where y changes fastest.
        for _ in 0..dyt {
            yp += 1;
            d -= s + a2;

            let xs;
            if d <= 0 {
                xs = xp + 1;
            } else if d + t - b2 < 0 {
                if 2 * d + t - b2 <= 0 {
                    xs = xp - 1;
                } else {
                    xs = xp;
                    xp -= 1;
                    d += t - b2;
                    t -= dt;
                }
            } else {
                xp -= 1;
                xs = xp - 1;
                d += t - b2;
                t -= dt;
            }

            s += ds;

            let weight = residual_ratio(d, t);
            let iweight = 1.0 - weight;

            let xx = xc2 - xp + width;
            let yy = yc2 - yp + height;
            self.put_color(xp, yp, false, iweight);
            self.put_color(xx, yp, false, iweight);
            self.put_color(xp, yy, false, iweight);
            self.put_color(xx, yy, false, iweight);

            let xx = xc2 - xs + width;
            self.put_color(xs, yp, false, weight);
            self.put_color(xx, yp, false, weight);
            self.put_color(xs, yy, false, weight);
            self.put_color(xx, yy, false, weight);
        }
    }
}

/// `|d| / |step|` clamped to one; a zero step counts as full coverage.
fn residual_ratio(d: i32, step: i32) -> f64 {
    if step == 0 {
        return 1.0;
    }
    f64::min((d as f64).abs() / (step as f64).abs(), 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::config::CanvasConfig;
    use crate::testing::MemorySurface;
    use std::collections::BTreeSet;

    fn canvas() -> Canvas<'static, MemorySurface> {
        let config = CanvasConfig::new(64, 128)
            .with_antialiasing(true)
            .with_colors(Rgb::WHITE, Rgb::BLACK);
        Canvas::new(MemorySurface::new(64, 128), config)
    }

    fn painted(c: &Canvas<'_, MemorySurface>) -> BTreeSet<(i32, i32)> {
        c.surface().painted().into_iter().collect()
    }

    #[test]
    fn test_fractional_parts() {
        assert_eq!(ipart(2.75), 2);
        assert_eq!(ipart(-0.25), -1);
        assert!((fpart(2.75) - 0.75).abs() < 1e-12);
        assert!((rfpart(2.75) - 0.25).abs() < 1e-12);
        assert_eq!(residual_ratio(5, 0), 1.0);
        assert_eq!(residual_ratio(-5, 10), 0.5);
        assert_eq!(residual_ratio(30, -10), 1.0);
    }

    #[test]
    fn test_wu_line_covers_every_column() {
        let mut c = canvas();
        c.draw_line(0, 0, 10, 5);
        let p = painted(&c);
        for x in 0..=10 {
            assert!(p.iter().any(|q| q.0 == x), "column {x} empty");
        }
        for &(x, y) in &p {
            let ideal = x as f64 * 0.5;
            assert!((y as f64 - ideal).abs() <= 1.5, "({x}, {y}) off the line");
        }
        // Endpoints get half coverage.
        let start = c.surface().color_at(0, 0);
        assert!(start.red > 100 && start.red < 160);
    }

    #[test]
    fn test_wu_line_interior_blends_pairs() {
        let mut c = canvas();
        c.draw_line(0, 0, 8, 2);
        let s = c.surface();
        // At x = 2 the ideal y is 0.5: both neighbours get half coverage.
        let upper = s.color_at(2, 0);
        let lower = s.color_at(2, 1);
        assert!(upper.red > 100 && upper.red < 160);
        assert!(lower.red > 100 && lower.red < 160);
        // At x = 4 the ideal y is exactly 1.
        assert_eq!(s.color_at(4, 1), Rgb::WHITE);
    }

    #[test]
    fn test_wu_steep_line_is_transposed() {
        let mut c = canvas();
        c.draw_line(3, 0, 6, 12);
        let p = painted(&c);
        for y in 0..=12 {
            assert!(p.iter().any(|q| q.1 == y), "row {y} empty");
        }
        for &(x, y) in &p {
            let ideal = 3.0 + y as f64 * 0.25;
            assert!((x as f64 - ideal).abs() <= 1.5);
        }
    }

    #[test]
    fn test_aliased_line_ignores_coverage() {
        let mut c = canvas();
        c.enable_antialiasing(false);
        c.draw_line(0, 0, 8, 2);
        assert_eq!(c.surface().painted().len(), 9);
        assert!(c
            .surface()
            .painted()
            .iter()
            .all(|&(x, y)| c.surface().color_at(x, y) == Rgb::WHITE));
    }

    #[test]
    fn test_thick_line_cross_section() {
        let mut c = canvas();
        c.enable_antialiasing(false);
        c.set_line_width(5);
        c.draw_line(10, 20, 40, 20);
        let p = painted(&c);
        let column: BTreeSet<i32> = p.iter().filter(|q| q.0 == 25).map(|q| q.1).collect();
        assert!(column.len() >= 3, "cross-section {column:?}");
        assert!(column.contains(&20));
        assert!(p.iter().all(|&(_, y)| (y - 20).abs() <= 4));
        assert!(p.iter().all(|&(x, _)| (9..=41).contains(&x)));
        assert_eq!(c.surface().color_at(25, 20), Rgb::WHITE);
    }

    #[test]
    fn test_thick_diagonal_reaches_both_ends() {
        let mut c = canvas();
        c.set_line_width(3);
        c.draw_line(5, 5, 25, 15);
        let p = painted(&c);
        assert!(p.contains(&(5, 5)));
        assert!(p.iter().any(|&(x, y)| (x - 25).abs() <= 1 && (y - 15).abs() <= 1));
        for &(x, y) in &p {
            // Distance to the ideal segment stays within the half width
            // plus a pixel of slack.
            let (vx, vy) = (20.0, 10.0);
            let (px, py) = ((x - 5) as f64, (y - 5) as f64);
            let dist = (px * vy - py * vx).abs() / libm::sqrt(vx * vx + vy * vy);
            assert!(dist <= 3.0, "({x}, {y}) is {dist} away");
        }
    }

    #[test]
    fn test_antialiased_circle_stays_on_ring() {
        let mut c = canvas();
        let (cx, cy, r) = (30, 30, 10);
        c.draw_circle(cx, cy, r);
        let p = painted(&c);
        assert!(p.len() > 40);
        for &(x, y) in &p {
            let d = libm::sqrt(((x - cx) * (x - cx) + (y - cy) * (y - cy)) as f64);
            assert!((d - r as f64).abs() <= 2.0, "({x}, {y}) at {d}");
            assert!(p.contains(&(2 * cx - x, y)));
            assert!(p.contains(&(x, 2 * cy - y)));
        }
        for q in [(cx, cy - r), (cx, cy + r), (cx - r, cy), (cx + r, cy)] {
            assert!(p.contains(&q));
        }
    }

    #[test]
    fn test_antialiased_fill_circle_keeps_solid_interior() {
        let mut c = canvas();
        let (cx, cy, r) = (30, 30, 8);
        c.fill_circle(cx, cy, r);
        let s = c.surface();
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    assert_eq!(s.color_at(cx + dx, cy + dy), Rgb::WHITE);
                }
            }
        }
    }

    #[test]
    fn test_rounded_rect_degenerate_radius() {
        let mut c = canvas();
        c.rasterize_rounded_rect(5, 10, 0, 0, 0, 3, false);
        let expected: BTreeSet<_> = (7..=13).map(|y| (5, y)).collect();
        assert_eq!(painted(&c), expected);

        let mut c = canvas();
        c.rasterize_rounded_rect(10, 5, 0, 0, 2, 0, false);
        let expected: BTreeSet<_> = (8..=12).map(|x| (x, 5)).collect();
        assert_eq!(painted(&c), expected);

        let mut c = canvas();
        c.rasterize_rounded_rect(10, 5, 4, 4, -1, 2, false);
        assert!(painted(&c).is_empty());
    }

    #[test]
    fn test_antialiased_round_rectangle_straight_edges() {
        let mut c = canvas();
        c.draw_round_rectangle(4, 4, 30, 20, 6);
        let s = c.surface();
        assert_eq!(s.color_at(19, 4), Rgb::WHITE);
        assert_eq!(s.color_at(19, 24), Rgb::WHITE);
        assert_eq!(s.color_at(4, 14), Rgb::WHITE);
        assert_eq!(s.color_at(34, 14), Rgb::WHITE);
        assert!(!s.is_painted(19, 14));
        assert!(!s.is_painted(4, 4));
    }

    #[test]
    fn test_antialiased_oval_bounds() {
        let mut c = canvas();
        c.draw_oval(2, 2, 41, 21);
        let p = painted(&c);
        assert!(p.contains(&(22, 2)));
        assert!(p.contains(&(22, 22)));
        assert!(p.iter().all(|&(x, y)| (0..=44).contains(&x) && (0..=24).contains(&y)));
    }
}
