//! Hardware scrolling and coordinate addressing.
//!
//! The controller scrolls by rotating which RAM line is shown first, so
//! the device RAM behaves as a circular buffer of `device_height` lines
//! along the long axis. Two addressing modes sit on top of it:
//!
//! - clip mode (`relative_origin`): logical coordinates are used as is
//!   and anything at or past the scroll edge is dropped;
//! - wrap mode: the long-axis coordinate is offset by the current scroll
//!   modulo `device_height`, and fills that straddle the seam are split.

use crate::canvas::Canvas;
use crate::config::ScrollFlags;
use crate::surface::DeviceSurface;

/// Inclusive device-space rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl DeviceRect {
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }
}

/// At most two rectangles: a fill either maps straight through or is
/// split once at the wrap seam.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceRects {
    rects: [DeviceRect; 2],
    len: usize,
}

impl DeviceRects {
    fn none() -> Self {
        Self::default()
    }

    fn one(rect: DeviceRect) -> Self {
        Self {
            rects: [rect, DeviceRect::default()],
            len: 1,
        }
    }

    fn two(first: DeviceRect, second: DeviceRect) -> Self {
        Self {
            rects: [first, second],
            len: 2,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> core::slice::Iter<'_, DeviceRect> {
        self.rects[..self.len].iter()
    }
}

/// Longest ease-in/ease-out ramp of a smooth scroll, in steps.
const EASING_STEPS: i32 = 5;
/// Quadratic ramp multiplier (halved when applied).
const EASING_FACTOR: i32 = 3;
/// Base delay per step when the exposed band is cleaned.
const CLEAN_STEP_DELAY_MS: i32 = 8;
/// Base delay per step otherwise.
const STEP_DELAY_MS: i32 = 15;

impl<'f, S: DeviceSurface> Canvas<'f, S> {
    /// Map a logical pixel to device space, or `None` if it is clipped.
    pub(crate) fn resolve_pixel(&self, x: i32, y: i32) -> Option<(i32, i32)> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }

        if self.relative_origin {
            if self.current_scroll != 0 {
                let edge = self.current_scroll;
                let c = if self.landscape { x } else { y };
                if (!self.scroll_clean_mode && c == edge) || c > edge {
                    return None;
                }
            }
            Some((x, y))
        } else {
            let period = self.device_height;
            if self.landscape {
                Some(((x + period + self.current_scroll) % period, y))
            } else {
                Some((x, (y + period + self.current_scroll) % period))
            }
        }
    }

    /// Clip a logical rectangle and map it to one or two device
    /// rectangles.
    pub(crate) fn resolve_fill(&self, x1: i32, y1: i32, x2: i32, y2: i32) -> DeviceRects {
        let (mut x1, mut x2) = if x2 < x1 { (x2, x1) } else { (x1, x2) };
        let (mut y1, mut y2) = if y2 < y1 { (y2, y1) } else { (y1, y2) };

        if x1 >= self.width || y1 >= self.height {
            return DeviceRects::none();
        }
        if x1 < 0 {
            if x2 < 0 {
                return DeviceRects::none();
            }
            x1 = 0;
        }
        if y1 < 0 {
            if y2 < 0 {
                return DeviceRects::none();
            }
            y1 = 0;
        }
        x2 = x2.min(self.width - 1);
        y2 = y2.min(self.height - 1);

        if self.current_scroll == 0 {
            return DeviceRects::one(DeviceRect::new(x1, y1, x2, y2));
        }

        let edge = self.current_scroll;
        if self.relative_origin {
            if self.landscape {
                if x2 >= edge {
                    if x1 >= edge {
                        return DeviceRects::none();
                    }
                    x2 = edge - 1;
                }
            } else if y2 >= edge {
                if y1 >= edge {
                    return DeviceRects::none();
                }
                y2 = edge - 1;
            }
            return DeviceRects::one(DeviceRect::new(x1, y1, x2, y2));
        }

        let period = self.device_height;
        if self.landscape {
            let (a, b) = ((x1 + edge) % period, (x2 + edge) % period);
            if a > b {
                DeviceRects::two(
                    DeviceRect::new(a, y1, period - 1, y2),
                    DeviceRect::new(0, y1, b, y2),
                )
            } else {
                DeviceRects::one(DeviceRect::new(a, y1, b, y2))
            }
        } else {
            let (a, b) = ((y1 + edge) % period, (y2 + edge) % period);
            if a > b {
                DeviceRects::two(
                    DeviceRect::new(x1, a, x2, period - 1),
                    DeviceRect::new(x1, 0, x2, b),
                )
            } else {
                DeviceRects::one(DeviceRect::new(x1, a, x2, b))
            }
        }
    }

    /// Allow or forbid scrolling.
    pub fn enable_scroll(&mut self, enable: bool) {
        self.scroll_enabled = enable;
    }

    /// Scrolling is both enabled and supported by the controller.
    pub fn can_scroll(&self) -> bool {
        self.scroll_enabled && self.scroll_supported
    }

    /// Current hardware scroll offset, in `[0, device_height)`.
    pub fn current_scroll(&self) -> i32 {
        self.current_scroll
    }

    /// Complement of the scroll offset used by the flipped orientations.
    pub fn flip_scroll(&self) -> i32 {
        self.flip_scroll
    }

    /// Scroll the whole display width by `dy` lines.
    pub fn scroll(&mut self, dy: i32, flags: ScrollFlags) {
        self.scroll_span(dy, 0, self.device_width, flags);
    }

    /// Scroll by `dy` lines.
    ///
    /// `x1..x2` bounds the band cleaned by [`ScrollFlags::CLEAN`] across
    /// the axis that does not scroll. With [`ScrollFlags::SMOOTH`] the
    /// move is split into unit steps paced by [`DeviceSurface::delay_ms`];
    /// this blocks the calling thread until the animation ends.
    pub fn scroll_span(&mut self, dy: i32, x1: i32, x2: i32, flags: ScrollFlags) {
        if !self.can_scroll() {
            return;
        }

        let clean = flags.contains(ScrollFlags::CLEAN);
        if dy.unsigned_abs() <= 1 || !flags.contains(ScrollFlags::SMOOTH) {
            self.scroll_step(dy, x1, x2, clean);
            return;
        }

        // Animate at most one full turn of the buffer.
        let distance = dy.unsigned_abs().min(self.device_height as u32) as i32;

        let easing = (distance / 2).min(EASING_STEPS);
        let base = if clean {
            CLEAN_STEP_DELAY_MS
        } else {
            STEP_DELAY_MS
        };
        let step = dy.signum();

        for i in 0..easing {
            let ramp = easing - i;
            self.delay(base + ramp * ramp * EASING_FACTOR / 2);
            self.scroll_step(step, x1, x2, clean);
        }
        for _ in 0..distance - easing * 2 {
            self.scroll_step(step, x1, x2, clean);
            self.delay(base + EASING_FACTOR);
        }
        for i in 1..=easing {
            self.scroll_step(step, x1, x2, clean);
            self.delay(base + i * i * EASING_FACTOR / 2);
        }
    }

    fn delay(&mut self, ms: i32) {
        self.surface.delay_ms(ms.max(0) as u32);
    }

    fn scroll_step(&mut self, dy: i32, x1: i32, x2: i32, clean: bool) {
        let flipped = self.orientation.is_flipped();
        let period = self.device_height;
        let band = dy.unsigned_abs().min(period as u32) as i32;
        let shift = if flipped { -(dy % period) } else { dy % period };

        self.current_scroll = (self.current_scroll + shift).rem_euclid(period);
        self.flip_scroll = (period - self.current_scroll) % period;
        log::trace!(
            "scroll by {}: offset {} (flip {})",
            shift,
            self.current_scroll,
            self.flip_scroll
        );

        let offset = if flipped {
            self.flip_scroll
        } else {
            self.current_scroll
        };
        self.surface.set_scroll_offset(offset);

        if !clean || band == 0 {
            return;
        }

        self.scroll_clean_mode = true;
        let saved_origin = self.relative_origin;
        let saved_scroll = self.current_scroll;
        self.relative_origin = false;
        if flipped {
            self.current_scroll = self.flip_scroll;
        }

        let color = self.background.to_rgb565();
        let (lo, hi) = (x1.min(x2), x1.max(x2) - 1);
        let (start, end) = if dy < 0 {
            (0, band - 1)
        } else {
            (period - band, period - 1)
        };
        if self.landscape {
            self.fill(color, start, lo, end, hi);
        } else {
            self.fill(color, lo, start, hi, end);
        }

        self.current_scroll = saved_scroll;
        self.relative_origin = saved_origin;
        self.scroll_clean_mode = false;
    }
}
