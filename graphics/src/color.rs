//! Color model.
//!
//! Colors are kept as 8-bit RGB triplets while drawing and packed into
//! the 16-bit 5-6-5 layout the display controller expects only at the
//! point of the pixel write.

/// 16-bit packed color: `[5 bits red][6 bits green][5 bits blue]`, MSB first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb565(pub u16);

impl Rgb565 {
    /// Raw 16-bit word as streamed to the controller.
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// High byte, sent first on 8-bit buses.
    pub const fn high_byte(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Low byte.
    pub const fn low_byte(self) -> u8 {
        self.0 as u8
    }
}

impl From<u16> for Rgb565 {
    fn from(value: u16) -> Self {
        Rgb565(value)
    }
}

impl From<Rgb565> for u16 {
    fn from(value: Rgb565) -> Self {
        value.0
    }
}

/// 8-bit per channel RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);

    /// Create a new color.
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Pack into 5-6-5. Truncates each channel to its top 5/6/5 bits.
    pub const fn to_rgb565(self) -> Rgb565 {
        Rgb565(
            ((self.red as u16 / 8) << 11) | ((self.green as u16 / 4) << 5) | (self.blue as u16 / 8),
        )
    }

    /// Expand a 5-6-5 word back to 8-bit channels, scaling so that a
    /// saturated field maps to 255.
    pub const fn from_rgb565(packed: Rgb565) -> Self {
        let p = packed.0 as u32;
        Self {
            red: (((p >> 11) & 0x1F) * 255 / 31) as u8,
            green: (((p >> 5) & 0x3F) * 255 / 63) as u8,
            blue: ((p & 0x1F) * 255 / 31) as u8,
        }
    }

    /// Linear blend of `fg` over `bg` with coverage `alpha`.
    ///
    /// `alpha` is clamped to `[0, 1]`; a non-positive alpha returns `bg`
    /// untouched.
    pub fn blend_linear(bg: Rgb, fg: Rgb, alpha: f64) -> Rgb {
        if !(alpha > 0.0) {
            return bg;
        }
        let alpha = alpha.min(1.0);
        let mix = |b: u8, f: u8| -> u8 {
            let v = libm::round(b as f64 * (1.0 - alpha) + f as f64 * alpha);
            v.clamp(0.0, 255.0) as u8
        };
        Rgb::new(
            mix(bg.red, fg.red),
            mix(bg.green, fg.green),
            mix(bg.blue, fg.blue),
        )
    }

    /// Weighted blend used by antialiased glyph pixels.
    ///
    /// `opacity` 0 is pure `fg`, 255 pure `bg`. The sum is divided by 200
    /// rather than 255, which lifts mid tones; glyph output depends on it.
    pub fn blend_opacity(fg: Rgb, bg: Rgb, opacity: u8) -> Rgb {
        let o = opacity as u32;
        let mix = |f: u8, b: u8| -> u8 {
            let v = (f as u32 * (255 - o) + b as u32 * o) / 200;
            v.min(255) as u8
        };
        Rgb::new(
            mix(fg.red, bg.red),
            mix(fg.green, bg.green),
            mix(fg.blue, bg.blue),
        )
    }
}

impl From<Rgb> for Rgb565 {
    fn from(color: Rgb) -> Self {
        color.to_rgb565()
    }
}

impl From<Rgb565> for Rgb {
    fn from(packed: Rgb565) -> Self {
        Rgb::from_rgb565(packed)
    }
}
