//! Canvas configuration.

use crate::color::Rgb;

/// Display orientation.
///
/// The discriminants match the controller-facing codes; the two flip
/// variants sort after `Landscape`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Orientation {
    #[default]
    Portrait = 0,
    Landscape = 1,
    PortraitFlip = 2,
    LandscapeFlip = 3,
}

impl Orientation {
    /// Landscape variants lay the long device axis horizontally.
    pub const fn is_landscape(self) -> bool {
        matches!(self, Orientation::Landscape | Orientation::LandscapeFlip)
    }

    /// Rotated by 180 degrees relative to the unflipped variant.
    pub const fn is_flipped(self) -> bool {
        matches!(self, Orientation::PortraitFlip | Orientation::LandscapeFlip)
    }

    /// Decode a raw orientation code. Unknown codes fall back to portrait.
    pub const fn from_code(code: u8) -> Self {
        match code {
            1 => Orientation::Landscape,
            2 => Orientation::PortraitFlip,
            3 => Orientation::LandscapeFlip,
            _ => Orientation::Portrait,
        }
    }
}

bitflags::bitflags! {
    /// Scroll behavior flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ScrollFlags: u8 {
        /// Animate in unit steps with ease-in/ease-out pacing.
        const SMOOTH = 1;
        /// Paint the newly exposed band with the background color.
        const CLEAN = 2;
    }
}

/// Initial state of a canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasConfig {
    /// Physical width in pixels as wired.
    pub width: u16,
    /// Physical height in pixels as wired.
    pub height: u16,
    /// Orientation to apply at construction. `None` derives it from the
    /// aspect ratio.
    pub orientation: Option<Orientation>,
    pub foreground: Rgb,
    pub background: Rgb,
    /// Stroke width for lines; values below one are raised to one.
    pub line_width: u16,
    pub antialiasing: bool,
    /// Clip mode when true, wrap mode when false.
    pub relative_origin: bool,
    /// Whether the controller implements hardware scrolling.
    pub scroll_supported: bool,
}

impl CanvasConfig {
    /// Configuration for a panel of the given physical size.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn with_antialiasing(mut self, enable: bool) -> Self {
        self.antialiasing = enable;
        self
    }

    pub fn with_colors(mut self, foreground: Rgb, background: Rgb) -> Self {
        self.foreground = foreground;
        self.background = background;
        self
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 240,
            height: 320,
            orientation: None,
            foreground: Rgb::WHITE,
            background: Rgb::BLACK,
            line_width: 1,
            antialiasing: false,
            relative_origin: true,
            scroll_supported: true,
        }
    }
}
