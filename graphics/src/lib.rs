//! TFT Graphics
//!
//! A 2D rendering engine for small SPI/parallel TFT panels. It keeps no
//! framebuffer: every primitive is turned into address windows and pixel
//! streams on a [`DeviceSurface`].
//!
//! # Architecture
//!
//! - `color`: RGB565 packing and the two blend formulas
//! - `surface`: the device contract implemented per panel driver
//! - `config`: orientation, scroll flags and canvas construction options
//! - `canvas`: drawing state and the pixel/fill funnel
//! - `scroll`: hardware scroll, wrap/clip addressing
//! - `raster`: lines, rectangles, circles, ovals, bitmaps
//! - `antialias`: Wu lines, thick lines and coverage rings
//! - `font`: binary fonts, kerning and text output

#![cfg_attr(not(test), no_std)]

mod antialias;
pub mod canvas;
pub mod color;
pub mod config;
pub mod font;
pub mod raster;
pub mod scroll;
pub mod surface;

#[cfg(test)]
mod testing;

use core::fmt;

pub use canvas::Canvas;
pub use color::{Rgb, Rgb565};
pub use config::{CanvasConfig, Orientation, ScrollFlags};
pub use font::{Font, FontKind, Glyph};
pub use surface::DeviceSurface;

/// Graphics error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicsError {
    /// Font blob does not start with `ZF`.
    InvalidFontSignature,
    /// Font kind byte is neither bitmask nor antialiased.
    UnsupportedFontKind(u8),
    /// Font blob ends inside its header.
    FontTooShort,
    /// Pixel buffer holds fewer than `width * height` entries.
    BitmapTooSmall { expected: usize, actual: usize },
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsError::InvalidFontSignature => write!(f, "invalid font signature"),
            GraphicsError::UnsupportedFontKind(kind) => write!(f, "unsupported font kind {}", kind),
            GraphicsError::FontTooShort => write!(f, "font header truncated"),
            GraphicsError::BitmapTooSmall { expected, actual } => {
                write!(f, "bitmap needs {} pixels, got {}", expected, actual)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn test_error_display() {
        assert_eq!(
            GraphicsError::UnsupportedFontKind(9).to_string(),
            "unsupported font kind 9"
        );
        assert_eq!(
            GraphicsError::BitmapTooSmall {
                expected: 4,
                actual: 3
            }
            .to_string(),
            "bitmap needs 4 pixels, got 3"
        );
    }
}
