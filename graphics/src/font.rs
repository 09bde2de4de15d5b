//! Binary font decoding and text layout.
//!
//! Fonts are read in place from a caller-owned blob:
//!
//! ```text
//! header   'Z' 'F' kind line_height baseline
//! glyph    code:u16be length:u16be width
//!          [col_major:1 margin_left:7] margin_top
//!          [compressed:1 margin_right:7] payload...
//! ...
//! end      code 0
//! ```
//!
//! `length` counts the 8-byte glyph header. In column-major glyphs the
//! right margin field holds the bottom margin.

use crate::canvas::Canvas;
use crate::color::Rgb;
use crate::surface::DeviceSurface;
use crate::GraphicsError;

/// First two bytes of every font blob.
pub const FONT_SIGNATURE: [u8; 2] = *b"ZF";
/// Offset of the first glyph record.
pub const HEADER_LENGTH: usize = 5;
/// Fixed part of a glyph record.
pub const GLYPH_HEADER_LENGTH: usize = 8;
/// Kerning values at or below this mean "no kerning".
pub const NO_KERNING: i8 = -100;

/// Glyph encoding of a font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FontKind {
    /// One bit per pixel, optionally run-length compressed.
    Bitmask = 1,
    /// Runs plus per-pixel coverage bytes.
    Antialiased = 2,
}

impl FontKind {
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(FontKind::Bitmask),
            2 => Some(FontKind::Antialiased),
            _ => None,
        }
    }
}

/// Validated view over a font blob.
#[derive(Debug, Clone, Copy)]
pub struct Font<'a> {
    data: &'a [u8],
    kind: FontKind,
}

impl<'a> Font<'a> {
    /// Check the signature and kind. The blob is borrowed, not copied.
    pub fn parse(data: &'a [u8]) -> Result<Self, GraphicsError> {
        if data.len() < 2 || data[..2] != FONT_SIGNATURE {
            return Err(GraphicsError::InvalidFontSignature);
        }
        if data.len() < HEADER_LENGTH {
            return Err(GraphicsError::FontTooShort);
        }
        let kind = FontKind::from_code(data[2]).ok_or(GraphicsError::UnsupportedFontKind(data[2]))?;
        Ok(Font { data, kind })
    }

    pub fn kind(&self) -> FontKind {
        self.kind
    }

    /// Height of a text line in pixels.
    pub fn line_height(&self) -> u8 {
        self.data[3]
    }

    /// Distance from the top of a line to the baseline.
    pub fn baseline(&self) -> u8 {
        self.data[4]
    }

    /// Glyph records in table order.
    pub fn glyphs(&self) -> Glyphs<'a> {
        Glyphs {
            data: self.data,
            offset: HEADER_LENGTH,
        }
    }

    /// First glyph whose code point equals `code`.
    pub fn glyph(&self, code: u32) -> Option<Glyph<'a>> {
        self.glyphs().find(|g| g.code as u32 == code)
    }

    /// Walk `text`, calling `visit` with each matched glyph and its pen
    /// offset. Returns the total advance.
    pub fn layout<F>(&self, text: &str, kerning: Option<&[i8]>, mut visit: F) -> i32
    where
        F: FnMut(i32, &Glyph<'a>),
    {
        let mut kerning = Kerning::new(kerning);
        let mut pen = 0;
        for ch in text.chars() {
            let glyph = self.glyph(ch as u32);
            let adjust = kerning.next_adjustment();
            if let Some(glyph) = glyph {
                visit(pen, &glyph);
                pen += glyph.width as i32 + adjust;
            }
        }
        pen
    }

    /// Advance of `text` without drawing it.
    pub fn text_width(&self, text: &str, kerning: Option<&[i8]>) -> i32 {
        self.layout(text, kerning, |_, _| {})
    }
}

/// One glyph record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph<'a> {
    pub code: u16,
    /// Advance width; the raster spans `width - margin_left - margin_right`.
    pub width: u8,
    pub margin_left: u8,
    pub margin_top: u8,
    /// Right margin, or bottom margin for column-major glyphs.
    pub margin_right: u8,
    /// Runs advance down columns instead of along rows.
    pub column_major: bool,
    /// Run-length payload (bitmask fonts only).
    pub compressed: bool,
    pub payload: &'a [u8],
}

/// Iterator over glyph records.
///
/// Stops at the terminating zero code point, at the end of the blob, or
/// at the first corrupt record.
pub struct Glyphs<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Iterator for Glyphs<'a> {
    type Item = Glyph<'a>;

    fn next(&mut self) -> Option<Glyph<'a>> {
        let rest = self.data.get(self.offset..)?;
        if rest.len() < 4 {
            return None;
        }
        let code = u16::from_be_bytes([rest[0], rest[1]]);
        if code == 0 {
            return None;
        }
        let length = u16::from_be_bytes([rest[2], rest[3]]) as usize;
        if length < GLYPH_HEADER_LENGTH || length > rest.len() {
            log::warn!(
                "corrupt glyph record for {:#06x} at offset {} (length {})",
                code,
                self.offset,
                length
            );
            self.offset = self.data.len();
            return None;
        }

        self.offset += length;
        Some(Glyph {
            code,
            width: rest[4],
            margin_left: rest[5] & 0x7F,
            margin_top: rest[6],
            margin_right: rest[7] & 0x7F,
            column_major: rest[5] & 0x80 != 0,
            compressed: rest[7] & 0x80 != 0,
            payload: &rest[GLYPH_HEADER_LENGTH..length],
        })
    }
}

/// Sparse kerning cursor.
///
/// The active adjustment sticks until a new one is read; the cursor only
/// moves on when the following entry is not the sentinel.
struct Kerning<'k> {
    table: Option<&'k [i8]>,
    cursor: usize,
    active: Option<i8>,
}

impl<'k> Kerning<'k> {
    fn new(table: Option<&'k [i8]>) -> Self {
        Self {
            table,
            cursor: 0,
            active: None,
        }
    }

    fn entry(table: &[i8], index: usize) -> Option<i8> {
        table.get(index).copied().filter(|&v| v > NO_KERNING)
    }

    fn next_adjustment(&mut self) -> i32 {
        if let Some(table) = self.table {
            if let Some(value) = Self::entry(table, self.cursor) {
                self.active = Some(value);
                if Self::entry(table, self.cursor + 1).is_some() {
                    self.cursor += 1;
                }
            }
        }
        self.active.map_or(0, i32::from)
    }
}

/// Maps a linear payload counter onto glyph pixels.
struct GlyphRaster {
    origin_x: i32,
    origin_y: i32,
    /// Pixels per row (row-major) or per column (column-major).
    stride: i32,
    column_major: bool,
}

impl GlyphRaster {
    fn point(&self, ctr: i32) -> (i32, i32) {
        let (along, across) = (ctr % self.stride, ctr / self.stride);
        if self.column_major {
            (self.origin_x + across, self.origin_y + along)
        } else {
            (self.origin_x + along, self.origin_y + across)
        }
    }

    /// Paint `len` pixels starting at `ctr`, wrapping onto the next
    /// row or column as needed.
    fn run<S: DeviceSurface>(&self, canvas: &mut Canvas<'_, S>, ctr: i32, len: i32, color: Rgb) {
        let packed = color.to_rgb565();
        let mut pos = ctr % self.stride;
        let mut line = ctr / self.stride;
        let mut len = len;
        while len > 0 {
            let end = (pos + len).min(self.stride) - 1;
            if self.column_major {
                let x = self.origin_x + line;
                canvas.fill(packed, x, self.origin_y + pos, x, self.origin_y + end);
            } else {
                let y = self.origin_y + line;
                canvas.fill(packed, self.origin_x + pos, y, self.origin_x + end, y);
            }
            len -= end - pos + 1;
            pos = 0;
            line += 1;
        }
    }
}

impl<'f, S: DeviceSurface> Canvas<'f, S> {
    /// Make `blob` the active font.
    ///
    /// On failure the active font is cleared and text calls draw nothing
    /// until a valid font is set.
    pub fn set_font(&mut self, blob: &'f [u8]) -> Result<(), GraphicsError> {
        match Font::parse(blob) {
            Ok(font) => {
                self.font = Some(font);
                Ok(())
            }
            Err(err) => {
                log::debug!("rejecting font: {}", err);
                self.font = None;
                Err(err)
            }
        }
    }

    pub fn font(&self) -> Option<&Font<'f>> {
        self.font.as_ref()
    }

    /// Line height of the active font, 0 without one.
    pub fn text_line_height(&self) -> i32 {
        self.font.map_or(0, |f| f.line_height() as i32)
    }

    /// Baseline of the active font, 0 without one.
    pub fn text_baseline(&self) -> i32 {
        self.font.map_or(0, |f| f.baseline() as i32)
    }

    /// Width `text` would occupy, including kerning.
    pub fn text_width(&self, text: &str, kerning: Option<&[i8]>) -> i32 {
        self.font.map_or(0, |f| f.text_width(text, kerning))
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    pub fn print(&mut self, x: i32, y: i32, text: &str, kerning: Option<&[i8]>) {
        self.print_string(x, y, text, false, kerning);
    }

    /// Erase previously printed `text` by painting it in the background
    /// color.
    pub fn clean_text(&mut self, x: i32, y: i32, text: &str, kerning: Option<&[i8]>) {
        self.print_string(x, y, text, true, kerning);
    }

    pub fn print_string(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        clean: bool,
        kerning: Option<&[i8]>,
    ) {
        let Some(font) = self.font else {
            return;
        };
        let line_height = font.line_height() as i32;
        font.layout(text, kerning, |pen, glyph| {
            self.draw_glyph(font.kind(), line_height, x + pen, y, glyph, clean);
        });
    }

    fn draw_glyph(
        &mut self,
        kind: FontKind,
        line_height: i32,
        x: i32,
        y: i32,
        glyph: &Glyph<'_>,
        clean: bool,
    ) {
        let margin_left = glyph.margin_left as i32;
        let margin_top = glyph.margin_top as i32;
        let margin_right = glyph.margin_right as i32;
        let eff_width = glyph.width as i32 - margin_left - margin_right;
        let eff_height = line_height - margin_top - margin_right;

        let stride = if glyph.column_major {
            eff_height
        } else {
            eff_width
        };
        if stride <= 0 {
            log::trace!("skipping empty glyph {:#06x}", glyph.code);
            return;
        }

        let raster = GlyphRaster {
            origin_x: x + margin_left,
            origin_y: y + margin_top,
            stride,
            column_major: glyph.column_major,
        };
        match kind {
            FontKind::Antialiased => self.draw_antialiased_glyph(&raster, glyph.payload, clean),
            FontKind::Bitmask if glyph.compressed => {
                self.draw_compressed_glyph(&raster, glyph.payload, clean)
            }
            FontKind::Bitmask => self.draw_mask_glyph(&raster, glyph.payload, clean),
        }
    }

    /// Run bytes (`1x` top bits) paint or skip `b & 0x3F` pixels; coverage
    /// bytes (`00` top bits) paint one pixel blended by `b * 4`.
    fn draw_antialiased_glyph(&mut self, raster: &GlyphRaster, payload: &[u8], clean: bool) {
        let fg = self.foreground;
        let bg = self.background;
        let mut ctr = 0;
        for &b in payload {
            if b & 0xC0 != 0 {
                let len = (b & 0x3F) as i32;
                if b & 0x80 != 0 {
                    raster.run(self, ctr, len, if clean { bg } else { fg });
                }
                ctr += len;
            } else {
                let color = if clean {
                    bg
                } else {
                    let opacity = (b as u32 * 4).min(255) as u8;
                    Rgb::blend_opacity(fg, bg, opacity)
                };
                let (px, py) = raster.point(ctr);
                self.plot(px, py, color);
                ctr += 1;
            }
        }
    }

    /// Each byte is a run of `b & 0x7F` pixels, painted when the top bit
    /// is set.
    fn draw_compressed_glyph(&mut self, raster: &GlyphRaster, payload: &[u8], clean: bool) {
        let color = if clean {
            self.background
        } else {
            self.foreground
        };
        let mut ctr = 0;
        for &b in payload {
            let len = (b & 0x7F) as i32;
            if b & 0x80 != 0 {
                raster.run(self, ctr, len, color);
            }
            ctr += len;
        }
    }

    /// Eight mask bits per byte, MSB first. Clear bits are ink.
    fn draw_mask_glyph(&mut self, raster: &GlyphRaster, payload: &[u8], clean: bool) {
        let color = if clean {
            self.background
        } else {
            self.foreground
        };
        for (i, &b) in payload.iter().enumerate() {
            for bit in 0..8 {
                if b & (0x80 >> bit) == 0 {
                    let (px, py) = raster.point(i as i32 * 8 + bit);
                    self.plot(px, py, color);
                }
            }
        }
    }
}
