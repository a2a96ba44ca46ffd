use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use crate::foundation::error::{TypewaveError, TypewaveResult};

/// Coverage bitmap for one glyph, positioned relative to the pen and baseline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlyphBitmap {
    /// Bitmap width in pixels.
    pub width: usize,
    /// Bitmap height in pixels.
    pub height: usize,
    /// Horizontal offset from the pen position to the bitmap's left edge.
    pub xmin: i32,
    /// Offset from the baseline to the bitmap's bottom edge (positive = above baseline).
    pub ymin: i32,
    /// Pen advance after this glyph.
    pub advance: f32,
    /// Row-major coverage values, `width * height` bytes.
    pub coverage: Vec<u8>,
}

/// Font metrics and glyph source used for both measuring and drawing text.
///
/// Measuring through the same glyph advances the compositor draws with keeps wrapped lines
/// inside `max_width` pixel-exactly.
pub trait Typeface {
    /// Distance between stacked line slots, in pixels.
    fn line_height(&self) -> u32;

    /// Baseline offset from the top of a line slot, in pixels.
    fn ascent(&self) -> i32;

    /// Bitmap and advance for `ch`.
    fn glyph(&self, ch: char) -> Cow<'_, GlyphBitmap>;

    /// Kerning adjustment between two consecutive characters.
    fn kern(&self, _left: char, _right: char) -> f32 {
        0.0
    }

    /// Pixel width of `text` on a single line.
    fn measure(&self, text: &str) -> u32 {
        let mut pen = 0.0f32;
        let mut prev = None;
        for ch in text.chars() {
            if let Some(p) = prev {
                pen += self.kern(p, ch);
            }
            pen += self.glyph(ch).advance;
            prev = Some(ch);
        }
        pen.max(0.0).ceil() as u32
    }
}

/// `fontdue`-backed typeface at a fixed pixel size.
pub struct FontFace {
    font: fontdue::Font,
    size_px: f32,
    ascent: i32,
    line_height: u32,
    glyph_cache: HashMap<char, GlyphBitmap>,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("size_px", &self.size_px)
            .field("ascent", &self.ascent)
            .field("line_height", &self.line_height)
            .field("cached_glyphs", &self.glyph_cache.len())
            .finish()
    }
}

impl FontFace {
    /// Parse a TTF/OTF font from raw bytes.
    pub fn from_bytes(bytes: Vec<u8>, size_px: f32) -> TypewaveResult<Self> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(TypewaveError::validation(
                "font size must be finite and > 0",
            ));
        }

        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| TypewaveError::missing_asset(format!("failed to parse font: {e}")))?;

        let (ascent, line_height) = match font.horizontal_line_metrics(size_px) {
            Some(m) => (
                m.ascent.ceil() as i32,
                (m.ascent - m.descent).ceil().max(1.0) as u32,
            ),
            None => (size_px.ceil() as i32, size_px.ceil().max(1.0) as u32),
        };

        Ok(Self {
            font,
            size_px,
            ascent,
            line_height,
            glyph_cache: HashMap::new(),
        })
    }

    /// Read and parse a font file.
    pub fn load(path: &Path, size_px: f32) -> TypewaveResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            TypewaveError::missing_asset(format!("failed to read font '{}': {e}", path.display()))
        })?;
        Self::from_bytes(bytes, size_px)
    }

    /// Pixel size the face was loaded at.
    pub fn size_px(&self) -> f32 {
        self.size_px
    }

    /// Rasterize every distinct character of `text` ahead of the render loop.
    pub fn warm(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' || self.glyph_cache.contains_key(&ch) {
                continue;
            }
            let g = self.rasterize(ch);
            self.glyph_cache.insert(ch, g);
        }
    }

    fn rasterize(&self, ch: char) -> GlyphBitmap {
        let (metrics, coverage) = self.font.rasterize(ch, self.size_px);
        GlyphBitmap {
            width: metrics.width,
            height: metrics.height,
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            advance: metrics.advance_width,
            coverage,
        }
    }
}

impl Typeface for FontFace {
    fn line_height(&self) -> u32 {
        self.line_height
    }

    fn ascent(&self) -> i32 {
        self.ascent
    }

    fn glyph(&self, ch: char) -> Cow<'_, GlyphBitmap> {
        match self.glyph_cache.get(&ch) {
            Some(g) => Cow::Borrowed(g),
            None => Cow::Owned(self.rasterize(ch)),
        }
    }

    fn kern(&self, left: char, right: char) -> f32 {
        self.font
            .horizontal_kern(left, right, self.size_px)
            .unwrap_or(0.0)
    }
}

/// Fixed-cell face for tests: every visible character is a solid `advance x line_height` block.
#[cfg(test)]
pub(crate) struct BlockFace {
    pub(crate) advance: u32,
    pub(crate) line_height: u32,
}

#[cfg(test)]
impl Typeface for BlockFace {
    fn line_height(&self) -> u32 {
        self.line_height
    }

    fn ascent(&self) -> i32 {
        self.line_height as i32
    }

    fn glyph(&self, ch: char) -> Cow<'_, GlyphBitmap> {
        let (w, h) = if ch.is_whitespace() {
            (0, 0)
        } else {
            (self.advance as usize, self.line_height as usize)
        };
        Cow::Owned(GlyphBitmap {
            width: w,
            height: h,
            xmin: 0,
            ymin: 0,
            advance: self.advance as f32,
            coverage: vec![255; w * h],
        })
    }
}
