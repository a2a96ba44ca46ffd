use crate::assets::decode::PreparedImage;
use crate::compose::background::BackgroundSpec;
use crate::compose::frame::FrameRGBA;
use crate::compose::layout::LayoutSpec;
use crate::foundation::core::Rgba8;
use crate::foundation::error::TypewaveResult;
use crate::foundation::math::blend_over_straight;
use crate::text::face::Typeface;
use crate::timeline::reveal::RevealState;

/// Glyph coverage at or above this paints the text color; below is left untouched.
const COVERAGE_THRESHOLD: u8 = 128;

/// Turns a [`RevealState`] into a raster frame over a fixed layout.
///
/// Background and portrait never change during a job, so they are composed once into a base
/// frame that every output frame starts from.
#[derive(Clone, Debug)]
pub struct Compositor {
    layout: LayoutSpec,
    text_color: Rgba8,
    base: FrameRGBA,
}

impl Compositor {
    /// Compose the static layers (background, then portrait) for `layout`.
    pub fn new(
        layout: LayoutSpec,
        background: &BackgroundSpec,
        portrait: Option<&PreparedImage>,
        text_color: Rgba8,
    ) -> TypewaveResult<Self> {
        let mut base = FrameRGBA::transparent(layout.canvas);
        background.paint(&mut base)?;

        if let (Some(slot), Some(img)) = (layout.portrait, portrait) {
            blit_over(&mut base, img, slot.x, slot.y);
        }

        Ok(Self {
            layout,
            text_color,
            base,
        })
    }

    /// Static geometry.
    pub fn layout(&self) -> &LayoutSpec {
        &self.layout
    }

    /// Background and portrait without any text.
    pub fn base_frame(&self) -> &FrameRGBA {
        &self.base
    }

    /// Render one frame: every finished line, then the current line's revealed prefix.
    pub fn render(&self, state: &RevealState, lines: &[String], face: &dyn Typeface) -> FrameRGBA {
        let mut frame = self.base.clone();
        let visible = self.layout.visible_lines(lines);

        for (i, line) in visible.iter().enumerate() {
            let text = if i < state.current_line {
                line.as_str()
            } else if i == state.current_line {
                char_prefix(line, state.chars_revealed)
            } else {
                break;
            };
            self.draw_line(&mut frame, i, text, face);
        }
        frame
    }

    fn draw_line(&self, frame: &mut FrameRGBA, slot: usize, text: &str, face: &dyn Typeface) {
        if text.is_empty() {
            return;
        }
        let origin_x = i64::from(self.layout.text_x);
        let baseline = self.layout.line_top(slot) + i64::from(face.ascent());
        let color = self.text_color.to_array();

        let mut pen = 0.0f32;
        let mut prev = None;
        for ch in text.chars() {
            if let Some(p) = prev {
                pen += face.kern(p, ch);
            }
            let glyph = face.glyph(ch);
            let gx = origin_x + pen.round() as i64 + i64::from(glyph.xmin);
            let gy = baseline - (glyph.height as i64 + i64::from(glyph.ymin));

            for row in 0..glyph.height {
                for col in 0..glyph.width {
                    if glyph.coverage[row * glyph.width + col] < COVERAGE_THRESHOLD {
                        continue;
                    }
                    if let Some(dst) = frame.pixel_mut(gx + col as i64, gy + row as i64) {
                        blend_over_straight(dst, color);
                    }
                }
            }

            pen += glyph.advance;
            prev = Some(ch);
        }
    }
}

/// First `n` characters of `line` (the whole line when shorter).
fn char_prefix(line: &str, n: usize) -> &str {
    match line.char_indices().nth(n) {
        Some((byte, _)) => &line[..byte],
        None => line,
    }
}

/// Source-over blit of `img` with its top-left at `(x, y)`, clipped to the frame.
fn blit_over(frame: &mut FrameRGBA, img: &PreparedImage, x: u32, y: u32) {
    for row in 0..img.height {
        for col in 0..img.width {
            let (px, py) = (i64::from(x) + i64::from(col), i64::from(y) + i64::from(row));
            let Some(dst) = frame.pixel_mut(px, py) else {
                continue;
            };
            blend_over_straight(dst, img.pixel(col, row));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
