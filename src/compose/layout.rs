use serde::{Deserialize, Serialize};

use crate::foundation::core::Canvas;
use crate::foundation::error::{TypewaveError, TypewaveResult};
use crate::text::face::Typeface;

/// How the canvas size is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LayoutMode {
    /// Canvas derived from the wrapped text (and portrait) size.
    PixelPerfect {
        /// Wrap width for the text block, in pixels.
        max_text_width: u32,
    },
    /// Caller-specified canvas; lines that do not fit vertically are dropped.
    FixedBox {
        /// Canvas width in pixels (rounded up to even).
        width: u32,
        /// Canvas height in pixels (rounded up to even).
        height: u32,
    },
}

impl LayoutMode {
    /// Pixel width lines are wrapped to in this mode.
    pub fn wrap_width(self, padding: u32) -> TypewaveResult<u32> {
        match self {
            Self::PixelPerfect { max_text_width } => {
                if max_text_width == 0 {
                    return Err(TypewaveError::invalid_geometry(
                        "max text width must be > 0",
                    ));
                }
                Ok(max_text_width)
            }
            Self::FixedBox { width, .. } => {
                let inner = i64::from(width) - 2 * i64::from(padding);
                if inner <= 0 {
                    return Err(TypewaveError::invalid_geometry(format!(
                        "padding {padding} leaves no room inside a {width} px wide box"
                    )));
                }
                Ok(inner as u32)
            }
        }
    }
}

/// Rectangle occupied by the portrait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortraitSlot {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Resolved static geometry of one render job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutSpec {
    /// Mode the geometry was derived from.
    pub mode: LayoutMode,
    /// Output canvas, both dimensions even.
    pub canvas: Canvas,
    /// Inset around content.
    pub padding: u32,
    /// Portrait placement, if a portrait is drawn.
    pub portrait: Option<PortraitSlot>,
    /// Top-left corner of the first line slot.
    pub text_x: u32,
    /// Top-left corner of the first line slot.
    pub text_y: u32,
    /// Height of one line slot.
    pub line_height: u32,
    /// Number of line slots that fit on the canvas.
    pub max_lines: usize,
}

impl LayoutSpec {
    /// Canvas sized to the content: text block next to an optional portrait, all inset by
    /// `padding`.
    pub fn pixel_perfect(
        lines: &[String],
        face: &dyn Typeface,
        max_text_width: u32,
        padding: u32,
        portrait: Option<(u32, u32)>,
        portrait_gap: u32,
    ) -> TypewaveResult<Self> {
        let line_height = face.line_height();
        if line_height == 0 {
            return Err(TypewaveError::invalid_geometry("font line height is 0"));
        }

        let text_width = lines.iter().map(|l| face.measure(l)).max().unwrap_or(0);
        let text_height = line_height as u64 * lines.len() as u64;

        let (portrait_w, portrait_h) = portrait.unwrap_or((0, 0));
        let portrait_span = if portrait.is_some() {
            u64::from(portrait_w) + u64::from(portrait_gap)
        } else {
            0
        };

        let width = u64::from(text_width) + portrait_span + 2 * u64::from(padding);
        let height = text_height.max(u64::from(portrait_h)) + 2 * u64::from(padding);
        let canvas = checked_canvas(width, height)?;

        Ok(Self {
            mode: LayoutMode::PixelPerfect { max_text_width },
            canvas,
            padding,
            portrait: portrait.map(|(w, h)| PortraitSlot {
                x: padding,
                y: padding,
                width: w,
                height: h,
            }),
            text_x: padding + portrait_span as u32,
            text_y: padding,
            line_height,
            max_lines: lines.len(),
        })
    }

    /// Caller-sized canvas; as many line slots as fit between the paddings.
    pub fn fixed_box(
        width: u32,
        height: u32,
        padding: u32,
        line_height: u32,
    ) -> TypewaveResult<Self> {
        if line_height == 0 {
            return Err(TypewaveError::invalid_geometry("font line height is 0"));
        }
        let canvas = checked_canvas(u64::from(width), u64::from(height))?;
        if 2 * u64::from(padding) >= u64::from(canvas.width)
            || 2 * u64::from(padding) >= u64::from(canvas.height)
        {
            return Err(TypewaveError::invalid_geometry(format!(
                "padding {padding} exceeds the {}x{} canvas",
                canvas.width, canvas.height
            )));
        }

        // Slots come from the requested height; the even-rounding row holds no text.
        let inner_height = u64::from(height).saturating_sub(2 * u64::from(padding));
        let max_lines = (inner_height / u64::from(line_height)) as usize;
        if max_lines == 0 {
            return Err(TypewaveError::invalid_geometry(format!(
                "box height {height} cannot fit a single {line_height} px line"
            )));
        }

        Ok(Self {
            mode: LayoutMode::FixedBox { width, height },
            canvas,
            padding,
            portrait: None,
            text_x: padding,
            text_y: padding,
            line_height,
            max_lines,
        })
    }

    /// The prefix of `lines` that has a slot on the canvas.
    pub fn visible_lines<'a>(&self, lines: &'a [String]) -> &'a [String] {
        &lines[..lines.len().min(self.max_lines)]
    }

    /// Top edge of line slot `index`.
    pub fn line_top(&self, index: usize) -> i64 {
        i64::from(self.text_y) + index as i64 * i64::from(self.line_height)
    }
}

fn checked_canvas(width: u64, height: u64) -> TypewaveResult<Canvas> {
    if width == 0 || height == 0 {
        return Err(TypewaveError::invalid_geometry(format!(
            "canvas {width}x{height} has a zero dimension"
        )));
    }
    // Leave room for the even round-up.
    let limit = u64::from(u32::MAX - 1);
    if width > limit || height > limit {
        return Err(TypewaveError::invalid_geometry(format!(
            "canvas {width}x{height} is too large"
        )));
    }
    Ok(Canvas::even(width as u32, height as u32))
}

#[cfg(test)]
#[path = "../../tests/unit/compose/layout.rs"]
mod tests;
