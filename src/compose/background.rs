use serde::{Deserialize, Serialize};

use crate::assets::decode::PreparedImage;
use crate::compose::frame::FrameRGBA;
use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::TypewaveResult;
use crate::foundation::math::lerp_u8;

/// Axis a two-color gradient is interpolated along.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientDirection {
    /// Top (start) to bottom (end).
    #[default]
    Vertical,
    /// Left (start) to right (end).
    Horizontal,
}

impl std::str::FromStr for GradientDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vertical" => Ok(Self::Vertical),
            "horizontal" => Ok(Self::Horizontal),
            other => Err(format!(
                "unknown gradient direction \"{other}\" (expected vertical|horizontal)"
            )),
        }
    }
}

/// Bottom layer of every frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackgroundSpec {
    /// Flat fill.
    Solid(Rgba8),
    /// Linear two-color gradient.
    Gradient {
        /// Interpolation axis.
        direction: GradientDirection,
        /// Color at row/column 0.
        start: Rgba8,
        /// Color at the last row/column.
        end: Rgba8,
    },
    /// Decoded image, stretched to the canvas.
    Image(PreparedImage),
}

impl BackgroundSpec {
    /// Paint this background over the whole of `frame`.
    pub fn paint(&self, frame: &mut FrameRGBA) -> TypewaveResult<()> {
        match self {
            Self::Solid(color) => {
                paint_solid(frame, *color);
                Ok(())
            }
            Self::Gradient {
                direction,
                start,
                end,
            } => {
                paint_gradient(frame, *direction, *start, *end);
                Ok(())
            }
            Self::Image(img) => paint_image(frame, img),
        }
    }

    /// Color translucent pixels are flattened over by opaque-only encoders.
    pub fn matte(&self) -> Rgba8 {
        match self {
            Self::Solid(c) => Rgba8 { a: 255, ..*c },
            Self::Gradient { start, .. } => Rgba8 { a: 255, ..*start },
            Self::Image(_) => Rgba8::BLACK,
        }
    }
}

fn paint_solid(frame: &mut FrameRGBA, color: Rgba8) {
    let px = color.to_array();
    for dst in frame.data.chunks_exact_mut(4) {
        dst.copy_from_slice(&px);
    }
}

fn gradient_color(start: Rgba8, end: Rgba8, pos: u32, len: u32) -> [u8; 4] {
    let t = if len <= 1 {
        0.0
    } else {
        f64::from(pos) / f64::from(len - 1)
    };
    [
        lerp_u8(start.r, end.r, t),
        lerp_u8(start.g, end.g, t),
        lerp_u8(start.b, end.b, t),
        lerp_u8(start.a, end.a, t),
    ]
}

fn paint_gradient(frame: &mut FrameRGBA, direction: GradientDirection, start: Rgba8, end: Rgba8) {
    let (w, h) = (frame.width as usize, frame.height as usize);
    if w == 0 || h == 0 {
        return;
    }
    match direction {
        GradientDirection::Vertical => {
            for y in 0..h {
                let px = gradient_color(start, end, y as u32, frame.height);
                for dst in frame.data[y * w * 4..(y + 1) * w * 4].chunks_exact_mut(4) {
                    dst.copy_from_slice(&px);
                }
            }
        }
        GradientDirection::Horizontal => {
            let columns: Vec<[u8; 4]> = (0..frame.width)
                .map(|x| gradient_color(start, end, x, frame.width))
                .collect();
            for row in frame.data.chunks_exact_mut(w * 4) {
                for (dst, px) in row.chunks_exact_mut(4).zip(&columns) {
                    dst.copy_from_slice(px);
                }
            }
        }
    }
}

fn paint_image(frame: &mut FrameRGBA, img: &PreparedImage) -> TypewaveResult<()> {
    let scaled = img.scaled_to(Canvas {
        width: frame.width,
        height: frame.height,
    })?;
    frame.data.copy_from_slice(&scaled.rgba8);
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/compose/background.rs"]
mod tests;
