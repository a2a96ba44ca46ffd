use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::Canvas;
use crate::foundation::error::{TypewaveError, TypewaveResult};

/// Decoded raster image in straight-alpha RGBA8 form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major straight-alpha RGBA8.
    pub rgba8: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Wrap raw RGBA8 bytes; `rgba8.len()` must equal `width * height * 4`.
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> TypewaveResult<Self> {
        if rgba8.len() != width as usize * height as usize * 4 {
            return Err(TypewaveError::validation(format!(
                "image data size mismatch: got {} bytes for {width}x{height}",
                rgba8.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8: Arc::new(rgba8),
        })
    }

    /// Pixel at `(x, y)` (caller keeps coordinates in range).
    pub(crate) fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.rgba8[i],
            self.rgba8[i + 1],
            self.rgba8[i + 2],
            self.rgba8[i + 3],
        ]
    }

    /// Nearest-neighbour resample to `canvas` size (no-op when already that size).
    pub fn scaled_to(&self, canvas: Canvas) -> TypewaveResult<Self> {
        if self.width == canvas.width && self.height == canvas.height {
            return Ok(self.clone());
        }
        let src = image::RgbaImage::from_raw(self.width, self.height, self.rgba8.to_vec())
            .ok_or_else(|| TypewaveError::validation("image buffer does not match its size"))?;
        let scaled = image::imageops::resize(
            &src,
            canvas.width,
            canvas.height,
            image::imageops::FilterType::Nearest,
        );
        Self::from_rgba8(canvas.width, canvas.height, scaled.into_raw())
    }
}

/// Decode PNG/JPEG/BMP/... bytes into a [`PreparedImage`].
pub fn decode_image(bytes: &[u8]) -> TypewaveResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(PreparedImage {
        width,
        height,
        rgba8: Arc::new(rgba.into_raw()),
    })
}

/// Read and decode an image file.
pub fn load_image(path: &Path) -> TypewaveResult<PreparedImage> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read image '{}'", path.display()))?;
    decode_image(&bytes).map_err(|e| {
        TypewaveError::Other(anyhow::anyhow!("decode image '{}': {e}", path.display()))
    })
}
