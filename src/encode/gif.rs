use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};

use crate::compose::frame::FrameRGBA;
use crate::encode::ffmpeg::{ensure_parent_dir, flatten_to_opaque_rgba8};
use crate::encode::sink::{FrameSink, SinkConfig, ensure_frame_size, ensure_increasing};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{TypewaveError, TypewaveResult};

/// Palette quantizer speed (1 = best quality, 30 = fastest).
const QUANTIZE_SPEED: i32 = 10;

/// Animated GIF written in-process, one frame at a time, looping forever.
pub struct GifSink {
    out_path: PathBuf,
    matte: [u8; 4],
    encoder: Option<GifEncoder<BufWriter<File>>>,
    delay: Option<Delay>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    scratch: Vec<u8>,
}

impl GifSink {
    /// Sink writing to `out_path`; translucent pixels are flattened over `matte`.
    pub fn new(out_path: impl Into<PathBuf>, matte: [u8; 4]) -> Self {
        Self {
            out_path: out_path.into(),
            matte,
            encoder: None,
            delay: None,
            cfg: None,
            last_idx: None,
            scratch: Vec::new(),
        }
    }
}

impl FrameSink for GifSink {
    fn begin(&mut self, cfg: SinkConfig) -> TypewaveResult<()> {
        if cfg.audio.is_some() {
            tracing::debug!("gif output has no audio track; typing sound ignored");
        }
        ensure_parent_dir(&self.out_path)?;
        let file = File::create(&self.out_path).map_err(|e| {
            TypewaveError::encode(format!(
                "failed to create gif '{}': {e}",
                self.out_path.display()
            ))
        })?;

        let mut encoder = GifEncoder::new_with_speed(BufWriter::new(file), QUANTIZE_SPEED);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| TypewaveError::encode(format!("gif header: {e}")))?;

        // 1000/fps ms per frame.
        self.delay = Some(Delay::from_numer_denom_ms(
            1000 * cfg.fps.den,
            cfg.fps.num,
        ));
        self.scratch = vec![0u8; cfg.width as usize * cfg.height as usize * 4];
        self.encoder = Some(encoder);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> TypewaveResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| TypewaveError::encode("gif sink not started"))?;
        ensure_increasing(&mut self.last_idx, idx, "gif sink")?;
        ensure_frame_size(cfg, frame)?;

        flatten_to_opaque_rgba8(&mut self.scratch, &frame.data, frame.premultiplied, self.matte)?;
        let buffer = image::RgbaImage::from_raw(frame.width, frame.height, self.scratch.clone())
            .ok_or_else(|| TypewaveError::encode("gif frame buffer size mismatch"))?;

        let (Some(encoder), Some(delay)) = (self.encoder.as_mut(), self.delay) else {
            return Err(TypewaveError::encode("gif sink is already finalized"));
        };
        encoder
            .encode_frame(Frame::from_parts(buffer, 0, 0, delay))
            .map_err(|e| TypewaveError::encode(format!("gif frame {}: {e}", idx.0)))
    }

    fn end(&mut self) -> TypewaveResult<()> {
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| TypewaveError::encode("gif sink not started"))?;
        // Dropping the encoder writes the trailer and flushes the file.
        drop(encoder);
        self.cfg = None;
        tracing::debug!(out = %self.out_path.display(), "gif finished");
        Ok(())
    }

    fn abort(&mut self) {
        if self.encoder.take().is_none() {
            return;
        }
        self.cfg = None;
        if let Err(e) = std::fs::remove_file(&self.out_path) {
            tracing::warn!(out = %self.out_path.display(), "failed to remove partial gif: {e}");
        } else {
            tracing::debug!(out = %self.out_path.display(), "partial gif removed");
        }
    }
}
