use std::path::PathBuf;

use crate::compose::frame::FrameRGBA;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{TypewaveError, TypewaveResult};

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Optional raw PCM audio track to mux.
    pub audio: Option<AudioInputConfig>,
}

/// Raw PCM audio input for sinks that can mux audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioInputConfig {
    /// Path to interleaved `f32le` PCM data.
    pub path: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

/// Consumer of rendered frames.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> TypewaveResult<()>;
    /// Push one frame in strictly increasing order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> TypewaveResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> TypewaveResult<()>;
    /// Called instead of `end` when the render fails; discards any partial output.
    fn abort(&mut self) {}
}

/// Reject a frame index that does not follow `last`.
pub(crate) fn ensure_increasing(
    last: &mut Option<FrameIndex>,
    idx: FrameIndex,
    sink: &str,
) -> TypewaveResult<()> {
    if let Some(prev) = *last
        && idx.0 <= prev.0
    {
        return Err(TypewaveError::encode(format!(
            "{sink} received out-of-order frame {} after {}",
            idx.0, prev.0
        )));
    }
    *last = Some(idx);
    Ok(())
}

/// Reject frames whose size differs from the configured canvas.
pub(crate) fn ensure_frame_size(cfg: &SinkConfig, frame: &FrameRGBA) -> TypewaveResult<()> {
    if frame.width != cfg.width || frame.height != cfg.height {
        return Err(TypewaveError::encode(format!(
            "frame size mismatch: got {}x{}, expected {}x{}",
            frame.width, frame.height, cfg.width, cfg.height
        )));
    }
    Ok(())
}

/// In-memory sink for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Whether `end` has been called.
    pub fn ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> TypewaveResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> TypewaveResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> TypewaveResult<()> {
        self.ended = true;
        Ok(())
    }
}
