use std::path::{Path, PathBuf};

use crate::compose::frame::FrameRGBA;
use crate::encode::sink::{FrameSink, SinkConfig, ensure_frame_size, ensure_increasing};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{TypewaveError, TypewaveResult};

/// File name of frame `idx` inside a sequence directory.
pub fn frame_file_name(idx: FrameIndex) -> String {
    format!("frame_{:05}.png", idx.0)
}

/// Numbered PNG files (`frame_00000.png`, ...) in one directory, alpha preserved.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    /// Sink writing into `dir` (created on `begin`).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            last_idx: None,
            written: Vec::new(),
        }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> TypewaveResult<()> {
        if cfg.audio.is_some() {
            tracing::debug!("frame sequence has no audio track; typing sound ignored");
        }
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            TypewaveError::encode(format!(
                "failed to create frame directory '{}': {e}",
                self.dir.display()
            ))
        })?;
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.written.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> TypewaveResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| TypewaveError::encode("frame sink not started"))?;
        ensure_increasing(&mut self.last_idx, idx, "frame sink")?;
        ensure_frame_size(cfg, frame)?;

        let img = frame
            .to_rgba_image()
            .ok_or_else(|| TypewaveError::encode("frame buffer size mismatch"))?;
        let path = self.dir.join(frame_file_name(idx));
        img.save(&path)
            .map_err(|e| TypewaveError::encode(format!("write '{}': {e}", path.display())))?;
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> TypewaveResult<()> {
        if self.cfg.take().is_none() {
            return Err(TypewaveError::encode("frame sink not started"));
        }
        tracing::debug!(dir = %self.dir.display(), frames = self.written.len(), "frame sequence written");
        Ok(())
    }

    fn abort(&mut self) {
        if self.cfg.take().is_none() {
            return;
        }
        for path in self.written.drain(..) {
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), "failed to remove partial frame: {e}");
            }
        }
        // Only succeeds when nothing else lives in the directory.
        let _ = std::fs::remove_dir(&self.dir);
        tracing::debug!(dir = %self.dir.display(), "partial frame sequence removed");
    }
}
