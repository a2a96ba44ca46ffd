//! Output sinks.
//!
//! Sinks consume rendered frames in strictly increasing frame order. Video containers go
//! through the system `ffmpeg`; GIF and PNG sequences are encoded in-process.

use serde::{Deserialize, Serialize};

use crate::encode::ffmpeg::VideoContainer;
use crate::foundation::error::{TypewaveError, TypewaveResult};

/// `ffmpeg`-based video sink (MP4, WebM).
pub mod ffmpeg;
/// PNG frame-sequence sink.
pub mod frames;
/// Animated GIF sink.
pub mod gif;
/// Sink trait and the in-memory sink.
pub mod sink;

/// Requested output kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// H.264 MP4 video.
    #[default]
    Mp4,
    /// VP9 WebM video.
    Webm,
    /// Looping animated GIF.
    Gif,
    /// Directory of numbered PNG frames.
    Frames,
}

impl OutputFormat {
    /// File extension for single-file formats; empty for frame directories.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
            Self::Gif => "gif",
            Self::Frames => "",
        }
    }

    /// The ffmpeg container for video formats.
    pub fn video_container(self) -> Option<VideoContainer> {
        match self {
            Self::Mp4 => Some(VideoContainer::Mp4),
            Self::Webm => Some(VideoContainer::Webm),
            Self::Gif | Self::Frames => None,
        }
    }

    /// Whether the format can carry the typing sound.
    pub fn has_audio(self) -> bool {
        self.video_container().is_some()
    }

    /// Fail with `EncoderUnavailable` when the backend for this format is missing.
    ///
    /// Video formats have no in-process fallback; GIF and PNG are always available.
    pub fn ensure_available(self) -> TypewaveResult<()> {
        if self.video_container().is_some() && !ffmpeg::is_ffmpeg_on_path() {
            return Err(TypewaveError::encoder_unavailable(format!(
                "{} output needs ffmpeg, which was not found on PATH \
                 (use --format gif or --format frames instead)",
                self.extension()
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
            Self::Gif => "gif",
            Self::Frames => "frames",
        })
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp4" => Ok(Self::Mp4),
            "webm" => Ok(Self::Webm),
            "gif" => Ok(Self::Gif),
            "frames" | "png" => Ok(Self::Frames),
            other => Err(format!(
                "unknown output format \"{other}\" (expected mp4|webm|gif|frames)"
            )),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sinks.rs"]
mod tests;
