//! Job configuration: built-in defaults, the optional JSON file, and CLI overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::compose::background::GradientDirection;
use crate::compose::layout::LayoutMode;
use crate::encode::OutputFormat;
use crate::foundation::core::{Fps, Rgba8};
use crate::foundation::error::{TypewaveError, TypewaveResult};
use crate::timeline::reveal::TimingConfig;

/// Background as written in a config file; images are referenced by path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BackgroundConfig {
    /// Flat fill.
    Solid {
        /// Fill color.
        color: Rgba8,
    },
    /// Two-color linear gradient.
    Gradient {
        /// Interpolation axis.
        #[serde(default)]
        direction: GradientDirection,
        /// First row/column color.
        start: Rgba8,
        /// Last row/column color.
        end: Rgba8,
    },
    /// Image stretched to the canvas; falls back to `fallback` when it cannot be loaded.
    Image {
        /// Image file.
        path: PathBuf,
        /// Color used if the image is missing.
        #[serde(default = "default_background_color")]
        fallback: Rgba8,
    },
}

fn default_background_color() -> Rgba8 {
    Rgba8::BLACK
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self::Solid {
            color: default_background_color(),
        }
    }
}

/// Everything one render job needs besides the text itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Font file; discovered in `asset_dir` when unset.
    pub font: Option<PathBuf>,
    /// Font size in pixels.
    pub font_size: f32,
    /// Portrait image (pixel-perfect layout only).
    pub portrait: Option<PathBuf>,
    /// Horizontal gap between portrait and text.
    pub portrait_gap: u32,
    /// Canvas sizing mode.
    pub layout: LayoutMode,
    /// Inset around content.
    pub padding: u32,
    /// Bottom layer.
    pub background: BackgroundConfig,
    /// Text color.
    pub text_color: Rgba8,
    /// Output frame rate (integer).
    pub fps: u32,
    /// Frames per revealed character.
    pub frames_per_char: u32,
    /// Pause frames after a comma.
    pub pause_comma: u32,
    /// Pause frames after `.`, `!` or `?`.
    pub pause_sentence_end: u32,
    /// Hold after the text is complete, in seconds.
    pub dwell_secs: f64,
    /// Sound played once per revealed visible character (video outputs only).
    pub typing_sound: Option<PathBuf>,
    /// Primary output kind.
    pub format: OutputFormat,
    /// Also write a GIF next to a video output.
    pub also_gif: bool,
    /// Explicit output path; derived from the text when unset.
    pub output: Option<PathBuf>,
    /// Directory derived output names are placed in.
    pub output_dir: PathBuf,
    /// Directory searched for fonts and portraits.
    pub asset_dir: PathBuf,
    /// Search `asset_dir` for a font/portrait when none is configured.
    pub auto_discover: bool,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            font: None,
            font_size: 20.0,
            portrait: None,
            portrait_gap: 15,
            layout: LayoutMode::PixelPerfect {
                max_text_width: 1000,
            },
            padding: 10,
            background: BackgroundConfig::default(),
            text_color: Rgba8::WHITE,
            fps: 30,
            frames_per_char: 1,
            pause_comma: 4,
            pause_sentence_end: 10,
            dwell_secs: 2.0,
            typing_sound: None,
            format: OutputFormat::Mp4,
            also_gif: false,
            output: None,
            output_dir: PathBuf::from("."),
            asset_dir: PathBuf::from("."),
            auto_discover: true,
        }
    }
}

impl JobConfig {
    /// Read `path`, falling back to defaults when it is absent or malformed.
    pub fn load_or_default(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Self::default();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable config, using defaults");
                return Self::default();
            }
        };
        match Self::from_json_str(&text) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "malformed config, using defaults");
                Self::default()
            }
        }
    }

    /// Parse a (possibly partial) JSON document over the defaults.
    pub fn from_json_str(text: &str) -> TypewaveResult<Self> {
        serde_json::from_str(text).map_err(|e| TypewaveError::serde(e.to_string()))
    }

    /// Write this config as pretty JSON.
    pub fn save(&self, path: &Path) -> TypewaveResult<()> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| TypewaveError::serde(e.to_string()))?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                TypewaveError::validation(format!(
                    "create config directory '{}': {e}",
                    parent.display()
                ))
            })?;
        }
        std::fs::write(path, json + "\n").map_err(|e| {
            TypewaveError::validation(format!("write config '{}': {e}", path.display()))
        })
    }

    /// A new config with every set override applied.
    pub fn with_overrides(&self, o: &ConfigOverrides) -> Self {
        let mut cfg = self.clone();
        if let Some(v) = &o.font {
            cfg.font = Some(v.clone());
        }
        if let Some(v) = o.font_size {
            cfg.font_size = v;
        }
        if let Some(v) = &o.portrait {
            cfg.portrait = Some(v.clone());
        }
        if let Some(v) = o.layout {
            cfg.layout = v;
        }
        if let Some(v) = o.padding {
            cfg.padding = v;
        }
        if let Some(v) = &o.background {
            cfg.background = v.clone();
        }
        if let Some(v) = o.text_color {
            cfg.text_color = v;
        }
        if let Some(v) = o.fps {
            cfg.fps = v;
        }
        if let Some(v) = o.frames_per_char {
            cfg.frames_per_char = v;
        }
        if let Some(v) = o.pause_comma {
            cfg.pause_comma = v;
        }
        if let Some(v) = o.pause_sentence_end {
            cfg.pause_sentence_end = v;
        }
        if let Some(v) = o.dwell_secs {
            cfg.dwell_secs = v;
        }
        if let Some(v) = &o.typing_sound {
            cfg.typing_sound = Some(v.clone());
        }
        if let Some(v) = o.format {
            cfg.format = v;
        }
        if let Some(v) = o.also_gif {
            cfg.also_gif = v;
        }
        if let Some(v) = &o.output {
            cfg.output = Some(v.clone());
        }
        if let Some(v) = &o.output_dir {
            cfg.output_dir = v.clone();
        }
        if let Some(v) = &o.asset_dir {
            cfg.asset_dir = v.clone();
        }
        if let Some(v) = o.auto_discover {
            cfg.auto_discover = v;
        }
        cfg
    }

    /// Output frame rate.
    pub fn fps(&self) -> TypewaveResult<Fps> {
        Fps::integer(self.fps)
    }

    /// Frame budgets for the reveal timeline.
    pub fn timing(&self) -> TypewaveResult<TimingConfig> {
        Ok(TimingConfig::new(
            self.frames_per_char,
            self.pause_comma,
            self.pause_sentence_end,
            self.dwell_secs,
            self.fps()?,
        ))
    }

    /// Reject values no job can render with, before any file is touched.
    pub fn validate(&self) -> TypewaveResult<()> {
        self.fps()?;
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(TypewaveError::validation(format!(
                "font size must be > 0, got {}",
                self.font_size
            )));
        }
        if !self.dwell_secs.is_finite() || self.dwell_secs < 0.0 {
            return Err(TypewaveError::validation(format!(
                "dwell seconds must be >= 0, got {}",
                self.dwell_secs
            )));
        }
        if let LayoutMode::FixedBox { width, height } = self.layout
            && (width == 0 || height == 0)
        {
            return Err(TypewaveError::invalid_geometry(format!(
                "fixed box {width}x{height} has a zero dimension"
            )));
        }
        self.layout.wrap_width(self.padding)?;
        Ok(())
    }
}

/// Per-run overrides (CLI flags); unset fields keep the base config's value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigOverrides {
    /// Font file.
    pub font: Option<PathBuf>,
    /// Font size in pixels.
    pub font_size: Option<f32>,
    /// Portrait image.
    pub portrait: Option<PathBuf>,
    /// Canvas sizing mode.
    pub layout: Option<LayoutMode>,
    /// Inset around content.
    pub padding: Option<u32>,
    /// Bottom layer.
    pub background: Option<BackgroundConfig>,
    /// Text color.
    pub text_color: Option<Rgba8>,
    /// Output frame rate.
    pub fps: Option<u32>,
    /// Frames per revealed character.
    pub frames_per_char: Option<u32>,
    /// Pause frames after a comma.
    pub pause_comma: Option<u32>,
    /// Pause frames after a sentence terminator.
    pub pause_sentence_end: Option<u32>,
    /// Final hold in seconds.
    pub dwell_secs: Option<f64>,
    /// Per-character sound.
    pub typing_sound: Option<PathBuf>,
    /// Primary output kind.
    pub format: Option<OutputFormat>,
    /// Extra GIF next to a video.
    pub also_gif: Option<bool>,
    /// Explicit output path.
    pub output: Option<PathBuf>,
    /// Directory for derived output names.
    pub output_dir: Option<PathBuf>,
    /// Asset search directory.
    pub asset_dir: Option<PathBuf>,
    /// Asset discovery switch.
    pub auto_discover: Option<bool>,
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
