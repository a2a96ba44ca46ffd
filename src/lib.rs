//! Typewave renders typewriter-style dialogue boxes to video.
//!
//! Text is wrapped to a pixel width, revealed one character per `frames_per_char` frames with
//! extra pauses after punctuation, held for a dwell period, and composed over a solid,
//! gradient or image background (optionally beside a portrait). Frames stream in order into a
//! [`FrameSink`]: MP4/WebM via the system `ffmpeg`, animated GIF, or a PNG sequence.
//!
//! - Build a [`JobConfig`] (defaults, JSON file, overrides)
//! - [`render_job`] for a full render, [`dry_run`] for frame counts only
//! - [`prepare_job`] + [`render_prepared`] / [`render_preview_frame`] for custom sinks
//! - [`spawn_render`] to run a job on a background thread
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod audio;
mod compose;
mod foundation;
mod render;
mod text;
mod timeline;

/// Batch rendering over wildcard-matched input files.
pub mod batch;
/// Job configuration.
pub mod config;
/// Output sinks.
pub mod encode;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Rgba8};
pub use crate::foundation::error::{BatchItemError, Stage, TypewaveError, TypewaveResult};

pub use crate::text::face::{FontFace, GlyphBitmap, Typeface};
pub use crate::text::wrap::{BLANK_LINE, wrap_text, wrap_with};

pub use crate::timeline::reveal::{
    Phase, RevealState, RevealTimeline, Tick, TimingConfig, cue_frames, total_frames,
};

pub use crate::compose::background::{BackgroundSpec, GradientDirection};
pub use crate::compose::compositor::Compositor;
pub use crate::compose::frame::FrameRGBA;
pub use crate::compose::layout::{LayoutMode, LayoutSpec, PortraitSlot};

pub use crate::assets::decode::{PreparedImage, decode_image, load_image};
pub use crate::assets::discover::{resolve_font, resolve_portrait};

pub use crate::audio::cues::{TRACK_SAMPLE_RATE, TypingTrack, mix_cues};
pub use crate::audio::decode::{AudioPcm, decode_audio_f32_stereo};

pub use crate::batch::{BatchOutcome, BatchReport, run_batch};
pub use crate::config::{BackgroundConfig, ConfigOverrides, JobConfig};
pub use crate::encode::OutputFormat;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, VideoContainer};
pub use crate::encode::frames::PngSequenceSink;
pub use crate::encode::gif::GifSink;
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};

pub use crate::render::driver::{
    DryRunReport, JobInput, JobOutcome, PreparedJob, Progress, RenderStats, dry_run, load_text,
    output_stem, prepare_job, render_job, render_preview_frame, render_prepared,
    resolve_output_path,
};
pub use crate::render::worker::{RenderHandle, spawn_render};
