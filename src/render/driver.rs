use std::path::{Path, PathBuf};

use crate::assets::decode::{PreparedImage, load_image};
use crate::assets::discover::{resolve_font, resolve_portrait};
use crate::audio::cues::TypingTrack;
use crate::compose::background::BackgroundSpec;
use crate::compose::compositor::Compositor;
use crate::compose::frame::FrameRGBA;
use crate::compose::layout::{LayoutMode, LayoutSpec};
use crate::config::{BackgroundConfig, JobConfig};
use crate::encode::OutputFormat;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::frames::PngSequenceSink;
use crate::encode::gif::GifSink;
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{TypewaveError, TypewaveResult};
use crate::text::face::{FontFace, Typeface};
use crate::text::wrap::wrap_text;
use crate::timeline::reveal::{RevealTimeline, TimingConfig, cue_frames, total_frames};

/// Where the dialogue text comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobInput {
    /// UTF-8 text file.
    File(PathBuf),
    /// Text given directly.
    Text(String),
}

/// Render progress after a frame was handed to the sinks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    /// Frames written so far.
    pub frames_emitted: u64,
    /// Frames the job will write in total.
    pub total_frames: u64,
}

impl Progress {
    /// Completed share in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total_frames == 0 {
            1.0
        } else {
            self.frames_emitted as f64 / self.total_frames as f64
        }
    }
}

/// Counters for one finished render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames the timeline was expected to produce.
    pub frames_total: u64,
    /// Frames actually composed and written.
    pub frames_rendered: u64,
    /// Typing-sound cues laid into the audio track (0 when silent).
    pub cues: usize,
}

/// Result of [`render_job`].
#[derive(Clone, Debug, PartialEq)]
pub struct JobOutcome {
    /// Written outputs, primary first.
    pub outputs: Vec<PathBuf>,
    /// Render counters.
    pub stats: RenderStats,
}

/// Result of [`dry_run`]: what a render would produce, without producing it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DryRunReport {
    /// Wrapped (and, in fixed-box mode, truncated) line count.
    pub line_count: usize,
    /// Frames the render would write.
    pub total_frames: u64,
    /// `total_frames / fps`.
    pub estimated_duration_secs: f64,
    /// Output canvas.
    pub canvas: Canvas,
}

/// A job with text, assets and geometry resolved; ready to render.
pub struct PreparedJob {
    config: JobConfig,
    text: String,
    lines: Vec<String>,
    face: Box<dyn Typeface + Send>,
    compositor: Compositor,
    timing: TimingConfig,
    fps: Fps,
    total_frames: u64,
    matte: [u8; 4],
}

impl std::fmt::Debug for PreparedJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedJob")
            .field("lines", &self.lines.len())
            .field("canvas", &self.compositor.layout().canvas)
            .field("timing", &self.timing)
            .field("total_frames", &self.total_frames)
            .finish_non_exhaustive()
    }
}

impl PreparedJob {
    /// Build a job from already-loaded parts.
    ///
    /// `portrait` is ignored in fixed-box layouts.
    pub fn assemble(
        config: JobConfig,
        text: String,
        face: Box<dyn Typeface + Send>,
        background: BackgroundSpec,
        portrait: Option<PreparedImage>,
    ) -> TypewaveResult<Self> {
        config.validate()?;
        let portrait_dims = portrait.as_ref().map(|p| (p.width, p.height));
        let (layout, lines) = plan_layout(&config, &text, face.as_ref(), portrait_dims)?;

        let compositor = Compositor::new(
            layout,
            &background,
            portrait.as_ref(),
            config.text_color,
        )?;
        let fps = config.fps()?;
        let timing = config.timing()?;
        let total_frames = total_frames(&lines, &timing);

        tracing::info!(
            lines = lines.len(),
            width = layout.canvas.width,
            height = layout.canvas.height,
            total_frames,
            "job prepared"
        );

        Ok(Self {
            matte: background.matte().to_array(),
            config,
            text,
            lines,
            face,
            compositor,
            timing,
            fps,
            total_frames,
        })
    }

    /// Configuration the job was built from.
    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Display lines that will be typed.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        self.compositor.layout().canvas
    }

    /// Output frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Frame budgets.
    pub fn timing(&self) -> TimingConfig {
        self.timing
    }

    /// Frames a full render writes.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    fn sink_config(&self, audio: Option<AudioInputConfig>) -> SinkConfig {
        let canvas = self.canvas();
        SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps: self.fps,
            audio,
        }
    }
}

/// Wrap `text` and derive the layout; fixed-box layouts drop lines that have no slot.
fn plan_layout(
    config: &JobConfig,
    text: &str,
    face: &dyn Typeface,
    portrait: Option<(u32, u32)>,
) -> TypewaveResult<(LayoutSpec, Vec<String>)> {
    let wrap_width = config.layout.wrap_width(config.padding)?;
    let mut lines = wrap_text(text, wrap_width, face);

    let layout = match config.layout {
        LayoutMode::PixelPerfect { max_text_width } => LayoutSpec::pixel_perfect(
            &lines,
            face,
            max_text_width,
            config.padding,
            portrait,
            config.portrait_gap,
        )?,
        LayoutMode::FixedBox { width, height } => {
            let layout =
                LayoutSpec::fixed_box(width, height, config.padding, face.line_height())?;
            if lines.len() > layout.max_lines {
                tracing::info!(
                    wrapped = lines.len(),
                    shown = layout.max_lines,
                    "text taller than the box, extra lines dropped"
                );
                lines.truncate(layout.max_lines);
            }
            layout
        }
    };
    Ok((layout, lines))
}

/// Read the dialogue text; trailing line terminators at end of file are dropped.
pub fn load_text(input: &JobInput) -> TypewaveResult<String> {
    let text = match input {
        JobInput::Text(t) => t.clone(),
        JobInput::File(path) => std::fs::read_to_string(path).map_err(|e| {
            TypewaveError::missing_input(format!("cannot read '{}': {e}", path.display()))
        })?,
    };
    Ok(text.trim_end_matches(['\n', '\r']).to_owned())
}

fn load_face(config: &JobConfig, text: &str) -> TypewaveResult<FontFace> {
    let font_path = resolve_font(config.font.as_deref(), &config.asset_dir, config.auto_discover)?;
    let mut face = FontFace::load(&font_path, config.font_size)?;
    face.warm(text);
    tracing::info!(font = %font_path.display(), size = config.font_size, "font loaded");
    Ok(face)
}

fn load_background(config: &BackgroundConfig) -> BackgroundSpec {
    match config {
        BackgroundConfig::Solid { color } => BackgroundSpec::Solid(*color),
        BackgroundConfig::Gradient {
            direction,
            start,
            end,
        } => BackgroundSpec::Gradient {
            direction: *direction,
            start: *start,
            end: *end,
        },
        BackgroundConfig::Image { path, fallback } => match load_image(path) {
            Ok(img) => {
                tracing::debug!(path = %path.display(), width = img.width, height = img.height, "background image loaded");
                BackgroundSpec::Image(img)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "background image unusable, using fallback color");
                BackgroundSpec::Solid(*fallback)
            }
        },
    }
}

/// Portrait path for pixel-perfect jobs; fixed-box jobs never draw one.
fn portrait_path(config: &JobConfig, output: Option<&Path>) -> Option<PathBuf> {
    if let LayoutMode::FixedBox { .. } = config.layout {
        if config.portrait.is_some() {
            tracing::warn!("portrait ignored in fixed-box layout");
        }
        return None;
    }
    let mut exclude: Vec<&Path> = Vec::new();
    if let Some(out) = output {
        exclude.push(out);
    }
    if let BackgroundConfig::Image { path, .. } = &config.background {
        exclude.push(path);
    }
    resolve_portrait(
        config.portrait.as_deref(),
        &config.asset_dir,
        config.auto_discover,
        &exclude,
    )
}

fn load_portrait(config: &JobConfig, output: Option<&Path>) -> Option<PreparedImage> {
    let path = portrait_path(config, output)?;
    match load_image(&path) {
        Ok(img) => {
            tracing::info!(portrait = %path.display(), width = img.width, height = img.height, "portrait loaded");
            Some(img)
        }
        Err(e) => {
            tracing::warn!(portrait = %path.display(), error = %e, "portrait unusable, continuing without it");
            None
        }
    }
}

/// Load text and assets and build the compositor.
///
/// Assets live only as long as the returned job.
pub fn prepare_job(config: &JobConfig, input: &JobInput) -> TypewaveResult<PreparedJob> {
    config.validate()?;
    let text = load_text(input)?;
    let face = load_face(config, &text)?;
    let background = load_background(&config.background);
    let portrait = load_portrait(config, config.output.as_deref());
    PreparedJob::assemble(config.clone(), text, Box::new(face), background, portrait)
}

/// Drive the timeline, composing each frame once and handing it to every sink in order.
pub fn render_prepared(
    job: &PreparedJob,
    sinks: &mut [&mut dyn FrameSink],
    audio: Option<AudioInputConfig>,
    progress: &mut dyn FnMut(Progress),
) -> TypewaveResult<RenderStats> {
    let cfg = job.sink_config(audio);
    for i in 0..sinks.len() {
        if let Err(e) = sinks[i].begin(cfg.clone()) {
            abort_sinks(&mut sinks[..i]);
            return Err(e);
        }
    }

    let rendered = match push_all_frames(job, sinks, progress) {
        Ok(rendered) => rendered,
        Err(e) => {
            // No partial files survive a failed render; the first error wins.
            abort_sinks(sinks);
            return Err(e);
        }
    };
    for i in 0..sinks.len() {
        if let Err(e) = sinks[i].end() {
            abort_sinks(&mut sinks[i..]);
            return Err(e);
        }
    }
    Ok(RenderStats {
        frames_total: job.total_frames,
        frames_rendered: rendered,
        cues: 0,
    })
}

fn abort_sinks(sinks: &mut [&mut dyn FrameSink]) {
    for sink in sinks.iter_mut() {
        sink.abort();
    }
}

fn push_all_frames(
    job: &PreparedJob,
    sinks: &mut [&mut dyn FrameSink],
    progress: &mut dyn FnMut(Progress),
) -> TypewaveResult<u64> {
    let total = job.total_frames;
    let log_every = (total / 10).max(1);
    let mut emitted = 0u64;

    for tick in RevealTimeline::new(&job.lines, job.timing) {
        let frame = job
            .compositor
            .render(&tick.state, &job.lines, job.face.as_ref());
        for sink in sinks.iter_mut() {
            sink.push_frame(tick.frame, &frame)?;
        }
        emitted += 1;
        progress(Progress {
            frames_emitted: emitted,
            total_frames: total,
        });
        if emitted % log_every == 0 {
            tracing::debug!(frame = emitted, total, "render progress");
        }
    }

    debug_assert_eq!(emitted, total, "timeline length drifted from its closed form");
    Ok(emitted)
}

/// Compose frame `frame` of the job without rendering the rest.
pub fn render_preview_frame(job: &PreparedJob, frame: FrameIndex) -> TypewaveResult<FrameRGBA> {
    let tick = RevealTimeline::new(&job.lines, job.timing)
        .nth(frame.0 as usize)
        .ok_or_else(|| {
            TypewaveError::validation(format!(
                "frame {} is outside the clip (0..{})",
                frame.0, job.total_frames
            ))
        })?;
    Ok(job
        .compositor
        .render(&tick.state, &job.lines, job.face.as_ref()))
}

/// Words the derived output name is built from.
const NAME_WORDS: usize = 5;

/// File stem derived from the first words of `text`, lowercased and joined by `_`.
pub fn output_stem(text: &str) -> String {
    let words: Vec<&str> = text
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .take(NAME_WORDS)
        .collect();
    if words.is_empty() {
        "dialogue".to_owned()
    } else {
        words.join("_").to_lowercase()
    }
}

/// Primary output path: the configured one, else a derived name in `output_dir`.
pub fn resolve_output_path(config: &JobConfig, text: &str) -> PathBuf {
    if let Some(out) = &config.output {
        return out.clone();
    }
    let stem = output_stem(text);
    let name = match config.format {
        OutputFormat::Frames => format!("{stem}_frames"),
        f => format!("{stem}.{}", f.extension()),
    };
    config.output_dir.join(name)
}

fn primary_sink(format: OutputFormat, out: &Path, matte: [u8; 4]) -> Box<dyn FrameSink> {
    match format.video_container() {
        Some(container) => {
            let mut opts = FfmpegSinkOpts::new(out, container);
            opts.matte = matte;
            Box::new(FfmpegSink::new(opts))
        }
        None if format == OutputFormat::Gif => Box::new(GifSink::new(out, matte)),
        None => Box::new(PngSequenceSink::new(out)),
    }
}

/// Prepare and render a job to its configured outputs.
pub fn render_job(
    config: &JobConfig,
    input: &JobInput,
    progress: &mut dyn FnMut(Progress),
) -> TypewaveResult<JobOutcome> {
    config.validate()?;
    config.format.ensure_available()?;

    let job = prepare_job(config, input)?;
    let out_path = resolve_output_path(config, &job.text);

    let mut outputs = vec![out_path.clone()];
    let mut sinks = vec![primary_sink(config.format, &out_path, job.matte)];
    if config.also_gif && config.format != OutputFormat::Gif {
        let gif_path = out_path.with_extension("gif");
        sinks.push(Box::new(GifSink::new(&gif_path, job.matte)));
        outputs.push(gif_path);
    }

    let mut cues = 0;
    let track = match &config.typing_sound {
        Some(sound) if config.format.has_audio() => {
            let cue_list = cue_frames(&job.lines, job.timing);
            match TypingTrack::prepare(sound, &cue_list, job.fps, job.total_frames) {
                Ok(track) => {
                    cues = cue_list.len();
                    Some(track)
                }
                Err(e) => {
                    tracing::warn!(sound = %sound.display(), error = %e, "typing sound unusable, rendering silent");
                    None
                }
            }
        }
        Some(_) => {
            tracing::debug!(format = %config.format, "format carries no audio, typing sound ignored");
            None
        }
        None => None,
    };

    tracing::info!(output = %out_path.display(), format = %config.format, "rendering");
    let mut sink_refs: Vec<&mut dyn FrameSink> = Vec::with_capacity(sinks.len());
    for s in sinks.iter_mut() {
        sink_refs.push(s.as_mut());
    }
    let mut stats = render_prepared(
        &job,
        &mut sink_refs,
        track.as_ref().map(TypingTrack::audio_input),
        progress,
    )?;
    stats.cues = cues;
    drop(track);

    tracing::info!(frames = stats.frames_rendered, output = %out_path.display(), "render finished");
    Ok(JobOutcome { outputs, stats })
}

/// Frame count, duration and canvas of a job; reads the text and font, writes nothing.
pub fn dry_run(config: &JobConfig, input: &JobInput) -> TypewaveResult<DryRunReport> {
    config.validate()?;
    let text = load_text(input)?;
    let face = load_face(config, &text)?;

    let portrait_dims = portrait_path(config, config.output.as_deref()).and_then(|p| {
        image::image_dimensions(&p)
            .map_err(|e| tracing::warn!(portrait = %p.display(), error = %e, "portrait unreadable"))
            .ok()
    });
    let (layout, lines) = plan_layout(config, &text, &face, portrait_dims)?;

    let fps = config.fps()?;
    let total = total_frames(&lines, &config.timing()?);
    Ok(DryRunReport {
        line_count: lines.len(),
        total_frames: total,
        estimated_duration_secs: fps.frames_to_secs(total),
        canvas: layout.canvas,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/driver.rs"]
mod tests;
