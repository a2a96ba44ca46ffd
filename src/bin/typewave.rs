use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use typewave::{
    BackgroundConfig, BatchOutcome, ConfigOverrides, FrameIndex, GradientDirection, JobConfig,
    JobInput, LayoutMode, OutputFormat, Progress, Rgba8, TypewaveError,
};

#[derive(Parser, Debug)]
#[command(name = "typewave", version, about = "Render typewriter dialogue boxes to video")]
struct Cli {
    /// More log output (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one dialogue to a video, GIF or PNG sequence.
    Render(RenderArgs),
    /// Render a single frame as a PNG.
    Preview(PreviewArgs),
    /// Render every file matching a wildcard pattern.
    Batch(BatchArgs),
    /// Write the default configuration as JSON.
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Dialogue text file.
    #[arg(required_unless_present = "text")]
    input: Option<PathBuf>,

    /// Dialogue text given inline instead of a file.
    #[arg(long, conflicts_with = "input")]
    text: Option<String>,
}

impl InputArgs {
    fn job_input(&self) -> anyhow::Result<JobInput> {
        match (&self.input, &self.text) {
            (_, Some(t)) => Ok(JobInput::Text(t.clone())),
            (Some(p), None) => Ok(JobInput::File(p.clone())),
            (None, None) => anyhow::bail!("no input file or --text given"),
        }
    }
}

#[derive(Args, Debug)]
struct JobArgs {
    /// Config file; missing or malformed files fall back to defaults.
    #[arg(long, default_value = "typewave.json")]
    config: PathBuf,

    /// Font file (.ttf/.otf).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Font size in pixels.
    #[arg(long)]
    font_size: Option<f32>,

    /// Portrait image shown left of the text (pixel-perfect layout only).
    #[arg(long)]
    portrait: Option<PathBuf>,

    /// Pixel-perfect layout with this maximum text width.
    #[arg(long, conflicts_with = "box_size")]
    max_width: Option<u32>,

    /// Fixed-box layout, e.g. `640x160`.
    #[arg(long = "box", value_name = "WxH", value_parser = parse_box)]
    box_size: Option<(u32, u32)>,

    /// Padding around the content in pixels.
    #[arg(long)]
    padding: Option<u32>,

    /// Output frame rate.
    #[arg(long)]
    fps: Option<u32>,

    /// Frames per revealed character.
    #[arg(long)]
    char_speed: Option<u32>,

    /// Extra frames after a comma.
    #[arg(long)]
    comma_pause: Option<u32>,

    /// Extra frames after `.`, `!` or `?`.
    #[arg(long)]
    sentence_pause: Option<u32>,

    /// Seconds to hold the finished text.
    #[arg(long)]
    dwell: Option<f64>,

    /// Text color, `R,G,B[,A]` or `#RRGGBB[AA]`.
    #[arg(long, value_parser = parse_color)]
    text_color: Option<Rgba8>,

    /// Solid background color (also the fallback for `--bg-image`).
    #[arg(long, value_parser = parse_color)]
    bg_color: Option<Rgba8>,

    /// Gradient background direction (vertical|horizontal).
    #[arg(long, conflicts_with = "bg_image")]
    gradient: Option<GradientDirection>,

    /// Gradient start color.
    #[arg(long, value_parser = parse_color, requires = "gradient")]
    gradient_start: Option<Rgba8>,

    /// Gradient end color.
    #[arg(long, value_parser = parse_color, requires = "gradient")]
    gradient_end: Option<Rgba8>,

    /// Background image stretched to the canvas.
    #[arg(long)]
    bg_image: Option<PathBuf>,

    /// Output format (mp4|webm|gif|frames).
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Also write a GIF next to a video output.
    #[arg(long)]
    gif: bool,

    /// Typing sound played at every revealed character (video formats).
    #[arg(long)]
    sound: Option<PathBuf>,

    /// Directory searched for fonts and portraits.
    #[arg(long)]
    asset_dir: Option<PathBuf>,

    /// Directory for derived output names.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Do not search the asset directory for a font or portrait.
    #[arg(long)]
    no_discover: bool,
}

impl JobArgs {
    fn overrides(&self) -> ConfigOverrides {
        let layout = match (self.box_size, self.max_width) {
            (Some((width, height)), _) => Some(LayoutMode::FixedBox { width, height }),
            (None, Some(max_text_width)) => Some(LayoutMode::PixelPerfect { max_text_width }),
            (None, None) => None,
        };
        ConfigOverrides {
            font: self.font.clone(),
            font_size: self.font_size,
            portrait: self.portrait.clone(),
            layout,
            padding: self.padding,
            background: self.background(),
            text_color: self.text_color,
            fps: self.fps,
            frames_per_char: self.char_speed,
            pause_comma: self.comma_pause,
            pause_sentence_end: self.sentence_pause,
            dwell_secs: self.dwell,
            typing_sound: self.sound.clone(),
            format: self.format,
            also_gif: self.gif.then_some(true),
            output: None,
            output_dir: self.output_dir.clone(),
            asset_dir: self.asset_dir.clone(),
            auto_discover: self.no_discover.then_some(false),
        }
    }

    fn background(&self) -> Option<BackgroundConfig> {
        if let Some(path) = &self.bg_image {
            return Some(BackgroundConfig::Image {
                path: path.clone(),
                fallback: self.bg_color.unwrap_or(Rgba8::BLACK),
            });
        }
        if let Some(direction) = self.gradient {
            return Some(BackgroundConfig::Gradient {
                direction,
                start: self.gradient_start.or(self.bg_color).unwrap_or(Rgba8::BLACK),
                end: self.gradient_end.unwrap_or(Rgba8::WHITE),
            });
        }
        self.bg_color.map(|color| BackgroundConfig::Solid { color })
    }

    fn job_config(&self) -> JobConfig {
        JobConfig::load_or_default(&self.config).with_overrides(&self.overrides())
    }
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output path; derived from the first words of the text when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print line count, frame count and duration without rendering.
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    job: JobArgs,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    job: JobArgs,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// File pattern; `*` and `?` are allowed in the file name, e.g. `lines/*.txt`.
    pattern: String,

    #[command(flatten)]
    job: JobArgs,
}

#[derive(Args, Debug)]
struct InitConfigArgs {
    /// Where to write the config.
    #[arg(default_value = "typewave.json")]
    path: PathBuf,

    /// Replace an existing file.
    #[arg(long)]
    force: bool,
}

fn parse_color(s: &str) -> Result<Rgba8, String> {
    Rgba8::parse(s).map_err(|e| e.to_string())
}

fn parse_box(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got \"{s}\""))?;
    let w = w.trim().parse().map_err(|_| format!("bad box width \"{w}\""))?;
    let h = h.trim().parse().map_err(|_| format!("bad box height \"{h}\""))?;
    Ok((w, h))
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::WARN,
        (false, 1) => tracing::Level::INFO,
        (false, 2) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.cmd {
        Command::Render(args) => cmd_render(args, cli.quiet),
        Command::Preview(args) => cmd_preview(args),
        Command::Batch(args) => cmd_batch(args, cli.quiet),
        Command::InitConfig(args) => cmd_init_config(args),
    };
    match result {
        Ok(code) => code,
        Err(err) => {
            match err.downcast_ref::<TypewaveError>() {
                Some(e) => eprintln!("error ({} stage): {err:#}", e.stage()),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

/// Prints whole-percent steps to stderr.
fn progress_printer(quiet: bool) -> impl FnMut(Progress) {
    let mut last = None;
    move |p: Progress| {
        if quiet {
            return;
        }
        let pct = (p.fraction() * 100.0).floor() as u32;
        if last != Some(pct / 10) {
            last = Some(pct / 10);
            eprintln!("  {pct:>3}% ({}/{} frames)", p.frames_emitted, p.total_frames);
        }
    }
}

fn cmd_render(args: RenderArgs, quiet: bool) -> anyhow::Result<ExitCode> {
    let mut config = args.job.job_config();
    config.output = args.output.clone().or(config.output);
    let input = args.input.job_input()?;

    if args.dry_run {
        let report = typewave::dry_run(&config, &input)?;
        println!("lines:     {}", report.line_count);
        println!("frames:    {}", report.total_frames);
        println!("duration:  {:.2}s", report.estimated_duration_secs);
        println!("canvas:    {}x{}", report.canvas.width, report.canvas.height);
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = typewave::render_job(&config, &input, &mut progress_printer(quiet))?;
    for out in &outcome.outputs {
        eprintln!("wrote {}", out.display());
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<ExitCode> {
    let config = args.job.job_config();
    config.validate()?;
    let job = typewave::prepare_job(&config, &args.input.job_input()?)?;
    let frame = typewave::render_preview_frame(&job, FrameIndex(args.frame))?;

    typewave::encode::ffmpeg::ensure_parent_dir(&args.out)?;
    let img = frame
        .to_rgba_image()
        .context("frame buffer does not match its dimensions")?;
    img.save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_batch(args: BatchArgs, quiet: bool) -> anyhow::Result<ExitCode> {
    let config = args.job.job_config();
    let mut current: Option<PathBuf> = None;
    let mut printer = progress_printer(quiet);
    let report = typewave::run_batch(&config, &args.pattern, &mut |input: &Path, p| {
        if current.as_deref() != Some(input) {
            current = Some(input.to_path_buf());
            if !quiet {
                eprintln!("{}", input.display());
            }
        }
        printer(p);
    })?;

    for (input, outcome) in &report.succeeded {
        for out in &outcome.outputs {
            eprintln!("ok     {} -> {}", input.display(), out.display());
        }
    }
    for err in &report.failed {
        eprintln!("failed {err}");
    }
    eprintln!(
        "{} of {} rendered",
        report.succeeded.len(),
        report.total()
    );
    Ok(match report.outcome() {
        BatchOutcome::AllFailed => ExitCode::FAILURE,
        BatchOutcome::AllSucceeded | BatchOutcome::PartialSuccess => ExitCode::SUCCESS,
    })
}

fn cmd_init_config(args: InitConfigArgs) -> anyhow::Result<ExitCode> {
    if args.path.exists() && !args.force {
        anyhow::bail!(
            "'{}' already exists (use --force to overwrite)",
            args.path.display()
        );
    }
    JobConfig::default()
        .save(&args.path)
        .with_context(|| format!("write config '{}'", args.path.display()))?;
    eprintln!("wrote {}", args.path.display());
    Ok(ExitCode::SUCCESS)
}
