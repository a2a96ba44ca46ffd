use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::Rgba8;
use crate::text::face::BlockFace;

fn block() -> Box<dyn Typeface + Send> {
    Box::new(BlockFace {
        advance: 4,
        line_height: 6,
    })
}

fn quick_config() -> JobConfig {
    JobConfig {
        fps: 10,
        dwell_secs: 0.5,
        padding: 2,
        format: OutputFormat::Gif,
        auto_discover: false,
        ..JobConfig::default()
    }
}

fn job(config: JobConfig, text: &str) -> PreparedJob {
    PreparedJob::assemble(
        config,
        text.to_owned(),
        block(),
        BackgroundSpec::Solid(Rgba8::BLACK),
        None,
    )
    .unwrap()
}

#[test]
fn every_timeline_frame_reaches_the_sink_in_order() {
    let job = job(quick_config(), "Hi, you.");
    // 8 chars + comma 4 + period 10 + dwell 5.
    assert_eq!(job.total_frames(), 8 + 4 + 10 + 5);

    let mut sink = InMemorySink::new();
    let mut seen = Vec::new();
    let stats = render_prepared(&job, &mut [&mut sink], None, &mut |p| seen.push(p)).unwrap();

    assert_eq!(stats.frames_rendered, job.total_frames());
    assert_eq!(stats.frames_total, job.total_frames());
    assert!(sink.ended());
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, (0..job.total_frames()).collect::<Vec<_>>());

    assert_eq!(seen.len() as u64, job.total_frames());
    assert_eq!(seen.last().unwrap().fraction(), 1.0);

    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (job.canvas().width, job.canvas().height));
    assert!(cfg.audio.is_none());

    // First frame already shows 'H'; the dwell frames are identical.
    assert_ne!(&sink.frames()[0].1, job.compositor.base_frame());
    let n = sink.frames().len();
    assert_eq!(sink.frames()[n - 1].1, sink.frames()[n - 5].1);
}

#[test]
fn fixed_box_drops_lines_before_timing() {
    let config = JobConfig {
        layout: LayoutMode::FixedBox {
            width: 20,
            height: 22,
        },
        dwell_secs: 0.0,
        ..quick_config()
    };
    // Inner width 16 px = 4 cells; inner height 18 px = 3 lines of 6.
    let job = job(config, "aaa bbb ccc ddd eee");
    assert_eq!(job.lines(), &["aaa", "bbb", "ccc"]);
    assert_eq!(job.total_frames(), 9);
}

#[test]
fn portrait_is_ignored_in_fixed_box() {
    let config = JobConfig {
        layout: LayoutMode::FixedBox {
            width: 40,
            height: 40,
        },
        ..quick_config()
    };
    let portrait = PreparedImage::from_rgba8(2, 2, vec![255; 16]).unwrap();
    let job = PreparedJob::assemble(
        config,
        "x".into(),
        block(),
        BackgroundSpec::Solid(Rgba8::BLACK),
        Some(portrait),
    )
    .unwrap();
    assert!(job.compositor.layout().portrait.is_none());
    assert_eq!(job.compositor.base_frame().pixel(2, 2), Some([0, 0, 0, 255]));
}

#[test]
fn preview_matches_rendered_frame() {
    let job = job(quick_config(), "ab\ncd");
    let mut sink = InMemorySink::new();
    render_prepared(&job, &mut [&mut sink], None, &mut |_| {}).unwrap();

    for i in [0u64, 2, job.total_frames() - 1] {
        let preview = render_preview_frame(&job, FrameIndex(i)).unwrap();
        assert_eq!(preview, sink.frames()[i as usize].1, "frame {i}");
    }
    let err = render_preview_frame(&job, FrameIndex(job.total_frames())).unwrap_err();
    assert!(matches!(err, TypewaveError::Validation(_)));
}

#[derive(Default)]
struct FailAt {
    at: u64,
    ended: bool,
    aborted: bool,
}

impl FrameSink for FailAt {
    fn begin(&mut self, _cfg: SinkConfig) -> TypewaveResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, _frame: &FrameRGBA) -> TypewaveResult<()> {
        if idx.0 == self.at {
            return Err(TypewaveError::encode("disk full"));
        }
        Ok(())
    }

    fn end(&mut self) -> TypewaveResult<()> {
        self.ended = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

#[test]
fn sink_failure_stops_the_render_and_aborts_sinks() {
    let job = job(quick_config(), "abcdef");
    let mut failing = FailAt {
        at: 2,
        ..FailAt::default()
    };
    let mut memory = InMemorySink::new();
    let err = render_prepared(&job, &mut [&mut memory, &mut failing], None, &mut |_| {})
        .unwrap_err();
    assert!(matches!(err, TypewaveError::Encode(_)));
    assert!(failing.aborted);
    assert!(!failing.ended);
    assert!(!memory.ended());
    assert_eq!(memory.frames().len(), 3);
}

#[test]
fn failed_render_leaves_no_gif_behind() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.gif");
    let job = job(quick_config(), "abcdef");
    let mut gif = GifSink::new(&path, [0, 0, 0, 255]);
    let mut failing = FailAt {
        at: 2,
        ..FailAt::default()
    };
    assert!(render_prepared(&job, &mut [&mut gif, &mut failing], None, &mut |_| {}).is_err());
    assert!(!path.exists());
}

#[test]
fn failed_render_leaves_no_frame_sequence_behind() {
    let dir = tempfile::tempdir().unwrap();
    let seq = dir.path().join("seq");
    let job = job(quick_config(), "abcdef");
    let mut pngs = PngSequenceSink::new(&seq);
    let mut failing = FailAt {
        at: 3,
        ..FailAt::default()
    };
    assert!(render_prepared(&job, &mut [&mut pngs, &mut failing], None, &mut |_| {}).is_err());
    assert!(!seq.exists());
}

#[test]
fn begin_failure_aborts_sinks_already_started() {
    struct RefuseBegin;
    impl FrameSink for RefuseBegin {
        fn begin(&mut self, _cfg: SinkConfig) -> TypewaveResult<()> {
            Err(TypewaveError::encoder_unavailable("no encoder"))
        }
        fn push_frame(&mut self, _idx: FrameIndex, _frame: &FrameRGBA) -> TypewaveResult<()> {
            Ok(())
        }
        fn end(&mut self) -> TypewaveResult<()> {
            Ok(())
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("first.gif");
    let job = job(quick_config(), "ab");
    let mut gif = GifSink::new(&path, [0, 0, 0, 255]);
    let err = render_prepared(&job, &mut [&mut gif, &mut RefuseBegin], None, &mut |_| {})
        .unwrap_err();
    assert!(matches!(err, TypewaveError::EncoderUnavailable(_)));
    assert!(!path.exists());
}

#[test]
fn output_names_come_from_the_first_words() {
    assert_eq!(
        output_stem("Hello, World! This is a test of names"),
        "hello_world_this_is_a"
    );
    assert_eq!(output_stem("  ...!?  "), "dialogue");
    assert_eq!(output_stem(""), "dialogue");

    let mut cfg = quick_config();
    cfg.output_dir = PathBuf::from("out");
    assert_eq!(
        resolve_output_path(&cfg, "Two words"),
        PathBuf::from("out/two_words.gif")
    );
    cfg.format = OutputFormat::Frames;
    assert_eq!(
        resolve_output_path(&cfg, "Two words"),
        PathBuf::from("out/two_words_frames")
    );
    cfg.output = Some(PathBuf::from("custom.webm"));
    assert_eq!(
        resolve_output_path(&cfg, "ignored"),
        PathBuf::from("custom.webm")
    );
}

#[test]
fn text_loader_strips_trailing_terminators_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("line.txt");
    std::fs::write(&path, "first\n\nsecond\r\n\n").unwrap();
    assert_eq!(
        load_text(&JobInput::File(path)).unwrap(),
        "first\n\nsecond"
    );
    assert_eq!(
        load_text(&JobInput::Text(" keep ".into())).unwrap(),
        " keep "
    );
}

#[test]
fn missing_input_fails_before_assets() {
    let dir = tempfile::tempdir().unwrap();
    let config = JobConfig {
        asset_dir: dir.path().to_path_buf(),
        output_dir: dir.path().to_path_buf(),
        ..quick_config()
    };
    let input = JobInput::File(dir.path().join("absent.txt"));
    let err = render_job(&config, &input, &mut |_| {}).unwrap_err();
    assert!(matches!(err, TypewaveError::MissingInput(_)), "{err}");
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[test]
fn no_font_is_a_fatal_asset_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = JobConfig {
        asset_dir: dir.path().to_path_buf(),
        auto_discover: true,
        ..quick_config()
    };
    let err = prepare_job(&config, &JobInput::Text("hello".into())).unwrap_err();
    assert!(matches!(err, TypewaveError::MissingAsset(_)));
    let err = dry_run(&config, &JobInput::Text("hello".into())).unwrap_err();
    assert_eq!(err.stage(), crate::foundation::error::Stage::Assets);
}

#[test]
fn missing_background_image_falls_back_to_color() {
    let spec = load_background(&BackgroundConfig::Image {
        path: PathBuf::from("/no/such/bg.png"),
        fallback: Rgba8::rgb(1, 2, 3),
    });
    assert_eq!(spec, BackgroundSpec::Solid(Rgba8::rgb(1, 2, 3)));
}
