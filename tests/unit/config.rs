use super::*;

#[test]
fn defaults_match_documented_values() {
    let cfg = JobConfig::default();
    assert_eq!(
        cfg.layout,
        LayoutMode::PixelPerfect {
            max_text_width: 1000
        }
    );
    assert_eq!(cfg.padding, 10);
    assert_eq!(cfg.font_size, 20.0);
    assert_eq!(cfg.fps, 30);
    assert_eq!(
        (cfg.frames_per_char, cfg.pause_comma, cfg.pause_sentence_end),
        (1, 4, 10)
    );
    assert_eq!(cfg.dwell_secs, 2.0);
    assert_eq!(cfg.text_color, Rgba8::WHITE);
    assert_eq!(
        cfg.background,
        BackgroundConfig::Solid {
            color: Rgba8::BLACK
        }
    );
    assert_eq!(cfg.format, OutputFormat::Mp4);
    cfg.validate().unwrap();
    assert_eq!(cfg.timing().unwrap().dwell_frames, 60);
}

#[test]
fn partial_json_merges_over_defaults() {
    let cfg = JobConfig::from_json_str(
        r##"{
            "fps": 24,
            "text_color": "#ff000080",
            "background": {"mode": "gradient", "start": [0, 0, 0], "end": [255, 255, 255]},
            "layout": {"mode": "fixed_box", "width": 640, "height": 120}
        }"##,
    )
    .unwrap();
    assert_eq!(cfg.fps, 24);
    assert_eq!(cfg.text_color, Rgba8::rgba(255, 0, 0, 128));
    assert_eq!(
        cfg.background,
        BackgroundConfig::Gradient {
            direction: GradientDirection::Vertical,
            start: Rgba8::BLACK,
            end: Rgba8::WHITE
        }
    );
    assert_eq!(cfg.padding, 10);
    assert_eq!(cfg.pause_comma, 4);
}

#[test]
fn missing_and_malformed_files_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    assert_eq!(JobConfig::load_or_default(&missing), JobConfig::default());

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "{ this is not json").unwrap();
    assert_eq!(JobConfig::load_or_default(&bad), JobConfig::default());

    let wrong_type = dir.path().join("wrong.json");
    std::fs::write(&wrong_type, r#"{"fps": "fast"}"#).unwrap();
    assert_eq!(JobConfig::load_or_default(&wrong_type), JobConfig::default());
}

#[test]
fn save_then_load_preserves_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sub").join("config.json");
    let mut cfg = JobConfig::default();
    cfg.fps = 12;
    cfg.also_gif = true;
    cfg.background = BackgroundConfig::Image {
        path: PathBuf::from("bg.png"),
        fallback: Rgba8::rgb(1, 2, 3),
    };
    cfg.save(&path).unwrap();
    assert_eq!(JobConfig::load_or_default(&path), cfg);
}

#[test]
fn overrides_produce_a_new_config() {
    let base = JobConfig::default();
    let o = ConfigOverrides {
        fps: Some(60),
        padding: Some(0),
        format: Some(OutputFormat::Gif),
        text_color: Some(Rgba8::rgb(1, 1, 1)),
        ..ConfigOverrides::default()
    };
    let merged = base.with_overrides(&o);
    assert_eq!(merged.fps, 60);
    assert_eq!(merged.padding, 0);
    assert_eq!(merged.format, OutputFormat::Gif);
    assert_eq!(merged.text_color, Rgba8::rgb(1, 1, 1));
    assert_eq!(merged.pause_comma, base.pause_comma);
    // The base is untouched.
    assert_eq!(base, JobConfig::default());
    assert_eq!(base.with_overrides(&ConfigOverrides::default()), base);
}

#[test]
fn validate_rejects_unusable_values() {
    let bad = [
        ConfigOverrides {
            fps: Some(0),
            ..Default::default()
        },
        ConfigOverrides {
            font_size: Some(0.0),
            ..Default::default()
        },
        ConfigOverrides {
            dwell_secs: Some(-1.0),
            ..Default::default()
        },
        ConfigOverrides {
            layout: Some(LayoutMode::FixedBox {
                width: 0,
                height: 100,
            }),
            ..Default::default()
        },
        ConfigOverrides {
            layout: Some(LayoutMode::FixedBox {
                width: 20,
                height: 100,
            }),
            padding: Some(10),
            ..Default::default()
        },
    ];
    for o in &bad {
        assert!(
            JobConfig::default().with_overrides(o).validate().is_err(),
            "{o:?}"
        );
    }
}
