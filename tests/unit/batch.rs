use super::*;
use crate::foundation::error::Stage;

#[test]
fn wildcards_translate_to_anchored_regex() {
    let re = wildcard_regex("*.txt").unwrap();
    assert!(re.is_match("a.txt"));
    assert!(re.is_match(".txt"));
    assert!(!re.is_match("a.txt.bak"));
    assert!(!re.is_match("atxt"));

    let re = wildcard_regex("line?.txt").unwrap();
    assert!(re.is_match("line1.txt"));
    assert!(!re.is_match("line10.txt"));

    let re = wildcard_regex("a+b (1).txt").unwrap();
    assert!(re.is_match("a+b (1).txt"));
    assert!(!re.is_match("aab (1).txt"));
}

#[test]
fn expand_lists_matching_files_sorted() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["b.txt", "a.txt", "c.md", "ab.txt"] {
        std::fs::write(dir.path().join(name), "x").unwrap();
    }
    std::fs::create_dir(dir.path().join("dir.txt")).unwrap();

    let pattern = dir.path().join("*.txt");
    let files = expand_pattern(pattern.to_str().unwrap()).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap().to_owned())
        .collect();
    assert_eq!(names, vec!["a.txt", "ab.txt", "b.txt"]);
}

#[test]
fn outcome_classification() {
    let mut report = BatchReport::default();
    assert_eq!(report.outcome(), BatchOutcome::AllSucceeded);
    report.failed.push(BatchItemError {
        input: PathBuf::from("x.txt"),
        source: TypewaveError::missing_input("gone"),
    });
    assert_eq!(report.outcome(), BatchOutcome::AllFailed);
    report.succeeded.push((
        PathBuf::from("y.txt"),
        JobOutcome {
            outputs: vec![PathBuf::from("y.gif")],
            stats: Default::default(),
        },
    ));
    assert_eq!(report.outcome(), BatchOutcome::PartialSuccess);
    assert_eq!(report.total(), 2);
}

#[test]
fn output_path_uses_input_stem() {
    let config = JobConfig {
        format: OutputFormat::Webm,
        output_dir: PathBuf::from("renders"),
        ..JobConfig::default()
    };
    assert_eq!(
        batch_output_path(&config, Path::new("dialogue/scene_01.txt")),
        PathBuf::from("renders/scene_01.webm")
    );
}

#[test]
fn shared_stems_get_numbered_outputs() {
    let config = JobConfig {
        format: OutputFormat::Gif,
        output_dir: PathBuf::from("out"),
        ..JobConfig::default()
    };
    let mut claimed = HashSet::new();
    let names: Vec<PathBuf> = ["a.md", "a.txt", "b.txt", "a.text"]
        .iter()
        .map(|f| claim_output_path(batch_output_path(&config, Path::new(f)), &mut claimed))
        .collect();
    assert_eq!(
        names,
        vec![
            PathBuf::from("out/a.gif"),
            PathBuf::from("out/a_2.gif"),
            PathBuf::from("out/b.gif"),
            PathBuf::from("out/a_3.gif"),
        ]
    );

    let frames = JobConfig {
        format: OutputFormat::Frames,
        ..config
    };
    let mut claimed = HashSet::new();
    claim_output_path(batch_output_path(&frames, Path::new("x.txt")), &mut claimed);
    assert_eq!(
        claim_output_path(batch_output_path(&frames, Path::new("x.md")), &mut claimed),
        PathBuf::from("out/x_frames_2")
    );
}

#[test]
fn no_matches_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = JobConfig {
        format: OutputFormat::Gif,
        ..JobConfig::default()
    };
    let pattern = dir.path().join("*.txt");
    let err = run_batch(&config, pattern.to_str().unwrap(), &mut |_, _| {}).unwrap_err();
    assert!(matches!(err, TypewaveError::MissingInput(_)));
}

#[test]
fn every_item_failing_is_reported_not_raised() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["one.txt", "two.txt"] {
        std::fs::write(dir.path().join(name), "hello").unwrap();
    }
    let config = JobConfig {
        format: OutputFormat::Gif,
        asset_dir: dir.path().to_path_buf(),
        output_dir: dir.path().join("out"),
        auto_discover: true,
        ..JobConfig::default()
    };
    let pattern = dir.path().join("*.txt");
    let report = run_batch(&config, pattern.to_str().unwrap(), &mut |_, _| {}).unwrap();

    assert_eq!(report.outcome(), BatchOutcome::AllFailed);
    assert_eq!(report.failed.len(), 2);
    assert_eq!(report.failed[0].input, dir.path().join("one.txt"));
    assert!(report.failed.iter().all(|e| e.source.stage() == Stage::Assets));
    assert!(report.failed[1].to_string().contains("assets stage"));
}
