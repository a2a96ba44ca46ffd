use super::*;

fn lines(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| (*s).to_owned()).collect()
}

fn timing(fpc: u32, comma: u32, sentence: u32, dwell: u64) -> TimingConfig {
    TimingConfig {
        frames_per_char: fpc,
        pause_comma: comma,
        pause_sentence_end: sentence,
        dwell_frames: dwell,
    }
}

fn run(lines: &[String], t: TimingConfig) -> Vec<Tick> {
    RevealTimeline::new(lines, t).collect()
}

#[test]
fn dwell_frames_use_floor_of_seconds_times_fps() {
    let fps = Fps::integer(30).unwrap();
    assert_eq!(TimingConfig::new(1, 4, 10, 2.0, fps).dwell_frames, 60);
    assert_eq!(TimingConfig::new(1, 4, 10, 0.5, fps).dwell_frames, 15);
    assert_eq!(TimingConfig::new(1, 4, 10, 0.01, fps).dwell_frames, 0);
}

#[test]
fn hi_period_counts_chars_pause_and_dwell() {
    let l = lines(&["Hi."]);
    let t = TimingConfig::new(1, 4, 10, 2.0, Fps::integer(30).unwrap());
    let ticks = run(&l, t);

    assert_eq!(ticks.len() as u64, total_frames(&l, &t));
    assert_eq!(ticks.len(), 3 + 10 + 60);

    let complete_from = ticks.iter().position(|t| t.state.complete).unwrap();
    assert_eq!(complete_from, 2);
    let tail = &ticks[ticks.len() - 60..];
    assert!(tail.iter().all(|t| t.state == ticks[complete_from].state));
    assert!(tail.iter().all(|t| t.revealed.is_none()));
    assert!(matches!(
        ticks.last().unwrap().phase,
        Phase::Dwelling { .. }
    ));
}

#[test]
fn comma_pauses_exactly_configured_frames() {
    let l = lines(&["a,b"]);
    let ticks = run(&l, timing(1, 4, 10, 0));

    assert_eq!(ticks[0].revealed, Some('a'));
    assert_eq!(ticks[1].revealed, Some(','));
    assert_eq!(ticks[1].pause_queued, 4);
    for t in &ticks[2..6] {
        assert_eq!(t.revealed, None);
        assert_eq!(t.state.chars_revealed, 2);
        assert_eq!(t.state.current_line, 0);
    }
    assert_eq!(ticks[6].revealed, Some('b'));
    assert_eq!(ticks.len(), 7);
}

#[test]
fn frames_per_char_spaces_out_reveals() {
    let l = lines(&["abc"]);
    let ticks = run(&l, timing(3, 0, 0, 0));
    let reveal_frames: Vec<u64> = ticks
        .iter()
        .filter(|t| t.revealed.is_some())
        .map(|t| t.frame.0)
        .collect();
    assert_eq!(reveal_frames, vec![2, 5, 8]);
    assert_eq!(ticks.len(), 9);
}

#[test]
fn zero_frames_per_char_behaves_as_one() {
    let l = lines(&["ab", "c"]);
    let t = timing(0, 0, 0, 5);
    assert_eq!(run(&l, t).len() as u64, total_frames(&l, &t));
    assert_eq!(total_frames(&l, &t), 3 + 5);
}

#[test]
fn total_frames_matches_emitted_for_mixed_inputs() {
    let cases = [
        lines(&["Hello, world.", "How are you?", " ", "Fine!"]),
        lines(&["...", ",,,"]),
        lines(&[" "]),
        lines(&["no punctuation here"]),
        lines(&["end with comma,"]),
    ];
    for l in &cases {
        for t in [
            timing(1, 4, 10, 60),
            timing(2, 0, 3, 0),
            timing(5, 7, 0, 1),
        ] {
            let emitted = run(l, t).len() as u64;
            assert_eq!(emitted, total_frames(l, &t), "lines={l:?} timing={t:?}");
        }
    }
}

#[test]
fn line_index_monotonic_and_char_index_resets_on_line_change() {
    let l = lines(&["ab,", "cd.", "e"]);
    let ticks = run(&l, timing(2, 3, 5, 4));

    let mut prev = RevealState::default();
    for t in &ticks {
        assert!(t.state.current_line >= prev.current_line);
        if t.state.current_line > prev.current_line {
            assert_eq!(t.state.chars_revealed, 0);
        } else {
            assert!(t.state.chars_revealed >= prev.chars_revealed);
        }
        prev = t.state;
    }
    assert_eq!(prev.current_line, l.len());
    assert!(prev.complete);
}

#[test]
fn punctuation_at_line_end_pauses_before_next_line() {
    let l = lines(&["a.", "b"]);
    let ticks = run(&l, timing(1, 0, 3, 0));
    // '.' revealed on frame 1 and the cursor already sits at line 1.
    assert_eq!(ticks[1].revealed, Some('.'));
    assert_eq!(
        ticks[1].state,
        RevealState {
            current_line: 1,
            chars_revealed: 0,
            complete: false
        }
    );
    assert!(ticks[2..5].iter().all(|t| t.revealed.is_none()));
    assert_eq!(ticks[5].revealed, Some('b'));
}

#[test]
fn empty_lines_do_not_loop_forever() {
    let l = lines(&["", "", "x", ""]);
    let t = timing(1, 0, 0, 2);
    let ticks = run(&l, t);
    assert_eq!(ticks.len(), 3);
    assert_eq!(ticks[0].revealed, Some('x'));

    let nothing: Vec<String> = Vec::new();
    assert_eq!(run(&nothing, t).len(), 2);
    assert_eq!(run(&nothing, timing(1, 0, 0, 0)).len(), 0);
}

#[test]
fn finished_is_terminal() {
    let l = lines(&["a"]);
    let mut tl = RevealTimeline::new(&l, timing(1, 0, 0, 1));
    assert!(tl.advance().is_some());
    assert!(tl.advance().is_some());
    assert!(tl.advance().is_none());
    assert_eq!(tl.phase(), Phase::Finished);
    assert!(tl.advance().is_none());
    assert_eq!(tl.frames_emitted(), 2);
}

#[test]
fn cues_fire_once_per_visible_character() {
    let l = lines(&["a b,", " "]);
    let t = timing(1, 2, 0, 3);
    let cues = cue_frames(&l, t);
    // 'a' @0, ' ' @1 (silent), 'b' @2, ',' @3, pause 4-5, ' ' @6 (silent).
    assert_eq!(cues, vec![FrameIndex(0), FrameIndex(2), FrameIndex(3)]);

    let ticks = run(&l, t);
    assert!(
        ticks
            .iter()
            .filter(|t| !matches!(t.phase, Phase::Typing) && t.revealed.is_none())
            .all(|t| t.cue().is_none())
    );
}
