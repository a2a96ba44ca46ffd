use serde::{Deserialize, Serialize};

use crate::foundation::core::{Fps, FrameIndex};

/// Frame budgets driving the typewriter reveal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Output frames spent on each revealed character (0 behaves as 1).
    pub frames_per_char: u32,
    /// Extra frames held after a `,` is revealed.
    pub pause_comma: u32,
    /// Extra frames held after `.`, `!` or `?` is revealed.
    pub pause_sentence_end: u32,
    /// Frames the completed text is held before the clip ends.
    pub dwell_frames: u64,
}

impl TimingConfig {
    /// Build timing from a dwell expressed in seconds (`floor(dwell_secs * fps)` frames).
    pub fn new(
        frames_per_char: u32,
        pause_comma: u32,
        pause_sentence_end: u32,
        dwell_secs: f64,
        fps: Fps,
    ) -> Self {
        Self {
            frames_per_char,
            pause_comma,
            pause_sentence_end,
            dwell_frames: fps.secs_to_frames_floor(dwell_secs),
        }
    }

    fn effective_frames_per_char(&self) -> u64 {
        u64::from(self.frames_per_char.max(1))
    }

    /// Pause queued after revealing `ch`.
    pub fn pause_after(&self, ch: char) -> u32 {
        match ch {
            ',' => self.pause_comma,
            '.' | '!' | '?' => self.pause_sentence_end,
            _ => 0,
        }
    }
}

/// Typewriter cursor position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealState {
    /// Line currently being typed; equals the line count once everything is shown.
    pub current_line: usize,
    /// Characters of `current_line` already visible.
    pub chars_revealed: usize,
    /// All lines fully visible.
    pub complete: bool,
}

/// Timeline phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Revealing characters.
    Typing,
    /// Holding after punctuation; `remaining` frames left.
    Paused {
        /// Frames left in the pause.
        remaining: u32,
    },
    /// Text complete, holding the final frame. `since` is the first dwell frame.
    Dwelling {
        /// Index of the first dwell frame.
        since: FrameIndex,
    },
    /// Terminal: no more frames.
    Finished,
}

/// One emitted output frame of the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick {
    /// Output frame index.
    pub frame: FrameIndex,
    /// What is visible on this frame.
    pub state: RevealState,
    /// Phase after this frame was produced.
    pub phase: Phase,
    /// Character that became visible on this frame, if any.
    pub revealed: Option<char>,
    /// Pause frames queued by `revealed`.
    pub pause_queued: u32,
}

impl Tick {
    /// Character the typing sound fires for: newly revealed and not whitespace.
    pub fn cue(&self) -> Option<char> {
        self.revealed.filter(|c| !c.is_whitespace())
    }
}

/// Deterministic reveal state machine, one [`Tick`] per output frame.
#[derive(Clone, Debug)]
pub struct RevealTimeline {
    lines: Vec<Vec<char>>,
    timing: TimingConfig,
    phase: Phase,
    state: RevealState,
    advance_counter: u64,
    next_frame: u64,
}

impl RevealTimeline {
    /// Start a timeline at frame 0 with nothing revealed.
    pub fn new(lines: &[String], timing: TimingConfig) -> Self {
        Self {
            lines: lines.iter().map(|l| l.chars().collect()).collect(),
            timing,
            phase: Phase::Typing,
            state: RevealState::default(),
            advance_counter: 0,
            next_frame: 0,
        }
    }

    /// Current cursor.
    pub fn state(&self) -> RevealState {
        self.state
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of frames emitted so far.
    pub fn frames_emitted(&self) -> u64 {
        self.next_frame
    }

    /// Produce the next frame's state, or `None` once `Finished`.
    pub fn advance(&mut self) -> Option<Tick> {
        let frame = FrameIndex(self.next_frame);
        let mut revealed = None;
        let mut pause_queued = 0;

        match self.phase {
            Phase::Finished => return None,
            Phase::Dwelling { since } => {
                if frame.0 - since.0 >= self.timing.dwell_frames {
                    self.phase = Phase::Finished;
                    return None;
                }
            }
            Phase::Paused { remaining } => {
                let remaining = remaining.saturating_sub(1);
                self.phase = if remaining > 0 {
                    Phase::Paused { remaining }
                } else if self.state.complete {
                    Phase::Dwelling {
                        since: FrameIndex(frame.0 + 1),
                    }
                } else {
                    Phase::Typing
                };
            }
            Phase::Typing => {
                self.skip_exhausted_lines();
                if self.state.complete {
                    // Nothing (left) to type: dwell starts on this very frame.
                    self.phase = Phase::Dwelling { since: frame };
                    return self.advance();
                }

                self.advance_counter += 1;
                if self.advance_counter >= self.timing.effective_frames_per_char() {
                    self.advance_counter = 0;
                    let ch = self.lines[self.state.current_line][self.state.chars_revealed];
                    self.state.chars_revealed += 1;
                    revealed = Some(ch);
                    pause_queued = self.timing.pause_after(ch);
                    self.skip_exhausted_lines();

                    if pause_queued > 0 {
                        self.phase = Phase::Paused {
                            remaining: pause_queued,
                        };
                    } else if self.state.complete {
                        self.phase = Phase::Dwelling {
                            since: FrameIndex(frame.0 + 1),
                        };
                    }
                }
            }
        }

        self.next_frame += 1;
        Some(Tick {
            frame,
            state: self.state,
            phase: self.phase,
            revealed,
            pause_queued,
        })
    }

    /// Move past fully revealed (or empty) lines, marking completion after the last one.
    fn skip_exhausted_lines(&mut self) {
        while self.state.current_line < self.lines.len()
            && self.state.chars_revealed >= self.lines[self.state.current_line].len()
        {
            self.state.current_line += 1;
            self.state.chars_revealed = 0;
        }
        if self.state.current_line >= self.lines.len() {
            self.state.complete = true;
        }
    }
}

impl Iterator for RevealTimeline {
    type Item = Tick;

    fn next(&mut self) -> Option<Tick> {
        self.advance()
    }
}

/// Closed-form frame count of a full timeline run.
///
/// `chars * frames_per_char + punctuation pauses + dwell`; always equal to the number of
/// ticks [`RevealTimeline`] emits for the same input.
pub fn total_frames(lines: &[String], timing: &TimingConfig) -> u64 {
    let mut chars = 0u64;
    let mut pauses = 0u64;
    for ch in lines.iter().flat_map(|l| l.chars()) {
        chars += 1;
        pauses += u64::from(timing.pause_after(ch));
    }
    chars * timing.effective_frames_per_char() + pauses + timing.dwell_frames
}

/// Frame indices at which the typing sound fires.
pub fn cue_frames(lines: &[String], timing: TimingConfig) -> Vec<FrameIndex> {
    RevealTimeline::new(lines, timing)
        .filter(|t| t.cue().is_some())
        .map(|t| t.frame)
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/reveal.rs"]
mod tests;
