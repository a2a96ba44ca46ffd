//! Typing-sound track: decode one sound, lay a copy at every cue frame.

pub(crate) mod cues;
pub(crate) mod decode;
