//! Reveal timeline: which part of the text is visible on each output frame.

pub(crate) mod reveal;
