//! Asset loading: images and font/portrait discovery.

pub(crate) mod decode;
pub(crate) mod discover;
