//! Text measurement, glyph rasterization and word wrapping.

pub(crate) mod face;
pub(crate) mod wrap;
