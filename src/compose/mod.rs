//! Static layout geometry and per-frame raster composition.

pub(crate) mod background;
pub(crate) mod compositor;
pub(crate) mod frame;
pub(crate) mod layout;
