//! Job driver: text and assets in, frames out to the sinks.

pub(crate) mod driver;
pub(crate) mod worker;
