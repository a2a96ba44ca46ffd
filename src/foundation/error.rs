use std::path::PathBuf;

/// Convenience result type used across Typewave.
pub type TypewaveResult<T> = Result<T, TypewaveError>;

/// Pipeline stage an error originated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Reading the dialogue text.
    Input,
    /// Resolving and decoding fonts, portraits, background images and sounds.
    Assets,
    /// Wrapping and canvas geometry.
    Layout,
    /// Output sinks and external encoders.
    Encode,
    /// Configuration parsing and validation.
    Config,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Input => "input",
            Self::Assets => "assets",
            Self::Layout => "layout",
            Self::Encode => "encode",
            Self::Config => "config",
        };
        f.write_str(name)
    }
}

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum TypewaveError {
    /// Dialogue text source not found or unreadable.
    #[error("missing input: {0}")]
    MissingInput(String),

    /// A required asset (the font) could not be resolved or decoded.
    #[error("missing asset: {0}")]
    MissingAsset(String),

    /// Canvas or padding geometry that cannot produce a frame.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The backend needed for the requested output format is not installed.
    #[error("encoder unavailable: {0}")]
    EncoderUnavailable(String),

    /// Invalid user-provided configuration or job data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Failure while writing frames to an output sink.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TypewaveError {
    /// Build a [`TypewaveError::MissingInput`] value.
    pub fn missing_input(msg: impl Into<String>) -> Self {
        Self::MissingInput(msg.into())
    }

    /// Build a [`TypewaveError::MissingAsset`] value.
    pub fn missing_asset(msg: impl Into<String>) -> Self {
        Self::MissingAsset(msg.into())
    }

    /// Build a [`TypewaveError::InvalidGeometry`] value.
    pub fn invalid_geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }

    /// Build a [`TypewaveError::EncoderUnavailable`] value.
    pub fn encoder_unavailable(msg: impl Into<String>) -> Self {
        Self::EncoderUnavailable(msg.into())
    }

    /// Build a [`TypewaveError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TypewaveError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`TypewaveError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// The pipeline stage this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            Self::MissingInput(_) => Stage::Input,
            Self::MissingAsset(_) => Stage::Assets,
            Self::InvalidGeometry(_) => Stage::Layout,
            Self::EncoderUnavailable(_) | Self::Encode(_) | Self::Other(_) => Stage::Encode,
            Self::Validation(_) | Self::Serde(_) => Stage::Config,
        }
    }
}

/// One failed item of a batch run.
#[derive(thiserror::Error, Debug)]
#[error("batch item '{}' failed at {} stage: {source}", input.display(), source.stage())]
pub struct BatchItemError {
    /// Input file that failed.
    pub input: PathBuf,
    /// Underlying job error.
    #[source]
    pub source: TypewaveError,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
