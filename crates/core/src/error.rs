//! Error types for the backdrop core.

use thiserror::Error;

/// Errors produced while configuring a particle field.
///
/// The per-frame path never fails; these only surface from configuration,
/// color parsing, and the headless snapshot tooling.
#[derive(Debug, Error)]
pub enum BackdropError {
    /// A configuration value was out of range or inconsistent.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// Surface dimensions could not be represented by the target buffer.
    #[error("invalid dimensions: width and height must fit the target buffer")]
    InvalidDimensions,

    /// Writing a snapshot failed.
    #[error("i/o error: {0}")]
    Io(String),

    /// A config document could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for BackdropError {
    fn from(e: serde_json::Error) -> Self {
        BackdropError::Serialization(e.to_string())
    }
}
