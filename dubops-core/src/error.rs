//! Error types for dubops-core organized by processing stage.

use thiserror::Error;

/// Dubbing pipeline error variants organized by processing stage.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration stage error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Audio processing stage error
    #[error(transparent)]
    Audio(#[from] AudioError),

    /// Synthesis stage error
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}

/// Configuration errors (thresholds, limits).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Speed-up cap below unity would slow clips down instead
    #[error("invalid speed factor cap: {0} (minimum 1.0)")]
    InvalidSpeedFactor(f32),

    /// Zero-width admission gate would deadlock synthesis
    #[error("synthesis concurrency must be at least 1")]
    ZeroConcurrency,

    /// Background gain outside the linear range
    #[error("invalid background gain: {0} (expected 0.0..=1.0)")]
    InvalidBackgroundGain(f32),
}

/// Audio processing and validation errors.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Sample rate validation failed
    #[error("sample rate mismatch: expected {expected}Hz, got {got}Hz")]
    SampleRateMismatch { expected: u32, got: u32 },

    /// Channel count validation failed
    #[error("invalid channel count: expected mono or stereo, got {0} channels")]
    InvalidChannels(u16),

    /// Tempo correction failed
    #[error("tempo correction failed at factor {factor}: {reason}")]
    TempoCorrection { factor: f32, reason: String },

    /// IO error during audio loading
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// WAV file format error
    #[error(transparent)]
    Hound(#[from] hound::Error),
}

/// Speech synthesis errors (external collaborator).
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// The external synthesis backend reported a failure
    #[error("synthesis backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The rendered clip could not be read back
    #[error("unreadable synthesis output: {0}")]
    UnreadableClip(#[source] Box<AudioError>),
}

/// Result type alias for dubops-core operations.
pub type Result<T> = std::result::Result<T, Error>;

// Nested From implementations for automatic error conversion chains

// hound::Error → AudioError → Error
impl From<hound::Error> for Error {
    fn from(e: hound::Error) -> Self {
        Error::Audio(AudioError::Hound(e))
    }
}

// std::io::Error → AudioError → Error
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Audio(AudioError::Io(e))
    }
}
