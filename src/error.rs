//! Error types for meowsic
//!
//! All errors use the MeowsicError type. Input and composition errors are
//! fatal to a request; per-segment synthesis errors are caught inside the
//! pipeline so the remaining segments still render.

use thiserror::Error;

/// Result type alias using MeowsicError
pub type Result<T> = std::result::Result<T, MeowsicError>;

/// All possible errors in meowsic
#[derive(Error, Debug)]
pub enum MeowsicError {
    // Audio I/O errors
    #[error("Failed to read audio file: {path}")]
    AudioRead {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("Failed to write audio file: {path}")]
    AudioWrite {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("Unsupported audio format: {details}")]
    UnsupportedFormat { details: String },

    #[error("Audio buffer is empty")]
    EmptyBuffer,

    // Per-segment synthesis errors
    #[error("Stretch ratio {ratio:.3} outside supported range {min}..{max}")]
    StretchRatioOutOfRange { ratio: f64, min: f64, max: f64 },

    #[error("Synthesis failed for segment {segment} at {start_secs:.3}s")]
    Synthesis {
        segment: usize,
        start_secs: f32,
        #[source]
        source: Box<MeowsicError>,
    },

    // Composition and mix errors
    #[error("{stage}: canvas duration must be positive, got {seconds:.3}s")]
    InvalidCanvasDuration { stage: &'static str, seconds: f32 },

    #[error("{stage}: sample rate mismatch: expected {expected}, got {actual}")]
    SampleRateMismatch {
        stage: &'static str,
        expected: u32,
        actual: u32,
    },

    #[error("{stage}: channel count mismatch: expected {expected}, got {actual}")]
    ChannelMismatch {
        stage: &'static str,
        expected: u16,
        actual: u16,
    },
}

impl MeowsicError {
    /// Whether this error aborts the whole request. Non-fatal errors are
    /// confined to a single segment, which the pipeline drops and moves on.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::StretchRatioOutOfRange { .. } | Self::Synthesis { .. }
        )
    }
}
