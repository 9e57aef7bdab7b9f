//! Meowsic - Creature-Voice Resynthesis Engine
//!
//! Meowsic rebuilds a vocal track out of a single reference creature
//! sound (the exemplar): it follows the original's pitch and amplitude
//! contour, renders one stretched-and-shifted copy of the exemplar per
//! segment of the timeline, and mixes the result with the accompaniment.
//!
//! # Pipeline
//!
//! vocal PCM → [`analysis::PitchAnalyzer`] → [`segment::Segmenter`] →
//! [`synth::SegmentSynthesizer`] → [`compose::CompositeCanvas`] →
//! [`mix::mix_tracks`]
//!
//! The whole pipeline is a pure function of its inputs; the only shared
//! state is the read-only [`exemplar::Exemplar`] inside a
//! [`pipeline::RenderContext`]. Serving concerns (uploads, source
//! separation, transcription, muxing) live outside this crate.

pub mod analysis;
pub mod audio;
pub mod compose;
pub mod config;
pub mod error;
pub mod exemplar;
pub mod mix;
pub mod pipeline;
pub mod segment;
pub mod synth;

// Re-export commonly used types
pub use audio::AudioBuffer;
pub use error::{MeowsicError, Result};
pub use exemplar::Exemplar;
pub use pipeline::{RenderContext, RenderOutput};
pub use segment::SegmentationStrategy;
