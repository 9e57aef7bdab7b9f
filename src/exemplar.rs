//! Exemplar loading and reference-pitch derivation
//!
//! The exemplar is the single reference sound whose timbre every
//! synthesized segment is built from. It is loaded once per process,
//! analyzed for its reference pitch, and shared read-only across requests.

use std::path::Path;

use crate::analysis::PitchAnalyzer;
use crate::audio::{self, AudioBuffer};
use crate::error::Result;

/// Reference pitch used when the exemplar itself has no voiced frames.
pub const FALLBACK_REFERENCE_HZ: f32 = 300.0;

/// The reference creature sound plus its derived pitch.
///
/// Immutable after construction, so an `Arc<Exemplar>` is safe to share
/// across concurrently running requests.
#[derive(Debug, Clone)]
pub struct Exemplar {
    buffer: AudioBuffer,
    reference_pitch_hz: f32,
}

impl Exemplar {
    /// Build an exemplar from an already-decoded buffer. The buffer is
    /// mixed to mono; the reference pitch is the mean f0 over its voiced
    /// frames, falling back to [`FALLBACK_REFERENCE_HZ`] for unpitched
    /// material.
    pub fn from_buffer(buffer: AudioBuffer, analyzer: &PitchAnalyzer) -> Result<Self> {
        let mono = buffer.to_mono();
        let contour = analyzer.analyze(&mono)?;
        let reference_pitch_hz = contour.mean_voiced_f0().unwrap_or(FALLBACK_REFERENCE_HZ);

        tracing::info!(
            reference_pitch_hz,
            voiced_frames = contour.voiced_count(),
            duration_secs = mono.duration(),
            "exemplar loaded"
        );

        Ok(Self {
            buffer: mono,
            reference_pitch_hz,
        })
    }

    /// Load the exemplar from a WAV file, normalizing to mono at the
    /// given sample rate.
    pub fn load<P: AsRef<Path>>(
        path: P,
        target_sample_rate: u32,
        analyzer: &PitchAnalyzer,
    ) -> Result<Self> {
        let buffer = audio::load_wav(path)?
            .to_mono()
            .resampled(target_sample_rate);
        Self::from_buffer(buffer, analyzer)
    }

    pub fn buffer(&self) -> &AudioBuffer {
        &self.buffer
    }

    pub fn reference_pitch_hz(&self) -> f32 {
        self.reference_pitch_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use approx::assert_relative_eq;

    #[test]
    fn test_pitched_exemplar_reference_is_finite_and_in_range() {
        let analyzer = PitchAnalyzer::new(AnalysisConfig::default());
        let buffer = AudioBuffer::sine_wave(330.0, 0.8, 44100);
        let exemplar = Exemplar::from_buffer(buffer, &analyzer).unwrap();

        let reference = exemplar.reference_pitch_hz();
        assert!(reference.is_finite());
        assert!(reference > 65.0 && reference < 2094.0);
        assert_relative_eq!(reference, 330.0, max_relative = 0.02);
    }

    #[test]
    fn test_unpitched_exemplar_falls_back() {
        let analyzer = PitchAnalyzer::new(AnalysisConfig::default());
        let buffer = AudioBuffer::silence(0.5, 1, 44100);
        let exemplar = Exemplar::from_buffer(buffer, &analyzer).unwrap();
        assert_eq!(exemplar.reference_pitch_hz(), FALLBACK_REFERENCE_HZ);
    }

    #[test]
    fn test_stereo_exemplar_is_mixed_down() {
        let analyzer = PitchAnalyzer::new(AnalysisConfig::default());
        let mono = AudioBuffer::sine_wave(330.0, 0.5, 44100);
        let interleaved: Vec<f32> = mono
            .samples()
            .iter()
            .flat_map(|&s| [s, s])
            .collect();
        let stereo = AudioBuffer::new(interleaved, 2, 44100).unwrap();

        let exemplar = Exemplar::from_buffer(stereo, &analyzer).unwrap();
        assert_eq!(exemplar.buffer().channels(), 1);
        assert!((exemplar.reference_pitch_hz() - 330.0).abs() < 5.0);
    }
}
