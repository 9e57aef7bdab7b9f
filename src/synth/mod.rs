//! Per-segment synthesis
//!
//! Each segment independently becomes one rendition of the exemplar:
//! stretched to the segment's duration, shifted to its representative
//! pitch, and leveled to its representative amplitude. Segments share no
//! state, so they can be synthesized in any order or in parallel; every
//! scratch buffer is a local that is released on success and failure
//! alike.

pub mod shift;
pub mod stretch;

use crate::audio::{measure, AudioBuffer};
use crate::config::SynthesisConfig;
use crate::error::{MeowsicError, Result};
use crate::exemplar::Exemplar;
use crate::segment::Segment;

/// Keeps the amplitude-to-dB mapping finite for silent segments.
const GAIN_EPSILON: f32 = 1e-6;

/// A synthesized buffer tagged with where it belongs on the timeline.
#[derive(Debug, Clone)]
pub struct PlacedBuffer {
    /// Target start offset in seconds, copied from the source segment.
    pub start_secs: f32,
    pub buffer: AudioBuffer,
}

/// Renders segments from a shared exemplar.
pub struct SegmentSynthesizer<'a> {
    exemplar: &'a Exemplar,
    config: &'a SynthesisConfig,
}

impl<'a> SegmentSynthesizer<'a> {
    pub fn new(exemplar: &'a Exemplar, config: &'a SynthesisConfig) -> Self {
        Self { exemplar, config }
    }

    /// Synthesize one segment. A failure here is confined to this
    /// segment; the caller drops it and continues with the rest.
    pub fn synthesize(&self, index: usize, segment: &Segment) -> Result<PlacedBuffer> {
        let sample_rate = self.exemplar.buffer().sample_rate();
        let semitones = self.shift_for(segment);

        let target_secs = segment.duration().max(self.config.min_note_secs);
        let target_len = (target_secs as f64 * sample_rate as f64).round() as usize;

        let samples = self
            .render(target_len, semitones)
            .map_err(|e| MeowsicError::Synthesis {
                segment: index,
                start_secs: segment.start,
                source: Box::new(e),
            })?;

        let mut buffer = AudioBuffer::new(samples, 1, sample_rate)?;
        buffer.apply_gain_db(measure::linear_to_db(segment.amplitude + GAIN_EPSILON));

        tracing::debug!(
            segment = index,
            start_secs = segment.start,
            target_secs,
            semitones,
            "segment synthesized"
        );

        Ok(PlacedBuffer {
            start_secs: segment.start,
            buffer,
        })
    }

    /// Semitone offset from the exemplar's reference to the segment's
    /// representative pitch; zero for segments with no voiced content.
    fn shift_for(&self, segment: &Segment) -> f32 {
        let Some(pitch) = segment.pitch_hz else {
            return 0.0;
        };
        let mut semitones = 12.0 * (pitch / self.exemplar.reference_pitch_hz()).log2();
        if let Some(clamp) = self.config.shift_clamp_semitones {
            semitones = semitones.clamp(-clamp, clamp);
        }
        semitones
    }

    fn render(&self, target_len: usize, semitones: f32) -> Result<Vec<f32>> {
        let stretched = stretch::stretch_to_len(self.exemplar.buffer().samples(), target_len)?;
        shift::pitch_shift(&stretched, semitones)
    }
}
