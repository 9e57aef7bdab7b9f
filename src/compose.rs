//! Timed overlay compositing
//!
//! A silent canvas the length of the whole vocal track, mutated only by
//! additive overlays at sample-accurate offsets. Overlay is commutative,
//! so the result is independent of the order segments arrive in — the
//! placement comes from each buffer's recorded offset, never from
//! completion order.

use crate::audio::AudioBuffer;
use crate::error::{MeowsicError, Result};
use crate::synth::PlacedBuffer;

const STAGE: &str = "compose";

/// The synthetic vocal track under construction.
pub struct CompositeCanvas {
    buffer: AudioBuffer,
}

impl CompositeCanvas {
    /// Allocate a silent mono canvas covering `duration_secs`. The
    /// duration is measured from the original vocal track, not derived
    /// from segment coverage.
    pub fn new(duration_secs: f32, sample_rate: u32) -> Result<Self> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(MeowsicError::InvalidCanvasDuration {
                stage: STAGE,
                seconds: duration_secs,
            });
        }
        let num_frames = (duration_secs as f64 * sample_rate as f64).round() as usize;
        if num_frames == 0 {
            return Err(MeowsicError::InvalidCanvasDuration {
                stage: STAGE,
                seconds: duration_secs,
            });
        }
        Ok(Self {
            buffer: AudioBuffer::new(vec![0.0; num_frames], 1, sample_rate)?,
        })
    }

    /// Additively overlay a synthesized buffer at its recorded offset.
    /// Content reaching past the canvas end is truncated; overlapping
    /// overlays sum without normalization.
    pub fn overlay(&mut self, placed: &PlacedBuffer) -> Result<()> {
        if placed.buffer.sample_rate() != self.buffer.sample_rate() {
            return Err(MeowsicError::SampleRateMismatch {
                stage: STAGE,
                expected: self.buffer.sample_rate(),
                actual: placed.buffer.sample_rate(),
            });
        }
        if placed.buffer.channels() != 1 {
            return Err(MeowsicError::ChannelMismatch {
                stage: STAGE,
                expected: 1,
                actual: placed.buffer.channels(),
            });
        }

        let offset =
            (placed.start_secs as f64 * self.buffer.sample_rate() as f64).round() as usize;
        let canvas = self.buffer.samples_mut();
        for (i, &s) in placed.buffer.samples().iter().enumerate() {
            let Some(slot) = canvas.get_mut(offset + i) else {
                break;
            };
            *slot += s;
        }
        Ok(())
    }

    pub fn duration(&self) -> f32 {
        self.buffer.duration()
    }

    /// Finish compositing and hand over the track.
    pub fn into_buffer(self) -> AudioBuffer {
        self.buffer
    }
}
