//! Final duration-aligned mixing
//!
//! Overlays the synthetic vocal with the accompaniment. The vocal's
//! duration is authoritative (it mirrors the original vocal track): the
//! accompaniment is truncated when longer and padded with trailing
//! silence when shorter, then the two are summed.

use crate::audio::AudioBuffer;
use crate::error::{MeowsicError, Result};

const STAGE: &str = "mix";

/// Mix the synthetic vocal with the accompaniment into the final track.
///
/// When channel counts differ and one side is mono, the mono side is
/// upmixed by duplication; any other layout mismatch is fatal, as is a
/// sample-rate mismatch.
pub fn mix_tracks(vocal: &AudioBuffer, accompaniment: &AudioBuffer) -> Result<AudioBuffer> {
    if vocal.sample_rate() != accompaniment.sample_rate() {
        return Err(MeowsicError::SampleRateMismatch {
            stage: STAGE,
            expected: vocal.sample_rate(),
            actual: accompaniment.sample_rate(),
        });
    }

    let channels = vocal.channels().max(accompaniment.channels());
    let vocal_frames = upmixed(vocal, channels)?;
    let accomp_frames = upmixed(accompaniment, channels)?;

    let num_frames = vocal.num_frames();
    let ch = channels as usize;
    let mut samples = vec![0.0f32; num_frames * ch];

    for (i, slot) in samples.iter_mut().enumerate() {
        *slot = vocal_frames[i];
        // accompaniment truncates at the vocal's end and pads (with
        // nothing to add) when it runs out early
        if let Some(&a) = accomp_frames.get(i) {
            *slot += a;
        }
    }

    tracing::info!(
        duration_secs = vocal.duration(),
        channels,
        "final mix rendered"
    );
    AudioBuffer::new(samples, channels, vocal.sample_rate())
}

/// Interleaved samples of `buffer` conformed to `channels`.
fn upmixed(buffer: &AudioBuffer, channels: u16) -> Result<Vec<f32>> {
    if buffer.channels() == channels {
        return Ok(buffer.samples().to_vec());
    }
    if buffer.channels() != 1 {
        return Err(MeowsicError::ChannelMismatch {
            stage: STAGE,
            expected: channels,
            actual: buffer.channels(),
        });
    }
    Ok(buffer
        .samples()
        .iter()
        .flat_map(|&s| std::iter::repeat(s).take(channels as usize))
        .collect())
}
