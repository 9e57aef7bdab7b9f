//! Audio buffer implementation
//!
//! AudioBuffer is the core data structure for holding decoded PCM. Buffers
//! are treated as immutable by the pipeline; stages produce new buffers
//! instead of mutating their inputs (the compositor's canvas is the one
//! deliberate exception).

use crate::error::{MeowsicError, Result};

/// Audio sample data with metadata
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Interleaved audio samples normalized to -1.0..1.0
    samples: Vec<f32>,
    /// Number of audio channels (1 = mono, 2 = stereo)
    channels: u16,
    /// Sample rate in Hz
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a new audio buffer with the given parameters
    pub fn new(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Result<Self> {
        if samples.is_empty() {
            return Err(MeowsicError::EmptyBuffer);
        }
        if channels == 0 || samples.len() % channels as usize != 0 {
            return Err(MeowsicError::UnsupportedFormat {
                details: format!(
                    "Sample count {} is not divisible by channel count {}",
                    samples.len(),
                    channels
                ),
            });
        }
        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    /// Create a silent buffer with the given duration
    pub fn silence(duration_secs: f32, channels: u16, sample_rate: u32) -> Self {
        let num_frames = (duration_secs as f64 * sample_rate as f64).round() as usize;
        Self {
            samples: vec![0.0; num_frames * channels as usize],
            channels,
            sample_rate,
        }
    }

    /// Create a mono sine wave test tone
    pub fn sine_wave(frequency: f32, duration_secs: f32, sample_rate: u32) -> Self {
        let num_samples = (duration_secs as f64 * sample_rate as f64).round() as usize;
        let samples = (0..num_samples)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (2.0 * std::f32::consts::PI * frequency * t).sin()
            })
            .collect();

        Self {
            samples,
            channels: 1,
            sample_rate,
        }
    }

    /// Get a reference to the samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Get a mutable reference to the samples
    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// Get the number of channels
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the number of frames (samples per channel)
    pub fn num_frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Get the duration in seconds
    pub fn duration(&self) -> f32 {
        self.num_frames() as f32 / self.sample_rate as f32
    }

    /// Get samples for a specific channel (0-indexed)
    pub fn channel_samples(&self, channel: u16) -> Vec<f32> {
        if channel >= self.channels {
            return Vec::new();
        }
        self.samples
            .iter()
            .skip(channel as usize)
            .step_by(self.channels as usize)
            .copied()
            .collect()
    }

    /// Mix all channels down to a new mono buffer. A mono buffer is
    /// returned unchanged (cloned).
    pub fn to_mono(&self) -> AudioBuffer {
        if self.channels == 1 {
            return self.clone();
        }
        let channels = self.channels as usize;
        let samples = self
            .samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();
        Self {
            samples,
            channels: 1,
            sample_rate: self.sample_rate,
        }
    }

    /// Produce a new buffer resampled to the target rate using linear
    /// interpolation. Channel count is preserved.
    pub fn resampled(&self, target_rate: u32) -> AudioBuffer {
        if target_rate == self.sample_rate {
            return self.clone();
        }
        let step = self.sample_rate as f64 / target_rate as f64;
        let channels = self.channels as usize;
        let src_frames = self.num_frames();
        let out_frames = (src_frames as f64 / step).floor() as usize;
        let mut samples = Vec::with_capacity(out_frames * channels);
        for i in 0..out_frames {
            let pos = i as f64 * step;
            let i0 = pos as usize;
            let frac = (pos - i0 as f64) as f32;
            for ch in 0..channels {
                let a = self.samples[i0 * channels + ch];
                let b = if i0 + 1 < src_frames {
                    self.samples[(i0 + 1) * channels + ch]
                } else {
                    a
                };
                samples.push(a + (b - a) * frac);
            }
        }
        Self {
            samples,
            channels: self.channels,
            sample_rate: target_rate,
        }
    }

    /// Apply gain in linear scale
    pub fn apply_gain(&mut self, gain: f32) {
        for sample in &mut self.samples {
            *sample *= gain;
        }
    }

    /// Apply gain in decibels
    pub fn apply_gain_db(&mut self, gain_db: f32) {
        self.apply_gain(10.0_f32.powf(gain_db / 20.0));
    }

    /// Check if buffers are approximately equal within tolerance
    pub fn is_approx_equal(&self, other: &AudioBuffer, tolerance: f32) -> bool {
        self.channels == other.channels
            && self.sample_rate == other.sample_rate
            && self.samples.len() == other.samples.len()
            && self
                .samples
                .iter()
                .zip(other.samples.iter())
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}
