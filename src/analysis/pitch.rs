//! Autocorrelation pitch detection
//!
//! Frame-by-frame f0 estimation over a bounded musical range. Each frame's
//! normalized autocorrelation is computed through the frequency domain
//! (FFT of the power spectrum), the lag peak is refined with parabolic
//! interpolation, and a clarity gate decides voiced versus unvoiced.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::analysis::{ContourFrame, PitchContour};
use crate::audio::{measure, AudioBuffer};
use crate::config::AnalysisConfig;
use crate::error::{MeowsicError, Result};

/// Extracts a `PitchContour` from PCM audio.
pub struct PitchAnalyzer {
    config: AnalysisConfig,
}

impl PitchAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a buffer into a fixed-hop pitch/amplitude contour.
    ///
    /// Multi-channel input is mixed down to mono first. Entirely unvoiced
    /// audio produces a contour with zero voiced frames, not an error.
    pub fn analyze(&self, buffer: &AudioBuffer) -> Result<PitchContour> {
        if buffer.samples().is_empty() {
            return Err(MeowsicError::EmptyBuffer);
        }

        let mono = buffer.to_mono();
        let samples = mono.samples();
        let sample_rate = buffer.sample_rate();

        let fft_len = (self.config.frame_size * 2).next_power_of_two();
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_len);
        let ifft = planner.plan_fft_inverse(fft_len);

        let min_lag = ((sample_rate as f32 / self.config.max_pitch_hz).floor() as usize).max(2);
        let max_lag = (sample_rate as f32 / self.config.min_pitch_hz).ceil() as usize;

        let mut frames = Vec::with_capacity(samples.len() / self.config.hop_size + 1);
        let mut start = 0;
        while start < samples.len() {
            let end = (start + self.config.frame_size).min(samples.len());
            let slice = &samples[start..end];

            frames.push(ContourFrame {
                time: start as f32 / sample_rate as f32,
                f0: self.detect_f0(slice, sample_rate, &fft, &ifft, fft_len, min_lag, max_lag),
                rms: measure::calculate_rms(slice),
            });
            start += self.config.hop_size;
        }

        tracing::debug!(
            frames = frames.len(),
            voiced = frames.iter().filter(|f| f.f0.is_some()).count(),
            "pitch contour extracted"
        );

        Ok(PitchContour::new(
            frames,
            self.config.hop_secs(sample_rate),
        ))
    }

    /// Detect the fundamental of one frame, or None when unvoiced.
    #[allow(clippy::too_many_arguments)]
    fn detect_f0(
        &self,
        slice: &[f32],
        sample_rate: u32,
        fft: &Arc<dyn Fft<f32>>,
        ifft: &Arc<dyn Fft<f32>>,
        fft_len: usize,
        min_lag: usize,
        max_lag: usize,
    ) -> Option<f32> {
        let n = slice.len();
        // need headroom for the lag+1 neighbor in peak refinement
        let max_lag = max_lag.min(n.saturating_sub(2));
        if min_lag >= max_lag {
            return None;
        }

        // Linear autocorrelation via zero-padded FFT of the power spectrum
        let mut buf = vec![Complex::new(0.0f32, 0.0f32); fft_len];
        for (b, &s) in buf.iter_mut().zip(slice.iter()) {
            b.re = s;
        }
        fft.process(&mut buf);
        for x in buf.iter_mut() {
            *x = Complex::new(x.norm_sqr(), 0.0);
        }
        ifft.process(&mut buf);

        let scale = 1.0 / fft_len as f32;
        let r0 = buf[0].re * scale;
        if r0 <= 1e-9 {
            return None;
        }

        // Normalized ACF with the shrinking-overlap taper divided out
        let norm_at = |lag: usize| -> f32 {
            let taper = (1.0 - lag as f32 / n as f32).max(1e-3);
            buf[lag].re * scale / (r0 * taper)
        };

        // Local maxima in the lag range, refined parabolically
        let mut peaks: Vec<(f32, f32)> = Vec::new();
        for lag in min_lag..=max_lag {
            let (prev, here, next) = (norm_at(lag - 1), norm_at(lag), norm_at(lag + 1));
            if here > prev && here >= next && here > 0.0 {
                let denom = prev - 2.0 * here + next;
                let d = if denom.abs() > 1e-12 {
                    (0.5 * (prev - next) / denom).clamp(-0.5, 0.5)
                } else {
                    0.0
                };
                peaks.push((lag as f32 + d, here - 0.25 * (prev - next) * d));
            }
        }

        let best = peaks.iter().fold(0.0f32, |acc, p| acc.max(p.1));
        if best < self.config.clarity_threshold {
            return None;
        }
        // earliest peak near the best one; guards against picking a
        // multiple of the true period
        let chosen = peaks.iter().find(|p| p.1 >= best * 0.9)?;

        let f0 = sample_rate as f32 / chosen.0;
        (f0 >= self.config.min_pitch_hz && f0 <= self.config.max_pitch_hz).then_some(f0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_contour_is_voiced_at_the_right_pitch() {
        let analyzer = PitchAnalyzer::new(AnalysisConfig::default());
        let buffer = AudioBuffer::sine_wave(440.0, 1.0, 44100);
        let contour = analyzer.analyze(&buffer).unwrap();

        assert!(contour.voiced_count() > contour.len() / 2);
        let mean = contour.mean_voiced_f0().unwrap();
        assert!((mean - 440.0).abs() < 5.0, "mean f0 was {mean} Hz");
    }

    #[test]
    fn test_low_pitch_detection() {
        let analyzer = PitchAnalyzer::new(AnalysisConfig::default());
        let buffer = AudioBuffer::sine_wave(110.0, 1.0, 44100);
        let contour = analyzer.analyze(&buffer).unwrap();

        let mean = contour.mean_voiced_f0().unwrap();
        assert!((mean - 110.0).abs() < 3.0, "mean f0 was {mean} Hz");
    }

    #[test]
    fn test_silence_is_entirely_unvoiced() {
        let analyzer = PitchAnalyzer::new(AnalysisConfig::default());
        let buffer = AudioBuffer::silence(1.0, 1, 44100);
        let contour = analyzer.analyze(&buffer).unwrap();

        assert!(contour.len() > 0);
        assert_eq!(contour.voiced_count(), 0);
    }

    #[test]
    fn test_rms_tracks_amplitude_independent_of_voicing() {
        let analyzer = PitchAnalyzer::new(AnalysisConfig::default());
        let mut buffer = AudioBuffer::sine_wave(440.0, 0.5, 44100);
        buffer.apply_gain(0.25);
        let contour = analyzer.analyze(&buffer).unwrap();

        // interior frames see the full 0.25-amplitude sine: RMS ~ 0.177
        let mid = &contour.frames()[contour.len() / 2];
        assert!((mid.rms - 0.177).abs() < 0.02);
    }

    #[test]
    fn test_frame_spacing_matches_hop() {
        let config = AnalysisConfig::default();
        let hop_secs = config.hop_secs(44100);
        let analyzer = PitchAnalyzer::new(config);
        let buffer = AudioBuffer::sine_wave(440.0, 0.25, 44100);
        let contour = analyzer.analyze(&buffer).unwrap();

        for pair in contour.frames().windows(2) {
            assert!((pair[1].time - pair[0].time - hop_secs).abs() < 1e-6);
        }
    }
}
