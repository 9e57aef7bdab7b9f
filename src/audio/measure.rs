//! Audio measurement utilities
//!
//! Objective level and frequency measurements used by synthesis gain
//! staging and by the test suite. No manual listening required.

use crate::audio::AudioBuffer;
use rustfft::{num_complex::Complex, FftPlanner};

/// Convert linear amplitude to decibels
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

/// Convert decibels to linear amplitude
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Calculate RMS (Root Mean Square) of samples
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Calculate peak (maximum absolute value) of samples
pub fn calculate_peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0_f32, f32::max)
}

/// Estimate the dominant frequency of a buffer in Hz.
///
/// Takes the strongest bin of a Hann-windowed FFT and refines it with
/// parabolic interpolation on log magnitudes, which resolves well below
/// one bin width for near-sinusoidal content. Returns None for silence
/// or when the buffer is shorter than `fft_size`.
pub fn dominant_frequency(buffer: &AudioBuffer, fft_size: usize) -> Option<f32> {
    let mono = buffer.to_mono();
    let samples = mono.samples();
    if samples.len() < fft_size {
        return None;
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);

    let mut spectrum: Vec<Complex<f32>> = samples
        .iter()
        .take(fft_size)
        .enumerate()
        .map(|(i, &s)| {
            let window =
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / fft_size as f32).cos());
            Complex::new(s * window, 0.0)
        })
        .collect();
    fft.process(&mut spectrum);

    let magnitudes: Vec<f32> = spectrum
        .iter()
        .take(fft_size / 2)
        .map(|c| c.norm())
        .collect();

    let (peak_bin, &peak_mag) = magnitudes
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))?;
    if peak_mag <= 1e-9 || peak_bin == 0 || peak_bin + 1 >= magnitudes.len() {
        return None;
    }

    // Parabolic refinement on log magnitudes around the peak bin
    let a = magnitudes[peak_bin - 1].max(1e-12).ln();
    let b = magnitudes[peak_bin].max(1e-12).ln();
    let c = magnitudes[peak_bin + 1].max(1e-12).ln();
    let denom = a - 2.0 * b + c;
    let offset = if denom.abs() > 1e-12 {
        (0.5 * (a - c) / denom).clamp(-0.5, 0.5)
    } else {
        0.0
    };

    let bin_hz = buffer.sample_rate() as f32 / fft_size as f32;
    Some((peak_bin as f32 + offset) * bin_hz)
}
