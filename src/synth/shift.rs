//! Resampling-based pitch shifting
//!
//! Shifts pitch while keeping duration: the signal is first stretched by
//! the pitch factor (tempo-only), then resampled back to its original
//! length, which scales all frequencies by the factor. Formant
//! characteristics travel with the shift; that trade-off is accepted.

use crate::error::{MeowsicError, Result};
use crate::synth::stretch;

/// Shift `input` by the given number of semitones, preserving length.
pub fn pitch_shift(input: &[f32], semitones: f32) -> Result<Vec<f32>> {
    if input.is_empty() {
        return Err(MeowsicError::EmptyBuffer);
    }
    if semitones.abs() < 1e-3 {
        return Ok(input.to_vec());
    }

    let factor = 2.0f64.powf(semitones as f64 / 12.0);
    let stretched_len = ((input.len() as f64 * factor).round() as usize).max(1);
    let stretched = stretch::stretch_to_len(input, stretched_len)?;

    let mut shifted = resample(&stretched, factor);
    // rounding in the two passes can leave the length off by a sample
    shifted.resize(input.len(), 0.0);
    Ok(shifted)
}

/// Read `input` at `step`-sample increments with linear interpolation.
/// A step above 1.0 shortens the signal and raises its pitch; below 1.0
/// lengthens and lowers it.
pub fn resample(input: &[f32], step: f64) -> Vec<f32> {
    if input.is_empty() {
        return Vec::new();
    }
    let out_len = ((input.len() as f64 / step).floor() as usize).max(1);
    let last = input.len() - 1;
    (0..out_len)
        .map(|i| {
            let pos = i as f64 * step;
            let i0 = (pos as usize).min(last);
            let i1 = (i0 + 1).min(last);
            let frac = (pos - i0 as f64) as f32;
            input[i0] + (input[i1] - input[i0]) * frac
        })
        .collect()
}
