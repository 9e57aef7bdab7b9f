//! Tempo-only time stretching
//!
//! A phase-vocoder stretch that produces exactly the requested sample
//! count: duration changes, pitch does not. Analysis frames are taken at
//! a fractional hop derived from the stretch ratio and resynthesized at a
//! fixed hop with phase accumulation, then overlap-added under a Hann
//! window pair.

use rustfft::{num_complex::Complex, FftPlanner};

use crate::error::{MeowsicError, Result};

/// Smallest supported output/input length ratio.
pub const MIN_STRETCH_RATIO: f64 = 0.1;
/// Largest supported output/input length ratio.
pub const MAX_STRETCH_RATIO: f64 = 10.0;

const WINDOW_SIZE: usize = 2048;
const SYNTHESIS_HOP: usize = WINDOW_SIZE / 4;

/// Stretch `input` to exactly `target_len` samples.
///
/// Ratios outside the supported range are an error the caller treats as a
/// per-segment failure, not a request failure.
pub fn stretch_to_len(input: &[f32], target_len: usize) -> Result<Vec<f32>> {
    if input.is_empty() {
        return Err(MeowsicError::EmptyBuffer);
    }
    let ratio = target_len as f64 / input.len() as f64;
    if !(MIN_STRETCH_RATIO..=MAX_STRETCH_RATIO).contains(&ratio) {
        return Err(MeowsicError::StretchRatioOutOfRange {
            ratio,
            min: MIN_STRETCH_RATIO,
            max: MAX_STRETCH_RATIO,
        });
    }
    if target_len == input.len() {
        return Ok(input.to_vec());
    }

    let window: Vec<f32> = (0..WINDOW_SIZE)
        .map(|i| {
            0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / WINDOW_SIZE as f32).cos())
        })
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(WINDOW_SIZE);
    let ifft = planner.plan_fft_inverse(WINDOW_SIZE);

    let analysis_hop = SYNTHESIS_HOP as f64 / ratio;
    let bins = WINDOW_SIZE / 2 + 1;
    let mut prev_phase = vec![0.0f32; bins];
    let mut phase_acc = vec![0.0f32; bins];

    let mut output = vec![0.0f32; target_len + WINDOW_SIZE];
    let mut weight = vec![0.0f32; target_len + WINDOW_SIZE];

    let mut frame_index = 0usize;
    loop {
        let out_pos = frame_index * SYNTHESIS_HOP;
        if out_pos >= target_len {
            break;
        }
        let in_pos = (frame_index as f64 * analysis_hop).round() as usize;

        // windowed analysis grab, zero-padded past the input's end
        let mut buf: Vec<Complex<f32>> = (0..WINDOW_SIZE)
            .map(|i| {
                let s = input.get(in_pos + i).copied().unwrap_or(0.0);
                Complex::new(s * window[i], 0.0)
            })
            .collect();
        fft.process(&mut buf);

        for k in 0..bins {
            let (mag, phase) = buf[k].to_polar();
            let bin_freq = std::f32::consts::TAU * k as f32 / WINDOW_SIZE as f32;
            if frame_index == 0 {
                phase_acc[k] = phase;
            } else {
                // instantaneous frequency from the inter-frame phase
                // deviation, re-advanced at the synthesis hop
                let deviation = wrap_phase(phase - prev_phase[k] - bin_freq * analysis_hop as f32);
                let true_freq = bin_freq + deviation / analysis_hop as f32;
                phase_acc[k] = wrap_phase(phase_acc[k] + true_freq * SYNTHESIS_HOP as f32);
            }
            prev_phase[k] = phase;
            buf[k] = Complex::from_polar(mag, phase_acc[k]);
        }
        // conjugate mirror so the inverse transform stays real
        for k in bins..WINDOW_SIZE {
            buf[k] = buf[WINDOW_SIZE - k].conj();
        }
        ifft.process(&mut buf);

        let scale = 1.0 / WINDOW_SIZE as f32;
        for i in 0..WINDOW_SIZE {
            output[out_pos + i] += buf[i].re * scale * window[i];
            weight[out_pos + i] += window[i] * window[i];
        }
        frame_index += 1;
    }

    output.truncate(target_len);
    weight.truncate(target_len);
    for (s, &w) in output.iter_mut().zip(weight.iter()) {
        if w > 1e-6 {
            *s /= w;
        }
    }
    Ok(output)
}

fn wrap_phase(phase: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if phase >= 0.0 {
        (phase + PI) % TAU - PI
    } else {
        (phase - PI) % TAU + PI
    }
}
