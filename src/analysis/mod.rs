//! Pitch and amplitude analysis
//!
//! The analyzer turns PCM into a `PitchContour`: one frame per hop with an
//! explicit voiced/unvoiced marker and an RMS level. Downstream stages only
//! ever consume the contour, never the raw analysis internals.

pub mod pitch;

pub use pitch::PitchAnalyzer;

/// One analysis frame of the contour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourFrame {
    /// Frame start time in seconds.
    pub time: f32,
    /// Detected fundamental in Hz, or None for an unvoiced frame. A
    /// detected pitch is never reported as 0 Hz.
    pub f0: Option<f32>,
    /// RMS level of the frame, computed independently of voicing.
    pub rms: f32,
}

/// Ordered, fixed-hop sequence of analysis frames.
#[derive(Debug, Clone)]
pub struct PitchContour {
    frames: Vec<ContourFrame>,
    hop_secs: f32,
}

impl PitchContour {
    pub fn new(frames: Vec<ContourFrame>, hop_secs: f32) -> Self {
        Self { frames, hop_secs }
    }

    pub fn frames(&self) -> &[ContourFrame] {
        &self.frames
    }

    pub fn hop_secs(&self) -> f32 {
        self.hop_secs
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of voiced frames in the contour.
    pub fn voiced_count(&self) -> usize {
        self.frames.iter().filter(|f| f.f0.is_some()).count()
    }

    /// Mean fundamental over all voiced frames, or None if the contour has
    /// no voiced content.
    pub fn mean_voiced_f0(&self) -> Option<f32> {
        let voiced: Vec<f32> = self.frames.iter().filter_map(|f| f.f0).collect();
        if voiced.is_empty() {
            None
        } else {
            Some(voiced.iter().sum::<f32>() / voiced.len() as f32)
        }
    }

    /// Representative pitch and amplitude over frames whose time falls in
    /// `[start, end)`. Pitch is the mean of voiced f0 values only (None if
    /// no voiced frame is in range); amplitude is the mean RMS over all
    /// in-range frames, 0.0 when the range covers none.
    pub fn stats_in_range(&self, start: f32, end: f32) -> (Option<f32>, f32) {
        let mut f0_sum = 0.0f32;
        let mut f0_count = 0usize;
        let mut rms_sum = 0.0f32;
        let mut rms_count = 0usize;

        for frame in &self.frames {
            if frame.time < start || frame.time >= end {
                continue;
            }
            rms_sum += frame.rms;
            rms_count += 1;
            if let Some(f0) = frame.f0 {
                f0_sum += f0;
                f0_count += 1;
            }
        }

        let pitch = (f0_count > 0).then(|| f0_sum / f0_count as f32);
        let amplitude = if rms_count > 0 {
            rms_sum / rms_count as f32
        } else {
            0.0
        };
        (pitch, amplitude)
    }
}
