//! Pipeline configuration
//!
//! Every tunable constant lives here as an explicit config struct so the
//! pipeline can be constructed with test fixtures instead of process-wide
//! defaults.

/// Sample rate every track is normalized to before processing.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Pitch analysis parameters.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Analysis frame length in samples.
    pub frame_size: usize,
    /// Hop between consecutive frames in samples.
    pub hop_size: usize,
    /// Lowest detectable fundamental in Hz (C2 by default).
    pub min_pitch_hz: f32,
    /// Highest detectable fundamental in Hz (C7 by default).
    pub max_pitch_hz: f32,
    /// Normalized autocorrelation peak a frame must clear to count as voiced.
    pub clarity_threshold: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            hop_size: 512,
            min_pitch_hz: 65.406,
            max_pitch_hz: 2093.005,
            clarity_threshold: 0.3,
        }
    }
}

impl AnalysisConfig {
    /// Hop duration in seconds at the given sample rate.
    pub fn hop_secs(&self, sample_rate: u32) -> f32 {
        self.hop_size as f32 / sample_rate as f32
    }
}

/// Segmentation parameters.
#[derive(Debug, Clone)]
pub struct SegmentationConfig {
    /// Minimum effective duration of a voiced-run segment, in seconds.
    /// Shorter runs keep their start and are widened by whole hop frames.
    pub min_run_secs: f32,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self { min_run_secs: 0.3 }
    }
}

/// Per-segment synthesis parameters.
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    /// Floor on a segment's target duration, in seconds. Guards against
    /// degenerate stretch ratios for very short segments.
    pub min_note_secs: f32,
    /// Optional symmetric clamp on the per-segment pitch shift, in
    /// semitones. `None` leaves the shift unbounded.
    pub shift_clamp_semitones: Option<f32>,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            min_note_secs: 0.05,
            shift_clamp_semitones: None,
        }
    }
}

/// Complete configuration for one render pipeline.
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    pub analysis: AnalysisConfig,
    pub segmentation: SegmentationConfig,
    pub synthesis: SynthesisConfig,
}
