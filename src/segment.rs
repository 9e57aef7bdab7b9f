//! Vocal timeline segmentation
//!
//! Divides the analyzed vocal track into the spans that each get one
//! synthesized creature sound. Two strategies exist and the caller picks
//! one explicitly: word boundaries from an external transcriber, or
//! maximal runs of voiced frames from the contour itself.

use serde::Deserialize;

use crate::analysis::PitchContour;
use crate::config::SegmentationConfig;
use crate::error::{MeowsicError, Result};

/// One span of the vocal timeline to resynthesize.
///
/// `end > start` always holds; spans violating it never become segments.
/// Within one track, segments are produced in source time order.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Span start in seconds.
    pub start: f32,
    /// Span end in seconds.
    pub end: f32,
    /// Representative pitch over the span, None when no voiced frame
    /// falls inside it.
    pub pitch_hz: Option<f32>,
    /// Representative RMS amplitude over the span.
    pub amplitude: f32,
}

impl Segment {
    pub fn duration(&self) -> f32 {
        self.end - self.start
    }
}

/// A word-level time span from the transcription collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct WordSpan {
    pub label: String,
    #[serde(rename = "startSeconds")]
    pub start: f32,
    #[serde(rename = "endSeconds")]
    pub end: f32,
}

impl WordSpan {
    /// Parse the transcriber's JSON output: an ordered array of
    /// `{label, startSeconds, endSeconds}` objects.
    pub fn parse_transcript(json: &str) -> Result<Vec<WordSpan>> {
        serde_json::from_str(json).map_err(|e| MeowsicError::UnsupportedFormat {
            details: format!("transcript JSON: {e}"),
        })
    }
}

/// How to carve the vocal timeline into segments. Chosen explicitly by
/// the caller; the segmenter never inspects content to decide.
#[derive(Debug, Clone)]
pub enum SegmentationStrategy {
    /// Use word boundaries supplied by the external transcriber.
    ExternalBoundary(Vec<WordSpan>),
    /// Group maximal contiguous runs of voiced contour frames.
    FrameRun,
}

/// Carves a `PitchContour` into `Segment`s under a chosen strategy.
pub struct Segmenter {
    config: SegmentationConfig,
}

impl Segmenter {
    pub fn new(config: SegmentationConfig) -> Self {
        Self { config }
    }

    pub fn segment(
        &self,
        contour: &PitchContour,
        strategy: &SegmentationStrategy,
    ) -> Vec<Segment> {
        match strategy {
            SegmentationStrategy::ExternalBoundary(spans) => self.from_spans(contour, spans),
            SegmentationStrategy::FrameRun => self.from_voiced_runs(contour),
        }
    }

    /// Map transcriber word spans onto segments. Degenerate spans
    /// (end <= start) are dropped with a diagnostic; this is not an error.
    fn from_spans(&self, contour: &PitchContour, spans: &[WordSpan]) -> Vec<Segment> {
        let mut segments = Vec::with_capacity(spans.len());
        for span in spans {
            if span.end <= span.start {
                tracing::warn!(
                    label = %span.label,
                    start = span.start,
                    end = span.end,
                    "dropping zero-length word span"
                );
                continue;
            }
            let (pitch_hz, amplitude) = contour.stats_in_range(span.start, span.end);
            segments.push(Segment {
                start: span.start,
                end: span.end,
                pitch_hz,
                amplitude,
            });
        }
        segments
    }

    /// Group maximal runs of voiced frames. A run shorter than the
    /// configured floor keeps its start and is widened by whole hop
    /// frames; runs are never merged, so each stays an independent
    /// segment even when a widened tail reaches into the next run.
    fn from_voiced_runs(&self, contour: &PitchContour) -> Vec<Segment> {
        let frames = contour.frames();
        let hop = contour.hop_secs();
        let mut segments = Vec::new();

        let mut i = 0;
        while i < frames.len() {
            if frames[i].f0.is_none() {
                i += 1;
                continue;
            }
            let run_start = i;
            while i < frames.len() && frames[i].f0.is_some() {
                i += 1;
            }
            let run_end = i; // exclusive

            let start = frames[run_start].time;
            let mut end = frames[run_end - 1].time + hop;
            while end - start < self.config.min_run_secs {
                end += hop;
            }

            // representative stats come from the run's own frames, not
            // the widened tail
            let natural_end = frames[run_end - 1].time + hop;
            let (pitch_hz, amplitude) = contour.stats_in_range(start, natural_end);

            segments.push(Segment {
                start,
                end,
                pitch_hz,
                amplitude,
            });
        }
        segments
    }
}
