//! Request pipeline
//!
//! One render request is a strict, non-looping stage sequence:
//! analyze → segment → synthesize → composite → mix. The `RenderContext`
//! is the only shared state and is read-only, so any number of requests
//! can run against it concurrently.
//!
//! Segment synthesis has no inter-segment dependency and fans out across
//! a thread pool; results are placed by their recorded start offsets, so
//! completion order never affects the output.

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;

use crate::analysis::PitchAnalyzer;
use crate::audio::{self, AudioBuffer};
use crate::compose::CompositeCanvas;
use crate::config::RenderConfig;
use crate::error::{MeowsicError, Result};
use crate::exemplar::Exemplar;
use crate::mix;
use crate::segment::{SegmentationStrategy, Segmenter};
use crate::synth::{PlacedBuffer, SegmentSynthesizer};

/// Everything a render request needs that outlives the request: the
/// shared exemplar and the pipeline configuration. Construct one per
/// process (or per test fixture) and share it.
pub struct RenderContext {
    exemplar: Arc<Exemplar>,
    config: RenderConfig,
}

/// The two tracks a request produces.
pub struct RenderOutput {
    /// The synthetic creature-vocal track on its own.
    pub creature_vocal: AudioBuffer,
    /// The creature vocal overlaid on the accompaniment.
    pub final_mix: AudioBuffer,
}

impl RenderContext {
    pub fn new(exemplar: Arc<Exemplar>, config: RenderConfig) -> Self {
        Self { exemplar, config }
    }

    pub fn exemplar(&self) -> &Exemplar {
        &self.exemplar
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Load a collaborator-produced stem (vocal or accompaniment),
    /// conformed to the pipeline's target sample rate. Channel layout
    /// is preserved.
    pub fn load_track<P: AsRef<Path>>(&self, path: P) -> Result<AudioBuffer> {
        Ok(audio::load_wav(path)?.resampled(self.exemplar.buffer().sample_rate()))
    }

    /// Rebuild the vocal track from the exemplar: the synthetic vocal
    /// has exactly the input's duration, silent wherever no segment
    /// was placed.
    pub fn synthesize_vocal(
        &self,
        vocal: &AudioBuffer,
        strategy: &SegmentationStrategy,
    ) -> Result<AudioBuffer> {
        let sample_rate = self.exemplar.buffer().sample_rate();
        if vocal.sample_rate() != sample_rate {
            return Err(MeowsicError::SampleRateMismatch {
                stage: "analyze",
                expected: sample_rate,
                actual: vocal.sample_rate(),
            });
        }

        tracing::info!(duration_secs = vocal.duration(), "analyzing vocal track");
        let analyzer = PitchAnalyzer::new(self.config.analysis.clone());
        let contour = analyzer.analyze(vocal)?;

        let segmenter = Segmenter::new(self.config.segmentation.clone());
        let segments = segmenter.segment(&contour, strategy);
        tracing::info!(
            segments = segments.len(),
            voiced_frames = contour.voiced_count(),
            "timeline segmented"
        );

        let synthesizer = SegmentSynthesizer::new(&self.exemplar, &self.config.synthesis);
        let placed: Vec<PlacedBuffer> = segments
            .par_iter()
            .enumerate()
            .filter_map(|(index, segment)| match synthesizer.synthesize(index, segment) {
                Ok(placed) => Some(placed),
                Err(error) => {
                    // one bad segment never aborts the request
                    tracing::warn!(segment = index, %error, "dropping segment");
                    None
                }
            })
            .collect();
        tracing::info!(
            rendered = placed.len(),
            total = segments.len(),
            "segments synthesized"
        );

        let mut canvas = CompositeCanvas::new(vocal.duration(), sample_rate)?;
        for buffer in &placed {
            canvas.overlay(buffer)?;
        }
        Ok(canvas.into_buffer())
    }

    /// Run the full pipeline for one request.
    pub fn render(
        &self,
        vocal: &AudioBuffer,
        accompaniment: &AudioBuffer,
        strategy: &SegmentationStrategy,
    ) -> Result<RenderOutput> {
        let creature_vocal = self.synthesize_vocal(vocal, strategy)?;
        let final_mix = mix::mix_tracks(&creature_vocal, accompaniment)?;
        Ok(RenderOutput {
            creature_vocal,
            final_mix,
        })
    }
}
