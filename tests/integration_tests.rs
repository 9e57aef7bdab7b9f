//! Integration Tests
//!
//! End-to-end runs of the resynthesis pipeline on synthetic material.

use std::sync::Arc;

use meowsic::analysis::PitchAnalyzer;
use meowsic::audio::{load_wav, measure, save_wav, AudioBuffer};
use meowsic::config::{AnalysisConfig, RenderConfig};
use meowsic::segment::WordSpan;
use meowsic::{Exemplar, RenderContext, SegmentationStrategy};
use tempfile::tempdir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn test_context() -> RenderContext {
    let analyzer = PitchAnalyzer::new(AnalysisConfig::default());
    let exemplar_tone = AudioBuffer::sine_wave(330.0, 0.4, 44100);
    let exemplar = Exemplar::from_buffer(exemplar_tone, &analyzer).unwrap();
    RenderContext::new(Arc::new(exemplar), RenderConfig::default())
}

/// 1.5 s vocal: silence, a 440 Hz phrase from 0.5 s to 1.0 s, silence.
fn test_vocal() -> AudioBuffer {
    let mut samples = vec![0.0f32; 22050];
    samples.extend_from_slice(AudioBuffer::sine_wave(440.0, 0.5, 44100).samples());
    samples.extend(vec![0.0f32; 22050]);
    AudioBuffer::new(samples, 1, 44100).unwrap()
}

// === Full Pipeline Tests ===

#[test]
fn test_full_render_produces_both_tracks() {
    init_tracing();
    let ctx = test_context();
    let vocal = test_vocal();
    let accompaniment = AudioBuffer::sine_wave(110.0, 1.5, 44100);

    let output = ctx
        .render(&vocal, &accompaniment, &SegmentationStrategy::FrameRun)
        .unwrap();

    // both tracks mirror the vocal's duration, not the accompaniment's
    assert_eq!(output.creature_vocal.num_frames(), vocal.num_frames());
    assert_eq!(output.final_mix.num_frames(), vocal.num_frames());

    // the synthetic vocal actually contains audio
    assert!(measure::calculate_peak(output.creature_vocal.samples()) > 0.01);
}

#[test]
fn test_render_with_external_boundaries() {
    init_tracing();
    let ctx = test_context();
    let vocal = test_vocal();
    let accompaniment = AudioBuffer::sine_wave(110.0, 2.0, 44100);

    let spans = vec![
        WordSpan {
            label: "la".to_string(),
            start: 0.5,
            end: 0.75,
        },
        WordSpan {
            label: "laa".to_string(),
            start: 0.75,
            end: 1.0,
        },
        // degenerate span: dropped, not fatal
        WordSpan {
            label: "".to_string(),
            start: 1.0,
            end: 1.0,
        },
    ];

    let output = ctx
        .render(
            &vocal,
            &accompaniment,
            &SegmentationStrategy::ExternalBoundary(spans),
        )
        .unwrap();

    assert_eq!(output.final_mix.num_frames(), vocal.num_frames());
    // audio lands inside the word spans, none before them
    let head = measure::calculate_peak(&output.creature_vocal.samples()[..20000]);
    let mid = measure::calculate_peak(&output.creature_vocal.samples()[23000..42000]);
    assert_eq!(head, 0.0);
    assert!(mid > 0.01);
}

#[test]
fn test_unvoiced_vocal_end_to_end_is_not_an_error() {
    init_tracing();
    let ctx = test_context();
    // an entirely unvoiced "vocal": pure silence, 3 s
    let vocal = AudioBuffer::silence(3.0, 1, 44100);
    let accompaniment = AudioBuffer::sine_wave(110.0, 2.0, 44100);

    let output = ctx
        .render(&vocal, &accompaniment, &SegmentationStrategy::FrameRun)
        .unwrap();

    // silent synthetic vocal of the correct duration
    assert!((output.creature_vocal.duration() - 3.0).abs() < 1e-3);
    assert_eq!(measure::calculate_peak(output.creature_vocal.samples()), 0.0);

    // the mix is the accompaniment, padded with a silent tail
    assert!((output.final_mix.duration() - 3.0).abs() < 1e-3);
    let tail = &output.final_mix.samples()[2 * 44100 + 100..];
    assert_eq!(measure::calculate_peak(tail), 0.0);
}

// === File I/O Round Trips ===

#[test]
fn test_outputs_survive_wav_export() {
    let dir = tempdir().unwrap();
    let ctx = test_context();
    let vocal = test_vocal();
    let accompaniment = AudioBuffer::sine_wave(110.0, 2.0, 44100);

    let output = ctx
        .render(&vocal, &accompaniment, &SegmentationStrategy::FrameRun)
        .unwrap();

    let vocal_path = dir.path().join("creature_vocal.wav");
    let mix_path = dir.path().join("final_mix.wav");
    save_wav(&output.creature_vocal, &vocal_path).unwrap();
    save_wav(&output.final_mix, &mix_path).unwrap();

    let vocal_back = load_wav(&vocal_path).unwrap();
    let mix_back = load_wav(&mix_path).unwrap();
    assert!(output.creature_vocal.is_approx_equal(&vocal_back, 1e-6));
    assert!(output.final_mix.is_approx_equal(&mix_back, 1e-6));
}

#[test]
fn test_load_track_conforms_sample_rate() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("accompaniment.wav");

    let stem = AudioBuffer::sine_wave(110.0, 0.5, 48000);
    save_wav(&stem, &path).unwrap();

    let ctx = test_context();
    let track = ctx.load_track(&path).unwrap();
    assert_eq!(track.sample_rate(), 44100);
    assert!((track.duration() - 0.5).abs() < 0.01);
}

#[test]
fn test_exemplar_loads_from_file_at_target_rate() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("meow.wav");

    // exemplar asset recorded at 48 kHz; the pipeline runs at 44.1 kHz
    let asset = AudioBuffer::sine_wave(330.0, 0.5, 48000);
    save_wav(&asset, &path).unwrap();

    let analyzer = PitchAnalyzer::new(AnalysisConfig::default());
    let exemplar = Exemplar::load(&path, 44100, &analyzer).unwrap();

    assert_eq!(exemplar.buffer().sample_rate(), 44100);
    assert_eq!(exemplar.buffer().channels(), 1);
    assert!((exemplar.reference_pitch_hz() - 330.0).abs() < 5.0);
}

// === Request Isolation ===

#[test]
fn test_shared_context_serves_concurrent_requests() {
    let ctx = Arc::new(test_context());
    let vocal = test_vocal();
    let accompaniment = AudioBuffer::sine_wave(110.0, 2.0, 44100);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let ctx = Arc::clone(&ctx);
            let vocal = vocal.clone();
            let accompaniment = accompaniment.clone();
            std::thread::spawn(move || {
                ctx.render(&vocal, &accompaniment, &SegmentationStrategy::FrameRun)
                    .unwrap()
            })
        })
        .collect();

    let outputs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    // identical inputs give identical outputs regardless of interleaving
    for output in &outputs[1..] {
        assert!(output
            .creature_vocal
            .is_approx_equal(&outputs[0].creature_vocal, 0.0));
    }
}
