mod support;

use speechprep::analysis::FEATURE_NAMES;
use speechprep::batch::{ClipPipeline, ExtractError, ExtractionSettings};
use speechprep::capabilities::{Capabilities, ResamplerKind};
use speechprep::quality::ClassifierProfile;
use support::wav::{noise, sine, speech_like, write_corrupt_file, write_test_wav};
use tempfile::TempDir;

fn pipeline(resampler: ResamplerKind) -> ClipPipeline {
    let capabilities = Capabilities {
        resampler,
        ..Capabilities::default()
    };
    ClipPipeline::new(
        ExtractionSettings::default(),
        capabilities,
        ClassifierProfile::default(),
    )
}

#[test]
fn pure_tone_is_voiced_at_its_pitch() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tones").join("a440.wav");
    write_test_wav(&path, &sine(440.0, 2.0, 44_100, 0.5), 44_100);

    let analysis = pipeline(ResamplerKind::Sinc)
        .analyze(&path, "tones", "a440")
        .unwrap();

    assert_eq!(analysis.sample_rate(), 16_000);
    assert_eq!(analysis.raw.original_sample_rate, 44_100);
    assert!((analysis.raw.original_duration_sec - 2.0).abs() < 0.01);
    assert!(analysis.features.voiced_ratio() > 0.9);
    let mut voiced: Vec<f32> = analysis
        .features
        .temporal
        .pitch
        .pitch
        .iter()
        .copied()
        .filter(|&hz| hz > 0.0)
        .collect();
    voiced.sort_by(f32::total_cmp);
    let median = voiced[voiced.len() / 2];
    assert!((median - 440.0).abs() < 5.0, "median pitch {median}");
}

#[test]
fn resampled_duration_is_preserved() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clip.wav");
    write_test_wav(&path, &sine(300.0, 1.5, 22_050, 0.3), 22_050);
    for resampler in [ResamplerKind::Sinc, ResamplerKind::Linear] {
        let analysis = pipeline(resampler).analyze(&path, "", "clip").unwrap();
        // Trimming works on whole frames, so up to one frame may drop off the tail.
        let expected = 24_000usize;
        assert!(analysis.sample_count <= expected + 16, "{resampler:?}");
        assert!(analysis.sample_count + 2_048 >= expected, "{resampler:?}");
    }
}

#[test]
fn frame_indexed_arrays_share_one_frame_count() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("speech.wav");
    write_test_wav(&path, &speech_like(16_000), 16_000);

    let analysis = pipeline(ResamplerKind::Sinc)
        .analyze(&path, "", "speech")
        .unwrap();
    let features = &analysis.features;
    let frames = features.frames();
    assert!(frames > 0);
    let shapes = features.shapes();
    assert_eq!(shapes.len(), FEATURE_NAMES.len());
    assert_eq!(shapes["waveform"], vec![analysis.sample_count]);
    assert_eq!(shapes["mfcc"], vec![13, frames]);
    assert_eq!(shapes["log_mel"], vec![64, frames]);
    assert_eq!(shapes["spectral_contrast"], vec![7, frames]);
    assert_eq!(shapes["chroma"], vec![12, frames]);
    for name in ["spectral_centroid", "spectral_bandwidth", "rms", "zcr"] {
        assert_eq!(shapes[name], vec![1, frames], "{name}");
    }
    assert_eq!(shapes["pitch"], vec![frames]);
}

#[test]
fn waveform_is_peak_normalized() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("quiet.wav");
    write_test_wav(&path, &noise(7, 1.0, 16_000, 0.05), 16_000);
    let analysis = pipeline(ResamplerKind::Sinc)
        .analyze(&path, "", "quiet")
        .unwrap();
    let peak = analysis
        .features
        .waveform
        .iter()
        .fold(0.0_f32, |acc, v| acc.max(v.abs()));
    // The loudest sample may sit in the partial frame trimming drops.
    assert!(peak > 0.95 && peak <= 1.0 + 1e-6, "peak {peak}");
}

#[test]
fn silent_clip_is_rejected_as_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("silence.wav");
    write_test_wav(&path, &vec![0.0; 3 * 16_000], 16_000);
    let result = pipeline(ResamplerKind::Sinc).analyze(&path, "", "silence");
    assert!(matches!(result, Err(ExtractError::EmptySignal { .. })));
}

#[test]
fn corrupt_file_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.wav");
    write_corrupt_file(&path);
    let result = pipeline(ResamplerKind::Sinc).analyze(&path, "", "broken");
    assert!(matches!(result, Err(ExtractError::Load(_))));
}
