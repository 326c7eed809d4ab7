use std::f32::consts::TAU;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn write_test_wav(path: &Path, samples: &[f32], sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create wav parent dirs");
    }
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav writer");
    for &sample in samples {
        writer.write_sample(sample).expect("write wav sample");
    }
    writer.finalize().expect("finalize wav");
}

pub fn sine(freq_hz: f32, seconds: f32, sample_rate: u32, amplitude: f32) -> Vec<f32> {
    let len = (seconds * sample_rate as f32) as usize;
    (0..len)
        .map(|idx| amplitude * (TAU * freq_hz * idx as f32 / sample_rate as f32).sin())
        .collect()
}

/// Uniform white noise in `[-amplitude, amplitude)` from a fixed seed.
pub fn noise(seed: u64, seconds: f32, sample_rate: u32, amplitude: f32) -> Vec<f32> {
    let len = (seconds * sample_rate as f32) as usize;
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| rng.random_range(-amplitude..amplitude))
        .collect()
}

/// Two voiced phrases with a syllable-rate envelope, separated by a pause.
pub fn speech_like(sample_rate: u32) -> Vec<f32> {
    let phrase = |seconds: f32| -> Vec<f32> {
        let len = (seconds * sample_rate as f32) as usize;
        (0..len)
            .map(|idx| {
                let t = idx as f32 / sample_rate as f32;
                let envelope = 0.02 + 0.98 * (std::f32::consts::PI * 3.0 * t).sin().powi(4);
                let voice = 0.6 * (TAU * 220.0 * t).sin() + 0.3 * (TAU * 440.0 * t).sin();
                voice * envelope
            })
            .collect()
    };
    let mut samples = phrase(0.8);
    samples.extend(std::iter::repeat_n(0.0, (0.6 * sample_rate as f32) as usize));
    samples.extend(phrase(0.8));
    samples
}

pub fn write_corrupt_file(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dirs");
    }
    std::fs::write(path, b"RIFF\x00\x00\x00\x00not really audio").expect("write corrupt file");
}
