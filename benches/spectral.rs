use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use speechprep::analysis::audio::{TrimSettings, trim_silence};
use speechprep::analysis::{SpectralEngine, SpectralSettings, extract_features};

const SAMPLE_RATE: u32 = 16_000;

fn noisy_voice(seconds: usize) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(9);
    (0..seconds * SAMPLE_RATE as usize)
        .map(|idx| {
            let t = idx as f32 / SAMPLE_RATE as f32;
            0.5 * (std::f32::consts::TAU * 180.0 * t).sin() + rng.random_range(-0.05..0.05)
        })
        .collect()
}

fn bench_spectral_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("spectral_engine");
    for seconds in [1usize, 5] {
        let samples = noisy_voice(seconds);
        let mut engine = SpectralEngine::new(SAMPLE_RATE, SpectralSettings::default());
        group.bench_with_input(BenchmarkId::from_parameter(seconds), &samples, |b, samples| {
            b.iter(|| engine.analyze(black_box(samples)));
        });
    }
    group.finish();
}

fn bench_full_descriptor_set(c: &mut Criterion) {
    let signal = trim_silence(noisy_voice(3), SAMPLE_RATE, &TrimSettings::default()).expect("voiced signal");
    let mut engine = SpectralEngine::new(SAMPLE_RATE, SpectralSettings::default());
    c.bench_function("extract_features_3s", |b| {
        b.iter(|| extract_features(&mut engine, black_box(&signal)));
    });
}

criterion_group!(benches, bench_spectral_engine, bench_full_descriptor_set);
criterion_main!(benches);
