use ndarray::Array2;

use super::stft::freq_to_bin;

/// Power floor for decibel conversion.
const POWER_FLOOR: f32 = 1e-10;

/// Triangular mel filterbank over FFT power bins.
pub(super) struct MelBank {
    filters: Vec<Vec<(usize, f32)>>,
}

impl MelBank {
    pub(super) fn new(
        sample_rate: u32,
        fft_len: usize,
        mel_bands: usize,
        f_min: f32,
        f_max: f32,
    ) -> Self {
        let bins = mel_bins(sample_rate, fft_len, mel_bands, f_min, f_max);
        Self {
            filters: build_filters(&bins, mel_bands),
        }
    }

    pub(super) fn bands(&self) -> usize {
        self.filters.len()
    }

    /// Weighted power per mel band.
    pub(super) fn energies_into(&self, power: &[f32], out: &mut Vec<f32>) {
        out.clear();
        for filter in &self.filters {
            let mut sum = 0.0_f64;
            for &(bin, weight) in filter {
                let p = power.get(bin).copied().unwrap_or(0.0).max(0.0) as f64;
                sum += p * weight as f64;
            }
            out.push(sum as f32);
        }
    }
}

fn mel_bins(
    sample_rate: u32,
    fft_len: usize,
    mel_bands: usize,
    f_min: f32,
    f_max: f32,
) -> Vec<usize> {
    let nyquist = sample_rate.max(1) as f32 * 0.5;
    let f_max = f_max.min(nyquist).max(f_min);
    let mel_min = hz_to_mel(f_min);
    let mel_max = hz_to_mel(f_max);
    (0..(mel_bands + 2))
        .map(|i| {
            let t = i as f32 / (mel_bands + 1) as f32;
            mel_to_hz(mel_min + (mel_max - mel_min) * t)
        })
        .map(|hz| freq_to_bin(hz, sample_rate, fft_len))
        .collect()
}

fn build_filters(bins: &[usize], mel_bands: usize) -> Vec<Vec<(usize, f32)>> {
    (0..mel_bands)
        .map(|m| {
            let left = bins[m];
            let center = bins[m + 1];
            let right = bins[m + 2].max(center + 1);
            build_tri_filter(left, center, right)
        })
        .collect()
}

fn build_tri_filter(left: usize, center: usize, right: usize) -> Vec<(usize, f32)> {
    if right <= left {
        return Vec::new();
    }
    (left..=right)
        .filter_map(|bin| {
            let w = if bin < center {
                (bin as f32 - left as f32) / (center as f32 - left as f32)
            } else if bin == center {
                1.0
            } else {
                (right as f32 - bin as f32) / (right as f32 - center as f32)
            };
            (w > 0.0).then_some((bin, w))
        })
        .collect()
}

fn hz_to_mel(hz: f32) -> f32 {
    2595.0_f32 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0_f32 * (10.0_f32.powf(mel / 2595.0) - 1.0)
}

/// Convert a power spectrogram to dB relative to its maximum, in place.
///
/// Values end up in `[-top_db, 0]`.
pub(super) fn power_to_db_ref_max(power: &mut Array2<f32>, top_db: f32) {
    let reference = power.iter().copied().fold(0.0_f32, f32::max).max(POWER_FLOOR);
    let ref_db = 10.0 * reference.log10();
    let floor = -top_db.abs();
    power.mapv_inplace(|p| (10.0 * p.max(POWER_FLOOR).log10() - ref_db).max(floor));
}

/// Orthonormal DCT-II, first `count` coefficients.
pub(super) fn dct_ii_ortho(values: &[f32], count: usize) -> Vec<f32> {
    let n = values.len().max(1) as f64;
    (0..count)
        .map(|k| {
            let mut sum = 0.0_f64;
            for (m, &v) in values.iter().enumerate() {
                let angle = std::f64::consts::PI * (k as f64) * ((m as f64) + 0.5) / n;
                sum += v as f64 * angle.cos();
            }
            let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
            (sum * scale) as f32
        })
        .collect()
}
