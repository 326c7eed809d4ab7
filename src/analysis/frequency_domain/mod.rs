//! Frequency-domain feature extraction (STFT, mel, MFCC, contrast, chroma, centroid).

mod chroma;
mod contrast;
mod mel;
mod stft;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::fft::SpectrumPlan;
use super::framing::{frame_at, frame_count};
use chroma::ChromaMap;
use contrast::ContrastBands;
use mel::{MelBank, dct_ii_ortho, power_to_db_ref_max};

pub use chroma::PITCH_CLASSES;

/// Share of Nyquist above which magnitude counts as high-frequency content.
const HIGH_FREQUENCY_CUTOFF: f32 = 0.3;
/// Fraction of each contrast band averaged for its peak and valley.
const CONTRAST_QUANTILE: f32 = 0.02;

/// STFT grid and descriptor sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralSettings {
    pub frame_size: usize,
    pub hop_size: usize,
    pub n_mels: usize,
    pub n_mfcc: usize,
    /// Floor of the log-mel spectrogram below its maximum, in dB.
    pub log_mel_top_db: f32,
    pub contrast_bands: usize,
    /// Upper edge of the lowest contrast band in Hz.
    pub contrast_fmin: f32,
}

impl Default for SpectralSettings {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            hop_size: 512,
            n_mels: 64,
            n_mfcc: 13,
            log_mel_top_db: 80.0,
            contrast_bands: 6,
            contrast_fmin: 200.0,
        }
    }
}

impl SpectralSettings {
    /// Clamp sizes into a usable range.
    pub fn normalized(mut self) -> Self {
        self.frame_size = self.frame_size.clamp(64, 1 << 16);
        self.hop_size = self.hop_size.clamp(1, self.frame_size);
        self.n_mels = self.n_mels.clamp(1, 512);
        self.n_mfcc = self.n_mfcc.clamp(1, self.n_mels);
        if !self.log_mel_top_db.is_finite() || self.log_mel_top_db <= 0.0 {
            self.log_mel_top_db = 80.0;
        }
        self.contrast_bands = self.contrast_bands.clamp(1, 12);
        if !self.contrast_fmin.is_finite() || self.contrast_fmin <= 0.0 {
            self.contrast_fmin = 200.0;
        }
        self
    }
}

/// Frame-indexed spectral descriptors for one signal; every array has
/// `frames` columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralFeatures {
    pub frames: usize,
    pub log_mel: Array2<f32>,
    pub mfcc: Array2<f32>,
    pub contrast: Array2<f32>,
    pub chroma: Array2<f32>,
    pub centroid: Array2<f32>,
    pub bandwidth: Array2<f32>,
    /// Share of magnitude above 30 % of Nyquist, over all frames.
    pub high_frequency_ratio: f32,
}

/// Reusable STFT plan and filterbanks for one sample rate and settings.
///
/// Built once per run; `analyze` only touches scratch buffers.
pub struct SpectralEngine {
    settings: SpectralSettings,
    sample_rate: u32,
    plan: SpectrumPlan,
    mel: MelBank,
    contrast: ContrastBands,
    chroma: ChromaMap,
    high_cutoff_bin: usize,
}

impl SpectralEngine {
    pub fn new(sample_rate: u32, settings: SpectralSettings) -> Self {
        let settings = settings.normalized();
        let sample_rate = sample_rate.max(1);
        let fft_len = settings.frame_size;
        let nyquist = sample_rate as f32 * 0.5;
        Self {
            plan: SpectrumPlan::new(fft_len),
            mel: MelBank::new(sample_rate, fft_len, settings.n_mels, 0.0, nyquist),
            contrast: ContrastBands::new(
                sample_rate,
                fft_len,
                settings.contrast_bands,
                settings.contrast_fmin,
                CONTRAST_QUANTILE,
            ),
            chroma: ChromaMap::new(sample_rate, fft_len),
            high_cutoff_bin: stft::freq_to_bin(nyquist * HIGH_FREQUENCY_CUTOFF, sample_rate, fft_len),
            settings,
            sample_rate,
        }
    }

    pub fn settings(&self) -> &SpectralSettings {
        &self.settings
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Frame count this engine produces for `len` samples.
    pub fn frame_count(&self, len: usize) -> usize {
        frame_count(len, self.settings.frame_size, self.settings.hop_size)
    }

    /// Compute every spectral descriptor of `samples`.
    pub fn analyze(&mut self, samples: &[f32]) -> SpectralFeatures {
        let frame_size = self.settings.frame_size;
        let hop = self.settings.hop_size;
        let frames = self.frame_count(samples.len());
        let n_mels = self.mel.bands();
        let mut mel_power = Array2::<f32>::zeros((n_mels, frames));
        let mut contrast = Array2::<f32>::zeros((self.contrast.rows(), frames));
        let mut chroma = Array2::<f32>::zeros((PITCH_CLASSES, frames));
        let mut centroid = Array2::<f32>::zeros((1, frames));
        let mut bandwidth = Array2::<f32>::zeros((1, frames));
        let mut high_band = stft::HighBandShare::default();

        let mut magnitude = Vec::with_capacity(self.plan.bins());
        let mut power = Vec::with_capacity(self.plan.bins());
        let mut column = Vec::with_capacity(n_mels.max(PITCH_CLASSES));
        let mut scratch = Vec::new();
        for idx in 0..frames {
            let frame = frame_at(samples, idx, frame_size, hop);
            self.plan.magnitude_into(frame, &mut magnitude);
            power.clear();
            power.extend(magnitude.iter().map(|m| m * m));

            self.mel.energies_into(&power, &mut column);
            mel_power.column_mut(idx).assign(&ndarray::ArrayView1::from(&column[..]));

            self.contrast.contrast_into(&magnitude, &mut scratch, &mut column);
            contrast.column_mut(idx).assign(&ndarray::ArrayView1::from(&column[..]));

            self.chroma.chroma_into(&magnitude, &mut column);
            chroma.column_mut(idx).assign(&ndarray::ArrayView1::from(&column[..]));

            let (sum, centroid_hz) = stft::centroid(&magnitude, self.sample_rate, frame_size);
            centroid[[0, idx]] = centroid_hz;
            bandwidth[[0, idx]] =
                stft::bandwidth(&magnitude, self.sample_rate, frame_size, sum, centroid_hz);
            high_band.add(&magnitude, self.high_cutoff_bin);
        }

        power_to_db_ref_max(&mut mel_power, self.settings.log_mel_top_db);
        let log_mel = mel_power;
        let n_mfcc = self.settings.n_mfcc;
        let mut mfcc = Array2::<f32>::zeros((n_mfcc, frames));
        for (idx, frame) in log_mel.columns().into_iter().enumerate() {
            column.clear();
            column.extend(frame.iter().copied());
            let coeffs = dct_ii_ortho(&column, n_mfcc);
            mfcc.column_mut(idx).assign(&ndarray::ArrayView1::from(&coeffs[..]));
        }

        SpectralFeatures {
            frames,
            log_mel,
            mfcc,
            contrast,
            chroma,
            centroid,
            bandwidth,
            high_frequency_ratio: high_band.ratio(),
        }
    }
}

/// Mean of a row-vector descriptor, 0 when there are no frames.
pub(crate) fn row_mean(values: &Array2<f32>) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    (values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sr: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sr as f32).sin())
            .collect()
    }

    #[test]
    fn sine_wave_centroid_tracks_frequency() {
        let sr = 16_000;
        let mut engine = SpectralEngine::new(sr, SpectralSettings::default());
        let feats = engine.analyze(&sine(440.0, sr, sr as usize));
        let centroid = row_mean(&feats.centroid);
        assert!(centroid > 350.0 && centroid < 550.0, "centroid {centroid}");
        assert!(feats.high_frequency_ratio < 0.05);
    }

    #[test]
    fn all_outputs_share_frame_count() {
        let sr = 16_000;
        let settings = SpectralSettings::default();
        let mut engine = SpectralEngine::new(sr, settings);
        let feats = engine.analyze(&sine(220.0, sr, 32_000));
        let expected = (32_000 - 2048) / 512 + 1;
        assert_eq!(feats.frames, expected);
        assert_eq!(feats.log_mel.dim(), (64, expected));
        assert_eq!(feats.mfcc.dim(), (13, expected));
        assert_eq!(feats.contrast.dim(), (7, expected));
        assert_eq!(feats.chroma.dim(), (12, expected));
        assert_eq!(feats.centroid.dim(), (1, expected));
        assert_eq!(feats.bandwidth.dim(), (1, expected));
        assert!(feats.log_mel.iter().all(|&v| (-80.0..=0.0).contains(&v)));
    }

    #[test]
    fn short_signal_is_padded_to_one_frame() {
        let mut engine = SpectralEngine::new(16_000, SpectralSettings::default());
        let feats = engine.analyze(&sine(440.0, 16_000, 300));
        assert_eq!(feats.frames, 1);
        assert_eq!(feats.mfcc.dim(), (13, 1));
    }

    #[test]
    fn mfcc_is_deterministic_for_same_input() {
        let sr = 16_000;
        let samples = sine(330.0, sr, 8_000);
        let mut engine = SpectralEngine::new(sr, SpectralSettings::default());
        let a = engine.analyze(&samples);
        let b = engine.analyze(&samples);
        assert_eq!(a, b);
    }
}
