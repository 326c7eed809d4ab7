use super::stft::bin_frequency;

const CONTRAST_FLOOR: f64 = 1e-10;

/// Octave sub-band layout for spectral contrast.
///
/// Band `k` spans `[fmin·2^(k-1), fmin·2^k)` (band 0 is everything below
/// `fmin`), and the last band runs to Nyquist. Each band keeps the row slot
/// even when it has no bins, so the row count is always `n_bands + 1`.
pub(super) struct ContrastBands {
    bands: Vec<Option<(usize, usize)>>,
    quantile: f32,
}

impl ContrastBands {
    pub(super) fn new(
        sample_rate: u32,
        fft_len: usize,
        n_bands: usize,
        fmin: f32,
        quantile: f32,
    ) -> Self {
        let bins = fft_len / 2 + 1;
        let nyquist = sample_rate.max(1) as f64 * 0.5;
        let freqs: Vec<f64> = (0..bins)
            .map(|bin| bin_frequency(bin, sample_rate, fft_len))
            .collect();
        let mut edges = Vec::with_capacity(n_bands + 2);
        edges.push(0.0_f64);
        for k in 0..=n_bands {
            edges.push(fmin.max(1.0) as f64 * 2.0_f64.powi(k as i32));
        }
        let mut bands = Vec::with_capacity(n_bands + 1);
        for k in 0..=n_bands {
            let low = edges[k];
            let high = edges[k + 1];
            if low > nyquist {
                bands.push(None);
                continue;
            }
            let last_band = k == n_bands;
            let mut members = freqs
                .iter()
                .enumerate()
                .filter(|(_, f)| **f >= low && (last_band || **f <= high))
                .map(|(bin, _)| bin);
            let Some(first) = members.next() else {
                bands.push(None);
                continue;
            };
            let mut end = members.last().unwrap_or(first) + 1;
            let start = if k > 0 { first.saturating_sub(1) } else { first };
            if !last_band && end - start > 1 {
                end -= 1;
            }
            bands.push(Some((start, end)));
        }
        Self {
            bands,
            quantile: quantile.clamp(0.0, 0.5),
        }
    }

    pub(super) fn rows(&self) -> usize {
        self.bands.len()
    }

    /// Peak-minus-valley contrast in dB for each band of one frame.
    pub(super) fn contrast_into(&self, magnitude: &[f32], scratch: &mut Vec<f32>, out: &mut Vec<f32>) {
        out.clear();
        for band in &self.bands {
            let Some((start, end)) = *band else {
                out.push(0.0);
                continue;
            };
            let end = end.min(magnitude.len());
            if start >= end {
                out.push(0.0);
                continue;
            }
            scratch.clear();
            scratch.extend_from_slice(&magnitude[start..end]);
            scratch.sort_by(|a, b| a.total_cmp(b));
            let count = scratch.len();
            let take = ((self.quantile * count as f32).round() as usize).clamp(1, count);
            let valley = mean(&scratch[..take]);
            let peak = mean(&scratch[count - take..]);
            let contrast = 10.0 * peak.max(CONTRAST_FLOOR).log10()
                - 10.0 * valley.max(CONTRAST_FLOOR).log10();
            out.push(contrast as f32);
        }
    }
}

fn mean(values: &[f32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| v.max(0.0) as f64).sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_count_is_bands_plus_residual() {
        let bands = ContrastBands::new(16_000, 2048, 6, 200.0, 0.02);
        assert_eq!(bands.rows(), 7);
        let mut out = Vec::new();
        bands.contrast_into(&vec![1.0; 1025], &mut Vec::new(), &mut out);
        assert_eq!(out.len(), 7);
        assert!(out.iter().all(|c| c.abs() < 1e-6));
    }

    #[test]
    fn bands_above_nyquist_stay_zero() {
        let bands = ContrastBands::new(8_000, 512, 6, 200.0, 0.02);
        assert_eq!(bands.rows(), 7);
        let mags: Vec<f32> = (0..257).map(|i| (i % 7) as f32 + 0.1).collect();
        let mut out = Vec::new();
        bands.contrast_into(&mags, &mut Vec::new(), &mut out);
        assert_eq!(out[6], 0.0);
        assert!(out[0] > 0.0);
    }

    #[test]
    fn peaky_band_has_higher_contrast_than_flat_band() {
        let bands = ContrastBands::new(16_000, 2048, 6, 200.0, 0.02);
        let mut peaky = vec![0.01_f32; 1025];
        peaky[300] = 10.0;
        let mut out_peaky = Vec::new();
        let mut out_flat = Vec::new();
        let mut scratch = Vec::new();
        bands.contrast_into(&peaky, &mut scratch, &mut out_peaky);
        bands.contrast_into(&vec![0.01; 1025], &mut scratch, &mut out_flat);
        assert!(out_peaky.iter().sum::<f32>() > out_flat.iter().sum::<f32>());
    }
}
