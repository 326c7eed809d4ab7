/// Centre frequency of FFT bin `bin`.
pub(super) fn bin_frequency(bin: usize, sample_rate: u32, fft_len: usize) -> f64 {
    bin as f64 * sample_rate.max(1) as f64 / fft_len.max(1) as f64
}

pub(crate) fn freq_to_bin(freq_hz: f32, sample_rate: u32, fft_len: usize) -> usize {
    let nyquist = sample_rate.max(1) as f32 * 0.5;
    let freq = freq_hz.clamp(0.0, nyquist);
    (((freq * fft_len as f32) / sample_rate.max(1) as f32).floor() as usize).min(fft_len / 2)
}

/// Magnitude-weighted mean frequency of one frame, 0 for a silent frame.
pub(super) fn centroid(magnitude: &[f32], sample_rate: u32, fft_len: usize) -> (f64, f32) {
    let mut sum = 0.0_f64;
    let mut sum_freq = 0.0_f64;
    for (bin, &m) in magnitude.iter().enumerate() {
        let m = m.max(0.0) as f64;
        sum += m;
        sum_freq += m * bin_frequency(bin, sample_rate, fft_len);
    }
    if sum <= 0.0 {
        return (0.0, 0.0);
    }
    (sum, (sum_freq / sum) as f32)
}

/// Magnitude-weighted standard deviation of frequency around `centroid_hz`.
pub(super) fn bandwidth(
    magnitude: &[f32],
    sample_rate: u32,
    fft_len: usize,
    sum_magnitude: f64,
    centroid_hz: f32,
) -> f32 {
    if sum_magnitude <= 0.0 {
        return 0.0;
    }
    let centroid = centroid_hz.max(0.0) as f64;
    let mut num = 0.0_f64;
    for (bin, &m) in magnitude.iter().enumerate() {
        let diff = bin_frequency(bin, sample_rate, fft_len) - centroid;
        num += diff * diff * m.max(0.0) as f64;
    }
    (num / sum_magnitude).sqrt() as f32
}

/// Running share of magnitude above a cutoff frequency, summed over frames.
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct HighBandShare {
    high: f64,
    total: f64,
}

impl HighBandShare {
    pub(super) fn add(&mut self, magnitude: &[f32], cutoff_bin: usize) {
        for (bin, &m) in magnitude.iter().enumerate() {
            let m = m.max(0.0) as f64;
            self.total += m;
            if bin > cutoff_bin {
                self.high += m;
            }
        }
    }

    pub(super) fn ratio(&self) -> f32 {
        if self.total <= 0.0 {
            0.0
        } else {
            (self.high / self.total) as f32
        }
    }
}
