use super::stft::bin_frequency;

/// Number of pitch classes, C = 0.
pub const PITCH_CLASSES: usize = 12;

/// Lowest frequency folded onto a pitch class (C1).
const CHROMA_MIN_HZ: f64 = 32.7;

/// Maps FFT bins onto the 12 pitch classes by nearest semitone.
pub(super) struct ChromaMap {
    classes: Vec<Option<usize>>,
}

impl ChromaMap {
    pub(super) fn new(sample_rate: u32, fft_len: usize) -> Self {
        let classes = (0..fft_len / 2 + 1)
            .map(|bin| pitch_class(bin_frequency(bin, sample_rate, fft_len)))
            .collect();
        Self { classes }
    }

    /// Max-normalized pitch-class profile of one magnitude frame.
    pub(super) fn chroma_into(&self, magnitude: &[f32], out: &mut Vec<f32>) {
        let mut acc = [0.0_f64; PITCH_CLASSES];
        for (class, &m) in self.classes.iter().zip(magnitude) {
            if let Some(class) = class {
                acc[*class] += m.max(0.0) as f64;
            }
        }
        let max = acc.iter().copied().fold(0.0_f64, f64::max);
        out.clear();
        if max <= 0.0 {
            out.resize(PITCH_CLASSES, 0.0);
            return;
        }
        out.extend(acc.iter().map(|v| (v / max) as f32));
    }
}

fn pitch_class(freq_hz: f64) -> Option<usize> {
    if freq_hz < CHROMA_MIN_HZ {
        return None;
    }
    let midi = (12.0 * (freq_hz / 440.0).log2() + 69.0).round() as i64;
    Some(midi.rem_euclid(PITCH_CLASSES as i64) as usize)
}
