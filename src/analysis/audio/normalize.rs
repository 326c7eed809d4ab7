use super::downmix::sanitize_sample;

/// Amplitude floor used when converting to decibels.
pub(crate) const AMPLITUDE_FLOOR: f32 = 1e-10;

/// Scale samples so the absolute peak is 1.0.
///
/// Silent or non-finite input is left untouched (after sanitizing), so an
/// all-zero clip stays all-zero instead of turning into NaNs.
pub fn normalize_peak_in_place(samples: &mut [f32]) {
    sanitize_samples_in_place(samples);
    let peak = peak(samples);
    if !peak.is_finite() || peak <= 0.0 {
        return;
    }
    let gain = 1.0_f32 / peak;
    for sample in samples.iter_mut() {
        *sample = (*sample * gain).clamp(-1.0, 1.0);
    }
}

pub(crate) fn sanitize_samples_in_place(samples: &mut [f32]) {
    for sample in samples.iter_mut() {
        *sample = sanitize_sample(*sample);
    }
}

/// Largest absolute sample value.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0_f32, |m, &s| m.max(sanitize_sample(s).abs()))
}

/// Root mean square over the whole slice.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum = samples.iter().fold(0.0_f64, |acc, &s| {
        let s = sanitize_sample(s) as f64;
        acc + s * s
    });
    let mean = sum / samples.len() as f64;
    mean.max(0.0).sqrt() as f32
}

/// `20·log10(max(amplitude, 1e-10))`.
pub fn amplitude_to_db(amplitude: f32) -> f32 {
    20.0 * amplitude.max(AMPLITUDE_FLOOR).log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_peak_scales_to_unit_peak() {
        let mut samples = vec![0.25_f32, -0.5, 0.125];
        normalize_peak_in_place(&mut samples);
        assert!((peak(&samples) - 1.0).abs() < 1e-6);
        assert!((samples[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn all_zero_signal_is_left_alone() {
        let mut samples = vec![0.0_f32; 64];
        normalize_peak_in_place(&mut samples);
        assert!(samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn nan_samples_are_sanitized_before_scaling() {
        let mut samples = vec![f32::NAN, 0.5, -0.25];
        normalize_peak_in_place(&mut samples);
        assert_eq!(samples, vec![0.0, 1.0, -0.5]);
    }

    #[test]
    fn amplitude_to_db_is_floored() {
        assert!((amplitude_to_db(1.0)).abs() < 1e-6);
        assert!((amplitude_to_db(0.1) + 20.0).abs() < 1e-4);
        assert!((amplitude_to_db(0.0) + 200.0).abs() < 1e-3);
    }

    #[test]
    fn rms_of_constant_signal_is_its_level() {
        assert!((rms(&[0.5; 100]) - 0.5).abs() < 1e-6);
        assert_eq!(rms(&[]), 0.0);
    }
}
