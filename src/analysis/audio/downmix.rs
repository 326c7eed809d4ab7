/// Average interleaved channels into a mono signal, sanitizing each sample.
pub fn downmix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    let mut out = Vec::new();
    downmix_to_mono_into(&mut out, samples, channels);
    out
}

pub(crate) fn downmix_to_mono_into(out: &mut Vec<f32>, samples: &[f32], channels: u16) {
    let channels = channels.max(1) as usize;
    out.clear();
    if channels == 1 {
        out.extend(samples.iter().copied().map(sanitize_sample));
        return;
    }
    let frames = samples.len() / channels;
    out.reserve(frames);
    for frame in samples.chunks_exact(channels) {
        let sum: f32 = frame.iter().copied().map(sanitize_sample).sum();
        out.push(sum / channels as f32);
    }
}

pub(super) fn sanitize_sample(sample: f32) -> f32 {
    if !sample.is_finite() {
        return 0.0;
    }
    let clamped = sample.clamp(-1.0, 1.0);
    if clamped != 0.0 && clamped.abs() < f32::MIN_POSITIVE {
        0.0
    } else {
        clamped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_frames_are_averaged() {
        let mono = downmix_to_mono(&[1.0, 0.0, -0.5, -0.5, 0.25, 0.75], 2);
        assert_eq!(mono, vec![0.5, -0.5, 0.5]);
    }

    #[test]
    fn trailing_partial_frame_is_dropped() {
        let mono = downmix_to_mono(&[0.2, 0.4, 0.6], 2);
        assert_eq!(mono.len(), 1);
    }

    #[test]
    fn non_finite_samples_become_zero() {
        let mono = downmix_to_mono(&[f32::NAN, f32::INFINITY, 0.5], 1);
        assert_eq!(mono, vec![0.0, 0.0, 0.5]);
    }
}
