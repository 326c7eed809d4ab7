use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use thiserror::Error;

use crate::capabilities::ResamplerKind;

const SINC_LEN: usize = 256;

/// Failures from the band-limited resampler.
#[derive(Debug, Error)]
pub enum ResampleError {
    #[error("Failed to build resampler: {0}")]
    Construction(#[from] rubato::ResamplerConstructionError),
    #[error("Resampling failed: {0}")]
    Process(#[from] rubato::ResampleError),
}

/// Number of output samples for `input_len` samples converted between rates.
pub fn expected_output_len(input_len: usize, input_rate: u32, output_rate: u32) -> usize {
    if input_len == 0 {
        return 0;
    }
    let duration_seconds = input_len as f64 / input_rate.max(1) as f64;
    (duration_seconds * output_rate.max(1) as f64).round().max(1.0) as usize
}

/// Convert mono samples between rates; a no-op copy when the rates match.
pub fn resample(
    samples: &[f32],
    input_rate: u32,
    output_rate: u32,
    kind: ResamplerKind,
) -> Result<Vec<f32>, ResampleError> {
    let input_rate = input_rate.max(1);
    let output_rate = output_rate.max(1);
    if samples.is_empty() || input_rate == output_rate {
        return Ok(samples.to_vec());
    }
    match kind {
        ResamplerKind::Sinc => resample_sinc(samples, input_rate, output_rate),
        ResamplerKind::Linear => {
            let mut out = Vec::new();
            resample_linear_into(&mut out, samples, input_rate, output_rate);
            Ok(out)
        }
    }
}

fn resample_sinc(
    samples: &[f32],
    input_rate: u32,
    output_rate: u32,
) -> Result<Vec<f32>, ResampleError> {
    let expected = expected_output_len(samples.len(), input_rate, output_rate);
    let params = SincInterpolationParameters {
        sinc_len: SINC_LEN,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let ratio = output_rate as f64 / input_rate as f64;
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, samples.len(), 1)?;
    let delay = resampler.output_delay();
    let wanted = expected + delay;

    let mut out = Vec::with_capacity(wanted);
    let input = [samples];
    let first = resampler.process(&input[..], None)?;
    out.extend_from_slice(&first[0]);
    // Flush the filter tail so the delay-compensated output covers the whole clip.
    for _ in 0..2 {
        if out.len() >= wanted {
            break;
        }
        let tail = resampler.process_partial(None::<&[&[f32]]>, None)?;
        out.extend_from_slice(&tail[0]);
    }

    let mut out: Vec<f32> = out.into_iter().skip(delay).take(expected).collect();
    out.resize(expected, 0.0);
    Ok(out)
}

pub(crate) fn resample_linear_into(
    out: &mut Vec<f32>,
    samples: &[f32],
    input_rate: u32,
    output_rate: u32,
) {
    let out_len = expected_output_len(samples.len(), input_rate, output_rate);
    out.clear();
    out.reserve(out_len);
    for i in 0..out_len {
        let t = i as f64 / output_rate as f64;
        let pos = t * input_rate as f64;
        out.push(lerp_sample(samples, pos));
    }
}

fn lerp_sample(samples: &[f32], pos: f64) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let idx0 = pos.floor().max(0.0) as usize;
    let frac = (pos - idx0 as f64).clamp(0.0, 1.0) as f32;
    let idx1 = idx0.saturating_add(1).min(samples.len().saturating_sub(1));
    let a = samples.get(idx0).copied().unwrap_or(0.0);
    let b = samples.get(idx1).copied().unwrap_or(a);
    a + (b - a) * frac
}
