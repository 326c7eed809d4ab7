//! YIN fundamental-frequency tracking.

use crate::analysis::framing::{frame_at, frame_count};

/// Highest tracked pitch (C7).
pub(crate) const PITCH_MAX_HZ: f32 = 2093.0;
/// Lowest tracked pitch (C2).
pub(crate) const PITCH_MIN_HZ: f32 = 65.4;
/// Cumulative-mean-normalized difference threshold for a voiced frame.
const YIN_THRESHOLD: f32 = 0.1;

/// Frame-wise pitch contour; unvoiced frames are 0.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchTrack {
    pub pitch: Vec<f32>,
    /// Share of frames with a nonzero pitch, in `[0, 1]`.
    pub voiced_ratio: f32,
}

/// Estimate pitch per frame on the shared frame grid.
///
/// When the frame is too short to cover the lag range, every frame is
/// reported unvoiced.
pub(crate) fn track_pitch(samples: &[f32], sample_rate: u32, frame_size: usize, hop: usize) -> PitchTrack {
    let frames = frame_count(samples.len(), frame_size, hop);
    let mut pitch = vec![0.0_f32; frames];
    let sr = sample_rate.max(1) as f32;
    let tau_min = (sr / PITCH_MAX_HZ).floor().max(1.0) as usize;
    let tau_max = (sr / PITCH_MIN_HZ).ceil() as usize;
    if frame_size <= tau_max + 1 || frames == 0 {
        return PitchTrack {
            pitch,
            voiced_ratio: 0.0,
        };
    }
    let mut frame_buf = vec![0.0_f32; frame_size];
    let mut diff = vec![0.0_f32; tau_max + 1];
    let mut cmnd = vec![0.0_f32; tau_max + 1];
    for (idx, slot) in pitch.iter_mut().enumerate() {
        let frame = frame_at(samples, idx, frame_size, hop);
        frame_buf.fill(0.0);
        frame_buf[..frame.len()].copy_from_slice(frame);
        difference(&frame_buf, tau_max, &mut diff);
        cumulative_mean_normalize(&diff, &mut cmnd);
        if let Some(period) = pick_period(&cmnd, tau_min, tau_max) {
            let hz = sr / period;
            if (PITCH_MIN_HZ..=PITCH_MAX_HZ).contains(&hz) {
                *slot = hz;
            }
        }
    }
    let voiced = pitch.iter().filter(|&&hz| hz > 0.0).count();
    PitchTrack {
        voiced_ratio: voiced as f32 / frames as f32,
        pitch,
    }
}

fn difference(frame: &[f32], tau_max: usize, out: &mut [f32]) {
    let window = frame.len() - tau_max;
    out[0] = 0.0;
    for tau in 1..=tau_max {
        let mut sum = 0.0_f64;
        for j in 0..window {
            let d = (frame[j] - frame[j + tau]) as f64;
            sum += d * d;
        }
        out[tau] = sum as f32;
    }
}

fn cumulative_mean_normalize(diff: &[f32], out: &mut [f32]) {
    out[0] = 1.0;
    let mut running = 0.0_f64;
    for tau in 1..diff.len() {
        running += diff[tau] as f64;
        out[tau] = if running > 0.0 {
            (diff[tau] as f64 * tau as f64 / running) as f32
        } else {
            1.0
        };
    }
}

/// First dip below the threshold, followed to its local minimum and refined
/// by parabolic interpolation.
fn pick_period(cmnd: &[f32], tau_min: usize, tau_max: usize) -> Option<f32> {
    let mut tau = tau_min;
    while tau <= tau_max {
        if cmnd[tau] < YIN_THRESHOLD {
            while tau < tau_max && cmnd[tau + 1] < cmnd[tau] {
                tau += 1;
            }
            return Some(parabolic_offset(cmnd, tau));
        }
        tau += 1;
    }
    None
}

fn parabolic_offset(values: &[f32], tau: usize) -> f32 {
    if tau == 0 || tau + 1 >= values.len() {
        return tau as f32;
    }
    let (a, b, c) = (values[tau - 1], values[tau], values[tau + 1]);
    let denom = a - 2.0 * b + c;
    if denom.abs() < f32::EPSILON {
        return tau as f32;
    }
    let shift = 0.5 * (a - c) / denom;
    tau as f32 + shift.clamp(-1.0, 1.0)
}
