use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{Fft, FftPlanner, num_complex::Complex32};

/// Periodic Hann window of `length` samples.
pub(crate) fn hann_window(length: usize) -> Vec<f32> {
    if length <= 1 {
        return vec![1.0_f32; length.max(1)];
    }
    let denom = length as f32;
    (0..length)
        .map(|n| 0.5_f32 * (1.0 - (2.0 * PI * n as f32 / denom).cos()))
        .collect()
}

/// Forward FFT plan plus Hann window and scratch buffers for one frame size.
///
/// Built once per run and reused for every frame of every clip.
pub(crate) struct SpectrumPlan {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex32>,
    scratch: Vec<Complex32>,
}

impl SpectrumPlan {
    pub(crate) fn new(frame_size: usize) -> Self {
        let frame_size = frame_size.max(2);
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(frame_size);
        let scratch = vec![Complex32::default(); fft.get_inplace_scratch_len()];
        Self {
            fft,
            window: hann_window(frame_size),
            buffer: vec![Complex32::default(); frame_size],
            scratch,
        }
    }

    pub(crate) fn frame_size(&self) -> usize {
        self.window.len()
    }

    /// Number of non-negative frequency bins.
    pub(crate) fn bins(&self) -> usize {
        self.frame_size() / 2 + 1
    }

    /// Window `frame` (zero-padded to the frame size) and write |X| into `out`.
    pub(crate) fn magnitude_into(&mut self, frame: &[f32], out: &mut Vec<f32>) {
        for (i, cell) in self.buffer.iter_mut().enumerate() {
            let sample = frame.get(i).copied().unwrap_or(0.0);
            let sample = if sample.is_finite() { sample } else { 0.0 };
            *cell = Complex32::new(sample * self.window[i], 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);
        out.clear();
        out.extend(self.buffer[..self.bins()].iter().map(|c| c.norm()));
    }
}
