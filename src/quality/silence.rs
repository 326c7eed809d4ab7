//! Sample-level silence intervals and the pause statistics derived from them.

use serde::{Deserialize, Serialize};

use super::profile::SilenceRules;

/// Added to |x| before the dB conversion.
const LEVEL_EPSILON: f32 = 1e-10;

/// Half-open run of silent samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SilenceInterval {
    pub start: usize,
    pub end: usize,
}

impl SilenceInterval {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Pause statistics over one signal.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SilenceStats {
    pub interval_count: usize,
    pub silence_ratio: f32,
    pub short_interval_count: usize,
    /// Short intervals over `max(interval_count, 1)`.
    pub short_ratio: f32,
    pub multiple_speakers: bool,
    pub background_noise: bool,
}

/// Finds runs of samples below a level floor.
#[derive(Debug, Clone, Copy)]
pub struct SilenceDetector {
    floor_db: f32,
    min_duration_sec: f32,
}

impl Default for SilenceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl SilenceDetector {
    pub fn new() -> Self {
        let rules = SilenceRules::default();
        Self {
            floor_db: rules.floor_db,
            min_duration_sec: rules.min_duration_sec,
        }
    }

    /// Level floor in dBFS; positive values are clamped to 0.
    pub fn with_floor_db(mut self, floor_db: f32) -> Self {
        self.floor_db = floor_db.min(0.0);
        self
    }

    pub fn with_min_duration(mut self, min_duration_sec: f32) -> Self {
        self.min_duration_sec = min_duration_sec.max(0.0);
        self
    }

    /// Silent runs at least the minimum duration long, in sample order.
    pub fn detect(&self, samples: &[f32], sample_rate: u32) -> Vec<SilenceInterval> {
        let min_len = ((self.min_duration_sec * sample_rate as f32) as usize).max(1);
        let mut intervals = Vec::new();
        let mut run_start: Option<usize> = None;
        for (idx, &sample) in samples.iter().enumerate() {
            if self.is_silent(sample) {
                run_start.get_or_insert(idx);
            } else if let Some(start) = run_start.take() {
                push_if_long(&mut intervals, start, idx, min_len);
            }
        }
        if let Some(start) = run_start {
            push_if_long(&mut intervals, start, samples.len(), min_len);
        }
        intervals
    }

    fn is_silent(&self, sample: f32) -> bool {
        let level = if sample.is_finite() { sample.abs() } else { 0.0 };
        20.0 * (level + LEVEL_EPSILON).log10() < self.floor_db
    }
}

fn push_if_long(out: &mut Vec<SilenceInterval>, start: usize, end: usize, min_len: usize) {
    if end - start >= min_len {
        out.push(SilenceInterval { start, end });
    }
}

/// Detect intervals with `rules` and derive the pause indicators.
pub fn silence_stats(samples: &[f32], sample_rate: u32, rules: &SilenceRules) -> SilenceStats {
    let detector = SilenceDetector::new()
        .with_floor_db(rules.floor_db)
        .with_min_duration(rules.min_duration_sec);
    let intervals = detector.detect(samples, sample_rate);
    let silent: usize = intervals.iter().map(SilenceInterval::len).sum();
    let silence_ratio = if samples.is_empty() {
        0.0
    } else {
        silent as f32 / samples.len() as f32
    };
    let short_len = (rules.short_interval_sec * sample_rate as f32) as usize;
    let short_interval_count = intervals.iter().filter(|i| i.len() < short_len).count();
    let short_ratio = short_interval_count as f32 / intervals.len().max(1) as f32;
    SilenceStats {
        interval_count: intervals.len(),
        silence_ratio,
        short_interval_count,
        short_ratio,
        multiple_speakers: short_ratio > rules.multiple_speakers_ratio,
        background_noise: silence_ratio < rules.background_noise_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_gaps(sr: usize, gaps: &[(usize, usize)]) -> Vec<f32> {
        let mut samples = vec![0.5_f32; sr * 4];
        for &(start, len) in gaps {
            samples[start..start + len].fill(0.0);
        }
        samples
    }

    #[test]
    fn detects_runs_above_min_duration_only() {
        let sr = 1_000;
        let samples = with_gaps(sr, &[(100, 50), (1_000, 200), (3_800, 200)]);
        let intervals = SilenceDetector::new().detect(&samples, sr as u32);
        assert_eq!(
            intervals,
            vec![
                SilenceInterval { start: 1_000, end: 1_200 },
                SilenceInterval { start: 3_800, end: 4_000 },
            ]
        );
    }

    #[test]
    fn many_short_pauses_flag_multiple_speakers() {
        let sr = 1_000;
        let gaps: Vec<(usize, usize)> = (0..6).map(|i| (200 + i * 600, 150)).collect();
        let stats = silence_stats(&with_gaps(sr, &gaps), sr as u32, &SilenceRules::default());
        assert_eq!(stats.interval_count, 6);
        assert_eq!(stats.short_interval_count, 6);
        assert!(stats.multiple_speakers);
        assert!((stats.silence_ratio - 0.225).abs() < 1e-6);
        assert!(!stats.background_noise);
    }

    #[test]
    fn continuous_signal_flags_background_noise() {
        let stats = silence_stats(&vec![0.3; 8_000], 16_000, &SilenceRules::default());
        assert_eq!(stats.interval_count, 0);
        assert_eq!(stats.short_ratio, 0.0);
        assert!(!stats.multiple_speakers);
        assert!(stats.background_noise);
    }
}
