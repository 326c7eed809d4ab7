/// Number of analysis frames: `⌊(N − frame)/hop⌋ + 1`, and one frame for a
/// non-empty signal shorter than a frame.
pub(crate) fn frame_count(len: usize, frame_size: usize, hop: usize) -> usize {
    let frame_size = frame_size.max(1);
    let hop = hop.max(1);
    if len == 0 {
        return 0;
    }
    if len <= frame_size {
        return 1;
    }
    (len - frame_size) / hop + 1
}

/// Samples of frame `index`; shorter than `frame_size` only for short signals.
pub(crate) fn frame_at(samples: &[f32], index: usize, frame_size: usize, hop: usize) -> &[f32] {
    let start = (index * hop.max(1)).min(samples.len());
    let end = (start + frame_size.max(1)).min(samples.len());
    &samples[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_count_matches_full_frame_formula() {
        assert_eq!(frame_count(32_000, 2048, 512), (32_000 - 2048) / 512 + 1);
        assert_eq!(frame_count(2048, 2048, 512), 1);
        assert_eq!(frame_count(100, 2048, 512), 1);
        assert_eq!(frame_count(0, 2048, 512), 0);
    }

    #[test]
    fn last_frame_is_full_length() {
        let samples = vec![0.0_f32; 5_000];
        let count = frame_count(samples.len(), 1024, 256);
        assert_eq!(frame_at(&samples, count - 1, 1024, 256).len(), 1024);
    }
}
