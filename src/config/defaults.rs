use crate::capabilities::DEFAULT_EXTENSIONS;
use crate::logging::DEFAULT_LOG_LEVEL;

pub(super) const MIN_SAMPLE_RATE: u32 = 4_000;
pub(super) const MAX_SAMPLE_RATE: u32 = 192_000;

pub(super) fn clamp_sample_rate(rate: u32) -> u32 {
    rate.clamp(MIN_SAMPLE_RATE, MAX_SAMPLE_RATE)
}

pub(super) fn default_false() -> bool {
    false
}

pub(super) fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}

pub(super) fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
