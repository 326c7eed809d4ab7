//! Signal preparation and descriptor extraction.

pub mod audio;
pub mod features;
pub(crate) mod fft;
pub(crate) mod framing;
pub mod frequency_domain;
pub mod time_domain;

pub use features::{FEATURE_NAMES, FeatureSet, extract_features};
pub use frequency_domain::{SpectralEngine, SpectralFeatures, SpectralSettings};
pub use time_domain::{PitchTrack, TemporalFeatures};
