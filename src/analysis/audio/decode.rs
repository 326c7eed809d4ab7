use std::fs::File;
use std::path::{Path, PathBuf};

use hound::SampleFormat;
use symphonia::core::{
    audio::SampleBuffer, codecs::DecoderOptions, errors::Error as SymphoniaError,
    formats::FormatOptions, io::MediaSourceStream, meta::MetadataOptions, probe::Hint,
};
use thiserror::Error;
use tracing::debug;

/// Raw decoded audio in interleaved `f32` samples.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DecodedAudio {
    /// Duration of the decoded audio at its native rate.
    pub fn duration_seconds(&self) -> f32 {
        let frames = self.samples.len() / self.channels.max(1) as usize;
        super::duration_seconds(frames, self.sample_rate)
    }
}

/// Unreadable, corrupt or unsupported input.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unrecognized audio format in {path}: {source}")]
    Probe {
        path: PathBuf,
        source: SymphoniaError,
    },
    #[error("No default audio track in {path}")]
    NoTrack { path: PathBuf },
    #[error("Missing {field} for {path}")]
    MissingParameter { path: PathBuf, field: &'static str },
    #[error("No decoder for {path}: {source}")]
    Codec {
        path: PathBuf,
        source: SymphoniaError,
    },
    #[error("Decoding {path} failed: {source}")]
    Stream {
        path: PathBuf,
        source: SymphoniaError,
    },
    #[error("Decoded 0 samples from {path}")]
    Empty { path: PathBuf },
}

/// Decode a file into interleaved `f32` samples at its native rate.
///
/// WAV files are read with hound first; anything hound rejects, and every
/// other container, goes through symphonia.
pub fn decode_audio(path: &Path) -> Result<DecodedAudio, DecodeError> {
    if has_extension(path, "wav") {
        match decode_wav(path) {
            Ok(decoded) if !decoded.samples.is_empty() => return Ok(decoded),
            Ok(_) => return Err(DecodeError::Empty { path: path.to_path_buf() }),
            Err(err) => debug!(
                path = %path.display(),
                error = %err,
                "hound rejected WAV, retrying with symphonia"
            ),
        }
    }
    decode_with_symphonia(path)
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
}

fn decode_wav(path: &Path) -> Result<DecodedAudio, hound::Error> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let samples = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << spec.bits_per_sample.saturating_sub(1)).max(1) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|value| value as f32 / scale))
                .collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(DecodedAudio {
        samples,
        sample_rate: spec.sample_rate.max(1),
        channels: spec.channels.max(1),
    })
}

fn decode_with_symphonia(path: &Path) -> Result<DecodedAudio, DecodeError> {
    let file = File::open(path).map_err(|source| DecodeError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|source| DecodeError::Probe {
            path: path.to_path_buf(),
            source,
        })?;
    let mut format = probed.format;
    let track = format.default_track().ok_or_else(|| DecodeError::NoTrack {
        path: path.to_path_buf(),
    })?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| DecodeError::MissingParameter {
            path: path.to_path_buf(),
            field: "sample rate",
        })?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|source| DecodeError::Codec {
            path: path.to_path_buf(),
            source,
        })?;

    let mut samples = Vec::new();
    let mut channels = codec_params.channels.map(|c| c.count() as u16);
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(_)) => break,
            Err(source) => {
                return Err(DecodeError::Stream {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        if packet.track_id() != track_id {
            continue;
        }
        let audio_buf = match decoder.decode(&packet) {
            Ok(audio_buf) => audio_buf,
            Err(SymphoniaError::DecodeError(err)) => {
                debug!(path = %path.display(), error = err, "Skipping corrupt packet");
                continue;
            }
            Err(source) => {
                return Err(DecodeError::Stream {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let spec = *audio_buf.spec();
        channels.get_or_insert(spec.channels.count() as u16);
        let mut sample_buf = SampleBuffer::<f32>::new(audio_buf.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(audio_buf);
        samples.extend_from_slice(sample_buf.samples());
    }

    if samples.is_empty() {
        return Err(DecodeError::Empty {
            path: path.to_path_buf(),
        });
    }
    let channels = channels.ok_or_else(|| DecodeError::MissingParameter {
        path: path.to_path_buf(),
        field: "channel count",
    })?;

    Ok(DecodedAudio {
        samples,
        sample_rate: sample_rate.max(1),
        channels: channels.max(1),
    })
}
