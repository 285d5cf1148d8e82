//! reqoa - Audio format converter library
//!
//! Converts between common audio formats and QOA, the "Quite OK Audio"
//! lossy format.
//!

pub mod audio;

use anyhow::{bail, Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Re-export libqoa types
pub use libqoa_audio::{check_fourcc, QoaError};

/// Information about a QOA file
#[derive(Debug, Clone, serde::Serialize)]
pub struct QoaInfo {
    pub sample_rate: u32,
    pub channels: u32,
    /// samples per channel
    pub total_samples: u32,
    pub frames: usize,
    pub duration_secs: f64,
    pub file_size: usize,
    pub compression_ratio: f64,
    pub bitrate_kbps: f64,
}

/// Get information about a QOA file from its headers
pub fn get_qoa_info(data: &[u8]) -> Result<QoaInfo> {
    let file = libqoa_audio::Reader::new()
        .read(data)
        .map_err(|e| anyhow::anyhow!("Failed to read QOA file: {}", e))?;

    Ok(QoaInfo {
        sample_rate: file.desc.samplerate,
        channels: file.desc.channels,
        total_samples: file.desc.samples,
        frames: file.frame_count(),
        duration_secs: file.desc.duration_secs(),
        file_size: file.file_size,
        compression_ratio: file.compression_ratio(),
        bitrate_kbps: file.bitrate_kbps(),
    })
}

/// One-line header summary
pub fn describe(info: &QoaInfo) -> String {
    format!(
        "Channels: {} samplerate: {} total samples: {}",
        info.channels, info.sample_rate, info.total_samples
    )
}

/// Validate a QOA file by decoding every frame
///
/// Fails if the data is not a QOA stream at all.
pub fn validate_qoa(data: &[u8]) -> Result<bool> {
    let file = libqoa_audio::Reader::new()
        .read(data)
        .map_err(|e| anyhow::anyhow!("Failed to read QOA file: {}", e))?;

    match libqoa_audio::Decoder::new().decode_file(data, &file) {
        Ok(audio) => Ok(audio.desc.samples == file.desc.samples),
        Err(e) => {
            debug!("trial decode failed: {}", e);
            Ok(false)
        }
    }
}

/// Options for the file conversions
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    /// Replace an existing output file
    pub force: bool,
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow overwriting the output file
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Which way a conversion goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// audio to QOA
    Encode,
    /// QOA to WAV
    Decode,
}

impl Direction {
    /// QOA input decodes, anything else encodes
    pub fn detect(input: &[u8]) -> Self {
        if check_fourcc(input) {
            Direction::Decode
        } else {
            Direction::Encode
        }
    }
}

/// Encode audio file bytes to QOA
///
/// # Arguments
/// * `audio_bytes` - Raw bytes of an audio file (WAV, FLAC, MP3, OGG, etc.)
///
/// # Returns
/// Raw bytes of the QOA file
pub fn encode_from_audio(audio_bytes: &[u8]) -> Result<Vec<u8>> {
    let (samples, sample_rate, channels) =
        audio::read_audio_from_bytes(audio_bytes).context("Failed to read audio file")?;

    encode_from_samples(&samples, sample_rate, channels)
}

/// Encode raw audio samples to QOA
///
/// # Arguments
/// * `samples` - Interleaved 16-bit samples
/// * `sample_rate` - Sample rate in Hz
/// * `channels` - Number of channels
pub fn encode_from_samples(samples: &[i16], sample_rate: u32, channels: usize) -> Result<Vec<u8>> {
    let channels = u32::try_from(channels).context("Too many channels")?;
    libqoa_audio::Encoder::new(sample_rate, channels)
        .encode(samples)
        .map_err(|e| anyhow::anyhow!("Encoding failed: {}", e))
}

/// Decode QOA file to raw samples
///
/// # Returns
/// Tuple of (samples, sample_rate, channels) where samples are interleaved
pub fn decode_to_samples(qoa_bytes: &[u8]) -> Result<(Vec<i16>, u32, usize)> {
    let audio = libqoa_audio::Decoder::new()
        .decode(qoa_bytes)
        .map_err(|e| anyhow::anyhow!("Invalid QOA file: {}", e))?;

    Ok((
        audio.samples,
        audio.desc.samplerate,
        audio.desc.channels as usize,
    ))
}

/// Decode QOA file to WAV format
pub fn decode_to_wav(qoa_bytes: &[u8]) -> Result<Vec<u8>> {
    let (samples, sample_rate, channels) = decode_to_samples(qoa_bytes)?;

    audio::write_wav_to_bytes(&samples, sample_rate, channels).context("Failed to write WAV data")
}

/// Make sure a conversion may go ahead
///
/// The input has to exist, and the output must not unless `force` is set.
pub fn check_paths(input: &Path, output: &Path, options: &EncodeOptions) -> Result<()> {
    if !input.is_file() {
        bail!("Input file {} does not exist", input.display());
    }
    if output.exists() && !options.force {
        bail!(
            "Output file {} already exists, use --force to overwrite",
            output.display()
        );
    }
    Ok(())
}

/// Encode an audio file to a QOA file
pub fn encode_file(input: &Path, output: &Path, options: &EncodeOptions) -> Result<usize> {
    check_paths(input, output, options)?;

    let (samples, sample_rate, channels) =
        audio::read_audio_file(input).context("Failed to read audio file")?;
    let qoa_data = encode_from_samples(&samples, sample_rate, channels)?;

    fs::write(output, &qoa_data).context("Failed to write output file")?;
    Ok(qoa_data.len())
}

/// Decode a QOA file to a WAV file
pub fn decode_file(input: &Path, output: &Path, options: &EncodeOptions) -> Result<usize> {
    check_paths(input, output, options)?;

    let qoa_data = fs::read(input).context("Failed to read QOA file")?;
    let wav = decode_to_wav(&qoa_data)?;

    fs::write(output, &wav).context("Failed to write WAV file")?;
    Ok(wav.len())
}

/// Convert in whichever direction the input calls for
pub fn convert_file(input: &Path, output: &Path, options: &EncodeOptions) -> Result<Direction> {
    check_paths(input, output, options)?;

    let data = fs::read(input).context("Failed to read input file")?;
    if data.len() < 4 {
        bail!("Could not read 4 bytes from {}", input.display());
    }

    let direction = Direction::detect(&data);
    debug!("{} converts as {:?}", input.display(), direction);

    let converted = match direction {
        Direction::Decode => decode_to_wav(&data)?,
        Direction::Encode => encode_from_audio(&data)?,
    };

    fs::write(output, converted).context("Failed to write output file")?;
    Ok(direction)
}
