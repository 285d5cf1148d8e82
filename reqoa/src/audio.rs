use anyhow::{bail, Context, Result};
use log::debug;
use std::io::{Cursor, Write};
use std::path::Path;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::conv::IntoSample;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

/// size of the canonical RIFF/WAVE header we write
pub const WAV_HEADER_SIZE: usize = 44;

/// Read an audio file and return (samples, sample_rate, channels)
/// Samples are interleaved 16-bit
pub fn read_audio_file(path: &Path) -> Result<(Vec<i16>, u32, usize)> {
    let file = std::fs::File::open(path).context("Failed to open audio file")?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    read_from_source(mss, path.extension().and_then(|e| e.to_str()))
}

/// Read audio from bytes
pub fn read_audio_from_bytes(bytes: &[u8]) -> Result<(Vec<i16>, u32, usize)> {
    let cursor = Cursor::new(bytes.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());
    read_from_source(mss, None)
}

fn read_from_source(
    mss: MediaSourceStream,
    extension: Option<&str>,
) -> Result<(Vec<i16>, u32, usize)> {
    // Create hint from file extension
    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .context("Unsupported audio format")?;

    let mut format = probed.format;

    // Find the first audio track
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio track found")?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .context("Unknown sample rate")?;
    let channels = track
        .codec_params
        .channels
        .context("Unknown channel count")?
        .count();

    debug!(
        "source track {}: {} Hz, {} channels, codec {:?}",
        track_id, sample_rate, channels, track.codec_params.codec
    );

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create decoder")?;

    let mut samples = Vec::new();

    // Decode all packets
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(e) => return Err(e).context("Error reading packet"),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(symphonia::core::errors::Error::DecodeError(e)) => {
                debug!("skipping undecodable packet: {}", e);
                continue;
            }
            Err(e) => return Err(e).context("Error decoding packet"),
        };

        append_samples(&decoded, &mut samples, channels);
    }

    if samples.is_empty() {
        bail!("Audio file contains no samples");
    }

    Ok((samples, sample_rate, channels))
}

fn append_samples(buffer: &AudioBufferRef, samples: &mut Vec<i16>, channels: usize) {
    match buffer {
        AudioBufferRef::U8(buf) => interleave(&**buf, samples, channels),
        AudioBufferRef::U16(buf) => interleave(&**buf, samples, channels),
        AudioBufferRef::U24(buf) => interleave(&**buf, samples, channels),
        AudioBufferRef::U32(buf) => interleave(&**buf, samples, channels),
        AudioBufferRef::S8(buf) => interleave(&**buf, samples, channels),
        AudioBufferRef::S16(buf) => interleave(&**buf, samples, channels),
        AudioBufferRef::S24(buf) => interleave(&**buf, samples, channels),
        AudioBufferRef::S32(buf) => interleave(&**buf, samples, channels),
        AudioBufferRef::F32(buf) => interleave(&**buf, samples, channels),
        AudioBufferRef::F64(buf) => interleave(&**buf, samples, channels),
    }
}

/// planar buffer to interleaved 16-bit
fn interleave<S>(buf: &AudioBuffer<S>, samples: &mut Vec<i16>, channels: usize)
where
    S: Sample + IntoSample<i16>,
{
    samples.reserve(buf.frames() * channels);
    for frame in 0..buf.frames() {
        for ch in 0..channels {
            samples.push(buf.chan(ch)[frame].into_sample());
        }
    }
}

/// Write samples to a 16-bit WAV file
pub fn write_wav(path: &Path, samples: &[i16], sample_rate: u32, channels: usize) -> Result<()> {
    let bytes = write_wav_to_bytes(samples, sample_rate, channels)?;
    std::fs::write(path, bytes).context("Failed to write WAV file")
}

/// Write samples to 16-bit PCM WAV format in memory
pub fn write_wav_to_bytes(samples: &[i16], sample_rate: u32, channels: usize) -> Result<Vec<u8>> {
    if channels == 0 {
        bail!("Cannot write WAV with zero channels");
    }

    let bytes_per_sample = 2;
    let data_size = samples.len() * bytes_per_sample;
    let file_size = WAV_HEADER_SIZE - 8 + data_size;
    if file_size > u32::MAX as usize {
        bail!("Too much audio for a WAV file: {} bytes", data_size);
    }

    let mut buffer = Vec::with_capacity(WAV_HEADER_SIZE + data_size);

    // RIFF header
    buffer.write_all(b"RIFF")?;
    buffer.write_all(&(file_size as u32).to_le_bytes())?;
    buffer.write_all(b"WAVE")?;

    // fmt chunk
    buffer.write_all(b"fmt ")?;
    buffer.write_all(&16u32.to_le_bytes())?; // chunk size
    buffer.write_all(&1u16.to_le_bytes())?; // format = PCM
    buffer.write_all(&(channels as u16).to_le_bytes())?;
    buffer.write_all(&sample_rate.to_le_bytes())?;
    let byte_rate = sample_rate * channels as u32 * bytes_per_sample as u32;
    buffer.write_all(&byte_rate.to_le_bytes())?;
    let block_align = channels as u16 * bytes_per_sample as u16;
    buffer.write_all(&block_align.to_le_bytes())?;
    buffer.write_all(&16u16.to_le_bytes())?; // bits per sample

    // data chunk
    buffer.write_all(b"data")?;
    buffer.write_all(&(data_size as u32).to_le_bytes())?;

    for &sample in samples {
        buffer.write_all(&sample.to_le_bytes())?;
    }

    Ok(buffer)
}
