use std::io::{Cursor, Read, Seek};

use log::debug;

use crate::core::{
    peek_u64, read_u64, DecodedAudio, FrameHeader, QoaDesc, QoaError, QoaResult, MAGIC,
    MAX_CHANNELS, MIN_FILESIZE, SLICE_LEN,
};
use crate::reader::QoaFile;

use super::frame::decode_frame;

/// qoa stream decoder
pub struct Decoder;

impl Decoder {
    pub fn new() -> Self {
        Decoder
    }

    /// decode an in-memory stream
    pub fn decode(&self, data: &[u8]) -> QoaResult<DecodedAudio> {
        if data.len() < MIN_FILESIZE {
            return Err(QoaError::Format(format!(
                "{} bytes is too short for a qoa stream",
                data.len()
            )));
        }

        let mut cursor = Cursor::new(data);
        let desc = self.decode_header(&mut cursor)?;

        // every slice word carries at most 20 samples of one channel
        let words = (data.len() - 8) / 8;
        let declared = desc.samples as u64 * desc.channels as u64;
        if declared > (words * SLICE_LEN) as u64 {
            return Err(QoaError::Format(format!(
                "stream declares {} samples x {} channels but {} bytes hold at most {}",
                desc.samples,
                desc.channels,
                data.len(),
                words * SLICE_LEN
            )));
        }

        cursor.set_position(0);
        self.decode_from(&mut cursor)
    }

    /// read the stream header and peek the first frame header
    ///
    /// Channel count and samplerate only live in frame headers, so the first
    /// one is read and the stream rewound to it.
    pub fn decode_header<R>(&self, reader: &mut R) -> QoaResult<QoaDesc>
    where
        R: Read + Seek + ?Sized,
    {
        let file_header = read_u64(reader)?;
        if (file_header >> 32) as u32 != MAGIC {
            return Err(QoaError::Format("bad magic".to_string()));
        }

        let samples = (file_header & 0xffff_ffff) as u32;
        if samples == 0 {
            return Err(QoaError::Format("stream declares zero samples".to_string()));
        }

        let frame = FrameHeader::from_u64(peek_u64(reader)?);
        if frame.channels == 0 || frame.samplerate == 0 {
            return Err(QoaError::Format(format!(
                "first frame declares {} channels at {} Hz",
                frame.channels, frame.samplerate
            )));
        }
        if frame.channels as usize > MAX_CHANNELS {
            return Err(QoaError::Format(format!(
                "{} channels exceeds the maximum of {}",
                frame.channels, MAX_CHANNELS
            )));
        }

        Ok(QoaDesc::new(frame.channels, frame.samplerate, samples))
    }

    /// decode a stream from a seekable reader
    pub fn decode_from<R>(&self, reader: &mut R) -> QoaResult<DecodedAudio>
    where
        R: Read + Seek + ?Sized,
    {
        let mut desc = self.decode_header(reader)?;
        let channels = desc.channels as usize;
        let total = desc.samples as usize;

        debug!(
            "decoding {} samples x {} channels at {} Hz",
            total, channels, desc.samplerate
        );

        let mut samples = alloc_samples(total, channels)?;
        let mut sample_index = 0usize;
        let mut frames = 0usize;

        while sample_index < total {
            let out = &mut samples[sample_index * channels..];
            let frame_len = decode_frame(reader, &mut desc, out)?;
            if frame_len == 0 {
                return Err(QoaError::Format(format!(
                    "empty frame after {} of {} samples",
                    sample_index, total
                )));
            }
            sample_index += frame_len;
            frames += 1;
        }

        debug!("decoded {} frames", frames);

        desc.samples = sample_index as u32;
        Ok(DecodedAudio { desc, samples })
    }

    /// decode a stream already walked by [`crate::Reader`]
    ///
    /// Every frame starts from its own predictor snapshot, so frames are
    /// decoded independently of each other.
    pub fn decode_file(&self, data: &[u8], file: &QoaFile) -> QoaResult<DecodedAudio> {
        let channels = file.desc.channels as usize;
        let mut samples = alloc_samples(file.desc.samples as usize, channels)?;
        let mut decoded = 0usize;

        // each frame reloads every channel's predictor from its snapshot
        let mut desc = file.desc;
        for frame in &file.frames {
            let mut cursor = Cursor::new(data.get(frame.offset..).unwrap_or_default());
            let out = samples
                .get_mut(frame.first_sample * channels..)
                .unwrap_or_default();
            decoded += decode_frame(&mut cursor, &mut desc, out)?;
        }

        desc.samples = decoded as u32;
        Ok(DecodedAudio { desc, samples })
    }
}

fn alloc_samples(total: usize, channels: usize) -> QoaResult<Vec<i16>> {
    let len = total.checked_mul(channels).ok_or_else(|| {
        QoaError::Format(format!("{} samples x {} channels overflows", total, channels))
    })?;
    let mut samples = Vec::new();
    samples.try_reserve_exact(len).map_err(|e| {
        QoaError::Format(format!("cannot hold {} decoded samples: {}", len, e))
    })?;
    samples.resize(len, 0);
    Ok(samples)
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
