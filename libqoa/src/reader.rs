use std::io::Cursor;

use crate::codec::{Decoder, Lms};
use crate::core::{u64_at, FrameHeader, QoaDesc, QoaError, QoaResult, HEADER_SIZE, MIN_FILESIZE};

/// one frame as found in the stream
#[derive(Debug, Clone)]
pub struct FrameInfo {
    pub index: usize,
    /// byte offset of the frame header
    pub offset: usize,
    pub header: FrameHeader,
    /// predictor snapshot per channel
    pub lms: Vec<Lms>,
    /// first sample (per channel) this frame covers
    pub first_sample: usize,
}

/// parsed qoa stream, without synthesized audio
#[derive(Debug, Clone)]
pub struct QoaFile {
    pub desc: QoaDesc,
    pub frames: Vec<FrameInfo>,
    pub file_size: usize,
}

impl QoaFile {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// samples per channel declared by all frame headers together
    pub fn total_frame_samples(&self) -> u64 {
        self.frames.iter().map(|f| f.header.samples as u64).sum()
    }

    /// raw bytes of one frame
    pub fn frame_bytes<'a>(&self, data: &'a [u8], index: usize) -> Option<&'a [u8]> {
        let frame = self.frames.get(index)?;
        data.get(frame.offset..frame.offset + frame.header.size as usize)
    }

    /// size of the same audio as 16-bit pcm over the stream size
    pub fn compression_ratio(&self) -> f64 {
        if self.file_size == 0 {
            return 0.0;
        }
        let pcm_size = self.desc.samples as f64 * self.desc.channels as f64 * 2.0;
        pcm_size / self.file_size as f64
    }

    pub fn bitrate_kbps(&self) -> f64 {
        let duration = self.desc.duration_secs();
        if duration <= 0.0 {
            return 0.0;
        }
        self.file_size as f64 * 8.0 / duration / 1000.0
    }
}

/// walks a qoa stream and checks its structure
pub struct Reader;

impl Reader {
    /// new reader
    pub fn new() -> Self {
        Reader
    }

    /// read and check every header of a qoa stream
    pub fn read(&self, data: &[u8]) -> QoaResult<QoaFile> {
        if data.len() < MIN_FILESIZE {
            return Err(QoaError::Format(format!(
                "{} bytes is too short for a qoa stream",
                data.len()
            )));
        }

        let desc = Decoder::new().decode_header(&mut Cursor::new(data))?;
        let total = desc.samples as usize;

        // a frame is at least one header word
        let mut frames = Vec::with_capacity(desc.frame_count().min(data.len() / 8));
        let mut offset = HEADER_SIZE;
        let mut first_sample = 0usize;

        while first_sample < total {
            let frame = self.read_frame(data, &desc, offset, frames.len(), first_sample)?;
            let samples = frame.header.samples as usize;

            if samples == 0 {
                return Err(QoaError::Format(format!("frame {} is empty", frame.index)));
            }
            if first_sample + samples > total {
                return Err(QoaError::Format(format!(
                    "frame {} runs past the declared {} samples",
                    frame.index, total
                )));
            }

            offset += frame.header.size as usize;
            first_sample += samples;
            frames.push(frame);
        }

        Ok(QoaFile {
            desc,
            frames,
            file_size: data.len(),
        })
    }

    fn read_frame(
        &self,
        data: &[u8],
        desc: &QoaDesc,
        offset: usize,
        index: usize,
        first_sample: usize,
    ) -> QoaResult<FrameInfo> {
        let header = FrameHeader::from_u64(u64_at(data, offset).ok_or_else(truncated)?);
        header.check(desc)?;

        let channels = header.channels as usize;
        let needed = header.size as usize;
        if offset + needed > data.len() {
            return Err(QoaError::Format(format!(
                "frame {} needs {} bytes, {} left",
                index,
                needed,
                data.len() - offset
            )));
        }

        let mut lms = Vec::with_capacity(channels);
        for c in 0..channels {
            let at = offset + 8 + c * 16;
            let history = u64_at(data, at).ok_or_else(truncated)?;
            let weights = u64_at(data, at + 8).ok_or_else(truncated)?;
            lms.push(Lms::unpack(history, weights));
        }

        Ok(FrameInfo {
            index,
            offset,
            header,
            lms,
            first_sample,
        })
    }
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}

fn truncated() -> QoaError {
    QoaError::Format("unexpected end of stream".to_string())
}
