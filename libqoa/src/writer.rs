use crate::core::{u64_at, FrameHeader, QoaError, QoaResult, MAGIC};

/// assembles a qoa stream from encoded frames
pub struct Writer {
    buffer: Vec<u8>,
}

impl Writer {
    /// new writer
    pub fn new() -> Self {
        Writer { buffer: Vec::new() }
    }

    /// stream header followed by `frames`
    ///
    /// The frame headers must account for exactly `samples` samples per
    /// channel.
    pub fn write<I>(mut self, samples: u32, frames: I) -> QoaResult<Vec<u8>>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        if samples == 0 {
            return Err(QoaError::Validation("sample count must be nonzero".to_string()));
        }

        self.buffer
            .extend_from_slice(&((MAGIC as u64) << 32 | samples as u64).to_be_bytes());

        let mut covered = 0u64;
        for frame in frames {
            let frame = frame.as_ref();
            let header = u64_at(frame, 0)
                .map(FrameHeader::from_u64)
                .ok_or_else(|| QoaError::Format("frame shorter than its header".to_string()))?;
            if header.size as usize != frame.len() {
                return Err(QoaError::Format(format!(
                    "frame header says {} bytes, got {}",
                    header.size,
                    frame.len()
                )));
            }

            covered += header.samples as u64;
            self.buffer.extend_from_slice(frame);
        }

        if covered != samples as u64 {
            return Err(QoaError::Format(format!(
                "frames cover {} samples, header declares {}",
                covered, samples
            )));
        }

        Ok(self.buffer)
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}
