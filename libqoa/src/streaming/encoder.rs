use log::debug;

use crate::codec::encode_frame;
use crate::core::{max_frame_size, QoaDesc, QoaError, QoaResult, FRAME_LEN};
use crate::Writer;

pub struct StreamingEncoder {
    /// shape plus the predictor state carried from frame to frame
    desc: QoaDesc,
    sample_buffer: Vec<i16>,
    /// every frame encoded so far
    frames: Vec<EncodedFrame>,
    /// frames already handed out by next_frame
    emitted: usize,
    total_samples: u64,
}

/// An encoded frame ready for transmission
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    /// Frame index
    pub index: u32,
    /// Timestamp in milliseconds
    pub timestamp_ms: u32,
    /// Encoded frame data
    pub data: Vec<u8>,
    /// Number of samples in this frame
    pub samples: u32,
}

impl StreamingEncoder {
    /// Create a new streaming encoder
    pub fn new(sample_rate: u32, channels: u32) -> Self {
        let mut desc = QoaDesc::new(channels, sample_rate, 0);
        desc.reset_lms();

        Self {
            desc,
            sample_buffer: Vec::with_capacity(FRAME_LEN * channels as usize * 2),
            frames: Vec::new(),
            emitted: 0,
            total_samples: 0,
        }
    }

    /// Get number of pending samples (per channel) in buffer
    pub fn pending_samples(&self) -> usize {
        match self.desc.channels {
            0 => 0,
            c => self.sample_buffer.len() / c as usize,
        }
    }

    /// Get number of encoded frames not yet taken with next_frame
    pub fn pending_frames(&self) -> usize {
        self.frames.len() - self.emitted
    }

    /// Samples per channel encoded so far
    pub fn encoded_samples(&self) -> u64 {
        self.total_samples
    }

    /// Push samples to the encoder
    ///
    /// Samples should be interleaved if multi-channel. Every complete frame is
    /// encoded right away.
    pub fn push_samples(&mut self, samples: &[i16]) -> QoaResult<()> {
        self.check_shape()?;
        if samples.len() % self.desc.channels as usize != 0 {
            return Err(QoaError::Validation(format!(
                "{} samples do not divide into {} channels",
                samples.len(),
                self.desc.channels
            )));
        }

        self.sample_buffer.extend_from_slice(samples);

        let frame_samples = FRAME_LEN * self.desc.channels as usize;
        while self.sample_buffer.len() >= frame_samples {
            let rest = self.sample_buffer.split_off(frame_samples);
            let frame = std::mem::replace(&mut self.sample_buffer, rest);
            self.encode_buffered(&frame, FRAME_LEN)?;
        }
        Ok(())
    }

    /// Get next encoded frame if available
    pub fn next_frame(&mut self) -> Option<EncodedFrame> {
        let frame = self.frames.get(self.emitted)?.clone();
        self.emitted += 1;
        Some(frame)
    }

    /// Encode the buffered partial frame, returns true if one was produced
    pub fn flush(&mut self) -> QoaResult<bool> {
        if self.sample_buffer.is_empty() {
            return Ok(false);
        }
        self.check_shape()?;

        let frame_len = self.pending_samples();
        let frame = std::mem::take(&mut self.sample_buffer);
        self.encode_buffered(&frame, frame_len)?;
        Ok(true)
    }

    /// Build a complete qoa stream from every frame encoded so far
    pub fn finalize(&mut self) -> QoaResult<Vec<u8>> {
        self.flush()?;

        let samples = u32::try_from(self.total_samples)
            .map_err(|_| QoaError::Validation("too many samples for one stream".to_string()))?;

        debug!(
            "finalizing stream: {} frames, {} samples",
            self.frames.len(),
            samples
        );

        Writer::new().write(samples, self.frames.iter().map(|f| &f.data))
    }

    fn check_shape(&self) -> QoaResult<()> {
        // a placeholder count so only channels and samplerate are checked
        let mut shape = self.desc;
        shape.samples = 1;
        shape.validate()
    }

    fn encode_buffered(&mut self, samples: &[i16], frame_len: usize) -> QoaResult<()> {
        if self.total_samples + frame_len as u64 > u32::MAX as u64 {
            return Err(QoaError::Validation("too many samples for one stream".to_string()));
        }

        let timestamp_ms =
            (self.total_samples as f64 / self.desc.samplerate as f64 * 1000.0) as u32;

        let mut data = Vec::with_capacity(max_frame_size(self.desc.channels as usize));
        encode_frame(samples, &mut self.desc, frame_len, &mut data)?;

        self.frames.push(EncodedFrame {
            index: self.frames.len() as u32,
            timestamp_ms,
            data,
            samples: frame_len as u32,
        });
        self.total_samples += frame_len as u64;
        Ok(())
    }
}
