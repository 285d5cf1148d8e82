use std::io::Cursor;

use log::debug;

use crate::codec::{decode_frame, Decoder};
use crate::core::{
    u64_at, FrameHeader, QoaDesc, QoaError, QoaResult, FRAME_LEN, HEADER_SIZE, MIN_FILESIZE,
};

use super::types::{DecoderState, StreamingAudioInfo};

pub struct StreamingDecoder {
    /// incoming data, starting at the next undecoded frame once ready
    buffer: Vec<u8>,
    /// current state
    state: DecoderState,
    /// parsed stream descriptor
    desc: Option<QoaDesc>,
    /// frames decoded so far
    current_frame: usize,
    /// samples per channel decoded so far
    decoded_samples: usize,
}

impl StreamingDecoder {
    /// new streaming decoder
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(64 * 1024),
            state: DecoderState::WaitingForHeader,
            desc: None,
            current_frame: 0,
            decoded_samples: 0,
        }
    }

    /// current state
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// audio info if we have the header
    pub fn info(&self) -> Option<StreamingAudioInfo> {
        self.desc.as_ref().map(|d| StreamingAudioInfo {
            sample_rate: d.samplerate,
            channels: d.channels,
            total_samples: d.samples,
        })
    }

    /// feed more data, returns true if a complete frame is ready
    pub fn feed(&mut self, data: &[u8]) -> QoaResult<bool> {
        if self.state == DecoderState::Error || self.state == DecoderState::Finished {
            return Ok(false);
        }

        self.buffer.extend_from_slice(data);
        self.try_advance_state()
    }

    /// decode next frame, or None if nothing ready
    pub fn next_frame(&mut self) -> QoaResult<Option<Vec<i16>>> {
        if self.state != DecoderState::Ready {
            return Ok(None);
        }
        let Some(mut desc) = self.desc else {
            return Ok(None);
        };

        let Some(size) = self.complete_frame_size(0) else {
            return Ok(None);
        };

        let channels = desc.channels as usize;
        let remaining = desc.samples as usize - self.decoded_samples;
        let mut samples = vec![0i16; remaining.min(FRAME_LEN) * channels];

        let frame_len = {
            let mut cursor = Cursor::new(&self.buffer[..size]);
            decode_frame(&mut cursor, &mut desc, &mut samples)
        };
        let frame_len = match frame_len {
            Ok(0) => {
                self.state = DecoderState::Error;
                return Err(QoaError::Format(format!(
                    "frame {} is empty",
                    self.current_frame
                )));
            }
            Ok(n) => n,
            Err(e) => {
                self.state = DecoderState::Error;
                return Err(e);
            }
        };

        samples.truncate(frame_len * channels);
        self.buffer.drain(..size);
        self.desc = Some(desc);
        self.current_frame += 1;
        self.decoded_samples += frame_len;

        if self.decoded_samples >= desc.samples as usize {
            debug!("stream finished after {} frames", self.current_frame);
            self.state = DecoderState::Finished;
        }

        Ok(Some(samples))
    }

    /// decode everything we have
    pub fn decode_available(&mut self) -> QoaResult<Vec<i16>> {
        let mut samples = Vec::new();
        while let Some(frame) = self.next_frame()? {
            samples.extend_from_slice(&frame);
        }
        Ok(samples)
    }

    /// reset for reuse
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = DecoderState::WaitingForHeader;
        self.desc = None;
        self.current_frame = 0;
        self.decoded_samples = 0;
    }

    /// bytes buffered
    pub fn buffered_bytes(&self) -> usize {
        self.buffer.len()
    }

    /// complete frames ready to decode
    pub fn available_frames(&self) -> usize {
        if self.state != DecoderState::Ready {
            return 0;
        }

        let mut count = 0;
        let mut offset = 0;
        while let Some(size) = self.complete_frame_size(offset) {
            count += 1;
            offset += size;
        }
        count
    }

    /// current frame index
    pub fn current_frame_index(&self) -> usize {
        self.current_frame
    }

    /// samples per channel decoded so far
    pub fn decoded_samples(&self) -> usize {
        self.decoded_samples
    }

    // internal stuff

    fn try_advance_state(&mut self) -> QoaResult<bool> {
        match self.state {
            DecoderState::WaitingForHeader => {
                if self.try_parse_header()? {
                    self.state = DecoderState::Ready;
                    return self.try_advance_state();
                }
            }
            DecoderState::Ready => {
                return Ok(self.complete_frame_size(0).is_some());
            }
            _ => {}
        }
        Ok(false)
    }

    fn try_parse_header(&mut self) -> QoaResult<bool> {
        // stream header plus the first frame header
        if self.buffer.len() < MIN_FILESIZE {
            return Ok(false);
        }

        let desc = match Decoder::new().decode_header(&mut Cursor::new(&self.buffer)) {
            Ok(desc) => desc,
            Err(e) => {
                self.state = DecoderState::Error;
                return Err(e);
            }
        };

        debug!(
            "stream header: {} samples x {} channels at {} Hz",
            desc.samples, desc.channels, desc.samplerate
        );

        self.buffer.drain(..HEADER_SIZE);
        self.desc = Some(desc);
        Ok(true)
    }

    /// byte size of the frame at `offset` if all of it is buffered
    fn complete_frame_size(&self, offset: usize) -> Option<usize> {
        let header = FrameHeader::from_u64(u64_at(&self.buffer, offset)?);
        // a size below the header word still has to reach decode_frame to fail
        let size = (header.size as usize).max(HEADER_SIZE);
        if offset + size > self.buffer.len() {
            return None;
        }
        Some(size)
    }
}

impl Default for StreamingDecoder {
    fn default() -> Self {
        Self::new()
    }
}
