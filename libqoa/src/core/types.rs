//! common types for the qoa codec

use crate::codec::lms::Lms;

use super::error::{QoaError, QoaResult};

// constants

/// Magic number "qoaf"
pub const MAGIC: u32 = 0x716f_6166;

/// size of the stream header (magic + total samples)
pub const HEADER_SIZE: usize = 8;

/// smallest buffer that can hold a stream header and one frame header
pub const MIN_FILESIZE: usize = 16;

pub const MAX_CHANNELS: usize = 8;
pub const MAX_SAMPLERATE: u32 = 0xff_ffff;

/// samples per channel in one slice
pub const SLICE_LEN: usize = 20;
pub const SLICES_PER_FRAME: usize = 256;

/// samples per channel in one full frame
pub const FRAME_LEN: usize = SLICES_PER_FRAME * SLICE_LEN;

/// predictor taps
pub const LMS_LEN: usize = 4;

/// byte size of a frame holding `slices` slices per channel
#[inline]
pub const fn frame_size(channels: usize, slices: usize) -> usize {
    8 + LMS_LEN * 4 * channels + 8 * slices * channels
}

/// byte size of a full frame
#[inline]
pub const fn max_frame_size(channels: usize) -> usize {
    frame_size(channels, SLICES_PER_FRAME)
}

// data structures

/// stream descriptor
///
/// Carries the audio shape plus the predictor state of every channel. The
/// predictor array always holds [`MAX_CHANNELS`] entries; only the first
/// `channels` are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QoaDesc {
    /// Number of channels (1-8)
    pub channels: u32,
    /// Sample rate in Hz (1-16777215)
    pub samplerate: u32,
    /// Samples per channel
    pub samples: u32,
    pub lms: [Lms; MAX_CHANNELS],
}

impl QoaDesc {
    pub fn new(channels: u32, samplerate: u32, samples: u32) -> Self {
        QoaDesc {
            channels,
            samplerate,
            samples,
            lms: [Lms::default(); MAX_CHANNELS],
        }
    }

    /// check the encode-time bounds
    pub fn validate(&self) -> QoaResult<()> {
        if self.channels == 0 || self.channels as usize > MAX_CHANNELS {
            return Err(QoaError::Validation(format!(
                "channel count must be 1-{}, got {}",
                MAX_CHANNELS, self.channels
            )));
        }
        if self.samplerate == 0 || self.samplerate > MAX_SAMPLERATE {
            return Err(QoaError::Validation(format!(
                "samplerate must be 1-{}, got {}",
                MAX_SAMPLERATE, self.samplerate
            )));
        }
        if self.samples == 0 {
            return Err(QoaError::Validation("sample count must be nonzero".to_string()));
        }
        Ok(())
    }

    /// reset every channel to the encoder start state
    pub fn reset_lms(&mut self) {
        for lms in self.lms.iter_mut().take(self.channels as usize) {
            *lms = Lms::initial();
        }
    }

    /// number of frames the stream is split into
    pub fn frame_count(&self) -> usize {
        (self.samples as usize).div_ceil(FRAME_LEN)
    }

    /// exact encoded size in bytes
    pub fn encoded_size(&self) -> usize {
        let channels = self.channels as usize;
        let num_frames = self.frame_count();
        let num_slices = (self.samples as usize).div_ceil(SLICE_LEN);

        HEADER_SIZE
            + num_frames * 8
            + num_frames * LMS_LEN * 4 * channels
            + num_slices * 8 * channels
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.samplerate == 0 {
            return 0.0;
        }
        self.samples as f64 / self.samplerate as f64
    }
}

/// fields of one frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub channels: u32,
    pub samplerate: u32,
    /// samples per channel in this frame
    pub samples: u32,
    /// frame size in bytes, header included
    pub size: u32,
}

impl FrameHeader {
    pub fn from_u64(v: u64) -> Self {
        FrameHeader {
            channels: ((v >> 56) & 0xff) as u32,
            samplerate: ((v >> 32) & 0xff_ffff) as u32,
            samples: ((v >> 16) & 0xffff) as u32,
            size: (v & 0xffff) as u32,
        }
    }

    pub fn to_u64(self) -> u64 {
        (self.channels as u64) << 56
            | (self.samplerate as u64) << 32
            | (self.samples as u64) << 16
            | self.size as u64
    }

    /// bytes the slices of this frame need, header and snapshots included
    pub fn used_size(&self) -> usize {
        frame_size(
            self.channels as usize,
            (self.samples as usize).div_ceil(SLICE_LEN),
        )
    }

    /// check this header against the stream descriptor
    pub fn check(&self, desc: &QoaDesc) -> QoaResult<()> {
        if self.channels != desc.channels {
            return Err(QoaError::Format(format!(
                "channel count mismatch: frame says {}, stream says {}",
                self.channels, desc.channels
            )));
        }
        if self.samplerate != desc.samplerate {
            return Err(QoaError::Format(format!(
                "samplerate mismatch: frame says {}, stream says {}",
                self.samplerate, desc.samplerate
            )));
        }
        if (self.size as usize) < frame_size(self.channels as usize, 0) {
            return Err(QoaError::Format(format!(
                "frame size {} too small for {} channels",
                self.size, self.channels
            )));
        }

        if (self.size as usize) < self.used_size() {
            return Err(QoaError::Format(format!(
                "frame declares {} samples x {} channels but is only {} bytes, needs {}",
                self.samples,
                self.channels,
                self.size,
                self.used_size()
            )));
        }
        Ok(())
    }
}

/// decoded stream
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// descriptor with the sample count actually decoded
    pub desc: QoaDesc,
    /// interleaved 16-bit samples
    pub samples: Vec<i16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_header_fields() {
        let header = FrameHeader::from_u64(0x0200_ac44_1400_2028);
        assert_eq!(header.channels, 2);
        assert_eq!(header.samplerate, 44100);
        assert_eq!(header.samples, 5120);
        assert_eq!(header.size, 0x2028);
        assert_eq!(header.to_u64(), 0x0200_ac44_1400_2028);
    }

    #[test]
    fn test_sizes() {
        assert_eq!(frame_size(1, 1), 32);
        assert_eq!(max_frame_size(2), 8 + 32 + 256 * 16);

        let desc = QoaDesc::new(2, 44100, 5121);
        assert_eq!(desc.frame_count(), 2);
        assert_eq!(desc.encoded_size(), 8 + max_frame_size(2) + frame_size(2, 1));
    }

    #[test]
    fn test_check_frame_size() {
        let desc = QoaDesc::new(2, 44100, 40);
        let header = FrameHeader {
            channels: 2,
            samplerate: 44100,
            samples: 30,
            size: frame_size(2, 2) as u32,
        };
        assert_eq!(header.used_size(), 8 + 32 + 32);
        assert!(header.check(&desc).is_ok());

        // 60 codes fit in three words, but each channel needs two
        let one_word_short = FrameHeader { size: 64, ..header };
        assert!(one_word_short.check(&desc).is_err());

        let padded = FrameHeader { size: 80, ..header };
        assert!(padded.check(&desc).is_ok());

        let short = FrameHeader { size: 16, ..header };
        assert!(short.check(&desc).is_err());
    }
}
