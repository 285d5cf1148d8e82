use std::io::Write;

use log::debug;

use crate::core::{write_u64, QoaDesc, QoaError, QoaResult, FRAME_LEN, MAGIC};

use super::frame::encode_frame;

/// whole-buffer qoa encoder
pub struct Encoder {
    sample_rate: u32,
    channels: u32,
}

impl Encoder {
    pub fn new(sample_rate: u32, channels: u32) -> Self {
        Encoder {
            sample_rate,
            channels,
        }
    }

    /// descriptor for `samples`, with every bound checked
    pub fn describe(&self, samples: &[i16]) -> QoaResult<QoaDesc> {
        if self.channels == 0 {
            return Err(QoaError::Validation("channel count must be nonzero".to_string()));
        }
        if samples.len() % self.channels as usize != 0 {
            return Err(QoaError::Validation(format!(
                "{} samples do not divide into {} channels",
                samples.len(),
                self.channels
            )));
        }
        let per_channel = u32::try_from(samples.len() / self.channels as usize)
            .map_err(|_| QoaError::Validation("too many samples for one stream".to_string()))?;

        let desc = QoaDesc::new(self.channels, self.sample_rate, per_channel);
        desc.validate()?;
        Ok(desc)
    }

    /// encode interleaved samples to a complete qoa stream
    pub fn encode(&self, samples: &[i16]) -> QoaResult<Vec<u8>> {
        let mut desc = self.describe(samples)?;
        let mut out = Vec::with_capacity(desc.encoded_size());
        encode_stream(samples, &mut desc, &mut out)?;
        Ok(out)
    }

    /// encode into `writer`, returning the final descriptor
    pub fn encode_to<W>(&self, samples: &[i16], writer: &mut W) -> QoaResult<QoaDesc>
    where
        W: Write + ?Sized,
    {
        let mut desc = self.describe(samples)?;
        encode_stream(samples, &mut desc, writer)?;
        Ok(desc)
    }
}

/// write the 8-byte stream header
pub fn encode_header<W: Write + ?Sized>(desc: &QoaDesc, writer: &mut W) -> QoaResult<()> {
    write_u64((MAGIC as u64) << 32 | desc.samples as u64, writer)
}

/// encode a whole stream described by `desc`
///
/// The predictor states in `desc` are reset to the start state and then
/// carried through every frame; on return they hold the state after the last
/// sample.
pub fn encode_stream<W: Write + ?Sized>(
    samples: &[i16],
    desc: &mut QoaDesc,
    writer: &mut W,
) -> QoaResult<()> {
    desc.validate()?;

    let channels = desc.channels as usize;
    let total = desc.samples as usize;
    if samples.len() < total * channels {
        return Err(QoaError::Validation(format!(
            "descriptor declares {} samples per channel, buffer holds {}",
            total,
            samples.len() / channels
        )));
    }

    desc.reset_lms();
    encode_header(desc, writer)?;

    debug!(
        "encoding {} samples x {} channels at {} Hz in {} frames",
        total,
        channels,
        desc.samplerate,
        desc.frame_count()
    );

    let mut written = 8;
    for sample_index in (0..total).step_by(FRAME_LEN) {
        let frame_len = FRAME_LEN.min(total - sample_index);
        let frame_samples =
            &samples[sample_index * channels..(sample_index + frame_len) * channels];
        written += encode_frame(frame_samples, desc, frame_len, writer)?;
    }

    debug!("encoded {} bytes", written);
    Ok(())
}
