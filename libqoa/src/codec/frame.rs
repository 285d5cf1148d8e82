//! frame coder
//!
//! A frame is a header word, one predictor snapshot per channel and then the
//! slices, interleaved per channel: (ch 0, slice 0), (ch 1, slice 0), ...,
//! (ch 0, slice 1), ...

use std::io::{Read, Write};

use log::trace;

use crate::core::{
    frame_size, read_u64, write_u64, FrameHeader, QoaDesc, QoaError, QoaResult, FRAME_LEN,
    MAX_CHANNELS, SLICE_LEN,
};

use super::lms::Lms;
use super::slice::{decode_slice, encode_slice};

/// encode one frame of interleaved samples
///
/// `samples` holds `frame_len` samples per channel. The predictor states in
/// `desc` are written out first and then advanced by every slice, so after
/// the call they are the starting state of the next frame. Returns the number
/// of bytes written.
pub fn encode_frame<W: Write + ?Sized>(
    samples: &[i16],
    desc: &mut QoaDesc,
    frame_len: usize,
    writer: &mut W,
) -> QoaResult<usize> {
    let channels = desc.channels as usize;
    if frame_len == 0 || frame_len > FRAME_LEN {
        return Err(QoaError::Validation(format!(
            "frame length must be 1-{}, got {}",
            FRAME_LEN, frame_len
        )));
    }
    if samples.len() != frame_len * channels {
        return Err(QoaError::Validation(format!(
            "expected {} interleaved samples for the frame, got {}",
            frame_len * channels,
            samples.len()
        )));
    }

    let slices = frame_len.div_ceil(SLICE_LEN);
    let size = frame_size(channels, slices);

    let header = FrameHeader {
        channels: desc.channels,
        samplerate: desc.samplerate,
        samples: frame_len as u32,
        size: size as u32,
    };
    write_u64(header.to_u64(), writer)?;

    for lms in desc.lms.iter().take(channels) {
        let (history, weights) = lms.pack();
        write_u64(history, writer)?;
        write_u64(weights, writer)?;
    }

    // the search hint restarts with every frame
    let mut prev_scalefactor = [0usize; MAX_CHANNELS];
    let mut window = [0i16; SLICE_LEN];

    for sample_index in (0..frame_len).step_by(SLICE_LEN) {
        let slice_len = SLICE_LEN.min(frame_len - sample_index);

        for c in 0..channels {
            let slice_start = sample_index * channels + c;
            for (dst, &src) in window
                .iter_mut()
                .zip(samples[slice_start..].iter().step_by(channels))
                .take(slice_len)
            {
                *dst = src;
            }

            let slice = encode_slice(&window[..slice_len], &desc.lms[c], prev_scalefactor[c]);
            trace!(
                "slice {} ch {}: sf {} rank {}",
                sample_index / SLICE_LEN,
                c,
                slice.scalefactor,
                slice.rank
            );

            prev_scalefactor[c] = slice.scalefactor;
            desc.lms[c] = slice.lms;
            write_u64(slice.word, writer)?;
        }
    }

    Ok(size)
}

/// read a frame header and its predictor snapshots
///
/// The header is checked against `desc`; on success the snapshots replace the
/// predictor states in `desc`.
pub fn read_frame_prelude<R: Read + ?Sized>(
    reader: &mut R,
    desc: &mut QoaDesc,
) -> QoaResult<FrameHeader> {
    let header = FrameHeader::from_u64(read_u64(reader)?);
    header.check(desc)?;

    for lms in desc.lms.iter_mut().take(header.channels as usize) {
        let history = read_u64(reader)?;
        let weights = read_u64(reader)?;
        *lms = Lms::unpack(history, weights);
    }

    Ok(header)
}

/// decode one frame into `out`
///
/// `out` receives interleaved samples and must hold at least the frame's
/// sample count times the channel count. Returns samples per channel.
pub fn decode_frame<R: Read + ?Sized>(
    reader: &mut R,
    desc: &mut QoaDesc,
    out: &mut [i16],
) -> QoaResult<usize> {
    let header = read_frame_prelude(reader, desc)?;
    let channels = header.channels as usize;
    let samples = header.samples as usize;

    if out.len() < samples * channels {
        return Err(QoaError::Format(format!(
            "frame holds {} samples per channel, only {} fit",
            samples,
            out.len() / channels
        )));
    }

    for sample_index in (0..samples).step_by(SLICE_LEN) {
        let slice_len = SLICE_LEN.min(samples - sample_index);

        for c in 0..channels {
            let word = read_u64(reader)?;
            let slice_start = sample_index * channels + c;
            let dst = out[slice_start..]
                .iter_mut()
                .step_by(channels)
                .take(slice_len);
            decode_slice(word, &mut desc.lms[c], dst);
        }
    }

    // a frame may declare more room than it uses
    let padding = header.size as usize - header.used_size();
    if padding > 0 {
        let mut rest = (&mut *reader).take(padding as u64);
        std::io::copy(&mut rest, &mut std::io::sink())?;
    }

    Ok(samples)
}
