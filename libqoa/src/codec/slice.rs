//! slice coder: the per-slice scalefactor search and its inverse
//!
//! A slice is up to [`SLICE_LEN`] samples of one channel packed into one
//! 64-bit word: the scalefactor in the top 4 bits followed by one 3-bit code
//! per sample, first sample in the most significant position. Slices shorter
//! than [`SLICE_LEN`] are shifted left so the unused trailing codes are zero.

use crate::core::SLICE_LEN;

use super::lms::Lms;
use super::tables::{clamp_s16, dequantize, quantize};

/// outcome of the scalefactor search for one slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedSlice {
    pub scalefactor: usize,
    /// packed slice word, ready for the wire
    pub word: u64,
    /// predictor state after coding this slice
    pub lms: Lms,
    /// total rank of the winning candidate
    pub rank: u64,
}

/// encode one slice, searching all 16 scalefactors
///
/// Candidates are visited starting at `prev_scalefactor`; the first candidate
/// with the strictly lowest rank wins, so the visiting order is observable in
/// the output. `lms` is the authoritative state and is not touched; the
/// winning trial state is returned instead.
pub fn encode_slice(samples: &[i16], lms: &Lms, prev_scalefactor: usize) -> EncodedSlice {
    debug_assert!(!samples.is_empty() && samples.len() <= SLICE_LEN);

    let first = prev_scalefactor % 16;
    let mut best = try_scalefactor(samples, lms, first, u64::MAX);

    for sfi in 1..16 {
        let scalefactor = (sfi + first) % 16;
        let candidate = try_scalefactor(samples, lms, scalefactor, best.rank);
        if candidate.rank < best.rank {
            best = candidate;
        }
    }

    best.word <<= (SLICE_LEN - samples.len()) * 3;
    best
}

/// code `samples` with one scalefactor on a private copy of the predictor
///
/// Stops as soon as the running rank exceeds `best_rank`; the returned rank
/// is then above `best_rank` and the candidate must be discarded.
fn try_scalefactor(
    samples: &[i16],
    lms: &Lms,
    scalefactor: usize,
    best_rank: u64,
) -> EncodedSlice {
    let mut lms = *lms;
    let mut word = scalefactor as u64;
    let mut rank = 0u64;

    for &sample in samples {
        let sample = sample as i32;
        let predicted = lms.predict();

        let residual = sample.wrapping_sub(predicted);
        let quantized = quantize(residual, scalefactor);
        let dequantized = dequantize(scalefactor, quantized);
        let reconstructed = clamp_s16(predicted.wrapping_add(dequantized));

        let penalty = lms.weights_penalty() as u64;
        let error = (sample - reconstructed) as i64;
        let error_sq = (error * error) as u64;

        rank = rank.saturating_add(error_sq.saturating_add(penalty.saturating_mul(penalty)));
        if rank > best_rank {
            break;
        }

        lms.update(reconstructed, dequantized);
        word = (word << 3) | quantized as u64;
    }

    EncodedSlice {
        scalefactor,
        word,
        lms,
        rank,
    }
}

/// scalefactor stored in a slice word
#[inline]
pub fn slice_scalefactor(word: u64) -> usize {
    ((word >> 60) & 0xf) as usize
}

/// decode one slice word into `out`, advancing `lms`
///
/// `out` yields one destination per sample of the slice; for interleaved
/// audio pass a strided iterator.
pub fn decode_slice<'a, I>(word: u64, lms: &mut Lms, out: I)
where
    I: IntoIterator<Item = &'a mut i16>,
{
    let scalefactor = slice_scalefactor(word);
    let mut codes = word << 4;

    for dst in out.into_iter().take(SLICE_LEN) {
        let predicted = lms.predict();
        let quantized = ((codes >> 61) & 0x7) as u8;
        let dequantized = dequantize(scalefactor, quantized);
        let reconstructed = clamp_s16(predicted.wrapping_add(dequantized));

        *dst = reconstructed as i16;
        codes <<= 3;

        lms.update(reconstructed, dequantized);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_slice_is_left_aligned() {
        let slice = encode_slice(&[0i16; 3], &Lms::initial(), 0);
        // 4 + 3 * 3 bits used, the rest must be zero
        assert_eq!(slice.word & ((1u64 << 51) - 1), 0);
        assert_eq!(slice_scalefactor(slice.word), slice.scalefactor);
    }

    #[test]
    fn test_search_leaves_input_state_alone() {
        let lms = Lms::initial();
        let samples: Vec<i16> = (0..20).map(|i| (i * 700) as i16).collect();
        let slice = encode_slice(&samples, &lms, 5);
        assert_eq!(lms, Lms::initial());
        assert_ne!(slice.lms, lms);
    }

    #[test]
    fn test_decode_replays_encoder_state() {
        let samples: Vec<i16> = (0..20)
            .map(|i| ((i as f32 * 0.7).sin() * 9000.0) as i16)
            .collect();
        let slice = encode_slice(&samples, &Lms::initial(), 0);

        let mut lms = Lms::initial();
        let mut out = [0i16; SLICE_LEN];
        decode_slice(slice.word, &mut lms, out.iter_mut());
        assert_eq!(lms, slice.lms);

        let error: u64 = samples
            .iter()
            .zip(out.iter())
            .map(|(&a, &b)| {
                let e = a as i64 - b as i64;
                (e * e) as u64
            })
            .sum();
        // rank is the squared error plus any weight penalty
        assert!(error <= slice.rank);
    }

    #[test]
    fn test_winner_is_the_minimum_rank() {
        let samples: Vec<i16> = (0..20).map(|i| if i % 2 == 0 { 3000 } else { -3000 }).collect();
        let lms = Lms::initial();
        let best = encode_slice(&samples, &lms, 0);

        for sf in 0..16 {
            let other = try_scalefactor(&samples, &lms, sf, u64::MAX);
            assert!(best.rank <= other.rank, "sf {} beats the winner", sf);
        }
    }
}
