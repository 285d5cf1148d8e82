//! adaptive 4-tap sign-sign LMS predictor

use crate::core::LMS_LEN;

/// predictor state of one channel
///
/// `history` holds the most recent reconstructed sample last.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lms {
    pub history: [i32; LMS_LEN],
    pub weights: [i32; LMS_LEN],
}

impl Lms {
    /// encoder start state, weights {0, 0, -1, 2} in 2.13 fixed point
    pub fn initial() -> Self {
        Lms {
            history: [0; LMS_LEN],
            weights: [0, 0, -(1 << 13), 1 << 14],
        }
    }

    /// prediction of the next sample
    #[inline]
    pub fn predict(&self) -> i32 {
        let mut prediction = 0i32;
        for i in 0..LMS_LEN {
            prediction = prediction.wrapping_add(self.weights[i].wrapping_mul(self.history[i]));
        }
        prediction >> 13
    }

    /// adapt the weights towards `residual` and push `sample` into the history
    #[inline]
    pub fn update(&mut self, sample: i32, residual: i32) {
        let delta = residual >> 4;
        for i in 0..LMS_LEN {
            let step = if self.history[i] < 0 { -delta } else { delta };
            self.weights[i] = self.weights[i].wrapping_add(step);
        }

        self.history.copy_within(1.., 0);
        self.history[LMS_LEN - 1] = sample;
    }

    /// penalty that keeps the encoder away from exploding weights
    #[inline]
    pub fn weights_penalty(&self) -> i64 {
        let power = self
            .weights
            .iter()
            .fold(0i64, |acc, &w| acc.saturating_add(w as i64 * w as i64));
        ((power >> 18) - 0x8ff).max(0)
    }

    /// wire snapshot: (history word, weights word), 16 bits per entry
    pub fn pack(&self) -> (u64, u64) {
        let mut history = 0u64;
        let mut weights = 0u64;
        for i in 0..LMS_LEN {
            history = (history << 16) | (self.history[i] as u16) as u64;
            weights = (weights << 16) | (self.weights[i] as u16) as u64;
        }
        (history, weights)
    }

    /// inverse of [`Lms::pack`], sign-extending every entry
    pub fn unpack(mut history: u64, mut weights: u64) -> Self {
        let mut lms = Lms::default();
        for i in 0..LMS_LEN {
            lms.history[i] = (history >> 48) as i16 as i32;
            history <<= 16;
            lms.weights[i] = (weights >> 48) as i16 as i32;
            weights <<= 16;
        }
        lms
    }
}
