//! the qoa codec engine
//!
//! An adaptive 4-tap LMS predictor per channel plus a 3-bit quantizer whose
//! step size (one of 16 scalefactors) is picked per 20-sample slice by brute
//! force search.

pub mod decoder;
pub mod encoder;
pub mod frame;
pub mod lms;
pub mod slice;
pub mod tables;

pub use decoder::Decoder;
pub use encoder::{encode_header, encode_stream, Encoder};
pub use frame::{decode_frame, encode_frame, read_frame_prelude};
pub use lms::Lms;
pub use slice::{decode_slice, encode_slice, slice_scalefactor, EncodedSlice};
