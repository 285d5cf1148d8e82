//! Streaming types and enums

use serde::Serialize;

/// Streaming decoder state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DecoderState {
    /// Waiting for the stream header and the first frame header
    WaitingForHeader,
    /// Ready to decode frames
    Ready,
    /// Every declared sample has been decoded
    Finished,
    /// Error state
    Error,
}

impl DecoderState {
    /// snake_case name, as handed to javascript
    pub fn as_str(self) -> &'static str {
        match self {
            DecoderState::WaitingForHeader => "waiting_for_header",
            DecoderState::Ready => "ready",
            DecoderState::Finished => "finished",
            DecoderState::Error => "error",
        }
    }
}

/// Audio information for streaming
#[derive(Debug, Clone, Serialize)]
pub struct StreamingAudioInfo {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u32,
    /// Samples per channel declared by the stream header
    pub total_samples: u32,
}

impl StreamingAudioInfo {
    /// Calculate duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.total_samples as f64 / self.sample_rate as f64
    }
}
