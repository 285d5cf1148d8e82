use wasm_bindgen::prelude::*;

pub mod codec;
pub mod core;
pub mod streaming;

mod reader;
mod writer;

pub use codec::{Decoder, Encoder, Lms};
pub use crate::core::{
    check_fourcc, DecodedAudio, FrameHeader, QoaDesc, QoaError, QoaResult, FRAME_LEN,
    HEADER_SIZE, LMS_LEN, MAGIC, MAX_CHANNELS, MAX_SAMPLERATE, MIN_FILESIZE, SLICE_LEN,
};
pub use reader::{FrameInfo, QoaFile, Reader};
pub use streaming::{
    DecoderState, EncodedFrame, StreamingAudioInfo, StreamingDecoder, StreamingEncoder,
};
pub use writer::Writer;

// audio info for the info() function

/// info about a qoa stream
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct AudioInfo {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u32,
    /// Samples per channel
    pub total_samples: u32,
    /// Number of frames
    pub frames: u32,
    /// Duration in seconds
    pub duration_secs: f64,
    /// File size in bytes
    pub file_size: usize,
    /// 16-bit pcm size over file size
    pub compression_ratio: f64,
    pub bitrate_kbps: f64,
}

impl From<&QoaFile> for AudioInfo {
    fn from(file: &QoaFile) -> Self {
        Self {
            sample_rate: file.desc.samplerate,
            channels: file.desc.channels,
            total_samples: file.desc.samples,
            frames: file.frame_count() as u32,
            duration_secs: file.desc.duration_secs(),
            file_size: file.file_size,
            compression_ratio: file.compression_ratio(),
            bitrate_kbps: file.bitrate_kbps(),
        }
    }
}

// result helpers

/// turn an error into js
fn to_js_err(e: QoaError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

// api functions

/// encode samples to qoa
///
/// # Arguments
/// * `samples` - Interleaved 16-bit samples
/// * `sample_rate` - Sample rate in Hz (1 to 16777215)
/// * `channels` - Number of channels (1 to 8)
///
/// # Returns
/// qoa stream as byte array
#[wasm_bindgen]
pub fn encode(samples: &[i16], sample_rate: u32, channels: u32) -> Result<Vec<u8>, JsValue> {
    Encoder::new(sample_rate, channels)
        .encode(samples)
        .map_err(to_js_err)
}

/// decode a qoa stream to interleaved 16-bit samples
#[wasm_bindgen]
pub fn decode(data: &[u8]) -> Result<Vec<i16>, JsValue> {
    Decoder::new()
        .decode(data)
        .map(|audio| audio.samples)
        .map_err(to_js_err)
}

/// Check a qoa stream without keeping the audio
///
/// # Returns
/// true if the structure is sound and every frame decodes
#[wasm_bindgen]
pub fn validate(data: &[u8]) -> bool {
    is_valid(data)
}

/// Get information about a qoa stream
#[wasm_bindgen]
pub fn info(data: &[u8]) -> Result<AudioInfo, JsValue> {
    let file = Reader::new().read(data).map_err(to_js_err)?;
    Ok(AudioInfo::from(&file))
}

/// does the buffer start with the qoa magic
#[wasm_bindgen(js_name = check_fourcc)]
pub fn check_fourcc_js(data: &[u8]) -> bool {
    check_fourcc(data)
}

/// get lib version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Format time in seconds to MM:SS or H:MM:SS string
#[wasm_bindgen]
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }

    let total_secs = seconds.floor() as u64;
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}

/// structure walk plus a full decode of every frame
pub fn is_valid(data: &[u8]) -> bool {
    let Ok(file) = Reader::new().read(data) else {
        return false;
    };
    match Decoder::new().decode_file(data, &file) {
        Ok(audio) => audio.desc.samples == file.desc.samples,
        Err(e) => {
            log::debug!("validation failed: {}", e);
            false
        }
    }
}

// streaming decoder wasm api

/// [`StreamingDecoder`] for javascript callers feeding network chunks
#[wasm_bindgen]
pub struct WasmStreamingDecoder {
    inner: StreamingDecoder,
}

#[wasm_bindgen]
impl WasmStreamingDecoder {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: StreamingDecoder::new(),
        }
    }

    /// append bytes; true when a complete frame is buffered
    pub fn feed(&mut self, data: &[u8]) -> Result<bool, JsValue> {
        self.inner.feed(data).map_err(to_js_err)
    }

    pub fn is_ready(&self) -> bool {
        self.inner.state() == DecoderState::Ready
    }

    pub fn is_finished(&self) -> bool {
        self.inner.state() == DecoderState::Finished
    }

    pub fn has_error(&self) -> bool {
        self.inner.state() == DecoderState::Error
    }

    pub fn state(&self) -> String {
        self.inner.state().as_str().to_string()
    }

    /// stream shape as a plain object, null before the header arrives
    pub fn get_info(&self) -> Result<JsValue, JsValue> {
        match self.inner.info() {
            Some(info) => serde_wasm_bindgen::to_value(&info)
                .map_err(|e| JsValue::from_str(&format!("cannot serialize info: {}", e))),
            None => Ok(JsValue::NULL),
        }
    }

    /// one frame of interleaved samples as an `Int16Array`, or null
    pub fn next_frame(&mut self) -> Result<JsValue, JsValue> {
        let Some(samples) = self.inner.next_frame().map_err(to_js_err)? else {
            return Ok(JsValue::NULL);
        };
        let array = js_sys::Int16Array::new_with_length(samples.len() as u32);
        array.copy_from(&samples);
        Ok(array.into())
    }

    /// every complete frame buffered so far
    pub fn decode_available(&mut self) -> Result<Vec<i16>, JsValue> {
        self.inner.decode_available().map_err(to_js_err)
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }
}

impl Default for WasmStreamingDecoder {
    fn default() -> Self {
        Self::new()
    }
}
