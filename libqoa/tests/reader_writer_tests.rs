//! Structure walking and stream assembly.

use libqoa_audio::{Decoder, Encoder, Lms, QoaError, Reader, Writer, FRAME_LEN};

const MONO_QOA: &[u8] = include_bytes!("fixtures/mono_48k.qoa");
const STEREO_QOA: &[u8] = include_bytes!("fixtures/stereo_44k.qoa");

#[test]
fn test_reader_walks_every_frame() {
    let file = Reader::new().read(MONO_QOA).unwrap();

    assert_eq!(file.desc.channels, 1);
    assert_eq!(file.desc.samplerate, 48000);
    assert_eq!(file.desc.samples, 5130);
    assert_eq!(file.file_size, MONO_QOA.len());
    assert_eq!(file.frame_count(), 2);

    let first = &file.frames[0];
    assert_eq!(first.index, 0);
    assert_eq!(first.offset, 8);
    assert_eq!(first.first_sample, 0);
    assert_eq!(first.header.samples as usize, FRAME_LEN);
    assert_eq!(first.header.size, 2072);
    assert_eq!(first.lms, vec![Lms::initial()]);

    let second = &file.frames[1];
    assert_eq!(second.offset, 8 + 2072);
    assert_eq!(second.first_sample, FRAME_LEN);
    assert_eq!(second.header.samples, 10);
    assert_eq!(second.header.size, 32);
    assert_ne!(second.lms[0], Lms::initial());
}

#[test]
fn test_reader_snapshots_match_decoder_state() {
    let file = Reader::new().read(STEREO_QOA).unwrap();
    assert_eq!(file.frame_count(), 1);
    assert_eq!(file.frames[0].lms.len(), 2);
    assert!(file.frames[0].lms.iter().all(|l| *l == Lms::initial()));
}

#[test]
fn test_frame_bytes() {
    let file = Reader::new().read(MONO_QOA).unwrap();
    let bytes = file.frame_bytes(MONO_QOA, 1).unwrap();
    assert_eq!(bytes, &MONO_QOA[8 + 2072..]);
    assert!(file.frame_bytes(MONO_QOA, 2).is_none());
}

#[test]
fn test_decode_file_matches_sequential_decode() {
    for data in [MONO_QOA, STEREO_QOA] {
        let file = Reader::new().read(data).unwrap();
        let independent = Decoder::new().decode_file(data, &file).unwrap();
        let sequential = Decoder::new().decode(data).unwrap();
        assert_eq!(independent.samples, sequential.samples);
        assert_eq!(independent.desc.samples, sequential.desc.samples);
    }
}

#[test]
fn test_writer_reassembles_stream() {
    let file = Reader::new().read(MONO_QOA).unwrap();
    let frames: Vec<&[u8]> = (0..file.frame_count())
        .map(|i| file.frame_bytes(MONO_QOA, i).unwrap())
        .collect();

    let data = Writer::new().write(file.desc.samples, frames).unwrap();
    assert_eq!(data, MONO_QOA);
}

#[test]
fn test_writer_checks_sample_total() {
    let file = Reader::new().read(MONO_QOA).unwrap();
    let first = file.frame_bytes(MONO_QOA, 0).unwrap();

    let r = Writer::new().write(file.desc.samples, [first]);
    assert!(matches!(r, Err(QoaError::Format(_))));

    let r = Writer::new().write(0, [first]);
    assert!(matches!(r, Err(QoaError::Validation(_))));
}

#[test]
fn test_writer_checks_frame_size() {
    let file = Reader::new().read(MONO_QOA).unwrap();
    let first = file.frame_bytes(MONO_QOA, 0).unwrap();

    let r = Writer::new().write(FRAME_LEN as u32, [&first[..first.len() - 8]]);
    assert!(matches!(r, Err(QoaError::Format(_))));

    let r = Writer::new().write(FRAME_LEN as u32, [&first[..4]]);
    assert!(matches!(r, Err(QoaError::Format(_))));
}

#[test]
fn test_compression_stats() {
    let samples: Vec<i16> = (0..44100).map(|i| ((i as f32 * 0.05).sin() * 8000.0) as i16).collect();
    let data = Encoder::new(44100, 1).encode(&samples).unwrap();
    let file = Reader::new().read(&data).unwrap();

    let ratio = file.compression_ratio();
    assert!((ratio - 88200.0 / data.len() as f64).abs() < 1e-9);
    assert!((file.bitrate_kbps() - data.len() as f64 * 8.0 / 1000.0).abs() < 1e-6);
}
