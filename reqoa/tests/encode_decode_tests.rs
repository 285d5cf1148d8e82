use reqoa::audio::{read_audio_from_bytes, write_wav_to_bytes, WAV_HEADER_SIZE};
use reqoa::{
    check_paths, convert_file, decode_to_samples, decode_to_wav, describe, encode_from_audio,
    encode_from_samples, get_qoa_info, validate_qoa, Direction, EncodeOptions,
};
use std::path::PathBuf;

fn sine(sample_rate: u32, channels: usize, secs: f32) -> Vec<i16> {
    let frames = (sample_rate as f32 * secs) as usize;
    let mut samples = Vec::with_capacity(frames * channels);
    for i in 0..frames {
        let t = i as f32 / sample_rate as f32;
        let sample = (t * 440.0 * 2.0 * std::f32::consts::PI).sin() * 12000.0;
        for ch in 0..channels {
            samples.push(sample as i16 / (ch as i16 + 1));
        }
    }
    samples
}

/// fresh scratch directory per test
fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("reqoa-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_encode_decode_round_trip() {
    let samples = sine(44100, 2, 1.0);

    let qoa_bytes = encode_from_samples(&samples, 44100, 2).unwrap();
    let (decoded, rate, channels) = decode_to_samples(&qoa_bytes).unwrap();

    assert_eq!(rate, 44100);
    assert_eq!(channels, 2);
    assert_eq!(decoded.len(), samples.len());

    // lossy, but close on a clean tone
    let worst = samples
        .iter()
        .zip(&decoded)
        .map(|(&a, &b)| (a as i32 - b as i32).abs())
        .max()
        .unwrap();
    assert!(worst < 1000, "worst error {}", worst);
}

#[test]
fn test_wav_header_layout() {
    let wav = write_wav_to_bytes(&[1, -2, 3, -4], 22050, 2).unwrap();

    assert_eq!(wav.len(), WAV_HEADER_SIZE + 8);
    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(u32::from_le_bytes(wav[4..8].try_into().unwrap()), 36 + 8);
    assert_eq!(&wav[8..16], b"WAVEfmt ");
    assert_eq!(u16::from_le_bytes([wav[20], wav[21]]), 1);
    assert_eq!(u16::from_le_bytes([wav[22], wav[23]]), 2);
    assert_eq!(u32::from_le_bytes(wav[24..28].try_into().unwrap()), 22050);
    assert_eq!(u32::from_le_bytes(wav[28..32].try_into().unwrap()), 22050 * 4);
    assert_eq!(u16::from_le_bytes([wav[32], wav[33]]), 4);
    assert_eq!(u16::from_le_bytes([wav[34], wav[35]]), 16);
    assert_eq!(&wav[36..40], b"data");
    assert_eq!(u32::from_le_bytes(wav[40..44].try_into().unwrap()), 8);
    assert_eq!(&wav[44..], &[1, 0, 0xfe, 0xff, 3, 0, 0xfc, 0xff]);
}

#[test]
fn test_wav_read_back() {
    let samples = sine(16000, 1, 0.25);
    let wav = write_wav_to_bytes(&samples, 16000, 1).unwrap();

    let (read, rate, channels) = read_audio_from_bytes(&wav).unwrap();
    assert_eq!(rate, 16000);
    assert_eq!(channels, 1);
    assert_eq!(read, samples);
}

#[test]
fn test_encode_from_wav_matches_samples() {
    let samples = sine(48000, 2, 0.5);
    let wav = write_wav_to_bytes(&samples, 48000, 2).unwrap();

    let from_wav = encode_from_audio(&wav).unwrap();
    let direct = encode_from_samples(&samples, 48000, 2).unwrap();
    assert_eq!(from_wav, direct);
}

#[test]
fn test_decode_to_wav() {
    let samples = sine(8000, 1, 0.1);
    let qoa_bytes = encode_from_samples(&samples, 8000, 1).unwrap();

    let wav = decode_to_wav(&qoa_bytes).unwrap();
    assert_eq!(wav.len(), WAV_HEADER_SIZE + samples.len() * 2);
}

#[test]
fn test_info_and_describe() {
    let samples = sine(44100, 1, 1.0);
    let qoa_bytes = encode_from_samples(&samples, 44100, 1).unwrap();

    let info = get_qoa_info(&qoa_bytes).unwrap();
    assert_eq!(info.sample_rate, 44100);
    assert_eq!(info.channels, 1);
    assert_eq!(info.total_samples, 44100);
    assert_eq!(info.frames, 9);
    assert_eq!(info.file_size, qoa_bytes.len());
    assert_eq!(
        describe(&info),
        "Channels: 1 samplerate: 44100 total samples: 44100"
    );

    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["total_samples"], 44100);
}

#[test]
fn test_validate() {
    let qoa_bytes = encode_from_samples(&sine(22050, 2, 0.5), 22050, 2).unwrap();
    assert!(validate_qoa(&qoa_bytes).unwrap());

    assert!(validate_qoa(b"RIFF0000WAVEfmt ").is_err());
    assert!(validate_qoa(&qoa_bytes[..qoa_bytes.len() - 8]).is_err());
}

#[test]
fn test_direction_detection() {
    let qoa_bytes = encode_from_samples(&[0; 100], 44100, 1).unwrap();
    let wav = write_wav_to_bytes(&[0; 100], 44100, 1).unwrap();

    assert_eq!(Direction::detect(&qoa_bytes), Direction::Decode);
    assert_eq!(Direction::detect(&wav), Direction::Encode);
}

#[test]
fn test_convert_both_ways() {
    let dir = scratch("convert");
    let wav_in = dir.join("in.wav");
    let qoa = dir.join("out.qoa");
    let wav_out = dir.join("back.wav");

    let samples = sine(44100, 2, 0.2);
    std::fs::write(&wav_in, write_wav_to_bytes(&samples, 44100, 2).unwrap()).unwrap();

    let options = EncodeOptions::new();
    assert_eq!(convert_file(&wav_in, &qoa, &options).unwrap(), Direction::Encode);
    assert_eq!(convert_file(&qoa, &wav_out, &options).unwrap(), Direction::Decode);

    let back = std::fs::read(&wav_out).unwrap();
    assert_eq!(back.len(), WAV_HEADER_SIZE + samples.len() * 2);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_refuses_to_overwrite() {
    let dir = scratch("overwrite");
    let input = dir.join("in.wav");
    let output = dir.join("out.qoa");

    std::fs::write(&input, write_wav_to_bytes(&[0; 64], 8000, 1).unwrap()).unwrap();
    std::fs::write(&output, b"keep me").unwrap();

    assert!(convert_file(&input, &output, &EncodeOptions::new()).is_err());
    assert_eq!(std::fs::read(&output).unwrap(), b"keep me");

    let forced = EncodeOptions::new().with_force(true);
    assert!(convert_file(&input, &output, &forced).is_ok());
    assert!(reqoa::check_fourcc(&std::fs::read(&output).unwrap()));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_missing_input() {
    let dir = scratch("missing");
    let r = check_paths(&dir.join("nope.wav"), &dir.join("out.qoa"), &EncodeOptions::new());
    assert!(r.is_err());
    let _ = std::fs::remove_dir_all(&dir);
}
