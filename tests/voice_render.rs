use sheetvox::phoneme::Expander;
use sheetvox::sheet::tokenize_text;
use sheetvox::voice::{render_wav, render_wav_file, voice_for, MockVoice, SAMPLE_RATE};
use std::io::Cursor;

fn events(text: &str) -> Vec<sheetvox::PhonemeEvent> {
    Expander::new(&Default::default(), 220.0, 100)
        .unwrap()
        .expand(&tokenize_text(text))
}

#[test]
fn render_wav_file_round_trips_through_hound() {
    let events = events("hello SUN...");
    let expected: usize = events
        .iter()
        .map(|e| (SAMPLE_RATE as u64 * e.duration_ms as u64 / 1000) as usize)
        .sum();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("performance.wav");
    render_wav_file(&events, &path).unwrap();

    let mut reader = hound::WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, hound::SampleFormat::Int);
    assert_eq!(reader.len() as usize, expected);

    let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    let direct: Vec<i16> = events.iter().flat_map(|e| MockVoice.samples(e)).collect();
    assert_eq!(samples, direct);
}

#[test]
fn render_wav_in_memory() {
    let mut buffer = Cursor::new(Vec::new());
    render_wav(&events("sky"), &mut buffer).unwrap();
    buffer.set_position(0);
    let reader = hound::WavReader::new(buffer).unwrap();
    // three phonemes at 100 ms each
    assert_eq!(reader.len(), 3 * 2205);
}

#[test]
fn render_empty_performance_is_valid_wav() {
    let mut buffer = Cursor::new(Vec::new());
    render_wav(&[], &mut buffer).unwrap();
    buffer.set_position(0);
    let reader = hound::WavReader::new(buffer).unwrap();
    assert_eq!(reader.len(), 0);
}

#[test]
fn render_into_missing_directory_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.wav");
    let err = render_wav_file(&events("sky"), &path).unwrap_err();
    assert!(matches!(err, sheetvox::PipelineError::Io(_)));
}

#[test]
fn louder_events_have_more_energy() {
    let loud = events("SKY");
    let soft = events("_sky_");
    let energy = |pcm: Vec<i16>| pcm.iter().map(|&s| (s as i64).abs()).sum::<i64>();
    let voice = voice_for(&Default::default()).unwrap();
    assert_eq!(voice.name(), "mock");
    let loud_energy = energy(MockVoice.samples(&loud[0]));
    assert!(loud_energy > energy(MockVoice.samples(&soft[0])));
    assert_eq!(voice.synthesize(&loud[0]).len(), 2 * 2205);
}
