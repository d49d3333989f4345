//! Voice collaborator: turns one phoneme event into PCM.
//!
//! Only the mock sine voice is implemented. It exists so the pipeline has a
//! real consumer for popped events and so performances can be rendered to a
//! WAV file for listening.

use crate::config::VoiceBackend;
use crate::error::{PipelineError, Result};
use crate::invariant_ppt::{assert_invariant, BACKEND_SELECTED};
use crate::phoneme::PhonemeEvent;
use std::f64::consts::PI;
use std::io::{Seek, Write};
use std::path::Path;

pub const SAMPLE_RATE: u32 = 22_050;

const VIBRATO_RATE_HZ: f64 = 5.0;
const VIBRATO_DEPTH_HZ: f64 = 10.0;
const HARMONY_WEIGHT: f64 = 0.5;

/// Capability seam for synthesis backends.
pub trait Synthesizer: Send {
    fn name(&self) -> &'static str;

    /// Render one event as 16-bit little-endian mono PCM at [`SAMPLE_RATE`].
    fn synthesize(&self, event: &PhonemeEvent) -> Vec<u8>;
}

impl std::fmt::Debug for dyn Synthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Synthesizer({})", self.name())
    }
}

/// Instantiate the configured backend, failing fast on unimplemented ones.
pub fn voice_for(backend: &VoiceBackend) -> Result<Box<dyn Synthesizer>> {
    match backend {
        VoiceBackend::Mock => {
            assert_invariant(
                BACKEND_SELECTED,
                true,
                "mock voice backend",
                Some("voice_for"),
            );
            Ok(Box::new(MockVoice))
        }
        VoiceBackend::Espeak | VoiceBackend::Coqui => Err(PipelineError::BackendUnavailable {
            kind: "voice",
            name: backend.name().to_string(),
        }),
    }
}

/// Sine voice with vibrato and harmony partials.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockVoice;

impl MockVoice {
    /// Samples for one event: `floor(SAMPLE_RATE * duration / 1000)` of them.
    pub fn samples(&self, event: &PhonemeEvent) -> Vec<i16> {
        let count = (SAMPLE_RATE as u64 * event.duration_ms as u64 / 1000) as usize;
        let volume = event.volume as f64;
        let harmonies = &event.harmony_intervals;
        let norm = 1.0 + HARMONY_WEIGHT * harmonies.len() as f64;

        (0..count)
            .map(|i| {
                let t = i as f64 / SAMPLE_RATE as f64;
                let mut freq = event.pitch_hz as f64;
                if event.vibrato {
                    freq += VIBRATO_DEPTH_HZ * (2.0 * PI * VIBRATO_RATE_HZ * t).sin();
                }
                let mut value = (2.0 * PI * freq * t).sin();
                for &interval in harmonies {
                    let partial = freq * 2f64.powf(interval as f64 / 12.0);
                    value += HARMONY_WEIGHT * (2.0 * PI * partial * t).sin();
                }
                if !harmonies.is_empty() {
                    value /= norm;
                }
                let scaled = (value * volume * 32767.0) as i64;
                scaled.clamp(i16::MIN as i64, i16::MAX as i64) as i16
            })
            .collect()
    }
}

impl Synthesizer for MockVoice {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn synthesize(&self, event: &PhonemeEvent) -> Vec<u8> {
        self.samples(event)
            .into_iter()
            .flat_map(i16::to_le_bytes)
            .collect()
    }
}

/// Render events back to back into a mono 16-bit WAV stream.
///
/// Events are concatenated in order; `start_ms` is not used for placement.
pub fn render_wav<W: Write + Seek>(events: &[PhonemeEvent], writer: W) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut wav = hound::WavWriter::new(writer, spec)?;
    let voice = MockVoice;
    for event in events {
        for sample in voice.samples(event) {
            wav.write_sample(sample)?;
        }
    }
    wav.finalize()?;
    Ok(())
}

/// [`render_wav`] into a file at `path`.
pub fn render_wav_file(events: &[PhonemeEvent], path: impl AsRef<Path>) -> Result<()> {
    let file = std::io::BufWriter::new(std::fs::File::create(path)?);
    render_wav(events, file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(duration_ms: u32) -> PhonemeEvent {
        PhonemeEvent {
            phoneme: "ah".to_string(),
            start_ms: 0,
            duration_ms,
            volume: 1.0,
            pitch_hz: 220.0,
            vibrato: true,
            breathiness: 0.0,
            harmony_intervals: vec![4, 7],
        }
    }

    #[test]
    fn voice_sample_count_follows_duration() {
        assert_eq!(MockVoice.samples(&event(100)).len(), 2205);
        assert_eq!(MockVoice.synthesize(&event(100)).len(), 4410);
        assert!(MockVoice.synthesize(&event(0)).is_empty());
    }

    #[test]
    fn voice_starts_at_zero_crossing() {
        assert_eq!(MockVoice.samples(&event(10))[0], 0);
    }

    #[test]
    fn voice_is_deterministic() {
        assert_eq!(
            MockVoice.synthesize(&event(50)),
            MockVoice.synthesize(&event(50))
        );
    }

    #[test]
    fn unimplemented_voices_fail_fast() {
        assert!(voice_for(&VoiceBackend::Mock).is_ok());
        assert!(matches!(
            voice_for(&VoiceBackend::Coqui),
            Err(PipelineError::BackendUnavailable { kind: "voice", .. })
        ));
    }
}
