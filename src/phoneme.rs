//! Phoneme expander: tokens in, contiguous timed phoneme events out.
//!
//! Expansion is a pure table lookup. Words found in the lexicon map to their
//! ARPAbet-style symbols; anything else is spelled out one lowercase letter
//! per phoneme. Emphasis drives volume, breathiness, and pitch.

use crate::config::{PhonemeBackend, PipelineConfig};
use crate::error::{PipelineError, Result};
use crate::invariant_ppt::{assert_invariant, BACKEND_SELECTED, EXPANSION_CONTIGUOUS};
use crate::sheet::{Emphasis, Token};
use lazy_static::lazy_static;
use std::collections::HashMap;

/// Major third and fifth above the fundamental.
pub const HARMONY_INTERVALS: [i8; 2] = [4, 7];

lazy_static! {
    static ref LEXICON: HashMap<&'static str, &'static [&'static str]> = {
        let entries: &[(&str, &[&str])] = &[
            ("the", &["dh", "ax"]),
            ("a", &["ax"]),
            ("an", &["ae", "n"]),
            ("and", &["ae", "n", "d"]),
            ("is", &["ih", "z"]),
            ("are", &["aa", "r"]),
            ("was", &["w", "aa", "z"]),
            ("i", &["ay"]),
            ("you", &["y", "uw"]),
            ("it", &["ih", "t"]),
            ("in", &["ih", "n"]),
            ("to", &["t", "uw"]),
            ("of", &["ah", "v"]),
            ("for", &["f", "ao", "r"]),
            ("on", &["aa", "n"]),
            ("with", &["w", "ih", "th"]),
            ("this", &["dh", "ih", "s"]),
            ("that", &["dh", "ae", "t"]),
            ("not", &["n", "aa", "t"]),
            ("but", &["b", "ah", "t"]),
            ("my", &["m", "ay"]),
            ("all", &["ao", "l"]),
            ("so", &["s", "ow"]),
            ("up", &["ah", "p"]),
            ("sun", &["s", "ah", "n"]),
            ("rising", &["r", "ay", "z", "ih", "ng"]),
            ("rises", &["r", "ay", "z", "ih", "z"]),
            ("falling", &["f", "ao", "l", "ih", "ng"]),
            ("down", &["d", "aw", "n"]),
            ("hold", &["hh", "ow", "l", "d"]),
            ("note", &["n", "ow", "t"]),
            ("singing", &["s", "ih", "ng", "ih", "ng"]),
            ("together", &["t", "ax", "g", "eh", "dh", "er"]),
            ("again", &["ax", "g", "eh", "n"]),
            ("hello", &["hh", "ax", "l", "ow"]),
            ("world", &["w", "er", "l", "d"]),
            ("gently", &["jh", "eh", "n", "t", "l", "iy"]),
            ("said", &["s", "eh", "d"]),
            ("stop", &["s", "t", "aa", "p"]),
            ("twinkle", &["t", "w", "ih", "ng", "k", "ax", "l"]),
            ("little", &["l", "ih", "t", "ax", "l"]),
            ("star", &["s", "t", "aa", "r"]),
            ("how", &["hh", "aw"]),
            ("wonder", &["w", "ah", "n", "d", "er"]),
            ("what", &["w", "ah", "t"]),
            ("above", &["ax", "b", "ah", "v"]),
            ("like", &["l", "ay", "k"]),
            ("diamond", &["d", "ay", "ax", "m", "ax", "n", "d"]),
            ("sky", &["s", "k", "ay"]),
        ];
        entries.iter().copied().collect()
    };
}

/// Prosody parameters derived from an emphasis level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prosody {
    pub volume: f32,
    pub breathiness: f32,
    pub pitch_multiplier: f32,
}

impl Prosody {
    pub const fn for_emphasis(emphasis: Emphasis) -> Self {
        match emphasis {
            Emphasis::None => Prosody {
                volume: 0.5,
                breathiness: 0.0,
                pitch_multiplier: 1.0,
            },
            Emphasis::Soft => Prosody {
                volume: 0.3,
                breathiness: 0.6,
                pitch_multiplier: 0.9,
            },
            Emphasis::Loud => Prosody {
                volume: 0.8,
                breathiness: 0.0,
                pitch_multiplier: 1.1,
            },
            Emphasis::Shout => Prosody {
                volume: 1.0,
                breathiness: 0.0,
                pitch_multiplier: 1.2,
            },
        }
    }
}

/// One timed unit of synthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct PhonemeEvent {
    pub phoneme: String,
    /// Offset from the start of the expansion call that produced it.
    pub start_ms: u64,
    pub duration_ms: u32,
    pub volume: f32,
    pub pitch_hz: f32,
    pub vibrato: bool,
    pub breathiness: f32,
    /// Semitone offsets above `pitch_hz`; empty without harmony.
    pub harmony_intervals: Vec<i8>,
}

/// Phoneme symbols for `word`: lexicon hit or letter-by-letter fallback.
pub fn word_to_phonemes(word: &str) -> Vec<String> {
    let key = word.to_lowercase();
    match LEXICON.get(key.as_str()) {
        Some(symbols) => symbols.iter().map(|s| s.to_string()).collect(),
        None => key
            .chars()
            .filter(|c| c.is_alphabetic())
            .map(String::from)
            .collect(),
    }
}

/// Whether `word` has a lexicon entry (case-insensitive).
pub fn in_lexicon(word: &str) -> bool {
    LEXICON.contains_key(word.to_lowercase().as_str())
}

/// Deterministic token to phoneme expander.
#[derive(Debug, Clone)]
pub struct Expander {
    base_pitch_hz: f32,
    base_duration_ms: u32,
}

impl Expander {
    /// Instantiate the selected backend. Only the lexicon backend exists.
    pub fn new(
        backend: &PhonemeBackend,
        base_pitch_hz: f32,
        base_duration_ms: u32,
    ) -> Result<Self> {
        if *backend != PhonemeBackend::Lexicon {
            return Err(PipelineError::BackendUnavailable {
                kind: "phoneme",
                name: backend.name().to_string(),
            });
        }
        if !(base_pitch_hz.is_finite() && base_pitch_hz > 0.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "base pitch must be positive, got {}",
                base_pitch_hz
            )));
        }
        if base_duration_ms == 0 {
            return Err(PipelineError::InvalidConfig(
                "base duration must be greater than zero".to_string(),
            ));
        }
        assert_invariant(
            BACKEND_SELECTED,
            true,
            "lexicon phoneme backend",
            Some("Expander::new"),
        );
        Ok(Self {
            base_pitch_hz,
            base_duration_ms,
        })
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Self::new(
            &config.phoneme_backend,
            config.base_pitch_hz,
            config.base_duration_ms,
        )
    }

    pub fn base_pitch_hz(&self) -> f32 {
        self.base_pitch_hz
    }

    pub fn base_duration_ms(&self) -> u32 {
        self.base_duration_ms
    }

    /// Expand tokens into events laid end to end from offset zero.
    pub fn expand(&self, tokens: &[Token]) -> Vec<PhonemeEvent> {
        let mut events = Vec::new();
        let mut cursor_ms: u64 = 0;

        for token in tokens {
            let prosody = Prosody::for_emphasis(token.emphasis);
            let pitch_hz = self.base_pitch_hz * prosody.pitch_multiplier;
            let duration_ms = (self.base_duration_ms as f32 * token.duration_modifier) as u32;
            let harmony_intervals = if token.harmony {
                HARMONY_INTERVALS.to_vec()
            } else {
                Vec::new()
            };

            for phoneme in word_to_phonemes(&token.text) {
                events.push(PhonemeEvent {
                    phoneme,
                    start_ms: cursor_ms,
                    duration_ms,
                    volume: prosody.volume,
                    pitch_hz,
                    vibrato: token.sustain,
                    breathiness: prosody.breathiness,
                    harmony_intervals: harmony_intervals.clone(),
                });
                cursor_ms += duration_ms as u64;
            }
        }

        assert_invariant(
            EXPANSION_CONTIGUOUS,
            events
                .windows(2)
                .all(|w| w[1].start_ms == w[0].start_ms + w[0].duration_ms as u64),
            "phoneme events overlap or leave gaps",
            Some("expand"),
        );
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::tokenize_text;

    fn expander() -> Expander {
        Expander::new(&PhonemeBackend::Lexicon, 220.0, 100).unwrap()
    }

    #[test]
    fn lexicon_lookup_is_case_insensitive() {
        assert_eq!(word_to_phonemes("SUN"), vec!["s", "ah", "n"]);
        assert!(in_lexicon("Together"));
    }

    #[test]
    fn unknown_word_spells_letters() {
        assert_eq!(word_to_phonemes("Zq-x!"), vec!["z", "q", "x"]);
        assert!(word_to_phonemes("...").is_empty());
    }

    #[test]
    fn sustained_harmony_token() {
        let events = expander().expand(&tokenize_text("[hold...]"));
        // brackets wrap the ellipsis, so the ellipsis is not trailing
        assert!(events.iter().all(|e| !e.vibrato));

        let events = expander().expand(&tokenize_text("[hold]..."));
        assert_eq!(events.len(), 4);
        assert!(events.iter().all(|e| e.vibrato && e.duration_ms == 200));
        assert!(events.iter().all(|e| e.harmony_intervals == vec![4, 7]));
        assert_eq!(events[3].start_ms, 600);
    }

    #[test]
    fn shout_prosody() {
        let events = expander().expand(&tokenize_text("I SAID"));
        assert!(events.iter().all(|e| e.volume == 1.0));
        assert!(events.iter().all(|e| (e.pitch_hz - 264.0).abs() < 1e-3));
    }

    #[test]
    fn soft_prosody() {
        let events = expander().expand(&tokenize_text("_down_"));
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.volume == 0.3 && e.breathiness == 0.6));
        assert!(events.iter().all(|e| (e.pitch_hz - 198.0).abs() < 1e-3));
    }

    #[test]
    fn unimplemented_backends_fail_fast() {
        for backend in [PhonemeBackend::Llama, PhonemeBackend::Claude] {
            assert!(matches!(
                Expander::new(&backend, 220.0, 100),
                Err(PipelineError::BackendUnavailable { kind: "phoneme", .. })
            ));
        }
    }
}
