//! Sheet markup tokenizer: keystrokes in, prosody-annotated tokens out.
//!
//! Markup recognised per space-separated group:
//!
//! | markup              | effect                                  |
//! |---------------------|-----------------------------------------|
//! | trailing `...`      | sustain, duration x2                    |
//! | `[word]` or ctrl    | harmony                                 |
//! | `_word_`            | soft emphasis                           |
//! | ALL CAPS / shift    | loud; runs of two or more become shout  |
//!
//! Tokenization is stateless. Each call starts from scratch, so markup split
//! across two chunks is not combined.

use crate::input::{Keystroke, Modifiers};
use crate::invariant_ppt::{assert_invariant, MARKUP_STRIPPED, SHOUT_PROMOTION};

const SUSTAIN_MARK: &str = "...";

/// Emphasis level of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Emphasis {
    #[default]
    None,
    Soft,
    Loud,
    Shout,
}

impl Emphasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emphasis::None => "none",
            Emphasis::Soft => "soft",
            Emphasis::Loud => "loud",
            Emphasis::Shout => "shout",
        }
    }
}

impl std::fmt::Display for Emphasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A parsed prosody unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Display text with markup removed.
    pub text: String,
    pub emphasis: Emphasis,
    pub sustain: bool,
    pub harmony: bool,
    /// Multiplier on the base phoneme duration.
    pub duration_modifier: f32,
}

impl Token {
    /// A plain token with no markup.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: Emphasis::None,
            sustain: false,
            harmony: false,
            duration_modifier: 1.0,
        }
    }

    fn standalone_sustain() -> Self {
        Self {
            text: SUSTAIN_MARK.to_string(),
            emphasis: Emphasis::None,
            sustain: true,
            harmony: false,
            duration_modifier: 2.0,
        }
    }
}

/// Tokenize one chunk of keystrokes.
pub fn tokenize(keys: &[Keystroke]) -> Vec<Token> {
    let mut tokens: Vec<Token> = keys
        .split(|k| k.ch == ' ')
        .filter(|group| !group.is_empty())
        .map(tokenize_group)
        .collect();
    promote_shout(&mut tokens);
    tokens
}

/// Tokenize a plain string, inferring shift from letter case.
pub fn tokenize_text(text: &str) -> Vec<Token> {
    tokenize(&text_to_keystrokes(text))
}

/// Convert a string into keystrokes as if typed on a plain keyboard.
///
/// Shift is set for uppercase letters; ctrl and alt are never set; every
/// timestamp is zero.
pub fn text_to_keystrokes(text: &str) -> Vec<Keystroke> {
    text.chars()
        .map(|ch| Keystroke::new(ch, Modifiers::inferred(ch), 0))
        .collect()
}

fn tokenize_group(group: &[Keystroke]) -> Token {
    let raw: String = group.iter().map(|k| k.ch).collect();
    let mut text = raw.as_str();

    let sustain = match text.strip_suffix(SUSTAIN_MARK) {
        Some("") => return Token::standalone_sustain(),
        Some(rest) => {
            text = rest;
            true
        }
        None => false,
    };

    let mut harmony = false;
    let mut bracketed = false;
    if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        text = inner;
        harmony = true;
        bracketed = true;
    } else if group.iter().any(|k| k.modifiers.ctrl) {
        harmony = true;
    }

    let mut emphasis = Emphasis::None;
    let soft = text.starts_with('_') && text.ends_with('_') && text.chars().count() > 2;
    if soft {
        text = &text[1..text.len() - 1];
        emphasis = Emphasis::Soft;
    } else if is_loud(text, group) {
        // Promoted to shout by the post-pass when it sits in a run.
        emphasis = Emphasis::Loud;
    }

    let stripped = 3 * sustain as usize + 2 * bracketed as usize + 2 * soft as usize;
    assert_invariant(
        MARKUP_STRIPPED,
        text.len() + stripped == raw.len(),
        "markup delimiters not fully stripped",
        Some(&raw),
    );

    Token {
        text: text.to_string(),
        emphasis,
        sustain,
        harmony,
        duration_modifier: if sustain { 2.0 } else { 1.0 },
    }
}

fn is_loud(text: &str, group: &[Keystroke]) -> bool {
    let mut letters = text.chars().filter(|c| c.is_alphabetic()).peekable();
    if letters.peek().is_none() {
        return false;
    }
    if letters.all(|c| c.is_uppercase()) {
        return true;
    }
    let shifted = group
        .iter()
        .any(|k| k.modifiers.shift && k.ch.is_alphabetic());
    shifted && text.chars().any(|c| c.is_alphabetic() && c.is_uppercase())
}

/// Promote every run of two or more consecutive loud tokens to shout.
fn promote_shout(tokens: &mut [Token]) {
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].emphasis != Emphasis::Loud {
            i += 1;
            continue;
        }
        let start = i;
        while i < tokens.len() && tokens[i].emphasis == Emphasis::Loud {
            i += 1;
        }
        if i - start >= 2 {
            for token in &mut tokens[start..i] {
                token.emphasis = Emphasis::Shout;
            }
        }
    }
    assert_invariant(
        SHOUT_PROMOTION,
        tokens
            .windows(2)
            .all(|w| !(w[0].emphasis == Emphasis::Loud && w[1].emphasis == Emphasis::Loud)),
        "adjacent loud tokens survived promotion",
        Some("promote_shout"),
    );
}
