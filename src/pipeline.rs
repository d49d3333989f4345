//! Pipeline orchestrator: the frame-stepped engine.
//!
//! `feed` only buffers. All processing happens in [`Pipeline::tick`], which
//! an external driver calls on a fixed cadence. Each tick drains one chunk of
//! keystrokes and pops exactly one phoneme event, however full the output
//! queue is.

use crate::config::{PipelineConfig, DEFAULT_TICK_MS};
use crate::error::Result;
use crate::input::{InputQueue, Modifiers};
use crate::invariant_ppt::{assert_invariant, TICK_SINGLE_POP};
use crate::output::{BufferSnapshot, OutputQueue, Zone};
use crate::phoneme::{Expander, PhonemeEvent};
use crate::scoring::ScoreTracker;
use crate::sheet::{tokenize, Token};
use crate::voice::{voice_for, Synthesizer};
use std::time::Instant;

/// Combined state reported after every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineState {
    pub input_level: f64,
    pub input_size: usize,
    pub output: BufferSnapshot,
    pub output_size: usize,
    /// Texts of the most recent non-empty token batch.
    pub last_tokens: Vec<String>,
    /// Symbol popped by the latest tick, `None` when the queue was starved.
    pub last_phoneme: Option<String>,
    /// Ticks executed so far.
    pub frame: u64,
    /// Sum of `elapsed_ms` over all ticks.
    pub clock_ms: u64,
    /// Byte length of the audio synthesized for `last_phoneme`.
    pub last_audio_bytes: usize,
}

impl PipelineState {
    pub fn zone(&self) -> Zone {
        self.output.zone
    }
}

/// The vocal typing pipeline.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    input: InputQueue,
    output: OutputQueue,
    expander: Expander,
    voice: Box<dyn Synthesizer>,
    scorer: ScoreTracker,
    last_tokens: Vec<Token>,
    last_phoneme: Option<PhonemeEvent>,
    last_audio: Vec<u8>,
    last_zone: Option<Zone>,
    fresh_tokens: bool,
    frame: u64,
    clock_ms: u64,
}

impl Pipeline {
    /// Build a pipeline, rejecting contract violations up front.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let input = InputQueue::new(config.input_capacity)?;
        let output = OutputQueue::new(config.output_capacity)?;
        let expander = Expander::from_config(&config)?;
        let voice = voice_for(&config.voice_backend)?;
        let scorer = ScoreTracker::new(&config.difficulty.settings());
        tracing::debug!(
            input_capacity = config.input_capacity,
            output_capacity = config.output_capacity,
            chunk_size = config.chunk_size,
            phoneme_backend = config.phoneme_backend.name(),
            voice_backend = voice.name(),
            hardware = config.hardware.name(),
            difficulty = config.difficulty.settings().name,
            "pipeline created"
        );
        Ok(Self {
            config,
            input,
            output,
            expander,
            voice,
            scorer,
            last_tokens: Vec::new(),
            last_phoneme: None,
            last_audio: Vec::new(),
            last_zone: None,
            fresh_tokens: false,
            frame: 0,
            clock_ms: 0,
        })
    }

    /// Pipeline with the default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(PipelineConfig::default())
    }

    /// Buffer one keystroke. Never triggers processing.
    pub fn feed(&mut self, ch: char, modifiers: Modifiers) {
        self.input.push(ch, modifiers);
    }

    /// Buffer a whole string, with shift inferred from letter case.
    pub fn feed_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.input.push(ch, Modifiers::inferred(ch));
        }
    }

    /// Advance one frame at the default cadence.
    pub fn tick_default(&mut self) -> PipelineState {
        self.tick(DEFAULT_TICK_MS)
    }

    /// Advance one frame.
    pub fn tick(&mut self, elapsed_ms: u64) -> PipelineState {
        self.tick_at(elapsed_ms, Instant::now())
    }

    /// [`tick`](Pipeline::tick) with an explicit timestamp for the rate windows.
    pub fn tick_at(&mut self, elapsed_ms: u64, now: Instant) -> PipelineState {
        self.frame = self.frame.saturating_add(1);
        self.clock_ms = self.clock_ms.saturating_add(elapsed_ms);

        let keys = self.input.consume(self.config.chunk_size);
        let tokens = tokenize(&keys);

        let before = self.output.size();
        let mut accepted = 0;
        self.fresh_tokens = !tokens.is_empty();
        if self.fresh_tokens {
            let events = self.expander.expand(&tokens);
            accepted = self.output.push_at(events, now);
            self.last_tokens = tokens;
        }

        self.last_phoneme = self.output.pop_at(now);
        let popped = self.last_phoneme.is_some() as usize;
        assert_invariant(
            TICK_SINGLE_POP,
            self.output.size() + popped == before + accepted,
            "tick must pop at most one event",
            Some("tick"),
        );

        self.last_audio = match &self.last_phoneme {
            Some(event) => self.voice.synthesize(event),
            None => Vec::new(),
        };

        let state = self.state_at(now);
        self.scorer.on_tick(&state.output);
        if self.last_zone != Some(state.output.zone) {
            tracing::debug!(
                frame = self.frame,
                zone = state.output.zone.as_str(),
                level = state.output.level,
                "output zone changed"
            );
            self.last_zone = Some(state.output.zone);
        }
        state
    }

    /// Report the current state without processing.
    pub fn state(&mut self) -> PipelineState {
        self.state_at(Instant::now())
    }

    fn state_at(&mut self, now: Instant) -> PipelineState {
        PipelineState {
            input_level: self.input.level(),
            input_size: self.input.size(),
            output: self.output.snapshot_at(now),
            output_size: self.output.size(),
            last_tokens: self.last_tokens.iter().map(|t| t.text.clone()).collect(),
            last_phoneme: self.last_phoneme.as_ref().map(|e| e.phoneme.clone()),
            frame: self.frame,
            clock_ms: self.clock_ms,
            last_audio_bytes: self.last_audio.len(),
        }
    }

    /// Output queue snapshot, as polled by a scoring collaborator.
    pub fn output_snapshot(&mut self) -> BufferSnapshot {
        self.output.snapshot()
    }

    /// Full tokens of the most recent non-empty batch.
    pub fn last_tokens(&self) -> &[Token] {
        &self.last_tokens
    }

    /// Whether the latest tick tokenized anything.
    pub fn produced_tokens(&self) -> bool {
        self.fresh_tokens
    }

    /// Event popped by the latest tick.
    pub fn last_event(&self) -> Option<&PhonemeEvent> {
        self.last_phoneme.as_ref()
    }

    /// PCM synthesized for the latest popped event.
    pub fn last_audio(&self) -> &[u8] {
        &self.last_audio
    }

    pub fn scorer(&self) -> &ScoreTracker {
        &self.scorer
    }

    pub fn scorer_mut(&mut self) -> &mut ScoreTracker {
        &mut self.scorer
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn input(&self) -> &InputQueue {
        &self.input
    }

    pub fn output(&self) -> &OutputQueue {
        &self.output
    }

    /// True when both queues are empty.
    pub fn is_idle(&self) -> bool {
        self.input.is_empty() && self.output.is_empty()
    }
}
