//! Tick harness: drives a pipeline on a virtual clock and records what it sang.

use crate::config::{PipelineConfig, DEFAULT_TICK_MS};
use crate::error::Result;
use crate::pipeline::{Pipeline, PipelineState};
use crate::sheet::Token;
use std::time::{Duration, Instant};

/// Everything observed over a run.
#[derive(Debug, Default, Clone)]
pub struct Performance {
    /// Popped phoneme symbols, in order.
    pub phonemes: Vec<String>,
    /// Every token produced, in order, across all ticks.
    pub tokens: Vec<Token>,
    /// State after each tick.
    pub states: Vec<PipelineState>,
}

/// Runs a pipeline at a fixed cadence without touching the wall clock.
#[derive(Debug)]
pub struct TickHarness {
    pipeline: Pipeline,
    cadence_ms: u64,
    start: Instant,
    now: Instant,
    frames: u64,
}

impl TickHarness {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Ok(Self::from_pipeline(Pipeline::new(config)?))
    }

    pub fn from_pipeline(pipeline: Pipeline) -> Self {
        let start = Instant::now();
        Self {
            pipeline,
            cadence_ms: DEFAULT_TICK_MS,
            start,
            now: start,
            frames: 0,
        }
    }

    pub fn with_cadence(mut self, cadence_ms: u64) -> Self {
        self.cadence_ms = cadence_ms;
        self
    }

    pub fn pipeline(&mut self) -> &mut Pipeline {
        &mut self.pipeline
    }

    /// Run exactly `ticks` frames.
    pub fn run(&mut self, ticks: usize) -> Performance {
        let mut performance = Performance::default();
        for _ in 0..ticks {
            self.step(&mut performance);
        }
        performance
    }

    /// Run until both queues drain, or `max_ticks` frames have passed.
    pub fn run_until_idle(&mut self, max_ticks: usize) -> Performance {
        let mut performance = Performance::default();
        for _ in 0..max_ticks {
            self.step(&mut performance);
            if self.pipeline.is_idle() {
                break;
            }
        }
        performance
    }

    fn step(&mut self, performance: &mut Performance) {
        self.frames = self.frames.saturating_add(1);
        let offset = Duration::from_millis(self.frames.saturating_mul(self.cadence_ms));
        // Past the end of the representable range the virtual clock stops.
        self.now = self.start.checked_add(offset).unwrap_or(self.now);
        let state = self.pipeline.tick_at(self.cadence_ms, self.now);
        if self.pipeline.produced_tokens() {
            performance
                .tokens
                .extend(self.pipeline.last_tokens().iter().cloned());
        }
        if let Some(symbol) = &state.last_phoneme {
            performance.phonemes.push(symbol.clone());
        }
        performance.states.push(state);
    }
}
