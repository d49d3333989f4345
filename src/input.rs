//! Input queue: bounded FIFO of keystrokes awaiting tokenization.
//!
//! When full, pushing evicts the oldest keystroke. This is the same lossy
//! policy a hardware keyboard buffer applies; producers are never blocked.

use crate::error::{PipelineError, Result};
use crate::invariant_ppt::{assert_invariant, INPUT_BOUNDED};
use std::collections::VecDeque;
use std::time::Instant;

/// Modifier keys held while a character was typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    /// Modifiers implied by typing `ch` on a plain keyboard.
    pub fn inferred(ch: char) -> Self {
        Self {
            shift: ch.is_uppercase(),
            ..Self::NONE
        }
    }
}

/// One buffered keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keystroke {
    pub ch: char,
    pub modifiers: Modifiers,
    /// Milliseconds since the owning queue was created.
    pub timestamp_ms: u64,
}

impl Keystroke {
    pub fn new(ch: char, modifiers: Modifiers, timestamp_ms: u64) -> Self {
        Self {
            ch,
            modifiers,
            timestamp_ms,
        }
    }
}

/// Bounded keystroke FIFO.
#[derive(Debug)]
pub struct InputQueue {
    capacity: usize,
    items: VecDeque<Keystroke>,
    epoch: Instant,
    evicted: u64,
}

impl InputQueue {
    /// Create a queue holding at most `capacity` keystrokes.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(PipelineError::ZeroCapacity { queue: "input" });
        }
        Ok(Self {
            capacity,
            items: VecDeque::with_capacity(capacity),
            epoch: Instant::now(),
            evicted: 0,
        })
    }

    /// Append a keystroke stamped with the current monotonic time.
    pub fn push(&mut self, ch: char, modifiers: Modifiers) {
        let timestamp_ms = self.epoch.elapsed().as_millis() as u64;
        if self.items.len() == self.capacity {
            self.items.pop_front();
            self.evicted += 1;
            tracing::trace!(
                evicted = self.evicted,
                "input queue full, dropped oldest keystroke"
            );
        }
        self.items.push_back(Keystroke::new(ch, modifiers, timestamp_ms));
        assert_invariant(
            INPUT_BOUNDED,
            self.items.len() <= self.capacity,
            "input queue grew past capacity",
            Some("push"),
        );
    }

    /// Remove and return up to `n` oldest keystrokes, in arrival order.
    pub fn consume(&mut self, n: usize) -> Vec<Keystroke> {
        let take = n.min(self.items.len());
        self.items.drain(..take).collect()
    }

    /// Look at up to `n` oldest keystrokes without removing them.
    pub fn peek(&self, n: usize) -> impl Iterator<Item = &Keystroke> + '_ {
        self.items.iter().take(n)
    }

    /// Fill ratio in `[0, 1]`.
    pub fn level(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.items.len() as f64 / self.capacity as f64
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total keystrokes dropped by overflow since creation.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
