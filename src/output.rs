//! Rate-tracked output queue of phoneme events.
//!
//! The fill level is the backpressure signal. It is reported as a [`Zone`]:
//! underflow means the voice is about to starve, overflow means the player is
//! typing faster than the voice can sing. Pushes beyond capacity are dropped
//! without error; the next snapshot's zone is the only feedback the producer
//! gets.

use crate::error::{PipelineError, Result};
use crate::invariant_ppt::{
    assert_invariant, LEVEL_IN_RANGE, OUTPUT_BOUNDED, RATE_WINDOW_PRUNED,
};
use crate::phoneme::PhonemeEvent;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Levels strictly below this are underflow.
pub const UNDERFLOW_BELOW: f64 = 0.2;
/// Levels strictly above this are overflow.
pub const OVERFLOW_ABOVE: f64 = 0.8;
/// Trailing window used for fill and drain rates.
pub const RATE_WINDOW: Duration = Duration::from_secs(2);

/// Quality classification of the output fill level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Underflow,
    Optimal,
    Overflow,
}

impl Zone {
    /// Classify a fill level. Both boundaries belong to `Optimal`.
    pub fn from_level(level: f64) -> Self {
        if level < UNDERFLOW_BELOW {
            Zone::Underflow
        } else if level > OVERFLOW_ABOVE {
            Zone::Overflow
        } else {
            Zone::Optimal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Underflow => "underflow",
            Zone::Optimal => "optimal",
            Zone::Overflow => "overflow",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Point-in-time view of the output queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferSnapshot {
    /// `size / capacity`, in `[0, 1]`.
    pub level: f64,
    pub zone: Zone,
    /// Events pushed per second over the trailing window.
    pub fill_rate: f64,
    /// Events popped per second over the trailing window.
    pub drain_rate: f64,
}

/// Sliding window of event timestamps.
///
/// The rate divides the surviving count by the span from the oldest
/// surviving timestamp to `now`, not by the window width. A lone surviving
/// sample reports 1 event/s however old it is within the window.
#[derive(Debug, Clone)]
pub struct RateWindow {
    window: Duration,
    stamps: VecDeque<Instant>,
}

impl RateWindow {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            stamps: VecDeque::new(),
        }
    }

    pub fn record(&mut self, at: Instant) {
        self.stamps.push_back(at);
    }

    /// Drop stamps older than the window, then compute events per second.
    pub fn rate_at(&mut self, now: Instant) -> f64 {
        if let Some(cutoff) = now.checked_sub(self.window) {
            while self.stamps.front().is_some_and(|&t| t < cutoff) {
                self.stamps.pop_front();
            }
            assert_invariant(
                RATE_WINDOW_PRUNED,
                self.stamps.iter().all(|&t| t >= cutoff),
                "stale timestamps survived pruning",
                Some("rate_at"),
            );
        }
        let Some(&oldest) = self.stamps.front() else {
            return 0.0;
        };
        let count = self.stamps.len() as f64;
        let span = now.saturating_duration_since(oldest).as_secs_f64();
        if self.stamps.len() == 1 || span <= 0.0 {
            return count;
        }
        count / span
    }

    /// Stamps currently retained (pruning only happens in [`rate_at`]).
    ///
    /// [`rate_at`]: RateWindow::rate_at
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    pub fn clear(&mut self) {
        self.stamps.clear();
    }
}

/// Bounded FIFO of phoneme events with fill/drain rate tracking.
#[derive(Debug)]
pub struct OutputQueue {
    capacity: usize,
    events: VecDeque<PhonemeEvent>,
    pushes: RateWindow,
    pops: RateWindow,
    discarded: u64,
}

impl OutputQueue {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(PipelineError::ZeroCapacity { queue: "output" });
        }
        Ok(Self {
            capacity,
            events: VecDeque::with_capacity(capacity),
            pushes: RateWindow::new(RATE_WINDOW),
            pops: RateWindow::new(RATE_WINDOW),
            discarded: 0,
        })
    }

    /// Enqueue as many events as fit; returns how many were accepted.
    pub fn push<I>(&mut self, events: I) -> usize
    where
        I: IntoIterator<Item = PhonemeEvent>,
    {
        self.push_at(events, Instant::now())
    }

    /// [`push`](OutputQueue::push) with an explicit timestamp.
    pub fn push_at<I>(&mut self, events: I, now: Instant) -> usize
    where
        I: IntoIterator<Item = PhonemeEvent>,
    {
        let mut accepted = 0;
        let mut dropped = 0u64;
        for event in events {
            if self.events.len() < self.capacity {
                self.events.push_back(event);
                self.pushes.record(now);
                accepted += 1;
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            self.discarded += dropped;
            tracing::trace!(
                dropped,
                total = self.discarded,
                "output queue full, discarded events"
            );
        }
        assert_invariant(
            OUTPUT_BOUNDED,
            self.events.len() <= self.capacity,
            "output queue grew past capacity",
            Some("push"),
        );
        accepted
    }

    /// Remove the oldest event, or `None` when starved.
    pub fn pop(&mut self) -> Option<PhonemeEvent> {
        self.pop_at(Instant::now())
    }

    /// [`pop`](OutputQueue::pop) with an explicit timestamp.
    pub fn pop_at(&mut self, now: Instant) -> Option<PhonemeEvent> {
        let event = self.events.pop_front()?;
        self.pops.record(now);
        Some(event)
    }

    pub fn snapshot(&mut self) -> BufferSnapshot {
        self.snapshot_at(Instant::now())
    }

    /// Snapshot as seen at `now`. Prunes both rate windows.
    pub fn snapshot_at(&mut self, now: Instant) -> BufferSnapshot {
        let level = self.level();
        assert_invariant(
            LEVEL_IN_RANGE,
            (0.0..=1.0).contains(&level),
            "output level out of range",
            Some("snapshot"),
        );
        BufferSnapshot {
            level,
            zone: Zone::from_level(level),
            fill_rate: self.pushes.rate_at(now),
            drain_rate: self.pops.rate_at(now),
        }
    }

    pub fn level(&self) -> f64 {
        self.events.len() as f64 / self.capacity as f64
    }

    pub fn size(&self) -> usize {
        self.events.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Total events dropped by overflow since creation.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Drop queued events. Rate history is kept.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
