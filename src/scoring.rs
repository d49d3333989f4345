//! Performance scoring from buffer zones and markup accuracy.
//!
//! Point values come from the [`DifficultySettings`] the tracker was built
//! with; the zone boundaries themselves never change.

use crate::config::{Difficulty, DifficultySettings};
use crate::output::BufferSnapshot;
use crate::sheet::Token;

const EMPHASIS_BONUS: i64 = 50;
const SUSTAIN_BONUS: i64 = 30;
const HARMONY_BONUS: i64 = 20;

const GRADES: [(char, f64); 5] = [
    ('S', 0.90),
    ('A', 0.80),
    ('B', 0.70),
    ('C', 0.60),
    ('D', 0.50),
];

/// Accumulates a session score, one snapshot per tick.
#[derive(Debug, Clone)]
pub struct ScoreTracker {
    rules: DifficultySettings,
    score: i64,
    ticks: u64,
    max_possible: i64,
    token_matches: u64,
    token_total: u64,
}

impl Default for ScoreTracker {
    fn default() -> Self {
        Self::new(&Difficulty::default().settings())
    }
}

impl ScoreTracker {
    pub fn new(rules: &DifficultySettings) -> Self {
        Self {
            rules: *rules,
            score: 0,
            ticks: 0,
            max_possible: 0,
            token_matches: 0,
            token_total: 0,
        }
    }

    pub fn rules(&self) -> &DifficultySettings {
        &self.rules
    }

    pub fn on_tick(&mut self, snapshot: &BufferSnapshot) {
        self.ticks += 1;
        self.max_possible += self.rules.tick_points_optimal;
        self.score += self.rules.tick_points(snapshot.zone);
    }

    /// Compare a typed token with the expected one and award a bonus.
    pub fn on_token(&mut self, token: &Token, expected: &Token) {
        self.token_total += 1;
        let checks = [
            (token.emphasis == expected.emphasis, EMPHASIS_BONUS),
            (token.sustain == expected.sustain, SUSTAIN_BONUS),
            (token.harmony == expected.harmony, HARMONY_BONUS),
        ];
        let earned: i64 = checks
            .iter()
            .filter(|(hit, _)| *hit)
            .map(|(_, bonus)| bonus)
            .sum();
        self.score += (earned as f64 * self.rules.token_bonus_multiplier).round() as i64;
        if checks.iter().all(|(hit, _)| *hit) {
            self.token_matches += 1;
        }
    }

    /// Total score, never negative.
    pub fn score(&self) -> i64 {
        self.score.max(0)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Letter grade from the ratio of raw score to the tick maximum.
    pub fn grade(&self) -> char {
        if self.max_possible <= 0 {
            return 'F';
        }
        let ratio = self.score as f64 / self.max_possible as f64;
        GRADES
            .iter()
            .find(|(_, threshold)| ratio >= *threshold)
            .map(|(letter, _)| *letter)
            .unwrap_or('F')
    }

    /// Fraction of compared tokens that matched on every markup axis.
    pub fn accuracy(&self) -> f64 {
        if self.token_total == 0 {
            return 1.0;
        }
        self.token_matches as f64 / self.token_total as f64
    }

    /// Clear the session, keeping the scoring rules.
    pub fn reset(&mut self) {
        *self = Self::new(&self.rules);
    }
}
