//! Pipeline configuration: queue sizes, cadence, prosody bases, backends.
//!
//! Configuration is plain data. It can be built in code, or loaded from TOML:
//!
//! ```toml
//! input_capacity = 256
//! output_capacity = 128
//! chunk_size = 8
//! phoneme_backend = "lexicon"
//! voice_backend = "mock"
//! hardware = "desktop_gpu"
//! difficulty = "hard"
//! ```
//!
//! `difficulty` picks the scoring rules. [`PipelineConfig::for_difficulty`]
//! and [`PipelineConfig::for_hardware`] also apply the preset queue sizes.

use crate::error::{PipelineError, Result};
use crate::invariant_ppt::{assert_invariant, CONFIG_VALID};
use crate::output::Zone;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default cadence for [`crate::pipeline::Pipeline::tick_default`].
pub const DEFAULT_TICK_MS: u64 = 33;

/// Hardware profile; decides the latency budget and the suggested difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardwareProfile {
    #[default]
    LaptopCpu,
    DesktopGpu,
    ServerGpu,
    CloudApi,
}

/// Difficulty level. Selects a [`DifficultySettings`] preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    pub fn settings(&self) -> DifficultySettings {
        match self {
            Difficulty::Easy => DifficultySettings::EASY,
            Difficulty::Medium => DifficultySettings::MEDIUM,
            Difficulty::Hard => DifficultySettings::HARD,
            Difficulty::Expert => DifficultySettings::EXPERT,
        }
    }
}

/// Queue sizes and scoring rules for one difficulty level.
///
/// Zone thresholds are not part of a preset; every level uses the fixed
/// 0.2 / 0.8 boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultySettings {
    pub name: &'static str,
    pub input_capacity: usize,
    pub output_capacity: usize,
    pub tick_points_optimal: i64,
    pub tick_points_underflow: i64,
    pub tick_points_overflow: i64,
    /// Scales the per-token markup bonuses.
    pub token_bonus_multiplier: f64,
}

impl DifficultySettings {
    pub const EASY: DifficultySettings = DifficultySettings {
        name: "Easy",
        input_capacity: 512,
        output_capacity: 256,
        tick_points_optimal: 10,
        tick_points_underflow: -2,
        tick_points_overflow: -1,
        token_bonus_multiplier: 1.0,
    };

    pub const MEDIUM: DifficultySettings = DifficultySettings {
        name: "Medium",
        input_capacity: 256,
        output_capacity: 128,
        tick_points_optimal: 10,
        tick_points_underflow: -5,
        tick_points_overflow: -3,
        token_bonus_multiplier: 1.5,
    };

    pub const HARD: DifficultySettings = DifficultySettings {
        name: "Hard",
        input_capacity: 128,
        output_capacity: 64,
        tick_points_optimal: 15,
        tick_points_underflow: -10,
        tick_points_overflow: -7,
        token_bonus_multiplier: 2.0,
    };

    pub const EXPERT: DifficultySettings = DifficultySettings {
        name: "Expert",
        input_capacity: 64,
        output_capacity: 32,
        tick_points_optimal: 20,
        tick_points_underflow: -15,
        tick_points_overflow: -12,
        token_bonus_multiplier: 3.0,
    };

    /// Points for one tick spent in `zone`.
    pub fn tick_points(&self, zone: Zone) -> i64 {
        match zone {
            Zone::Optimal => self.tick_points_optimal,
            Zone::Underflow => self.tick_points_underflow,
            Zone::Overflow => self.tick_points_overflow,
        }
    }
}

impl HardwareProfile {
    pub fn name(&self) -> &'static str {
        match self {
            HardwareProfile::LaptopCpu => "Laptop (CPU)",
            HardwareProfile::DesktopGpu => "Desktop (GPU)",
            HardwareProfile::ServerGpu => "Server (GPU)",
            HardwareProfile::CloudApi => "Cloud API",
        }
    }

    /// End-to-end latency of the profile in milliseconds.
    pub fn total_latency_ms(&self) -> u64 {
        match self {
            HardwareProfile::LaptopCpu => 800,
            HardwareProfile::DesktopGpu => 200,
            HardwareProfile::ServerGpu => 80,
            HardwareProfile::CloudApi => 150,
        }
    }

    /// Seconds of output the player is expected to keep buffered.
    pub fn buffer_window_s(&self) -> f32 {
        match self {
            HardwareProfile::LaptopCpu => 5.0,
            HardwareProfile::DesktopGpu => 2.0,
            HardwareProfile::ServerGpu => 1.0,
            HardwareProfile::CloudApi => 2.5,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        match self {
            HardwareProfile::LaptopCpu => Difficulty::Easy,
            HardwareProfile::DesktopGpu | HardwareProfile::CloudApi => Difficulty::Medium,
            HardwareProfile::ServerGpu => Difficulty::Hard,
        }
    }
}

/// Phoneme expansion backends. Only `Lexicon` is implemented.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhonemeBackend {
    #[default]
    Lexicon,
    Llama,
    Claude,
}

impl PhonemeBackend {
    pub fn name(&self) -> &'static str {
        match self {
            PhonemeBackend::Lexicon => "lexicon",
            PhonemeBackend::Llama => "llama",
            PhonemeBackend::Claude => "claude",
        }
    }
}

/// Voice (synthesis) backends. Only `Mock` is implemented.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceBackend {
    #[default]
    Mock,
    Espeak,
    Coqui,
}

impl VoiceBackend {
    pub fn name(&self) -> &'static str {
        match self {
            VoiceBackend::Mock => "mock",
            VoiceBackend::Espeak => "espeak",
            VoiceBackend::Coqui => "coqui",
        }
    }
}

/// Top-level configuration for one pipeline instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum buffered keystrokes.
    pub input_capacity: usize,
    /// Maximum buffered phoneme events.
    pub output_capacity: usize,
    /// Keystrokes drained per tick.
    pub chunk_size: usize,
    pub base_pitch_hz: f32,
    pub base_duration_ms: u32,
    pub phoneme_backend: PhonemeBackend,
    pub voice_backend: VoiceBackend,
    pub hardware: HardwareProfile,
    /// Scoring rules; see [`DifficultySettings`].
    pub difficulty: Difficulty,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_capacity: 256,
            output_capacity: 128,
            chunk_size: 8,
            base_pitch_hz: 220.0,
            base_duration_ms: 100,
            phoneme_backend: PhonemeBackend::default(),
            voice_backend: VoiceBackend::default(),
            hardware: HardwareProfile::default(),
            difficulty: Difficulty::default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults with the queue sizes and scoring of a difficulty preset.
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let preset = difficulty.settings();
        Self {
            input_capacity: preset.input_capacity,
            output_capacity: preset.output_capacity,
            difficulty,
            ..Self::default()
        }
    }

    /// Defaults for a hardware profile, at the difficulty it suggests.
    pub fn for_hardware(hardware: HardwareProfile) -> Self {
        Self {
            hardware,
            ..Self::for_difficulty(hardware.difficulty())
        }
    }

    /// Parse a configuration from TOML text. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject values that would violate a construction contract.
    ///
    /// Backend availability is not checked here; it is checked when the
    /// backend is instantiated.
    pub fn validate(&self) -> Result<()> {
        if self.input_capacity == 0 {
            return Err(PipelineError::ZeroCapacity { queue: "input" });
        }
        if self.output_capacity == 0 {
            return Err(PipelineError::ZeroCapacity { queue: "output" });
        }
        if self.chunk_size == 0 {
            return Err(PipelineError::InvalidConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if !(self.base_pitch_hz.is_finite() && self.base_pitch_hz > 0.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "base_pitch_hz must be positive, got {}",
                self.base_pitch_hz
            )));
        }
        if self.base_duration_ms == 0 {
            return Err(PipelineError::InvalidConfig(
                "base_duration_ms must be greater than zero".to_string(),
            ));
        }
        assert_invariant(
            CONFIG_VALID,
            true,
            "configuration validated",
            Some("validate"),
        );
        Ok(())
    }
}
