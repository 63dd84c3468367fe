//! Serializable configuration for stages, populations and their scales.

use crate::Rgb;
use crate::cell::Motion;
use crate::population::PopulationError;
use crate::stage::StageError;
use serde::{Deserialize, Serialize};

/// Widest lattice whose coordinates keep collision keys unique.
pub const MAX_LATTICE_SIZE: usize = 100;

/// Scale requested by a population; the lattice size comes from the stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScaleConfig {
    /// Table label, matched case-sensitively; unknown labels play `MAJOR`.
    #[serde(default = "ScaleConfig::default_name")]
    pub name: String,
    /// Root pitch as a MIDI note number.
    #[serde(default = "ScaleConfig::default_base_pitch")]
    pub base_pitch: i32,
}

impl ScaleConfig {
    fn default_name() -> String {
        "MAJOR".to_string()
    }
    fn default_base_pitch() -> i32 {
        crate::scale::DEFAULT_BASE_PITCH
    }

    #[must_use]
    pub fn new(name: impl Into<String>, base_pitch: i32) -> Self {
        Self {
            name: name.into(),
            base_pitch,
        }
    }
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            base_pitch: Self::default_base_pitch(),
        }
    }
}

/// Construction-time settings of one population.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PopulationConfig {
    /// Name used to route emitted notes.
    pub name: String,
    /// Maximum number of cells alive at once.
    pub max_population: usize,
    /// Lattice crossings before the first birth.
    #[serde(default)]
    pub first_birth_delay: u32,
    /// Lattice crossings between births.
    pub birth_rate: u32,
    /// Direction given to every newborn cell.
    #[serde(default)]
    pub motion: Motion,
    /// Base color; drawn at random when absent.
    #[serde(default)]
    pub color: Option<Rgb>,
    /// Pitch range; the default `MAJOR` range at 60 is used when absent.
    #[serde(default)]
    pub scale: Option<ScaleConfig>,
}

impl PopulationConfig {
    /// Validates the values the population relies on.
    pub fn validate(&self) -> Result<(), PopulationError> {
        if self.name.is_empty() {
            return Err(PopulationError::InvalidConfig(
                "population name must not be empty",
            ));
        }
        if self.max_population == 0 {
            return Err(PopulationError::InvalidConfig(
                "max_population must be positive",
            ));
        }
        if self.birth_rate == 0 {
            return Err(PopulationError::InvalidConfig("birth_rate must be positive"));
        }
        Ok(())
    }
}

/// Static configuration for a stage and the populations playing on it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageConfig {
    /// Cells per side of the square lattice.
    #[serde(default = "StageConfig::default_size")]
    pub size: usize,
    /// Optional RNG seed for reproducible performances.
    #[serde(default)]
    pub rng_seed: Option<u64>,
    /// Musical tempo; the tick cadence is this multiplied by `size - 1`.
    #[serde(default = "StageConfig::default_tempo_bpm")]
    pub tempo_bpm: u32,
    /// Maximum number of recent tick summaries retained in-memory.
    #[serde(default = "StageConfig::default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default)]
    pub populations: Vec<PopulationConfig>,
}

impl StageConfig {
    fn default_size() -> usize {
        8
    }
    fn default_tempo_bpm() -> u32 {
        40
    }
    fn default_history_capacity() -> usize {
        256
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), StageError> {
        if self.size < 2 {
            return Err(StageError::InvalidConfig("size must be at least 2"));
        }
        if self.size > MAX_LATTICE_SIZE {
            return Err(StageError::InvalidConfig(
                "size must not exceed 100 cells per side",
            ));
        }
        if self.tempo_bpm == 0 {
            return Err(StageError::InvalidConfig("tempo_bpm must be positive"));
        }
        for (idx, population) in self.populations.iter().enumerate() {
            population.validate()?;
            if self.populations[..idx]
                .iter()
                .any(|other| other.name == population.name)
            {
                return Err(StageError::InvalidConfig(
                    "population names must be unique",
                ));
            }
        }
        Ok(())
    }

    /// Milliseconds between two ticks.
    #[must_use]
    pub fn tick_interval_ms(&self) -> f64 {
        let span = self.size.saturating_sub(1).max(1) as f64;
        let ticks_per_minute = f64::from(self.tempo_bpm) * span;
        60_000.0 / ticks_per_minute
    }
}

impl Default for StageConfig {
    /// An 8x8 stage with a xylophone and a bass.
    fn default() -> Self {
        Self {
            size: Self::default_size(),
            rng_seed: Some(3578),
            tempo_bpm: Self::default_tempo_bpm(),
            history_capacity: Self::default_history_capacity(),
            populations: vec![
                PopulationConfig {
                    name: "xylophone".to_string(),
                    max_population: 6,
                    first_birth_delay: 0,
                    birth_rate: 6,
                    motion: Motion::Right,
                    color: None,
                    scale: Some(ScaleConfig::new("MAJOR PENTATONIC", 60)),
                },
                PopulationConfig {
                    name: "bass".to_string(),
                    max_population: 2,
                    first_birth_delay: 0,
                    birth_rate: 20,
                    motion: Motion::Up,
                    color: None,
                    scale: Some(ScaleConfig::new("IONIAN", 43)),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = StageConfig::default();
        config.validate().expect("valid");
        assert_eq!(config.populations.len(), 2);
        assert!((config.tick_interval_ms() - 60_000.0 / 280.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = StageConfig {
            size: 1,
            ..StageConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(StageError::InvalidConfig(_))
        ));

        config.size = 8;
        config.populations[1].name = "xylophone".to_string();
        assert!(matches!(
            config.validate(),
            Err(StageError::InvalidConfig("population names must be unique"))
        ));

        config.populations[1].name = "bass".to_string();
        config.populations[0].birth_rate = 0;
        assert!(matches!(
            config.validate(),
            Err(StageError::Population(PopulationError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn parses_json_with_defaults_and_unknown_motion() {
        let json = r#"{
            "size": 6,
            "populations": [
                { "name": "pad", "max_population": 3, "birth_rate": 4, "motion": "DIAGONAL" },
                { "name": "lead", "max_population": 1, "birth_rate": 2, "motion": "LEFT",
                  "color": [200, 40, 40], "scale": { "name": "DORIAN" } }
            ]
        }"#;
        let config: StageConfig = serde_json::from_str(json).expect("parse");
        assert_eq!(config.size, 6);
        assert_eq!(config.rng_seed, None);
        assert_eq!(config.tempo_bpm, 40);
        assert_eq!(config.populations[0].motion, Motion::Still);
        assert_eq!(config.populations[0].first_birth_delay, 0);
        assert_eq!(config.populations[1].motion, Motion::Left);
        assert_eq!(config.populations[1].color, Some(Rgb::new(200, 40, 40)));
        assert_eq!(
            config.populations[1].scale,
            Some(ScaleConfig::new("DORIAN", 60))
        );
        config.validate().expect("valid");
    }
}
