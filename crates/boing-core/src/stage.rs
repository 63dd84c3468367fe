//! The stage: a square lattice hosting populations, stepped once per tick.

use crate::config::StageConfig;
use crate::population::{AdvanceReport, BirthOutcome, NoteBatch, Population, PopulationError};
use crate::scale::{Scale, ScaleError};
use crate::{Rgb, Tick};
use rand::{SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur when constructing or stepping a stage.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StageError {
    /// Indicates an invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error(transparent)]
    Population(#[from] PopulationError),
    #[error(transparent)]
    Scale(#[from] ScaleError),
}

/// Receiver of the note batches produced each tick.
pub trait NoteSink: Send {
    fn emit(&mut self, batch: &NoteBatch);
}

/// Sink that drops every batch.
#[derive(Debug, Default)]
pub struct NullSink;

impl NoteSink for NullSink {
    fn emit(&mut self, _batch: &NoteBatch) {}
}

/// Everything produced by one stage tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTick {
    pub tick: Tick,
    /// Per-population reports, in stage order.
    pub reports: Vec<(String, AdvanceReport)>,
    /// Batches forwarded to the sink this tick.
    pub batches: Vec<NoteBatch>,
}

/// Summary retained in the stage history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSummary {
    pub tick: Tick,
    pub cell_count: usize,
    pub births: usize,
    pub evictions: usize,
    pub collisions: usize,
    pub notes: usize,
}

/// Renderable state of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub line: i32,
    pub col: i32,
    pub flash: bool,
    pub collided: bool,
}

impl CellView {
    /// Display color: white while flashing, red after a collision, the
    /// population color otherwise.
    #[must_use]
    pub const fn paint(&self, base: Rgb) -> Rgb {
        if self.flash {
            Rgb::WHITE
        } else if self.collided {
            Rgb::RED
        } else {
            base
        }
    }
}

/// Renderable state of one population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationView {
    pub name: String,
    pub color: Rgb,
    pub cells: Vec<CellView>,
}

/// Renderable state of the whole stage after a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSnapshot {
    pub tick: Tick,
    pub size: usize,
    pub populations: Vec<PopulationView>,
}

pub struct Stage {
    size: usize,
    seed: u64,
    tick: Tick,
    rng: SmallRng,
    populations: Vec<Population>,
    sink: Box<dyn NoteSink>,
    history: VecDeque<TickSummary>,
    history_capacity: usize,
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("size", &self.size)
            .field("seed", &self.seed)
            .field("tick", &self.tick)
            .field("populations", &self.populations.len())
            .finish()
    }
}

impl Stage {
    /// Build a stage and every configured population.
    pub fn new(config: StageConfig) -> Result<Self, StageError> {
        Self::with_sink(config, Box::new(NullSink))
    }

    /// Build a stage forwarding note batches to `sink`.
    ///
    /// Each population receives its own generator drawn from the stage seed in
    /// configuration order.
    pub fn with_sink(config: StageConfig, sink: Box<dyn NoteSink>) -> Result<Self, StageError> {
        config.validate()?;
        let seed = match config.rng_seed {
            Some(seed) => seed,
            None => {
                let seed: u64 = rand::random();
                info!(seed, "no seed configured; drew one from entropy");
                seed
            }
        };
        let mut stage = Self {
            size: config.size,
            seed,
            tick: Tick::zero(),
            rng: SmallRng::seed_from_u64(seed),
            populations: Vec::with_capacity(config.populations.len()),
            sink,
            history: VecDeque::with_capacity(config.history_capacity),
            history_capacity: config.history_capacity,
        };
        for population_config in &config.populations {
            let rng = stage.spawn_rng();
            let mut population = Population::new(population_config, rng)?;
            if let Some(scale) = &population_config.scale {
                let scale = Scale::new(&scale.name, scale.base_pitch, stage.size)?;
                population.set_scale(Arc::new(scale))?;
            }
            stage.add_population(population)?;
        }
        Ok(stage)
    }

    /// Derive an independent generator for a population built outside the stage.
    pub fn spawn_rng(&mut self) -> SmallRng {
        SmallRng::from_rng(&mut self.rng)
    }

    /// Bind `population` to this lattice and add it after the existing ones.
    pub fn add_population(&mut self, mut population: Population) -> Result<(), StageError> {
        if self.population(population.name()).is_some() {
            return Err(StageError::InvalidConfig("population names must be unique"));
        }
        population.bind_lattice(self.size)?;
        info!(
            population = population.name(),
            max = population.max_population(),
            motion = %population.motion(),
            "population added to stage"
        );
        self.populations.push(population);
        Ok(())
    }

    /// Replace the sink receiving note batches.
    pub fn set_sink(&mut self, sink: Box<dyn NoteSink>) {
        self.sink = sink;
    }

    /// Execute one tick: advance every population, then emit note batches.
    ///
    /// Batches are only handed to the sink once every population produced its
    /// notes. When a population fails to produce them the tick still counts and
    /// is recorded, but the sink receives nothing for it.
    pub fn step(&mut self) -> Result<StageTick, StageError> {
        let mut reports = Vec::with_capacity(self.populations.len());
        for population in &mut self.populations {
            let report = population.advance()?;
            reports.push((population.name().to_string(), report));
        }
        self.tick = self.tick.next();

        let batches = self.collect_batches();
        match &batches {
            Ok(batches) => self.record_history(&reports, batches),
            Err(err) => {
                warn!(tick = self.tick.0, error = %err, "dropping notes for this tick");
                self.record_history(&reports, &[]);
            }
        }
        let batches = batches?;
        for batch in &batches {
            debug!(
                population = %batch.population,
                pitches = ?batch.pitches,
                "emitting notes"
            );
            self.sink.emit(batch);
        }

        Ok(StageTick {
            tick: self.tick,
            reports,
            batches,
        })
    }

    fn collect_batches(&self) -> Result<Vec<NoteBatch>, PopulationError> {
        let mut batches = Vec::new();
        for population in &self.populations {
            if let Some(batch) = population.notes()? {
                batches.push(batch);
            }
        }
        Ok(batches)
    }

    fn record_history(&mut self, reports: &[(String, AdvanceReport)], batches: &[NoteBatch]) {
        if self.history_capacity == 0 {
            return;
        }
        let summary = TickSummary {
            tick: self.tick,
            cell_count: self.populations.iter().map(Population::len).sum(),
            births: reports
                .iter()
                .filter(|(_, r)| matches!(r.birth, BirthOutcome::Placed { .. }))
                .count(),
            evictions: reports.iter().filter(|(_, r)| r.evicted.is_some()).count(),
            collisions: reports.iter().map(|(_, r)| r.collisions).sum(),
            notes: batches.iter().map(|b| b.pitches.len()).sum(),
        };
        while self.history.len() >= self.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(summary);
    }

    /// Renderable state of every population.
    #[must_use]
    pub fn snapshot(&self) -> StageSnapshot {
        StageSnapshot {
            tick: self.tick,
            size: self.size,
            populations: self
                .populations
                .iter()
                .map(|population| PopulationView {
                    name: population.name().to_string(),
                    color: population.color(),
                    cells: population
                        .cells()
                        .map(|cell| CellView {
                            line: cell.line(),
                            col: cell.col(),
                            flash: cell.flash(),
                            collided: cell.collided(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Seed in effect, including one drawn from entropy.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub const fn tick(&self) -> Tick {
        self.tick
    }

    pub fn populations(&self) -> impl ExactSizeIterator<Item = &Population> + '_ {
        self.populations.iter()
    }

    #[must_use]
    pub fn population(&self, name: &str) -> Option<&Population> {
        self.populations.iter().find(|p| p.name() == name)
    }

    #[must_use]
    pub fn population_mut(&mut self, name: &str) -> Option<&mut Population> {
        self.populations.iter_mut().find(|p| p.name() == name)
    }

    /// Iterate over retained tick summaries.
    pub fn history(&self) -> impl Iterator<Item = &TickSummary> {
        self.history.iter()
    }
}
