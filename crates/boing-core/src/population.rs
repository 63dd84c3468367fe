//! Named groups of cells: birth schedule, capacity, collisions and note batches.

use crate::Rgb;
use crate::cell::{Cell, Motion};
use crate::config::{MAX_LATTICE_SIZE, PopulationConfig};
use crate::scale::{Scale, ScaleError, range_length};
use rand::{Rng, rngs::SmallRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Smallest number of placement draws attempted before a birth is skipped.
pub const MIN_PLACEMENT_ATTEMPTS: usize = 64;

/// Errors raised by population operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PopulationError {
    /// The population was advanced or queried before its lattice size was bound.
    #[error("population `{name}` has no lattice size bound")]
    LatticeUnbound { name: String },
    /// The lattice size may only be bound once.
    #[error("population `{name}` is already bound to a lattice of size {size}")]
    LatticeAlreadyBound { name: String, size: usize },
    /// Births need at least a 2x2 lattice and collision keys stop being unique
    /// past `MAX_LATTICE_SIZE`.
    #[error("lattice size must be between 2 and {max}, got {0}", max = MAX_LATTICE_SIZE)]
    InvalidLatticeSize(usize),
    /// A cell was handed over with a coordinate outside the bound lattice.
    #[error("cell ({line}, {col}) lies outside the {size}x{size} lattice of `{name}`")]
    OutOfLattice {
        name: String,
        line: i32,
        col: i32,
        size: usize,
    },
    /// The pitch range does not cover every `line + col` index of the lattice.
    #[error("scale of `{name}` has {actual} pitches, the lattice needs {expected}")]
    ScaleMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    /// Indicates an invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error(transparent)]
    Scale(#[from] ScaleError),
}

/// Where a population's pitch range came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaleBinding {
    /// Supplied by configuration or [`Population::set_scale`].
    Configured(Arc<Scale>),
    /// Built when the lattice was bound because none was supplied.
    Default(Arc<Scale>),
}

impl ScaleBinding {
    #[must_use]
    pub fn scale(&self) -> &Scale {
        match self {
            ScaleBinding::Configured(scale) | ScaleBinding::Default(scale) => scale,
        }
    }

    #[must_use]
    pub const fn is_default(&self) -> bool {
        matches!(self, ScaleBinding::Default(_))
    }
}

/// Result of the birth phase of one tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum BirthOutcome {
    /// The birth cursor has not run out yet.
    #[default]
    NotDue,
    /// A cell was born at the given coordinate.
    Placed { line: i32, col: i32 },
    /// A birth was due but no free coordinate was found.
    Exhausted,
}

/// What happened to a population during one tick.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdvanceReport {
    pub birth: BirthOutcome,
    /// Oldest cell dropped to respect the capacity bound.
    pub evicted: Option<Cell>,
    /// Number of coincident cell pairs found after moving.
    pub collisions: usize,
}

/// Pitches a population plays on one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteBatch {
    pub population: String,
    pub pitches: Vec<i32>,
}

/// A named group of cells sharing motion, capacity, birth schedule and color.
#[derive(Debug)]
pub struct Population {
    name: String,
    max_population: usize,
    color: Rgb,
    motion: Motion,
    birth_cursor: i64,
    birth_rate: i64,
    size: Option<usize>,
    cells: VecDeque<Cell>,
    scale: Option<ScaleBinding>,
    rng: SmallRng,
}

impl Population {
    /// Build a population from configuration, drawing from `rng` for births.
    ///
    /// A missing color is drawn from `rng` too. The configured scale, if any, is
    /// only built once the lattice size is known.
    pub fn new(config: &PopulationConfig, mut rng: SmallRng) -> Result<Self, PopulationError> {
        config.validate()?;
        let color = config.color.unwrap_or_else(|| Rgb::random(&mut rng));
        Ok(Self {
            name: config.name.clone(),
            max_population: config.max_population,
            color,
            motion: config.motion,
            birth_cursor: i64::from(config.first_birth_delay),
            birth_rate: i64::from(config.birth_rate),
            size: None,
            cells: VecDeque::with_capacity(config.max_population + 1),
            scale: None,
            rng,
        })
    }

    /// Bind the lattice dimension.
    ///
    /// Birth delay and rate are expressed in crossings of the lattice, so both are
    /// multiplied by `size - 1` here. A population without a scale receives the
    /// default one.
    pub fn bind_lattice(&mut self, size: usize) -> Result<(), PopulationError> {
        if let Some(bound) = self.size {
            return Err(PopulationError::LatticeAlreadyBound {
                name: self.name.clone(),
                size: bound,
            });
        }
        if !(2..=MAX_LATTICE_SIZE).contains(&size) {
            return Err(PopulationError::InvalidLatticeSize(size));
        }
        if let Some(binding) = &self.scale {
            self.check_scale_len(binding.scale(), size)?;
        }
        let span = i64::try_from(size - 1).map_err(|_| PopulationError::InvalidLatticeSize(size))?;
        self.birth_cursor *= span;
        self.birth_rate *= span;
        self.size = Some(size);

        if self.scale.is_none() {
            info!(
                population = %self.name,
                "No scale has been defined for this population; using the default one"
            );
            self.scale = Some(ScaleBinding::Default(Arc::new(Scale::default_for(size)?)));
        }
        Ok(())
    }

    /// Replace the pitch range used for note batches.
    ///
    /// Once a lattice is bound the scale must hold exactly `2 * (size - 1)`
    /// pitches; a scale set earlier is checked when the lattice is bound.
    pub fn set_scale(&mut self, scale: Arc<Scale>) -> Result<(), PopulationError> {
        if let Some(size) = self.size {
            self.check_scale_len(&scale, size)?;
        }
        self.scale = Some(ScaleBinding::Configured(scale));
        Ok(())
    }

    fn check_scale_len(&self, scale: &Scale, size: usize) -> Result<(), PopulationError> {
        let expected = range_length(size)?;
        if scale.len() != expected {
            return Err(PopulationError::ScaleMismatch {
                name: self.name.clone(),
                expected,
                actual: scale.len(),
            });
        }
        Ok(())
    }

    /// Run one tick: move every cell, run the birth schedule, then redirect
    /// coincident cells.
    pub fn advance(&mut self) -> Result<AdvanceReport, PopulationError> {
        let size = self.require_size()?;

        for cell in &mut self.cells {
            cell.move_within(size);
        }

        let mut report = AdvanceReport::default();
        self.birth_cursor -= 1;
        if self.birth_cursor <= 0 {
            self.birth_cursor = self.birth_rate;
            match self.place_newborn(size) {
                Some((line, col)) => {
                    report.birth = BirthOutcome::Placed { line, col };
                    report.evicted = self.push_cell(Cell::with_motion(line, col, self.motion));
                    debug!(population = %self.name, line, col, "cell born");
                }
                None => {
                    report.birth = BirthOutcome::Exhausted;
                    warn!(
                        population = %self.name,
                        cells = self.cells.len(),
                        "no free coordinate for a new cell; skipping birth"
                    );
                }
            }
        }

        report.collisions = self.resolve_collisions();
        Ok(report)
    }

    /// Draw a free coordinate in `[0, size - 2]²`, giving up after a bounded
    /// number of draws.
    fn place_newborn(&mut self, size: usize) -> Option<(i32, i32)> {
        let upper = i32::try_from(size - 1).ok()?;
        let span = (size - 1).saturating_mul(size - 1);
        let attempts = MIN_PLACEMENT_ATTEMPTS.max(span.saturating_mul(8));
        for _ in 0..attempts {
            let line = self.rng.random_range(0..upper);
            let col = self.rng.random_range(0..upper);
            let occupied = self
                .cells
                .iter()
                .any(|cell| cell.line() == line && cell.col() == col);
            if !occupied {
                return Some((line, col));
            }
        }
        None
    }

    /// Append a cell, evicting the oldest one when over capacity.
    fn push_cell(&mut self, cell: Cell) -> Option<Cell> {
        self.cells.push_back(cell);
        if self.cells.len() > self.max_population {
            let evicted = self.cells.pop_front();
            if let Some(old) = &evicted {
                debug!(
                    population = %self.name,
                    line = old.line(),
                    col = old.col(),
                    "oldest cell evicted"
                );
            }
            return evicted;
        }
        None
    }

    fn resolve_collisions(&mut self) -> usize {
        let mut pairs = 0;
        for first in 0..self.cells.len() {
            for second in (first + 1)..self.cells.len() {
                if self.cells[first].collision_key() == self.cells[second].collision_key() {
                    self.cells[first].collide();
                    self.cells[second].collide();
                    pairs += 1;
                }
            }
        }
        pairs
    }

    /// Insert an externally built cell, subject to the capacity bound.
    ///
    /// The lattice must be bound and the cell must lie inside it. Returns the
    /// evicted cell, if any.
    pub fn inject(&mut self, cell: Cell) -> Result<Option<Cell>, PopulationError> {
        let size = self.require_size()?;
        if cell.coordinate(size).is_none() {
            return Err(PopulationError::OutOfLattice {
                name: self.name.clone(),
                line: cell.line(),
                col: cell.col(),
                size,
            });
        }
        Ok(self.push_cell(cell))
    }

    /// Pitches for every flashing cell, in birth order; `None` when nothing flashed.
    pub fn notes(&self) -> Result<Option<NoteBatch>, PopulationError> {
        let binding = self.scale.as_ref().ok_or_else(|| PopulationError::LatticeUnbound {
            name: self.name.clone(),
        })?;
        let scale = binding.scale();
        let mut pitches = Vec::new();
        for cell in self.cells.iter().filter(|cell| cell.flash()) {
            let index = usize::try_from(cell.line() + cell.col()).unwrap_or(usize::MAX);
            pitches.push(scale.get_note(index)?);
        }
        if pitches.is_empty() {
            return Ok(None);
        }
        Ok(Some(NoteBatch {
            population: self.name.clone(),
            pitches,
        }))
    }

    fn require_size(&self) -> Result<usize, PopulationError> {
        self.size.ok_or_else(|| PopulationError::LatticeUnbound {
            name: self.name.clone(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn color(&self) -> Rgb {
        self.color
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    #[must_use]
    pub const fn motion(&self) -> Motion {
        self.motion
    }

    #[must_use]
    pub const fn max_population(&self) -> usize {
        self.max_population
    }

    #[must_use]
    pub const fn birth_cursor(&self) -> i64 {
        self.birth_cursor
    }

    #[must_use]
    pub const fn birth_rate(&self) -> i64 {
        self.birth_rate
    }

    #[must_use]
    pub const fn lattice_size(&self) -> Option<usize> {
        self.size
    }

    #[must_use]
    pub fn scale(&self) -> Option<&ScaleBinding> {
        self.scale.as_ref()
    }

    /// Living cells, oldest first.
    pub fn cells(&self) -> impl ExactSizeIterator<Item = &Cell> + '_ {
        self.cells.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
