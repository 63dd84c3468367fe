//! Core types for the boing generative note engine.
//!
//! Cells travel across a square lattice, bounce off its edges and turn when
//! they meet. Populations give birth to cells on a fixed schedule and turn
//! every edge bounce into a pitch picked from their scale.

use rand::Rng;
use serde::{Deserialize, Serialize};

pub mod cell;
pub mod config;
pub mod population;
pub mod scale;
pub mod stage;

pub use cell::{Cell, Direction, Motion, collision_key};
pub use config::{MAX_LATTICE_SIZE, PopulationConfig, ScaleConfig, StageConfig};
pub use population::{
    AdvanceReport, BirthOutcome, NoteBatch, Population, PopulationError, ScaleBinding,
};
pub use scale::{Scale, ScaleError, ScaleName};
pub use stage::{
    CellView, NoteSink, NullSink, PopulationView, Stage, StageError, StageSnapshot, StageTick,
    TickSummary,
};

/// Simulation clock (ticks processed since the stage was built).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tick(pub u64);

impl Tick {
    /// Returns the next sequential tick.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }
}

/// 8-bit RGB triplet used as a display hint.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const WHITE: Self = Self([255, 255, 255]);
    pub const RED: Self = Self([255, 0, 0]);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    /// Mid-range color, each channel in `30..225`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self([
            rng.random_range(30..225),
            rng.random_range(30..225),
            rng.random_range(30..225),
        ])
    }
}
