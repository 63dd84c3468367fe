//! Moving cells: motion labels, direction vectors, bounce and collision rules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned step applied to a cell each tick.
///
/// `line` grows downward and `col` grows to the right. At most one component is
/// non-zero; [`Direction::NONE`] is the degenerate still vector.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq, Hash)]
pub struct Direction {
    line: i32,
    col: i32,
}

impl Direction {
    pub const UP: Self = Self::new(-1, 0);
    pub const DOWN: Self = Self::new(1, 0);
    pub const LEFT: Self = Self::new(0, -1);
    pub const RIGHT: Self = Self::new(0, 1);
    pub const NONE: Self = Self::new(0, 0);

    #[must_use]
    pub(crate) const fn new(line: i32, col: i32) -> Self {
        Self { line, col }
    }

    #[must_use]
    pub const fn line(self) -> i32 {
        self.line
    }

    #[must_use]
    pub const fn col(self) -> i32 {
        self.col
    }

    #[must_use]
    pub const fn is_vertical(self) -> bool {
        self.line != 0
    }

    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        self.line == 0 && self.col != 0
    }

    #[must_use]
    pub const fn is_still(self) -> bool {
        self.line == 0 && self.col == 0
    }

    /// Quarter turn applied on collision: the moving component's sign carries
    /// over to the other axis.
    #[must_use]
    pub const fn rotated(self) -> Self {
        if self.line != 0 {
            Self::new(0, self.line)
        } else {
            Self::new(self.col, 0)
        }
    }
}

/// Motion rule shared by every cell a population gives birth to.
///
/// Labels other than `UP`, `DOWN`, `LEFT` and `RIGHT` map to [`Motion::Still`]:
/// such cells never move, never bounce and never play.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Motion {
    #[default]
    Up,
    Down,
    Left,
    Right,
    Still,
}

impl Motion {
    /// Case-sensitive label lookup; unknown labels degrade to [`Motion::Still`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "UP" => Motion::Up,
            "DOWN" => Motion::Down,
            "LEFT" => Motion::Left,
            "RIGHT" => Motion::Right,
            _ => Motion::Still,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Motion::Up => "UP",
            Motion::Down => "DOWN",
            Motion::Left => "LEFT",
            Motion::Right => "RIGHT",
            Motion::Still => "NONE",
        }
    }

    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Motion::Up => Direction::UP,
            Motion::Down => Direction::DOWN,
            Motion::Left => Direction::LEFT,
            Motion::Right => Direction::RIGHT,
            Motion::Still => Direction::NONE,
        }
    }
}

impl From<String> for Motion {
    fn from(label: String) -> Self {
        Motion::from_label(&label)
    }
}

impl From<Motion> for String {
    fn from(motion: Motion) -> Self {
        motion.label().to_string()
    }
}

impl fmt::Display for Motion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Integer identifying a lattice coordinate; equal keys mean coincident cells.
///
/// Unique as long as the lattice is narrower than 100 cells.
#[must_use]
pub const fn collision_key(line: i32, col: i32) -> i32 {
    100 * line + col
}

/// A single moving point on the lattice.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Cell {
    line: i32,
    col: i32,
    direction: Direction,
    flash: bool,
    collided: bool,
    collision_key: i32,
}

impl Cell {
    /// Place a cell with cleared flags.
    #[must_use]
    pub const fn new(line: i32, col: i32, direction: Direction) -> Self {
        Self {
            line,
            col,
            direction,
            flash: false,
            collided: false,
            collision_key: collision_key(line, col),
        }
    }

    #[must_use]
    pub const fn with_motion(line: i32, col: i32, motion: Motion) -> Self {
        Self::new(line, col, motion.direction())
    }

    #[must_use]
    pub const fn line(&self) -> i32 {
        self.line
    }

    #[must_use]
    pub const fn col(&self) -> i32 {
        self.col
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether the cell hit a lattice edge on the last move.
    #[must_use]
    pub const fn flash(&self) -> bool {
        self.flash
    }

    /// Whether the cell was redirected by a collision since the last move.
    #[must_use]
    pub const fn collided(&self) -> bool {
        self.collided
    }

    #[must_use]
    pub const fn collision_key(&self) -> i32 {
        self.collision_key
    }

    /// Coordinate of this cell when it lies inside a `size` wide lattice.
    #[must_use]
    pub fn coordinate(&self, size: usize) -> Option<(usize, usize)> {
        let line = usize::try_from(self.line).ok()?;
        let col = usize::try_from(self.col).ok()?;
        (line < size && col < size).then_some((line, col))
    }

    /// Advance one step inside a `size` wide lattice, bouncing off its edges.
    pub fn move_within(&mut self, size: usize) {
        let last = i32::try_from(size).unwrap_or(i32::MAX) - 1;

        self.line += self.direction.line;
        self.col += self.direction.col;

        // One correction per step, line before column.
        if self.line < 0 {
            self.line = 0;
        } else if self.line == last + 1 {
            self.line = last;
        } else if self.col < 0 {
            self.col = 0;
        } else if self.col == last + 1 {
            self.col = last;
        }

        self.collision_key = collision_key(self.line, self.col);

        if self.direction.line != 0 {
            if self.line == 0 || self.line == last {
                self.direction.line = -self.direction.line;
                self.flash = true;
            } else {
                self.flash = false;
            }
        } else if self.direction.col != 0 {
            if self.col == 0 || self.col == last {
                self.direction.col = -self.direction.col;
                self.flash = true;
            } else {
                self.flash = false;
            }
        }

        self.collided = false;
    }

    /// Turn a quarter after meeting another cell.
    ///
    /// Ignored when the cell already collided this tick or is flashing; a cell
    /// bouncing off an edge keeps its bounce.
    pub fn collide(&mut self) {
        if self.collided || self.flash {
            return;
        }
        self.direction = self.direction.rotated();
        self.collided = true;
    }
}
