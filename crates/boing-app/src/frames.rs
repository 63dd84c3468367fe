//! Plain-text rendering of a stage snapshot.

use boing_core::StageSnapshot;

const EMPTY: char = '.';
const RESTING: char = '#';
const FLASHING: char = '*';
const COLLIDED: char = 'x';

/// Draw one row per lattice line. Later populations are drawn over earlier ones.
#[must_use]
pub fn render_frame(snapshot: &StageSnapshot) -> String {
    let size = snapshot.size;
    let mut grid = vec![EMPTY; size * size];
    for population in &snapshot.populations {
        for cell in &population.cells {
            let (Ok(line), Ok(col)) = (usize::try_from(cell.line), usize::try_from(cell.col))
            else {
                continue;
            };
            if line >= size || col >= size {
                continue;
            }
            grid[line * size + col] = if cell.flash {
                FLASHING
            } else if cell.collided {
                COLLIDED
            } else {
                RESTING
            };
        }
    }

    let mut out = String::with_capacity(size * (size + 1) + 16);
    out.push_str(&format!("tick {}\n", snapshot.tick.0));
    for row in grid.chunks(size.max(1)) {
        out.extend(row.iter());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use boing_core::{CellView, PopulationView, Rgb, Tick};

    #[test]
    fn marks_cells_by_state() {
        let view = |line, col, flash, collided| CellView {
            line,
            col,
            flash,
            collided,
        };
        let snapshot = StageSnapshot {
            tick: Tick(3),
            size: 3,
            populations: vec![PopulationView {
                name: "p".to_string(),
                color: Rgb::new(1, 1, 1),
                cells: vec![
                    view(0, 0, false, false),
                    view(1, 2, true, false),
                    view(2, 1, false, true),
                ],
            }],
        };
        assert_eq!(render_frame(&snapshot), "tick 3\n#..\n..*\n.x.\n");
    }
}
