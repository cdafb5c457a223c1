//! Named initial configurations.
//!
//! Patterns are specified in global `(x, y)` coordinates and clipped to a
//! rank's extent when seeded, so every rank can apply the same pattern and
//! end up owning exactly its share of the live cells.

use crate::grid::Grid;
use crate::topology::Extent;

/// A named set of initially live cells in global coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Pattern {
    pub name: &'static str,
    pub cells: &'static [(usize, usize)],
}

pub const PATTERNS: &[Pattern] = &[
    Pattern {
        name: "glider",
        cells: &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
    },
    Pattern {
        name: "blinker",
        cells: &[(1, 2), (2, 2), (3, 2)],
    },
    Pattern {
        name: "block",
        cells: &[(1, 1), (2, 1), (1, 2), (2, 2)],
    },
];

/// Look up a pattern by its configured name.
pub fn by_name(name: &str) -> Option<&'static Pattern> {
    PATTERNS.iter().find(|p| p.name == name)
}

/// Seed `grid` with the cells of `pattern` falling inside `extent`,
/// translated to the rank's interior coordinates.
pub fn seed(grid: &mut Grid, extent: &Extent, pattern: &Pattern) {
    for &(x, y) in pattern.cells {
        if extent.contains(x, y) {
            grid.set(x - extent.x_start, y - extent.y_start, true);
        }
    }
}
