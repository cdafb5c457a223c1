//! Local evolution step for the two-state neighbor rule.
//!
//! The sweep reads the margin-inclusive buffer, so vertical wrap and
//! horizontal ghost values feed neighbor counts transparently once the halo
//! exchange has filled them. The margin of `next` is left undefined; it is
//! refreshed immediately afterward by the exchange.

use crate::grid::Grid;

/// Next state for a cell with `neighbours` live Moore neighbors.
///
/// Dead cells with exactly three neighbors are born; live cells survive on
/// two or three. Numerically identical to the starvation/overpopulation
/// formulation (`n < 2` dies, `n >= 4` dies) used elsewhere in the lineage
/// of this code.
fn next_state(alive: bool, neighbours: u8) -> bool {
    if alive {
        neighbours == 2 || neighbours == 3
    } else {
        neighbours == 3
    }
}

/// Evolve `current`'s interior into `next`'s interior.
///
/// Returns the number of cells whose state changed, a diagnostic the caller
/// logs per step. It is available for termination heuristics but nothing
/// acts on it today.
pub fn evolve(current: &Grid, next: &mut Grid) -> usize {
    debug_assert_eq!(current.width(), next.width());
    debug_assert_eq!(current.height(), next.height());

    let mut changed = 0;
    for y in 0..current.height() {
        for x in 0..current.width() {
            // Interior (x, y) sits at buffer (x + 1, y + 1); the eight
            // neighbors are its surrounding buffer cells.
            let (bx, by) = (x + 1, y + 1);
            let mut neighbours = 0u8;
            for dy in 0..3 {
                for dx in 0..3 {
                    if dx == 1 && dy == 1 {
                        continue;
                    }
                    if current.at(bx + dx - 1, by + dy - 1) {
                        neighbours += 1;
                    }
                }
            }
            let alive = current.get(x, y);
            let evolved = next_state(alive, neighbours);
            next.set(x, y, evolved);
            if evolved != alive {
                changed += 1;
            }
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Side;

    /// Fill a lone grid's margins as if it were its own horizontal neighbor,
    /// i.e. a full torus. Mirrors what the halo exchange does for a ring of
    /// size one.
    fn prime_torus(grid: &mut Grid) {
        grid.wrap_vertical();
        let left_edge = grid.pack_column(0);
        let right_edge = grid.pack_column(grid.width() - 1);
        grid.unpack_column(Side::Left, &right_edge);
        grid.unpack_column(Side::Right, &left_edge);
    }

    fn alive_set(grid: &Grid) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                if grid.get(x, y) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn rule_table_matches_survival_on_two_or_three() {
        for n in 0..=8u8 {
            assert_eq!(next_state(true, n), n == 2 || n == 3);
            assert_eq!(next_state(false, n), n == 3);
        }
    }

    #[test]
    fn blinker_oscillates() {
        let mut current = Grid::new(5, 5);
        let mut next = Grid::new(5, 5);
        for x in 1..4 {
            current.set(x, 2, true);
        }
        prime_torus(&mut current);
        let changed = evolve(&current, &mut next);
        assert_eq!(changed, 4);
        assert_eq!(alive_set(&next), vec![(2, 1), (2, 2), (2, 3)]);
    }

    #[test]
    fn block_is_a_still_life() {
        let mut current = Grid::new(6, 6);
        let mut next = Grid::new(6, 6);
        for &(x, y) in &[(2, 2), (3, 2), (2, 3), (3, 3)] {
            current.set(x, y, true);
        }
        prime_torus(&mut current);
        let changed = evolve(&current, &mut next);
        assert_eq!(changed, 0);
        assert_eq!(alive_set(&next), alive_set(&current));
    }

    #[test]
    fn empty_grid_stays_empty() {
        let mut current = Grid::new(4, 4);
        let mut next = Grid::new(4, 4);
        prime_torus(&mut current);
        assert_eq!(evolve(&current, &mut next), 0);
        assert!(alive_set(&next).is_empty());
    }

    #[test]
    fn neighbor_counts_read_through_the_margin() {
        // A vertical pair on the top row: with the wrapped margin the cell
        // below each survives-check sees its partner plus the wrap copies.
        let mut current = Grid::new(4, 4);
        let mut next = Grid::new(4, 4);
        current.set(0, 0, true);
        current.set(0, 3, true);
        current.set(3, 0, true);
        prime_torus(&mut current);
        evolve(&current, &mut next);
        // (0, 0) touches (0, 3) through the vertical wrap and (3, 0)
        // through the horizontal wrap: two neighbors, survives.
        assert!(next.get(0, 0));
    }
}
