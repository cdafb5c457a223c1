//! Periodic 1-D ring topology and subdomain extents.
//!
//! The ring is resolved once at startup and never mutated: each rank learns
//! its coordinate and its left/right neighbors, and derives the global
//! column range it owns. The last coordinate absorbs any integer-division
//! remainder so every global column is owned exactly once.

use crate::error::{RunError, RunResult};

/// Immutable per-rank ring descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingTopology {
    /// This rank's identifier in the transport.
    pub rank: usize,
    /// Position along the ring. Equal to `rank` for a 1-D ring.
    pub coordinate: usize,
    /// Neighbor toward lower coordinates, wrapping at zero.
    pub left: usize,
    /// Neighbor toward higher coordinates, wrapping at the end.
    pub right: usize,
    /// Number of ranks in the ring.
    pub ring_size: usize,
}

impl RingTopology {
    /// Resolve the ring for `rank` out of `ring_size` configured ranks.
    ///
    /// `world_size` is the transport's active rank count. A mismatch against
    /// the configured ring size silently corrupts the partition math, so it
    /// is rejected here rather than assumed away.
    pub fn new(rank: usize, ring_size: usize, world_size: usize) -> RunResult<Self> {
        if ring_size == 0 {
            return Err(RunError::config("ring size must be at least 1"));
        }
        if world_size != ring_size {
            return Err(RunError::config(format!(
                "configured ring size {} does not match active rank count {}",
                ring_size, world_size
            )));
        }
        if rank >= ring_size {
            return Err(RunError::config(format!(
                "rank {} out of range for ring of size {}",
                rank, ring_size
            )));
        }
        Ok(RingTopology {
            rank,
            coordinate: rank,
            left: (rank + ring_size - 1) % ring_size,
            right: (rank + 1) % ring_size,
            ring_size,
        })
    }
}

/// Global coordinate range owned by one rank. Half-open on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub x_start: usize,
    pub x_end: usize,
    pub y_start: usize,
    pub y_end: usize,
}

impl Extent {
    /// Extent for `coordinate` in a ring of `ring_size` over a
    /// `global_width x global_height` grid. Columns split evenly with the
    /// last coordinate taking the remainder; rows never split.
    pub fn for_coordinate(
        coordinate: usize,
        ring_size: usize,
        global_width: usize,
        global_height: usize,
    ) -> Self {
        debug_assert!(coordinate < ring_size);
        let x_start = coordinate * global_width / ring_size;
        let x_end = if coordinate == ring_size - 1 {
            global_width
        } else {
            (coordinate + 1) * global_width / ring_size
        };
        Extent {
            x_start,
            x_end,
            y_start: 0,
            y_end: global_height,
        }
    }

    /// Number of owned columns.
    pub fn width(&self) -> usize {
        self.x_end - self.x_start
    }

    /// Number of owned rows.
    pub fn height(&self) -> usize {
        self.y_end - self.y_start
    }

    /// Whether a global cell falls inside this extent.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x_start && x < self.x_end && y >= self.y_start && y < self.y_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_neighbors_are_mutually_inverse() {
        for ring_size in 2..=7 {
            let ring: Vec<RingTopology> = (0..ring_size)
                .map(|r| RingTopology::new(r, ring_size, ring_size).unwrap())
                .collect();
            for topo in &ring {
                assert_eq!(ring[topo.right].left, topo.rank);
                assert_eq!(ring[topo.left].right, topo.rank);
            }
            // wraparound pair
            assert_eq!(ring[0].left, ring_size - 1);
            assert_eq!(ring[ring_size - 1].right, 0);
        }
    }

    #[test]
    fn world_size_mismatch_is_a_configuration_error() {
        let err = RingTopology::new(0, 4, 3).unwrap_err();
        assert!(matches!(err, RunError::Configuration(_)));
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn zero_ring_is_rejected() {
        assert!(RingTopology::new(0, 0, 0).is_err());
    }

    #[test]
    fn boundary_scenario_four_ranks_width_twenty() {
        let extents: Vec<Extent> = (0..4)
            .map(|c| Extent::for_coordinate(c, 4, 20, 20))
            .collect();
        let bounds: Vec<(usize, usize)> =
            extents.iter().map(|e| (e.x_start, e.x_end)).collect();
        assert_eq!(bounds, vec![(0, 5), (5, 10), (10, 15), (15, 20)]);
    }

    #[test]
    fn extents_cover_the_width_exactly_once() {
        for ring_size in 1..=6 {
            for global_width in [7, 12, 17, 20, 23] {
                let extents: Vec<Extent> = (0..ring_size)
                    .map(|c| Extent::for_coordinate(c, ring_size, global_width, 9))
                    .collect();
                let mut owners = vec![0usize; global_width];
                for e in &extents {
                    assert_eq!(e.y_start, 0);
                    assert_eq!(e.y_end, 9);
                    for x in e.x_start..e.x_end {
                        owners[x] += 1;
                    }
                }
                assert!(
                    owners.iter().all(|&n| n == 1),
                    "gap or overlap for ring_size={} width={}",
                    ring_size,
                    global_width
                );
                // last coordinate absorbs the remainder
                assert_eq!(extents.last().unwrap().x_end, global_width);
            }
        }
    }
}
