//! Per-rank iteration driver.
//!
//! Owns the double buffer for one rank's band and runs the step loop:
//! emit the current state to the snapshot sink, evolve into the spare
//! buffer, refresh its ghost margins through the halo exchange, then swap
//! the two buffers by ownership transfer. The loop carries no other state
//! between iterations.

use std::mem;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::error::RunResult;
use crate::grid::Grid;
use crate::halo;
use crate::rule;
use crate::snapshot::SnapshotSink;
use crate::topology::{Extent, RingTopology};
use crate::transport::RingEndpoint;

pub struct Stepper {
    topology: RingTopology,
    extent: Extent,
    endpoint: RingEndpoint,
    current: Grid,
    next: Grid,
    sink: Box<dyn SnapshotSink>,
    halo_timeout: Duration,
}

impl Stepper {
    /// Build a stepper around an already-seeded grid. The spare buffer is
    /// allocated here with the same shape.
    pub fn new(
        topology: RingTopology,
        extent: Extent,
        endpoint: RingEndpoint,
        seeded: Grid,
        sink: Box<dyn SnapshotSink>,
        halo_timeout: Duration,
    ) -> Self {
        let next = Grid::new(seeded.width(), seeded.height());
        Stepper {
            topology,
            extent,
            endpoint,
            current: seeded,
            next,
            sink,
            halo_timeout,
        }
    }

    /// Drive `steps` iterations.
    ///
    /// Iteration 0 emits the seeded configuration before any evolution; the
    /// state after evolution `k` is emitted as iteration `k`. Exchange step
    /// stamps follow the same numbering: the priming exchange on the seed
    /// carries stamp 0 and the exchange after evolution `k` carries stamp
    /// `k + 1`, so every rank's stamps agree in lockstep.
    pub fn run(mut self, steps: usize) -> RunResult<()> {
        let rank = self.topology.rank;
        info!(
            "rank {} stepping columns [{}, {}) for {} steps (left {}, right {})",
            rank,
            self.extent.x_start,
            self.extent.x_end,
            steps,
            self.topology.left,
            self.topology.right
        );

        self.sink.emit(0, rank, &self.extent, &self.current);

        // Prime the seed's margins so the first evolution reads valid
        // ghosts.
        halo::exchange(&mut self.current, &self.endpoint, 0, self.halo_timeout)?;

        let run_started = Instant::now();
        for step in 0..steps {
            let started = Instant::now();
            let changed = rule::evolve(&self.current, &mut self.next);
            halo::exchange(&mut self.next, &self.endpoint, step + 1, self.halo_timeout)?;
            mem::swap(&mut self.current, &mut self.next);
            debug!(
                "rank {} step {}: {} cells changed in {:.3}ms",
                rank,
                step,
                changed,
                started.elapsed().as_secs_f64() * 1e3
            );
            self.sink.emit(step + 1, rank, &self.extent, &self.current);
        }

        info!(
            "rank {} completed {} steps in {:.3}ms",
            rank,
            steps,
            run_started.elapsed().as_secs_f64() * 1e3
        );
        Ok(())
    }
}
