//! Wires a validated configuration into a running ring.
//!
//! Resolves the topology once, builds the transport endpoints, spawns one
//! named thread per rank with its own seeded grid and snapshot sink, then
//! joins them all and reports the first failure. Ranks share nothing
//! mutable; every cross-rank byte moves through the transport.

use std::thread;

use log::{error, info};

use crate::config::Config;
use crate::error::{RunError, RunResult};
use crate::grid::Grid;
use crate::patterns;
use crate::snapshot::{DiscardSink, SnapshotSink, VtkWriter};
use crate::stepper::Stepper;
use crate::topology::{Extent, RingTopology};
use crate::transport::RingEndpoint;

/// Run the configured simulation to completion.
pub fn run(config: &Config) -> RunResult<()> {
    let extents = resolve_extents(config);
    run_with(config, |rank| make_sink(config, rank, &extents))
}

/// Like [`run`], but with caller-supplied snapshot sinks. Tests use this to
/// capture every rank's emissions in memory.
pub fn run_with(
    config: &Config,
    mut make_sink: impl FnMut(usize) -> Box<dyn SnapshotSink>,
) -> RunResult<()> {
    config.validate()?;

    let ring_size = config.run.ring_size;
    let pattern = patterns::by_name(&config.run.pattern)
        .ok_or_else(|| RunError::config(format!("unknown pattern '{}'", config.run.pattern)))?;

    info!(
        "starting ring of {} ranks over a {}x{} grid, {} steps, pattern '{}'",
        ring_size, config.grid.width, config.grid.height, config.run.steps, pattern.name
    );

    let endpoints = RingEndpoint::ring(ring_size);
    let steps = config.run.steps;
    let halo_timeout = config.halo_timeout();

    let mut handles = Vec::with_capacity(ring_size);
    for endpoint in endpoints {
        let rank = endpoint.rank();
        let topology = RingTopology::new(rank, ring_size, endpoint.world_size())?;
        let extent = Extent::for_coordinate(
            topology.coordinate,
            ring_size,
            config.grid.width,
            config.grid.height,
        );
        let mut grid = Grid::new(extent.width(), extent.height());
        patterns::seed(&mut grid, &extent, pattern);
        let sink = make_sink(rank);
        let stepper = Stepper::new(topology, extent, endpoint, grid, sink, halo_timeout);

        let handle = thread::Builder::new()
            .name(format!("rank-{}", rank))
            .spawn(move || stepper.run(steps))
            .map_err(|err| {
                RunError::config(format!("failed to spawn thread for rank {}: {}", rank, err))
            })?;
        handles.push((rank, handle));
    }

    // Join everyone and surface the first failure; a failed rank also tears
    // down its links, so neighbors fail shortly after it.
    let mut first_failure: Option<RunError> = None;
    for (rank, handle) in handles {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                error!("rank {} failed: {}", rank, err);
                first_failure.get_or_insert(err);
            }
            Err(_) => {
                error!("rank {} panicked", rank);
                first_failure
                    .get_or_insert(RunError::comm(rank, 0, "rank thread panicked"));
            }
        }
    }

    match first_failure {
        Some(err) => Err(err),
        None => {
            info!("all {} ranks completed {} steps", ring_size, steps);
            Ok(())
        }
    }
}

fn resolve_extents(config: &Config) -> Vec<Extent> {
    (0..config.run.ring_size)
        .map(|coordinate| {
            Extent::for_coordinate(
                coordinate,
                config.run.ring_size,
                config.grid.width,
                config.grid.height,
            )
        })
        .collect()
}

fn make_sink(config: &Config, _rank: usize, extents: &[Extent]) -> Box<dyn SnapshotSink> {
    if config.output.enabled {
        Box::new(VtkWriter::new(
            config.output.directory.clone(),
            config.output.prefix.clone(),
            config.grid.width,
            config.grid.height,
            extents.to_vec(),
        ))
    } else {
        Box::new(DiscardSink)
    }
}
