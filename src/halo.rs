//! Per-step boundary exchange protocol.
//!
//! Order of operations, once per step against the freshly evolved buffer:
//!
//! 1. Vertical self-wrap (local, no messaging). Runs first because the
//!    columns exchanged horizontally include the just-wrapped corner cells.
//! 2. Horizontal exchange: post the send of the rightmost interior column
//!    toward the right neighbor and of the leftmost toward the left, then
//!    await the receive from the right into the right ghost column and from
//!    the left into the left ghost column.
//!
//! Post-all-then-wait is the protocol's structural invariant, not an
//! implementation detail: if every rank blocked on a send before posting
//! its receives, the ring would deadlock in a circular wait. Both sends are
//! therefore posted before either completion is awaited.

use std::time::Duration;

use log::trace;

use crate::error::{RunError, RunResult};
use crate::grid::{Grid, Side};
use crate::transport::{Envelope, LinkError, RingEndpoint, HALO_TAG};

/// Refresh all four ghost edges of `grid` for `step`.
///
/// A link fault, a bounded wait expiring, or a strip that does not match
/// the expected step and shape is fatal: the run has no recovery path, so
/// everything surfaces as a [`RunError::Communication`] naming this rank
/// and step.
pub fn exchange(
    grid: &mut Grid,
    endpoint: &RingEndpoint,
    step: usize,
    timeout: Duration,
) -> RunResult<()> {
    let rank = endpoint.rank();

    grid.wrap_vertical();

    // Post both sends before awaiting anything.
    let rightmost = grid.pack_column(grid.width() - 1);
    let leftmost = grid.pack_column(0);
    post(endpoint, Side::Right, step, rightmost, rank)?;
    post(endpoint, Side::Left, step, leftmost, rank)?;

    // Now block until both inbound strips are in.
    for side in [Side::Right, Side::Left] {
        let strip = complete(endpoint, side, step, timeout, grid.height() + 2)?;
        grid.unpack_column(side, &strip);
    }

    trace!("rank {} completed halo exchange for step {}", rank, step);
    Ok(())
}

fn post(
    endpoint: &RingEndpoint,
    side: Side,
    step: usize,
    cells: Vec<bool>,
    rank: usize,
) -> RunResult<()> {
    endpoint
        .send(
            side,
            Envelope {
                tag: HALO_TAG,
                step,
                origin: rank,
                cells,
            },
        )
        .map_err(|err: LinkError| {
            RunError::comm(rank, step, format!("send toward {} failed: {}", side, err))
        })
}

fn complete(
    endpoint: &RingEndpoint,
    side: Side,
    step: usize,
    timeout: Duration,
    expected_len: usize,
) -> RunResult<Vec<bool>> {
    let rank = endpoint.rank();
    let envelope = endpoint.recv(side, timeout).map_err(|err| {
        RunError::comm(rank, step, format!("receive from {} failed: {}", side, err))
    })?;

    if envelope.tag != HALO_TAG {
        return Err(RunError::comm(
            rank,
            step,
            format!(
                "unexpected tag {} from rank {} (want {})",
                envelope.tag, envelope.origin, HALO_TAG
            ),
        ));
    }
    if envelope.step != step {
        return Err(RunError::comm(
            rank,
            step,
            format!(
                "strip from rank {} stamped step {} (want {})",
                envelope.origin, envelope.step, step
            ),
        ));
    }
    if envelope.cells.len() != expected_len {
        return Err(RunError::comm(
            rank,
            step,
            format!(
                "strip from rank {} has {} cells (want {})",
                envelope.origin,
                envelope.cells.len(),
                expected_len
            ),
        ));
    }
    Ok(envelope.cells)
}
