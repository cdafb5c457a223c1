//! In-process message-passing substrate for the ring.
//!
//! Each rank holds one [`RingEndpoint`]: unbounded channel senders toward
//! its left and right neighbors and receivers for traffic arriving from
//! them. Sending never blocks (the channel buffers the strip), which is the
//! posted half of the non-blocking send/receive pair; completion is awaited
//! later with a bounded [`RingEndpoint::recv`]. Link order is FIFO, so a
//! fast neighbor's next-step strip simply queues behind the current one.
//!
//! A ring of size one wires both directions back to the same endpoint: a
//! strip sent rightward arrives on the sender's own left edge, exactly as a
//! periodic ring of one requires.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crate::grid::Side;

/// Fixed channel tag for all halo traffic.
pub const HALO_TAG: u32 = 42;

/// One boundary strip in flight, stamped with enough identity to detect
/// protocol skew at the receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Message channel tag. Halo traffic always uses [`HALO_TAG`].
    pub tag: u32,
    /// The sender's step number when the strip was produced.
    pub step: usize,
    /// Sending rank, for diagnostics.
    pub origin: usize,
    /// The packed column, ghost rows included (`h + 2` cells).
    pub cells: Vec<bool>,
}

/// Failure of a single link operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// No message arrived within the bounded wait.
    Timeout,
    /// The peer endpoint was dropped.
    Disconnected,
}

impl std::fmt::Display for LinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkError::Timeout => write!(f, "timed out waiting for halo message"),
            LinkError::Disconnected => write!(f, "peer endpoint disconnected"),
        }
    }
}

impl std::error::Error for LinkError {}

impl From<RecvTimeoutError> for LinkError {
    fn from(err: RecvTimeoutError) -> Self {
        match err {
            RecvTimeoutError::Timeout => LinkError::Timeout,
            RecvTimeoutError::Disconnected => LinkError::Disconnected,
        }
    }
}

impl<T> From<mpsc::SendError<T>> for LinkError {
    fn from(_: mpsc::SendError<T>) -> Self {
        LinkError::Disconnected
    }
}

/// One rank's connection to the ring.
#[derive(Debug)]
pub struct RingEndpoint {
    rank: usize,
    world_size: usize,
    to_left: Sender<Envelope>,
    to_right: Sender<Envelope>,
    from_left: Receiver<Envelope>,
    from_right: Receiver<Envelope>,
}

impl RingEndpoint {
    /// Build the full ring of `size` connected endpoints. Endpoint `r` is
    /// wired so that its rightward sends arrive at `(r + 1) % size` on the
    /// left edge, and symmetrically for leftward traffic.
    pub fn ring(size: usize) -> Vec<RingEndpoint> {
        assert!(size > 0, "ring requires at least one rank");

        // Link i runs between rank i and rank (i + 1) % size, one channel
        // per direction.
        let mut rightward_tx = Vec::with_capacity(size);
        let mut rightward_rx = Vec::with_capacity(size);
        let mut leftward_tx = Vec::with_capacity(size);
        let mut leftward_rx = Vec::with_capacity(size);
        for _ in 0..size {
            let (tx, rx) = mpsc::channel();
            rightward_tx.push(Some(tx));
            rightward_rx.push(Some(rx));
            let (tx, rx) = mpsc::channel();
            leftward_tx.push(Some(tx));
            leftward_rx.push(Some(rx));
        }

        (0..size)
            .map(|rank| {
                let left_link = (rank + size - 1) % size;
                RingEndpoint {
                    rank,
                    world_size: size,
                    to_right: rightward_tx[rank].take().expect("link wired twice"),
                    from_left: rightward_rx[left_link].take().expect("link wired twice"),
                    to_left: leftward_tx[left_link].take().expect("link wired twice"),
                    from_right: leftward_rx[rank].take().expect("link wired twice"),
                }
            })
            .collect()
    }

    /// This endpoint's rank identifier.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Active rank count of the substrate.
    pub fn world_size(&self) -> usize {
        self.world_size
    }

    /// Post a send toward `side`. Never blocks; the strip is buffered on
    /// the link until the neighbor awaits it.
    pub fn send(&self, side: Side, envelope: Envelope) -> Result<(), LinkError> {
        log::trace!(
            "rank {} posting send toward {} (step {}, {} cells)",
            self.rank,
            side,
            envelope.step,
            envelope.cells.len()
        );
        match side {
            Side::Left => self.to_left.send(envelope)?,
            Side::Right => self.to_right.send(envelope)?,
        }
        Ok(())
    }

    /// Await the next message arriving from `side`, bounded by `timeout`.
    pub fn recv(&self, side: Side, timeout: Duration) -> Result<Envelope, LinkError> {
        let envelope = match side {
            Side::Left => self.from_left.recv_timeout(timeout)?,
            Side::Right => self.from_right.recv_timeout(timeout)?,
        };
        log::trace!(
            "rank {} received from {} (origin {}, step {})",
            self.rank,
            side,
            envelope.origin,
            envelope.step
        );
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_millis(500);

    fn envelope(origin: usize, cells: Vec<bool>) -> Envelope {
        Envelope {
            tag: HALO_TAG,
            step: 1,
            origin,
            cells,
        }
    }

    #[test]
    fn rightward_send_arrives_on_the_neighbors_left_edge() {
        let mut ring = RingEndpoint::ring(2);
        let b = ring.pop().unwrap();
        let a = ring.pop().unwrap();
        a.send(Side::Right, envelope(0, vec![true, false])).unwrap();
        let got = b.recv(Side::Left, WAIT).unwrap();
        assert_eq!(got.origin, 0);
        assert_eq!(got.cells, vec![true, false]);
    }

    #[test]
    fn ring_of_one_routes_to_itself() {
        let ring = RingEndpoint::ring(1);
        let only = &ring[0];
        only.send(Side::Right, envelope(0, vec![true])).unwrap();
        only.send(Side::Left, envelope(0, vec![false])).unwrap();
        // a rightward send wraps around onto this rank's own left edge
        assert_eq!(only.recv(Side::Left, WAIT).unwrap().cells, vec![true]);
        assert_eq!(only.recv(Side::Right, WAIT).unwrap().cells, vec![false]);
    }

    #[test]
    fn sends_are_posted_without_blocking() {
        // Nobody is receiving; both posts must still return immediately.
        let mut ring = RingEndpoint::ring(3);
        let a = ring.remove(0);
        for _ in 0..16 {
            a.send(Side::Right, envelope(0, vec![true])).unwrap();
            a.send(Side::Left, envelope(0, vec![true])).unwrap();
        }
    }

    #[test]
    fn recv_times_out_when_no_message_arrives() {
        let ring = RingEndpoint::ring(2);
        let err = ring[0]
            .recv(Side::Left, Duration::from_millis(10))
            .unwrap_err();
        assert_eq!(err, LinkError::Timeout);
    }

    #[test]
    fn dropped_peer_reports_disconnect() {
        let mut ring = RingEndpoint::ring(2);
        let a = ring.remove(0);
        drop(ring); // rank 1 gone, both of a's inbound links are dead
        let err = a.recv(Side::Left, WAIT).unwrap_err();
        assert_eq!(err, LinkError::Disconnected);
    }

    #[test]
    fn link_order_is_fifo() {
        let mut ring = RingEndpoint::ring(2);
        let b = ring.pop().unwrap();
        let a = ring.pop().unwrap();
        for step in 1..=3 {
            let mut env = envelope(0, vec![step % 2 == 0]);
            env.step = step;
            a.send(Side::Right, env).unwrap();
        }
        for step in 1..=3 {
            assert_eq!(b.recv(Side::Left, WAIT).unwrap().step, step);
        }
    }
}
