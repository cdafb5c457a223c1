//! Distributed cellular-automaton engine on a ring of ranks.
//!
//! A rectangular cell grid is partitioned into contiguous column bands
//! across a ring of compute ranks (one thread each). Every step each rank
//! evolves its own band through the two-state neighbor rule, wraps its
//! vertical borders in place, and exchanges one-cell-wide boundary strips
//! with its left and right neighbors so cross-partition neighbor counts
//! stay correct. The exchange posts all sends before awaiting any receive;
//! that ordering is what keeps the ring deadlock-free.
//!
//! Module map:
//! - [`grid`] — bordered cell buffer with ghost margin
//! - [`rule`] — local evolution step
//! - [`topology`] — ring neighbors and subdomain extents
//! - [`transport`] — channel-backed message substrate
//! - [`halo`] — the per-step exchange protocol
//! - [`stepper`] — per-rank iteration loop and double buffering
//! - [`snapshot`] — output collaborators (VTK, memory, discard)
//! - [`orchestrator`] — spawns and joins the ring

pub mod config;
pub mod error;
pub mod grid;
pub mod halo;
pub mod orchestrator;
pub mod patterns;
pub mod rule;
pub mod snapshot;
pub mod stepper;
pub mod topology;
pub mod transport;
