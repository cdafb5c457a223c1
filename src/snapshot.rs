//! Snapshot output collaborators.
//!
//! The stepper hands each emitted iteration to a [`SnapshotSink`] as
//! `(iteration, rank, extent, grid)` and moves on; serialization is the
//! sink's concern and output failures never abort the run. Three sinks are
//! provided: a VTK ImageData writer matching the reference tooling's file
//! layout, a discard sink, and an in-memory sink for tests.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use log::{debug, warn};

use crate::grid::Grid;
use crate::topology::Extent;

/// Receives one emitted iteration per rank. Fire-and-forget from the
/// core's perspective.
pub trait SnapshotSink: Send {
    fn emit(&mut self, iteration: usize, rank: usize, extent: &Extent, grid: &Grid);
}

/// Sink that drops everything. Used when output is disabled.
#[derive(Debug, Default)]
pub struct DiscardSink;

impl SnapshotSink for DiscardSink {
    fn emit(&mut self, _iteration: usize, _rank: usize, _extent: &Extent, _grid: &Grid) {}
}

/// One captured emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRecord {
    pub iteration: usize,
    pub rank: usize,
    pub extent: Extent,
    /// Interior cells, row-major, `extent.width() * extent.height()` long.
    pub cells: Vec<bool>,
}

/// Sink that collects emissions into shared memory. Clones share the same
/// backing store, so one collector can observe every rank.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<SnapshotRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records captured so far, in emission order per rank.
    pub fn records(&self) -> Vec<SnapshotRecord> {
        self.records.lock().expect("snapshot store poisoned").clone()
    }
}

impl SnapshotSink for MemorySink {
    fn emit(&mut self, iteration: usize, rank: usize, extent: &Extent, grid: &Grid) {
        self.records
            .lock()
            .expect("snapshot store poisoned")
            .push(SnapshotRecord {
                iteration,
                rank,
                extent: *extent,
                cells: grid.interior_cells(),
            });
    }
}

/// Writes one VTK ImageData (`.vti`) piece per emitted iteration, plus a
/// parallel master file (`.pvti`) from rank 0 referencing every piece.
/// Cell data is appended raw little-endian `Float32`, one value per owned
/// cell, preceded by a `UInt64` byte count.
#[derive(Debug)]
pub struct VtkWriter {
    directory: PathBuf,
    prefix: String,
    global_width: usize,
    global_height: usize,
    /// Extents of every rank, for the master file's piece list.
    pieces: Vec<Extent>,
}

impl VtkWriter {
    pub fn new(
        directory: PathBuf,
        prefix: String,
        global_width: usize,
        global_height: usize,
        pieces: Vec<Extent>,
    ) -> Self {
        VtkWriter {
            directory,
            prefix,
            global_width,
            global_height,
            pieces,
        }
    }

    fn piece_path(&self, iteration: usize, rank: usize) -> PathBuf {
        self.directory
            .join(format!("{}step{}rank{}.vti", self.prefix, iteration, rank))
    }

    fn write_piece(
        &self,
        iteration: usize,
        rank: usize,
        extent: &Extent,
        grid: &Grid,
    ) -> io::Result<()> {
        let path = self.piece_path(iteration, rank);
        let mut out = BufWriter::new(File::create(&path)?);

        writeln!(out, "<?xml version=\"1.0\"?>")?;
        writeln!(
            out,
            "<VTKFile type=\"ImageData\" version=\"0.1\" byte_order=\"LittleEndian\" header_type=\"UInt64\">"
        )?;
        writeln!(
            out,
            "<ImageData WholeExtent=\"0 {} 0 {} 0 0\" Origin=\"0 0 0\" Spacing=\"1.0 1.0 0.0\">",
            self.global_width, self.global_height
        )?;
        writeln!(
            out,
            "<Piece Extent=\"{} {} {} {} 0 0\">",
            extent.x_start, extent.x_end, extent.y_start, extent.y_end
        )?;
        writeln!(out, "<CellData Scalars=\"{}\">", self.prefix)?;
        writeln!(
            out,
            "<DataArray type=\"Float32\" Name=\"{}\" format=\"appended\" offset=\"0\"/>",
            self.prefix
        )?;
        writeln!(out, "</CellData>")?;
        writeln!(out, "</Piece>")?;
        writeln!(out, "</ImageData>")?;
        writeln!(out, "<AppendedData encoding=\"raw\">")?;
        write!(out, "_")?;

        let byte_count = (extent.width() * extent.height() * 4) as u64;
        out.write_all(&byte_count.to_le_bytes())?;
        for alive in grid.interior_cells() {
            let value: f32 = if alive { 1.0 } else { 0.0 };
            out.write_all(&value.to_le_bytes())?;
        }

        writeln!(out)?;
        writeln!(out, "</AppendedData>")?;
        writeln!(out, "</VTKFile>")?;
        out.flush()
    }

    fn write_master(&self, iteration: usize) -> io::Result<()> {
        let path = self
            .directory
            .join(format!("{}step{}.pvti", self.prefix, iteration));
        let mut out = BufWriter::new(File::create(&path)?);

        writeln!(out, "<?xml version=\"1.0\"?>")?;
        writeln!(
            out,
            "<VTKFile type=\"PImageData\" version=\"0.1\" byte_order=\"LittleEndian\">"
        )?;
        writeln!(
            out,
            "<PImageData WholeExtent=\"0 {} 0 {} 0 0\" Origin=\"0 0 0\" Spacing=\"1.0 1.0 0.0\">",
            self.global_width, self.global_height
        )?;
        writeln!(out, "<PCellData Scalars=\"{}\">", self.prefix)?;
        writeln!(
            out,
            "<PDataArray type=\"Float32\" Name=\"{}\" format=\"appended\" offset=\"0\"/>",
            self.prefix
        )?;
        writeln!(out, "</PCellData>")?;
        for (rank, piece) in self.pieces.iter().enumerate() {
            writeln!(
                out,
                "<Piece Extent=\"{} {} {} {} 0 0\" Source=\"{}step{}rank{}.vti\"/>",
                piece.x_start,
                piece.x_end,
                piece.y_start,
                piece.y_end,
                self.prefix,
                iteration,
                rank
            )?;
        }
        writeln!(out, "</PImageData>")?;
        writeln!(out, "</VTKFile>")?;
        out.flush()
    }
}

impl SnapshotSink for VtkWriter {
    fn emit(&mut self, iteration: usize, rank: usize, extent: &Extent, grid: &Grid) {
        if let Err(err) = self.write_piece(iteration, rank, extent, grid) {
            warn!(
                "rank {}: failed to write snapshot piece for iteration {}: {}",
                rank, iteration, err
            );
            return;
        }
        // Rank 0 owns the master file for each iteration.
        if rank == 0 {
            if let Err(err) = self.write_master(iteration) {
                warn!(
                    "failed to write snapshot master for iteration {}: {}",
                    iteration, err
                );
                return;
            }
        }
        debug!(
            "rank {} wrote snapshot for iteration {} ({}x{} cells)",
            rank,
            iteration,
            extent.width(),
            extent.height()
        );
    }
}
