//! Bordered cell buffer for one rank's column band.
//!
//! The backing buffer is `(w + 2) x (h + 2)` booleans in row-major order: a
//! one-cell ghost margin surrounds the owned interior. Interior cells are
//! authoritative; margin cells mirror neighbor data (horizontal) or this
//! grid's own opposite edge (vertical) and are refreshed every step by the
//! halo exchange. The border copies that used to be ad hoc index loops in
//! the reference implementation are named operations here (`wrap_vertical`,
//! `pack_column`, `unpack_column`) so the exchange protocol can be tested
//! independently of the rule engine.

/// Which horizontal edge of a grid a ghost column or halo message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// The edge a message sent toward `self` arrives on at the receiver.
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// One rank's band of the global grid, with ghost margin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// Allocate an all-dead grid owning `width x height` interior cells.
    pub fn new(width: usize, height: usize) -> Self {
        debug_assert!(width > 0 && height > 0);
        Grid {
            width,
            height,
            cells: vec![false; (width + 2) * (height + 2)],
        }
    }

    /// Owned interior width (columns).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Owned interior height (rows).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row stride of the margin-inclusive buffer.
    fn stride(&self) -> usize {
        self.width + 2
    }

    /// Buffer index for margin-inclusive coordinates.
    fn index(&self, bx: usize, by: usize) -> usize {
        debug_assert!(bx < self.width + 2 && by < self.height + 2);
        by * self.stride() + bx
    }

    /// Margin-inclusive read. `bx` in `[0, w + 2)`, `by` in `[0, h + 2)`;
    /// interior cell `(x, y)` sits at `(x + 1, y + 1)`.
    pub fn at(&self, bx: usize, by: usize) -> bool {
        self.cells[self.index(bx, by)]
    }

    /// Read an interior cell. `x` in `[0, w)`, `y` in `[0, h)`.
    pub fn get(&self, x: usize, y: usize) -> bool {
        debug_assert!(x < self.width && y < self.height);
        self.cells[self.index(x + 1, y + 1)]
    }

    /// Write an interior cell. `x` in `[0, w)`, `y` in `[0, h)`.
    pub fn set(&mut self, x: usize, y: usize, alive: bool) {
        debug_assert!(x < self.width && y < self.height);
        let i = self.index(x + 1, y + 1);
        self.cells[i] = alive;
    }

    /// Periodic vertical self-wrap over the owned columns: the top ghost row
    /// mirrors the last interior row and the bottom ghost row mirrors the
    /// first. The vertical axis never crosses ranks, so no messaging is
    /// involved. Must run before the horizontal exchange, because the packed
    /// columns include these just-wrapped corner cells.
    pub fn wrap_vertical(&mut self) {
        let stride = self.stride();
        let top_ghost = 0;
        let bottom_ghost = (self.height + 1) * stride;
        let first_interior = stride;
        let last_interior = self.height * stride;
        for bx in 1..=self.width {
            self.cells[top_ghost + bx] = self.cells[last_interior + bx];
            self.cells[bottom_ghost + bx] = self.cells[first_interior + bx];
        }
    }

    /// Copy an interior column into a strip, ghost rows included. `x` is
    /// interior-relative; the strip has `h + 2` cells so the receiver's
    /// corner ghosts are filled in the same message.
    pub fn pack_column(&self, x: usize) -> Vec<bool> {
        debug_assert!(x < self.width);
        let bx = x + 1;
        (0..self.height + 2).map(|by| self.at(bx, by)).collect()
    }

    /// Write a packed column strip into the ghost column on `side`.
    pub fn unpack_column(&mut self, side: Side, strip: &[bool]) {
        debug_assert_eq!(strip.len(), self.height + 2);
        let bx = match side {
            Side::Left => 0,
            Side::Right => self.width + 1,
        };
        for (by, &alive) in strip.iter().enumerate() {
            let i = self.index(bx, by);
            self.cells[i] = alive;
        }
    }

    /// The owned interior in row-major order, without the margin. This is
    /// what snapshot sinks serialize.
    pub fn interior_cells(&self) -> Vec<bool> {
        let mut out = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(self.get(x, y));
            }
        }
        out
    }
}
