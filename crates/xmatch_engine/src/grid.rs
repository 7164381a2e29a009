//! Grid bucketing of coordinate points.
//!
//! Space is cut into axis-aligned cells whose size along each axis is
//! `bin_factor * error`. For a given point the indexer returns every cell that
//! might hold a point inside its error ellipsoid, found by labelling the 3^N
//! points offset from it by `-error`, `0` or `+error` along each axis.
//! Because a cell is never smaller than the error, two matching points always
//! share at least one returned cell.

use hashbrown::HashSet;

use crate::cell::Cell;
use crate::ellipsoid::ErrorEllipsoid;
use crate::value::Value;

/// Reusable working storage for cell-block computation.
///
/// Holding these buffers between calls is what makes binning `&mut`: an
/// engine (and its scratch) must not be shared between threads.
#[derive(Debug, Clone, Default)]
pub(crate) struct CellScratch {
    coords: Vec<f64>,
    pos: Vec<f64>,
    offset: Vec<u8>,
    cells: HashSet<Cell>,
}

impl CellScratch {
    pub(crate) fn new(ndim: usize) -> Self {
        Self {
            coords: Vec::with_capacity(ndim),
            pos: vec![0.0; ndim],
            offset: vec![0; ndim],
            cells: HashSet::with_capacity(3usize.saturating_pow(ndim as u32).min(1024)),
        }
    }

    /// Cells surrounding `tuple`, or none if any coordinate is not a finite
    /// number.
    pub(crate) fn bins(&mut self, ellipsoid: &ErrorEllipsoid, tuple: &[Value]) -> Vec<Cell> {
        let ndim = ellipsoid.dimensions();
        if tuple.len() < ndim {
            return Vec::new();
        }
        self.coords.clear();
        for value in &tuple[..ndim] {
            match value.finite_f64() {
                Some(c) => self.coords.push(c),
                None => return Vec::new(),
            }
        }
        self.cell_block(ellipsoid)
    }

    /// Same as [`bins`](Self::bins) for plain coordinates.
    pub(crate) fn coord_bins(&mut self, ellipsoid: &ErrorEllipsoid, coords: &[f64]) -> Vec<Cell> {
        let ndim = ellipsoid.dimensions();
        if coords.len() < ndim || !coords[..ndim].iter().all(|c| c.is_finite()) {
            return Vec::new();
        }
        self.coords.clear();
        self.coords.extend_from_slice(&coords[..ndim]);
        self.cell_block(ellipsoid)
    }

    fn cell_block(&mut self, ellipsoid: &ErrorEllipsoid) -> Vec<Cell> {
        let ndim = ellipsoid.dimensions();
        self.pos.resize(ndim, 0.0);
        self.offset.clear();
        self.offset.resize(ndim, 0);
        self.cells.clear();

        let block_size = 3usize.pow(ndim as u32);
        for _ in 0..block_size {
            for i in 0..ndim {
                self.pos[i] = self.coords[i] + (self.offset[i] as f64 - 1.0) * ellipsoid.error(i);
            }
            self.cells.insert(base_label(ellipsoid, &self.pos));

            // Odometer step over {0, 1, 2}^ndim.
            for digit in self.offset.iter_mut() {
                *digit += 1;
                if *digit < 3 {
                    break;
                }
                *digit = 0;
            }
        }
        debug_assert!(self.offset.iter().all(|&d| d == 0));

        self.cells.drain().collect()
    }
}

/// Label of the cell containing `coords`.
///
/// The float-to-int cast saturates, so coordinates far outside the `i64`
/// label range collapse onto the outermost cells instead of wrapping.
pub fn base_label(ellipsoid: &ErrorEllipsoid, coords: &[f64]) -> Cell {
    (0..ellipsoid.dimensions())
        .map(|i| (coords[i] * ellipsoid.reciprocal_bin_size(i)).floor() as i64)
        .collect()
}
