//! Error ellipsoid and grid scaling state.
//!
//! Holds the per-axis match errors together with the two values derived from
//! them: the inverse-square weight used by the ellipsoid test and the
//! reciprocal grid bin size. Every setter recomputes the derived values before
//! returning, so readers never see stale weights or bin sizes.

use tracing::debug;

use crate::error::EngineError;

/// Default grid scaling factor.
///
/// Tuning parameter only: any value >= 1 gives correct results, this one
/// trades bucket population against the number of buckets probed.
pub const DEFAULT_BIN_FACTOR: f64 = 8.0;

/// Inverse-square weight used for an axis whose error is exactly zero.
///
/// Any non-zero separation on such an axis already fails the per-axis bound
/// check, and a zero separation contributes `0 * f64::MAX == 0`, so the
/// quadratic form never sees `0 * inf == NaN`.
pub const ZERO_ERROR_WEIGHT: f64 = f64::MAX;

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEllipsoid {
    errors: Vec<f64>,
    inv_sq: Vec<f64>,
    r_bin_sizes: Vec<f64>,
    bin_factor: f64,
}

impl ErrorEllipsoid {
    /// All errors start at zero with the default bin factor.
    pub fn new(ndim: usize) -> Self {
        Self {
            errors: vec![0.0; ndim],
            inv_sq: vec![ZERO_ERROR_WEIGHT; ndim],
            r_bin_sizes: vec![0.0; ndim],
            bin_factor: DEFAULT_BIN_FACTOR,
        }
    }

    #[inline]
    pub fn dimensions(&self) -> usize {
        self.errors.len()
    }

    /// Principal radius along `dim`.
    ///
    /// # Panics
    /// If `dim` is not below [`dimensions`](Self::dimensions).
    #[inline]
    pub fn error(&self, dim: usize) -> f64 {
        self.errors[dim]
    }

    pub fn errors(&self) -> &[f64] {
        &self.errors
    }

    /// Weight `1/error²` of axis `dim` in the ellipsoid quadratic form.
    #[inline]
    pub fn inverse_square(&self, dim: usize) -> f64 {
        self.inv_sq[dim]
    }

    /// Reciprocal of the grid bin size along `dim`; zero for a zero-error axis.
    #[inline]
    pub fn reciprocal_bin_size(&self, dim: usize) -> f64 {
        self.r_bin_sizes[dim]
    }

    pub fn bin_factor(&self) -> f64 {
        self.bin_factor
    }

    pub fn set_error(&mut self, dim: usize, error: f64) -> Result<(), EngineError> {
        let ndim = self.dimensions();
        if dim >= ndim {
            return Err(EngineError::DimensionOutOfRange { dim, ndim });
        }
        check_error(dim, error)?;
        self.errors[dim] = error;
        self.inv_sq[dim] = if error == 0.0 {
            ZERO_ERROR_WEIGHT
        } else {
            // Clamped so that tiny errors whose square underflows stay finite.
            (1.0 / (error * error)).min(ZERO_ERROR_WEIGHT)
        };
        self.configure_scale(dim);
        debug!(dim, error, "error_updated");
        Ok(())
    }

    /// Sets the grid scaling factor, the size of a grid cell as a multiple of
    /// the match error along each axis. Values below 1 (or NaN) are rejected
    /// and the previous factor is kept.
    pub fn set_bin_factor(&mut self, bin_factor: f64) -> Result<(), EngineError> {
        if bin_factor.is_nan() || bin_factor < 1.0 {
            return Err(EngineError::InvalidBinFactor { value: bin_factor });
        }
        self.bin_factor = bin_factor;
        for dim in 0..self.dimensions() {
            self.configure_scale(dim);
        }
        debug!(bin_factor, "bin_factor_updated");
        Ok(())
    }

    fn configure_scale(&mut self, dim: usize) {
        debug_assert!(self.bin_factor >= 1.0);
        let error = self.errors[dim];

        // A zero-error axis is left out of the grid: every point gets label 0
        // there and the scorer alone enforces equality.
        self.r_bin_sizes[dim] = if error == 0.0 {
            0.0
        } else {
            1.0 / (self.bin_factor * error)
        };
    }
}

pub(crate) fn check_error(dim: usize, error: f64) -> Result<(), EngineError> {
    if error.is_finite() && error >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidError { dim, value: error })
    }
}
