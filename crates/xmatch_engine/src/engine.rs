use std::fmt;

use crate::anisotropic::AnisotropicCartesianEngine;
use crate::bounds::{MatchBounds, expand_bounds};
use crate::cell::Cell;
use crate::ellipsoid::ErrorEllipsoid;
use crate::error::EngineError;
use crate::grid::CellScratch;
use crate::info::{ValueInfo, coordinate_info};
use crate::isotropic::IsotropicCartesianEngine;
use crate::score::{coord_score, ellipsoid_score};
use crate::value::Value;


/// Upper limit on dimensionality; binning visits 3^N offsets per point.
pub const MAX_DIMENSIONS: usize = 16;

/// Name of the grid scaling tuning parameter.
pub const BIN_FACTOR_PARAM: &str = "Bin Factor";

/// Matching contract consumed by a row-matching driver.
///
/// `bins` takes `&mut self` because engines keep scratch buffers between
/// calls. Drivers that want parallelism clone one engine per worker instead
/// of sharing one.
pub trait MatchEngine: fmt::Display {
    /// Separation of two tuples if they match, `None` otherwise.
    fn match_score(&self, tuple1: &[Value], tuple2: &[Value]) -> Option<f64>;

    /// Labels of every bin that may hold a tuple matching `tuple`.
    /// Empty for tuples that can never match.
    fn bins(&mut self, tuple: &[Value]) -> Vec<Cell>;

    /// Description of each element of the tuples this engine accepts.
    fn tuple_infos(&self) -> Vec<ValueInfo>;

    /// Description of the values returned by [`match_score`](Self::match_score).
    fn match_score_info(&self) -> ValueInfo;

    /// Parameters that define what counts as a match.
    fn match_parameters(&self) -> Vec<ValueInfo>;

    /// Parameters that only affect performance.
    fn tuning_parameters(&self) -> Vec<ValueInfo>;

    /// Current value of a match or tuning parameter, looked up by name.
    fn parameter(&self, name: &str) -> Option<f64>;

    fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), EngineError>;

    fn can_bound_match(&self) -> bool {
        false
    }

    /// Range that a matching tuple must fall in, given the range of the
    /// tuples it might match. Unbounded unless the engine can bound matches.
    fn match_bounds(&self, _min: &[Value], _max: &[Value]) -> MatchBounds {
        MatchBounds::unbounded(self.tuple_infos().len())
    }
}

/// Mechanics shared by the Cartesian engines: N-dimensional points match
/// when they fall inside an ellipsoid whose principal radii are the per-axis
/// errors.
///
/// The errors themselves are set through the variant that owns this core;
/// see [`IsotropicCartesianEngine`] and [`AnisotropicCartesianEngine`].
#[derive(Debug, Clone)]
pub struct CartesianMatchEngine {
    ellipsoid: ErrorEllipsoid,
    normalize_scores: bool,
    scratch: CellScratch,
}

impl CartesianMatchEngine {
    /// Engine for `ndim`-dimensional space with all errors zero.
    pub fn new(ndim: usize, normalize_scores: bool) -> Result<Self, EngineError> {
        if ndim == 0 || ndim > MAX_DIMENSIONS {
            return Err(EngineError::InvalidDimensions {
                ndim,
                max: MAX_DIMENSIONS,
            });
        }
        Ok(Self {
            ellipsoid: ErrorEllipsoid::new(ndim),
            normalize_scores,
            scratch: CellScratch::new(ndim),
        })
    }

    pub fn dimensions(&self) -> usize {
        self.ellipsoid.dimensions()
    }

    pub fn ellipsoid(&self) -> &ErrorEllipsoid {
        &self.ellipsoid
    }

    /// Principal radius of the error ellipsoid along `dim`.
    ///
    /// # Panics
    /// If `dim` is out of range.
    pub fn error(&self, dim: usize) -> f64 {
        self.ellipsoid.error(dim)
    }

    pub fn errors(&self) -> &[f64] {
        self.ellipsoid.errors()
    }

    pub(crate) fn set_error(&mut self, dim: usize, error: f64) -> Result<(), EngineError> {
        self.ellipsoid.set_error(dim, error)
    }

    pub fn bin_factor(&self) -> f64 {
        self.ellipsoid.bin_factor()
    }

    /// Sets the bin size as a multiple of the error on each axis. Must be >= 1;
    /// on rejection the previous factor is kept.
    pub fn set_bin_factor(&mut self, bin_factor: f64) -> Result<(), EngineError> {
        self.ellipsoid.set_bin_factor(bin_factor)
    }

    /// Whether scores are normalized to the ellipsoid boundary (0..=1)
    /// rather than reported as Euclidean distance.
    ///
    /// Strongly anisotropic errors, or axes that are not a physical space,
    /// usually want raw scores off.
    pub fn normalize_scores(&self) -> bool {
        self.normalize_scores
    }

    pub fn set_normalize_scores(&mut self, normalize: bool) {
        self.normalize_scores = normalize;
    }

    pub fn match_score(&self, tuple1: &[Value], tuple2: &[Value]) -> Option<f64> {
        ellipsoid_score(&self.ellipsoid, tuple1, tuple2, self.normalize_scores)
    }

    pub fn match_coords(&self, coords1: &[f64], coords2: &[f64]) -> Option<f64> {
        coord_score(&self.ellipsoid, coords1, coords2, self.normalize_scores)
    }

    pub fn bins(&mut self, tuple: &[Value]) -> Vec<Cell> {
        self.scratch.bins(&self.ellipsoid, tuple)
    }

    pub fn coord_bins(&mut self, coords: &[f64]) -> Vec<Cell> {
        self.scratch.coord_bins(&self.ellipsoid, coords)
    }

    pub fn match_bounds(&self, min: &[Value], max: &[Value]) -> MatchBounds {
        expand_bounds(&self.ellipsoid, min, max)
    }

    pub fn tuple_infos(&self) -> Vec<ValueInfo> {
        let ndim = self.dimensions();
        (0..ndim).map(|dim| coordinate_info(ndim, dim)).collect()
    }

    pub fn match_score_info(&self) -> ValueInfo {
        let description = if self.normalize_scores {
            "Normalised distance between matched points \
             (0 is identical position, 1 is worst permissible match)"
        } else {
            "Spatial distance between matched points"
        };
        ValueInfo::new("Separation", description).with_ucd("pos.distance")
    }

    pub fn tuning_parameters(&self) -> Vec<ValueInfo> {
        vec![ValueInfo::new(
            BIN_FACTOR_PARAM,
            "Scaling factor to adjust bin size; larger values mean larger bins. \
             Minimum legal value is 1.",
        )
        .with_nullable(false)]
    }

    pub(crate) fn tuning_parameter(&self, name: &str) -> Option<f64> {
        (name == BIN_FACTOR_PARAM).then(|| self.bin_factor())
    }

    /// `None` when `name` is not a tuning parameter.
    pub(crate) fn set_tuning_parameter(
        &mut self,
        name: &str,
        value: f64,
    ) -> Option<Result<(), EngineError>> {
        (name == BIN_FACTOR_PARAM).then(|| self.set_bin_factor(value))
    }
}

/// Either Cartesian engine, chosen at configuration time.
#[derive(Debug, Clone)]
pub enum CartesianEngine {
    Isotropic(IsotropicCartesianEngine),
    Anisotropic(AnisotropicCartesianEngine),
}

impl CartesianEngine {
    pub fn cartesian(&self) -> &CartesianMatchEngine {
        match self {
            CartesianEngine::Isotropic(e) => e.cartesian(),
            CartesianEngine::Anisotropic(e) => e.cartesian(),
        }
    }

    pub fn set_bin_factor(&mut self, bin_factor: f64) -> Result<(), EngineError> {
        match self {
            CartesianEngine::Isotropic(e) => e.set_bin_factor(bin_factor),
            CartesianEngine::Anisotropic(e) => e.set_bin_factor(bin_factor),
        }
    }

    pub fn set_normalize_scores(&mut self, normalize: bool) {
        match self {
            CartesianEngine::Isotropic(e) => e.set_normalize_scores(normalize),
            CartesianEngine::Anisotropic(e) => e.set_normalize_scores(normalize),
        }
    }
}

impl From<IsotropicCartesianEngine> for CartesianEngine {
    fn from(e: IsotropicCartesianEngine) -> Self {
        CartesianEngine::Isotropic(e)
    }
}

impl From<AnisotropicCartesianEngine> for CartesianEngine {
    fn from(e: AnisotropicCartesianEngine) -> Self {
        CartesianEngine::Anisotropic(e)
    }
}

impl fmt::Display for CartesianEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartesianEngine::Isotropic(e) => e.fmt(f),
            CartesianEngine::Anisotropic(e) => e.fmt(f),
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $e:ident => $body:expr) => {
        match $self {
            CartesianEngine::Isotropic($e) => $body,
            CartesianEngine::Anisotropic($e) => $body,
        }
    };
}

impl MatchEngine for CartesianEngine {
    fn match_score(&self, tuple1: &[Value], tuple2: &[Value]) -> Option<f64> {
        dispatch!(self, e => e.match_score(tuple1, tuple2))
    }

    fn bins(&mut self, tuple: &[Value]) -> Vec<Cell> {
        dispatch!(self, e => e.bins(tuple))
    }

    fn tuple_infos(&self) -> Vec<ValueInfo> {
        dispatch!(self, e => e.tuple_infos())
    }

    fn match_score_info(&self) -> ValueInfo {
        dispatch!(self, e => e.match_score_info())
    }

    fn match_parameters(&self) -> Vec<ValueInfo> {
        dispatch!(self, e => e.match_parameters())
    }

    fn tuning_parameters(&self) -> Vec<ValueInfo> {
        dispatch!(self, e => MatchEngine::tuning_parameters(e))
    }

    fn parameter(&self, name: &str) -> Option<f64> {
        dispatch!(self, e => e.parameter(name))
    }

    fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), EngineError> {
        dispatch!(self, e => e.set_parameter(name, value))
    }

    fn can_bound_match(&self) -> bool {
        true
    }

    fn match_bounds(&self, min: &[Value], max: &[Value]) -> MatchBounds {
        dispatch!(self, e => MatchEngine::match_bounds(e, min, max))
    }
}
