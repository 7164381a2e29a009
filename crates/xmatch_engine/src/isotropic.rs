use std::fmt;

use tracing::debug;

use crate::bounds::MatchBounds;
use crate::cell::Cell;
use crate::ellipsoid::check_error;
use crate::engine::{CartesianMatchEngine, MatchEngine};
use crate::error::EngineError;
use crate::info::ValueInfo;
use crate::value::Value;

/// Name of the single match parameter.
pub const ERROR_PARAM: &str = "Error";

/// Cartesian matching with the same error on every axis, so the match
/// region is a sphere.
#[derive(Debug, Clone)]
pub struct IsotropicCartesianEngine {
    inner: CartesianMatchEngine,
}

impl IsotropicCartesianEngine {
    pub fn new(ndim: usize, error: f64, normalize_scores: bool) -> Result<Self, EngineError> {
        let mut engine = Self {
            inner: CartesianMatchEngine::new(ndim, normalize_scores)?,
        };
        engine.set_error(error)?;
        Ok(engine)
    }

    pub fn cartesian(&self) -> &CartesianMatchEngine {
        &self.inner
    }

    pub fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    /// Maximum separation for a match.
    pub fn error(&self) -> f64 {
        self.inner.error(0)
    }

    /// Sets the separation on all axes at once. Rejected values leave every
    /// axis unchanged.
    pub fn set_error(&mut self, error: f64) -> Result<(), EngineError> {
        check_error(0, error)?;
        for dim in 0..self.inner.dimensions() {
            self.inner.set_error(dim, error)?;
        }
        debug!(error, ndim = self.inner.dimensions(), "isotropic_error_set");
        Ok(())
    }

    pub fn bin_factor(&self) -> f64 {
        self.inner.bin_factor()
    }

    pub fn set_bin_factor(&mut self, bin_factor: f64) -> Result<(), EngineError> {
        self.inner.set_bin_factor(bin_factor)
    }

    pub fn normalize_scores(&self) -> bool {
        self.inner.normalize_scores()
    }

    pub fn set_normalize_scores(&mut self, normalize: bool) {
        self.inner.set_normalize_scores(normalize);
    }

    pub fn match_coords(&self, coords1: &[f64], coords2: &[f64]) -> Option<f64> {
        self.inner.match_coords(coords1, coords2)
    }

    pub fn coord_bins(&mut self, coords: &[f64]) -> Vec<Cell> {
        self.inner.coord_bins(coords)
    }
}

impl fmt::Display for IsotropicCartesianEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-d Cartesian", self.inner.dimensions())
    }
}

impl MatchEngine for IsotropicCartesianEngine {
    fn match_score(&self, tuple1: &[Value], tuple2: &[Value]) -> Option<f64> {
        self.inner.match_score(tuple1, tuple2)
    }

    fn bins(&mut self, tuple: &[Value]) -> Vec<Cell> {
        self.inner.bins(tuple)
    }

    fn tuple_infos(&self) -> Vec<ValueInfo> {
        self.inner.tuple_infos()
    }

    fn match_score_info(&self) -> ValueInfo {
        self.inner.match_score_info()
    }

    fn match_parameters(&self) -> Vec<ValueInfo> {
        vec![ValueInfo::new(ERROR_PARAM, "Maximum Cartesian separation for match")
            .with_nullable(false)]
    }

    fn tuning_parameters(&self) -> Vec<ValueInfo> {
        self.inner.tuning_parameters()
    }

    fn parameter(&self, name: &str) -> Option<f64> {
        if name == ERROR_PARAM {
            return Some(self.error());
        }
        self.inner.tuning_parameter(name)
    }

    fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), EngineError> {
        if name == ERROR_PARAM {
            return self.set_error(value);
        }
        self.inner
            .set_tuning_parameter(name, value)
            .unwrap_or_else(|| Err(EngineError::UnknownParameter(name.to_owned())))
    }

    fn can_bound_match(&self) -> bool {
        true
    }

    fn match_bounds(&self, min: &[Value], max: &[Value]) -> MatchBounds {
        self.inner.match_bounds(min, max)
    }
}
