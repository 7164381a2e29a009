use std::fmt;

use crate::bounds::MatchBounds;
use crate::cell::Cell;
use crate::engine::{CartesianMatchEngine, MatchEngine};
use crate::error::EngineError;
use crate::info::{ValueInfo, coordinate_name};
use crate::value::Value;

/// Cartesian matching with an independent error on each axis, so the match
/// region is an axis-aligned ellipsoid.
#[derive(Debug, Clone)]
pub struct AnisotropicCartesianEngine {
    inner: CartesianMatchEngine,
}

impl AnisotropicCartesianEngine {
    /// One engine dimension per entry of `errors`.
    pub fn new(errors: &[f64], normalize_scores: bool) -> Result<Self, EngineError> {
        let mut inner = CartesianMatchEngine::new(errors.len(), normalize_scores)?;
        for (dim, &error) in errors.iter().enumerate() {
            inner.set_error(dim, error)?;
        }
        Ok(Self { inner })
    }

    pub fn cartesian(&self) -> &CartesianMatchEngine {
        &self.inner
    }

    pub fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    /// # Panics
    /// If `dim` is out of range.
    pub fn error(&self, dim: usize) -> f64 {
        self.inner.error(dim)
    }

    pub fn errors(&self) -> &[f64] {
        self.inner.errors()
    }

    pub fn set_error(&mut self, dim: usize, error: f64) -> Result<(), EngineError> {
        self.inner.set_error(dim, error)
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

    fn error_param_name(&self, dim: usize) -> String {
        format!("Error in {}", coordinate_name(self.dimensions(), dim))
    }

    fn error_param_dim(&self, name: &str) -> Option<usize> {
        (0..self.dimensions()).find(|&dim| self.error_param_name(dim) == name)
    }
}

impl fmt::Display for AnisotropicCartesianEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-d Cartesian Anisotropic", self.inner.dimensions())
    }
}

impl MatchEngine for AnisotropicCartesianEngine {
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
        let ndim = self.dimensions();
        (0..ndim)
            .map(|dim| {
                let axis = coordinate_name(ndim, dim);
                ValueInfo::new(
                    format!("Error in {axis}"),
                    format!("Axis length of error ellipse in {axis} direction"),
                )
                .with_nullable(false)
            })
            .collect()
    }

    fn tuning_parameters(&self) -> Vec<ValueInfo> {
        self.inner.tuning_parameters()
    }

    fn parameter(&self, name: &str) -> Option<f64> {
        match self.error_param_dim(name) {
            Some(dim) => Some(self.error(dim)),
            None => self.inner.tuning_parameter(name),
        }
    }

    fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), EngineError> {
        if let Some(dim) = self.error_param_dim(name) {
            return self.set_error(dim, value);
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
