//! # XMatch Engine (`xmatch_engine`)
//!
//! ## Purpose
//!
//! `xmatch_engine` decides whether two N-dimensional Cartesian points match.
//! Two points match when their separation lies inside an axis-aligned error
//! ellipsoid whose principal radii are the per-axis match errors.
//!
//! Besides the pairwise test, an engine supplies the two pieces a driver
//! needs to avoid comparing every row against every other row:
//!
//! - **Grid bucketing**: [`MatchEngine::bins`] returns labels of grid cells
//!   near a point. Any two points that match share at least one label, so a
//!   driver only compares points that landed in a common cell.
//! - **Bound expansion**: [`MatchEngine::match_bounds`] widens a coordinate
//!   range by the error, so a driver can restrict one table to the region
//!   that might match the other.
//!
//! ## Core Types
//!
//! - [`Value`]: a typed tuple element (integers, floats, text, null).
//! - [`Cell`]: a grid cell label usable as a hash key.
//! - [`ErrorEllipsoid`]: per-axis errors with derived weights and bin sizes.
//! - [`CartesianMatchEngine`]: the shared scorer, indexer and bound expander.
//! - [`IsotropicCartesianEngine`] / [`AnisotropicCartesianEngine`]: one
//!   error for all axes, or one per axis.
//! - [`CartesianEngine`]: either of the two, chosen at runtime.
//!
//! ## Example Usage
//!
//! ```
//! use xmatch_engine::{AnisotropicCartesianEngine, MatchEngine, tuple};
//!
//! let mut engine = AnisotropicCartesianEngine::new(&[1.0, 1.0], false)?;
//! let a = tuple(&[0.0, 0.0]);
//! let b = tuple(&[0.5, 0.5]);
//!
//! let score = engine.match_score(&a, &b).expect("points match");
//! assert!((score - 0.5_f64.sqrt()).abs() < 1e-12);
//!
//! let bins_a = engine.bins(&a);
//! let bins_b = engine.bins(&b);
//! assert!(bins_a.iter().any(|c| bins_b.contains(c)));
//! # Ok::<(), xmatch_engine::EngineError>(())
//! ```
//!
//! ## Threading
//!
//! Binning reuses buffers owned by the engine, so [`MatchEngine::bins`]
//! takes `&mut self`. Engines are cheap to clone; give each worker its own.

pub mod anisotropic;
pub mod bounds;
pub mod cell;
pub mod ellipsoid;
pub mod engine;
pub mod error;
mod grid;
pub mod info;
pub mod isotropic;
pub mod score;
pub mod value;

pub use crate::anisotropic::AnisotropicCartesianEngine;
pub use crate::bounds::{MatchBounds, add, expand_bounds};
pub use crate::cell::Cell;
pub use crate::ellipsoid::{DEFAULT_BIN_FACTOR, ErrorEllipsoid, ZERO_ERROR_WEIGHT};
pub use crate::engine::{
    BIN_FACTOR_PARAM, CartesianEngine, CartesianMatchEngine, MAX_DIMENSIONS, MatchEngine,
};
pub use crate::error::EngineError;
pub use crate::grid::base_label;
pub use crate::info::ValueInfo;
pub use crate::isotropic::{ERROR_PARAM, IsotropicCartesianEngine};
pub use crate::score::{coord_score, ellipsoid_score};
pub use crate::value::{Value, tuple};
