//! # XMatch Rows (`xmatch_rows`)
//!
//! ## Purpose
//!
//! `xmatch_rows` drives an [`xmatch_engine::MatchEngine`] over whole tables.
//! Given two tables of coordinate tuples it returns the links between rows
//! that the engine considers matches, without scoring every pair:
//!
//! 1. Rows of table 1 are hashed into the grid cells the engine assigns them.
//! 2. Optionally, rows of table 2 outside the error-expanded extent of
//!    table 1 are dropped.
//! 3. Each remaining row of table 2 is scored against the table 1 rows that
//!    share one of its cells, serially or on the rayon pool.
//! 4. A [`PairMode`] picks which of the matching pairs to keep.
//!
//! ## Core Types
//!
//! - [`TupleSource`] / [`CoordTable`]: row access to coordinate tuples.
//! - [`RowMatchConfig`]: pair mode, parallelism and bound filtering.
//! - [`RowMatcher`]: runs the match and reports through `tracing`.
//! - [`RowLink`] / [`LinkSet`]: the result.
//! - [`ProgressIndicator`]: stage and progress callbacks that may cancel.
//!
//! ## Example Usage
//!
//! ```
//! use xmatch_engine::IsotropicCartesianEngine;
//! use xmatch_rows::{CoordTable, PairMode, RowMatchConfig, RowMatcher};
//!
//! let engine = IsotropicCartesianEngine::new(2, 1.0, true)?;
//! let t1 = CoordTable::from_coords(&[[0.0, 0.0], [5.0, 5.0]])?;
//! let t2 = CoordTable::from_coords(&[[0.3, 0.4], [9.0, 9.0]])?;
//!
//! let matcher = RowMatcher::new(RowMatchConfig::new().with_mode(PairMode::Best));
//! let links = matcher.find_pair_matches(&engine, &t1, &t2)?;
//! assert_eq!(links.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Observability
//!
//! Install a [`MatchMetrics`] implementation via [`set_match_metrics`] to
//! record per-run latency and pair counts.

pub mod link;
pub mod matcher;
pub mod metrics;
pub mod progress;
pub mod table;
pub mod types;

pub use crate::link::{LinkSet, RowLink, RowRef};
pub use crate::matcher::{MatchStats, RowMatcher, STAGE_BIN, STAGE_PROBE};
pub use crate::metrics::{MatchMetrics, set_match_metrics};
pub use crate::progress::{LogIndicator, NullIndicator, ProgressIndicator};
pub use crate::table::{CoordTable, TupleSource};
pub use crate::types::{MatchError, PairMode, RowMatchConfig};
