//! Workspace umbrella crate for XMatch.
//!
//! This crate ties the Cartesian match engine (`xmatch_engine`) to the
//! row-matching driver (`xmatch_rows`) behind a YAML configuration, so
//! callers can go from a config file and two tables to a set of row links
//! with a single call.

pub mod config;

#[doc(hidden)]
pub mod demo_utils;

use std::sync::Arc;

use thiserror::Error;

pub use crate::config::{ConfigLoadError, EngineKind, EngineYamlConfig, XmatchConfig};
pub use xmatch_engine::{
    AnisotropicCartesianEngine, BIN_FACTOR_PARAM, CartesianEngine, CartesianMatchEngine, Cell,
    DEFAULT_BIN_FACTOR, ERROR_PARAM, EngineError, ErrorEllipsoid, IsotropicCartesianEngine,
    MAX_DIMENSIONS, MatchBounds, MatchEngine, Value, ValueInfo, tuple,
};
pub use xmatch_rows::{
    CoordTable, LinkSet, LogIndicator, MatchError, MatchMetrics, MatchStats, NullIndicator,
    PairMode, ProgressIndicator, RowLink, RowMatchConfig, RowMatcher, RowRef, TupleSource,
    set_match_metrics,
};

/// Errors that can occur while running a configured match.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration failure: {0}")]
    Config(#[from] ConfigLoadError),

    #[error("match failure: {0}")]
    Match(#[from] MatchError),
}

/// Builds the engine and matcher described by `config` and pairs the rows of
/// the two tables.
pub fn match_tables<T1, T2>(
    config: &XmatchConfig,
    table1: &T1,
    table2: &T2,
) -> Result<(LinkSet, MatchStats), PipelineError>
where
    T1: TupleSource + Sync + ?Sized,
    T2: TupleSource + Sync + ?Sized,
{
    match_tables_with_progress(config, table1, table2, Arc::new(NullIndicator))
}

/// Same as [`match_tables`], reporting stages to `progress`.
pub fn match_tables_with_progress<T1, T2>(
    config: &XmatchConfig,
    table1: &T1,
    table2: &T2,
    progress: Arc<dyn ProgressIndicator>,
) -> Result<(LinkSet, MatchStats), PipelineError>
where
    T1: TupleSource + Sync + ?Sized,
    T2: TupleSource + Sync + ?Sized,
{
    let engine = config.build_engine()?;
    let matcher = RowMatcher::new(config.matcher.clone()).with_progress(progress);
    Ok(matcher.find_pair_matches_with_stats(&engine, table1, table2)?)
}
