use serde::{Deserialize, Serialize};
use thiserror::Error;
use xmatch_engine::EngineError;

/// Which of the matched pairs to keep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PairMode {
    /// Every matching pair.
    All,
    /// Best symmetric pairs: each row of either table appears in at most one
    /// pair. Pairs are taken greedily in order of ascending score.
    #[default]
    Best,
    /// Best match for each row of table 1; table 2 rows may repeat.
    Best1,
    /// Best match for each row of table 2; table 1 rows may repeat.
    Best2,
}

impl PairMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PairMode::All => "all",
            PairMode::Best => "best",
            PairMode::Best1 => "best1",
            PairMode::Best2 => "best2",
        }
    }
}

impl std::fmt::Display for PairMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a pair-matching run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RowMatchConfig {
    /// Configuration schema version.
    #[serde(default = "RowMatchConfig::default_version")]
    pub version: u32,
    #[serde(default)]
    pub mode: PairMode,
    /// Probe table 2 on the rayon thread pool, one engine clone per worker.
    #[serde(default)]
    pub use_parallel: bool,
    /// Skip table 2 rows outside the error-expanded bounds of table 1 when
    /// the engine can bound matches.
    #[serde(default = "RowMatchConfig::default_bound_filter")]
    pub bound_filter: bool,
}

impl RowMatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn default_version() -> u32 {
        1
    }

    pub(crate) fn default_bound_filter() -> bool {
        true
    }

    pub fn with_mode(mut self, mode: PairMode) -> Self {
        self.mode = mode;
        self
    }

    /// Parallel probing pays off once table 2 has a few thousand rows.
    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    pub fn with_bound_filter(mut self, bound_filter: bool) -> Self {
        self.bound_filter = bound_filter;
        self
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.version < 1 {
            return Err(MatchError::Config(format!(
                "version must be >= 1 (got {})",
                self.version
            )));
        }
        Ok(())
    }
}

impl Default for RowMatchConfig {
    fn default() -> Self {
        Self {
            version: Self::default_version(),
            mode: PairMode::default(),
            use_parallel: false,
            bound_filter: Self::default_bound_filter(),
        }
    }
}

/// Errors returned by the row-matching driver.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("table {table} has tuples of width {width}; engine expects {expected}")]
    TupleWidth {
        table: usize,
        width: usize,
        expected: usize,
    },

    #[error("row {row} has {width} values; table width is {expected}")]
    RaggedRow {
        row: usize,
        width: usize,
        expected: usize,
    },

    #[error("match interrupted during stage '{stage}'")]
    Interrupted { stage: String },

    #[error("invalid matcher config: {0}")]
    Config(String),
}
