//! Progress reporting and cancellation for long matches.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::{debug, info};

use crate::types::MatchError;

/// Observer of a match run's stages.
///
/// `set_level` is called from worker threads during parallel probing, so
/// implementations must be thread-safe. Returning an error from it stops the
/// run with that error.
pub trait ProgressIndicator: Send + Sync {
    fn start_stage(&self, stage: &str);

    /// Fraction of the current stage completed, in `0.0..=1.0`.
    fn set_level(&self, level: f64) -> Result<(), MatchError>;

    fn end_stage(&self);
}

/// Ignores all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullIndicator;

impl ProgressIndicator for NullIndicator {
    fn start_stage(&self, _stage: &str) {}

    fn set_level(&self, _level: f64) -> Result<(), MatchError> {
        Ok(())
    }

    fn end_stage(&self) {}
}

/// Reports stages through `tracing`, with a debug event each time another
/// tenth of a stage completes.
#[derive(Debug, Default)]
pub struct LogIndicator {
    stage: Mutex<String>,
    decile: AtomicU32,
}

impl LogIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    fn stage_name(&self) -> String {
        self.stage
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ProgressIndicator for LogIndicator {
    fn start_stage(&self, stage: &str) {
        *self
            .stage
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = stage.to_owned();
        self.decile.store(0, Ordering::Relaxed);
        info!(stage, "stage_start");
    }

    fn set_level(&self, level: f64) -> Result<(), MatchError> {
        let decile = (level.clamp(0.0, 1.0) * 10.0) as u32;
        if self.decile.fetch_max(decile, Ordering::Relaxed) < decile {
            debug!(stage = %self.stage_name(), percent = decile * 10, "stage_progress");
        }
        Ok(())
    }

    fn end_stage(&self) {
        info!(stage = %self.stage_name(), "stage_end");
    }
}
