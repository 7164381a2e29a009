use std::cmp::Ordering as CmpOrdering;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use hashbrown::hash_map::Entry;
use hashbrown::{HashMap, HashSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{Level, info, warn};
use xmatch_engine::{Cell, MatchBounds, MatchEngine, Value};

use crate::link::{LinkSet, RowLink};
use crate::metrics::metrics_recorder;
use crate::progress::{NullIndicator, ProgressIndicator};
use crate::table::TupleSource;
use crate::types::{MatchError, PairMode, RowMatchConfig};

#[cfg(test)]
mod tests;

pub const STAGE_BIN: &str = "Binning rows for table 1";
pub const STAGE_PROBE: &str = "Scanning rows for table 2";

/// Per-cell lists of table 1 rows.
type CellIndex = HashMap<Cell, Vec<usize>>;

/// Counters gathered during one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStats {
    pub rows1: usize,
    pub rows2: usize,
    /// Table 1 rows with no bins (non-numeric or non-finite coordinates).
    pub unbinned1: usize,
    /// Table 2 rows with no bins.
    pub unbinned2: usize,
    /// Table 2 rows outside the expanded bounds of table 1.
    pub excluded2: usize,
    /// Distinct (row1, row2) pairs that were scored.
    pub candidates: usize,
    /// Matching pairs before the pair-mode filter.
    pub raw_pairs: usize,
    pub pairs: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct ProbeCounts {
    unbinned: usize,
    excluded: usize,
    candidates: usize,
}

impl ProbeCounts {
    fn merge(mut self, other: ProbeCounts) -> Self {
        self.unbinned += other.unbinned;
        self.excluded += other.excluded;
        self.candidates += other.candidates;
        self
    }
}

/// Finds matching pairs of rows between two tables.
///
/// Table 1 is binned into a hash of grid cells; each row of table 2 then
/// scores only the table 1 rows sharing one of its cells.
pub struct RowMatcher {
    config: RowMatchConfig,
    progress: Arc<dyn ProgressIndicator>,
}

impl RowMatcher {
    pub fn new(config: RowMatchConfig) -> Self {
        Self {
            config,
            progress: Arc::new(NullIndicator),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressIndicator>) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &RowMatchConfig {
        &self.config
    }

    /// Links between rows of `table1` (table 0) and `table2` (table 1) that
    /// the engine considers matches, filtered by the configured pair mode and
    /// sorted by row.
    ///
    /// The engine is cloned rather than mutated; with `use_parallel` each
    /// rayon worker gets its own clone.
    pub fn find_pair_matches<E, T1, T2>(
        &self,
        engine: &E,
        table1: &T1,
        table2: &T2,
    ) -> Result<LinkSet, MatchError>
    where
        E: MatchEngine + Clone + Send + Sync,
        T1: TupleSource + Sync + ?Sized,
        T2: TupleSource + Sync + ?Sized,
    {
        self.find_pair_matches_with_stats(engine, table1, table2)
            .map(|(links, _)| links)
    }

    /// Same as [`find_pair_matches`](Self::find_pair_matches), also
    /// returning the run's counters.
    pub fn find_pair_matches_with_stats<E, T1, T2>(
        &self,
        engine: &E,
        table1: &T1,
        table2: &T2,
    ) -> Result<(LinkSet, MatchStats), MatchError>
    where
        E: MatchEngine + Clone + Send + Sync,
        T1: TupleSource + Sync + ?Sized,
        T2: TupleSource + Sync + ?Sized,
    {
        let start = Instant::now();
        let span = tracing::span!(
            Level::INFO,
            "xmatch_rows.find_pair_matches",
            engine = %engine,
            mode = %self.config.mode,
            parallel = self.config.use_parallel
        );
        let _guard = span.enter();

        match self.run(engine, table1, table2) {
            Ok((links, stats)) => {
                let latency = start.elapsed();
                info!(
                    rows1 = stats.rows1,
                    rows2 = stats.rows2,
                    pairs = stats.pairs,
                    raw_pairs = stats.raw_pairs,
                    candidates = stats.candidates,
                    skipped = stats.unbinned1 + stats.unbinned2,
                    excluded = stats.excluded2,
                    elapsed_micros = latency.as_micros(),
                    "pair_match_success"
                );
                if let Some(recorder) = metrics_recorder() {
                    recorder.record_match(
                        self.config.mode,
                        stats.rows1,
                        stats.rows2,
                        latency,
                        stats.pairs,
                    );
                }
                Ok((links, stats))
            }
            Err(err) => {
                warn!(
                    error = %err,
                    elapsed_micros = start.elapsed().as_micros(),
                    "pair_match_failure"
                );
                Err(err)
            }
        }
    }

    fn run<E, T1, T2>(
        &self,
        engine: &E,
        table1: &T1,
        table2: &T2,
    ) -> Result<(LinkSet, MatchStats), MatchError>
    where
        E: MatchEngine + Clone + Send + Sync,
        T1: TupleSource + Sync + ?Sized,
        T2: TupleSource + Sync + ?Sized,
    {
        self.config.validate()?;
        let ndim = engine.tuple_infos().len();
        check_width(0, table1, ndim)?;
        check_width(1, table2, ndim)?;

        let mut stats = MatchStats {
            rows1: table1.row_count(),
            rows2: table2.row_count(),
            ..MatchStats::default()
        };

        let mut worker = engine.clone();
        let (index, extent) = self.stage(STAGE_BIN, || {
            self.bin_rows(&mut worker, table1, ndim, &mut stats)
        })?;

        // Nothing in table 1 can match anything.
        let Some(extent) = extent else {
            return Ok((LinkSet::new(), stats));
        };

        let bounds = (self.config.bound_filter && engine.can_bound_match())
            .then(|| extent.expand(engine));

        let (links, counts) = self.stage(STAGE_PROBE, || {
            if self.config.use_parallel {
                self.probe_parallel(engine, &index, bounds.as_ref(), table1, table2)
            } else {
                self.probe_serial(&mut worker, &index, bounds.as_ref(), table1, table2)
            }
        })?;

        stats.unbinned2 = counts.unbinned;
        stats.excluded2 = counts.excluded;
        stats.candidates = counts.candidates;
        stats.raw_pairs = links.len();

        let mut selected = select_pairs(self.config.mode, links);
        selected.sort();
        stats.pairs = selected.len();
        Ok((selected, stats))
    }

    fn stage<R>(
        &self,
        name: &str,
        body: impl FnOnce() -> Result<R, MatchError>,
    ) -> Result<R, MatchError> {
        self.progress.start_stage(name);
        let out = body();
        self.progress.end_stage();
        out
    }

    /// Reports about a hundred times per stage, whatever its length.
    fn report(&self, done: usize, total: usize) -> Result<(), MatchError> {
        let stride = (total / 100).max(1);
        if done % stride == 0 || done == total {
            self.progress.set_level(done as f64 / total.max(1) as f64)?;
        }
        Ok(())
    }

    fn bin_rows<E, T>(
        &self,
        engine: &mut E,
        table: &T,
        ndim: usize,
        stats: &mut MatchStats,
    ) -> Result<(CellIndex, Option<Extent>), MatchError>
    where
        E: MatchEngine,
        T: TupleSource + ?Sized,
    {
        let n = table.row_count();
        let mut index = CellIndex::new();
        let mut extent: Option<Extent> = None;
        for row in 0..n {
            self.report(row, n)?;
            let tuple = table.tuple(row);
            let cells = engine.bins(tuple);
            if cells.is_empty() {
                stats.unbinned1 += 1;
                continue;
            }
            extent
                .get_or_insert_with(|| Extent::new(ndim))
                .include(tuple);
            for cell in cells {
                index.entry(cell).or_default().push(row);
            }
        }
        self.report(n, n)?;
        Ok((index, extent))
    }

    fn probe_serial<E, T1, T2>(
        &self,
        engine: &mut E,
        index: &CellIndex,
        bounds: Option<&MatchBounds>,
        table1: &T1,
        table2: &T2,
    ) -> Result<(Vec<RowLink>, ProbeCounts), MatchError>
    where
        E: MatchEngine,
        T1: TupleSource + ?Sized,
        T2: TupleSource + ?Sized,
    {
        let n = table2.row_count();
        let mut seen = HashSet::new();
        let mut links = Vec::new();
        let mut counts = ProbeCounts::default();
        for row2 in 0..n {
            self.report(row2, n)?;
            let row_counts = probe_row(
                engine, &mut seen, index, bounds, table1, table2, row2, &mut links,
            );
            counts = counts.merge(row_counts);
        }
        self.report(n, n)?;
        Ok((links, counts))
    }

    fn probe_parallel<E, T1, T2>(
        &self,
        engine: &E,
        index: &CellIndex,
        bounds: Option<&MatchBounds>,
        table1: &T1,
        table2: &T2,
    ) -> Result<(Vec<RowLink>, ProbeCounts), MatchError>
    where
        E: MatchEngine + Clone + Send + Sync,
        T1: TupleSource + Sync + ?Sized,
        T2: TupleSource + Sync + ?Sized,
    {
        let n = table2.row_count();
        let done = AtomicUsize::new(0);
        let out = (0..n)
            .into_par_iter()
            .map_init(
                || (engine.clone(), HashSet::new()),
                |(worker, seen), row2| {
                    self.report(done.fetch_add(1, Ordering::Relaxed), n)?;
                    let mut links = Vec::new();
                    let counts = probe_row(
                        worker, seen, index, bounds, table1, table2, row2, &mut links,
                    );
                    Ok::<_, MatchError>((links, counts))
                },
            )
            .try_reduce(
                || (Vec::new(), ProbeCounts::default()),
                |(mut links, counts), (more, more_counts)| {
                    links.extend(more);
                    Ok((links, counts.merge(more_counts)))
                },
            )?;
        self.report(n, n)?;
        Ok(out)
    }
}

/// Scores one table 2 row against the table 1 rows sharing its cells.
#[allow(clippy::too_many_arguments)]
fn probe_row<E, T1, T2>(
    engine: &mut E,
    seen: &mut HashSet<usize>,
    index: &CellIndex,
    bounds: Option<&MatchBounds>,
    table1: &T1,
    table2: &T2,
    row2: usize,
    links: &mut Vec<RowLink>,
) -> ProbeCounts
where
    E: MatchEngine,
    T1: TupleSource + ?Sized,
    T2: TupleSource + ?Sized,
{
    let mut counts = ProbeCounts::default();
    let tuple2 = table2.tuple(row2);
    if bounds.is_some_and(|b| !b.contains(tuple2)) {
        counts.excluded = 1;
        return counts;
    }
    let cells = engine.bins(tuple2);
    if cells.is_empty() {
        counts.unbinned = 1;
        return counts;
    }

    seen.clear();
    for cell in &cells {
        let Some(rows) = index.get(cell) else {
            continue;
        };
        for &row1 in rows {
            if !seen.insert(row1) {
                continue;
            }
            counts.candidates += 1;
            if let Some(score) = engine.match_score(table1.tuple(row1), tuple2) {
                links.push(RowLink::pair(row1, row2, score));
            }
        }
    }
    counts
}

fn check_width<T: TupleSource + ?Sized>(
    table: usize,
    source: &T,
    expected: usize,
) -> Result<(), MatchError> {
    let width = source.width();
    if source.row_count() > 0 && width != expected {
        return Err(MatchError::TupleWidth {
            table,
            width,
            expected,
        });
    }
    Ok(())
}

/// Per-axis range of the binned rows of a table.
#[derive(Debug, Clone)]
struct Extent {
    min: Vec<f64>,
    max: Vec<f64>,
}

impl Extent {
    fn new(ndim: usize) -> Self {
        Self {
            min: vec![f64::INFINITY; ndim],
            max: vec![f64::NEG_INFINITY; ndim],
        }
    }

    fn include(&mut self, tuple: &[Value]) {
        for (i, value) in tuple.iter().enumerate().take(self.min.len()) {
            if let Some(c) = value.finite_f64() {
                self.min[i] = self.min[i].min(c);
                self.max[i] = self.max[i].max(c);
            }
        }
    }

    fn expand<E: MatchEngine + ?Sized>(&self, engine: &E) -> MatchBounds {
        let bound = |v: f64| {
            if v.is_finite() {
                Value::Double(v)
            } else {
                Value::Null
            }
        };
        let min: Vec<Value> = self.min.iter().copied().map(bound).collect();
        let max: Vec<Value> = self.max.iter().copied().map(bound).collect();
        engine.match_bounds(&min, &max)
    }
}

#[inline]
fn score_of(link: &RowLink) -> f64 {
    link.score.unwrap_or(f64::INFINITY)
}

/// Ascending score; ties go to the lower row references.
fn compare_links(a: &RowLink, b: &RowLink) -> CmpOrdering {
    score_of(a)
        .total_cmp(&score_of(b))
        .then_with(|| a.refs().cmp(b.refs()))
}

fn select_pairs(mode: PairMode, mut links: Vec<RowLink>) -> LinkSet {
    match mode {
        PairMode::All => links.into(),
        PairMode::Best1 => best_per_row(links, 0),
        PairMode::Best2 => best_per_row(links, 1),
        PairMode::Best => {
            links.sort_by(compare_links);
            let mut used1 = HashSet::new();
            let mut used2 = HashSet::new();
            links
                .into_iter()
                .filter(|link| match (link.row_in(0), link.row_in(1)) {
                    (Some(r1), Some(r2)) => {
                        if used1.contains(&r1) || used2.contains(&r2) {
                            false
                        } else {
                            used1.insert(r1);
                            used2.insert(r2);
                            true
                        }
                    }
                    _ => false,
                })
                .collect()
        }
    }
}

fn best_per_row(links: Vec<RowLink>, table: usize) -> LinkSet {
    let mut best: HashMap<usize, RowLink> = HashMap::new();
    for link in links {
        let Some(row) = link.row_in(table) else {
            continue;
        };
        match best.entry(row) {
            Entry::Vacant(slot) => {
                slot.insert(link);
            }
            Entry::Occupied(mut slot) => {
                if compare_links(&link, slot.get()) == CmpOrdering::Less {
                    slot.insert(link);
                }
            }
        }
    }
    best.into_values().collect()
}
