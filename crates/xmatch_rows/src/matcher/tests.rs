use super::*;
use std::sync::Mutex;
use std::time::Duration;

use xmatch_engine::{AnisotropicCartesianEngine, CartesianEngine, IsotropicCartesianEngine};

use crate::link::RowRef;
use crate::metrics::{MatchMetrics, set_match_metrics};
use crate::table::CoordTable;

/// Deterministic xorshift for reproducible random tables.
struct Rng(u64);

impl Rng {
    fn next_f64(&mut self) -> f64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn random_table(rng: &mut Rng, rows: usize, span: f64) -> CoordTable {
    let coords: Vec<[f64; 2]> = (0..rows)
        .map(|_| [rng.next_f64() * span, rng.next_f64() * span])
        .collect();
    CoordTable::from_coords(&coords).unwrap()
}

fn engine_2d(ex: f64, ey: f64) -> AnisotropicCartesianEngine {
    AnisotropicCartesianEngine::new(&[ex, ey], false).unwrap()
}

fn brute_force<E: MatchEngine>(engine: &E, t1: &CoordTable, t2: &CoordTable) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for i in 0..t1.row_count() {
        for j in 0..t2.row_count() {
            if engine.match_score(t1.tuple(i), t2.tuple(j)).is_some() {
                out.push((i, j));
            }
        }
    }
    out
}

fn row_pairs(links: &LinkSet) -> Vec<(usize, usize)> {
    links
        .iter()
        .map(|l| (l.row_in(0).unwrap(), l.row_in(1).unwrap()))
        .collect()
}

fn matcher(mode: PairMode) -> RowMatcher {
    RowMatcher::new(RowMatchConfig::new().with_mode(mode))
}

#[test]
fn all_mode_finds_exactly_the_brute_force_pairs() {
    let mut rng = Rng(0x5eed);
    let t1 = random_table(&mut rng, 300, 20.0);
    let t2 = random_table(&mut rng, 300, 20.0);
    let engine = engine_2d(0.6, 0.3);

    let expected = brute_force(&engine, &t1, &t2);
    assert!(!expected.is_empty());

    for bound_filter in [true, false] {
        let m = RowMatcher::new(
            RowMatchConfig::new()
                .with_mode(PairMode::All)
                .with_bound_filter(bound_filter),
        );
        let links = m.find_pair_matches(&engine, &t1, &t2).unwrap();
        assert_eq!(row_pairs(&links), expected);
    }
}

#[test]
fn scores_are_attached_to_links() {
    let t1 = CoordTable::from_coords(&[[0.0, 0.0]]).unwrap();
    let t2 = CoordTable::from_coords(&[[0.5, 0.0], [3.0, 3.0]]).unwrap();
    let links = matcher(PairMode::All)
        .find_pair_matches(&engine_2d(1.0, 1.0), &t1, &t2)
        .unwrap();
    assert_eq!(links.len(), 1);
    let link = links.iter().next().unwrap();
    assert_eq!(link.score, Some(0.5));
    assert_eq!(link.refs(), &[RowRef::new(0, 0), RowRef::new(1, 0)]);
}

#[test]
fn best_modes_choose_lowest_score() {
    let engine = AnisotropicCartesianEngine::new(&[1.0], false).unwrap();
    let t1 = CoordTable::from_coords(&[[0.0], [0.9]]).unwrap();
    let t2 = CoordTable::from_coords(&[[0.5]]).unwrap();

    let all = matcher(PairMode::All).find_pair_matches(&engine, &t1, &t2).unwrap();
    assert_eq!(row_pairs(&all), vec![(0, 0), (1, 0)]);

    let best = matcher(PairMode::Best).find_pair_matches(&engine, &t1, &t2).unwrap();
    assert_eq!(row_pairs(&best), vec![(1, 0)]);

    let best1 = matcher(PairMode::Best1).find_pair_matches(&engine, &t1, &t2).unwrap();
    assert_eq!(row_pairs(&best1), vec![(0, 0), (1, 0)]);

    let best2 = matcher(PairMode::Best2).find_pair_matches(&engine, &t1, &t2).unwrap();
    assert_eq!(row_pairs(&best2), vec![(1, 0)]);
}

#[test]
fn best_mode_is_greedy_by_score() {
    let engine = AnisotropicCartesianEngine::new(&[1.0], false).unwrap();
    let t1 = CoordTable::from_coords(&[[0.0], [1.0]]).unwrap();
    let t2 = CoordTable::from_coords(&[[0.1], [0.6]]).unwrap();
    let best = matcher(PairMode::Best).find_pair_matches(&engine, &t1, &t2).unwrap();
    assert_eq!(row_pairs(&best), vec![(0, 0), (1, 1)]);
}

#[test]
fn best_modes_keep_one_pair_per_row() {
    let mut rng = Rng(1234);
    let t1 = random_table(&mut rng, 400, 10.0);
    let t2 = random_table(&mut rng, 400, 10.0);
    let engine = engine_2d(0.8, 0.8);
    let all = matcher(PairMode::All).find_pair_matches(&engine, &t1, &t2).unwrap();

    let best1 = matcher(PairMode::Best1).find_pair_matches(&engine, &t1, &t2).unwrap();
    let mut rows1: Vec<_> = best1.iter().map(|l| l.row_in(0).unwrap()).collect();
    let n = rows1.len();
    rows1.dedup();
    assert_eq!(rows1.len(), n);
    for link in &best1 {
        let row1 = link.row_in(0).unwrap();
        let lowest = all
            .iter()
            .filter(|l| l.row_in(0) == Some(row1))
            .map(|l| l.score.unwrap())
            .fold(f64::INFINITY, f64::min);
        assert_eq!(link.score, Some(lowest));
    }

    let best2 = matcher(PairMode::Best2).find_pair_matches(&engine, &t1, &t2).unwrap();
    let rows2: HashSet<_> = best2.iter().map(|l| l.row_in(1).unwrap()).collect();
    assert_eq!(rows2.len(), best2.len());

    let best = matcher(PairMode::Best).find_pair_matches(&engine, &t1, &t2).unwrap();
    let r1: HashSet<_> = best.iter().map(|l| l.row_in(0).unwrap()).collect();
    let r2: HashSet<_> = best.iter().map(|l| l.row_in(1).unwrap()).collect();
    assert_eq!(r1.len(), best.len());
    assert_eq!(r2.len(), best.len());
    assert!(best.len() <= best1.len().min(best2.len()));
}

#[test]
fn parallel_and_serial_runs_agree() {
    let mut rng = Rng(77);
    let t1 = random_table(&mut rng, 1500, 30.0);
    let t2 = random_table(&mut rng, 1500, 30.0);
    let engine: CartesianEngine = IsotropicCartesianEngine::new(2, 0.5, true).unwrap().into();

    for mode in [PairMode::All, PairMode::Best, PairMode::Best1, PairMode::Best2] {
        let serial = RowMatcher::new(RowMatchConfig::new().with_mode(mode))
            .find_pair_matches(&engine, &t1, &t2)
            .unwrap();
        let parallel = RowMatcher::new(RowMatchConfig::new().with_mode(mode).with_parallel(true))
            .find_pair_matches(&engine, &t1, &t2)
            .unwrap();
        assert_eq!(serial, parallel, "mode {mode}");
    }
}

#[test]
fn rows_without_usable_coordinates_are_skipped() {
    let t1 = CoordTable::from_rows(vec![
        vec![Value::Double(0.0), Value::Double(0.0)],
        vec![Value::Null, Value::Double(0.0)],
        vec![Value::Double(f64::NAN), Value::Double(0.0)],
    ])
    .unwrap();
    let t2 = CoordTable::from_rows(vec![
        vec![Value::Int(0), Value::Int(0)],
        vec![Value::from("nope"), Value::Int(0)],
    ])
    .unwrap();

    let (links, stats) = matcher(PairMode::All)
        .find_pair_matches_with_stats(&engine_2d(1.0, 1.0), &t1, &t2)
        .unwrap();
    assert_eq!(row_pairs(&links), vec![(0, 0)]);
    assert_eq!(stats.unbinned1, 2);
    // The text row fails the bounds check before it is binned.
    assert_eq!(stats.unbinned2 + stats.excluded2, 1);
    assert_eq!(stats.rows1, 3);
    assert_eq!(stats.pairs, 1);
}

#[test]
fn bound_filter_excludes_distant_rows() {
    let t1 = CoordTable::from_coords(&[[0.0, 0.0], [1.0, 1.0]]).unwrap();
    let t2 = CoordTable::from_coords(&[[0.5, 0.5], [100.0, 100.0], [-50.0, 0.0]]).unwrap();
    let engine = engine_2d(1.0, 1.0);

    let (_, filtered) = matcher(PairMode::All)
        .find_pair_matches_with_stats(&engine, &t1, &t2)
        .unwrap();
    assert_eq!(filtered.excluded2, 2);

    let unfiltered = RowMatcher::new(
        RowMatchConfig::new()
            .with_mode(PairMode::All)
            .with_bound_filter(false),
    );
    let (links, stats) = unfiltered
        .find_pair_matches_with_stats(&engine, &t1, &t2)
        .unwrap();
    assert_eq!(stats.excluded2, 0);
    assert_eq!(row_pairs(&links), vec![(0, 0), (1, 0)]);
}

#[test]
fn tuple_width_must_match_engine() {
    let t1 = CoordTable::from_coords(&[[0.0, 0.0, 0.0]]).unwrap();
    let t2 = CoordTable::from_coords(&[[0.0, 0.0]]).unwrap();
    let err = matcher(PairMode::All)
        .find_pair_matches(&engine_2d(1.0, 1.0), &t1, &t2)
        .unwrap_err();
    assert_eq!(
        err,
        MatchError::TupleWidth {
            table: 0,
            width: 3,
            expected: 2
        }
    );
}

#[test]
fn empty_tables_give_no_links() {
    let empty = CoordTable::new(0);
    let t = CoordTable::from_coords(&[[0.0, 0.0]]).unwrap();
    let engine = engine_2d(1.0, 1.0);
    let m = matcher(PairMode::Best);
    assert!(m.find_pair_matches(&engine, &empty, &t).unwrap().is_empty());
    assert!(m.find_pair_matches(&engine, &t, &empty).unwrap().is_empty());
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = RowMatchConfig {
        version: 0,
        ..RowMatchConfig::default()
    };
    let t = CoordTable::from_coords(&[[0.0, 0.0]]).unwrap();
    let err = RowMatcher::new(cfg)
        .find_pair_matches(&engine_2d(1.0, 1.0), &t, &t)
        .unwrap_err();
    assert!(matches!(err, MatchError::Config(_)));
}

/// Interrupts once `limit` progress updates have been seen.
struct CancelAfter {
    limit: usize,
    calls: AtomicUsize,
    stages: Mutex<Vec<String>>,
}

impl CancelAfter {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            calls: AtomicUsize::new(0),
            stages: Mutex::new(Vec::new()),
        }
    }
}

impl ProgressIndicator for CancelAfter {
    fn start_stage(&self, stage: &str) {
        self.stages.lock().unwrap().push(stage.to_owned());
    }

    fn set_level(&self, _level: f64) -> Result<(), MatchError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) >= self.limit {
            let stage = self.stages.lock().unwrap().last().cloned().unwrap_or_default();
            return Err(MatchError::Interrupted { stage });
        }
        Ok(())
    }

    fn end_stage(&self) {}
}

#[test]
fn progress_indicator_sees_both_stages() {
    let mut rng = Rng(5);
    let t1 = random_table(&mut rng, 50, 5.0);
    let t2 = random_table(&mut rng, 50, 5.0);
    let indicator = Arc::new(CancelAfter::new(usize::MAX));
    let m = matcher(PairMode::All).with_progress(indicator.clone());
    m.find_pair_matches(&engine_2d(0.5, 0.5), &t1, &t2).unwrap();
    assert_eq!(
        *indicator.stages.lock().unwrap(),
        vec![STAGE_BIN.to_owned(), STAGE_PROBE.to_owned()]
    );
}

#[test]
fn indicator_can_interrupt_a_run() {
    let mut rng = Rng(6);
    let t1 = random_table(&mut rng, 200, 5.0);
    let t2 = random_table(&mut rng, 200, 5.0);
    let engine = engine_2d(0.5, 0.5);

    for parallel in [false, true] {
        // Binning reports about a hundred times, so the limit falls inside
        // the probe stage.
        let indicator = Arc::new(CancelAfter::new(150));
        let m = RowMatcher::new(RowMatchConfig::new().with_parallel(parallel))
            .with_progress(indicator);
        let err = m.find_pair_matches(&engine, &t1, &t2).unwrap_err();
        assert_eq!(
            err,
            MatchError::Interrupted {
                stage: STAGE_PROBE.to_owned()
            }
        );
    }
}

struct RecordingMetrics {
    events: Mutex<Vec<(PairMode, usize, usize, usize)>>,
}

impl MatchMetrics for RecordingMetrics {
    fn record_match(
        &self,
        mode: PairMode,
        rows1: usize,
        rows2: usize,
        _latency: Duration,
        pairs: usize,
    ) {
        self.events.lock().unwrap().push((mode, rows1, rows2, pairs));
    }
}

#[test]
fn metrics_recorder_observes_matches() {
    let metrics = Arc::new(RecordingMetrics {
        events: Mutex::new(Vec::new()),
    });
    set_match_metrics(Some(metrics.clone()));

    let t1 = CoordTable::from_coords(&[[0.0, 0.0], [9.0, 9.0], [4.0, 4.0]]).unwrap();
    let t2 = CoordTable::from_coords(&[[0.1, 0.1]]).unwrap();
    matcher(PairMode::Best2)
        .find_pair_matches(&engine_2d(1.0, 1.0), &t1, &t2)
        .unwrap();

    // Other tests may run concurrently and report through the same global
    // recorder, so look for this run's event rather than counting.
    let events = metrics.events.lock().unwrap().clone();
    assert!(events.contains(&(PairMode::Best2, 3, 1, 1)));

    set_match_metrics(None);
}
