use std::error::Error;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use xmatch::demo_utils::demo_tables;
use xmatch::{LogIndicator, XmatchConfig, match_tables_with_progress};

const DEMO_ROWS: usize = 20_000;

/// Usage: `xmatch [config.yaml] [rows]`
///
/// Matches two synthetic tables with the given (or default) configuration
/// and prints the run's counters and the first few links as JSON.
fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .json()
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => XmatchConfig::from_file(path)?,
        None => XmatchConfig::default(),
    };
    let rows = match args.next() {
        Some(n) => n.parse()?,
        None => DEMO_ROWS,
    };

    let engine = config.build_engine()?;
    let ndim = engine.cartesian().dimensions();
    let error = engine
        .cartesian()
        .errors()
        .iter()
        .copied()
        .fold(0.0, f64::max);
    let (t1, t2) = demo_tables(rows, ndim, 1000.0, error, 0x00C0_FFEE)?;

    let (links, stats) =
        match_tables_with_progress(&config, &t1, &t2, Arc::new(LogIndicator::new()))?;

    let sample: Vec<_> = links.iter().take(5).collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "engine": engine.to_string(),
            "stats": stats,
            "sample": sample,
        }))?
    );

    Ok(())
}
