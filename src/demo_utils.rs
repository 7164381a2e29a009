//! Synthetic tables for demos, benches and tests.

use xmatch_rows::{CoordTable, MatchError};

/// SplitMix64; deterministic so demo output is reproducible.
#[derive(Debug, Clone)]
pub struct DemoRng(u64);

impl DemoRng {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Two `ndim`-dimensional tables of `rows` points in a cube of side `span`.
///
/// Every other row of table 2 is the same row of table 1 shifted by at most
/// `error / (2 * ndim)` on each axis, so it lies within `error` of it; the
/// rest are independent random points.
pub fn demo_tables(
    rows: usize,
    ndim: usize,
    span: f64,
    error: f64,
    seed: u64,
) -> Result<(CoordTable, CoordTable), MatchError> {
    let mut rng = DemoRng::new(seed);
    let mut t1 = Vec::with_capacity(rows);
    let mut t2 = Vec::with_capacity(rows);
    for row in 0..rows {
        let p: Vec<f64> = (0..ndim).map(|_| rng.next_f64() * span).collect();
        let q: Vec<f64> = if row % 2 == 0 {
            p.iter()
                .map(|c| c + (rng.next_f64() - 0.5) * error / ndim as f64)
                .collect()
        } else {
            (0..ndim).map(|_| rng.next_f64() * span).collect()
        };
        t1.push(p);
        t2.push(q);
    }
    Ok((CoordTable::from_coords(&t1)?, CoordTable::from_coords(&t2)?))
}
