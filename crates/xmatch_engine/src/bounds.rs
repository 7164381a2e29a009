//! Expansion of coordinate ranges by the match error.
//!
//! A driver that can range-select rows (say, from a sorted column) asks for
//! the bounds of one table widened by the error, then only probes rows of the
//! other table inside them. Expanded bounds must be conservative: an integer
//! bound is rounded outward, and a bound that cannot be represented in its own
//! type becomes absent (unbounded) rather than wrapping.

use serde::{Deserialize, Serialize};

use crate::ellipsoid::ErrorEllipsoid;
use crate::value::Value;

/// Per-axis lower and upper bounds; [`Value::Null`] means unbounded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchBounds {
    pub min: Vec<Value>,
    pub max: Vec<Value>,
}

impl MatchBounds {
    /// Unbounded on every one of `ndim` axes.
    pub fn unbounded(ndim: usize) -> Self {
        Self {
            min: vec![Value::Null; ndim],
            max: vec![Value::Null; ndim],
        }
    }

    /// Whether `tuple` lies inside the bounds. Absent bounds always pass;
    /// a non-numeric coordinate fails any present bound.
    pub fn contains(&self, tuple: &[Value]) -> bool {
        let axes = self.min.len().max(self.max.len());
        (0..axes).all(|i| {
            let coord = tuple.get(i).and_then(Value::as_f64);
            let above = match self.min.get(i).and_then(Value::as_f64) {
                Some(lo) => coord.is_some_and(|c| c >= lo),
                None => true,
            };
            let below = match self.max.get(i).and_then(Value::as_f64) {
                Some(hi) => coord.is_some_and(|c| c <= hi),
                None => true,
            };
            above && below
        })
    }
}

/// Widens `[min_in, max_in]` by the ellipsoid's error on each axis.
///
/// Missing trailing entries are treated as absent.
pub fn expand_bounds(ellipsoid: &ErrorEllipsoid, min_in: &[Value], max_in: &[Value]) -> MatchBounds {
    let ndim = ellipsoid.dimensions();
    let mut out = MatchBounds::unbounded(ndim);
    for i in 0..ndim {
        let err = ellipsoid.error(i);
        if let Some(lo) = min_in.get(i) {
            out.min[i] = add(lo, -err);
        }
        if let Some(hi) = max_in.get(i) {
            out.max[i] = add(hi, err);
        }
    }
    out
}

/// Adds `inc` to a numeric value, keeping its type.
///
/// Integer results are rounded away from the original value (floor when
/// decrementing, ceiling when incrementing). Returns [`Value::Null`] for
/// non-numeric input, a NaN increment, or a result outside the type's range.
pub fn add(input: &Value, inc: f64) -> Value {
    let Some(base) = input.as_f64() else {
        return Value::Null;
    };
    if inc.is_nan() {
        return Value::Null;
    }
    if inc == 0.0 {
        return input.clone();
    }
    let dval = base + inc;
    let rounded = if inc < 0.0 { dval.floor() } else { dval.ceil() };

    match input {
        Value::Byte(_) => within(rounded, i8::MIN as f64, i8::MAX as f64)
            .map_or(Value::Null, |r| Value::Byte(r as i8)),
        Value::Short(_) => within(rounded, i16::MIN as f64, i16::MAX as f64)
            .map_or(Value::Null, |r| Value::Short(r as i16)),
        Value::Int(_) => within(rounded, i32::MIN as f64, i32::MAX as f64)
            .map_or(Value::Null, |r| Value::Int(r as i32)),
        // Longs past 2^53 are not exact in f64, so the step is taken in
        // integer arithmetic: ceil(v + inc) == v + ceil(inc) for integral v.
        Value::Long(v) => long_step(inc)
            .and_then(|step| v.checked_add(step))
            .map_or(Value::Null, Value::Long),
        Value::Float(_) => outward_f32(dval, inc).map_or(Value::Null, Value::Float),
        Value::Double(_) => Value::Double(dval),
        Value::Text(_) | Value::Null => Value::Null,
    }
}

/// `inc` rounded away from zero as an `i64`, if representable.
fn long_step(inc: f64) -> Option<i64> {
    let step = if inc < 0.0 { inc.floor() } else { inc.ceil() };
    // i64::MAX is not an f64; 2^63 is the first value past it.
    (step >= i64::MIN as f64 && step < -(i64::MIN as f64)).then_some(step as i64)
}

#[inline]
fn within(v: f64, lo: f64, hi: f64) -> Option<f64> {
    (v >= lo && v <= hi).then_some(v)
}

/// Narrows `dval` to `f32`, stepping one ulp outward if rounding went inward.
fn outward_f32(dval: f64, inc: f64) -> Option<f32> {
    let mut f = dval as f32;
    if inc < 0.0 && (f as f64) > dval {
        f = f.next_down();
    } else if inc > 0.0 && (f as f64) < dval {
        f = f.next_up();
    }
    (f.is_finite() || !dval.is_finite()).then_some(f)
}
