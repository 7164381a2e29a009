//! Tuple element values.
//!
//! Coordinate tuples arrive from table columns whose cells are not guaranteed
//! to be numeric. A [`Value`] keeps the column's numeric type so that bound
//! expansion can hand back a value of the same kind it was given.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single cell of a coordinate tuple.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// Non-numeric cell content; never usable as a coordinate.
    Text(String),
    /// Absent value (blank cell, unbounded range end).
    #[default]
    Null,
}

impl Value {
    /// Numeric content widened to `f64`, or `None` for text and null.
    ///
    /// NaN and infinities are returned as-is; callers decide whether they
    /// count as coordinates.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Byte(v) => Some(v as f64),
            Value::Short(v) => Some(v as f64),
            Value::Int(v) => Some(v as f64),
            Value::Long(v) => Some(v as f64),
            Value::Float(v) => Some(v as f64),
            Value::Double(v) => Some(v),
            Value::Text(_) | Value::Null => None,
        }
    }

    /// Numeric content that is usable as a grid coordinate (finite).
    #[inline]
    pub fn finite_f64(&self) -> Option<f64> {
        self.as_f64().filter(|v| v.is_finite())
    }

    pub fn is_numeric(&self) -> bool {
        self.as_f64().is_some()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Byte(v) => write!(f, "{v}"),
            Value::Short(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Null => f.write_str("null"),
        }
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_primitive!(
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    String => Text,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Convenience for building an all-`Double` tuple.
pub fn tuple(coords: &[f64]) -> Vec<Value> {
    coords.iter().copied().map(Value::Double).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_variants_widen_to_f64() {
        assert_eq!(Value::Byte(-3).as_f64(), Some(-3.0));
        assert_eq!(Value::Short(300).as_f64(), Some(300.0));
        assert_eq!(Value::Int(-70_000).as_f64(), Some(-70_000.0));
        assert_eq!(Value::Long(1 << 40).as_f64(), Some((1u64 << 40) as f64));
        assert_eq!(Value::Float(0.5).as_f64(), Some(0.5));
        assert_eq!(Value::Double(2.25).as_f64(), Some(2.25));
    }

    #[test]
    fn text_and_null_are_not_numeric() {
        assert_eq!(Value::from("12.5").as_f64(), None);
        assert_eq!(Value::Null.as_f64(), None);
        assert!(!Value::Null.is_numeric());
        assert!(Value::Null.is_null());
    }

    #[test]
    fn non_finite_values_are_not_coordinates() {
        assert!(Value::Double(f64::NAN).is_numeric());
        assert_eq!(Value::Double(f64::NAN).finite_f64(), None);
        assert_eq!(Value::Float(f32::INFINITY).finite_f64(), None);
        assert_eq!(Value::Double(-1.5).finite_f64(), Some(-1.5));
    }

    #[test]
    fn option_conversion_maps_none_to_null() {
        assert_eq!(Value::from(None::<f64>), Value::Null);
        assert_eq!(Value::from(Some(4_i32)), Value::Int(4));
    }

    #[test]
    fn serde_keeps_numeric_type() {
        let json = serde_json::to_string(&Value::Short(7)).unwrap();
        assert_eq!(json, r#"{"type":"short","value":7}"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Value::Short(7));
    }
}
