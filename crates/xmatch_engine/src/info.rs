//! Descriptive metadata for tuple elements, scores and parameters.

use serde::{Deserialize, Serialize};

/// Name and description of a value an engine consumes, produces or exposes
/// as an adjustable parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueInfo {
    pub name: String,
    pub description: String,
    /// Unified Content Descriptor, when one applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ucd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(default = "ValueInfo::default_nullable")]
    pub nullable: bool,
}

impl ValueInfo {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ucd: None,
            units: None,
            nullable: true,
        }
    }

    pub fn with_ucd(mut self, ucd: impl Into<String>) -> Self {
        self.ucd = Some(ucd.into());
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub(crate) fn default_nullable() -> bool {
        true
    }
}

/// Name of Cartesian axis `dim` of an `ndim`-dimensional space.
///
/// # Panics
/// If `dim >= ndim`.
pub(crate) fn coordinate_name(ndim: usize, dim: usize) -> String {
    assert!(dim < ndim, "axis {dim} out of range for {ndim} dimensions");
    if ndim <= 3 {
        ["X", "Y", "Z"][dim].to_owned()
    } else {
        format!("Co-ord #{}", dim + 1)
    }
}

/// Description of Cartesian axis `dim`.
///
/// # Panics
/// If `dim >= ndim`.
pub(crate) fn coordinate_description(ndim: usize, dim: usize) -> String {
    assert!(dim < ndim, "axis {dim} out of range for {ndim} dimensions");
    format!("Cartesian co-ordinate #{}", dim + 1)
}

/// Tuple element metadata for axis `dim`.
pub(crate) fn coordinate_info(ndim: usize, dim: usize) -> ValueInfo {
    ValueInfo::new(coordinate_name(ndim, dim), coordinate_description(ndim, dim))
        .with_nullable(false)
}
