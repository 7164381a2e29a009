//! Row sources for the matcher.

use xmatch_engine::Value;

use crate::types::MatchError;

/// Random-access source of coordinate tuples, one per row.
pub trait TupleSource {
    fn row_count(&self) -> usize;

    /// Number of values in each tuple.
    fn width(&self) -> usize;

    /// Tuple for `row`.
    ///
    /// # Panics
    /// If `row >= row_count()`.
    fn tuple(&self, row: usize) -> &[Value];
}

/// In-memory table of fixed-width tuples, stored row-major.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordTable {
    width: usize,
    values: Vec<Value>,
}

impl CoordTable {
    /// Empty table whose rows will hold `width` values.
    pub fn new(width: usize) -> Self {
        Self {
            width,
            values: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), MatchError> {
        if row.len() != self.width {
            return Err(MatchError::RaggedRow {
                row: self.row_count(),
                width: row.len(),
                expected: self.width,
            });
        }
        self.values.extend(row);
        Ok(())
    }

    /// Table from rows of values; width is taken from the first row.
    pub fn from_rows(rows: Vec<Vec<Value>>) -> Result<Self, MatchError> {
        let width = rows.first().map_or(0, Vec::len);
        let mut table = Self::new(width);
        table.values.reserve(width * rows.len());
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Table of `Double` values from plain coordinate rows.
    pub fn from_coords<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, MatchError> {
        Self::from_rows(
            rows.iter()
                .map(|r| r.as_ref().iter().copied().map(Value::Double).collect())
                .collect(),
        )
    }
}

impl TupleSource for CoordTable {
    fn row_count(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.values.len() / self.width
        }
    }

    fn width(&self) -> usize {
        self.width
    }

    fn tuple(&self, row: usize) -> &[Value] {
        let start = row * self.width;
        &self.values[start..start + self.width]
    }
}
