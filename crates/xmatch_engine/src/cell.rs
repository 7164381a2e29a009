//! Grid cell labels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Label of one cell of the N-dimensional bucket grid.
///
/// Two cells are the same key exactly when their integer labels agree on
/// every axis, so cells can be used directly in hash maps and sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell(Box<[i64]>);

impl Cell {
    pub fn new(label: impl Into<Box<[i64]>>) -> Self {
        Self(label.into())
    }

    /// Per-axis integer label.
    #[inline]
    pub fn label(&self) -> &[i64] {
        &self.0
    }

    pub fn dimensions(&self) -> usize {
        self.0.len()
    }

    /// Whether `other` is this cell or one of its immediate neighbours
    /// (Chebyshev distance at most 1 in label space).
    pub fn is_adjacent(&self, other: &Cell) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(other.0.iter())
                .all(|(a, b)| a.abs_diff(*b) <= 1)
    }
}

impl From<Vec<i64>> for Cell {
    fn from(label: Vec<i64>) -> Self {
        Self(label.into_boxed_slice())
    }
}

impl FromIterator<i64> for Cell {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashbrown::HashSet;

    #[test]
    fn equal_labels_are_equal_keys() {
        let a = Cell::new(vec![1, -2, 3]);
        let b: Cell = [1, -2, 3].into_iter().collect();
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(!set.insert(b));
        assert!(set.insert(Cell::new(vec![1, -2, 4])));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn adjacency_is_chebyshev_one() {
        let origin = Cell::new(vec![0, 0]);
        assert!(origin.is_adjacent(&Cell::new(vec![1, -1])));
        assert!(origin.is_adjacent(&origin));
        assert!(!origin.is_adjacent(&Cell::new(vec![2, 0])));
        assert!(!origin.is_adjacent(&Cell::new(vec![0, 0, 0])));
    }

    #[test]
    fn display_lists_components() {
        assert_eq!(Cell::new(vec![4, -7]).to_string(), "(4, -7)");
    }
}
