//! Match results: references to table rows and the links joining them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One row of one input table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowRef {
    pub table: usize,
    pub row: usize,
}

impl RowRef {
    pub fn new(table: usize, row: usize) -> Self {
        Self { table, row }
    }
}

impl fmt::Display for RowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.table, self.row)
    }
}

/// A group of rows that matched each other, with the match score if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowLink {
    refs: Vec<RowRef>,
    pub score: Option<f64>,
}

impl RowLink {
    /// Refs are stored sorted, so links over the same rows compare equal
    /// regardless of the order they were given in.
    pub fn new(mut refs: Vec<RowRef>, score: Option<f64>) -> Self {
        refs.sort_unstable();
        Self { refs, score }
    }

    /// Link between row `row1` of table 0 and row `row2` of table 1.
    pub fn pair(row1: usize, row2: usize, score: f64) -> Self {
        Self {
            refs: vec![RowRef::new(0, row1), RowRef::new(1, row2)],
            score: Some(score),
        }
    }

    pub fn refs(&self) -> &[RowRef] {
        &self.refs
    }

    /// Row index in `table`, if this link touches it.
    pub fn row_in(&self, table: usize) -> Option<usize> {
        self.refs.iter().find(|r| r.table == table).map(|r| r.row)
    }
}

/// Ordered collection of match links.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkSet {
    links: Vec<RowLink>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, link: RowLink) {
        self.links.push(link);
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RowLink> {
        self.links.iter()
    }

    /// Sorts links by their row references.
    pub fn sort(&mut self) {
        self.links.sort_by(|a, b| a.refs.cmp(&b.refs));
    }

    pub fn into_vec(self) -> Vec<RowLink> {
        self.links
    }
}

impl From<Vec<RowLink>> for LinkSet {
    fn from(links: Vec<RowLink>) -> Self {
        Self { links }
    }
}

impl FromIterator<RowLink> for LinkSet {
    fn from_iter<I: IntoIterator<Item = RowLink>>(iter: I) -> Self {
        Self {
            links: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for LinkSet {
    type Item = RowLink;
    type IntoIter = std::vec::IntoIter<RowLink>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.into_iter()
    }
}

impl<'a> IntoIterator for &'a LinkSet {
    type Item = &'a RowLink;
    type IntoIter = std::slice::Iter<'a, RowLink>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_refs_are_sorted() {
        let link = RowLink::new(vec![RowRef::new(1, 0), RowRef::new(0, 5)], None);
        assert_eq!(link.refs(), &[RowRef::new(0, 5), RowRef::new(1, 0)]);
        assert_eq!(link, RowLink::new(vec![RowRef::new(0, 5), RowRef::new(1, 0)], None));
        assert_eq!(link.row_in(1), Some(0));
        assert_eq!(link.row_in(2), None);
    }

    #[test]
    fn link_set_sorts_by_refs() {
        let mut set: LinkSet = vec![
            RowLink::pair(2, 0, 0.1),
            RowLink::pair(0, 3, 0.2),
            RowLink::pair(0, 1, 0.3),
        ]
        .into();
        set.sort();
        let rows: Vec<_> = set.iter().map(|l| (l.row_in(0), l.row_in(1))).collect();
        assert_eq!(
            rows,
            vec![(Some(0), Some(1)), (Some(0), Some(3)), (Some(2), Some(0))]
        );
        assert_eq!(set.len(), 3);
        assert_eq!(set.into_vec()[0].score, Some(0.3));
    }

    #[test]
    fn row_ref_display() {
        assert_eq!(RowRef::new(1, 42).to_string(), "1:42");
    }
}
