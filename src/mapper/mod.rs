//! Mappers turn a raw column into indicator columns, one per category, and
//! carry the target fraction for each category.

use std::collections::BTreeMap;

use crate::data::model::Column;

mod continuous;
mod object;

pub use continuous::ContinuousMapper;
pub use object::ObjectMapper;

/// Binarization of a column into per-category indicator columns.
pub trait Mapper {
    /// Row-aligned indicator table; must be deterministic for identical input.
    fn transform(&self, column: &Column) -> Binarized;

    /// Target fraction per category label.
    fn targets(&self) -> &BTreeMap<String, f64>;
}

// ---------------------------------------------------------------------------
// Binarized – indicator table produced by a mapper
// ---------------------------------------------------------------------------

/// Indicator table: `indicators[c][row]` is the weight of row `row` in
/// category `categories[c]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Binarized {
    pub categories: Vec<String>,
    pub indicators: Vec<Vec<f64>>,
    n_rows: usize,
}

impl Binarized {
    pub fn new(categories: Vec<String>, n_rows: usize) -> Self {
        let indicators = vec![vec![0.0; n_rows]; categories.len()];
        Binarized {
            categories,
            indicators,
            n_rows,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub(crate) fn set(&mut self, category: usize, row: usize, weight: f64) {
        self.indicators[category][row] = weight;
    }

    /// Column-wise mean: the fraction of rows in each category.
    /// `None` when there are no rows.
    pub fn means(&self) -> Option<Vec<f64>> {
        if self.n_rows == 0 {
            return None;
        }
        let n = self.n_rows as f64;
        Some(
            self.indicators
                .iter()
                .map(|col| col.iter().sum::<f64>() / n)
                .collect(),
        )
    }

    /// Category of a row: the first category holding the row's largest
    /// nonzero indicator, or `None` when the row has none.
    pub fn row_category(&self, row: usize) -> Option<&str> {
        let mut best: Option<(usize, f64)> = None;
        for (c, col) in self.indicators.iter().enumerate() {
            let w = col[row];
            if w != 0.0 && best.map_or(true, |(_, b)| w > b) {
                best = Some((c, w));
            }
        }
        best.map(|(c, _)| self.categories[c].as_str())
    }

    /// Category label for every row.
    pub fn row_categories(&self) -> Vec<Option<&str>> {
        (0..self.n_rows).map(|row| self.row_category(row)).collect()
    }
}

/// Uniform targets over the given labels.
pub(crate) fn uniform_targets<'a>(labels: impl ExactSizeIterator<Item = &'a String>) -> BTreeMap<String, f64> {
    let n = labels.len().max(1) as f64;
    labels.map(|l| (l.clone(), 1.0 / n)).collect()
}

// ---------------------------------------------------------------------------
// MapperSet – ordered column → mapper assignment
// ---------------------------------------------------------------------------

/// Mappers keyed by column name, iterated in insertion order.
#[derive(Default)]
pub struct MapperSet {
    entries: Vec<(String, Box<dyn Mapper>)>,
}

impl MapperSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the mapper for `column`. Replacing keeps the original
    /// position.
    pub fn insert(&mut self, column: impl Into<String>, mapper: Box<dyn Mapper>) {
        let column = column.into();
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = mapper,
            None => self.entries.push((column, mapper)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&dyn Mapper> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, m)| m.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Mapper)> {
        self.entries.iter().map(|(c, m)| (c.as_str(), m.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_means_and_row_category() {
        let mut b = Binarized::new(vec!["a".into(), "b".into()], 4);
        b.set(0, 0, 1.0);
        b.set(1, 1, 1.0);
        b.set(0, 2, 1.0);

        assert_eq!(b.means().unwrap(), vec![0.5, 0.25]);
        assert_eq!(b.row_categories(), vec![Some("a"), Some("b"), Some("a"), None]);
    }

    #[test]
    fn test_means_empty() {
        let b = Binarized::new(vec!["a".into()], 0);
        assert!(b.means().is_none());
    }

    #[test]
    fn test_mapper_set_keeps_insertion_order() {
        let col = Column::new("x", vec!["a".into()]);
        let mut set = MapperSet::new();
        set.insert("zeta", Box::new(ObjectMapper::new(&col)));
        set.insert("alpha", Box::new(ObjectMapper::new(&col)));
        set.insert("zeta", Box::new(ObjectMapper::new(&col)));

        let keys: Vec<&str> = set.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
        assert!(set.get("alpha").is_some());
        assert!(set.get("beta").is_none());
    }
}
