use std::collections::BTreeMap;

use super::{uniform_targets, Binarized, Mapper};
use crate::data::model::Column;
use crate::error::{PlotError, Result};

/// Bins a numeric column into buckets, then one-hot encodes the bucket.
///
/// Bucket `i` covers `[boundaries[i], boundaries[i + 1])`; the last bucket is
/// closed on the right. Non-finite and out-of-range values get no bucket.
#[derive(Debug, Clone)]
pub struct ContinuousMapper {
    boundaries: Vec<f64>,
    names: Vec<String>,
    targets: BTreeMap<String, f64>,
}

impl ContinuousMapper {
    /// `n_out` equal-width buckets spanning the finite values of `column`.
    pub fn new(column: &Column, n_out: usize) -> Result<Self> {
        let values = column.finite_values();
        if values.is_empty() {
            return Err(PlotError::empty(&column.name));
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let n_out = n_out.max(1);
        let step = (max - min) / n_out as f64;
        let mut boundaries: Vec<f64> = (0..n_out).map(|i| min + step * i as f64).collect();
        boundaries.push(max);
        Ok(Self::with_boundaries(boundaries, ""))
    }

    /// Buckets from explicit, ascending boundaries (at least two).
    pub fn with_boundaries(boundaries: Vec<f64>, prefix: &str) -> Self {
        let n = boundaries.len().saturating_sub(1);
        let width = n.saturating_sub(1).to_string().len();
        let names: Vec<String> = boundaries
            .windows(2)
            .enumerate()
            .map(|(i, w)| format!("{prefix}{i:0width$} [{:.2}, {:.2}]", w[0], w[1]))
            .collect();
        let targets = uniform_targets(names.iter());
        ContinuousMapper {
            boundaries,
            names,
            targets,
        }
    }

    /// Rename the buckets; targets are re-keyed in bucket order.
    pub fn with_column_names(mut self, names: Vec<String>) -> Self {
        if names.len() == self.names.len() {
            let targets = self
                .names
                .iter()
                .zip(&names)
                .filter_map(|(old, new)| self.targets.get(old).map(|t| (new.clone(), *t)))
                .collect();
            self.targets = targets;
            self.names = names;
        } else {
            log::warn!(
                "ignoring {} bucket names for {} buckets",
                names.len(),
                self.names.len()
            );
        }
        self
    }

    /// Replace the targets. Keys that name no bucket are dropped; buckets
    /// without a target get no indicator.
    pub fn with_targets(mut self, targets: BTreeMap<String, f64>) -> Self {
        let (known, unknown): (BTreeMap<_, _>, BTreeMap<_, _>) = targets
            .into_iter()
            .partition(|(name, _)| self.names.contains(name));
        if !unknown.is_empty() {
            log::warn!(
                "ignoring targets for unknown buckets: {:?}",
                unknown.keys().collect::<Vec<_>>()
            );
        }
        self.targets = known;
        self
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Bucket index of a value.
    pub fn bucket(&self, v: f64) -> Option<usize> {
        let n = self.names.len();
        if !v.is_finite() || n == 0 {
            return None;
        }
        let first = self.boundaries[0];
        let last = self.boundaries[n];
        if v < first || v > last {
            return None;
        }
        // Upper boundary goes to the last bucket.
        let idx = self.boundaries[1..n].partition_point(|&b| b <= v);
        Some(idx.min(n - 1))
    }
}

impl Mapper for ContinuousMapper {
    /// One indicator per bucket that has a target, in bucket order.
    fn transform(&self, column: &Column) -> Binarized {
        let mut slots = Vec::with_capacity(self.names.len());
        let mut categories = Vec::new();
        for name in &self.names {
            if self.targets.contains_key(name) {
                slots.push(Some(categories.len()));
                categories.push(name.clone());
            } else {
                slots.push(None);
            }
        }

        let mut out = Binarized::new(categories, column.len());
        for (row, value) in column.values.iter().enumerate() {
            if let Some(c) = self.bucket(value.as_f64()).and_then(|b| slots[b]) {
                out.set(c, row, 1.0);
            }
        }
        out
    }

    fn targets(&self) -> &BTreeMap<String, f64> {
        &self.targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;

    fn ages() -> Column {
        Column::new(
            "age",
            vec![
                Value::Integer(20),
                Value::Float(25.0),
                Value::Integer(30),
                Value::Float(f64::NAN),
                Value::Integer(50),
            ],
        )
    }

    #[test]
    fn test_equal_width_boundaries() {
        let m = ContinuousMapper::new(&ages(), 3).unwrap();
        assert_eq!(m.boundaries(), [20.0, 30.0, 40.0, 50.0]);
        assert_eq!(m.names()[0], "0 [20.00, 30.00]");
        assert!((m.targets().values().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bucket_edges() {
        let m = ContinuousMapper::new(&ages(), 3).unwrap();
        assert_eq!(m.bucket(20.0), Some(0));
        assert_eq!(m.bucket(29.9), Some(0));
        assert_eq!(m.bucket(30.0), Some(1));
        assert_eq!(m.bucket(50.0), Some(2));
        assert_eq!(m.bucket(50.1), None);
        assert_eq!(m.bucket(f64::NAN), None);
    }

    #[test]
    fn test_transform_drops_non_finite() {
        let m = ContinuousMapper::new(&ages(), 3).unwrap();
        let b = m.transform(&ages());
        assert_eq!(b.indicators[0], vec![1.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(b.indicators[1], vec![0.0, 0.0, 1.0, 0.0, 0.0]);
        assert_eq!(b.indicators[2], vec![0.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(b.row_category(3), None);
    }

    #[test]
    fn test_constant_column_single_bucket() {
        let col = Column::new("x", vec![Value::Float(4.0), Value::Float(4.0)]);
        let m = ContinuousMapper::new(&col, 3).unwrap();
        let b = m.transform(&col);
        assert_eq!(b.row_categories(), vec![Some(m.names()[2].as_str()); 2]);
    }

    #[test]
    fn test_no_finite_values() {
        let col = Column::new("x", vec![Value::Null, Value::from("?")]);
        assert_eq!(
            ContinuousMapper::new(&col, 2).unwrap_err(),
            PlotError::EmptyInput { column: "x".into() }
        );
    }

    #[test]
    fn test_column_names_rekey_targets() {
        let m = ContinuousMapper::new(&ages(), 2)
            .unwrap()
            .with_column_names(vec!["young".into(), "old".into()]);
        assert_eq!(m.targets().keys().collect::<Vec<_>>(), ["old", "young"]);
        assert_eq!(m.transform(&ages()).row_category(4), Some("old"));
    }

    #[test]
    fn test_targets_restrict_categories() {
        let m = ContinuousMapper::new(&ages(), 2)
            .unwrap()
            .with_column_names(vec!["young".into(), "old".into()])
            .with_targets(BTreeMap::from([
                ("old".to_string(), 1.0),
                ("retired".to_string(), 0.0),
            ]));
        assert_eq!(m.targets().keys().collect::<Vec<_>>(), ["old"]);

        let b = m.transform(&ages());
        assert_eq!(b.categories, vec!["old"]);
        assert_eq!(b.row_category(0), None);
        assert_eq!(b.row_category(4), Some("old"));
    }
}
