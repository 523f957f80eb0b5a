use std::collections::{BTreeMap, BTreeSet};

use super::{uniform_targets, Binarized, Mapper};
use crate::data::model::Column;

/// One-hot mapper for categorical columns: one indicator per distinct
/// non-null value, labelled `prefix + value`.
#[derive(Debug, Clone)]
pub struct ObjectMapper {
    prefix: String,
    categories: Vec<String>,
    targets: BTreeMap<String, f64>,
}

impl ObjectMapper {
    /// Categories are the distinct non-null values of `column`, with uniform
    /// targets.
    pub fn new(column: &Column) -> Self {
        Self::with_prefix(column, "")
    }

    pub fn with_prefix(column: &Column, prefix: &str) -> Self {
        let labels: BTreeSet<String> = column
            .values
            .iter()
            .filter(|v| !v.is_null())
            .map(|v| format!("{prefix}{v}"))
            .collect();
        let categories: Vec<String> = labels.into_iter().collect();
        let targets = uniform_targets(categories.iter());
        ObjectMapper {
            prefix: prefix.to_string(),
            categories,
            targets,
        }
    }

    /// Replace the targets. The categories become exactly the target labels:
    /// labels not seen in the column are always empty, and values without a
    /// target get no indicator.
    pub fn with_targets(mut self, targets: BTreeMap<String, f64>) -> Self {
        self.categories = targets.keys().cloned().collect();
        self.targets = targets;
        self
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }
}

impl Mapper for ObjectMapper {
    fn transform(&self, column: &Column) -> Binarized {
        let mut out = Binarized::new(self.categories.clone(), column.len());
        for (row, value) in column.values.iter().enumerate() {
            if value.is_null() {
                continue;
            }
            let label = format!("{}{value}", self.prefix);
            if let Ok(c) = self.categories.binary_search(&label) {
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

    fn column() -> Column {
        Column::new(
            "country",
            vec!["NL".into(), "DE".into(), Value::Null, "NL".into()],
        )
    }

    #[test]
    fn test_categories_and_uniform_targets() {
        let m = ObjectMapper::new(&column());
        assert_eq!(m.categories(), ["DE", "NL"]);
        assert_eq!(m.targets()["DE"], 0.5);
        assert_eq!(m.targets()["NL"], 0.5);
    }

    #[test]
    fn test_transform_one_hot() {
        let m = ObjectMapper::new(&column());
        let b = m.transform(&column());
        assert_eq!(b.categories, vec!["DE", "NL"]);
        assert_eq!(b.indicators[0], vec![0.0, 1.0, 0.0, 0.0]);
        assert_eq!(b.indicators[1], vec![1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_prefix_and_custom_targets() {
        let targets = BTreeMap::from([("c_NL".to_string(), 0.3), ("c_FR".to_string(), 0.7)]);
        let m = ObjectMapper::with_prefix(&column(), "c_").with_targets(targets);
        assert_eq!(m.categories(), ["c_FR", "c_NL"]);

        let b = m.transform(&column());
        assert_eq!(b.row_category(0), Some("c_NL"));
        // "DE" has no target, so its row is in no category.
        assert_eq!(b.row_category(1), None);
        assert_eq!(b.indicators[0].iter().sum::<f64>(), 0.0);
    }

    #[test]
    fn test_integers_label_without_decimals() {
        let col = Column::new("n", vec![Value::Integer(1), Value::Integer(2)]);
        let m = ObjectMapper::new(&col);
        assert_eq!(m.categories(), ["1", "2"]);
    }
}
