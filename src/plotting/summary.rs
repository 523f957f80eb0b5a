use std::fmt;

use crate::data::model::Column;
use crate::error::{PlotError, Result};
use crate::mapper::Mapper;

/// Which population a summary row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Source {
    All,
    Selected,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Source::All => "all",
            Source::Selected => "selected",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub label: String,
    pub fraction: f64,
    pub source: Source,
}

/// Per-category fractions of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Column the summary was built from.
    pub key: String,
    pub rows: Vec<SummaryRow>,
}

impl Summary {
    /// Rows of `other` appended after the rows of `self`.
    pub fn concat(mut self, other: Summary) -> Summary {
        self.rows.extend(other.rows);
        self
    }

    /// Stable ascending sort by label.
    pub fn sorted(mut self) -> Summary {
        self.rows.sort_by(|a, b| a.label.cmp(&b.label));
        self
    }

    /// Distinct labels in row order.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !labels.contains(&row.label.as_str()) {
                labels.push(&row.label);
            }
        }
        labels
    }

    pub fn rows_for(&self, source: Source) -> impl Iterator<Item = &SummaryRow> {
        self.rows.iter().filter(move |r| r.source == source)
    }

    pub fn fraction(&self, label: &str, source: Source) -> Option<f64> {
        self.rows_for(source)
            .find(|r| r.label == label)
            .map(|r| r.fraction)
    }
}

/// Fraction of rows of `column` falling in each of the mapper's categories.
pub fn make_counts_summary(
    column: &Column,
    key: &str,
    mapper: &dyn Mapper,
    source: Source,
) -> Result<Summary> {
    let binary = mapper.transform(column);
    let means = binary.means().ok_or_else(|| PlotError::empty(key))?;
    log::debug!(
        "summary of '{key}' ({source}): {} rows, {} categories",
        binary.n_rows(),
        means.len()
    );

    let rows = binary
        .categories
        .into_iter()
        .zip(means)
        .map(|(label, fraction)| SummaryRow {
            label,
            fraction,
            source,
        })
        .collect();
    Ok(Summary {
        key: key.to_string(),
        rows,
    })
}
