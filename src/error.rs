//! Error type shared by the plotting functions.

use thiserror::Error;

/// Errors raised while shaping data for a chart.
///
/// Every plotting call either returns a complete chart or one of these; no
/// partial chart is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlotError {
    /// There are no rows to summarize.
    #[error("no rows to summarize in column '{column}'")]
    EmptyInput { column: String },

    /// A selection refers to a row the column does not have.
    #[error("selection refers to row {row}, but the column has {len} rows")]
    InvalidSelection { row: usize, len: usize },

    /// The pair of column kinds is not handled by the correlation plot.
    #[error("unsupported column kind combination: x = '{x}', y = '{y}'")]
    UnsupportedTypeCombination { x: String, y: String },

    /// Unknown rendering sub-mode.
    #[error("invalid plot mode '{mode}'")]
    InvalidMode { mode: String },

    /// Unknown column kind tag.
    #[error("invalid column kind '{tag}' (expected 'categorical' or 'continuous')")]
    InvalidType { tag: String },

    #[error("column '{column}' not found in table")]
    ColumnNotFound { column: String },

    #[error("unknown color scheme '{name}'")]
    UnknownColorScheme { name: String },

    /// Table columns must all have the same number of rows.
    #[error("column '{column}' has {len} rows, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        len: usize,
        expected: usize,
    },
}

impl PlotError {
    pub(crate) fn empty(column: &str) -> Self {
        PlotError::EmptyInput {
            column: column.to_string(),
        }
    }
}

pub type Result<T, E = PlotError> = std::result::Result<T, E>;
