//! Plotting functions: data shaping from a table and mappers into [`Chart`]s.
//!
//! ```text
//!   Table ──▶ Mapper::transform ──▶ summary / cross-tab / stats ──▶ Chart
//! ```
//!
//! [`Chart`]: crate::chart::Chart

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::model::{Column, Value};
use crate::error::PlotError;

pub mod correlation;
pub mod distribution;
pub mod fractions;
pub mod stats;
pub mod summary;

pub use correlation::{plot_correlation, CorrelationOptions};
pub use distribution::{plot_distribution, DistributionOptions};
pub use fractions::{plot, plot_fractions};
pub use summary::{make_counts_summary, Source, Summary, SummaryRow};

// ---------------------------------------------------------------------------
// Column kind
// ---------------------------------------------------------------------------

/// Whether a column is rendered as discrete categories or as numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    #[default]
    Categorical,
    Continuous,
}

/// Integer columns with more distinct values than this are continuous.
const MAX_INTEGER_CATEGORIES: usize = 10;

impl ColumnKind {
    pub const ALL: [ColumnKind; 2] = [ColumnKind::Categorical, ColumnKind::Continuous];

    /// Guess the kind from the values: float columns and integer columns with
    /// many distinct values are continuous, everything else categorical.
    pub fn infer(column: &Column) -> Self {
        let mut distinct = std::collections::BTreeSet::new();
        let mut any_float = false;
        for v in &column.values {
            match v {
                Value::Null => {}
                Value::Float(_) => any_float = true,
                Value::Integer(i) => {
                    distinct.insert(*i);
                }
                _ => return ColumnKind::Categorical,
            }
        }
        if any_float || distinct.len() > MAX_INTEGER_CATEGORIES {
            ColumnKind::Continuous
        } else {
            ColumnKind::Categorical
        }
    }

    /// Parse an x/y pair of kind tags for a correlation plot.
    pub fn parse_pair(x: &str, y: &str) -> Result<(ColumnKind, ColumnKind), PlotError> {
        match (x.parse(), y.parse()) {
            (Ok(x), Ok(y)) => Ok((x, y)),
            _ => Err(PlotError::UnsupportedTypeCombination {
                x: x.to_string(),
                y: y.to_string(),
            }),
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnKind::Categorical => "categorical",
            ColumnKind::Continuous => "continuous",
        })
    }
}

impl FromStr for ColumnKind {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "categorical" => Ok(ColumnKind::Categorical),
            "continuous" => Ok(ColumnKind::Continuous),
            other => Err(PlotError::InvalidType {
                tag: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering sub-modes
// ---------------------------------------------------------------------------

/// How a categorical x continuous pair is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoricalMode {
    #[default]
    Box,
    Strip,
    Swarm,
    Violin,
    /// Discretize the continuous column and draw a count grid.
    Categorical,
}

impl CategoricalMode {
    pub const ALL: [CategoricalMode; 5] = [
        CategoricalMode::Box,
        CategoricalMode::Strip,
        CategoricalMode::Swarm,
        CategoricalMode::Violin,
        CategoricalMode::Categorical,
    ];
}

impl fmt::Display for CategoricalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CategoricalMode::Box => "box",
            CategoricalMode::Strip => "strip",
            CategoricalMode::Swarm => "swarm",
            CategoricalMode::Violin => "violin",
            CategoricalMode::Categorical => "categorical",
        })
    }
}

impl FromStr for CategoricalMode {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoricalMode::ALL
            .into_iter()
            .find(|m| m.to_string() == s)
            .ok_or_else(|| PlotError::InvalidMode { mode: s.to_string() })
    }
}

/// How a continuous x continuous pair is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContinuousMode {
    #[default]
    Kde,
    Scatter,
}

impl ContinuousMode {
    pub const ALL: [ContinuousMode; 2] = [ContinuousMode::Kde, ContinuousMode::Scatter];
}

impl fmt::Display for ContinuousMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContinuousMode::Kde => "kde",
            ContinuousMode::Scatter => "scatter",
        })
    }
}

impl FromStr for ContinuousMode {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kde" => Ok(ContinuousMode::Kde),
            "scatter" => Ok(ContinuousMode::Scatter),
            other => Err(PlotError::InvalidMode {
                mode: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kinds_and_modes() {
        assert_eq!("continuous".parse::<ColumnKind>().unwrap(), ColumnKind::Continuous);
        assert_eq!(
            "ordinal".parse::<ColumnKind>().unwrap_err(),
            PlotError::InvalidType { tag: "ordinal".into() }
        );
        assert_eq!("violin".parse::<CategoricalMode>().unwrap(), CategoricalMode::Violin);
        assert_eq!("scatter".parse::<ContinuousMode>().unwrap(), ContinuousMode::Scatter);
        assert_eq!(
            "hexbin".parse::<ContinuousMode>().unwrap_err(),
            PlotError::InvalidMode { mode: "hexbin".into() }
        );
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            ColumnKind::parse_pair("categorical", "continuous").unwrap(),
            (ColumnKind::Categorical, ColumnKind::Continuous)
        );
        assert!(matches!(
            ColumnKind::parse_pair("categorical", "ordinal"),
            Err(PlotError::UnsupportedTypeCombination { .. })
        ));
    }

    #[test]
    fn test_infer_kind() {
        let cat = Column::new("s", vec!["a".into(), Value::Null]);
        assert_eq!(ColumnKind::infer(&cat), ColumnKind::Categorical);

        let small = Column::new("n", (0..5).map(Value::Integer).collect());
        assert_eq!(ColumnKind::infer(&small), ColumnKind::Categorical);

        let many = Column::new("n", (0..50).map(Value::Integer).collect());
        assert_eq!(ColumnKind::infer(&many), ColumnKind::Continuous);

        let float = Column::new("f", vec![Value::Float(0.5)]);
        assert_eq!(ColumnKind::infer(&float), ColumnKind::Continuous);
    }

    #[test]
    fn test_modes_serialize_lowercase() {
        let json = serde_json::to_string(&CategoricalMode::Swarm).unwrap();
        assert_eq!(json, "\"swarm\"");
    }
}
