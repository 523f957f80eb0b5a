use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

use crate::chart::{Bar, BarSeries, Chart, HistogramSeries, Mark};
use crate::color::ColorScheme;
use crate::data::model::Table;
use crate::error::{PlotError, Result};
use crate::mapper::{Mapper, ObjectMapper};

use super::stats;
use super::summary::{make_counts_summary, Source};
use super::ColumnKind;

/// Options of [`plot_distribution`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionOptions {
    pub kind: ColumnKind,
    pub scheme: ColorScheme,
    /// Histogram bins (continuous columns only).
    pub nbins: usize,
}

impl Default for DistributionOptions {
    fn default() -> Self {
        Self {
            kind: ColumnKind::Categorical,
            scheme: ColorScheme::YlGnBu,
            nbins: 30,
        }
    }
}

/// Draw the distribution of one column: category fractions for categorical
/// columns, a histogram of the finite values for continuous ones.
///
/// Returns the chart and the color the marks were drawn in. `mapper` is only
/// used for categorical columns; a missing one is built from the column.
pub fn plot_distribution(
    table: &Table,
    x: &str,
    mapper: Option<&dyn Mapper>,
    chart: Option<Chart>,
    options: &DistributionOptions,
) -> Result<(Chart, Color32)> {
    let column = table.column(x)?;
    let color = options.scheme.accent();
    let mut chart = chart.unwrap_or_default();
    chart.x_label = Some(x.to_string());

    match options.kind {
        ColumnKind::Categorical => {
            let built;
            let mapper = match mapper {
                Some(m) => m,
                None => {
                    built = ObjectMapper::new(column);
                    &built as &dyn Mapper
                }
            };
            let summary = make_counts_summary(column, x, mapper, Source::All)?.sorted();
            let labels = summary.labels();
            let bars = summary
                .rows
                .iter()
                .enumerate()
                .map(|(slot, row)| Bar {
                    x: slot as f64,
                    height: row.fraction,
                    width: 0.8,
                })
                .collect();

            chart.x_ticks = Chart::category_ticks(&labels);
            chart.x_range = Some((-0.5, labels.len() as f64 - 0.5));
            chart.y_label = Some("Fraction of sample".to_string());
            chart.push(Mark::Bars(BarSeries {
                name: x.to_string(),
                color,
                bars,
            }));
        }
        ColumnKind::Continuous => {
            let values = column.finite_values();
            if values.is_empty() {
                return Err(PlotError::empty(x));
            }
            log::debug!(
                "histogram of '{x}': {} of {} values finite",
                values.len(),
                column.len()
            );
            chart.y_label = Some("Number of occurrences".to_string());
            chart.push(Mark::Histogram(HistogramSeries {
                name: x.to_string(),
                color,
                alpha: 0.8,
                bins: stats::histogram(&values, options.nbins),
            }));
        }
    }
    Ok((chart, color))
}
