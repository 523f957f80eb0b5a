use crate::chart::{Bar, BarSeries, Chart, Mark, Segment};
use crate::color::generate_palette;
use crate::data::model::{Column, Selection, Table};
use crate::error::Result;
use crate::mapper::{Mapper, MapperSet};

use super::summary::{make_counts_summary, Source, Summary};

/// Width of one bar inside a category slot of width one.
const BAR_WIDTH: f64 = 0.4;

/// Compare the category fractions of the full column with those of the
/// selected rows.
///
/// Returns the chart and the combined summary (both sources, sorted by
/// label). Each category gets a dashed marker at its target fraction.
pub fn plot_fractions(
    column: &Column,
    selection: &Selection,
    key: &str,
    mapper: &dyn Mapper,
) -> Result<(Chart, Summary)> {
    let full = make_counts_summary(column, key, mapper, Source::All)?;
    let selected = make_counts_summary(&column.select(selection)?, key, mapper, Source::Selected)?;
    let summary = full.concat(selected).sorted();

    let labels: Vec<String> = summary.labels().into_iter().map(String::from).collect();
    let colors = generate_palette(2);

    let mut chart = Chart {
        title: Some(key.to_string()),
        x_label: Some(key.to_string()),
        y_label: Some("Fraction of sample".to_string()),
        x_ticks: Chart::category_ticks(&labels),
        x_range: Some((-0.5, labels.len() as f64 - 0.5)),
        ..Chart::default()
    };

    for (group, (source, color)) in [Source::All, Source::Selected]
        .into_iter()
        .zip(colors)
        .enumerate()
    {
        let offset = (group as f64 - 0.5) * BAR_WIDTH;
        let bars = labels
            .iter()
            .enumerate()
            .filter_map(|(slot, label)| {
                summary.fraction(label, source).map(|height| Bar {
                    x: slot as f64 + offset,
                    height,
                    width: BAR_WIDTH,
                })
            })
            .collect();
        chart.push(Mark::Bars(BarSeries {
            name: source.to_string(),
            color,
            bars,
        }));
    }

    let targets = mapper.targets();
    for (slot, label) in labels.iter().enumerate() {
        match targets.get(label) {
            Some(&target) => {
                let x = slot as f64;
                chart.push(Mark::Segment(Segment::horizontal(target, x - 0.5, x + 0.5)));
            }
            None => log::warn!("'{key}': no target for category '{label}'"),
        }
    }

    Ok((chart, summary))
}

/// One fraction chart per mapper, in the mapper set's order. The first
/// failing column aborts the batch.
pub fn plot(table: &Table, selection: &Selection, mappers: &MapperSet) -> Result<Vec<Chart>> {
    mappers
        .iter()
        .map(|(key, mapper)| {
            let column = table.column(key)?;
            plot_fractions(column, selection, key, mapper).map(|(chart, _)| chart)
        })
        .collect()
}
