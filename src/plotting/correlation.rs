use std::collections::HashMap;

use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

use crate::chart::{
    Area, BoxMark, BoxSeries, Bubble, Chart, ContourLine, ContourSet, Mark, Orientation,
    PointSeries, Segment, ShadedCell,
};
use crate::color::ColorScheme;
use crate::data::model::{Column, Table};
use crate::error::{PlotError, Result};
use crate::mapper::{ContinuousMapper, Mapper, ObjectMapper};

use super::stats;
use super::{CategoricalMode, ColumnKind, ContinuousMode};

/// Half the width of a category slot used by per-category marks.
const SLOT_HALF_WIDTH: f64 = 0.4;
/// Sideways spacing of overlapping swarm points, in category slots.
const SWARM_STEP: f64 = 0.05;
const KDE_GRID: usize = 40;
const VIOLIN_SAMPLES: usize = 100;

/// Options of [`plot_correlation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationOptions {
    pub x_kind: ColumnKind,
    pub y_kind: ColumnKind,
    pub scheme: ColorScheme,
    /// Scale of the count-grid color intensity.
    pub prefac: f64,
    pub cat_mode: CategoricalMode,
    /// Buckets used when a continuous column needs a default mapper.
    pub n_out: usize,
    pub cont_mode: ContinuousMode,
    /// Contour levels of the 2-D density.
    pub n_levels: usize,
    /// Fill the density between contour levels.
    pub shade: bool,
}

impl Default for CorrelationOptions {
    fn default() -> Self {
        Self {
            x_kind: ColumnKind::Categorical,
            y_kind: ColumnKind::Categorical,
            scheme: ColorScheme::YlGnBu,
            prefac: 10.0,
            cat_mode: CategoricalMode::Box,
            n_out: 3,
            cont_mode: ContinuousMode::Kde,
            n_levels: 10,
            shade: true,
        }
    }
}

/// Draw how columns `x` and `y` of `table` relate onto `chart` (a new chart
/// when `None`).
///
/// | x           | y           | drawing                                        |
/// |-------------|-------------|------------------------------------------------|
/// | categorical | categorical | count grid                                     |
/// | categorical | continuous  | count grid of the discretized y, or per-category box/strip/swarm/violin |
/// | continuous  | categorical | the same, horizontal                           |
/// | continuous  | continuous  | density contours or scatter                    |
///
/// Missing mappers are built from the columns: [`ObjectMapper`] for
/// categorical columns, [`ContinuousMapper`] with `n_out` buckets for
/// continuous ones.
pub fn plot_correlation(
    table: &Table,
    x: &str,
    y: &str,
    x_mapper: Option<&dyn Mapper>,
    y_mapper: Option<&dyn Mapper>,
    chart: Option<Chart>,
    options: &CorrelationOptions,
) -> Result<Chart> {
    let x_col = table.column(x)?;
    let y_col = table.column(y)?;
    let mut chart = chart.unwrap_or_default();
    chart.x_label = Some(x.to_string());
    chart.y_label = Some(y.to_string());

    log::debug!(
        "correlation '{x}' ({}) vs '{y}' ({}), categorical mode {}, continuous mode {}",
        options.x_kind,
        options.y_kind,
        options.cat_mode,
        options.cont_mode
    );

    use CategoricalMode as Cat;
    use ColumnKind::{Categorical, Continuous};
    let count_grid = |chart: &mut Chart| -> Result<()> {
        let xm = resolve_mapper(x_mapper, x_col, options.x_kind, options.n_out)?;
        let ym = resolve_mapper(y_mapper, y_col, options.y_kind, options.n_out)?;
        draw_count_grid(chart, x_col, y_col, xm.get(), ym.get(), options);
        Ok(())
    };

    match (options.x_kind, options.y_kind) {
        (Categorical, Categorical) => count_grid(&mut chart)?,
        (Categorical, Continuous) | (Continuous, Categorical)
            if options.cat_mode == Cat::Categorical =>
        {
            count_grid(&mut chart)?
        }
        (Categorical, Continuous) => {
            let xm = resolve_mapper(x_mapper, x_col, Categorical, options.n_out)?;
            let groups = Groups::new(x_col, xm.get(), y_col);
            chart.x_ticks = Chart::category_ticks(&groups.keys);
            chart.x_range = Some((-0.5, groups.keys.len() as f64 - 0.5));
            draw_groups(&mut chart, &groups, Orientation::Vertical, options);
        }
        (Continuous, Categorical) => {
            let ym = resolve_mapper(y_mapper, y_col, Categorical, options.n_out)?;
            let groups = Groups::new(y_col, ym.get(), x_col);
            chart.y_ticks = Chart::category_ticks(&groups.keys);
            chart.y_range = Some((-0.5, groups.keys.len() as f64 - 0.5));
            draw_groups(&mut chart, &groups, Orientation::Horizontal, options);
        }
        (Continuous, Continuous) => draw_continuous(&mut chart, x_col, y_col, options)?,
    }
    Ok(chart)
}

// ---------------------------------------------------------------------------
// Mapper resolution
// ---------------------------------------------------------------------------

/// A caller-supplied mapper or one built for the column.
enum Resolved<'a> {
    Given(&'a dyn Mapper),
    Built(Box<dyn Mapper>),
}

impl Resolved<'_> {
    fn get(&self) -> &dyn Mapper {
        match self {
            Resolved::Given(m) => *m,
            Resolved::Built(m) => m.as_ref(),
        }
    }
}

fn resolve_mapper<'a>(
    given: Option<&'a dyn Mapper>,
    column: &Column,
    kind: ColumnKind,
    n_out: usize,
) -> Result<Resolved<'a>> {
    if let Some(m) = given {
        return Ok(Resolved::Given(m));
    }
    let built: Box<dyn Mapper> = match kind {
        ColumnKind::Categorical => Box::new(ObjectMapper::new(column)),
        ColumnKind::Continuous => Box::new(ContinuousMapper::new(column, n_out)?),
    };
    Ok(Resolved::Built(built))
}

/// Category label of each row according to `mapper`; for continuous
/// mappers this is the bucket.
fn row_labels(column: &Column, mapper: &dyn Mapper) -> Vec<Option<String>> {
    mapper
        .transform(column)
        .row_categories()
        .into_iter()
        .map(|l| l.map(String::from))
        .collect()
}

// ---------------------------------------------------------------------------
// Categorical x categorical: count grid
// ---------------------------------------------------------------------------

/// Row counts of every (x category, y category) pair, x-major.
pub(crate) fn cross_tabulate(
    x_rows: &[Option<String>],
    y_rows: &[Option<String>],
    x_keys: &[String],
    y_keys: &[String],
) -> Vec<usize> {
    let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
    for (xl, yl) in x_rows.iter().zip(y_rows) {
        if let (Some(xl), Some(yl)) = (xl, yl) {
            *counts.entry((xl.as_str(), yl.as_str())).or_default() += 1;
        }
    }
    x_keys
        .iter()
        .flat_map(|xk| {
            let counts = &counts;
            y_keys
                .iter()
                .map(move |yk| counts.get(&(xk.as_str(), yk.as_str())).copied().unwrap_or(0))
        })
        .collect()
}

fn draw_count_grid(
    chart: &mut Chart,
    x_col: &Column,
    y_col: &Column,
    x_mapper: &dyn Mapper,
    y_mapper: &dyn Mapper,
    options: &CorrelationOptions,
) {
    let x_keys: Vec<String> = x_mapper.targets().keys().cloned().collect();
    let y_keys: Vec<String> = y_mapper.targets().keys().cloned().collect();
    let counts = cross_tabulate(
        &row_labels(x_col, x_mapper),
        &row_labels(y_col, y_mapper),
        &x_keys,
        &y_keys,
    );

    let areas: Vec<f64> = counts.iter().map(|&c| (c as f64).powi(2)).collect();
    let max = areas.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = areas.iter().copied().fold(f64::INFINITY, f64::min);
    let range = max - min;

    let bubbles = areas
        .iter()
        .enumerate()
        .map(|(k, &area)| {
            // Equal counts everywhere: uniform mid-scale color.
            let t = if range > 0.0 {
                options.prefac * area / range
            } else {
                0.5
            };
            Bubble {
                x: (k / y_keys.len()) as f64,
                y: (k % y_keys.len()) as f64,
                area,
                color: options.scheme.sample(t),
            }
        })
        .collect();
    chart.push(Mark::Bubbles(bubbles));

    chart.x_ticks = Chart::category_ticks(&x_keys);
    chart.y_ticks = Chart::category_ticks(&y_keys);
    chart.x_range = Some((-1.0, x_keys.len() as f64));
    chart.y_range = Some((-1.0, y_keys.len() as f64));
}

// ---------------------------------------------------------------------------
// Categorical x continuous: per-category distributions
// ---------------------------------------------------------------------------

/// Finite values of the continuous column, grouped by category.
struct Groups {
    keys: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl Groups {
    fn new(cat_col: &Column, mapper: &dyn Mapper, value_col: &Column) -> Self {
        let keys: Vec<String> = mapper.targets().keys().cloned().collect();
        let mut values = vec![Vec::new(); keys.len()];
        for (label, value) in row_labels(cat_col, mapper).iter().zip(value_col.as_f64()) {
            let slot = label
                .as_ref()
                .and_then(|l| keys.binary_search(l).ok());
            if let Some(slot) = slot {
                if value.is_finite() {
                    values[slot].push(value);
                }
            }
        }
        Groups { keys, values }
    }

    fn iter(&self) -> impl Iterator<Item = (usize, &String, &Vec<f64>)> {
        self.keys
            .iter()
            .zip(&self.values)
            .enumerate()
            .map(|(i, (k, v))| (i, k, v))
    }
}

/// `(slot offset, value)` to chart coordinates.
fn place(orientation: Orientation, position: f64, value: f64) -> [f64; 2] {
    match orientation {
        Orientation::Vertical => [position, value],
        Orientation::Horizontal => [value, position],
    }
}

fn draw_groups(
    chart: &mut Chart,
    groups: &Groups,
    orientation: Orientation,
    options: &CorrelationOptions,
) {
    let colors = options.scheme.palette(groups.keys.len());

    match options.cat_mode {
        CategoricalMode::Box => {
            let boxes = groups
                .iter()
                .filter_map(|(i, key, values)| {
                    stats::box_stats(values).map(|stats| BoxMark {
                        name: key.clone(),
                        position: i as f64,
                        stats,
                        color: colors[i],
                    })
                })
                .collect();
            chart.push(Mark::Boxes(BoxSeries {
                orientation,
                width: 2.0 * SLOT_HALF_WIDTH,
                boxes,
            }));
        }
        CategoricalMode::Strip | CategoricalMode::Swarm => {
            let all: Vec<f64> = groups.values.iter().flatten().copied().collect();
            let spread = if all.is_empty() {
                0.0
            } else {
                let (lo, hi) = all
                    .iter()
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), &v| (a.min(v), b.max(v)));
                hi - lo
            };
            let diameter = if spread > 0.0 { spread / 60.0 } else { 1.0 };

            for (i, key, values) in groups.iter() {
                let offsets = if options.cat_mode == CategoricalMode::Swarm {
                    stats::swarm_offsets(values, diameter, SWARM_STEP, SLOT_HALF_WIDTH)
                } else {
                    stats::jitter(values.len(), SLOT_HALF_WIDTH / 2.0)
                };
                let points = values
                    .iter()
                    .zip(offsets)
                    .map(|(&v, o)| place(orientation, i as f64 + o, v))
                    .collect();
                chart.push(Mark::Points(PointSeries {
                    name: key.clone(),
                    color: colors[i],
                    radius: 3.0,
                    alpha: 0.8,
                    points,
                }));
            }
        }
        CategoricalMode::Violin => {
            for (i, key, values) in groups.iter() {
                let curve = stats::kde_1d(values, VIOLIN_SAMPLES);
                let peak = curve.iter().map(|p| p[1]).fold(0.0, f64::max);
                if peak <= 0.0 {
                    continue;
                }
                let pos = i as f64;
                let scale = SLOT_HALF_WIDTH / peak;
                let outline = curve
                    .iter()
                    .map(|p| place(orientation, pos + p[1] * scale, p[0]))
                    .chain(
                        curve
                            .iter()
                            .rev()
                            .map(|p| place(orientation, pos - p[1] * scale, p[0])),
                    )
                    .collect();
                chart.push(Mark::Area(Area {
                    name: key.clone(),
                    fill: colors[i],
                    outline,
                }));
                if let Some(s) = stats::box_stats(values) {
                    chart.push(Mark::Segment(Segment {
                        start: place(orientation, pos - SLOT_HALF_WIDTH / 2.0, s.median),
                        end: place(orientation, pos + SLOT_HALF_WIDTH / 2.0, s.median),
                        width: 2.0,
                        dashed: false,
                        color: Color32::BLACK,
                    }));
                }
            }
        }
        // Dispatched to the count grid before reaching here.
        CategoricalMode::Categorical => {}
    }
}

// ---------------------------------------------------------------------------
// Continuous x continuous
// ---------------------------------------------------------------------------

fn draw_continuous(
    chart: &mut Chart,
    x_col: &Column,
    y_col: &Column,
    options: &CorrelationOptions,
) -> Result<()> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x_col
        .as_f64()
        .into_iter()
        .zip(y_col.as_f64())
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .unzip();
    if xs.is_empty() {
        return Err(PlotError::EmptyInput {
            column: format!("{} / {}", x_col.name, y_col.name),
        });
    }

    match options.cont_mode {
        ContinuousMode::Scatter => chart.push(Mark::Points(PointSeries {
            name: String::new(),
            color: options.scheme.accent(),
            radius: 2.0,
            alpha: 0.8,
            points: xs.iter().zip(&ys).map(|(&x, &y)| [x, y]).collect(),
        })),
        ContinuousMode::Kde => {
            let grid = stats::kde_2d(&xs, &ys, KDE_GRID);
            chart.push(Mark::Contour(density_contours(&grid, options)));
        }
    }
    Ok(())
}

fn density_contours(grid: &stats::DensityGrid, options: &CorrelationOptions) -> ContourSet {
    let n_levels = options.n_levels.max(1);
    let peak = grid.max();
    let fraction = |k: usize| k as f64 / (n_levels + 1) as f64;
    let levels: Vec<f64> = (1..=n_levels).map(|k| peak * fraction(k)).collect();
    if peak <= 0.0 {
        return ContourSet {
            lines: Vec::new(),
            cells: Vec::new(),
        };
    }

    let lines = levels
        .iter()
        .enumerate()
        .map(|(k, &level)| ContourLine {
            level,
            color: options.scheme.sample(fraction(k + 1)),
            segments: stats::contour_segments(grid, level),
        })
        .collect();

    let mut cells = Vec::new();
    if options.shade {
        for j in 0..grid.ys.len() - 1 {
            for i in 0..grid.xs.len() - 1 {
                let mean = (grid.values[j][i]
                    + grid.values[j][i + 1]
                    + grid.values[j + 1][i]
                    + grid.values[j + 1][i + 1])
                    / 4.0;
                let reached = levels.partition_point(|&l| l <= mean);
                if reached > 0 {
                    cells.push(ShadedCell {
                        x: [grid.xs[i], grid.xs[i + 1]],
                        y: [grid.ys[j], grid.ys[j + 1]],
                        color: options.scheme.sample(fraction(reached)),
                    });
                }
            }
        }
    }

    ContourSet { lines, cells }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;

    fn uniform_table() -> Table {
        Table::from_columns(vec![
            Column::new("x", [1, 1, 2, 2].map(Value::Integer).to_vec()),
            Column::new("y", [1, 2, 1, 2].map(Value::Integer).to_vec()),
            Column::new(
                "score",
                [1.0, 2.0, 3.0, f64::NAN].map(Value::Float).to_vec(),
            ),
            Column::new(
                "weight",
                [10.0, 20.0, f64::INFINITY, 40.0].map(Value::Float).to_vec(),
            ),
        ])
        .unwrap()
    }

    fn bubbles(chart: &Chart) -> &[Bubble] {
        chart
            .marks
            .iter()
            .find_map(|m| match m {
                Mark::Bubbles(b) => Some(b.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    #[test]
    fn test_uniform_grid_equal_sizes() {
        let chart = plot_correlation(
            &uniform_table(),
            "x",
            "y",
            None,
            None,
            None,
            &CorrelationOptions::default(),
        )
        .unwrap();

        let b = bubbles(&chart);
        assert_eq!(b.len(), 4);
        assert!(b.iter().all(|b| b.area == 1.0));
        assert!(b.iter().all(|b| b.color == ColorScheme::YlGnBu.sample(0.5)));
        assert_eq!(chart.x_ticks.len(), 2);
        assert_eq!(chart.x_range, Some((-1.0, 2.0)));
    }

    #[test]
    fn test_cross_tabulate_counts() {
        let s = |v: &str| Some(v.to_string());
        let x = vec![s("a"), s("a"), s("b"), None];
        let y = vec![s("u"), s("u"), s("v"), s("v")];
        let keys = |k: &[&str]| k.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(
            cross_tabulate(&x, &y, &keys(&["a", "b"]), &keys(&["u", "v"])),
            vec![2, 0, 0, 1]
        );
    }

    #[test]
    fn test_count_grid_color_scaling() {
        let table = Table::from_columns(vec![
            Column::new("x", vec!["a".into(), "a".into(), "b".into()]),
            Column::new("y", vec!["u".into(), "u".into(), "u".into()]),
        ])
        .unwrap();
        let opts = CorrelationOptions {
            prefac: 0.5,
            ..CorrelationOptions::default()
        };
        let chart = plot_correlation(&table, "x", "y", None, None, None, &opts).unwrap();
        let b = bubbles(&chart);
        // areas 4 and 1, range 3
        assert_eq!(b[0].area, 4.0);
        assert_eq!(b[0].color, ColorScheme::YlGnBu.sample(0.5 * 4.0 / 3.0));
        assert_eq!(b[1].color, ColorScheme::YlGnBu.sample(0.5 / 3.0));
    }

    #[test]
    fn test_discretized_continuous_uses_buckets() {
        let opts = CorrelationOptions {
            y_kind: ColumnKind::Continuous,
            cat_mode: CategoricalMode::Categorical,
            n_out: 2,
            ..CorrelationOptions::default()
        };
        let chart = plot_correlation(&uniform_table(), "x", "score", None, None, None, &opts)
            .unwrap();
        let b = bubbles(&chart);
        assert_eq!(b.len(), 4);
        // NaN score row is dropped: 3 counted rows.
        let total: f64 = b.iter().map(|b| b.area.sqrt()).sum();
        assert_eq!(total, 3.0);
        assert_eq!(chart.y_ticks.len(), 2);
    }

    #[test]
    fn test_box_mode_groups_finite_values() {
        let opts = CorrelationOptions {
            y_kind: ColumnKind::Continuous,
            ..CorrelationOptions::default()
        };
        let chart =
            plot_correlation(&uniform_table(), "x", "score", None, None, None, &opts).unwrap();
        let Some(Mark::Boxes(series)) = chart.marks.first() else {
            panic!("expected boxes");
        };
        assert_eq!(series.orientation, Orientation::Vertical);
        assert_eq!(series.boxes.len(), 2);
        assert_eq!(series.boxes[0].stats.median, 1.5);
        assert_eq!(series.boxes[1].stats.median, 3.0);
    }

    #[test]
    fn test_mirrored_strip_is_horizontal() {
        let opts = CorrelationOptions {
            x_kind: ColumnKind::Continuous,
            cat_mode: CategoricalMode::Strip,
            ..CorrelationOptions::default()
        };
        let chart =
            plot_correlation(&uniform_table(), "score", "y", None, None, None, &opts).unwrap();
        assert_eq!(chart.y_ticks.len(), 2);
        let points: Vec<[f64; 2]> = chart
            .marks
            .iter()
            .filter_map(|m| match m {
                Mark::Points(p) => Some(p.points.clone()),
                _ => None,
            })
            .flatten()
            .collect();
        assert_eq!(points.len(), 3);
        // Values on x, categories (with jitter) on y.
        assert!(points.iter().all(|p| [1.0, 2.0, 3.0].contains(&p[0])));
        assert!(points.iter().all(|p| p[1] > -0.5 && p[1] < 1.5));
    }

    #[test]
    fn test_violin_and_swarm_modes_draw() {
        for mode in [CategoricalMode::Violin, CategoricalMode::Swarm] {
            let opts = CorrelationOptions {
                y_kind: ColumnKind::Continuous,
                cat_mode: mode,
                ..CorrelationOptions::default()
            };
            let chart =
                plot_correlation(&uniform_table(), "x", "score", None, None, None, &opts).unwrap();
            assert!(!chart.marks.is_empty(), "{mode} drew nothing");
        }
    }

    #[test]
    fn test_continuous_scatter_drops_non_finite() {
        let opts = CorrelationOptions {
            x_kind: ColumnKind::Continuous,
            y_kind: ColumnKind::Continuous,
            cont_mode: ContinuousMode::Scatter,
            ..CorrelationOptions::default()
        };
        let chart =
            plot_correlation(&uniform_table(), "score", "weight", None, None, None, &opts)
                .unwrap();
        let Some(Mark::Points(p)) = chart.marks.first() else {
            panic!("expected points");
        };
        assert_eq!(p.points, vec![[1.0, 10.0], [2.0, 20.0]]);
    }

    #[test]
    fn test_continuous_kde_contours() {
        let opts = CorrelationOptions {
            x_kind: ColumnKind::Continuous,
            y_kind: ColumnKind::Continuous,
            n_levels: 4,
            ..CorrelationOptions::default()
        };
        let chart =
            plot_correlation(&uniform_table(), "score", "weight", None, None, None, &opts)
                .unwrap();
        let Some(Mark::Contour(set)) = chart.marks.first() else {
            panic!("expected contours");
        };
        assert_eq!(set.lines.len(), 4);
        assert!(set.lines.iter().all(|l| !l.segments.is_empty()));
        assert!(!set.cells.is_empty());
    }

    #[test]
    fn test_continuous_without_finite_pairs() {
        let table = Table::from_columns(vec![
            Column::new("a", vec![Value::Float(1.0), Value::Float(f64::NAN)]),
            Column::new("b", vec![Value::Float(f64::NAN), Value::Float(2.0)]),
        ])
        .unwrap();
        let opts = CorrelationOptions {
            x_kind: ColumnKind::Continuous,
            y_kind: ColumnKind::Continuous,
            ..CorrelationOptions::default()
        };
        assert!(matches!(
            plot_correlation(&table, "a", "b", None, None, None, &opts),
            Err(PlotError::EmptyInput { .. })
        ));
    }

    #[test]
    fn test_draws_onto_given_chart() {
        let mut existing = Chart::new();
        existing.title = Some("panel".into());
        let chart = plot_correlation(
            &uniform_table(),
            "x",
            "y",
            None,
            None,
            Some(existing),
            &CorrelationOptions::default(),
        )
        .unwrap();
        assert_eq!(chart.title.as_deref(), Some("panel"));
        assert_eq!(chart.x_label.as_deref(), Some("x"));
    }

    #[test]
    fn test_idempotent() {
        let opts = CorrelationOptions {
            y_kind: ColumnKind::Continuous,
            cat_mode: CategoricalMode::Swarm,
            ..CorrelationOptions::default()
        };
        let a = plot_correlation(&uniform_table(), "x", "score", None, None, None, &opts).unwrap();
        let b = plot_correlation(&uniform_table(), "x", "score", None, None, None, &opts).unwrap();
        assert_eq!(a, b);
    }
}
