use std::collections::BTreeMap;

use cohort_view::chart::Mark;
use cohort_view::color::ColorScheme;
use cohort_view::data::model::{Column, Selection, Table, Value};
use cohort_view::mapper::{ContinuousMapper, MapperSet, ObjectMapper};
use cohort_view::plotting::{
    plot, plot_correlation, plot_distribution, plot_fractions, CategoricalMode, ColumnKind,
    ContinuousMode, CorrelationOptions, DistributionOptions, Source,
};
use cohort_view::PlotError;

fn participants() -> Table {
    Table::from_columns(vec![
        Column::new(
            "sex",
            vec!["F".into(), "M".into(), "F".into(), "M".into()],
        ),
        Column::new(
            "smoker",
            vec![true.into(), true.into(), false.into(), false.into()],
        ),
        Column::new(
            "bmi",
            vec![
                Value::Float(21.5),
                Value::Float(27.0),
                Value::Float(f64::NAN),
                Value::Float(31.2),
            ],
        ),
    ])
    .unwrap()
}

#[test]
fn fractions_of_selected_subset() {
    let table = participants();
    let sex = table.column("sex").unwrap();
    let mapper = ObjectMapper::new(sex);

    let (_, summary) = plot_fractions(sex, &Selection::new([0, 2]), "sex", &mapper).unwrap();
    assert_eq!(summary.fraction("F", Source::All), Some(0.5));
    assert_eq!(summary.fraction("F", Source::Selected), Some(1.0));
    assert_eq!(summary.fraction("M", Source::Selected), Some(0.0));
}

#[test]
fn one_chart_per_mapper_in_insertion_order() {
    let table = participants();
    let mut mappers = MapperSet::new();
    mappers.insert(
        "bmi",
        Box::new(ContinuousMapper::new(table.column("bmi").unwrap(), 2).unwrap()),
    );
    mappers.insert("sex", Box::new(ObjectMapper::new(table.column("sex").unwrap())));

    let charts = plot(&table, &Selection::new([1, 3]), &mappers).unwrap();
    let titles: Vec<_> = charts.iter().map(|c| c.title.as_deref()).collect();
    assert_eq!(titles, vec![Some("bmi"), Some("sex")]);
}

#[test]
fn selection_out_of_range_is_rejected() {
    let table = participants();
    let mut mappers = MapperSet::new();
    mappers.insert("sex", Box::new(ObjectMapper::new(table.column("sex").unwrap())));

    assert_eq!(
        plot(&table, &Selection::new([0, 9]), &mappers).unwrap_err(),
        PlotError::InvalidSelection { row: 9, len: 4 }
    );
}

#[test]
fn balanced_cross_tab_draws_equal_bubbles() {
    let table = participants();
    let options = CorrelationOptions::default();
    let chart = plot_correlation(&table, "sex", "smoker", None, None, None, &options).unwrap();

    let Some(Mark::Bubbles(bubbles)) = chart.marks.first() else {
        panic!("expected a count grid");
    };
    assert_eq!(bubbles.len(), 4);
    assert!(bubbles.iter().all(|b| b.area == 1.0));
    let mid = ColorScheme::YlGnBu.sample(0.5);
    assert!(bubbles.iter().all(|b| b.color == mid));
}

#[test]
fn correlation_is_idempotent() {
    let table = participants();
    let options = CorrelationOptions {
        x_kind: ColumnKind::Categorical,
        y_kind: ColumnKind::Continuous,
        cat_mode: CategoricalMode::Violin,
        ..CorrelationOptions::default()
    };
    let first = plot_correlation(&table, "sex", "bmi", None, None, None, &options).unwrap();
    let second = plot_correlation(&table, "sex", "bmi", None, None, None, &options).unwrap();
    assert_eq!(first, second);
}

#[test]
fn scatter_skips_non_finite_pairs() {
    let table = Table::from_columns(vec![
        Column::new("age", vec![Value::Integer(30), Value::Integer(45), Value::Integer(60)]),
        Column::new("bmi", vec![Value::Float(22.0), Value::Float(f64::NAN), Value::Float(28.0)]),
    ])
    .unwrap();
    let options = CorrelationOptions {
        x_kind: ColumnKind::Continuous,
        y_kind: ColumnKind::Continuous,
        cont_mode: ContinuousMode::Scatter,
        ..CorrelationOptions::default()
    };
    let chart = plot_correlation(&table, "age", "bmi", None, None, None, &options).unwrap();
    let Some(Mark::Points(series)) = chart.marks.first() else {
        panic!("expected a scatter");
    };
    assert_eq!(series.points, vec![[30.0, 22.0], [60.0, 28.0]]);
}

#[test]
fn histogram_counts_only_finite_values() {
    let table = participants();
    let options = DistributionOptions {
        kind: ColumnKind::Continuous,
        nbins: 4,
        ..DistributionOptions::default()
    };
    let (chart, color) = plot_distribution(&table, "bmi", None, None, &options).unwrap();
    assert_eq!(color, ColorScheme::YlGnBu.accent());

    let Some(Mark::Histogram(hist)) = chart.marks.first() else {
        panic!("expected a histogram");
    };
    assert_eq!(hist.total(), 3);
}

#[test]
fn targets_are_drawn_as_dashed_segments() {
    let table = participants();
    let sex = table.column("sex").unwrap();
    let targets = BTreeMap::from([("F".to_string(), 0.6), ("M".to_string(), 0.4)]);
    let mapper = ObjectMapper::new(sex).with_targets(targets);

    let (chart, _) = plot_fractions(sex, &Selection::all(4), "sex", &mapper).unwrap();
    let segments: Vec<_> = chart
        .marks
        .iter()
        .filter_map(|m| match m {
            Mark::Segment(s) => Some(s),
            _ => None,
        })
        .collect();
    assert_eq!(segments.len(), 2);
    assert!(segments.iter().all(|s| s.dashed));
    assert_eq!(segments[0].start, [-0.5, 0.6]);
    assert_eq!(segments[1].end, [1.5, 0.4]);
}
