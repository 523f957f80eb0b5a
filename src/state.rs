use std::collections::BTreeSet;
use std::path::PathBuf;

use cohort_view::chart::Chart;
use cohort_view::config::ViewerConfig;
use cohort_view::data::filter::{filtered_selection, init_filter_state, FilterState};
use cohort_view::data::model::{Column, Selection, Table, Value};
use cohort_view::error::PlotError;
use cohort_view::mapper::{ContinuousMapper, Mapper, MapperSet, ObjectMapper};
use cohort_view::plotting::{self, ColumnKind};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which diagnostic the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    #[default]
    Fractions,
    Correlation,
    Distribution,
}

impl View {
    pub const ALL: [View; 3] = [View::Fractions, View::Correlation, View::Distribution];

    pub fn label(self) -> &'static str {
        match self {
            View::Fractions => "Selected vs. all",
            View::Correlation => "Correlation",
            View::Distribution => "Distribution",
        }
    }
}

/// Where the current selection came from.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SelectionSource {
    /// Rows passing the side panel filters.
    #[default]
    Filters,
    File(PathBuf),
}

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded participant table (None until user loads a file).
    pub table: Option<Table>,

    /// Per-column filter selections.
    pub filters: FilterState,

    /// Selected rows compared against the full table.
    pub selection: Selection,
    pub selection_source: SelectionSource,

    pub view: View,
    pub x_column: Option<String>,
    pub y_column: Option<String>,

    /// Plot options (kinds, modes, color scheme, bins).
    pub config: ViewerConfig,

    /// Charts of the current view (cached until inputs change).
    pub charts: Vec<Chart>,
    pub plot_error: Option<String>,
    dirty: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn with_config(config: ViewerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Ingest a newly loaded table, initialise filters and axes.
    pub fn set_table(&mut self, table: Table) {
        self.filters = init_filter_state(&table);
        self.selection = Selection::all(table.len());
        self.selection_source = SelectionSource::Filters;

        let first = table.column_names.first().cloned();
        let second = table.column_names.get(1).cloned().or_else(|| first.clone());
        self.table = Some(table);
        if let Some(col) = first {
            self.set_x_column(col);
        }
        if let Some(col) = second {
            self.set_y_column(col);
        }
        self.status_message = None;
        self.mark_dirty();
    }

    /// Use rows from a selection file instead of the filters.
    pub fn set_selection(&mut self, selection: Selection, path: PathBuf) {
        self.selection = selection;
        self.selection_source = SelectionSource::File(path);
        self.mark_dirty();
    }

    /// Switch back to the filter-based selection.
    pub fn use_filter_selection(&mut self) {
        self.selection_source = SelectionSource::Filters;
        self.selection = Selection::default();
        self.refilter();
        self.mark_dirty();
    }

    /// Recompute the selection after a filter change.
    pub fn refilter(&mut self) {
        if self.selection_source != SelectionSource::Filters {
            return;
        }
        if let Some(table) = &self.table {
            let selection = filtered_selection(table, &self.filters);
            if selection != self.selection {
                self.selection = selection;
                self.mark_dirty();
            }
        }
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: &str) {
        if let Some(all_vals) = self
            .table
            .as_ref()
            .and_then(|t| t.unique_values.get(column))
        {
            self.filters.insert(column.to_string(), all_vals.clone());
            self.refilter();
        }
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, column: &str) {
        self.filters.insert(column.to_string(), BTreeSet::new());
        self.refilter();
    }

    /// Toggle a single value in a column's filter.
    pub fn toggle_filter_value(&mut self, column: &str, value: &Value) {
        let selected = self.filters.entry(column.to_string()).or_default();
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
        self.refilter();
    }

    fn inferred_kind(&self, column: &str) -> ColumnKind {
        self.table
            .as_ref()
            .and_then(|t| t.column(column).ok())
            .map(ColumnKind::infer)
            .unwrap_or_default()
    }

    /// Set the x column; its kind defaults to the inferred one.
    pub fn set_x_column(&mut self, column: String) {
        let kind = self.inferred_kind(&column);
        self.config.correlation.x_kind = kind;
        self.config.distribution.kind = kind;
        self.x_column = Some(column);
        self.mark_dirty();
    }

    pub fn set_y_column(&mut self, column: String) {
        self.config.correlation.y_kind = self.inferred_kind(&column);
        self.y_column = Some(column);
        self.mark_dirty();
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Rebuild the charts of the current view if any input changed.
    pub fn refresh_charts(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        let Some(table) = &self.table else {
            self.charts.clear();
            return;
        };

        match self.build_charts(table) {
            Ok(charts) => {
                self.charts = charts;
                self.plot_error = None;
            }
            Err(e) => {
                log::warn!("could not build {:?} charts: {e}", self.view);
                self.charts.clear();
                self.plot_error = Some(format!("Cannot plot: {e}"));
            }
        }
    }

    fn build_charts(&self, table: &Table) -> Result<Vec<Chart>, PlotError> {
        match self.view {
            View::Fractions => {
                let mappers = default_mappers(table, self.config.correlation.n_out);
                plotting::plot(table, &self.selection, &mappers)
            }
            View::Correlation => {
                let (Some(x), Some(y)) = (&self.x_column, &self.y_column) else {
                    return Ok(Vec::new());
                };
                let chart = plotting::plot_correlation(
                    table,
                    x,
                    y,
                    None,
                    None,
                    None,
                    &self.config.correlation,
                )?;
                Ok(vec![chart])
            }
            View::Distribution => {
                let Some(x) = &self.x_column else {
                    return Ok(Vec::new());
                };
                let (chart, _) =
                    plotting::plot_distribution(table, x, None, None, &self.config.distribution)?;
                Ok(vec![chart])
            }
        }
    }
}

/// One mapper per column, chosen by the inferred column kind.
fn default_mappers(table: &Table, n_out: usize) -> MapperSet {
    let mut mappers = MapperSet::new();
    for column in table.columns() {
        mappers.insert(column.name.clone(), default_mapper(column, n_out));
    }
    mappers
}

fn default_mapper(column: &Column, n_out: usize) -> Box<dyn Mapper> {
    if ColumnKind::infer(column) == ColumnKind::Continuous {
        if let Ok(m) = ContinuousMapper::new(column, n_out) {
            return Box::new(m);
        }
    }
    Box::new(ObjectMapper::new(column))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::from_columns(vec![
            Column::new("sex", vec!["F".into(), "M".into(), "F".into()]),
            Column::new("bmi", vec![Value::Float(20.0), Value::Float(25.0), Value::Float(30.0)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_set_table_infers_axes() {
        let mut state = AppState::default();
        state.set_table(table());
        assert_eq!(state.x_column.as_deref(), Some("sex"));
        assert_eq!(state.y_column.as_deref(), Some("bmi"));
        assert_eq!(state.config.correlation.x_kind, ColumnKind::Categorical);
        assert_eq!(state.config.correlation.y_kind, ColumnKind::Continuous);
        assert_eq!(state.selection, Selection::all(3));
    }

    #[test]
    fn test_fraction_view_one_chart_per_column() {
        let mut state = AppState::default();
        state.set_table(table());
        state.toggle_filter_value("sex", &Value::from("M"));
        assert_eq!(state.selection, Selection::new([0, 2]));

        state.refresh_charts();
        assert!(state.plot_error.is_none());
        assert_eq!(state.charts.len(), 2);
    }

    #[test]
    fn test_empty_selection_reports_error() {
        let mut state = AppState::default();
        state.set_table(table());
        state.select_none("sex");
        state.refresh_charts();
        assert!(state.charts.is_empty());
        assert!(state.plot_error.is_some());
    }

    #[test]
    fn test_file_selection_ignores_filters() {
        let mut state = AppState::default();
        state.set_table(table());
        state.set_selection(Selection::new([1]), PathBuf::from("sel.json"));
        state.select_none("sex");
        assert_eq!(state.selection, Selection::new([1]));

        state.use_filter_selection();
        assert!(state.selection.is_empty());
    }

    #[test]
    fn test_correlation_view() {
        let mut state = AppState::default();
        state.set_table(table());
        state.view = View::Correlation;
        state.mark_dirty();
        state.refresh_charts();
        assert_eq!(state.charts.len(), 1);
    }
}
