use eframe::egui::{self, Color32, Id, Stroke, Ui};
use egui_plot::{
    uniform_grid_spacer, Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line,
    LineStyle, MarkerShape, Plot, PlotPoints, PlotUi, Points, Polygon,
};

use cohort_view::chart::{Chart, ContourSet, Mark, Orientation, Tick};

use crate::state::{AppState, View};

/// Radius in points of the largest bubble of a count grid.
const MAX_BUBBLE_RADIUS: f32 = 25.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the charts of the current view in the central panel.
pub fn chart_panel(ui: &mut Ui, state: &AppState) {
    if state.table.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a participant table to begin  (File → Open table…)");
        });
        return;
    }

    if let Some(err) = &state.plot_error {
        ui.colored_label(Color32::RED, err);
        return;
    }

    match state.view {
        View::Fractions => {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    for (i, chart) in state.charts.iter().enumerate() {
                        if let Some(title) = &chart.title {
                            ui.strong(title);
                        }
                        let height = Some(state.config.chart_height);
                        show_chart(ui, Id::new(("fractions", i)), chart, height);
                        ui.separator();
                    }
                });
        }
        View::Correlation | View::Distribution => {
            if let Some(chart) = state.charts.first() {
                show_chart(ui, Id::new(("single", state.view)), chart, None);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Chart → egui_plot
// ---------------------------------------------------------------------------

/// Label categorical ticks; other grid marks stay blank.
fn tick_formatter(ticks: Vec<Tick>) -> impl Fn(GridMark, &std::ops::RangeInclusive<f64>) -> String {
    move |mark, _range| {
        ticks
            .iter()
            .find(|t| (t.value - mark.value).abs() < 1e-6)
            .map(|t| t.label.clone())
            .unwrap_or_default()
    }
}

/// Draw a [`Chart`] into `ui`. `height` of `None` fills the available space.
pub fn show_chart(ui: &mut Ui, id: Id, chart: &Chart, height: Option<f32>) {
    let mut plot = Plot::new(id)
        .legend(Legend::default())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true);

    if let Some(h) = height {
        plot = plot.height(h);
    }
    if let Some(label) = &chart.x_label {
        plot = plot.x_axis_label(label.clone());
    }
    if let Some(label) = &chart.y_label {
        plot = plot.y_axis_label(label.clone());
    }
    if !chart.x_ticks.is_empty() {
        plot = plot
            .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 1.0, 1.0]))
            .x_axis_formatter(tick_formatter(chart.x_ticks.clone()));
    }
    if !chart.y_ticks.is_empty() {
        plot = plot
            .y_grid_spacer(uniform_grid_spacer(|_| [1.0, 1.0, 1.0]))
            .y_axis_formatter(tick_formatter(chart.y_ticks.clone()));
    }
    if let Some((lo, hi)) = chart.x_range {
        plot = plot.include_x(lo).include_x(hi);
    }
    if let Some((lo, hi)) = chart.y_range {
        plot = plot.include_y(lo).include_y(hi);
    }

    plot.show(ui, |plot_ui| {
        for mark in &chart.marks {
            draw_mark(plot_ui, mark);
        }
    });
}

fn draw_mark(plot_ui: &mut PlotUi, mark: &Mark) {
    match mark {
        Mark::Bars(series) => {
            let bars = series
                .bars
                .iter()
                .map(|b| Bar::new(b.x, b.height).width(b.width).fill(series.color))
                .collect();
            plot_ui.bar_chart(BarChart::new(bars).name(&series.name).color(series.color));
        }
        Mark::Segment(seg) => {
            let mut line = Line::new(PlotPoints::from(vec![seg.start, seg.end]))
                .color(seg.color)
                .width(seg.width);
            if seg.dashed {
                line = line.style(LineStyle::dashed_loose());
            }
            plot_ui.line(line);
        }
        Mark::Bubbles(bubbles) => {
            let max_area = bubbles.iter().map(|b| b.area).fold(0.0, f64::max);
            if max_area <= 0.0 {
                return;
            }
            for b in bubbles.iter().filter(|b| b.area > 0.0) {
                let radius = MAX_BUBBLE_RADIUS * (b.area / max_area).sqrt() as f32;
                plot_ui.points(
                    Points::new(vec![[b.x, b.y]])
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(radius)
                        .color(b.color.gamma_multiply(0.7)),
                );
            }
        }
        Mark::Points(series) => {
            let mut points = Points::new(series.points.clone())
                .shape(MarkerShape::Circle)
                .filled(true)
                .radius(series.radius)
                .color(series.color.gamma_multiply(series.alpha));
            if !series.name.is_empty() {
                points = points.name(&series.name);
            }
            plot_ui.points(points);
        }
        Mark::Boxes(series) => {
            for b in &series.boxes {
                let s = &b.stats;
                let elem = BoxElem::new(
                    b.position,
                    BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker),
                )
                .box_width(series.width)
                .whisker_width(series.width / 2.0)
                .fill(b.color.gamma_multiply(0.6))
                .stroke(Stroke::new(1.5, Color32::DARK_GRAY));
                let mut plot = BoxPlot::new(vec![elem]).name(&b.name);
                let outliers: Vec<[f64; 2]> = s
                    .outliers
                    .iter()
                    .map(|&v| match series.orientation {
                        Orientation::Vertical => [b.position, v],
                        Orientation::Horizontal => [v, b.position],
                    })
                    .collect();
                if series.orientation == Orientation::Horizontal {
                    plot = plot.horizontal();
                }
                plot_ui.box_plot(plot);
                if !outliers.is_empty() {
                    plot_ui.points(Points::new(outliers).radius(2.5).color(Color32::DARK_GRAY));
                }
            }
        }
        Mark::Area(area) => {
            plot_ui.polygon(
                Polygon::new(PlotPoints::from(area.outline.clone()))
                    .name(&area.name)
                    .fill_color(area.fill.gamma_multiply(0.7))
                    .stroke(Stroke::new(1.0, Color32::DARK_GRAY)),
            );
        }
        Mark::Histogram(hist) => {
            let color = hist.color.gamma_multiply(hist.alpha);
            let bars = hist
                .bins
                .iter()
                .map(|bin| {
                    Bar::new((bin.start + bin.end) / 2.0, bin.count as f64)
                        .width(bin.end - bin.start)
                        .fill(color)
                        .stroke(Stroke::NONE)
                })
                .collect();
            plot_ui.bar_chart(BarChart::new(bars).name(&hist.name).color(color));
        }
        Mark::Contour(set) => draw_contours(plot_ui, set),
    }
}

fn draw_contours(plot_ui: &mut PlotUi, set: &ContourSet) {
    for cell in &set.cells {
        let corners = vec![
            [cell.x[0], cell.y[0]],
            [cell.x[1], cell.y[0]],
            [cell.x[1], cell.y[1]],
            [cell.x[0], cell.y[1]],
        ];
        plot_ui.polygon(
            Polygon::new(PlotPoints::from(corners))
                .fill_color(cell.color)
                .stroke(Stroke::NONE),
        );
    }
    for line in &set.lines {
        for seg in &line.segments {
            plot_ui.line(
                Line::new(PlotPoints::from(seg.to_vec()))
                    .color(line.color)
                    .width(1.0),
            );
        }
    }
}
