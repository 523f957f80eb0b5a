//! Backend-agnostic chart description.
//!
//! The plotting functions only produce these values; `ui::plot` draws them
//! with egui_plot. Everything is plain data so two charts built from the
//! same input compare equal.

use eframe::egui::Color32;

/// A labelled tick on a categorical axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

/// Direction of per-category marks: `Vertical` puts categories on the x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

/// One plotting area: axes decoration plus the marks drawn onto it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Chart {
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    /// Explicit tick labels; empty means numeric ticks.
    pub x_ticks: Vec<Tick>,
    pub y_ticks: Vec<Tick>,
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
    pub marks: Vec<Mark>,
}

impl Chart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mark: Mark) {
        self.marks.push(mark);
    }

    /// Category labels as ticks at slots `0, 1, 2, ...`.
    pub fn category_ticks<S: AsRef<str>>(labels: &[S]) -> Vec<Tick> {
        labels
            .iter()
            .enumerate()
            .map(|(i, l)| Tick {
                value: i as f64,
                label: l.as_ref().to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    Bars(BarSeries),
    Segment(Segment),
    Bubbles(Vec<Bubble>),
    Points(PointSeries),
    Boxes(BoxSeries),
    Area(Area),
    Histogram(HistogramSeries),
    Contour(ContourSet),
}

// ---------------------------------------------------------------------------
// Mark payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub x: f64,
    pub height: f64,
    pub width: f64,
}

/// Bars sharing a legend entry and color (one hue group).
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub name: String,
    pub color: Color32,
    pub bars: Vec<Bar>,
}

/// Straight line from `start` to `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start: [f64; 2],
    pub end: [f64; 2],
    pub width: f32,
    pub dashed: bool,
    pub color: Color32,
}

impl Segment {
    pub fn horizontal(y: f64, x_start: f64, x_end: f64) -> Self {
        Segment {
            start: [x_start, y],
            end: [x_end, y],
            width: 2.0,
            dashed: true,
            color: Color32::BLACK,
        }
    }
}

/// Scatter marker with its own area and fill.
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub x: f64,
    pub y: f64,
    /// Marker area (arbitrary units; the renderer scales to the largest).
    pub area: f64,
    pub color: Color32,
}

/// Equally sized markers of one color.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSeries {
    pub name: String,
    pub color: Color32,
    pub radius: f32,
    pub alpha: f32,
    pub points: Vec<[f64; 2]>,
}

/// Five-number summary plus outliers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxMark {
    pub name: String,
    pub position: f64,
    pub stats: BoxStats,
    pub color: Color32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxSeries {
    pub orientation: Orientation,
    pub width: f64,
    pub boxes: Vec<BoxMark>,
}

/// Filled closed outline (violin bodies).
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub name: String,
    pub fill: Color32,
    pub outline: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSeries {
    pub name: String,
    pub color: Color32,
    pub alpha: f32,
    pub bins: Vec<HistBin>,
}

impl HistogramSeries {
    /// Number of values counted in the bins.
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

/// Iso-density line at one level.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourLine {
    pub level: f64,
    pub color: Color32,
    pub segments: Vec<[[f64; 2]; 2]>,
}

/// Grid cell filled with the color of the highest level it reaches.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadedCell {
    pub x: [f64; 2],
    pub y: [f64; 2],
    pub color: Color32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContourSet {
    pub lines: Vec<ContourLine>,
    pub cells: Vec<ShadedCell>,
}
