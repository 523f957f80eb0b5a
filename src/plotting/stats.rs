//! Numeric helpers behind the distribution marks.

use crate::chart::{BoxStats, HistBin};

const SQRT_2PI: f64 = 2.506_628_274_631_000_5;

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Equal-width bins over `[min, max]`; the last bin is closed on the right.
/// A constant sample gets `nbins` bins of width one centered on the value.
pub fn histogram(values: &[f64], nbins: usize) -> Vec<HistBin> {
    if values.is_empty() {
        return Vec::new();
    }
    let nbins = nbins.max(1);
    let (mut lo, mut hi) = min_max(values);
    if hi <= lo {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / nbins as f64;
    let mut counts = vec![0usize; nbins];
    for &v in values {
        let idx = ((v - lo) / width).floor() as usize;
        counts[idx.min(nbins - 1)] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistBin {
            start: lo + width * i as f64,
            end: lo + width * (i + 1) as f64,
            count,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Box statistics
// ---------------------------------------------------------------------------

/// Linear-interpolated quantile of sorted data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Quartiles, 1.5 IQR whiskers and outliers of the finite values.
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let lower_fence = q1 - 1.5 * iqr;
    let upper_fence = q3 + 1.5 * iqr;

    let lower_whisker = sorted
        .iter()
        .copied()
        .find(|&x| x >= lower_fence)
        .unwrap_or(q1);
    let upper_whisker = sorted
        .iter()
        .rev()
        .copied()
        .find(|&x| x <= upper_fence)
        .unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|&x| x < lower_fence || x > upper_fence)
        .collect();

    Some(BoxStats {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        outliers,
    })
}

// ---------------------------------------------------------------------------
// Kernel density estimates
// ---------------------------------------------------------------------------

/// Silverman's rule of thumb, floored so constant samples still get a bump.
pub fn silverman_bandwidth(values: &[f64]) -> f64 {
    let (mean, std) = mean_std(values);
    let n = values.len() as f64;
    let floor = 1e-3 * mean.abs().max(1.0);
    (1.06 * std * n.powf(-0.2)).max(floor)
}

/// Gaussian KDE sampled at `n_samples` points from `min - 2h` to `max + 2h`.
pub fn kde_1d(values: &[f64], n_samples: usize) -> Vec<[f64; 2]> {
    if values.is_empty() || n_samples < 2 {
        return Vec::new();
    }
    let h = silverman_bandwidth(values);
    let n = values.len() as f64;
    let (lo, hi) = min_max(values);
    let (start, end) = (lo - 2.0 * h, hi + 2.0 * h);
    (0..n_samples)
        .map(|i| {
            let x = start + (end - start) * i as f64 / (n_samples - 1) as f64;
            let density = values
                .iter()
                .map(|&xi| {
                    let u = (x - xi) / h;
                    (-0.5 * u * u).exp()
                })
                .sum::<f64>()
                / (n * h * SQRT_2PI);
            [x, density]
        })
        .collect()
}

/// Density sampled on a regular grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    /// `values[j][i]` is the density at `(xs[i], ys[j])`.
    pub values: Vec<Vec<f64>>,
}

impl DensityGrid {
    pub fn max(&self) -> f64 {
        self.values
            .iter()
            .flatten()
            .copied()
            .fold(0.0, f64::max)
    }
}

fn grid_axis(values: &[f64], n: usize) -> Vec<f64> {
    let (lo, hi) = min_max(values);
    let pad = if hi > lo { 0.1 * (hi - lo) } else { 1.0 };
    let (start, end) = (lo - pad, hi + pad);
    (0..n)
        .map(|i| start + (end - start) * i as f64 / (n - 1) as f64)
        .collect()
}

/// Product-Gaussian KDE of paired samples on an `n x n` grid, Scott bandwidth
/// per axis.
pub fn kde_2d(xs: &[f64], ys: &[f64], n: usize) -> DensityGrid {
    let n = n.max(2);
    let count = xs.len().min(ys.len());
    let (xs, ys) = (&xs[..count], &ys[..count]);
    let grid_x = grid_axis(xs, n);
    let grid_y = grid_axis(ys, n);
    if count == 0 {
        return DensityGrid {
            xs: grid_x,
            ys: grid_y,
            values: vec![vec![0.0; n]; n],
        };
    }

    let scott = (count as f64).powf(-1.0 / 6.0);
    let bandwidth = |v: &[f64]| {
        let (mean, std) = mean_std(v);
        (std * scott).max(1e-3 * mean.abs().max(1.0))
    };
    let (hx, hy) = (bandwidth(xs), bandwidth(ys));
    let norm = count as f64 * hx * hy * SQRT_2PI * SQRT_2PI;

    let values = grid_y
        .iter()
        .map(|&gy| {
            grid_x
                .iter()
                .map(|&gx| {
                    xs.iter()
                        .zip(ys)
                        .map(|(&x, &y)| {
                            let u = (gx - x) / hx;
                            let v = (gy - y) / hy;
                            (-0.5 * (u * u + v * v)).exp()
                        })
                        .sum::<f64>()
                        / norm
                })
                .collect()
        })
        .collect();

    DensityGrid {
        xs: grid_x,
        ys: grid_y,
        values,
    }
}

// ---------------------------------------------------------------------------
// Marching squares
// ---------------------------------------------------------------------------

fn crossing(a: [f64; 2], b: [f64; 2], va: f64, vb: f64, level: f64) -> [f64; 2] {
    let t = if vb == va { 0.5 } else { (level - va) / (vb - va) };
    [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t]
}

/// Line segments of the iso-line at `level`.
pub fn contour_segments(grid: &DensityGrid, level: f64) -> Vec<[[f64; 2]; 2]> {
    let mut out = Vec::new();
    for j in 0..grid.ys.len().saturating_sub(1) {
        for i in 0..grid.xs.len().saturating_sub(1) {
            // Corners counter-clockwise from bottom-left.
            let p = [
                [grid.xs[i], grid.ys[j]],
                [grid.xs[i + 1], grid.ys[j]],
                [grid.xs[i + 1], grid.ys[j + 1]],
                [grid.xs[i], grid.ys[j + 1]],
            ];
            let v = [
                grid.values[j][i],
                grid.values[j][i + 1],
                grid.values[j + 1][i + 1],
                grid.values[j + 1][i],
            ];
            let above = v.map(|x| x >= level);

            // Edges: bottom (0-1), right (1-2), top (3-2), left (0-3).
            let edges = [(0, 1), (1, 2), (3, 2), (0, 3)];
            let mut hits: [Option<[f64; 2]>; 4] = [None; 4];
            for (e, &(a, b)) in edges.iter().enumerate() {
                if above[a] != above[b] {
                    hits[e] = Some(crossing(p[a], p[b], v[a], v[b], level));
                }
            }

            match hits {
                [Some(b), Some(r), Some(t), Some(l)] => {
                    // Saddle: isolate the corners that disagree with the center.
                    let center_above = v.iter().sum::<f64>() / 4.0 >= level;
                    if above[0] == center_above {
                        out.push([b, r]);
                        out.push([t, l]);
                    } else {
                        out.push([b, l]);
                        out.push([r, t]);
                    }
                }
                _ => {
                    let pts: Vec<[f64; 2]> = hits.iter().flatten().copied().collect();
                    if let [a, b] = pts[..] {
                        out.push([a, b]);
                    }
                }
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Point layouts for strip and swarm plots
// ---------------------------------------------------------------------------

/// Deterministic jitter offsets in `[-half_width, half_width]`.
pub fn jitter(n: usize, half_width: f64) -> Vec<f64> {
    const GOLDEN: f64 = 0.618_033_988_749_895;
    (0..n)
        .map(|i| ((i as f64 * GOLDEN).fract() * 2.0 - 1.0) * half_width)
        .collect()
}

/// Beeswarm offsets: values closer than `diameter` are spread sideways in
/// multiples of `step`, alternating right and left, capped at `half_width`.
/// Offsets are returned in input order.
pub fn swarm_offsets(values: &[f64], diameter: f64, step: f64, half_width: f64) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut offsets = vec![0.0; values.len()];
    let mut group_start = 0.0;
    let mut slot = 0usize;
    for (k, &idx) in order.iter().enumerate() {
        if k == 0 || values[idx] - group_start >= diameter {
            group_start = values[idx];
            slot = 0;
        }
        let offset = slot.div_ceil(2) as f64 * step;
        let side = if slot % 2 == 1 { 1.0 } else { -1.0 };
        offsets[idx] = (side * offset).clamp(-half_width, half_width);
        slot += 1;
    }
    offsets
}
