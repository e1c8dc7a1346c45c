//! Distribution summaries, kernel density curves and correlations.
//!
//! All functions work on plain `f64` slices; missing values are filtered out
//! by the caller.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Density grids extend this many bandwidths beyond the data range.
const KDE_CUT: f64 = 3.0;

/// Empirical summary of one group of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1 denominator).
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
    /// Gaussian kernel density estimate, when the group has spread.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density: Option<DensityCurve>,
}

/// A kernel density estimate sampled on an evenly spaced grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityCurve {
    pub bandwidth: f64,
    pub x: Vec<f64>,
    pub density: Vec<f64>,
}

impl DistributionSummary {
    /// Summarise `values`, sampling the density curve on `grid_points` points.
    pub fn from_values(values: &[f64], grid_points: usize) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        Self {
            count: values.len(),
            mean: mean(values),
            std: sample_std(values),
            min: sorted.first().copied(),
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted.last().copied(),
            density: gaussian_kde(values, grid_points),
        }
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation; `None` for fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Quantile of already sorted values using linear interpolation between
/// the closest ranks.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Scott's rule bandwidth: `n^(-1/5) * std`.
pub fn scott_bandwidth(values: &[f64]) -> Option<f64> {
    let std = sample_std(values)?;
    if std <= 0.0 || !std.is_finite() {
        return None;
    }
    Some((values.len() as f64).powf(-0.2) * std)
}

/// Gaussian kernel density estimate on `grid_points` evenly spaced points
/// spanning the data range widened by three bandwidths on each side.
///
/// Returns `None` when the values have no spread (fewer than two distinct
/// values) or the grid has fewer than two points.
pub fn gaussian_kde(values: &[f64], grid_points: usize) -> Option<DensityCurve> {
    if grid_points < 2 {
        return None;
    }
    let bandwidth = scott_bandwidth(values)?;

    let lo = values.iter().copied().fold(f64::INFINITY, f64::min) - KDE_CUT * bandwidth;
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max) + KDE_CUT * bandwidth;
    let step = (hi - lo) / (grid_points - 1) as f64;

    let norm = 1.0 / (values.len() as f64 * bandwidth * (2.0 * PI).sqrt());
    let x: Vec<f64> = (0..grid_points).map(|i| lo + step * i as f64).collect();
    let density = x
        .iter()
        .map(|&xi| {
            norm * values
                .iter()
                .map(|&v| (-0.5 * ((xi - v) / bandwidth).powi(2)).exp())
                .sum::<f64>()
        })
        .collect();

    Some(DensityCurve {
        bandwidth,
        x,
        density,
    })
}

/// Pearson correlation over the pairs where both sides are present.
///
/// `None` when fewer than two complete pairs exist or either side has zero
/// variance.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) if a.is_finite() && b.is_finite() => Some((*a, *b)),
            _ => None,
        })
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in &pairs {
        cov += (a - mean_x) * (b - mean_y);
        var_x += (a - mean_x).powi(2);
        var_y += (b - mean_y).powi(2);
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 {
        return None;
    }
    Some((cov / denominator).clamp(-1.0, 1.0))
}
