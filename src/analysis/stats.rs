//! Descriptive statistics over a single series with missing readings.

use serde::Serialize;

use crate::model::{AnalysisError, Variable, valid_values};

/// Summary statistics for the valid readings of one series.
///
/// Quartiles are positional cuts into the sorted readings
/// (`sorted[floor(n * 0.25)]` and `sorted[floor(n * 0.75)]`), not
/// interpolated estimates. The standard deviation is the population one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsResult {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub q1: f64,
    pub q3: f64,
}

/// Computes statistics over the present, non-NaN readings of `series`.
///
/// Returns `None` when no valid reading remains; callers render that as
/// "N/A".
pub fn compute_stats(series: &[Option<f64>]) -> Option<StatsResult> {
    let values = valid_values(series);
    if values.is_empty() {
        return None;
    }

    let count = values.len();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / count as f64;

    let mut sorted = values.clone();
    sorted.sort_by(f64::total_cmp);
    let median = if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    } else {
        sorted[count / 2]
    };
    let q1 = sorted[(count as f64 * 0.25).floor() as usize];
    let q3 = sorted[(count as f64 * 0.75).floor() as usize];

    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

    Some(StatsResult {
        count,
        min,
        max,
        mean,
        median,
        std_dev: variance.sqrt(),
        q1,
        q3,
    })
}

/// Arithmetic mean of the valid readings, or `InsufficientData`.
pub fn mean_of(variable: Variable, series: &[Option<f64>]) -> Result<f64, AnalysisError> {
    let values = valid_values(series);
    if values.is_empty() {
        return Err(AnalysisError::insufficient(variable, "average"));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// `(min, max)` of the valid readings, or `InsufficientData`.
pub fn range_of(variable: Variable, series: &[Option<f64>]) -> Result<(f64, f64), AnalysisError> {
    let values = valid_values(series);
    if values.is_empty() {
        return Err(AnalysisError::insufficient(variable, "range"));
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok((min, max))
}
