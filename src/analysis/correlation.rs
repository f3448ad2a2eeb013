//! Pairwise Pearson correlation across the weather variables.
//!
//! The matrix covers every ordered pair of [`CORRELATION_VARIABLES`],
//! self-pairs included. Self-pairs go through the same formula as every
//! other cell, so a constant or empty series correlates to 0 with itself.

use serde::Serialize;

use crate::model::{TimeSeriesBundle, Variable};

/// Variables included in the correlation matrix, in row/column order.
pub const CORRELATION_VARIABLES: [Variable; 7] = [
    Variable::Temperature,
    Variable::RelativeHumidity,
    Variable::SurfacePressure,
    Variable::WindSpeed,
    Variable::WindGusts,
    Variable::DewPoint,
    Variable::Rain,
];

/// Maximum number of cells kept by [`rank_significant_correlations`].
pub const MAX_RANKED: usize = 8;

/// One cell of the correlation matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationCell {
    pub variable_a: Variable,
    pub variable_b: Variable,
    pub coefficient: f64,
}

impl CorrelationCell {
    pub fn is_self_pair(&self) -> bool {
        self.variable_a == self.variable_b
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
}

impl CorrelationStrength {
    /// Classifies `|r|`; below 0.2 there is nothing worth reporting.
    pub fn classify(coefficient: f64) -> Option<Self> {
        let magnitude = coefficient.abs();
        if magnitude >= 0.7 {
            Some(CorrelationStrength::Strong)
        } else if magnitude >= 0.4 {
            Some(CorrelationStrength::Moderate)
        } else if magnitude >= 0.2 {
            Some(CorrelationStrength::Weak)
        } else {
            None
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CorrelationStrength::Strong => "Very strong relationship indicating direct dependence",
            CorrelationStrength::Moderate => "Significant relationship suggesting mutual influence",
            CorrelationStrength::Weak => "Weak but detectable relationship",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationDirection {
    Positive,
    Negative,
}

/// A ranked correlation classified for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationInsight {
    pub cell: CorrelationCell,
    pub strength: CorrelationStrength,
    pub direction: CorrelationDirection,
}

impl CorrelationInsight {
    pub fn title(&self) -> String {
        format!("{} ↔ {}", self.cell.variable_a, self.cell.variable_b)
    }

    pub fn value_text(&self) -> String {
        let direction = match self.direction {
            CorrelationDirection::Positive => "positive",
            CorrelationDirection::Negative => "negative",
        };
        format!("r = {:.3} ({})", self.cell.coefficient, direction)
    }
}

// ---------------------------------------------------------------------------
// Pearson coefficient
// ---------------------------------------------------------------------------

/// Pearson correlation between two series with missing readings.
///
/// Samples are paired by position up to the shorter length; a pair is kept
/// only if both sides are present and not NaN. Fewer than two pairs, or a
/// zero denominator (a constant side), yields 0.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) if !a.is_nan() && !b.is_nan() => Some((*a, *b)),
            _ => None,
        })
        .collect();

    if pairs.len() < 2 {
        return 0.0;
    }

    let n = pairs.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2, mut sum_y2) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for &(a, b) in &pairs {
        sum_x += a;
        sum_y += b;
        sum_xy += a * b;
        sum_x2 += a * a;
        sum_y2 += b * b;
    }

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_x2 - sum_x * sum_x) * (n * sum_y2 - sum_y * sum_y)).sqrt();

    if denominator == 0.0 {
        return 0.0;
    }
    let r = numerator / denominator;
    // Rounding can push the radicand below zero for near-constant series.
    if r.is_finite() { r.clamp(-1.0, 1.0) } else { 0.0 }
}

// ---------------------------------------------------------------------------
// Matrix and ranking
// ---------------------------------------------------------------------------

/// Correlates every ordered pair of [`CORRELATION_VARIABLES`], row-major.
pub fn build_correlation_matrix(bundle: &TimeSeriesBundle) -> Vec<CorrelationCell> {
    let mut matrix = Vec::with_capacity(CORRELATION_VARIABLES.len().pow(2));
    for variable_a in CORRELATION_VARIABLES {
        for variable_b in CORRELATION_VARIABLES {
            matrix.push(CorrelationCell {
                variable_a,
                variable_b,
                coefficient: pearson(bundle.values(variable_a), bundle.values(variable_b)),
            });
        }
    }
    matrix
}

/// The strongest off-diagonal cells, by descending `|r|`, at most
/// [`MAX_RANKED`]. Ties keep matrix order.
///
/// Both orientations of a pair are distinct cells, so a strong pair
/// usually appears twice.
pub fn rank_significant_correlations(matrix: &[CorrelationCell]) -> Vec<CorrelationCell> {
    let mut ranked: Vec<CorrelationCell> = matrix
        .iter()
        .filter(|cell| !cell.is_self_pair())
        .cloned()
        .collect();
    ranked.sort_by(|a, b| b.coefficient.abs().total_cmp(&a.coefficient.abs()));
    ranked.truncate(MAX_RANKED);
    ranked
}

/// Classifies ranked cells, dropping those weaker than `|r| = 0.2`.
pub fn correlation_insights(ranked: &[CorrelationCell]) -> Vec<CorrelationInsight> {
    ranked
        .iter()
        .filter_map(|cell| {
            let strength = CorrelationStrength::classify(cell.coefficient)?;
            let direction = if cell.coefficient > 0.0 {
                CorrelationDirection::Positive
            } else {
                CorrelationDirection::Negative
            };
            Some(CorrelationInsight {
                cell: cell.clone(),
                strength,
                direction,
            })
        })
        .collect()
}
