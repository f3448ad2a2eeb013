//! Trend, accumulation, variability and stability summaries.
//!
//! [`analyze_patterns`] always returns four entries in a fixed order. When a
//! computation lacks data its entry keeps its slot and title and reports
//! "Insufficient data" instead of a value.

use serde::Serialize;

use crate::analysis::stats::{compute_stats, range_of};
use crate::model::{AnalysisError, QueryMode, TimeSeriesBundle, Variable};

/// Pressure standard deviation (hPa) below which the atmosphere is stable.
pub const STABLE_PRESSURE_STD_DEV: f64 = 2.0;
/// Pressure standard deviation (hPa) below which it is moderately variable.
pub const MODERATE_PRESSURE_STD_DEV: f64 = 5.0;

const INSUFFICIENT_DATA: &str = "Insufficient data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    TemperatureTrend,
    Precipitation,
    WindVariability,
    PressureStability,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pattern {
    pub kind: PatternKind,
    pub title: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureStability {
    Stable,
    ModeratelyVariable,
    VeryVariable,
}

impl PressureStability {
    pub fn classify(std_dev: f64) -> Self {
        if std_dev < STABLE_PRESSURE_STD_DEV {
            PressureStability::Stable
        } else if std_dev < MODERATE_PRESSURE_STD_DEV {
            PressureStability::ModeratelyVariable
        } else {
            PressureStability::VeryVariable
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PressureStability::Stable => "Stable",
            PressureStability::ModeratelyVariable => "Moderately variable",
            PressureStability::VeryVariable => "Very variable",
        }
    }
}

// ---------------------------------------------------------------------------
// Computations
// ---------------------------------------------------------------------------

/// Last valid temperature minus first valid temperature.
///
/// Positional over the filtered readings, not anchored to timestamps.
pub fn temperature_trend(bundle: &TimeSeriesBundle) -> Result<f64, AnalysisError> {
    let temps = bundle.valid_values(Variable::Temperature);
    match (temps.first(), temps.last()) {
        (Some(first), Some(last)) => Ok(last - first),
        _ => Err(AnalysisError::insufficient(Variable::Temperature, "trend")),
    }
}

/// Total rain (mm) and total snowfall (cm). Missing series sum to 0.
pub fn precipitation_totals(bundle: &TimeSeriesBundle) -> (f64, f64) {
    let rain = bundle.valid_values(Variable::Rain).iter().fold(0.0, |acc: f64, v| acc + v);
    let snow = bundle.valid_values(Variable::Snowfall).iter().fold(0.0, |acc: f64, v| acc + v);
    (rain, snow)
}

/// Number of calendar days touched by the bundle's timestamp index.
pub fn calendar_days(bundle: &TimeSeriesBundle) -> i64 {
    match (bundle.timestamps().first(), bundle.timestamps().last()) {
        (Some(first), Some(last)) => (last.date() - first.date()).num_days().abs() + 1,
        _ => 0,
    }
}

fn forecast_trend_title(days: i64) -> String {
    match days {
        0 => "Expected Trend".to_string(),
        1 => "Expected Trend (1 day)".to_string(),
        n => format!("Expected Trend ({} days)", n),
    }
}

/// `(range, min, max)` of wind speed.
pub fn wind_variability(bundle: &TimeSeriesBundle) -> Result<(f64, f64, f64), AnalysisError> {
    let (min, max) = range_of(Variable::WindSpeed, bundle.values(Variable::WindSpeed))?;
    Ok((max - min, min, max))
}

/// Population standard deviation of surface pressure and its classification.
pub fn pressure_stability(
    bundle: &TimeSeriesBundle,
) -> Result<(f64, PressureStability), AnalysisError> {
    let stats = compute_stats(bundle.values(Variable::SurfacePressure))
        .ok_or_else(|| AnalysisError::insufficient(Variable::SurfacePressure, "standard deviation"))?;
    Ok((stats.std_dev, PressureStability::classify(stats.std_dev)))
}

// ---------------------------------------------------------------------------
// Pattern list
// ---------------------------------------------------------------------------

/// Derives the four pattern summaries for `bundle`.
///
/// `mode` only selects the title wording; the forecast trend title quotes
/// the number of days the bundle covers.
pub fn analyze_patterns(bundle: &TimeSeriesBundle, mode: QueryMode) -> Vec<Pattern> {
    let forecast = mode == QueryMode::Forecast;

    let trend_value = match temperature_trend(bundle) {
        Ok(delta) if delta > 0.0 => format!("Ascending +{:.1}°C", delta),
        Ok(delta) => format!("Descending {:.1}°C", delta),
        Err(_) => INSUFFICIENT_DATA.to_string(),
    };

    let (rain, snow) = precipitation_totals(bundle);

    let wind_value = match wind_variability(bundle) {
        Ok((range, min, max)) => format!("Range: {:.1} km/h ({:.1} - {:.1})", range, min, max),
        Err(_) => INSUFFICIENT_DATA.to_string(),
    };

    let stability_value = match pressure_stability(bundle) {
        Ok((_, stability)) => stability.label().to_string(),
        Err(_) => INSUFFICIENT_DATA.to_string(),
    };

    vec![
        Pattern {
            kind: PatternKind::TemperatureTrend,
            title: if forecast {
                forecast_trend_title(calendar_days(bundle))
            } else {
                "Temperature Trend (48h)".to_string()
            },
            value: trend_value,
        },
        Pattern {
            kind: PatternKind::Precipitation,
            title: (if forecast { "Expected Precipitation" } else { "Accumulated Precipitation" }).to_string(),
            value: format!("Rain: {:.1}mm | Snow: {:.1}cm", rain, snow),
        },
        Pattern {
            kind: PatternKind::WindVariability,
            title: "Wind Variability".to_string(),
            value: wind_value,
        },
        Pattern {
            kind: PatternKind::PressureStability,
            title: (if forecast { "Expected Atmospheric Stability" } else { "Atmospheric Stability" }).to_string(),
            value: stability_value,
        },
    ]
}
