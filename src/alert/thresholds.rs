//! Weather threshold checking.
//!
//! Rules run in a fixed order which is also the display order: temperature,
//! wind gusts, rain, pressure, humidity. Severity is only used to derive the
//! aggregate [`RiskLevel`]; alerts are never re-sorted by it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::stats::{mean_of, range_of};
use crate::logging::{self, Source};
use crate::model::{AnalysisError, TimeSeriesBundle, Variable};

/// Alert severity levels, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

/// What a triggered rule is about. Each category carries a display icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    Heat,
    Frost,
    DangerousWind,
    ModerateWind,
    IntenseRain,
    PressureChange,
    HighHumidity,
}

impl AlertCategory {
    pub fn icon(self) -> &'static str {
        match self {
            AlertCategory::Heat => "🔥",
            AlertCategory::Frost => "❄️",
            AlertCategory::DangerousWind => "💨",
            AlertCategory::ModerateWind => "🌬️",
            AlertCategory::IntenseRain => "🌧️",
            AlertCategory::PressureChange => "⚡",
            AlertCategory::HighHumidity => "💧",
        }
    }
}

/// A weather alert triggered when a series crosses a threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub category: AlertCategory,
    /// The measured value quoted in `message`.
    pub value: f64,
    pub message: String,
}

impl Alert {
    fn new(severity: AlertSeverity, category: AlertCategory, value: f64, message: String) -> Self {
        Self {
            severity,
            category,
            value,
            message,
        }
    }

    pub fn icon(&self) -> &'static str {
        self.category.icon()
    }
}

/// Aggregate risk over an alert list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
        }
    }
}

/// HIGH if any alert is high, else MEDIUM if any is medium, else LOW.
pub fn risk_level(alerts: &[Alert]) -> RiskLevel {
    if alerts.iter().any(|a| a.severity == AlertSeverity::High) {
        RiskLevel::High
    } else if alerts.iter().any(|a| a.severity == AlertSeverity::Medium) {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Trigger levels for every rule. All comparisons are strict (`>` / `<`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    /// °C, maximum temperature above this raises a heat alert.
    pub heat_c: f64,
    /// °C, minimum temperature below this raises a frost alert.
    pub frost_c: f64,
    /// km/h, gusts above this are dangerous.
    pub dangerous_gust_kmh: f64,
    /// km/h, gusts above this (but not dangerous) are moderate.
    pub moderate_gust_kmh: f64,
    /// mm/h, hourly rain above this is intense.
    pub intense_rain_mm: f64,
    /// hPa, max-min pressure spread above this is abrupt.
    pub pressure_change_hpa: f64,
    /// %, average relative humidity above this is high.
    pub high_humidity_pct: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            heat_c: 30.0,
            frost_c: 0.0,
            dangerous_gust_kmh: 50.0,
            moderate_gust_kmh: 30.0,
            intense_rain_mm: 10.0,
            pressure_change_hpa: 10.0,
            high_humidity_pct: 90.0,
        }
    }
}

impl AlertThresholds {
    /// Checks that paired thresholds are ordered sensibly.
    pub fn validate(&self) -> Result<(), String> {
        if self.frost_c >= self.heat_c {
            return Err(format!(
                "frost_c ({}) must be below heat_c ({})",
                self.frost_c, self.heat_c
            ));
        }
        if self.moderate_gust_kmh >= self.dangerous_gust_kmh {
            return Err(format!(
                "moderate_gust_kmh ({}) must be below dangerous_gust_kmh ({})",
                self.moderate_gust_kmh, self.dangerous_gust_kmh
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Rule evaluation
// ---------------------------------------------------------------------------

/// Runs every rule over `bundle` and returns the triggered alerts in rule order.
///
/// A rule whose series has no valid readings is skipped; the
/// `InsufficientData` outcome is logged at debug level.
pub fn evaluate_alerts(bundle: &TimeSeriesBundle, thresholds: &AlertThresholds) -> Vec<Alert> {
    let mut alerts = Vec::new();

    match check_temperature(bundle, thresholds) {
        Ok(found) => alerts.extend(found),
        Err(e) => log_skipped(&e),
    }
    match check_wind_gusts(bundle, thresholds) {
        Ok(found) => alerts.extend(found),
        Err(e) => log_skipped(&e),
    }
    alerts.extend(check_rain(bundle, thresholds));
    alerts.extend(check_pressure(bundle, thresholds));
    match check_humidity(bundle, thresholds) {
        Ok(found) => alerts.extend(found),
        Err(e) => log_skipped(&e),
    }

    alerts
}

fn log_skipped(err: &AnalysisError) {
    logging::debug(Source::Analysis, None, &format!("alert rule skipped: {}", err));
}

/// Heat and frost fire independently.
pub fn check_temperature(
    bundle: &TimeSeriesBundle,
    thresholds: &AlertThresholds,
) -> Result<Vec<Alert>, AnalysisError> {
    let (min, max) = range_of(Variable::Temperature, bundle.values(Variable::Temperature))?;
    let mut alerts = Vec::new();
    if max > thresholds.heat_c {
        alerts.push(Alert::new(
            AlertSeverity::High,
            AlertCategory::Heat,
            max,
            format!("High temperature: {:.1}°C", max),
        ));
    }
    if min < thresholds.frost_c {
        alerts.push(Alert::new(
            AlertSeverity::High,
            AlertCategory::Frost,
            min,
            format!("Frost risk: {:.1}°C", min),
        ));
    }
    Ok(alerts)
}

/// Only the strongest applicable gust tier fires.
pub fn check_wind_gusts(
    bundle: &TimeSeriesBundle,
    thresholds: &AlertThresholds,
) -> Result<Option<Alert>, AnalysisError> {
    let (_, max) = range_of(Variable::WindGusts, bundle.values(Variable::WindGusts))?;
    let alert = if max > thresholds.dangerous_gust_kmh {
        Some(Alert::new(
            AlertSeverity::High,
            AlertCategory::DangerousWind,
            max,
            format!("Dangerous winds: {:.1} km/h", max),
        ))
    } else if max > thresholds.moderate_gust_kmh {
        Some(Alert::new(
            AlertSeverity::Medium,
            AlertCategory::ModerateWind,
            max,
            format!("Moderate winds: {:.1} km/h", max),
        ))
    } else {
        None
    };
    Ok(alert)
}

/// Considers positive readings only; a dry series counts as a maximum of 0.
pub fn check_rain(bundle: &TimeSeriesBundle, thresholds: &AlertThresholds) -> Option<Alert> {
    let max = bundle
        .valid_values(Variable::Rain)
        .into_iter()
        .filter(|r| *r > 0.0)
        .fold(0.0, f64::max);
    (max > thresholds.intense_rain_mm).then(|| {
        Alert::new(
            AlertSeverity::Medium,
            AlertCategory::IntenseRain,
            max,
            format!("Intense rain: {:.1} mm/h", max),
        )
    })
}

/// Needs at least two readings; with fewer the rule stays silent.
pub fn check_pressure(bundle: &TimeSeriesBundle, thresholds: &AlertThresholds) -> Option<Alert> {
    let pressures = bundle.valid_values(Variable::SurfacePressure);
    if pressures.len() < 2 {
        return None;
    }
    let min = pressures.iter().copied().fold(f64::INFINITY, f64::min);
    let max = pressures.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let change = (max - min).abs();
    (change > thresholds.pressure_change_hpa).then(|| {
        Alert::new(
            AlertSeverity::Medium,
            AlertCategory::PressureChange,
            change,
            format!("Abrupt pressure change: {:.1} hPa", change),
        )
    })
}

pub fn check_humidity(
    bundle: &TimeSeriesBundle,
    thresholds: &AlertThresholds,
) -> Result<Option<Alert>, AnalysisError> {
    let average = mean_of(
        Variable::RelativeHumidity,
        bundle.values(Variable::RelativeHumidity),
    )?;
    Ok((average > thresholds.high_humidity_pct).then(|| {
        Alert::new(
            AlertSeverity::Low,
            AlertCategory::HighHumidity,
            average,
            format!("High average humidity: {:.1}%", average),
        )
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
