/// Core data types for the weather analysis service.
///
/// This module defines the shared domain model imported by all other modules:
/// the fixed set of hourly weather variables, the aligned time-series bundle
/// the analysis engine consumes, the query mode, and the analysis error type.
/// It performs no I/O.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Variables
// ---------------------------------------------------------------------------

/// The hourly weather variables requested from Open-Meteo.
///
/// Declaration order is the order the variables are requested and displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    Temperature,
    Rain,
    Snowfall,
    WindSpeed,
    WindGusts,
    RelativeHumidity,
    SurfacePressure,
    DewPoint,
}

impl Variable {
    /// Every variable, in request order.
    pub const ALL: [Variable; 8] = [
        Variable::Temperature,
        Variable::Rain,
        Variable::Snowfall,
        Variable::WindSpeed,
        Variable::WindGusts,
        Variable::RelativeHumidity,
        Variable::SurfacePressure,
        Variable::DewPoint,
    ];

    /// Key used for this variable in the Open-Meteo `hourly` block.
    pub fn api_key(self) -> &'static str {
        match self {
            Variable::Temperature => "temperature_2m",
            Variable::Rain => "rain",
            Variable::Snowfall => "snowfall",
            Variable::WindSpeed => "windspeed_10m",
            Variable::WindGusts => "windgusts_10m",
            Variable::RelativeHumidity => "relativehumidity_2m",
            Variable::SurfacePressure => "surface_pressure",
            Variable::DewPoint => "dewpoint_2m",
        }
    }

    /// Looks up a variable by its Open-Meteo key. Returns `None` if unknown.
    pub fn from_api_key(key: &str) -> Option<Variable> {
        Variable::ALL.into_iter().find(|v| v.api_key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            Variable::Temperature => "Temperature",
            Variable::Rain => "Rain",
            Variable::Snowfall => "Snowfall",
            Variable::WindSpeed => "Wind Speed",
            Variable::WindGusts => "Wind Gusts",
            Variable::RelativeHumidity => "Relative Humidity",
            Variable::SurfacePressure => "Pressure",
            Variable::DewPoint => "Dew Point",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Variable::Temperature | Variable::DewPoint => "°C",
            Variable::Rain => "mm",
            Variable::Snowfall => "cm",
            Variable::WindSpeed | Variable::WindGusts => "km/h",
            Variable::RelativeHumidity => "%",
            Variable::SurfacePressure => "hPa",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Query mode
// ---------------------------------------------------------------------------

/// Whether a bundle holds past observations or an upcoming forecast.
///
/// The mode only changes label text; every computation is identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// Archive data: the 48 hours ending on a chosen date.
    Historical,
    /// Forecast data: the upcoming days, starting today.
    Forecast,
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryMode::Historical => write!(f, "historical"),
            QueryMode::Forecast => write!(f, "forecast"),
        }
    }
}

// ---------------------------------------------------------------------------
// Time-series bundle
// ---------------------------------------------------------------------------

/// A set of hourly series aligned to one shared timestamp index.
///
/// Every stored series has exactly `timestamps.len()` samples; a missing
/// reading is `None`, never dropped. A variable that was not requested is
/// simply absent and reads back as an empty series.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeriesBundle {
    timestamps: Vec<NaiveDateTime>,
    series: BTreeMap<Variable, Vec<Option<f64>>>,
}

impl TimeSeriesBundle {
    /// Creates an empty bundle over the given timestamp index.
    pub fn new(timestamps: Vec<NaiveDateTime>) -> Self {
        Self {
            timestamps,
            series: BTreeMap::new(),
        }
    }

    /// Creates an empty bundle of `len` hourly timestamps starting at `start`.
    pub fn hourly(start: NaiveDateTime, len: usize) -> Self {
        let timestamps = (0..len)
            .map(|i| start + Duration::hours(i as i64))
            .collect();
        Self::new(timestamps)
    }

    /// Builds a bundle from series keyed by their Open-Meteo names.
    ///
    /// Fails with `InvalidInput` on an unknown key or a series whose length
    /// differs from the timestamp index.
    pub fn from_keyed<I>(timestamps: Vec<NaiveDateTime>, entries: I) -> Result<Self, AnalysisError>
    where
        I: IntoIterator<Item = (String, Vec<Option<f64>>)>,
    {
        let mut bundle = Self::new(timestamps);
        for (key, values) in entries {
            let variable = Variable::from_api_key(&key)
                .ok_or_else(|| AnalysisError::InvalidInput(format!("unknown variable '{}'", key)))?;
            bundle.insert(variable, values)?;
        }
        Ok(bundle)
    }

    /// Adds or replaces the series for `variable`.
    pub fn insert(&mut self, variable: Variable, values: Vec<Option<f64>>) -> Result<(), AnalysisError> {
        if values.len() != self.timestamps.len() {
            return Err(AnalysisError::InvalidInput(format!(
                "series '{}' has {} samples but the bundle has {} timestamps",
                variable.api_key(),
                values.len(),
                self.timestamps.len()
            )));
        }
        self.series.insert(variable, values);
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_series(mut self, variable: Variable, values: Vec<Option<f64>>) -> Result<Self, AnalysisError> {
        self.insert(variable, values)?;
        Ok(self)
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn contains(&self, variable: Variable) -> bool {
        self.series.contains_key(&variable)
    }

    /// Variables present in this bundle, in request order.
    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.series.keys().copied()
    }

    /// Raw samples for `variable`; empty if the series is absent.
    pub fn values(&self, variable: Variable) -> &[Option<f64>] {
        self.series.get(&variable).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Present, non-NaN samples for `variable`, in time order.
    pub fn valid_values(&self, variable: Variable) -> Vec<f64> {
        valid_values(self.values(variable))
    }
}

/// Drops `None` and NaN samples, preserving order.
pub fn valid_values(series: &[Option<f64>]) -> Vec<f64> {
    series
        .iter()
        .filter_map(|v| v.filter(|x| !x.is_nan()))
        .collect()
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while building or analysing a bundle.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    /// The input does not satisfy the bundle invariants (length mismatch,
    /// unknown variable, unparseable timestamp, out-of-range date).
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// An aggregate was requested over a series with no valid readings.
    #[error("Insufficient data for {variable}: {operation} needs at least one valid reading")]
    InsufficientData {
        variable: Variable,
        operation: &'static str,
    },
}

impl AnalysisError {
    pub fn insufficient(variable: Variable, operation: &'static str) -> Self {
        AnalysisError::InsufficientData { variable, operation }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
